use std::process::ExitCode;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::args::Cli;
use crate::output;

use super::status;

#[derive(Debug, Serialize)]
pub struct CommitOut {
    pub lockfile: String,
    pub definitions: usize,
    pub forced: bool,
}

pub fn run(cli: &Cli, force: bool) -> Result<ExitCode> {
    let (report, updated) = status::analyze(cli)?;

    if !report.ok() && !force {
        status::render(&report)?;
        output::eprintln_line("commit aborted; use --force to overrule the warnings");
        return Ok(ExitCode::from(1));
    }

    let lock_path = super::lock_path(cli);
    schemalock_core::lock::write_to(&lock_path, &updated)
        .with_context(|| format!("writing {}", lock_path.display()))?;

    if output::is_json() {
        output::print(&CommitOut {
            lockfile: lock_path.display().to_string(),
            definitions: updated.definitions.len(),
            forced: force && !report.ok(),
        })?;
    } else {
        output::print_line(&format!("updated {}", lock_path.display()));
    }
    Ok(ExitCode::SUCCESS)
}
