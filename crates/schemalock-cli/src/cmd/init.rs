use std::path::Path;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use serde::Serialize;

use crate::args::Cli;
use crate::{output, walk};

#[derive(Debug, Serialize)]
pub struct InitOut {
    pub lockfile: String,
    pub definitions: usize,
}

pub fn run(cli: &Cli) -> Result<ExitCode> {
    let lock_path = super::lock_path(cli);
    if lock_path.exists() {
        bail!(
            "{} already exists; run `schemalock commit` to update it",
            lock_path.display()
        );
    }

    let corpus = walk::parse_tree(Path::new(&cli.protoroot), &cli.ignore)?;
    schemalock_core::lock::write_to(&lock_path, &corpus)
        .with_context(|| format!("writing {}", lock_path.display()))?;

    if output::is_json() {
        output::print(&InitOut {
            lockfile: lock_path.display().to_string(),
            definitions: corpus.definitions.len(),
        })?;
    } else {
        output::print_line(&format!(
            "wrote {} ({} definition(s))",
            lock_path.display(),
            corpus.definitions.len()
        ));
    }
    Ok(ExitCode::SUCCESS)
}
