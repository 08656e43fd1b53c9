use std::path::Path;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use serde::Serialize;

use schemalock_core::model::{Corpus, Warning};
use schemalock_core::report::Report;

use crate::args::Cli;
use crate::{output, walk};

#[derive(Debug, Serialize)]
struct StatusOut<'a> {
    ok: bool,
    warnings: &'a [Warning],
}

pub fn run(cli: &Cli) -> Result<ExitCode> {
    let (report, _updated) = analyze(cli)?;
    render(&report)?;
    Ok(if report.ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

/// Load the lock as the baseline, parse the tree as the candidate, and run
/// the full rule catalogue. Also returns the parsed tree so `commit` can
/// rewrite the lock without a second walk.
pub(super) fn analyze(cli: &Cli) -> Result<(Report, Corpus)> {
    let lock_path = super::lock_path(cli);
    if !lock_path.exists() {
        bail!(
            "{} not found; run `schemalock init` first",
            lock_path.display()
        );
    }

    let baseline = schemalock_core::lock::read_from(&lock_path)
        .with_context(|| format!("reading {}", lock_path.display()))?;
    let updated = walk::parse_tree(Path::new(&cli.protoroot), &cli.ignore)?;
    let report = schemalock_core::rules::run_all(&baseline, &updated)?;
    Ok((report, updated))
}

pub(super) fn render(report: &Report) -> Result<()> {
    if output::is_json() {
        output::print(&StatusOut {
            ok: report.ok(),
            warnings: &report.warnings,
        })?;
        return Ok(());
    }

    output::print_warnings(&report.warnings)?;
    if report.ok() {
        output::print_line("ok: proto tree is compatible with the lock");
    } else {
        output::print_line(&format!("{} warning(s)", report.warnings.len()));
    }
    Ok(())
}
