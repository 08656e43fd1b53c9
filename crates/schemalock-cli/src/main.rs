use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

mod args;
mod cmd;
mod output;
mod walk;

fn main() -> Result<ExitCode> {
    let cli = args::Cli::parse();
    output::init(cli.json);
    schemalock_core::rules::set_debug(cli.debug);

    cmd::dispatch(cli)
}
