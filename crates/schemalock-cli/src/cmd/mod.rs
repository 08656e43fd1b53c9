use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;

use crate::args::{Cli, Command};

mod commit;
mod init;
mod status;

pub fn dispatch(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Command::Init => init::run(&cli),
        Command::Status => status::run(&cli),
        Command::Commit { force } => commit::run(&cli, force),
    }
}

fn lock_path(cli: &Cli) -> PathBuf {
    Path::new(&cli.lockdir).join(schemalock_core::lock::LOCK_FILE_NAME)
}
