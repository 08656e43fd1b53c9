use clap::{Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "schemalock",
    version,
    about = "Track a proto tree in a lock file and warn on breaking changes"
)]
pub struct Cli {
    /// Emit JSON output on stdout.
    #[arg(long, global = true)]
    pub json: bool,

    /// Root directory searched for .proto files.
    #[arg(long, global = true, default_value = ".")]
    pub protoroot: String,

    /// Directory holding the lock file.
    #[arg(long, global = true, default_value = ".")]
    pub lockdir: String,

    /// Glob pattern, relative to the proto root, excluded from the walk.
    /// May be given multiple times.
    #[arg(long, global = true)]
    pub ignore: Vec<String>,

    /// Verbose rule diagnostics on stderr.
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Parse the proto tree and write the initial lock file.
    Init,

    /// Compare the proto tree against the lock file and report warnings.
    Status,

    /// Re-check the tree and update the lock file when it is compatible.
    Commit {
        /// Rewrite the lock even when warnings are present.
        #[arg(long)]
        force: bool,
    },
}
