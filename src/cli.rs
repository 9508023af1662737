//! CLI definition and top-level dispatch.

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::subcommands::{check::CmdCheck, run::CmdRun};

#[derive(Parser, Debug)]
#[command(
    name = "cmdlog",
    version,
    about = "Run commands while teeing their output to a unique log file"
)]
pub struct Cli {
    /// Debug-level logging (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a command, copying its output to stdout and a new log file
    Run(CmdRun),

    /// Check that commands resolve on PATH
    Check(CmdCheck),
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.cmd {
            Commands::Run(cmd) => cmd.run(),
            Commands::Check(cmd) => cmd.run(),
        }
    }
}
