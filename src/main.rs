//! cmdlog: run commands with their output logged to a unique file.
//! Entry point only; see `cli` and `subcommands/*`.

use anyhow::Result;
use cmdlog::cli::Cli;
use cmdlog::util::logging;

fn main() -> Result<()> {
    let cli = <Cli as clap::Parser>::parse();
    logging::init_logging(cli.verbose);
    cli.run()
}
