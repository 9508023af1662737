//! `cmdlog run` — run one command with its output logged.

use anyhow::{anyhow, Context, Result};
use clap::Args;
use fs_err as fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Instant;

use crate::config::RunConfig;
use crate::model::RunReport;
use crate::runner::LoggedRunner;

#[derive(Args, Debug)]
pub struct CmdRun {
    #[arg(
        long,
        value_name = "PATH",
        help = "Log file prefix (else CMDLOG_PREFIX, else <tmp>/cmdlog-)"
    )]
    pub prefix: Option<PathBuf>,
    #[arg(
        long,
        value_name = "DIR",
        help = "Working directory (else CMDLOG_WORKDIR, else current)"
    )]
    pub workdir: Option<PathBuf>,
    #[arg(long, help = "Header tag (else CMDLOG_TAG, else cmdlog)")]
    pub tag: Option<String>,
    #[arg(long, short, help = "Only write to the log file, not stdout")]
    pub quiet: bool,
    #[arg(long, help = "Print a JSON run report to stdout when done")]
    pub json: bool,

    /// Command and its arguments; everything after the command is passed through
    #[arg(
        value_name = "COMMAND",
        required = true,
        num_args = 1..,
        trailing_var_arg = true
    )]
    pub command: Vec<String>,
}

impl CmdRun {
    pub fn run(self) -> Result<()> {
        let (program, args) = self
            .command
            .split_first()
            .ok_or_else(|| anyhow!("no command given"))?;
        let cfg = RunConfig::resolve(
            self.prefix.as_deref(),
            self.tag.as_deref(),
            self.workdir.as_deref(),
        );
        if let Some(dir) = cfg.log_dir() {
            fs::create_dir_all(dir)?;
        }

        let runner = LoggedRunner::new(cfg.tag.as_str());
        let started = Instant::now();
        let result = {
            let mut stdout = io::stdout().lock();
            let sink = if self.quiet {
                None
            } else {
                Some(&mut stdout as &mut dyn Write)
            };
            runner.run_dir_output(
                &cfg.prefix,
                cfg.workdir.as_deref(),
                sink,
                program,
                args,
            )
        };
        let elapsed = started.elapsed();

        let report = RunReport::new(program, args, &result, elapsed);
        match &report.log_path {
            Some(path) => log::info!("log file: {} ({})", path.display(), report.elapsed),
            None => log::warn!("no log file written ({})", report.elapsed),
        }
        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        result
            .map(|_| ())
            .with_context(|| format!("cmdlog run `{program}`"))
    }
}
