//! `cmdlog check` — resolve commands on PATH before running them.

use anyhow::{anyhow, Result};
use clap::Args;
use fs_err as fs;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct CmdCheck {
    /// Write the JSON report here instead of stdout
    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,

    #[arg(value_name = "COMMAND", required = true)]
    pub commands: Vec<String>,
}

impl CmdCheck {
    pub fn run(self) -> Result<()> {
        let mut missing = Vec::new();
        let mut entries = serde_json::Map::new();
        for name in &self.commands {
            let entry = match which::which(name) {
                Ok(path) => {
                    log::debug!("{name} -> {}", path.display());
                    serde_json::json!({ "found": true, "path": path })
                }
                Err(e) => {
                    missing.push(name.as_str());
                    serde_json::json!({ "found": false, "error": e.to_string() })
                }
            };
            entries.insert(name.clone(), entry);
        }

        let obj = serde_json::json!({
            "cmdlog_version": env!("CARGO_PKG_VERSION"),
            "commands": entries,
        });

        if let Some(path) = self.out {
            serde_json::to_writer_pretty(fs::File::create(path)?, &obj)?;
        } else {
            println!("{}", serde_json::to_string_pretty(&obj)?);
        }

        if !missing.is_empty() {
            return Err(anyhow!("not found on PATH: {}", missing.join(", ")));
        }
        Ok(())
    }
}
