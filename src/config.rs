//! Run settings resolved from CLI flags, environment, then defaults.

use std::path::{Path, PathBuf};

use crate::runner::DEFAULT_TAG;

pub const ENV_PREFIX: &str = "CMDLOG_PREFIX";
pub const ENV_TAG: &str = "CMDLOG_TAG";
pub const ENV_WORKDIR: &str = "CMDLOG_WORKDIR";

/// File-name stem used when no prefix is configured.
pub const DEFAULT_STEM: &str = "cmdlog-";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub prefix: PathBuf,
    pub tag: String,
    pub workdir: Option<PathBuf>,
}

impl RunConfig {
    /// Priority: CLI override > environment variable > default.
    pub fn resolve(prefix: Option<&Path>, tag: Option<&str>, workdir: Option<&Path>) -> Self {
        Self::resolve_with(prefix, tag, workdir, |key| std::env::var(key).ok())
    }

    pub(crate) fn resolve_with(
        prefix: Option<&Path>,
        tag: Option<&str>,
        workdir: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let lookup = |key: &str| env(key).filter(|v| !v.is_empty());

        let prefix = match prefix {
            Some(p) => p.to_path_buf(),
            None => lookup(ENV_PREFIX)
                .map(PathBuf::from)
                .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_STEM)),
        };
        let tag = match tag {
            Some(t) => t.to_string(),
            None => lookup(ENV_TAG).unwrap_or_else(|| DEFAULT_TAG.to_string()),
        };
        let workdir = match workdir {
            Some(d) => Some(d.to_path_buf()),
            None => lookup(ENV_WORKDIR).map(PathBuf::from),
        };

        Self {
            prefix,
            tag,
            workdir,
        }
    }

    /// Directory the log file will be created in, if the prefix names one.
    pub fn log_dir(&self) -> Option<&Path> {
        let s = self.prefix.to_string_lossy();
        if s.chars().last().is_some_and(std::path::is_separator) {
            return Some(self.prefix.as_path());
        }
        self.prefix.parent().filter(|p| !p.as_os_str().is_empty())
    }
}
