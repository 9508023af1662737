use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::errors::Error;

/// Summary of one logged run, printed by `cmdlog run --json`.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub command: String,
    pub args: Vec<String>,
    pub log_path: Option<PathBuf>,
    pub success: bool,
    pub exit_code: Option<i32>,
    pub elapsed: String,
    pub error: Option<String>,
}

impl RunReport {
    pub fn new(
        command: &str,
        args: &[String],
        result: &Result<PathBuf, Error>,
        elapsed: Duration,
    ) -> Self {
        // millisecond resolution keeps humantime output short
        let elapsed = Duration::from_millis(elapsed.as_millis() as u64);
        let (log_path, success, exit_code, error) = match result {
            Ok(path) => (Some(path.clone()), true, Some(0), None),
            Err(e) => (
                e.log_path().map(PathBuf::from),
                false,
                e.exit_code(),
                Some(error_chain(e)),
            ),
        };
        Self {
            command: command.to_string(),
            args: args.to_vec(),
            log_path,
            success,
            exit_code,
            elapsed: humantime::format_duration(elapsed).to_string(),
            error,
        }
    }
}

fn error_chain(e: &Error) -> String {
    let mut msg = e.to_string();
    let mut source = std::error::Error::source(e);
    while let Some(s) = source {
        msg.push_str(": ");
        msg.push_str(&s.to_string());
        source = s.source();
    }
    msg
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn success_report() {
        let res = Ok(PathBuf::from("/tmp/cmdlog-abc"));
        let r = RunReport::new("echo", &["hi".to_string()], &res, Duration::from_micros(1500));
        assert!(r.success);
        assert_eq!(r.exit_code, Some(0));
        assert_eq!(r.log_path, Some(PathBuf::from("/tmp/cmdlog-abc")));
        assert_eq!(r.elapsed, "1ms");
        assert!(r.error.is_none());
    }

    #[test]
    fn failure_report_carries_cause() {
        let res = Err(Error::ProcessLaunchFailed {
            command: "nope".to_string(),
            log_path: Some(PathBuf::from("/tmp/cmdlog-xyz")),
            source: io::Error::from(io::ErrorKind::NotFound),
        });
        let r = RunReport::new("nope", &[], &res, Duration::from_secs(2));
        assert!(!r.success);
        assert_eq!(r.exit_code, None);
        assert_eq!(r.log_path, Some(PathBuf::from("/tmp/cmdlog-xyz")));
        assert_eq!(r.elapsed, "2s");
        let err = r.error.unwrap();
        assert!(err.starts_with("failed to launch `nope`: "), "{err}");

        let json = serde_json::to_value(
            RunReport::new("nope", &[], &res, Duration::ZERO),
        )
        .unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["command"], "nope");
    }
}
