//! Error taxonomy for logged command runs.

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The log file could not be created; nothing was logged.
    #[error("failed to create log file with prefix {}", .prefix.display())]
    CreateFailed {
        prefix: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("write to closed log file")]
    ClosedResource,

    #[error("failed to launch `{command}`")]
    ProcessLaunchFailed {
        command: String,
        log_path: Option<PathBuf>,
        #[source]
        source: io::Error,
    },

    #[error("`{command}` failed with {status}")]
    ProcessExitNonZero {
        command: String,
        log_path: Option<PathBuf>,
        status: ExitStatus,
    },

    /// Relaying child output failed (pipe read, sink write, or wait).
    #[error("failed to relay command output")]
    Output {
        log_path: Option<PathBuf>,
        #[source]
        source: io::Error,
    },

    /// Writing to an already-created log file failed (disk full, I/O error).
    #[error("failed to write log file")]
    LogWrite {
        path: Option<PathBuf>,
        #[source]
        source: io::Error,
    },

    #[error("failed to close log file {}", .path.display())]
    Close {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// True when the failure is about the log file itself rather than the command.
    pub fn is_log_failure(&self) -> bool {
        matches!(
            self,
            Error::CreateFailed { .. }
                | Error::ClosedResource
                | Error::LogWrite { .. }
                | Error::Close { .. }
        )
    }

    /// Log file written before the failure, if one was created.
    pub fn log_path(&self) -> Option<&Path> {
        match self {
            Error::ProcessLaunchFailed { log_path, .. }
            | Error::ProcessExitNonZero { log_path, .. }
            | Error::Output { log_path, .. } => log_path.as_deref(),
            Error::LogWrite { path, .. } => path.as_deref(),
            Error::Close { path, .. } => Some(path.as_path()),
            Error::CreateFailed { .. } | Error::ClosedResource => None,
        }
    }

    /// Exit code of the child, when it ran and exited normally.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Error::ProcessExitNonZero { status, .. } => status.code(),
            _ => None,
        }
    }

    pub(crate) fn with_log_path(mut self, path: Option<PathBuf>) -> Self {
        match &mut self {
            Error::ProcessLaunchFailed { log_path, .. }
            | Error::ProcessExitNonZero { log_path, .. }
            | Error::Output { log_path, .. } => *log_path = path,
            _ => {}
        }
        self
    }

    /// Wrap for transport through `io::Write`, keeping the OS error kind.
    pub(crate) fn into_io(self) -> io::Error {
        let kind = match &self {
            Error::CreateFailed { source, .. }
            | Error::LogWrite { source, .. }
            | Error::Close { source, .. } => source.kind(),
            _ => io::ErrorKind::Other,
        };
        io::Error::new(kind, self)
    }
}

/// Recovers an [`Error`] tunnelled through `io::Error`; anything else is an output failure.
impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        if !err.get_ref().is_some_and(|inner| inner.is::<Error>()) {
            return Error::Output {
                log_path: None,
                source: err,
            };
        }
        let kind = err.kind();
        match err.into_inner().map(|inner| inner.downcast::<Error>()) {
            Some(Ok(inner)) => *inner,
            Some(Err(other)) => Error::Output {
                log_path: None,
                source: io::Error::new(kind, other),
            },
            None => Error::Output {
                log_path: None,
                source: io::Error::from(kind),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tunnelled_errors_round_trip_through_io() {
        let io_err = Error::ClosedResource.into_io();
        assert!(matches!(Error::from(io_err), Error::ClosedResource));

        let io_err = Error::CreateFailed {
            prefix: PathBuf::from("/nope/x-"),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        }
        .into_io();
        assert_eq!(io_err.kind(), io::ErrorKind::PermissionDenied);
        let err = Error::from(io_err);
        assert!(matches!(err, Error::CreateFailed { .. }));
        assert!(err.is_log_failure());
    }

    #[test]
    fn plain_io_errors_become_output_errors() {
        let err = Error::from(io::Error::from(io::ErrorKind::BrokenPipe));
        assert!(matches!(err, Error::Output { .. }));
        assert!(!err.is_log_failure());
        assert!(err.log_path().is_none());
    }

    #[test]
    fn with_log_path_only_touches_process_errors() {
        let err = Error::Output {
            log_path: None,
            source: io::Error::from(io::ErrorKind::BrokenPipe),
        }
        .with_log_path(Some(PathBuf::from("run-abc")));
        assert_eq!(err.log_path(), Some(Path::new("run-abc")));

        let err = Error::ClosedResource.with_log_path(Some(PathBuf::from("run-abc")));
        assert!(err.log_path().is_none());
    }

    #[test]
    fn log_write_failures_are_log_failures() {
        let io_err = Error::LogWrite {
            path: Some(PathBuf::from("run-abc")),
            source: io::Error::from(io::ErrorKind::WriteZero),
        }
        .into_io();
        assert_eq!(io_err.kind(), io::ErrorKind::WriteZero);

        let err = Error::from(io_err);
        assert!(matches!(err, Error::LogWrite { .. }));
        assert!(err.is_log_failure());
        assert_eq!(err.log_path(), Some(Path::new("run-abc")));
    }
}
