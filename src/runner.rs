//! Run an external command, teeing its combined output to a caller sink and
//! a lazily-created log file.

use std::ffi::{OsStr, OsString};
use std::io::{self, PipeReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::errors::{Error, Result};
use crate::io::lazy_file::LazyFile;
use crate::io::tee::MultiWriter;

/// Tag written at the start of every header line.
pub const DEFAULT_TAG: &str = "cmdlog";

const CHUNK_SIZE: usize = 8 * 1024;

#[derive(Debug, Clone)]
pub struct LoggedRunner {
    tag: String,
}

impl Default for LoggedRunner {
    fn default() -> Self {
        Self::new(DEFAULT_TAG)
    }
}

impl LoggedRunner {
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Run with no extra sink, in the current directory.
    pub fn run<I, S>(
        &self,
        prefix: impl AsRef<Path>,
        command: impl AsRef<OsStr>,
        args: I,
    ) -> Result<PathBuf>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.run_dir_output(prefix, None, None, command, args)
    }

    /// Run `command args...` in `work_dir` (None or empty inherits), copying
    /// everything it prints to `sink` and to a new log file named from
    /// `prefix`.
    ///
    /// Returns the log path. Process failures carry the path too, see
    /// [`Error::log_path`].
    pub fn run_dir_output<I, S>(
        &self,
        prefix: impl AsRef<Path>,
        work_dir: Option<&Path>,
        sink: Option<&mut dyn Write>,
        command: impl AsRef<OsStr>,
        args: I,
    ) -> Result<PathBuf>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let command = command.as_ref();
        let args: Vec<OsString> = args.into_iter().map(|a| a.as_ref().to_owned()).collect();

        let mut log_file = LazyFile::new(prefix.as_ref());
        let outcome = self.execute(&mut log_file, work_dir, sink, command, &args);
        let closed = log_file.close();
        let log_path = log_file.path().map(Path::to_path_buf);

        match (outcome, closed) {
            (Ok(()), Ok(())) => Ok(log_path.unwrap_or_default()),
            (Ok(()), Err(source)) => Err(Error::Close {
                path: log_path.unwrap_or_default(),
                source,
            }),
            (Err(e), closed) => {
                if let Err(close_err) = closed {
                    log::warn!(
                        "failed to close log file {}: {close_err}",
                        log_path.as_deref().unwrap_or(Path::new("")).display()
                    );
                }
                Err(e.with_log_path(log_path))
            }
        }
    }

    fn execute(
        &self,
        log_file: &mut LazyFile,
        work_dir: Option<&Path>,
        sink: Option<&mut dyn Write>,
        command: &OsStr,
        args: &[OsString],
    ) -> Result<()> {
        let mut log_side = LogSide(log_file);
        let mut mux = MultiWriter::new();
        mux.push(&mut log_side);
        if let Some(sink) = sink {
            mux.push(sink);
        }

        let line = command_line(command, args);
        let mut relay_err: Option<Error> = None;
        let header = format!("{}: running command: {line}\n", self.tag);
        if let Err(e) = mux.write_all(header.as_bytes()) {
            // Without a log file there is nothing to run for; a sink failure is
            // reported once the child has exited.
            match Error::from(e) {
                e @ Error::CreateFailed { .. } => return Err(e),
                e => relay_err = Some(e),
            }
        }
        log::info!("running command: {line}");

        let launch_failed = |source| Error::ProcessLaunchFailed {
            command: line.clone(),
            log_path: None,
            source,
        };

        // One pipe shared by stdout and stderr keeps the child's write order.
        let (reader, writer) = io::pipe().map_err(launch_failed)?;
        let err_writer = writer.try_clone().map_err(launch_failed)?;

        let mut cmd = Command::new(command);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(writer)
            .stderr(err_writer);
        if let Some(dir) = work_dir.filter(|d| !d.as_os_str().is_empty()) {
            cmd.current_dir(dir);
        }
        let spawned = cmd.spawn();
        // Release our copies of the write end so the reader sees EOF.
        drop(cmd);
        let mut child = match spawned {
            Ok(child) => child,
            Err(source) => {
                if let Some(e) = relay_err {
                    log::warn!("output relay for `{line}` also failed: {e}");
                }
                return Err(launch_failed(source));
            }
        };

        relay(reader, &mut mux, &mut relay_err);

        let status = child.wait()?;
        if !status.success() {
            if let Some(e) = relay_err {
                log::warn!("output relay for `{line}` also failed: {e}");
            }
            return Err(Error::ProcessExitNonZero {
                command: line,
                log_path: None,
                status,
            });
        }
        if let Some(e) = relay_err {
            return Err(e);
        }
        mux.flush()?;
        Ok(())
    }
}

/// Copy the child's output into `mux` until EOF, on the calling thread.
///
/// Write failures are recorded and reading continues, so the child never
/// blocks on a full pipe and the surviving destinations stay complete.
fn relay(mut reader: PipeReader, mux: &mut MultiWriter<'_>, relay_err: &mut Option<Error>) {
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => return,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                record(relay_err, e.into());
                return;
            }
        };
        if let Err(e) = mux.write_all(&buf[..n]) {
            record(relay_err, e.into());
        }
    }
}

fn record(slot: &mut Option<Error>, err: Error) {
    match slot {
        None => *slot = Some(err),
        Some(_) => log::debug!("dropping further relay error: {err}"),
    }
}

/// The log file's seat in the multiplexer. Plain write failures on it are
/// tagged so they classify as log failures, not command failures.
struct LogSide<'a>(&'a mut LazyFile);

impl Write for LogSide<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf).map_err(|e| tag_log_error(e, self.0.path()))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush().map_err(|e| tag_log_error(e, self.0.path()))
    }
}

fn tag_log_error(err: io::Error, path: Option<&Path>) -> io::Error {
    if err.get_ref().is_some_and(|inner| inner.is::<Error>()) {
        return err;
    }
    Error::LogWrite {
        path: path.map(Path::to_path_buf),
        source: err,
    }
    .into_io()
}

/// `command arg1 arg2`, lossily decoded, no trailing space.
fn command_line(command: &OsStr, args: &[OsString]) -> String {
    std::iter::once(command)
        .chain(args.iter().map(OsString::as_os_str))
        .map(OsStr::to_string_lossy)
        .collect::<Vec<_>>()
        .join(" ")
}

/// [`LoggedRunner::run`] with the default tag.
pub fn run_logged_cmd<I, S>(
    prefix: impl AsRef<Path>,
    command: impl AsRef<OsStr>,
    args: I,
) -> Result<PathBuf>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    LoggedRunner::default().run(prefix, command, args)
}

/// [`LoggedRunner::run_dir_output`] with the default tag.
pub fn run_logged_cmd_dir_output<I, S>(
    prefix: impl AsRef<Path>,
    work_dir: Option<&Path>,
    sink: Option<&mut dyn Write>,
    command: impl AsRef<OsStr>,
    args: I,
) -> Result<PathBuf>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    LoggedRunner::default().run_dir_output(prefix, work_dir, sink, command, args)
}
