//! A log file that is only created on first write.
//!
//! The name is derived from a prefix plus a random token, so runs sharing a
//! prefix never clobber each other, and runs that never write leave nothing
//! behind on disk.

use std::ffi::OsStr;
use std::fs::File;
use std::io::{self, Write};
use std::path::{is_separator, Path, PathBuf};

use crate::errors::Error;

/// Length of the random token appended to the prefix.
const TOKEN_LEN: usize = 10;

#[derive(Debug)]
enum State {
    Pending,
    Open(File),
    Closed,
}

#[derive(Debug)]
pub struct LazyFile {
    prefix: PathBuf,
    path: Option<PathBuf>,
    state: State,
}

impl LazyFile {
    pub fn new(prefix: impl Into<PathBuf>) -> Self {
        Self {
            prefix: prefix.into(),
            path: None,
            state: State::Pending,
        }
    }

    pub fn prefix(&self) -> &Path {
        &self.prefix
    }

    /// Resolved file name; `None` until the first write. Kept after close.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, State::Open(_))
    }

    /// Sync and release the file. No-op when never opened or already closed.
    pub fn close(&mut self) -> io::Result<()> {
        match std::mem::replace(&mut self.state, State::Closed) {
            State::Open(file) => file.sync_all(),
            State::Pending | State::Closed => Ok(()),
        }
    }

    fn file(&mut self) -> io::Result<&mut File> {
        if let State::Pending = self.state {
            let (file, path) = create_unique(&self.prefix).map_err(|source| {
                Error::CreateFailed {
                    prefix: self.prefix.clone(),
                    source,
                }
                .into_io()
            })?;
            log::debug!("created log file {}", path.display());
            self.path = Some(path);
            self.state = State::Open(file);
        }
        match &mut self.state {
            State::Open(file) => Ok(file),
            _ => Err(Error::ClosedResource.into_io()),
        }
    }
}

impl Write for LazyFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        match &mut self.state {
            State::Open(file) => file.flush(),
            State::Pending => Ok(()),
            State::Closed => Err(Error::ClosedResource.into_io()),
        }
    }
}

/// Split a prefix like `logs/build-` into (`logs`, `build-`).
/// A trailing separator means "inside this directory, no stem".
fn split_prefix(prefix: &Path) -> (&Path, &OsStr) {
    let trailing_sep = prefix
        .to_string_lossy()
        .chars()
        .last()
        .is_some_and(is_separator);
    if trailing_sep {
        return (prefix, OsStr::new(""));
    }
    let Some(stem) = prefix.file_name() else {
        return (prefix, OsStr::new(""));
    };
    let dir = match prefix.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    (dir, stem)
}

/// Eagerly create a uniquely-named log file from `prefix`, returning its
/// path and the open handle. [`LazyFile`] does the same on first write.
pub fn make_log_writer(prefix: impl AsRef<Path>) -> io::Result<(PathBuf, File)> {
    let (file, path) = create_unique(prefix.as_ref())?;
    log::debug!("created log file {}", path.display());
    Ok((path, file))
}

/// Exclusively create `<dir>/<stem><token>`, retrying on collision.
fn create_unique(prefix: &Path) -> io::Result<(File, PathBuf)> {
    let (dir, stem) = split_prefix(prefix);
    let tmp = tempfile::Builder::new()
        .prefix(stem)
        .rand_bytes(TOKEN_LEN)
        .tempfile_in(dir)?;
    tmp.keep().map_err(|e| e.error)
}
