//! Fan one stream of writes out to several destinations.

use std::io::{self, Write};

/// Writes every buffer to each destination in order.
///
/// A failing destination does not stop the others from receiving the bytes;
/// the first error is returned and later ones are logged.
#[derive(Default)]
pub struct MultiWriter<'a> {
    writers: Vec<&'a mut dyn Write>,
}

impl<'a> MultiWriter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, writer: &'a mut dyn Write) {
        self.writers.push(writer);
    }

    pub fn len(&self) -> usize {
        self.writers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writers.is_empty()
    }

    fn each(&mut self, mut op: impl FnMut(&mut dyn Write) -> io::Result<()>) -> io::Result<()> {
        let mut first: Option<io::Error> = None;
        for w in self.writers.iter_mut() {
            if let Err(e) = op(&mut **w) {
                match first {
                    None => first = Some(e),
                    Some(_) => log::warn!("additional output destination failed: {e}"),
                }
            }
        }
        first.map_or(Ok(()), Err)
    }
}

impl Write for MultiWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.each(|w| w.write_all(buf))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.each(|w| w.flush())
    }
}
