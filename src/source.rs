use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::error::Error;

/// Yields the newline-delimited records of a reader, one pass only.
///
/// A trailing `\r` is stripped from each record, and bytes that are not valid UTF-8 are
/// replaced with U+FFFD rather than failing the read. Only genuine I/O errors are surfaced.
pub struct LineSource<R> {
    reader: R,
    buf: Vec<u8>,
}

impl LineSource<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self, Error> {
        let file = File::open(path).map_err(|source| Error::Open {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Opened {}", path.display());
        Ok(LineSource::new(BufReader::new(file)))
    }
}

impl<R: BufRead> LineSource<R> {
    pub fn new(reader: R) -> LineSource<R> {
        LineSource {
            reader,
            buf: Vec::new(),
        }
    }
}

impl<R: BufRead> Iterator for LineSource<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                if self.buf.last() == Some(&b'\n') {
                    self.buf.pop();
                }
                // also applies to a final record with no newline after it
                if self.buf.last() == Some(&b'\r') {
                    self.buf.pop();
                }
                Some(Ok(String::from_utf8_lossy(&self.buf).into_owned()))
            }
            Err(err) => Some(Err(err)),
        }
    }
}
