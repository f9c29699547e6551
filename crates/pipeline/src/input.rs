use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom};

use common::Result;
use tracing::info;

/// Anything that can be read from the start again.
pub trait ReadSeek: Read + Seek {}

impl<T: Read + Seek> ReadSeek for T {}

/// A line source that can be rewound for a second pass.
///
/// Non-seekable sources are copied into an anonymous temporary file first.
/// The temporary file lives exactly as long as this value, so keep it alive
/// until the last pass is done.
pub struct RewindableInput {
    reader: BufReader<Box<dyn ReadSeek>>,
    spooled: bool,
}

impl RewindableInput {
    pub fn from_seekable<T: Read + Seek + 'static>(source: T) -> Self {
        Self {
            reader: BufReader::new(Box::new(source)),
            spooled: false,
        }
    }

    /// Copy all of `source` into temporary storage.
    pub fn spool<R: Read>(mut source: R) -> Result<Self> {
        let mut file = tempfile::tempfile()?;
        let bytes = io::copy(&mut source, &mut file)?;
        file.seek(SeekFrom::Start(0))?;
        info!(bytes, "Spooled non-seekable input to temporary storage");
        Ok(Self {
            reader: BufReader::new(Box::new(file)),
            spooled: true,
        })
    }

    /// Read a regular file in place; pipes and FIFOs get spooled.
    pub fn from_file(mut file: File) -> Result<Self> {
        match file.stream_position() {
            Ok(_) => Ok(Self::from_seekable(file)),
            Err(_) => Self::spool(file),
        }
    }

    pub fn is_spooled(&self) -> bool {
        self.spooled
    }

    /// Move back to the first byte.
    pub fn rewind(&mut self) -> Result<()> {
        self.reader.seek(SeekFrom::Start(0))?;
        Ok(())
    }
}

impl Read for RewindableInput {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

impl BufRead for RewindableInput {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.reader.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        self.reader.consume(amt)
    }
}

/// Read the next line into `buf` without its `\n` or `\r\n` terminator.
/// Returns `false` at end of input.
pub fn next_line<R: BufRead>(reader: &mut R, buf: &mut String) -> Result<bool> {
    buf.clear();
    if reader.read_line(buf)? == 0 {
        return Ok(false);
    }
    if buf.ends_with('\n') {
        buf.pop();
        if buf.ends_with('\r') {
            buf.pop();
        }
    }
    Ok(true)
}
