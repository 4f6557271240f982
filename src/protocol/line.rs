//! Non-blocking line assembly over a byte stream.
use embedded_io::{Read, ReadReady};
use heapless::{String, Vec};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineError<E> {
    /// The underlying reader failed.
    Read(E),
    /// The line did not fit the buffer; it was dropped up to its newline.
    Overflow,
    /// The line was not valid UTF-8; it was dropped.
    InvalidUtf8,
}

/// Collects bytes into lines of at most `N` bytes.
///
/// A partial line is kept across calls to [`LineReader::poll`], and a call
/// never returns more than one line, so lines are consumed in arrival order.
#[derive(Debug, Default)]
pub struct LineReader<const N: usize> {
    buf: Vec<u8, N>,
    overflowed: bool,
}

impl<const N: usize> LineReader<N> {
    pub const fn new() -> Self {
        Self {
            buf: Vec::new(),
            overflowed: false,
        }
    }

    /// Drains the bytes `reader` reports as ready, stopping at the first newline.
    ///
    /// Returns `Ok(None)` when no complete line is available yet. Never blocks
    /// as long as the reader honors its own `read_ready`.
    pub fn poll<R>(&mut self, reader: &mut R) -> Result<Option<String<N>>, LineError<R::Error>>
    where
        R: Read + ReadReady,
    {
        let mut byte = [0u8; 1];

        while reader.read_ready().map_err(LineError::Read)? {
            if reader.read(&mut byte).map_err(LineError::Read)? == 0 {
                break;
            }
            if byte[0] == b'\n' {
                return self.finish_line();
            }
            if !self.overflowed && self.buf.push(byte[0]).is_err() {
                self.overflowed = true;
            }
        }
        Ok(None)
    }

    /// Bytes of the partial line waiting for its newline.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    fn finish_line<E>(&mut self) -> Result<Option<String<N>>, LineError<E>> {
        let bytes = core::mem::take(&mut self.buf);
        if core::mem::replace(&mut self.overflowed, false) {
            return Err(LineError::Overflow);
        }
        String::from_utf8(bytes)
            .map(Some)
            .map_err(|_| LineError::InvalidUtf8)
    }
}
