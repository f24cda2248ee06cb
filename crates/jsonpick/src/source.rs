//! Buffered byte input with bounded lookahead.
//!
//! [`ByteSource`] owns a fixed-size window over an [`io::Read`]er. Callers
//! `peek` up to the window size without advancing, then `consume` what they
//! have validated. A peek longer than the window fails with
//! [`ErrorKind::LookaheadExceeded`]; the skipper handles that by consuming the
//! bytes it already scanned and peeking again from the new position.
//!
//! Every consumed byte advances the offset/line/column counters and, when
//! raw retention is on, is mirrored into a scratch record of the current
//! document for error reports.

use std::{
    fmt,
    io::{self, Read},
};

use tracing::trace;

use crate::{error::ErrorKind, scratch::ScratchBuffer};

/// Smallest window accepted; fixed-width peeks never exceed it.
pub(crate) const MIN_CAPACITY: usize = 16;

/// A location in the input stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// Bytes consumed since the start of the stream.
    pub offset: usize,
    /// 1-based line.
    pub line: usize,
    /// 1-based column, counted in bytes.
    pub column: usize,
}

impl Default for Position {
    fn default() -> Self {
        Self {
            offset: 0,
            line: 1,
            column: 1,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} (byte {})", self.line, self.column, self.offset)
    }
}

impl Position {
    #[inline]
    fn advance(&mut self, bytes: &[u8]) {
        self.offset += bytes.len();
        for &b in bytes {
            if b == b'\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }
}

#[derive(Debug)]
pub(crate) struct ByteSource<R> {
    inner: R,
    window: Box<[u8]>,
    pos: usize,
    filled: usize,
    eof: bool,
    position: Position,
    retain_raw: bool,
    raw: ScratchBuffer,
}

impl<R: Read> ByteSource<R> {
    pub(crate) fn new(inner: R, capacity: usize, retain_raw: bool) -> Self {
        Self {
            inner,
            window: vec![0; capacity.max(MIN_CAPACITY)].into_boxed_slice(),
            pos: 0,
            filled: 0,
            eof: false,
            position: Position::default(),
            retain_raw,
            raw: ScratchBuffer::new(),
        }
    }

    /// Size of the lookahead window.
    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.window.len()
    }

    #[inline]
    pub(crate) fn position(&self) -> Position {
        self.position
    }

    /// Bytes consumed since the last [`reset_raw`](Self::reset_raw), if
    /// retention is enabled.
    pub(crate) fn raw(&self) -> Option<&[u8]> {
        self.retain_raw.then(|| self.raw.as_slice())
    }

    pub(crate) fn reset_raw(&mut self) {
        self.raw.reset();
    }

    /// Return the next `n` unconsumed bytes, reading until they are
    /// available.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::EndOfStream`] if the input ends first,
    /// [`ErrorKind::LookaheadExceeded`] if `n` exceeds the window, and
    /// [`ErrorKind::Io`] on read failure.
    pub(crate) fn peek(&mut self, n: usize) -> Result<&[u8], ErrorKind> {
        if n > self.window.len() {
            return Err(ErrorKind::LookaheadExceeded {
                requested: n,
                capacity: self.window.len(),
            });
        }
        while self.filled - self.pos < n {
            if self.eof {
                return Err(ErrorKind::EndOfStream);
            }
            self.refill()?;
        }
        Ok(&self.window[self.pos..self.pos + n])
    }

    #[inline]
    pub(crate) fn peek_byte(&mut self) -> Result<u8, ErrorKind> {
        if self.pos < self.filled {
            return Ok(self.window[self.pos]);
        }
        self.peek(1).map(|window| window[0])
    }

    /// Return whatever is buffered, reading once if nothing is. An empty
    /// slice means the input has ended.
    pub(crate) fn fill_buf(&mut self) -> Result<&[u8], ErrorKind> {
        if self.pos == self.filled && !self.eof {
            self.refill()?;
        }
        Ok(&self.window[self.pos..self.filled])
    }

    /// Advance past `n` bytes previously returned by a peek.
    pub(crate) fn consume(&mut self, n: usize) {
        debug_assert!(n <= self.filled - self.pos, "consumed bytes were never peeked");
        let end = self.pos + n;
        let bytes = &self.window[self.pos..end];
        self.position.advance(bytes);
        if self.retain_raw {
            self.raw.extend_from_slice(bytes);
        }
        self.pos = end;
    }

    /// Shift unconsumed bytes to the front of the window and read more.
    fn refill(&mut self) -> Result<(), ErrorKind> {
        if self.pos > 0 {
            self.window.copy_within(self.pos..self.filled, 0);
            self.filled -= self.pos;
            self.pos = 0;
        }
        loop {
            match self.inner.read(&mut self.window[self.filled..]) {
                Ok(0) => {
                    self.eof = true;
                    return Ok(());
                }
                Ok(read) => {
                    trace!(read, buffered = self.filled + read, "refilled source window");
                    self.filled += read;
                    return Ok(());
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => return Err(ErrorKind::Io(err)),
            }
        }
    }
}
