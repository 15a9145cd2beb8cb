//! Rolling lookahead window over a byte source.
//!
//! The buffer owns the reload/compaction bookkeeping so the tokenizer only
//! ever sees `peek`/`advance`/`require`/`scan_until`. The window keeps the
//! invariant `0 <= position <= count <= capacity`; compaction moves unread
//! bytes to the window start and never drops data. When the underlying source
//! is exhausted it is dropped (closed) exactly once, and every subsequent
//! read surfaces the distinguished end-of-source condition as `None`.

use std::io;

use crate::grammar::charspec;
use crate::grammar::error::ParseError;

/// Default window size, small enough that reload and compaction paths are
/// exercised by ordinary rule text.
pub const DEFAULT_CAPACITY: usize = 64;

/// How a [`LookaheadBuffer::scan_until`] call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    /// The delimiter was found and consumed; it is not part of the output.
    DelimiterFound,
    /// A newline was reached and left unconsumed (`stop_at_newline` only).
    NewlineReached,
    /// The source ran out before the delimiter appeared.
    SourceExhausted,
}

/// A buffered window over a character source with lookahead.
#[derive(Debug)]
pub struct LookaheadBuffer<R> {
    source: Option<R>,
    buf: Vec<u8>,
    /// Index of the next unconsumed byte.
    position: usize,
    /// Number of valid bytes in the window.
    count: usize,
    /// Absolute source offset of `buf[0]`.
    base: usize,
}

impl<R: io::Read> LookaheadBuffer<R> {
    pub fn new(source: R) -> Self {
        Self::with_capacity(source, DEFAULT_CAPACITY)
    }

    pub fn with_capacity(source: R, capacity: usize) -> Self {
        LookaheadBuffer {
            source: Some(source),
            buf: vec![0; capacity.max(1)],
            position: 0,
            count: 0,
            base: 0,
        }
    }

    /// Absolute offset of the next unconsumed byte, for diagnostics.
    pub fn offset(&self) -> usize {
        self.base + self.position
    }

    /// Bytes currently readable without touching the source.
    pub fn available(&self) -> usize {
        self.count - self.position
    }

    /// True once the source is closed and the window drained.
    pub fn is_exhausted(&self) -> bool {
        self.source.is_none() && self.position == self.count
    }

    /// Returns the next unconsumed byte without advancing, or `None` at end
    /// of source.
    pub fn peek(&mut self) -> Result<Option<u8>, ParseError> {
        if self.position == self.count {
            self.compact();
            if !self.load()? {
                return Ok(None);
            }
        }
        Ok(Some(self.buf[self.position]))
    }

    /// Consumes `n` bytes; the caller must have established availability via
    /// `peek` or `require`.
    pub fn advance(&mut self, n: usize) {
        debug_assert!(n <= self.available());
        self.position = (self.position + n).min(self.count);
    }

    /// Guarantees at least `n` readable bytes, compacting and refilling as
    /// needed (growing the window when `n` exceeds its capacity). Returns
    /// `false` when the source is exhausted first.
    pub fn require(&mut self, n: usize) -> Result<bool, ParseError> {
        if self.available() >= n {
            return Ok(true);
        }
        if n > self.buf.len() {
            self.buf.resize(n.next_power_of_two(), 0);
        }
        loop {
            self.compact();
            if !self.load()? {
                return Ok(self.available() >= n);
            }
            if self.available() >= n {
                return Ok(true);
            }
        }
    }

    /// Accumulates bytes into `out` until the literal `delimiter` is found
    /// and consumed, a newline is reached (left unconsumed, only when
    /// `stop_at_newline` is set), or the source is exhausted. The delimiter
    /// may span a reload boundary.
    pub fn scan_until(
        &mut self,
        delimiter: &[u8],
        out: &mut Vec<u8>,
        stop_at_newline: bool,
    ) -> Result<ScanOutcome, ParseError> {
        debug_assert!(!delimiter.is_empty());
        loop {
            let byte = match self.peek()? {
                Some(byte) => byte,
                None => return Ok(ScanOutcome::SourceExhausted),
            };
            if stop_at_newline && charspec::is_newline(byte) {
                return Ok(ScanOutcome::NewlineReached);
            }
            if byte == delimiter[0] {
                if self.require(delimiter.len())? {
                    if &self.buf[self.position..self.position + delimiter.len()] == delimiter {
                        self.position += delimiter.len();
                        return Ok(ScanOutcome::DelimiterFound);
                    }
                } else {
                    // The source ended inside a potential delimiter; the
                    // leftover bytes belong to the caller.
                    out.extend_from_slice(&self.buf[self.position..self.count]);
                    self.position = self.count;
                    return Ok(ScanOutcome::SourceExhausted);
                }
            }
            out.push(byte);
            self.position += 1;
        }
    }

    /// Skips contiguous space/newline runs and reports whether any byte was
    /// skipped; used by the tokenizer to detect separator boundaries.
    pub fn skip_whitespace_runs(&mut self) -> Result<bool, ParseError> {
        let mut skipped = false;
        while let Some(byte) = self.peek()? {
            if !charspec::is_whitespace(byte) {
                break;
            }
            self.position += 1;
            skipped = true;
        }
        Ok(skipped)
    }

    /// Moves unread bytes to the window start, preserving them all.
    fn compact(&mut self) {
        if self.position > 0 {
            self.buf.copy_within(self.position..self.count, 0);
            self.count -= self.position;
            self.base += self.position;
            self.position = 0;
        }
    }

    /// Refills the window tail from the source. Returns `false` on
    /// exhaustion, at which point the source is dropped exactly once.
    fn load(&mut self) -> Result<bool, ParseError> {
        debug_assert!(self.count < self.buf.len());
        loop {
            let source = match self.source.as_mut() {
                Some(source) => source,
                None => return Ok(false),
            };
            match source.read(&mut self.buf[self.count..]) {
                Ok(0) => {
                    self.source = None;
                    return Ok(false);
                }
                Ok(n) => {
                    self.count += n;
                    return Ok(true);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(ParseError::Io(e.to_string())),
            }
        }
    }
}
