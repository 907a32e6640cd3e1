//! Read-only seekable stream over an in-memory buffer.
//!
//! The decoder engine pulls its input through [`ByteStream`]. [`MemoryStream`]
//! serves a caller-owned byte slice: reads are all-or-nothing, seeks may go
//! backward, and writes always fail.

/// Stream failures surfaced to the decoder engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum StreamError {
    #[error("read of {requested} bytes at offset {position} exceeds stream length {len}")]
    ReadPastEnd {
        position: usize,
        requested: usize,
        len: usize,
    },

    #[error("seek to {requested} exceeds stream length {len}")]
    SeekPastEnd { requested: usize, len: usize },

    #[error("stream is read-only")]
    ReadOnly,

    #[error("decoder engine reported a stream failure")]
    EngineReported,
}

/// Capability set the decoder engine needs from its input.
pub trait ByteStream {
    /// Fill `dst` completely or fail without consuming anything.
    fn read(&mut self, dst: &mut [u8]) -> Result<(), StreamError>;

    /// Write `src` at the cursor.
    fn write(&mut self, src: &[u8]) -> Result<(), StreamError>;

    /// Move the cursor to an absolute offset.
    fn set_position(&mut self, pos: usize) -> Result<(), StreamError>;

    fn position(&self) -> usize;

    fn is_at_end(&self) -> bool;

    /// Release the stream. Called by the engine when it lets go of its input.
    fn close(&mut self) -> Result<(), StreamError>;
}

/// [`ByteStream`] over a borrowed, fully resident byte buffer.
///
/// Invariant: `pos <= data.len()`.
#[derive(Debug, Clone)]
pub struct MemoryStream<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> MemoryStream<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Total length of the backing buffer.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes left between the cursor and the end.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }
}

impl ByteStream for MemoryStream<'_> {
    fn read(&mut self, dst: &mut [u8]) -> Result<(), StreamError> {
        let err = StreamError::ReadPastEnd {
            position: self.pos,
            requested: dst.len(),
            len: self.data.len(),
        };
        let end = self.pos.checked_add(dst.len()).ok_or(err)?;
        let src = self.data.get(self.pos..end).ok_or(err)?;
        dst.copy_from_slice(src);
        self.pos = end;
        Ok(())
    }

    fn write(&mut self, _src: &[u8]) -> Result<(), StreamError> {
        Err(StreamError::ReadOnly)
    }

    fn set_position(&mut self, pos: usize) -> Result<(), StreamError> {
        if pos > self.data.len() {
            return Err(StreamError::SeekPastEnd {
                requested: pos,
                len: self.data.len(),
            });
        }
        self.pos = pos;
        Ok(())
    }

    fn position(&self) -> usize {
        self.pos
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.data.len()
    }

    fn close(&mut self) -> Result<(), StreamError> {
        // The buffer belongs to the caller.
        Ok(())
    }
}
