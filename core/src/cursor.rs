//! Offset-tracked reader over the model bytes.

use crate::error::{SeqError, SeqResult};
use crate::format::WORD;
use crate::tensor::{DimsView, TensorView, View};

/// Forward-only cursor. Every read is bounds-checked and reports the offset it
/// failed at; nothing is consumed on failure.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    buf: &'a [u8],
    offset: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, offset: 0 }
    }

    #[inline(always)]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[inline(always)]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.offset
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Take the next `len` bytes.
    pub fn take(&mut self, len: usize) -> SeqResult<&'a [u8]> {
        let truncated = SeqError::Truncated {
            offset: self.offset,
            needed: len,
            remaining: self.remaining(),
        };
        let end = self.offset.checked_add(len).ok_or(truncated)?;
        let bytes = self.buf.get(self.offset..end).ok_or(truncated)?;
        self.offset = end;
        Ok(bytes)
    }

    pub fn read_u32(&mut self) -> SeqResult<u32> {
        let b = self.take(WORD)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Read a u32 count or size as `usize`.
    pub fn read_len(&mut self) -> SeqResult<usize> {
        let v = self.read_u32()?;
        usize::try_from(v).map_err(|_| SeqError::DimensionOverflow)
    }

    /// Borrow `count` f32 values without copying.
    pub fn read_tensor(&mut self, count: usize) -> SeqResult<TensorView<'a>> {
        self.read_view(count)
    }

    /// Borrow `count` u32 dimension sizes without copying.
    pub fn read_dims(&mut self, count: usize) -> SeqResult<DimsView<'a>> {
        self.read_view(count)
    }

    fn read_view<T: crate::tensor::LeWord>(&mut self, count: usize) -> SeqResult<View<'a, T>> {
        let len = count.checked_mul(WORD).ok_or(SeqError::DimensionOverflow)?;
        View::from_le_bytes(self.take(len)?)
    }
}
