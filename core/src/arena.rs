//! Double-buffered workspace over a caller-owned `&mut [f32]`.
//!
//! The buffer is split into two equal banks. Layer `i` reads bank A when `i`
//! is even and bank B when `i` is odd, and writes the other one, so a chain of
//! any length runs in `2 * width` floats with no allocation.
//!
//! ```text
//! [ bank A : len/2 ][ bank B : len/2 ]
//! ```

use crate::error::{SeqError, SeqResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bank {
    A,
    B,
}

impl Bank {
    /// Bank layer `index` reads from.
    #[inline(always)]
    pub const fn input_of(index: usize) -> Self {
        if index % 2 == 0 { Self::A } else { Self::B }
    }

    /// Bank layer `index` writes to.
    #[inline(always)]
    pub const fn output_of(index: usize) -> Self {
        Self::input_of(index).other()
    }

    /// Bank holding the result after `layer_count` layers have run.
    #[inline(always)]
    pub const fn result_of(layer_count: usize) -> Self {
        Self::input_of(layer_count)
    }

    #[inline(always)]
    pub const fn other(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }
}

/// Two-bank scratch buffer borrowed from the caller.
pub struct Workspace<'a> {
    buf: &'a mut [f32],
    bank_len: usize,
}

impl<'a> Workspace<'a> {
    /// Split `buf` into two banks of `buf.len() / 2` floats. An odd trailing
    /// element is never touched.
    pub fn new(buf: &'a mut [f32]) -> Self {
        let bank_len = buf.len() / 2;
        Self { buf, bank_len }
    }

    /// Floats per bank.
    #[inline(always)]
    pub fn bank_len(&self) -> usize {
        self.bank_len
    }

    /// Total floats provided by the caller.
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    fn range(&self, bank: Bank) -> core::ops::Range<usize> {
        match bank {
            Bank::A => 0..self.bank_len,
            Bank::B => self.bank_len..2 * self.bank_len,
        }
    }

    pub fn bank(&self, bank: Bank) -> &[f32] {
        &self.buf[self.range(bank)]
    }

    pub fn bank_mut(&mut self, bank: Bank) -> &mut [f32] {
        let range = self.range(bank);
        &mut self.buf[range]
    }

    /// Borrow `in_len` floats of `src` for reading and `out_len` floats of the
    /// other bank for writing.
    pub fn io(&mut self, src: Bank, in_len: usize, out_len: usize) -> SeqResult<(&[f32], &mut [f32])> {
        let bank_len = self.bank_len;
        let too_small = |len: usize| SeqError::ArenaTooSmall {
            required: len.saturating_mul(2),
            available: 2 * bank_len,
        };
        let (a, b) = self.buf[..2 * bank_len].split_at_mut(bank_len);
        let (read, write) = match src {
            Bank::A => (&*a, b),
            Bank::B => (&*b, a),
        };
        let read = read.get(..in_len).ok_or(too_small(in_len))?;
        let write = write.get_mut(..out_len).ok_or(too_small(out_len))?;
        Ok((read, write))
    }

    /// Zero both banks.
    pub fn clear(&mut self) {
        self.buf.fill(0.0);
    }
}
