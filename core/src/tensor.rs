//! Borrowed little-endian views into the serialized model.
//!
//! Layers never copy their weights. A [`View`] keeps a `&'a [u8]` slice of the
//! caller's model buffer and decodes one element per access, so the buffer
//! needs no particular alignment and the host byte order does not matter.
//!
//! The lifetime `'a` is the lifetime of the model bytes: every layer, and
//! therefore every model, is bound to it by the borrow checker.

use core::fmt;
use core::marker::PhantomData;

use crate::error::{SeqError, SeqResult};
use crate::format::WORD;

/// A 4-byte scalar stored little-endian in the model buffer.
pub trait LeWord: Copy {
    fn from_le_word(word: [u8; WORD]) -> Self;
}

impl LeWord for f32 {
    #[inline(always)]
    fn from_le_word(word: [u8; WORD]) -> Self {
        f32::from_le_bytes(word)
    }
}

impl LeWord for u32 {
    #[inline(always)]
    fn from_le_word(word: [u8; WORD]) -> Self {
        u32::from_le_bytes(word)
    }
}

/// Non-owning view of `len()` little-endian words.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct View<'a, T> {
    bytes: &'a [u8],
    _elem: PhantomData<T>,
}

/// Weights, kernels and biases.
pub type TensorView<'a> = View<'a, f32>;

/// Per-dimension sizes of an activation shape.
pub type DimsView<'a> = View<'a, u32>;

impl<'a, T: LeWord> View<'a, T> {
    /// Wrap raw little-endian bytes. The length must be a whole number of words.
    pub fn from_le_bytes(bytes: &'a [u8]) -> SeqResult<Self> {
        if bytes.len() % WORD != 0 {
            return Err(SeqError::Truncated {
                offset: bytes.len() - bytes.len() % WORD,
                needed: WORD,
                remaining: bytes.len() % WORD,
            });
        }
        Ok(Self { bytes, _elem: PhantomData })
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.bytes.len() / WORD
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<T> {
        let start = index.checked_mul(WORD)?;
        let chunk = self.bytes.get(start..start.checked_add(WORD)?)?;
        Some(T::from_le_word([chunk[0], chunk[1], chunk[2], chunk[3]]))
    }

    /// Element at `index`. Panics when out of bounds, like slice indexing.
    #[inline(always)]
    pub fn at(&self, index: usize) -> T {
        let start = index * WORD;
        let c = &self.bytes[start..start + WORD];
        T::from_le_word([c[0], c[1], c[2], c[3]])
    }

    /// Sub-view of `len` elements starting at element `start`.
    pub fn slice(&self, start: usize, len: usize) -> Option<Self> {
        let begin = start.checked_mul(WORD)?;
        let end = begin.checked_add(len.checked_mul(WORD)?)?;
        let bytes = self.bytes.get(begin..end)?;
        Some(Self { bytes, _elem: PhantomData })
    }

    pub fn iter(&self) -> impl Iterator<Item = T> + 'a
    where
        T: 'a,
    {
        self.bytes
            .chunks_exact(WORD)
            .map(|c| T::from_le_word([c[0], c[1], c[2], c[3]]))
    }

    /// The underlying bytes, still borrowed from the model buffer.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }
}

impl<T: LeWord + fmt::Debug> fmt::Debug for View<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("len", &self.len())
            .field("first", &self.get(0))
            .finish()
    }
}

impl DimsView<'_> {
    /// Product of all dimensions, `None` on overflow.
    pub fn element_count(&self) -> Option<usize> {
        self.iter().try_fold(1usize, |acc, d| acc.checked_mul(usize::try_from(d).ok()?))
    }
}
