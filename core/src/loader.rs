//! Model deserialization.
//!
//! [`ModelReader`] walks the byte buffer once, yielding borrowed [`Layer`]s.
//! [`validate`] runs that walk against the caller's capacities and produces a
//! [`ModelInfo`] without writing to any caller buffer, so a model is either
//! bound completely or not at all.

use crate::cursor::ByteCursor;
use crate::error::{SeqError, SeqResult};
use crate::format::HEADER_LEN;
use crate::layers::{Forward, Layer};

/// Fixed-width header at the start of the model bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelHeader {
    /// Number of layer records that follow.
    pub layer_count: usize,
    /// Minimum floats per arena bank, as computed by the converter.
    pub min_bank_width: usize,
}

/// Header plus a cursor positioned on the first record.
#[derive(Debug, Clone)]
pub struct ModelReader<'a> {
    header: ModelHeader,
    records: ByteCursor<'a>,
}

impl<'a> ModelReader<'a> {
    pub fn new(bytes: &'a [u8]) -> SeqResult<Self> {
        let mut cursor = ByteCursor::new(bytes);
        let layer_count = cursor.read_len()?;
        let min_bank_width = cursor.read_len()?;
        debug_assert_eq!(cursor.offset(), HEADER_LEN);
        Ok(Self {
            header: ModelHeader { layer_count, min_bank_width },
            records: cursor,
        })
    }

    pub fn header(&self) -> ModelHeader {
        self.header
    }

    /// Iterate records until the bytes are exhausted. The first error ends
    /// the iteration.
    pub fn layers(&self) -> Records<'a> {
        Records { cursor: self.records.clone(), failed: false }
    }
}

/// Iterator over the layer records of a model.
#[derive(Debug, Clone)]
pub struct Records<'a> {
    cursor: ByteCursor<'a>,
    failed: bool,
}

impl<'a> Iterator for Records<'a> {
    type Item = SeqResult<Layer<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.cursor.is_empty() {
            return None;
        }
        let record = Layer::parse(&mut self.cursor);
        self.failed = record.is_err();
        Some(record)
    }
}

/// Caller-provided limits checked during validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capacity {
    /// Length of the layer-slot array.
    pub layer_slots: usize,
    /// Length of the arena in floats (both banks).
    pub arena_len: usize,
}

impl Capacity {
    pub const UNBOUNDED: Self = Self { layer_slots: usize::MAX, arena_len: usize::MAX };

    pub const fn new(layer_slots: usize, arena_len: usize) -> Self {
        Self { layer_slots, arena_len }
    }
}

/// Summary of a validated model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelInfo {
    pub layer_count: usize,
    /// Per-bank width declared in the header.
    pub declared_width: usize,
    /// Largest input or output length of any layer.
    pub derived_width: usize,
    /// Elements the caller writes before `predict()`.
    pub input_len: usize,
    /// Elements available after `predict()`.
    pub output_len: usize,
}

impl ModelInfo {
    /// Full validation with no capacity limits. Use it to size static buffers.
    pub fn inspect(bytes: &[u8]) -> SeqResult<Self> {
        validate(bytes, Capacity::UNBOUNDED)
    }

    /// Floats each bank must hold.
    pub fn bank_width(&self) -> usize {
        self.declared_width.max(self.derived_width)
    }

    /// Minimum arena length in floats (two banks).
    pub fn required_arena_len(&self) -> SeqResult<usize> {
        self.bank_width().checked_mul(2).ok_or(SeqError::DimensionOverflow)
    }
}

fn check_arena(width: usize, arena_len: usize) -> SeqResult<()> {
    let required = width.checked_mul(2).ok_or(SeqError::ArenaTooSmall {
        required: usize::MAX,
        available: arena_len,
    })?;
    if required > arena_len {
        return Err(SeqError::ArenaTooSmall { required, available: arena_len });
    }
    Ok(())
}

/// Parse and check the whole model against `capacity`.
///
/// Order of checks: declared layer count against slots, declared width against
/// the arena, every record (format, geometry, padding, slot overflow), chaining
/// of element counts, parsed count against the header, derived width against
/// the arena.
pub fn validate(bytes: &[u8], capacity: Capacity) -> SeqResult<ModelInfo> {
    let reader = ModelReader::new(bytes)?;
    let header = reader.header();

    if header.layer_count > capacity.layer_slots {
        return Err(SeqError::TooManyLayers { required: header.layer_count, capacity: capacity.layer_slots });
    }
    check_arena(header.min_bank_width, capacity.arena_len)?;

    let mut parsed = 0usize;
    let mut derived_width = 0usize;
    let mut input_len = 0usize;
    let mut prev_output: Option<usize> = None;

    for record in reader.layers() {
        let layer = record?;
        if parsed == capacity.layer_slots {
            return Err(SeqError::TooManyLayers { required: parsed + 1, capacity: capacity.layer_slots });
        }
        match prev_output {
            None => input_len = layer.input_len(),
            Some(actual) if actual != layer.input_len() => {
                return Err(SeqError::ShapeMismatch { layer: parsed, expected: layer.input_len(), actual });
            }
            Some(_) => {}
        }
        derived_width = derived_width.max(layer.input_len()).max(layer.output_len());
        prev_output = Some(layer.output_len());
        parsed += 1;
    }

    let output_len = prev_output.ok_or(SeqError::EmptyModel)?;
    if parsed != header.layer_count {
        return Err(SeqError::LayerCountMismatch { declared: header.layer_count, parsed });
    }
    check_arena(derived_width, capacity.arena_len)?;

    Ok(ModelInfo {
        layer_count: parsed,
        declared_width: header.min_bank_width,
        derived_width,
        input_len,
        output_len,
    })
}
