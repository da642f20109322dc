//! ReLU activation layer.

use super::Forward;
use crate::cursor::ByteCursor;
use crate::error::{SeqError, SeqResult};
use crate::format::LayerKind;
use crate::math;
use crate::tensor::DimsView;

/// max(0, x) over a flattened shape. Zero parameters.
///
/// The element count is the product of the declared dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relu<'a> {
    shape: DimsView<'a>,
    len: usize,
}

impl<'a> Relu<'a> {
    pub fn new(shape: DimsView<'a>) -> SeqResult<Self> {
        if shape.is_empty() {
            return Err(SeqError::InvalidLayer { kind: LayerKind::Activation, reason: "shape has no dimensions" });
        }
        if shape.iter().any(|d| d == 0) {
            return Err(SeqError::InvalidLayer { kind: LayerKind::Activation, reason: "zero-sized dimension" });
        }
        let len = shape.element_count().ok_or(SeqError::DimensionOverflow)?;
        Ok(Self { shape, len })
    }

    /// Payload: `dim_count, dims[dim_count]`.
    pub(crate) fn parse(cursor: &mut ByteCursor<'a>) -> SeqResult<Self> {
        let ndim = cursor.read_len()?;
        let shape = cursor.read_dims(ndim)?;
        Self::new(shape)
    }

    pub fn shape(&self) -> DimsView<'a> {
        self.shape
    }
}

impl Forward for Relu<'_> {
    fn name(&self) -> &'static str { "ReLU" }
    fn input_len(&self) -> usize { self.len }
    fn output_len(&self) -> usize { self.len }

    fn forward(&self, input: &[f32], output: &mut [f32]) -> SeqResult<()> {
        self.check_io(input, output)?;
        math::relu(input, output);
        Ok(())
    }
}
