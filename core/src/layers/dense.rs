//! Fully-connected layer with weights borrowed from the model bytes.

use super::Forward;
use crate::cursor::ByteCursor;
use crate::error::{SeqError, SeqResult};
use crate::format::LayerKind;
use crate::math;
use crate::tensor::TensorView;

/// `output = W · input + bias`, `W` stored row-major by output index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Linear<'a> {
    weights: TensorView<'a>,
    bias: TensorView<'a>,
    in_features: usize,
    out_features: usize,
}

impl<'a> Linear<'a> {
    pub fn new(
        weights: TensorView<'a>, bias: TensorView<'a>,
        in_features: usize, out_features: usize,
    ) -> SeqResult<Self> {
        if in_features == 0 || out_features == 0 {
            return Err(SeqError::InvalidLayer { kind: LayerKind::Linear, reason: "zero-sized input or output" });
        }
        let expected = out_features.checked_mul(in_features).ok_or(SeqError::DimensionOverflow)?;
        if weights.len() != expected {
            return Err(SeqError::DimensionMismatch { expected, actual: weights.len() });
        }
        if bias.len() != out_features {
            return Err(SeqError::DimensionMismatch { expected: out_features, actual: bias.len() });
        }
        Ok(Self { weights, bias, in_features, out_features })
    }

    /// Payload: `output_size, input_size, weights[out*in], bias[out]`.
    pub(crate) fn parse(cursor: &mut ByteCursor<'a>) -> SeqResult<Self> {
        let out_features = cursor.read_len()?;
        let in_features = cursor.read_len()?;
        let count = out_features.checked_mul(in_features).ok_or(SeqError::DimensionOverflow)?;
        let weights = cursor.read_tensor(count)?;
        let bias = cursor.read_tensor(out_features)?;
        Self::new(weights, bias, in_features, out_features)
    }

    pub fn weights(&self) -> TensorView<'a> { self.weights }
    pub fn bias(&self) -> TensorView<'a> { self.bias }
}

impl Forward for Linear<'_> {
    fn name(&self) -> &'static str { "Linear" }
    fn input_len(&self) -> usize { self.in_features }
    fn output_len(&self) -> usize { self.out_features }

    fn forward(&self, input: &[f32], output: &mut [f32]) -> SeqResult<()> {
        self.check_io(input, output)?;
        math::linear(input, self.weights, self.bias, output);
        Ok(())
    }
}
