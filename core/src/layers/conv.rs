//! Conv2D layer with kernels borrowed from the model bytes.

use super::{Forward, Shape, Window};
use crate::cursor::ByteCursor;
use crate::error::{SeqError, SeqResult};
use crate::format::{LayerKind, Padding};
use crate::math;
use crate::tensor::TensorView;

/// Valid-mode cross-correlation, `[in_c][h][w] -> [out_c][h'][w']` with
/// `h' = (h - kh) / stride_rows + 1` (same for width).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Conv2D<'a> {
    kernels: TensorView<'a>,
    bias: Option<TensorView<'a>>,
    input: Shape,
    output: Shape,
    window: Window,
    in_len: usize,
    out_len: usize,
}

impl<'a> Conv2D<'a> {
    pub fn new(
        kernels: TensorView<'a>, bias: Option<TensorView<'a>>,
        input: Shape, out_channels: usize, window: Window, padding: Padding,
    ) -> SeqResult<Self> {
        let invalid = |reason| SeqError::InvalidLayer { kind: LayerKind::Conv2D, reason };
        if padding == Padding::Same {
            return Err(SeqError::UnsupportedPadding { kind: LayerKind::Conv2D });
        }
        if input.ndim != 3 || input.dims[..3].contains(&0) || out_channels == 0 {
            return Err(invalid("zero-sized channels or spatial dimensions"));
        }
        let (out_h, out_w) = window
            .output_size(input.height(), input.width())
            .ok_or(invalid("kernel larger than input or zero kernel/stride"))?;
        let output = Shape::d3(out_channels, out_h, out_w);

        let expected = [out_channels, input.channels(), window.rows, window.cols]
            .iter()
            .try_fold(1usize, |t, &d| t.checked_mul(d))
            .ok_or(SeqError::DimensionOverflow)?;
        if kernels.len() != expected {
            return Err(SeqError::DimensionMismatch { expected, actual: kernels.len() });
        }
        if let Some(b) = bias {
            if b.len() != out_channels {
                return Err(SeqError::DimensionMismatch { expected: out_channels, actual: b.len() });
            }
        }

        let in_len = input.checked_total().ok_or(SeqError::DimensionOverflow)?;
        let out_len = output.checked_total().ok_or(SeqError::DimensionOverflow)?;
        Ok(Self { kernels, bias, input, output, window, in_len, out_len })
    }

    /// Payload: `in_c, out_c, in_rows, in_cols, kernel_rows, kernel_cols,
    /// stride_rows, stride_cols, padding, kernels[out_c*in_c*kh*kw], bias[out_c]`.
    pub(crate) fn parse(cursor: &mut ByteCursor<'a>) -> SeqResult<Self> {
        let in_channels = cursor.read_len()?;
        let out_channels = cursor.read_len()?;
        let input = Shape::d3(in_channels, cursor.read_len()?, cursor.read_len()?);
        let window = Window::new(cursor.read_len()?, cursor.read_len()?, cursor.read_len()?, cursor.read_len()?);

        let offset = cursor.offset();
        let selector = cursor.read_u32()?;
        let padding = Padding::from_selector(selector).ok_or(SeqError::UnknownPadding { selector, offset })?;
        if padding == Padding::Same {
            return Err(SeqError::UnsupportedPadding { kind: LayerKind::Conv2D });
        }

        let count = [out_channels, in_channels, window.rows, window.cols]
            .iter()
            .try_fold(1usize, |t, &d| t.checked_mul(d))
            .ok_or(SeqError::DimensionOverflow)?;
        let kernels = cursor.read_tensor(count)?;
        let bias = cursor.read_tensor(out_channels)?;
        Self::new(kernels, Some(bias), input, out_channels, window, padding)
    }

    pub fn input_shape(&self) -> Shape { self.input }
    pub fn output_shape(&self) -> Shape { self.output }
    pub fn window(&self) -> Window { self.window }
    pub fn kernels(&self) -> TensorView<'a> { self.kernels }
    pub fn bias(&self) -> Option<TensorView<'a>> { self.bias }
}

impl Forward for Conv2D<'_> {
    fn name(&self) -> &'static str { "Conv2D" }
    fn input_len(&self) -> usize { self.in_len }
    fn output_len(&self) -> usize { self.out_len }

    fn forward(&self, input: &[f32], output: &mut [f32]) -> SeqResult<()> {
        self.check_io(input, output)?;
        math::conv2d_valid(input, &self.input, self.kernels, self.bias, &self.window, output, &self.output);
        Ok(())
    }
}
