//! MaxPool2D layer. No learned parameters.

use super::{Forward, Shape, Window};
use crate::cursor::ByteCursor;
use crate::error::{SeqError, SeqResult};
use crate::format::{LayerKind, Padding};
use crate::math;

/// `[c][h][w] -> [c][h'][w']`, maximum over each strided window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaxPool2D {
    input: Shape,
    output: Shape,
    window: Window,
    in_len: usize,
    out_len: usize,
}

impl MaxPool2D {
    pub fn new(input: Shape, window: Window, padding: Padding) -> SeqResult<Self> {
        let invalid = |reason| SeqError::InvalidLayer { kind: LayerKind::MaxPool2D, reason };
        if padding == Padding::Same {
            return Err(SeqError::UnsupportedPadding { kind: LayerKind::MaxPool2D });
        }
        if input.ndim != 3 || input.dims[..3].contains(&0) {
            return Err(invalid("zero-sized channels or spatial dimensions"));
        }
        let (out_h, out_w) = window
            .output_size(input.height(), input.width())
            .ok_or(invalid("pool window larger than input or zero window/stride"))?;
        let output = Shape::d3(input.channels(), out_h, out_w);
        let in_len = input.checked_total().ok_or(SeqError::DimensionOverflow)?;
        let out_len = output.checked_total().ok_or(SeqError::DimensionOverflow)?;
        Ok(Self { input, output, window, in_len, out_len })
    }

    /// Square window with equal strides (e.g. 2×2 with stride 2).
    pub fn square(input: Shape, size: usize, stride: usize) -> SeqResult<Self> {
        Self::new(input, Window::new(size, size, stride, stride), Padding::Valid)
    }

    /// Payload: `channels, in_rows, in_cols, pool_rows, pool_cols,
    /// stride_rows, stride_cols, padding`.
    pub(crate) fn parse(cursor: &mut ByteCursor<'_>) -> SeqResult<Self> {
        let input = Shape::d3(cursor.read_len()?, cursor.read_len()?, cursor.read_len()?);
        let window = Window::new(cursor.read_len()?, cursor.read_len()?, cursor.read_len()?, cursor.read_len()?);
        let offset = cursor.offset();
        let selector = cursor.read_u32()?;
        let padding = Padding::from_selector(selector).ok_or(SeqError::UnknownPadding { selector, offset })?;
        Self::new(input, window, padding)
    }

    pub fn input_shape(&self) -> Shape { self.input }
    pub fn output_shape(&self) -> Shape { self.output }
    pub fn window(&self) -> Window { self.window }
}

impl Forward for MaxPool2D {
    fn name(&self) -> &'static str { "MaxPool2D" }
    fn input_len(&self) -> usize { self.in_len }
    fn output_len(&self) -> usize { self.out_len }

    fn forward(&self, input: &[f32], output: &mut [f32]) -> SeqResult<()> {
        self.check_io(input, output)?;
        math::max_pool_2d(input, &self.input, &self.window, output, &self.output);
        Ok(())
    }
}
