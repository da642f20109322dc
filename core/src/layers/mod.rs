//! Layer variants: Linear, ReLU, Conv2D, MaxPool2D.
//!
//! Every variant is a stateless transform from one arena slice to another.
//! The set is closed by the wire format, so [`Layer`] is a plain enum and
//! dispatch is an exhaustive `match`.

pub mod activations;
pub mod conv;
pub mod dense;
pub mod pooling;

use static_assertions::assert_impl_all;

use crate::cursor::ByteCursor;
use crate::error::{SeqError, SeqResult};
use crate::format::LayerKind;

pub use activations::Relu;
pub use conv::Conv2D;
pub use dense::Linear;
pub use pooling::MaxPool2D;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shape {
    pub dims: [usize; 4],
    pub ndim: usize,
}

impl Shape {
    pub const fn d1(size: usize) -> Self {
        Self { dims: [size, 0, 0, 0], ndim: 1 }
    }
    pub const fn d3(c: usize, h: usize, w: usize) -> Self {
        Self { dims: [c, h, w, 0], ndim: 3 }
    }
    /// Element count, `None` on overflow.
    pub fn checked_total(&self) -> Option<usize> {
        self.dims[..self.ndim].iter().try_fold(1usize, |t, &d| t.checked_mul(d))
    }
    pub fn total(&self) -> usize {
        self.dims[..self.ndim].iter().product()
    }
    pub fn channels(&self) -> usize {
        if self.ndim >= 3 { self.dims[0] } else { 1 }
    }
    pub fn height(&self) -> usize {
        if self.ndim >= 3 { self.dims[1] } else { 0 }
    }
    pub fn width(&self) -> usize {
        if self.ndim >= 3 { self.dims[2] } else { 0 }
    }
}

/// Sliding window over the two spatial axes (kernel or pool).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub rows: usize,
    pub cols: usize,
    pub stride_rows: usize,
    pub stride_cols: usize,
}

impl Window {
    pub const fn new(rows: usize, cols: usize, stride_rows: usize, stride_cols: usize) -> Self {
        Self { rows, cols, stride_rows, stride_cols }
    }

    /// Output `(rows, cols)` in valid mode, `None` if the window does not fit.
    pub fn output_size(&self, in_rows: usize, in_cols: usize) -> Option<(usize, usize)> {
        Some((
            crate::math::valid_output_len(in_rows, self.rows, self.stride_rows)?,
            crate::math::valid_output_len(in_cols, self.cols, self.stride_cols)?,
        ))
    }
}

/// Capability shared by every layer variant.
///
/// `forward` reads exactly `input_len()` elements and writes exactly
/// `output_len()` elements. It depends only on the layer's own parameters and
/// the input, so repeated calls give identical results.
pub trait Forward {
    fn name(&self) -> &'static str;
    fn input_len(&self) -> usize;
    fn output_len(&self) -> usize;
    fn forward(&self, input: &[f32], output: &mut [f32]) -> SeqResult<()>;

    /// Reject slices that do not match the declared element counts.
    fn check_io(&self, input: &[f32], output: &[f32]) -> SeqResult<()> {
        if input.len() != self.input_len() {
            return Err(SeqError::DimensionMismatch { expected: self.input_len(), actual: input.len() });
        }
        if output.len() != self.output_len() {
            return Err(SeqError::DimensionMismatch { expected: self.output_len(), actual: output.len() });
        }
        Ok(())
    }
}

/// One parsed layer. Parameter tensors borrow from the model bytes (`'a`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Layer<'a> {
    Linear(Linear<'a>),
    Activation(Relu<'a>),
    Conv2D(Conv2D<'a>),
    MaxPool2D(MaxPool2D),
}

assert_impl_all!(Layer<'static>: Copy, Send, Sync);

impl<'a> Layer<'a> {
    pub fn kind(&self) -> LayerKind {
        match self {
            Self::Linear(_) => LayerKind::Linear,
            Self::Activation(_) => LayerKind::Activation,
            Self::Conv2D(_) => LayerKind::Conv2D,
            Self::MaxPool2D(_) => LayerKind::MaxPool2D,
        }
    }

    /// Read one record (tag + payload). An unknown tag aborts: its payload size
    /// is unknown, so nothing after it can be located.
    pub(crate) fn parse(cursor: &mut ByteCursor<'a>) -> SeqResult<Self> {
        let offset = cursor.offset();
        let tag = cursor.read_u32()?;
        let kind = LayerKind::from_tag(tag).ok_or(SeqError::UnknownLayerKind { tag, offset })?;
        let layer = match kind {
            LayerKind::Linear => Self::Linear(Linear::parse(cursor)?),
            LayerKind::Activation => Self::Activation(Relu::parse(cursor)?),
            LayerKind::Conv2D => Self::Conv2D(Conv2D::parse(cursor)?),
            LayerKind::MaxPool2D => Self::MaxPool2D(MaxPool2D::parse(cursor)?),
        };
        log::debug!(
            "parsed {} at byte {}: {} -> {}",
            layer.name(),
            offset,
            layer.input_len(),
            layer.output_len()
        );
        Ok(layer)
    }
}

impl Forward for Layer<'_> {
    fn name(&self) -> &'static str {
        match self {
            Self::Linear(l) => l.name(),
            Self::Activation(l) => l.name(),
            Self::Conv2D(l) => l.name(),
            Self::MaxPool2D(l) => l.name(),
        }
    }

    fn input_len(&self) -> usize {
        match self {
            Self::Linear(l) => l.input_len(),
            Self::Activation(l) => l.input_len(),
            Self::Conv2D(l) => l.input_len(),
            Self::MaxPool2D(l) => l.input_len(),
        }
    }

    fn output_len(&self) -> usize {
        match self {
            Self::Linear(l) => l.output_len(),
            Self::Activation(l) => l.output_len(),
            Self::Conv2D(l) => l.output_len(),
            Self::MaxPool2D(l) => l.output_len(),
        }
    }

    fn forward(&self, input: &[f32], output: &mut [f32]) -> SeqResult<()> {
        match self {
            Self::Linear(l) => l.forward(input, output),
            Self::Activation(l) => l.forward(input, output),
            Self::Conv2D(l) => l.forward(input, output),
            Self::MaxPool2D(l) => l.forward(input, output),
        }
    }
}

impl<'a> From<Linear<'a>> for Layer<'a> {
    fn from(l: Linear<'a>) -> Self {
        Self::Linear(l)
    }
}

impl<'a> From<Relu<'a>> for Layer<'a> {
    fn from(l: Relu<'a>) -> Self {
        Self::Activation(l)
    }
}

impl<'a> From<Conv2D<'a>> for Layer<'a> {
    fn from(l: Conv2D<'a>) -> Self {
        Self::Conv2D(l)
    }
}

impl From<MaxPool2D> for Layer<'_> {
    fn from(l: MaxPool2D) -> Self {
        Self::MaxPool2D(l)
    }
}
