//! Error types for seqnet-core.
//!
//! Every fallible operation returns `SeqResult<T>`. Malformed model bytes,
//! undersized buffers and unsupported features are all reported during
//! construction; nothing in this crate panics on caller-supplied data.

use thiserror::Error;

use crate::format::LayerKind;

/// Broad category of a [`SeqError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed header, unknown tag, truncated payload or inconsistent shapes.
    Format,
    /// Layer slots or arena too small for the model.
    Capacity,
    /// Declared by the format but not implemented (e.g. same padding).
    Unsupported,
    /// A forward call received slices of the wrong length.
    Runtime,
    /// `predict()` on a model whose construction failed.
    NotReady,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SeqError {
    #[error("model truncated at byte {offset}: needed {needed} bytes, {remaining} remaining")]
    Truncated {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    #[error("unknown layer kind tag {tag:#04x} at byte {offset}")]
    UnknownLayerKind { tag: u32, offset: usize },

    #[error("unknown padding selector {selector} at byte {offset}")]
    UnknownPadding { selector: u32, offset: usize },

    #[error("invalid {kind:?} layer: {reason}")]
    InvalidLayer {
        kind: LayerKind,
        reason: &'static str,
    },

    #[error("dimension product does not fit in usize")]
    DimensionOverflow,

    #[error("model declares no layers")]
    EmptyModel,

    #[error("header declares {declared} layers but {parsed} records were found")]
    LayerCountMismatch { declared: usize, parsed: usize },

    #[error("layer {layer} expects {expected} inputs but the previous layer produces {actual}")]
    ShapeMismatch {
        layer: usize,
        expected: usize,
        actual: usize,
    },

    #[error("model needs {required} layer slots but only {capacity} were provided")]
    TooManyLayers { required: usize, capacity: usize },

    #[error("arena needs {required} floats but only {available} were provided")]
    ArenaTooSmall { required: usize, available: usize },

    #[error("{kind:?} layer uses same padding, only valid padding is supported")]
    UnsupportedPadding { kind: LayerKind },

    #[error("dimension mismatch: expected {expected} elements, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("model is not ready ({0:?} error during construction)")]
    NotReady(ErrorKind),
}

impl SeqError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Truncated { .. }
            | Self::UnknownLayerKind { .. }
            | Self::UnknownPadding { .. }
            | Self::InvalidLayer { .. }
            | Self::DimensionOverflow
            | Self::EmptyModel
            | Self::LayerCountMismatch { .. }
            | Self::ShapeMismatch { .. } => ErrorKind::Format,
            Self::TooManyLayers { .. } | Self::ArenaTooSmall { .. } => ErrorKind::Capacity,
            Self::UnsupportedPadding { .. } => ErrorKind::Unsupported,
            Self::DimensionMismatch { .. } => ErrorKind::Runtime,
            Self::NotReady(_) => ErrorKind::NotReady,
        }
    }
}

pub type SeqResult<T> = Result<T, SeqError>;
