//! Serialized model format constants.
//!
//! ```text
//! header : layer_count u32 | min_bank_width u32
//! record : tag u32 | payload (kind specific)
//! ```
//!
//! Every scalar is a little-endian 32-bit word. The layout is shared with the
//! offline converter and must not change.

use static_assertions::const_assert_eq;

/// Width in bytes of every scalar field (u32 counts and f32 values).
pub const WORD: usize = 4;

/// Fixed header size: layer count followed by the minimum per-bank width.
pub const HEADER_LEN: usize = 2 * WORD;

pub const TAG_LINEAR: u32 = 0x00;
pub const TAG_RELU: u32 = 0x01;
pub const TAG_CONV2D: u32 = 0x02;
pub const TAG_MAXPOOL2D: u32 = 0x03;

pub const PADDING_VALID: u32 = 0x00;
pub const PADDING_SAME: u32 = 0x01;

const_assert_eq!(core::mem::size_of::<u32>(), WORD);
const_assert_eq!(core::mem::size_of::<f32>(), WORD);

/// The closed set of layer kinds the format can describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    Linear,
    Activation,
    Conv2D,
    MaxPool2D,
}

impl LayerKind {
    pub const fn from_tag(tag: u32) -> Option<Self> {
        match tag {
            TAG_LINEAR => Some(Self::Linear),
            TAG_RELU => Some(Self::Activation),
            TAG_CONV2D => Some(Self::Conv2D),
            TAG_MAXPOOL2D => Some(Self::MaxPool2D),
            _ => None,
        }
    }

    pub const fn tag(self) -> u32 {
        match self {
            Self::Linear => TAG_LINEAR,
            Self::Activation => TAG_RELU,
            Self::Conv2D => TAG_CONV2D,
            Self::MaxPool2D => TAG_MAXPOOL2D,
        }
    }
}

/// Spatial padding mode of Conv2D and MaxPool2D records.
///
/// Only `Valid` has numeric behavior; `Same` is recognized so that it can be
/// rejected explicitly instead of being misread as an unknown selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Padding {
    Valid,
    Same,
}

impl Padding {
    pub const fn from_selector(selector: u32) -> Option<Self> {
        match selector {
            PADDING_VALID => Some(Self::Valid),
            PADDING_SAME => Some(Self::Same),
            _ => None,
        }
    }
}
