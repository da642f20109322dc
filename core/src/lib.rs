//! # seqnet-core: allocation-free sequential network inference
//!
//! A `no_std` library that runs feed-forward f32 networks described by a
//! serialized byte buffer, on targets with no heap.
//!
//! ## Architecture
//!
//! - **Layer variants**: Linear, ReLU, Conv2D, MaxPool2D as a closed enum
//! - **Loader**: bounds-checked cursor over the model bytes; layers borrow
//!   their weights straight from the buffer
//! - **Workspace**: caller-provided `&mut [f32]` split into two banks that
//!   alternate as layer input and output
//! - **SequentialModel**: owns nothing, drives one forward pass per `predict()`
//!
//! ## Usage
//!
//! ```ignore
//! use seqnet_core::*;
//!
//! static MODEL: &[u8] = include_bytes!("sine_model.bin");
//!
//! let mut slots: [LayerSlot; 8] = [None; 8];
//! let mut arena = [0.0f32; 64];
//! let mut model = SequentialModel::new(MODEL, &mut slots, &mut arena)?;
//!
//! model.input_mut()[0] = 1.57;
//! model.predict()?;
//! let y = model.output()[0];
//! ```

#![no_std]

#[cfg(feature = "std")]
extern crate std;

pub mod arena;
pub mod cursor;
pub mod error;
pub mod format;
pub mod layers;
pub mod loader;
pub mod math;
pub mod model;
pub mod tensor;

// Re-export primary types
pub use arena::{Bank, Workspace};
pub use error::{ErrorKind, SeqError, SeqResult};
pub use format::{LayerKind, Padding};
pub use layers::{Conv2D, Forward, Layer, Linear, MaxPool2D, Relu, Shape, Window};
pub use loader::{validate, Capacity, ModelHeader, ModelInfo, ModelReader};
pub use model::{LayerSlot, LayerTrace, SequentialModel};
pub use tensor::{DimsView, TensorView};
