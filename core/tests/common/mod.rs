//! Test-side serializer producing the same bytes as the offline converter.

#![allow(dead_code)]

use seqnet_core::LayerKind;

pub use seqnet_core::format::{PADDING_SAME as SAME, PADDING_VALID as VALID};

pub const LINEAR: u32 = LayerKind::Linear.tag();
pub const RELU: u32 = LayerKind::Activation.tag();
pub const CONV2D: u32 = LayerKind::Conv2D.tag();
pub const MAXPOOL2D: u32 = LayerKind::MaxPool2D.tag();

pub fn f32_bytes(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

#[derive(Debug, Clone, Default)]
pub struct ModelBuilder {
    records: u32,
    declared_layers: Option<u32>,
    width: u32,
    body: Vec<u8>,
}

impl ModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Minimum per-bank width written to the header.
    pub fn width(mut self, width: u32) -> Self {
        self.width = width;
        self
    }

    /// Override the header layer count (defaults to the number of records).
    pub fn declared_layers(mut self, count: u32) -> Self {
        self.declared_layers = Some(count);
        self
    }

    fn word(&mut self, v: u32) {
        self.body.extend_from_slice(&v.to_le_bytes());
    }

    fn floats(&mut self, values: &[f32]) {
        self.body.extend(f32_bytes(values));
    }

    pub fn linear(mut self, out: u32, inp: u32, weights: &[f32], bias: &[f32]) -> Self {
        self.records += 1;
        self.word(LINEAR);
        self.word(out);
        self.word(inp);
        self.floats(weights);
        self.floats(bias);
        self
    }

    pub fn relu(mut self, dims: &[u32]) -> Self {
        self.records += 1;
        self.word(RELU);
        self.word(dims.len() as u32);
        for &d in dims {
            self.word(d);
        }
        self
    }

    /// `geometry` = (in_c, out_c, rows, cols), `kernel`/`stride` = (rows, cols).
    pub fn conv2d(
        mut self,
        geometry: (u32, u32, u32, u32),
        kernel: (u32, u32),
        stride: (u32, u32),
        padding: u32,
        kernels: &[f32],
        bias: &[f32],
    ) -> Self {
        self.records += 1;
        let (in_c, out_c, rows, cols) = geometry;
        for w in [CONV2D, in_c, out_c, rows, cols, kernel.0, kernel.1, stride.0, stride.1, padding] {
            self.word(w);
        }
        self.floats(kernels);
        self.floats(bias);
        self
    }

    /// `input` = (channels, rows, cols), `pool`/`stride` = (rows, cols).
    pub fn max_pool(mut self, input: (u32, u32, u32), pool: (u32, u32), stride: (u32, u32), padding: u32) -> Self {
        self.records += 1;
        for w in [MAXPOOL2D, input.0, input.1, input.2, pool.0, pool.1, stride.0, stride.1, padding] {
            self.word(w);
        }
        self
    }

    /// Append raw words without counting a record.
    pub fn raw(mut self, words: &[u32]) -> Self {
        for &w in words {
            self.word(w);
        }
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(8 + self.body.len());
        out.extend_from_slice(&self.declared_layers.unwrap_or(self.records).to_le_bytes());
        out.extend_from_slice(&self.width.to_le_bytes());
        out.extend_from_slice(&self.body);
        out
    }
}

pub fn identity(n: usize) -> Vec<f32> {
    let mut w = vec![0.0; n * n];
    for i in 0..n {
        w[i * n + i] = 1.0;
    }
    w
}
