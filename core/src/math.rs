//! f32 kernels behind the layer variants.
//!
//! Kernels assume their callers already checked slice lengths against the
//! layer geometry (see `layers`). Inputs and outputs are flat, channel-major
//! `[c][row][col]` buffers; weights are borrowed [`TensorView`]s.

use crate::layers::{Shape, Window};
use crate::tensor::TensorView;

// =============================================================================
// Fully connected
// =============================================================================

/// `output[o] = bias[o] + sum_i weights[o * in + i] * input[i]`
///
/// Weight rows are indexed by output position.
pub fn linear(input: &[f32], weights: TensorView<'_>, bias: TensorView<'_>, output: &mut [f32]) {
    let in_len = input.len();
    for (o, out) in output.iter_mut().enumerate() {
        let mut acc = 0.0f32;
        for (i, &x) in input.iter().enumerate() {
            acc += weights.at(o * in_len + i) * x;
        }
        *out = acc + bias.at(o);
    }
}

// =============================================================================
// Activations
// =============================================================================

/// `output[i] = max(0, input[i])`
pub fn relu(input: &[f32], output: &mut [f32]) {
    for (out, &x) in output.iter_mut().zip(input) {
        *out = if x > 0.0 { x } else { 0.0 };
    }
}

// =============================================================================
// Convolution
// =============================================================================

/// Valid-mode 2D cross-correlation.
///
/// Input:  `[in_c][in_h][in_w]`
/// Kernel: `[out_c][in_c][kh][kw]`
/// Output: `[out_c][out_h][out_w]`, plus `bias[n]` per output channel when
/// a bias is present.
pub fn conv2d_valid(
    input: &[f32],
    input_shape: &Shape,
    kernels: TensorView<'_>,
    bias: Option<TensorView<'_>>,
    window: &Window,
    output: &mut [f32],
    output_shape: &Shape,
) {
    let (in_c, in_h, in_w) = (input_shape.channels(), input_shape.height(), input_shape.width());
    let (out_c, out_h, out_w) = (output_shape.channels(), output_shape.height(), output_shape.width());
    let (kh, kw) = (window.rows, window.cols);
    let filter_len = in_c * kh * kw;

    for n in 0..out_c {
        let b = bias.map_or(0.0, |b| b.at(n));
        for m in 0..out_h {
            for l in 0..out_w {
                let mut acc = 0.0f32;
                for k in 0..in_c {
                    for j in 0..kh {
                        let row = m * window.stride_rows + j;
                        let in_base = k * in_h * in_w + row * in_w + l * window.stride_cols;
                        let k_base = n * filter_len + k * kh * kw + j * kw;
                        for i in 0..kw {
                            acc += input[in_base + i] * kernels.at(k_base + i);
                        }
                    }
                }
                output[n * out_h * out_w + m * out_w + l] = acc + b;
            }
        }
    }
}

// =============================================================================
// Pooling
// =============================================================================

/// Valid-mode max pooling, channel by channel.
pub fn max_pool_2d(
    input: &[f32],
    input_shape: &Shape,
    window: &Window,
    output: &mut [f32],
    output_shape: &Shape,
) {
    let (channels, in_h, in_w) = (input_shape.channels(), input_shape.height(), input_shape.width());
    let (out_h, out_w) = (output_shape.height(), output_shape.width());

    for c in 0..channels {
        for oy in 0..out_h {
            for ox in 0..out_w {
                // seeded from the window so an all-NaN window stays NaN
                let mut max_val = input[c * in_h * in_w + oy * window.stride_rows * in_w + ox * window.stride_cols];
                for py in 0..window.rows {
                    let iy = oy * window.stride_rows + py;
                    let row = c * in_h * in_w + iy * in_w;
                    for px in 0..window.cols {
                        let val = input[row + ox * window.stride_cols + px];
                        if val > max_val {
                            max_val = val;
                        }
                    }
                }
                output[c * out_h * out_w + oy * out_w + ox] = max_val;
            }
        }
    }
}

/// `floor((input - window) / stride) + 1`, or `None` when the window does not
/// fit or the stride is zero.
pub fn valid_output_len(input: usize, window: usize, stride: usize) -> Option<usize> {
    if window == 0 || stride == 0 {
        return None;
    }
    Some(input.checked_sub(window)? / stride + 1)
}

/// Index of the largest value. Ties resolve to the first occurrence.
pub fn argmax(data: &[f32]) -> Option<usize> {
    let (first, rest) = data.split_first()?;
    let mut max_idx = 0;
    let mut max_val = *first;
    for (i, &val) in rest.iter().enumerate() {
        if val > max_val {
            max_val = val;
            max_idx = i + 1;
        }
    }
    Some(max_idx)
}
