//! End-to-end inference through SequentialModel.

mod common;

use common::{identity, ModelBuilder, SAME, VALID};
use seqnet_core::*;

/// |x| as Linear(1→2, [1, -1]) → ReLU → Linear(2→1, [1, 1]).
fn abs_model() -> Vec<u8> {
    ModelBuilder::new()
        .width(2)
        .linear(2, 1, &[1.0, -1.0], &[0.0, 0.0])
        .relu(&[2])
        .linear(1, 2, &[1.0, 1.0], &[0.0])
        .build()
}

#[test]
fn test_identity_chain_reproduces_input() {
    let bytes = ModelBuilder::new()
        .width(3)
        .linear(3, 3, &identity(3), &[0.0; 3])
        .linear(3, 3, &identity(3), &[0.0; 3])
        .build();
    let mut slots: [LayerSlot; 4] = [None; 4];
    let mut arena = [0.0f32; 6];
    let mut model = SequentialModel::new(&bytes, &mut slots, &mut arena).unwrap();

    let input = [1.25, -3.0, 1e6];
    model.input_mut().copy_from_slice(&input);
    model.predict().unwrap();
    assert_eq!(model.output(), &input);
}

#[test]
fn test_single_linear_layer() {
    let bytes = ModelBuilder::new().width(2).linear(1, 2, &[1.0, 1.0], &[0.0]).build();
    let mut slots: [LayerSlot; 1] = [None; 1];
    let mut arena = [0.0f32; 4];
    let mut model = SequentialModel::new(&bytes, &mut slots, &mut arena).unwrap();

    assert_eq!(model.output_bank(), Bank::B);
    model.input_mut().copy_from_slice(&[3.0, 4.0]);
    model.predict().unwrap();
    assert_eq!(model.output(), &[7.0]);
}

#[test]
fn test_abs_network_and_output_bank_parity() {
    let bytes = abs_model();
    let mut slots: [LayerSlot; 3] = [None; 3];
    let mut arena = [0.0f32; 4];
    let mut model = SequentialModel::new(&bytes, &mut slots, &mut arena).unwrap();

    assert_eq!(model.num_layers(), 3);
    assert_eq!(model.output_bank(), Bank::B);
    for x in [-2.5f32, 0.0, 3.0] {
        assert_eq!(model.run(&[x]).unwrap(), &[x.abs()]);
    }
}

#[test]
fn test_even_layer_count_writes_result_to_bank_a() {
    let bytes = ModelBuilder::new()
        .linear(2, 2, &[1.0, 0.0, 0.0, -1.0], &[0.0, 0.0])
        .relu(&[2])
        .build();
    let mut slots: [LayerSlot; 2] = [None; 2];
    let mut arena = [0.0f32; 4];
    let mut model = SequentialModel::new(&bytes, &mut slots, &mut arena).unwrap();

    assert_eq!(model.output_bank(), Bank::A);
    model.input_mut().copy_from_slice(&[5.0, 5.0]);
    model.predict().unwrap();
    assert_eq!(model.output(), &[5.0, 0.0]);
}

#[test]
fn test_run_is_repeatable() {
    let bytes = abs_model();
    let mut slots: [LayerSlot; 3] = [None; 3];
    let mut arena = [0.0f32; 4];
    let mut model = SequentialModel::new(&bytes, &mut slots, &mut arena).unwrap();

    let first = model.run(&[-1.5]).unwrap().to_vec();
    let second = model.run(&[-1.5]).unwrap().to_vec();
    assert_eq!(first, second);
}

#[test]
fn test_models_sharing_bytes_are_independent() {
    let bytes = abs_model();
    let mut slots_a: [LayerSlot; 3] = [None; 3];
    let mut slots_b: [LayerSlot; 3] = [None; 3];
    let mut arena_a = [0.0f32; 4];
    let mut arena_b = [0.0f32; 4];
    let mut a = SequentialModel::new(&bytes, &mut slots_a, &mut arena_a).unwrap();
    let mut b = SequentialModel::new(&bytes, &mut slots_b, &mut arena_b).unwrap();

    assert_eq!(b.run(&[4.0]).unwrap(), &[4.0]);
    assert_eq!(a.run(&[-9.0]).unwrap(), &[9.0]);
    assert_eq!(b.output(), &[4.0]);
}

#[test]
fn test_cnn_pipeline() {
    // 1×4×4 → conv 2×2 average → ReLU → maxpool 2×2 stride 1 → Linear sum
    let bytes = ModelBuilder::new()
        .width(16)
        .conv2d((1, 1, 4, 4), (2, 2), (1, 1), VALID, &[0.25; 4], &[0.0])
        .relu(&[1, 3, 3])
        .max_pool((1, 3, 3), (2, 2), (1, 1), VALID)
        .linear(1, 4, &[1.0; 4], &[0.0])
        .build();
    let mut slots: [LayerSlot; 8] = [None; 8];
    let mut arena = [0.0f32; 32];
    let mut model = SequentialModel::new(&bytes, &mut slots, &mut arena).unwrap();

    let kinds: Vec<LayerKind> = model.layers().map(Layer::kind).collect();
    assert_eq!(
        kinds,
        vec![LayerKind::Conv2D, LayerKind::Activation, LayerKind::MaxPool2D, LayerKind::Linear]
    );
    assert!(model.layer(4).is_none());

    let input: Vec<f32> = (1..=16).map(|v| v as f32).collect();
    // pooled map is [[8.5, 9.5], [12.5, 13.5]]
    assert_eq!(model.run(&input).unwrap(), &[44.0]);
}

fn dense_ref(input: &[f32], w: &[f32], b: &[f32], relu: bool) -> Vec<f32> {
    b.iter()
        .enumerate()
        .map(|(o, &bias)| {
            let mut acc = 0.0f32;
            for (i, &x) in input.iter().enumerate() {
                acc += w[o * input.len() + i] * x;
            }
            let y = acc + bias;
            if relu && y < 0.0 { 0.0 } else { y }
        })
        .collect()
}

#[test]
fn test_sine_shaped_regressor() {
    // 1 → 16 → ReLU → 16 → ReLU → 1, five layers like the converter's sine model
    let w1: Vec<f32> = (0..16).map(|i| (i as f32 - 7.5) / 4.0).collect();
    let b1: Vec<f32> = (0..16).map(|i| (i % 3) as f32 * 0.25 - 0.25).collect();
    let w2: Vec<f32> = (0..256).map(|i| ((i * 7 % 11) as f32 - 5.0) / 8.0).collect();
    let b2 = vec![0.125f32; 16];
    let w3: Vec<f32> = (0..16).map(|i| if i % 2 == 0 { 0.5 } else { -0.25 }).collect();
    let b3 = [0.1f32];

    let bytes = ModelBuilder::new()
        .width(16)
        .linear(16, 1, &w1, &b1)
        .relu(&[16])
        .linear(16, 16, &w2, &b2)
        .relu(&[16])
        .linear(1, 16, &w3, &b3)
        .build();
    let mut slots: [LayerSlot; 5] = [None; 5];
    let mut arena = [0.0f32; 32];
    let mut model = SequentialModel::new(&bytes, &mut slots, &mut arena).unwrap();
    assert_eq!(model.output_bank(), Bank::B);

    for step in 0..36 {
        let x = step as f32 * core::f32::consts::TAU / 36.0;
        let h1 = dense_ref(&[x], &w1, &b1, true);
        let h2 = dense_ref(&h1, &w2, &b2, true);
        let y = dense_ref(&h2, &w3, &b3, false);
        assert_eq!(model.run(&[x]).unwrap(), y.as_slice());
    }
}

#[test]
fn test_classify_picks_largest_output() {
    let bytes = ModelBuilder::new()
        .linear(3, 2, &[1.0, 0.0, 0.0, 1.0, -1.0, -1.0], &[0.0, 0.0, 0.0])
        .build();
    let mut slots: [LayerSlot; 1] = [None; 1];
    let mut arena = [0.0f32; 6];
    let mut model = SequentialModel::new(&bytes, &mut slots, &mut arena).unwrap();

    assert_eq!(model.classify(&[0.2, 0.9]).unwrap(), 1);
    assert_eq!(model.classify(&[-1.0, -2.0]).unwrap(), 2);
}

#[test]
fn test_run_rejects_wrong_input_length() {
    let bytes = abs_model();
    let mut slots: [LayerSlot; 3] = [None; 3];
    let mut arena = [0.0f32; 4];
    let mut model = SequentialModel::new(&bytes, &mut slots, &mut arena).unwrap();

    let err = model.run(&[1.0, 2.0]).unwrap_err();
    assert_eq!(err, SeqError::DimensionMismatch { expected: 1, actual: 2 });
}

// =============================================================================
// Bounds harness
// =============================================================================

const SENTINEL: f32 = 12345.0;

#[test]
fn test_predict_calls_each_layer_once_within_bounds() {
    let bytes = ModelBuilder::new()
        .width(4)
        .linear(4, 2, &[1.0; 8], &[0.0; 4])
        .relu(&[4])
        .linear(3, 4, &[0.5; 12], &[1.0; 3])
        .relu(&[3])
        .linear(1, 3, &[1.0; 3], &[0.0])
        .build();
    let mut slots: [LayerSlot; 5] = [None; 5];
    // banks of 16, model needs 4
    let mut arena = [SENTINEL; 32];
    let mut model = SequentialModel::new(&bytes, &mut slots, &mut arena).unwrap();
    let info = *model.info().unwrap();
    assert_eq!(info.bank_width(), 4);

    model.input_mut().copy_from_slice(&[1.0, 1.0]);
    let mut calls = Vec::new();
    model.predict_traced(|t| calls.push(t)).unwrap();

    assert_eq!(calls.len(), 5);
    for (i, (trace, layer)) in calls.iter().zip(model.layers()).enumerate() {
        assert_eq!(trace.index, i);
        assert_eq!(trace.kind, layer.kind());
        assert_eq!(trace.input_bank, Bank::input_of(i));
        assert_eq!(trace.output_bank, Bank::output_of(i));
        assert_eq!(trace.input_len, layer.input_len());
        assert_eq!(trace.output_len, layer.output_len());
    }
    // 2 → 4 (2,2,2,2) → relu → 3 × (0.5·8 + 1 = 5) → relu → 15
    assert_eq!(model.output(), &[15.0]);
    drop(model);

    for bank in [&arena[..16], &arena[16..]] {
        assert!(bank[4..].iter().all(|&v| v == SENTINEL));
    }
}

// =============================================================================
// Failed models
// =============================================================================

#[test]
fn test_load_with_too_few_slots_is_not_executable() {
    let bytes = abs_model();
    let mut slots: [LayerSlot; 2] = [None; 2];
    let mut arena = [SENTINEL; 4];
    let mut model = SequentialModel::load(&bytes, &mut slots, &mut arena);

    assert!(!model.is_ready());
    assert_eq!(model.error(), Some(SeqError::TooManyLayers { required: 3, capacity: 2 }));
    assert!(model.info().is_none());
    assert_eq!(model.num_layers(), 0);
    assert!(model.input().is_empty());
    assert!(model.output().is_empty());
    assert_eq!(model.predict(), Err(SeqError::NotReady(ErrorKind::Capacity)));
    assert_eq!(model.run(&[1.0]).unwrap_err(), SeqError::NotReady(ErrorKind::Capacity));
    drop(model);

    assert!(slots.iter().all(Option::is_none));
    assert!(arena.iter().all(|&v| v == SENTINEL));
}

#[test]
fn test_load_with_small_arena_reports_capacity() {
    let bytes = abs_model();
    let mut slots: [LayerSlot; 3] = [None; 3];
    let mut arena = [0.0f32; 3];
    let mut model = SequentialModel::load(&bytes, &mut slots, &mut arena);

    assert_eq!(model.error(), Some(SeqError::ArenaTooSmall { required: 4, available: 3 }));
    assert_eq!(model.predict().unwrap_err().kind(), ErrorKind::NotReady);
}

#[test]
fn test_load_with_unknown_tag_is_not_executable() {
    let bytes = ModelBuilder::new()
        .declared_layers(2)
        .linear(1, 1, &[1.0], &[0.0])
        .raw(&[9])
        .build();
    let mut slots: [LayerSlot; 4] = [None; 4];
    let mut arena = [SENTINEL; 8];
    let mut model = SequentialModel::load(&bytes, &mut slots, &mut arena);

    assert_eq!(model.error(), Some(SeqError::UnknownLayerKind { tag: 9, offset: 28 }));
    assert_eq!(model.num_layers(), 0);
    assert_eq!(model.predict(), Err(SeqError::NotReady(ErrorKind::Format)));
    drop(model);

    assert!(slots.iter().all(Option::is_none));
    assert!(arena.iter().all(|&v| v == SENTINEL));
}

#[test]
fn test_load_with_same_padding_is_not_executable() {
    let bytes = ModelBuilder::new()
        .conv2d((1, 1, 3, 3), (2, 2), (1, 1), SAME, &[0.0; 4], &[0.0])
        .relu(&[9])
        .build();
    let mut slots: [LayerSlot; 4] = [None; 4];
    let mut arena = [SENTINEL; 32];
    let mut model = SequentialModel::load(&bytes, &mut slots, &mut arena);

    assert_eq!(model.error(), Some(SeqError::UnsupportedPadding { kind: LayerKind::Conv2D }));
    assert!(model.output().is_empty());
    assert_eq!(model.predict(), Err(SeqError::NotReady(ErrorKind::Unsupported)));
    drop(model);

    assert!(slots.iter().all(Option::is_none));
    assert!(arena.iter().all(|&v| v == SENTINEL));
}

#[test]
fn test_load_success_matches_new() {
    let bytes = abs_model();
    let mut slots: [LayerSlot; 4] = [None; 4];
    let mut arena = [0.0f32; 4];
    let mut model = SequentialModel::load(&bytes, &mut slots, &mut arena);

    assert!(model.is_ready());
    assert_eq!(model.error(), None);
    assert_eq!(model.run(&[-3.0]).unwrap(), &[3.0]);
    drop(model);

    // slots beyond the model stay empty
    assert!(slots[..3].iter().all(Option::is_some));
    assert!(slots[3].is_none());
}
