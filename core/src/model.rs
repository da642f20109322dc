//! SequentialModel: a validated layer chain bound to a two-bank workspace.
//!
//! ```text
//! bank A ─▶ Layer[0] ─▶ bank B ─▶ Layer[1] ─▶ bank A ─▶ ... ─▶ output bank
//! ```
//!
//! # Lifetimes
//! - `'m`: the serialized model bytes. Every layer borrows its weights from
//!   them, so the bytes must stay alive and unmodified while the model exists.
//!   The borrow checker enforces both.
//! - `'a`: the caller's layer-slot array and arena. The model holds them for
//!   its whole life and never allocates.
//!
//! Only one `predict()` can run at a time: it needs `&mut self` because both
//! banks are overwritten on every call.

use crate::arena::{Bank, Workspace};
use crate::error::{SeqError, SeqResult};
use crate::format::LayerKind;
use crate::layers::{Forward, Layer};
use crate::loader::{self, Capacity, ModelInfo, ModelReader};
use crate::math;

/// One entry of the caller's layer-slot array.
pub type LayerSlot<'m> = Option<Layer<'m>>;

/// Record of one layer invocation, passed to [`SequentialModel::predict_traced`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerTrace {
    pub index: usize,
    pub kind: LayerKind,
    pub input_bank: Bank,
    pub output_bank: Bank,
    pub input_len: usize,
    pub output_len: usize,
}

#[derive(Debug, Clone, Copy)]
enum State {
    Ready(ModelInfo),
    Failed(SeqError),
}

pub struct SequentialModel<'a, 'm> {
    layers: &'a [LayerSlot<'m>],
    workspace: Workspace<'a>,
    state: State,
}

impl<'a, 'm> SequentialModel<'a, 'm> {
    /// Parse `model`, fill `slots` and bind `arena`.
    ///
    /// Fails with a Capacity error when the model needs more slots or a larger
    /// arena, a Format error for malformed bytes, or an Unsupported error for
    /// declared-but-unimplemented features. On failure `slots` and `arena`
    /// are left untouched.
    pub fn new(
        model: &'m [u8],
        slots: &'a mut [LayerSlot<'m>],
        arena: &'a mut [f32],
    ) -> SeqResult<Self> {
        let info = loader::validate(model, Capacity::new(slots.len(), arena.len()))?;
        let bound = Self::bind(model, slots, arena, info);
        match bound.state {
            State::Ready(_) => Ok(bound),
            State::Failed(err) => Err(err),
        }
    }

    /// Like [`new`](Self::new) but always returns a model. On failure the
    /// model is inert: its views are empty and `predict()` returns
    /// [`SeqError::NotReady`].
    pub fn load(
        model: &'m [u8],
        slots: &'a mut [LayerSlot<'m>],
        arena: &'a mut [f32],
    ) -> Self {
        match loader::validate(model, Capacity::new(slots.len(), arena.len())) {
            Ok(info) => Self::bind(model, slots, arena, info),
            Err(err) => Self::failed(Workspace::new(arena), err),
        }
    }

    fn failed(workspace: Workspace<'a>, err: SeqError) -> Self {
        log::warn!("model failed to load: {}", err);
        Self { layers: &[], workspace, state: State::Failed(err) }
    }

    /// Second pass over already validated bytes: store each layer in order.
    fn bind(
        model: &'m [u8],
        slots: &'a mut [LayerSlot<'m>],
        arena: &'a mut [f32],
        info: ModelInfo,
    ) -> Self {
        let workspace = Workspace::new(arena);
        let reader = match ModelReader::new(model) {
            Ok(reader) => reader,
            Err(err) => return Self::failed(workspace, err),
        };

        slots.fill(None);
        let mut bound = 0;
        let mut failure = None;
        for (slot, record) in slots.iter_mut().zip(reader.layers()) {
            match record {
                Ok(layer) => {
                    *slot = Some(layer);
                    bound += 1;
                }
                Err(err) => {
                    failure = Some(err);
                    break;
                }
            }
        }
        let failure = failure.or_else(|| {
            (bound != info.layer_count)
                .then_some(SeqError::LayerCountMismatch { declared: info.layer_count, parsed: bound })
        });
        if let Some(err) = failure {
            slots.fill(None);
            return Self::failed(workspace, err);
        }

        let slots: &'a [LayerSlot<'m>] = slots;
        log::debug!(
            "model ready: {} layers, bank width {}, {} -> {}",
            info.layer_count,
            info.bank_width(),
            info.input_len,
            info.output_len
        );
        Self { layers: &slots[..bound], workspace, state: State::Ready(info) }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, State::Ready(_))
    }

    /// The construction error of a failed model.
    pub fn error(&self) -> Option<SeqError> {
        match self.state {
            State::Ready(_) => None,
            State::Failed(err) => Some(err),
        }
    }

    pub fn info(&self) -> Option<&ModelInfo> {
        match &self.state {
            State::Ready(info) => Some(info),
            State::Failed(_) => None,
        }
    }

    /// Number of layers.
    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    /// Get layer by index.
    pub fn layer(&self, idx: usize) -> Option<&Layer<'m>> {
        self.layers.get(idx).and_then(Option::as_ref)
    }

    pub fn layers(&self) -> impl Iterator<Item = &Layer<'m>> + '_ {
        self.layers.iter().flatten()
    }

    /// Bank the final layer writes to, fixed by the parity of the layer count.
    pub fn output_bank(&self) -> Bank {
        Bank::result_of(self.layers.len())
    }

    fn lens(&self) -> (usize, usize) {
        match self.state {
            State::Ready(info) => (info.input_len, info.output_len),
            State::Failed(_) => (0, 0),
        }
    }

    /// Input view (bank A). Write the network input here before `predict()`.
    pub fn input_mut(&mut self) -> &mut [f32] {
        let (in_len, _) = self.lens();
        &mut self.workspace.bank_mut(Bank::A)[..in_len]
    }

    pub fn input(&self) -> &[f32] {
        let (in_len, _) = self.lens();
        &self.workspace.bank(Bank::A)[..in_len]
    }

    /// Output view. Valid after `predict()` until the next one.
    pub fn output(&self) -> &[f32] {
        let (_, out_len) = self.lens();
        &self.workspace.bank(self.output_bank())[..out_len]
    }

    /// Run every layer in order over the current input view.
    pub fn predict(&mut self) -> SeqResult<()> {
        self.predict_traced(|_| {})
    }

    /// `predict()` with a hook called after each layer.
    pub fn predict_traced<F>(&mut self, mut on_layer: F) -> SeqResult<()>
    where
        F: FnMut(LayerTrace),
    {
        if let State::Failed(err) = self.state {
            return Err(SeqError::NotReady(err.kind()));
        }
        let layers = self.layers;
        for (index, layer) in layers.iter().flatten().enumerate() {
            let input_bank = Bank::input_of(index);
            let (input_len, output_len) = (layer.input_len(), layer.output_len());
            let (input, output) = self.workspace.io(input_bank, input_len, output_len)?;
            layer.forward(input, output)?;
            log::trace!("layer {} {}: {} -> {}", index, layer.name(), input_len, output_len);
            on_layer(LayerTrace {
                index,
                kind: layer.kind(),
                input_bank,
                output_bank: input_bank.other(),
                input_len,
                output_len,
            });
        }
        Ok(())
    }

    /// Copy `input` into the input view, predict, and return the output view.
    pub fn run(&mut self, input: &[f32]) -> SeqResult<&[f32]> {
        if let State::Failed(err) = self.state {
            return Err(SeqError::NotReady(err.kind()));
        }
        let dst = self.input_mut();
        if input.len() != dst.len() {
            return Err(SeqError::DimensionMismatch { expected: dst.len(), actual: input.len() });
        }
        dst.copy_from_slice(input);
        self.predict()?;
        Ok(self.output())
    }

    /// `run` followed by argmax over the output.
    pub fn classify(&mut self, input: &[f32]) -> SeqResult<usize> {
        let output = self.run(input)?;
        math::argmax(output).ok_or(SeqError::DimensionMismatch { expected: 1, actual: 0 })
    }
}
