use std::panic::{self, AssertUnwindSafe};

use crate::{
    animation::ticker::TickSubscription,
    effects::kind::EffectKind,
    effects::params::EffectParams,
    effects::registry::{self, EffectDelta, EffectState},
    foundation::core::LayerTransform,
    foundation::error::MotionError,
    layers::model::LayerId,
};

/// Instance identity: one per `(layer, effect kind)`.
pub type InstanceKey = (LayerId, EffectKind);

/// Why an instance update failed on a tick.
#[derive(Debug, thiserror::Error)]
pub enum InstanceFailure {
    #[error("update panicked: {0}")]
    Panicked(String),
    #[error(transparent)]
    Failed(#[from] MotionError),
    #[error("update produced a non-finite value")]
    NonFinite,
}

/// Live application of one effect to one layer.
#[derive(Debug)]
pub struct EffectInstance {
    layer: LayerId,
    kind: EffectKind,
    params: EffectParams,
    state: EffectState,
    baseline: LayerTransform,
    subscription: TickSubscription,
    last_delta: Option<EffectDelta>,
    seq: u64,
}

impl EffectInstance {
    pub(crate) fn new(
        layer: LayerId,
        params: EffectParams,
        baseline: LayerTransform,
        subscription: TickSubscription,
        seq: u64,
        seed: u64,
    ) -> Self {
        Self {
            layer,
            kind: params.kind(),
            state: registry::initial_state(&params, &baseline, seed),
            params,
            baseline,
            subscription,
            last_delta: None,
            seq,
        }
    }

    pub fn key(&self) -> InstanceKey {
        (self.layer.clone(), self.kind)
    }

    pub fn layer(&self) -> &LayerId {
        &self.layer
    }

    pub fn kind(&self) -> EffectKind {
        self.kind
    }

    pub fn params(&self) -> &EffectParams {
        &self.params
    }

    pub fn state(&self) -> &EffectState {
        &self.state
    }

    /// Transform captured when this instance was created. Never recomputed.
    pub fn baseline(&self) -> &LayerTransform {
        &self.baseline
    }

    /// Delta produced by the most recent successful update. A failed update leaves it unchanged.
    pub fn last_delta(&self) -> Option<EffectDelta> {
        self.last_delta
    }

    /// Creation order; lower values were created earlier.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_active()
    }

    /// Swap parameters; phase and direction carry over.
    pub(crate) fn set_params(&mut self, params: EffectParams) -> bool {
        if params.kind() != self.kind || params == self.params {
            return false;
        }
        self.params = params;
        true
    }

    /// Advance by `dt`. On failure the previous state and delta are kept.
    pub(crate) fn advance(&mut self, dt: f64) -> Result<EffectDelta, InstanceFailure> {
        if !self.subscription.is_active() {
            return Err(MotionError::animation("instance subscription was released").into());
        }
        let state = self.state;
        let params = self.params;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            registry::update(state, &params, dt)
        }))
        .map_err(|payload| InstanceFailure::Panicked(panic_message(payload.as_ref())))?;
        let (next, delta) = outcome?;
        if !delta.is_finite() || !state_is_finite(&next) {
            return Err(InstanceFailure::NonFinite);
        }
        self.state = next;
        self.last_delta = Some(delta);
        Ok(delta)
    }

    pub(crate) fn release(&mut self) -> bool {
        self.last_delta = None;
        self.subscription.release()
    }
}

fn state_is_finite(state: &EffectState) -> bool {
    match *state {
        EffectState::Rotate { angle } => angle.is_finite(),
        EffectState::Scale { value, dir }
        | EffectState::Translate { offset: value, dir }
        | EffectState::Fade { alpha: value, dir } => value.is_finite() && dir.is_finite(),
        EffectState::ColorShift { hue_deg } => hue_deg.is_finite(),
        EffectState::Shake { .. } => true,
        EffectState::Bounce { time } | EffectState::Swing { time } => time.is_finite(),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/instance.rs"]
mod tests;
