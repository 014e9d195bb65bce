//! Pure definitions of the eight motion behaviors.
//!
//! Each behavior is `update(state, params, elapsed_secs) -> (state, delta)`. Nothing here holds
//! runtime state: the scheduler owns one [`EffectState`] per `(layer, effect)` and threads it
//! through [`update`] every tick.

use crate::{
    effects::{
        kind::EffectKind,
        params::{
            BounceParams, ColorShiftParams, EffectParams, FadeParams, RotateParams, ScaleParams,
            ShakeParams, SwingParams, TranslateParams,
        },
    },
    foundation::core::{LayerTransform, Rgb8, Vec2},
    foundation::error::{MotionError, MotionResult},
    foundation::math::{Rng64, hsl_to_rgb, ping_pong_step},
};

/// Transform channel an effect drives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Rotation,
    Scale,
    Position,
    Alpha,
    Tint,
}

/// Static description of one registry entry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EffectDefinition {
    pub kind: EffectKind,
    pub channel: Channel,
    pub default_params: EffectParams,
}

pub fn definition(kind: EffectKind) -> EffectDefinition {
    let channel = match kind {
        EffectKind::Rotate | EffectKind::Swing => Channel::Rotation,
        EffectKind::Scale => Channel::Scale,
        EffectKind::Translate | EffectKind::Shake | EffectKind::Bounce => Channel::Position,
        EffectKind::Fade => Channel::Alpha,
        EffectKind::ColorShift => Channel::Tint,
    };
    EffectDefinition {
        kind,
        channel,
        default_params: EffectParams::defaults(kind),
    }
}

/// All registry entries in canonical order.
pub fn definitions() -> [EffectDefinition; 8] {
    EffectKind::ALL.map(definition)
}

/// Per-instance motion state. Phase/time accumulators start at zero.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum EffectState {
    Rotate { angle: f64 },
    Scale { value: f64, dir: f64 },
    Translate { offset: f64, dir: f64 },
    Fade { alpha: f64, dir: f64 },
    ColorShift { hue_deg: f64 },
    Shake { rng: Rng64 },
    Bounce { time: f64 },
    Swing { time: f64 },
}

impl EffectState {
    pub fn kind(&self) -> EffectKind {
        match self {
            EffectState::Rotate { .. } => EffectKind::Rotate,
            EffectState::Scale { .. } => EffectKind::Scale,
            EffectState::Translate { .. } => EffectKind::Translate,
            EffectState::Fade { .. } => EffectKind::Fade,
            EffectState::ColorShift { .. } => EffectKind::ColorShift,
            EffectState::Shake { .. } => EffectKind::Shake,
            EffectState::Bounce { .. } => EffectKind::Bounce,
            EffectState::Swing { .. } => EffectKind::Swing,
        }
    }
}

/// What one effect contributes to its layer for one tick.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum EffectDelta {
    /// Added to the rotation baseline (radians).
    Rotation(f64),
    /// Multiplies the scale baseline.
    ScaleMul(f64),
    /// Offset from the baseline position along the configured axis.
    Offset(Vec2),
    /// Replaces the layer's base opacity.
    Alpha(f64),
    Tint(Rgb8),
    /// Per-tick random offset around the baseline position.
    Jitter(Vec2),
    /// Downward hop in pixels, always `>= 0`.
    Hop(f64),
    /// Pendulum rotation (radians); overrides rather than sums with [`EffectDelta::Rotation`].
    SwingRotation(f64),
}

impl EffectDelta {
    pub fn is_finite(&self) -> bool {
        match *self {
            EffectDelta::Rotation(v)
            | EffectDelta::ScaleMul(v)
            | EffectDelta::Alpha(v)
            | EffectDelta::Hop(v)
            | EffectDelta::SwingRotation(v) => v.is_finite(),
            EffectDelta::Offset(v) | EffectDelta::Jitter(v) => v.is_finite(),
            EffectDelta::Tint(_) => true,
        }
    }
}

/// State for a freshly enabled instance. `baseline` is the layer as rendered at enable time;
/// `seed` feeds jitter effects.
pub fn initial_state(params: &EffectParams, baseline: &LayerTransform, seed: u64) -> EffectState {
    match *params {
        EffectParams::Rotate(_) => EffectState::Rotate { angle: 0.0 },
        EffectParams::Scale(p) => EffectState::Scale {
            value: 1.0_f64.clamp(p.min_scale, p.max_scale),
            dir: 1.0,
        },
        EffectParams::Translate(_) => EffectState::Translate {
            offset: 0.0,
            dir: 1.0,
        },
        EffectParams::Fade(p) => EffectState::Fade {
            alpha: baseline.opacity.clamp(p.min_opacity, p.max_opacity),
            dir: -1.0,
        },
        EffectParams::ColorShift(_) => EffectState::ColorShift { hue_deg: 0.0 },
        EffectParams::Shake(_) => EffectState::Shake {
            rng: Rng64::new(seed),
        },
        EffectParams::Bounce(_) => EffectState::Bounce { time: 0.0 },
        EffectParams::Swing(_) => EffectState::Swing { time: 0.0 },
    }
}

/// Advance one instance by `dt` seconds of real time.
///
/// Fails only when `state` and `params` belong to different effects.
pub fn update(
    state: EffectState,
    params: &EffectParams,
    dt: f64,
) -> MotionResult<(EffectState, EffectDelta)> {
    let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
    let out = match (state, *params) {
        (EffectState::Rotate { angle }, EffectParams::Rotate(p)) => rotate(angle, p, dt),
        (EffectState::Scale { value, dir }, EffectParams::Scale(p)) => scale(value, dir, p, dt),
        (EffectState::Translate { offset, dir }, EffectParams::Translate(p)) => {
            translate(offset, dir, p, dt)
        }
        (EffectState::Fade { alpha, dir }, EffectParams::Fade(p)) => fade(alpha, dir, p, dt),
        (EffectState::ColorShift { hue_deg }, EffectParams::ColorShift(p)) => {
            color_shift(hue_deg, p, dt)
        }
        (EffectState::Shake { rng }, EffectParams::Shake(p)) => shake(rng, p),
        (EffectState::Bounce { time }, EffectParams::Bounce(p)) => bounce(time, p, dt),
        (EffectState::Swing { time }, EffectParams::Swing(p)) => swing(time, p, dt),
        (state, params) => {
            return Err(MotionError::animation(format!(
                "{} state cannot be advanced with {} params",
                state.kind(),
                params.kind()
            )));
        }
    };
    Ok(out)
}

fn rotate(angle: f64, p: RotateParams, dt: f64) -> (EffectState, EffectDelta) {
    let angle = angle + p.direction.sign() * p.speed * dt;
    (EffectState::Rotate { angle }, EffectDelta::Rotation(angle))
}

fn scale(value: f64, dir: f64, p: ScaleParams, dt: f64) -> (EffectState, EffectDelta) {
    let (value, dir) = ping_pong_step(value, dir, p.min_scale, p.max_scale, p.speed * dt);
    (EffectState::Scale { value, dir }, EffectDelta::ScaleMul(value))
}

fn translate(offset: f64, dir: f64, p: TranslateParams, dt: f64) -> (EffectState, EffectDelta) {
    let (offset, dir) = ping_pong_step(offset, dir, -p.distance, p.distance, p.speed * dt);
    let (ux, uy) = p.direction.unit();
    (
        EffectState::Translate { offset, dir },
        EffectDelta::Offset(Vec2::new(ux * offset, uy * offset)),
    )
}

fn fade(alpha: f64, dir: f64, p: FadeParams, dt: f64) -> (EffectState, EffectDelta) {
    let (alpha, dir) = ping_pong_step(alpha, dir, p.min_opacity, p.max_opacity, p.speed * dt);
    (EffectState::Fade { alpha, dir }, EffectDelta::Alpha(alpha))
}

fn color_shift(hue_deg: f64, p: ColorShiftParams, dt: f64) -> (EffectState, EffectDelta) {
    let hue_deg = (hue_deg + p.speed * dt).rem_euclid(360.0);
    let tint = hsl_to_rgb(hue_deg / 360.0, 1.0, 0.5);
    (EffectState::ColorShift { hue_deg }, EffectDelta::Tint(tint))
}

// No temporal smoothing: every tick is an independent draw.
fn shake(mut rng: Rng64, p: ShakeParams) -> (EffectState, EffectDelta) {
    let half = p.intensity / 2.0;
    let x = rng.next_f64_01() * p.intensity - half;
    let y = rng.next_f64_01() * p.intensity - half;
    (EffectState::Shake { rng }, EffectDelta::Jitter(Vec2::new(x, y)))
}

fn bounce(time: f64, p: BounceParams, dt: f64) -> (EffectState, EffectDelta) {
    let time = time + p.speed * dt;
    let hop = time.sin().abs() * p.height;
    (EffectState::Bounce { time }, EffectDelta::Hop(hop))
}

fn swing(time: f64, p: SwingParams, dt: f64) -> (EffectState, EffectDelta) {
    let time = time + p.speed * dt;
    let rotation = time.sin() * p.angle.to_radians();
    (EffectState::Swing { time }, EffectDelta::SwingRotation(rotation))
}

#[cfg(test)]
#[path = "../../tests/unit/effects/registry.rs"]
mod tests;
