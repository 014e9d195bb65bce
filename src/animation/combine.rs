use smallvec::SmallVec;

use crate::{
    animation::instance::EffectInstance,
    effects::kind::EffectKind,
    effects::registry::{self, Channel, EffectDelta},
    foundation::core::{LayerTransform, Vec2},
    layers::model::{Layer, LayerId},
};

/// Per-layer result of one tick. Derived, never stored by the layer store.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct CombinedTransform {
    pub layer: LayerId,
    pub transform: LayerTransform,
    /// Effects contributing a delta, in registration order.
    pub active: SmallVec<[EffectKind; 8]>,
}

/// Fold the deltas of `instances` (all belonging to `layer`, in registration order).
///
/// Each of rotation/scale/position is anchored at the baseline of the earliest-created
/// instance driving it, or at the stored layer value when nothing drives it. Alpha and tint
/// are overrides.
pub fn combine<'a>(
    layer: &Layer,
    instances: impl IntoIterator<Item = &'a EffectInstance>,
) -> CombinedTransform {
    let stored = layer.transform();

    let mut rotation_anchor: Option<(u64, f64)> = None;
    let mut scale_anchor: Option<(u64, f64)> = None;
    let mut position_anchor: Option<(u64, Vec2)> = None;

    let mut rotate = 0.0;
    let mut swing: Option<f64> = None;
    let mut scale_mul = 1.0;
    let mut offset = Vec2::ZERO;
    let mut alpha: Option<f64> = None;
    let mut tint = None;
    let mut active = SmallVec::new();

    for inst in instances {
        debug_assert_eq!(inst.layer(), &layer.id);
        let base = inst.baseline();
        let seq = inst.seq();
        match registry::definition(inst.kind()).channel {
            Channel::Rotation => earliest(&mut rotation_anchor, seq, base.rotation_rad),
            Channel::Scale => earliest(&mut scale_anchor, seq, base.scale),
            Channel::Position => earliest(&mut position_anchor, seq, base.position),
            Channel::Alpha | Channel::Tint => {}
        }

        let Some(delta) = inst.last_delta() else {
            continue;
        };
        active.push(inst.kind());
        match delta {
            EffectDelta::Rotation(r) => rotate += r,
            EffectDelta::SwingRotation(r) => swing = Some(r),
            EffectDelta::ScaleMul(m) => scale_mul *= m,
            EffectDelta::Offset(v) | EffectDelta::Jitter(v) => offset += v,
            EffectDelta::Hop(h) => offset.y += h,
            EffectDelta::Alpha(a) => alpha = Some(a),
            EffectDelta::Tint(c) => tint = Some(c),
        }
    }

    let rotation_base = rotation_anchor.map_or(stored.rotation_rad, |(_, v)| v);
    let scale_base = scale_anchor.map_or(stored.scale, |(_, v)| v);
    let position_base = position_anchor.map_or(stored.position, |(_, v)| v);

    CombinedTransform {
        layer: layer.id.clone(),
        transform: LayerTransform {
            position: position_base + offset,
            rotation_rad: rotation_base + swing.unwrap_or(rotate),
            scale: scale_base * scale_mul,
            opacity: alpha.unwrap_or(stored.opacity),
            tint,
        },
        active,
    }
}

fn earliest<T>(slot: &mut Option<(u64, T)>, seq: u64, value: T) {
    if slot.as_ref().is_none_or(|(s, _)| seq < *s) {
        *slot = Some((seq, value));
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/combine.rs"]
mod tests;
