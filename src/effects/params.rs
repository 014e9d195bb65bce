//! Typed parameter records for the eight effects.
//!
//! Parsing is lenient on purpose: every field that is missing, non-numeric, non-finite or out of
//! its domain is replaced by that field's default, so a settings edit can never fail.

use crate::effects::kind::EffectKind;

/// Rates are per second. The defaults are the editor's historical per-frame rates at 60 Hz.
pub mod defaults {
    pub const ROTATE_SPEED: f64 = 6.0;
    pub const SCALE_MIN: f64 = 0.5;
    pub const SCALE_MAX: f64 = 1.5;
    pub const SCALE_SPEED: f64 = 1.2;
    pub const TRANSLATE_DISTANCE: f64 = 50.0;
    pub const TRANSLATE_SPEED: f64 = 120.0;
    pub const FADE_MIN: f64 = 0.0;
    pub const FADE_MAX: f64 = 1.0;
    pub const FADE_SPEED: f64 = 1.2;
    pub const COLOR_SHIFT_SPEED: f64 = 6.0;
    pub const SHAKE_INTENSITY: f64 = 5.0;
    pub const BOUNCE_HEIGHT: f64 = 50.0;
    pub const BOUNCE_SPEED: f64 = 6.0;
    pub const SWING_ANGLE_DEG: f64 = 15.0;
    pub const SWING_SPEED: f64 = 3.0;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotateDirection {
    #[default]
    Clockwise,
    Counterclockwise,
}

impl RotateDirection {
    /// Sign of the angular velocity in y-down screen space.
    pub fn sign(self) -> f64 {
        match self {
            RotateDirection::Clockwise => 1.0,
            RotateDirection::Counterclockwise => -1.0,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslateAxis {
    #[default]
    Horizontal,
    Vertical,
    Diagonal,
}

impl TranslateAxis {
    /// Unit vector of travel.
    pub fn unit(self) -> (f64, f64) {
        match self {
            TranslateAxis::Horizontal => (1.0, 0.0),
            TranslateAxis::Vertical => (0.0, 1.0),
            TranslateAxis::Diagonal => {
                let c = std::f64::consts::FRAC_1_SQRT_2;
                (c, c)
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RotateParams {
    pub speed: f64,
    pub direction: RotateDirection,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleParams {
    pub min_scale: f64,
    pub max_scale: f64,
    pub speed: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateParams {
    pub distance: f64,
    pub speed: f64,
    pub direction: TranslateAxis,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FadeParams {
    pub min_opacity: f64,
    pub max_opacity: f64,
    pub speed: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorShiftParams {
    /// Degrees of hue per second.
    pub speed: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShakeParams {
    pub intensity: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BounceParams {
    pub height: f64,
    pub speed: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwingParams {
    /// Peak swing in degrees.
    pub angle: f64,
    pub speed: f64,
}

/// Parameters of one effect, tagged by kind.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "kind", content = "params", rename_all = "camelCase")]
pub enum EffectParams {
    Rotate(RotateParams),
    Scale(ScaleParams),
    Translate(TranslateParams),
    Fade(FadeParams),
    ColorShift(ColorShiftParams),
    Shake(ShakeParams),
    Bounce(BounceParams),
    Swing(SwingParams),
}

impl EffectParams {
    pub fn defaults(kind: EffectKind) -> Self {
        Self::from_json(kind, &serde_json::Value::Null)
    }

    pub fn kind(&self) -> EffectKind {
        match self {
            EffectParams::Rotate(_) => EffectKind::Rotate,
            EffectParams::Scale(_) => EffectKind::Scale,
            EffectParams::Translate(_) => EffectKind::Translate,
            EffectParams::Fade(_) => EffectKind::Fade,
            EffectParams::ColorShift(_) => EffectKind::ColorShift,
            EffectParams::Shake(_) => EffectKind::Shake,
            EffectParams::Bounce(_) => EffectKind::Bounce,
            EffectParams::Swing(_) => EffectKind::Swing,
        }
    }

    /// Build parameters from an editor settings object. Never fails.
    pub fn from_json(kind: EffectKind, params: &serde_json::Value) -> Self {
        let p = Fields(params.as_object());
        match kind {
            EffectKind::Rotate => EffectParams::Rotate(RotateParams {
                speed: p.num("speed", defaults::ROTATE_SPEED, any),
                direction: match p.word("direction").as_deref() {
                    Some("counterclockwise" | "ccw" | "anticlockwise") => {
                        RotateDirection::Counterclockwise
                    }
                    _ => RotateDirection::Clockwise,
                },
            }),
            EffectKind::Scale => {
                let (min_scale, max_scale) = p.range(
                    ("minScale", defaults::SCALE_MIN),
                    ("maxScale", defaults::SCALE_MAX),
                    non_negative,
                );
                EffectParams::Scale(ScaleParams {
                    min_scale,
                    max_scale,
                    speed: p.num("speed", defaults::SCALE_SPEED, non_negative),
                })
            }
            EffectKind::Translate => EffectParams::Translate(TranslateParams {
                distance: p.num("distance", defaults::TRANSLATE_DISTANCE, non_negative),
                speed: p.num("speed", defaults::TRANSLATE_SPEED, non_negative),
                direction: match p.word("direction").as_deref() {
                    Some("vertical") => TranslateAxis::Vertical,
                    Some("diagonal") => TranslateAxis::Diagonal,
                    _ => TranslateAxis::Horizontal,
                },
            }),
            EffectKind::Fade => {
                let (min_opacity, max_opacity) = p.range(
                    ("minOpacity", defaults::FADE_MIN),
                    ("maxOpacity", defaults::FADE_MAX),
                    unit_interval,
                );
                EffectParams::Fade(FadeParams {
                    min_opacity,
                    max_opacity,
                    speed: p.num("speed", defaults::FADE_SPEED, non_negative),
                })
            }
            EffectKind::ColorShift => EffectParams::ColorShift(ColorShiftParams {
                speed: p.num("speed", defaults::COLOR_SHIFT_SPEED, any),
            }),
            EffectKind::Shake => EffectParams::Shake(ShakeParams {
                intensity: p.num("intensity", defaults::SHAKE_INTENSITY, non_negative),
            }),
            EffectKind::Bounce => EffectParams::Bounce(BounceParams {
                height: p.num("height", defaults::BOUNCE_HEIGHT, non_negative),
                speed: p.num("speed", defaults::BOUNCE_SPEED, any),
            }),
            EffectKind::Swing => EffectParams::Swing(SwingParams {
                angle: p.num("angle", defaults::SWING_ANGLE_DEG, any),
                speed: p.num("speed", defaults::SWING_SPEED, any),
            }),
        }
    }
}

fn any(_: f64) -> bool {
    true
}

fn non_negative(v: f64) -> bool {
    v >= 0.0
}

fn unit_interval(v: f64) -> bool {
    (0.0..=1.0).contains(&v)
}

struct Fields<'a>(Option<&'a serde_json::Map<String, serde_json::Value>>);

impl Fields<'_> {
    /// Look up `key`, falling back to its snake_case spelling.
    fn get(&self, key: &str) -> Option<&serde_json::Value> {
        let obj = self.0?;
        obj.get(key).or_else(|| obj.get(&snake_case(key)))
    }

    fn num(&self, key: &str, default: f64, valid: fn(f64) -> bool) -> f64 {
        match self.get(key).and_then(|v| v.as_f64()) {
            Some(v) if v.is_finite() && valid(v) => v,
            _ => default,
        }
    }

    fn word(&self, key: &str) -> Option<String> {
        self.get(key)
            .and_then(|v| v.as_str())
            .map(|s| s.trim().to_ascii_lowercase().replace(['_', '-', ' '], ""))
    }

    /// A `(min, max)` pair; an inverted pair falls back to both defaults.
    fn range(&self, lo: (&str, f64), hi: (&str, f64), valid: fn(f64) -> bool) -> (f64, f64) {
        let min = self.num(lo.0, lo.1, valid);
        let max = self.num(hi.0, hi.1, valid);
        if min <= max { (min, max) } else { (lo.1, hi.1) }
    }
}

fn snake_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            out.push('_');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/effects/params.rs"]
mod tests;
