use std::fmt;

/// The fixed set of procedural motion behaviors.
///
/// Declaration order is the canonical order used when a layer's effects are listed.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum EffectKind {
    Rotate,
    Scale,
    Translate,
    Fade,
    ColorShift,
    Shake,
    Bounce,
    Swing,
}

impl EffectKind {
    pub const ALL: [EffectKind; 8] = [
        EffectKind::Rotate,
        EffectKind::Scale,
        EffectKind::Translate,
        EffectKind::Fade,
        EffectKind::ColorShift,
        EffectKind::Shake,
        EffectKind::Bounce,
        EffectKind::Swing,
    ];

    /// Name as it appears in editor settings.
    pub fn as_str(self) -> &'static str {
        match self {
            EffectKind::Rotate => "rotate",
            EffectKind::Scale => "scale",
            EffectKind::Translate => "translate",
            EffectKind::Fade => "fade",
            EffectKind::ColorShift => "colorShift",
            EffectKind::Shake => "shake",
            EffectKind::Bounce => "bounce",
            EffectKind::Swing => "swing",
        }
    }

    /// Lenient lookup: case, `_` and `-` are ignored, so `color_shift` and `colorshift` both
    /// resolve. Returns `None` for kinds outside the registry.
    pub fn parse(name: &str) -> Option<Self> {
        let folded: String = name
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match folded.as_str() {
            "rotate" => Some(EffectKind::Rotate),
            "scale" => Some(EffectKind::Scale),
            "translate" => Some(EffectKind::Translate),
            "fade" => Some(EffectKind::Fade),
            "colorshift" => Some(EffectKind::ColorShift),
            "shake" => Some(EffectKind::Shake),
            "bounce" => Some(EffectKind::Bounce),
            "swing" => Some(EffectKind::Swing),
            _ => None,
        }
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
