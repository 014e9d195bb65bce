use std::fmt;

use crate::foundation::core::{LayerTransform, Rect, Rgb8, Vec2};

/// Stable layer identity. Survives reordering; never reused within a store.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct LayerId(pub String);

impl LayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for LayerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for LayerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    #[default]
    Rect,
    Ellipse,
}

/// What a layer paints.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LayerContent {
    /// Image file (relative to the assets root), optionally cropped to a source rectangle.
    Image {
        src: String,
        #[serde(default)]
        crop: Option<Rect>,
    },
    Shape {
        #[serde(default)]
        shape: ShapeKind,
        fill: Rgb8,
    },
    Text {
        content: String,
        #[serde(default = "default_text_color")]
        color: Rgb8,
    },
}

fn default_text_color() -> Rgb8 {
    Rgb8::new(0, 0, 0)
}

fn default_one() -> f64 {
    1.0
}

fn default_true() -> bool {
    true
}

/// A positioned, orderable visual unit.
///
/// `x`/`y` is the layer centre; `rotation` is in radians. `opacity` is the base opacity: effects
/// may override it when painting but never write it.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Layer {
    pub id: LayerId,
    #[serde(default)]
    pub name: String,
    pub content: LayerContent,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default = "default_one")]
    pub scale: f64,
    #[serde(default = "default_one")]
    pub opacity: f64,
    #[serde(default = "default_true")]
    pub visible: bool,
    /// Paint order index, maintained by the store (0 paints first).
    #[serde(default)]
    pub z_index: usize,
}

impl Layer {
    pub fn new(id: impl Into<String>, content: LayerContent, center: Vec2, size: Vec2) -> Self {
        let id = LayerId::new(id);
        Self {
            name: id.0.clone(),
            id,
            content,
            x: center.x,
            y: center.y,
            width: size.x,
            height: size.y,
            rotation: 0.0,
            scale: 1.0,
            opacity: 1.0,
            visible: true,
            z_index: 0,
        }
    }

    /// The stored transform, without any effect applied.
    pub fn transform(&self) -> LayerTransform {
        LayerTransform {
            position: Vec2::new(self.x, self.y),
            rotation_rad: self.rotation,
            scale: self.scale,
            opacity: self.opacity,
            tint: None,
        }
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

/// Axis-aligned detection box, `[x, y, width, height]` on the wire.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct BBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// From corner form, as object detectors report boxes.
    pub fn from_xyxy(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self::new(x0.min(x1), y0.min(y1), (x1 - x0).abs(), (y1 - y0).abs())
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn to_rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    pub fn is_valid(&self) -> bool {
        [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite())
            && self.width > 0.0
            && self.height > 0.0
    }
}

impl From<[f64; 4]> for BBox {
    fn from(v: [f64; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

impl From<BBox> for [f64; 4] {
    fn from(b: BBox) -> Self {
        [b.x, b.y, b.width, b.height]
    }
}

/// One object-detection result.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DetectedObject {
    #[serde(alias = "class")]
    pub label: String,
    pub confidence: f64,
    pub bbox: BBox,
}

#[cfg(test)]
#[path = "../../tests/unit/layers/model.rs"]
mod tests;
