use crate::foundation::error::{MotionError, MotionResult};

pub use kurbo::{Affine, Point, Rect, Vec2};

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> MotionResult<Self> {
        if width == 0 || height == 0 {
            return Err(MotionError::validation("canvas dimensions must be > 0"));
        }
        if width > u32::from(u16::MAX) || height > u32::from(u16::MAX) {
            return Err(MotionError::validation(
                "canvas dimensions must fit in u16 for raster surfaces",
            ));
        }
        Ok(Self { width, height })
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
        }
    }
}

/// Straight (non-premultiplied) RGB color, used for tints and fills.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    pub const WHITE: Self = Self {
        r: 255,
        g: 255,
        b: 255,
    };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Packed `0xRRGGBB`, the form canvas toolkits take for sprite tints.
    pub fn to_u32(self) -> u32 {
        (u32::from(self.r) << 16) | (u32::from(self.g) << 8) | u32::from(self.b)
    }

    /// Parse `#rrggbb` / `rrggbb`.
    pub fn from_hex(s: &str) -> MotionResult<Self> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(MotionError::validation(format!(
                "color '{s}' must be #rrggbb"
            )));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| MotionError::validation(format!("color '{s}' is not valid hex")))
        };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8Premul {
    pub const OPAQUE_WHITE: Self = Self {
        r: 255,
        g: 255,
        b: 255,
        a: 255,
    };

    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self {
            r: premul_channel(r, a),
            g: premul_channel(g, a),
            b: premul_channel(b, a),
            a,
        }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for Rgba8Premul {
    fn default() -> Self {
        Self::OPAQUE_WHITE
    }
}

pub(crate) fn premul_channel(c: u8, a: u8) -> u8 {
    let c = u16::from(c);
    let a = u16::from(a);
    (((c * a) + 127) / 255) as u8
}

/// Transform of a layer as it is painted: centre position, rotation, uniform scale, opacity
/// and an optional tint.
///
/// This is also the shape of an effect instance's baseline.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LayerTransform {
    pub position: Vec2,
    pub rotation_rad: f64,
    pub scale: f64, // default 1
    pub opacity: f64,
    #[serde(default)]
    pub tint: Option<Rgb8>,
}

impl Default for LayerTransform {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            rotation_rad: 0.0,
            scale: 1.0,
            opacity: 1.0,
            tint: None,
        }
    }
}

impl LayerTransform {
    /// Affine mapping layer-local space (`0..width`, `0..height`) to scene space, pivoting
    /// about the layer centre.
    pub fn to_affine(&self, width: f64, height: f64) -> Affine {
        Affine::translate(self.position)
            * Affine::rotate(self.rotation_rad)
            * Affine::scale(self.scale)
            * Affine::translate(Vec2::new(-width / 2.0, -height / 2.0))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
