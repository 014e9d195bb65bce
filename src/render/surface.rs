use crate::{
    foundation::core::{Canvas, LayerTransform, Rgba8Premul, Vec2},
    foundation::error::MotionResult,
    layers::model::{LayerContent, LayerId},
};

/// Everything a surface needs to create the retained node for one layer.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct NodeSpec {
    pub id: LayerId,
    pub content: LayerContent,
    pub size: Vec2,
}

/// Per-tick properties of a retained node.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct NodeProps {
    pub transform: LayerTransform,
    pub visible: bool,
}

/// A rendered frame as RGBA8 pixels.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Pixel at `(x, y)`, or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        self.data.get(i..i + 4).map(|p| [p[0], p[1], p[2], p[3]])
    }

    /// Straight-alpha copy of the pixels, as image encoders expect.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        if !self.premultiplied {
            return out;
        }
        for px in out.chunks_exact_mut(4) {
            let a = u16::from(px[3]);
            if a == 0 || a == 255 {
                continue;
            }
            for c in &mut px[..3] {
                *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
            }
        }
        out
    }
}

/// Canvas-like retained rendering surface driven by the compositor.
///
/// Nodes are addressed by layer id; `index` is the paint position (0 paints first). The
/// stage scale applies to the whole scene, never to individual nodes.
pub trait RenderSurface {
    /// Allocate rendering resources. Called once per mount.
    fn init(&mut self, canvas: Canvas, background: Rgba8Premul) -> MotionResult<()>;

    fn insert_node(&mut self, index: usize, node: &NodeSpec) -> MotionResult<()>;

    fn remove_node(&mut self, id: &LayerId) -> MotionResult<()>;

    fn move_node(&mut self, id: &LayerId, index: usize) -> MotionResult<()>;

    fn update_node(&mut self, id: &LayerId, props: &NodeProps) -> MotionResult<()>;

    fn set_stage_scale(&mut self, scale: f64) -> MotionResult<()>;

    /// Draw the current scene.
    fn present(&mut self) -> MotionResult<()>;

    /// Free rendering resources. Called once per unmount.
    fn destroy(&mut self) -> MotionResult<()>;
}

impl<S: RenderSurface + ?Sized> RenderSurface for Box<S> {
    fn init(&mut self, canvas: Canvas, background: Rgba8Premul) -> MotionResult<()> {
        (**self).init(canvas, background)
    }

    fn insert_node(&mut self, index: usize, node: &NodeSpec) -> MotionResult<()> {
        (**self).insert_node(index, node)
    }

    fn remove_node(&mut self, id: &LayerId) -> MotionResult<()> {
        (**self).remove_node(id)
    }

    fn move_node(&mut self, id: &LayerId, index: usize) -> MotionResult<()> {
        (**self).move_node(id, index)
    }

    fn update_node(&mut self, id: &LayerId, props: &NodeProps) -> MotionResult<()> {
        (**self).update_node(id, props)
    }

    fn set_stage_scale(&mut self, scale: f64) -> MotionResult<()> {
        (**self).set_stage_scale(scale)
    }

    fn present(&mut self) -> MotionResult<()> {
        (**self).present()
    }

    fn destroy(&mut self) -> MotionResult<()> {
        (**self).destroy()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
