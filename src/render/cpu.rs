use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use kurbo::Shape;

use crate::{
    assets::decode::{PreparedImage, crop_image, load_image},
    foundation::core::{Affine, Canvas, Rect, Rgb8, Rgba8Premul},
    foundation::error::{MotionError, MotionResult},
    layers::model::{LayerContent, LayerId, ShapeKind},
    render::surface::{FrameRGBA, NodeProps, NodeSpec, RenderSurface},
};

#[derive(Clone)]
struct ImagePaint {
    source: PreparedImage,
    paint: vello_cpu::Image,
}

#[derive(Clone)]
enum NodePaint {
    Image(ImagePaint),
    Shape { shape: ShapeKind, fill: Rgb8 },
    /// Carried through the scene but not rasterized.
    Text,
}

struct CpuNode {
    id: LayerId,
    width: f64,
    height: f64,
    paint: NodePaint,
    props: Option<NodeProps>,
}

/// Raster surface powered by `vello_cpu`. Each [`RenderSurface::present`] produces a
/// premultiplied [`FrameRGBA`].
pub struct CpuSurface {
    assets_root: PathBuf,
    canvas: Canvas,
    background: Rgba8Premul,
    ctx: Option<vello_cpu::RenderContext>,
    nodes: Vec<CpuNode>,
    stage_scale: f64,
    decoded: HashMap<String, PreparedImage>,
    frame: Option<FrameRGBA>,
}

impl CpuSurface {
    pub fn new(assets_root: impl Into<PathBuf>) -> Self {
        Self {
            assets_root: assets_root.into(),
            canvas: Canvas::default(),
            background: Rgba8Premul::OPAQUE_WHITE,
            ctx: None,
            nodes: Vec::new(),
            stage_scale: 1.0,
            decoded: HashMap::new(),
            frame: None,
        }
    }

    /// Most recently presented frame.
    pub fn frame(&self) -> Option<&FrameRGBA> {
        self.frame.as_ref()
    }

    pub fn take_frame(&mut self) -> Option<FrameRGBA> {
        self.frame.take()
    }

    fn dims(&self) -> MotionResult<(u16, u16)> {
        let w = u16::try_from(self.canvas.width)
            .map_err(|_| MotionError::render("canvas width exceeds u16"))?;
        let h = u16::try_from(self.canvas.height)
            .map_err(|_| MotionError::render("canvas height exceeds u16"))?;
        Ok((w, h))
    }

    fn position(&self, id: &LayerId) -> MotionResult<usize> {
        self.nodes
            .iter()
            .position(|n| &n.id == id)
            .ok_or_else(|| MotionError::render(format!("no node for layer '{id}'")))
    }

    fn image_paint_for(
        &mut self,
        src: &str,
        crop: Option<Rect>,
    ) -> MotionResult<ImagePaint> {
        let full = match self.decoded.get(src) {
            Some(img) => img.clone(),
            None => {
                let img = load_image(&self.assets_root, src)?;
                self.decoded.insert(src.to_string(), img.clone());
                img
            }
        };
        let source = match crop {
            Some(region) => crop_image(&full, region)?,
            None => full,
        };
        let paint = image_from_premul(&source.rgba8_premul, source.width, source.height)?;
        Ok(ImagePaint { source, paint })
    }

    fn draw_node(ctx: &mut vello_cpu::RenderContext, node: &CpuNode, stage: Affine) -> MotionResult<()> {
        let Some(props) = node.props else {
            return Ok(());
        };
        if !props.visible {
            return Ok(());
        }
        let t = props.transform;
        let opacity = t.opacity.clamp(0.0, 1.0) as f32;
        if opacity <= 0.0 {
            return Ok(());
        }
        let tr = stage * t.to_affine(node.width, node.height);

        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        if opacity < 1.0 {
            ctx.push_opacity_layer(opacity);
        }
        match &node.paint {
            NodePaint::Image(img) => {
                let (iw, ih) = (f64::from(img.source.width), f64::from(img.source.height));
                // Stretch the image over the layer box.
                let fit = Affine::scale_non_uniform(node.width / iw, node.height / ih);
                ctx.set_transform(affine_to_cpu(tr * fit));
                match t.tint {
                    Some(tint) => {
                        let mut bytes = img.source.rgba8_premul.as_ref().clone();
                        tint_rgba8_premul_in_place(&mut bytes, tint);
                        ctx.set_paint(image_from_premul(&bytes, img.source.width, img.source.height)?);
                    }
                    None => ctx.set_paint(img.paint.clone()),
                }
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, iw, ih));
            }
            NodePaint::Shape { shape, fill } => {
                let c = t.tint.map_or(*fill, |tint| tint_rgb(*fill, tint));
                ctx.set_transform(affine_to_cpu(tr));
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, 255));
                match shape {
                    ShapeKind::Rect => {
                        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, node.width, node.height));
                    }
                    ShapeKind::Ellipse => {
                        let (rx, ry) = (node.width / 2.0, node.height / 2.0);
                        let e = kurbo::Ellipse::new((rx, ry), (rx, ry), 0.0);
                        let mut p = vello_cpu::kurbo::BezPath::new();
                        for el in e.path_elements(0.1) {
                            p.push(el);
                        }
                        ctx.fill_path(&p);
                    }
                }
            }
            NodePaint::Text => {
                tracing::trace!(layer = %node.id, "text layers are not rasterized");
            }
        }
        if opacity < 1.0 {
            ctx.pop_layer();
        }
        Ok(())
    }
}

impl RenderSurface for CpuSurface {
    fn init(&mut self, canvas: Canvas, background: Rgba8Premul) -> MotionResult<()> {
        if self.ctx.is_some() {
            return Err(MotionError::render("surface is already initialized"));
        }
        self.canvas = canvas;
        self.background = background;
        let (w, h) = self.dims()?;
        self.ctx = Some(vello_cpu::RenderContext::new(w, h));
        Ok(())
    }

    fn insert_node(&mut self, index: usize, node: &NodeSpec) -> MotionResult<()> {
        if self.ctx.is_none() {
            return Err(MotionError::render("surface is not initialized"));
        }
        let paint = match &node.content {
            LayerContent::Image { src, crop } => NodePaint::Image(self.image_paint_for(src, *crop)?),
            LayerContent::Shape { shape, fill } => NodePaint::Shape {
                shape: *shape,
                fill: *fill,
            },
            LayerContent::Text { .. } => NodePaint::Text,
        };
        let index = index.min(self.nodes.len());
        self.nodes.insert(
            index,
            CpuNode {
                id: node.id.clone(),
                width: node.size.x,
                height: node.size.y,
                paint,
                props: None,
            },
        );
        Ok(())
    }

    fn remove_node(&mut self, id: &LayerId) -> MotionResult<()> {
        let pos = self.position(id)?;
        self.nodes.remove(pos);
        Ok(())
    }

    fn move_node(&mut self, id: &LayerId, index: usize) -> MotionResult<()> {
        let pos = self.position(id)?;
        let node = self.nodes.remove(pos);
        let index = index.min(self.nodes.len());
        self.nodes.insert(index, node);
        Ok(())
    }

    fn update_node(&mut self, id: &LayerId, props: &NodeProps) -> MotionResult<()> {
        let pos = self.position(id)?;
        self.nodes[pos].props = Some(*props);
        Ok(())
    }

    fn set_stage_scale(&mut self, scale: f64) -> MotionResult<()> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(MotionError::render("stage scale must be finite and > 0"));
        }
        self.stage_scale = scale;
        Ok(())
    }

    fn present(&mut self) -> MotionResult<()> {
        let (w, h) = self.dims()?;
        let mut ctx = self
            .ctx
            .take()
            .ok_or_else(|| MotionError::render("surface is not initialized"))?;
        ctx.reset();

        let bg = self.background;
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(bg.r, bg.g, bg.b, bg.a));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, f64::from(w), f64::from(h)));

        let stage = Affine::scale(self.stage_scale);
        let drawn = self
            .nodes
            .iter()
            .try_for_each(|node| Self::draw_node(&mut ctx, node, stage));

        let result = drawn.map(|()| {
            ctx.flush();
            let mut pixmap = vello_cpu::Pixmap::new(w, h);
            ctx.render_to_pixmap(&mut pixmap);
            FrameRGBA {
                width: u32::from(w),
                height: u32::from(h),
                data: pixmap.data_as_u8_slice().to_vec(),
                premultiplied: true,
            }
        });
        self.ctx = Some(ctx);
        self.frame = Some(result?);
        Ok(())
    }

    fn destroy(&mut self) -> MotionResult<()> {
        self.ctx = None;
        self.nodes.clear();
        self.decoded.clear();
        Ok(())
    }
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn image_from_premul(bytes: &[u8], width: u32, height: u32) -> MotionResult<vello_cpu::Image> {
    let pixmap = pixmap_from_premul_bytes(bytes, width, height)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> MotionResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| MotionError::render("pixmap width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| MotionError::render("pixmap height exceeds u16"))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(MotionError::render("pixmap byte len mismatch"));
    }
    let pixels = bytes
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]]))
        .collect::<Vec<_>>();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, true))
}

fn mul_div255_u8(x: u16, y: u16) -> u8 {
    ((x * y + 127) / 255) as u8
}

/// Multiply color channels by `tint`, the way a sprite tint does. Alpha is kept.
pub(crate) fn tint_rgba8_premul_in_place(rgba: &mut [u8], tint: Rgb8) {
    for px in rgba.chunks_exact_mut(4) {
        px[0] = mul_div255_u8(u16::from(px[0]), u16::from(tint.r));
        px[1] = mul_div255_u8(u16::from(px[1]), u16::from(tint.g));
        px[2] = mul_div255_u8(u16::from(px[2]), u16::from(tint.b));
    }
}

pub(crate) fn tint_rgb(c: Rgb8, tint: Rgb8) -> Rgb8 {
    Rgb8::new(
        mul_div255_u8(u16::from(c.r), u16::from(tint.r)),
        mul_div255_u8(u16::from(c.g), u16::from(tint.g)),
        mul_div255_u8(u16::from(c.b), u16::from(tint.b)),
    )
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
