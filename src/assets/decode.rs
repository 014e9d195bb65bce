use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use crate::foundation::core::Rect;
use crate::foundation::error::{MotionError, MotionResult};

/// Decoded raster, premultiplied RGBA8, tightly packed, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct PreparedImage {
    pub width: u32,
    pub height: u32,
    pub rgba8_premul: Arc<Vec<u8>>,
}

/// Decode encoded image bytes and convert to premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> MotionResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

/// Read and decode `rel` under `root`.
pub fn load_image(root: &Path, rel: &str) -> MotionResult<PreparedImage> {
    let norm = normalize_rel_path(rel)?;
    let path = root.join(Path::new(&norm));
    let bytes = std::fs::read(&path)
        .with_context(|| format!("read image asset '{}'", path.display()))?;
    decode_image(&bytes)
}

/// Copy the pixels under `region` (source pixel space, clipped to the image).
///
/// Detection boxes are fractional; the crop covers every pixel the box touches.
pub fn crop_image(img: &PreparedImage, region: Rect) -> MotionResult<PreparedImage> {
    let x0 = region.x0.max(0.0).floor() as u32;
    let y0 = region.y0.max(0.0).floor() as u32;
    let x1 = (region.x1.ceil().max(0.0) as u32).min(img.width);
    let y1 = (region.y1.ceil().max(0.0) as u32).min(img.height);
    if x0 >= x1 || y0 >= y1 {
        return Err(MotionError::validation(format!(
            "crop region {region:?} does not overlap a {}x{} image",
            img.width, img.height
        )));
    }

    let (w, h) = (x1 - x0, y1 - y0);
    let stride = img.width as usize * 4;
    let mut out = Vec::with_capacity(w as usize * h as usize * 4);
    for y in y0..y1 {
        let start = y as usize * stride + x0 as usize * 4;
        out.extend_from_slice(&img.rgba8_premul[start..start + w as usize * 4]);
    }

    Ok(PreparedImage {
        width: w,
        height: h,
        rgba8_premul: Arc::new(out),
    })
}

/// Asset paths are relative, `/`-separated, and may not escape the assets root.
pub fn normalize_rel_path(source: &str) -> MotionResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(MotionError::validation("asset paths must be relative"));
    }
    if s.is_empty() {
        return Err(MotionError::validation("asset path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(MotionError::validation("asset paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(MotionError::validation("asset path must contain a file name"));
    }
    Ok(out.join("/"))
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
