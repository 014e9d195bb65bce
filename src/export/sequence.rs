//! Offline rendering of a project into a numbered PNG sequence.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde_json::json;

use crate::{
    engine::Engine,
    foundation::error::{MotionError, MotionResult},
    project::Project,
    render::cpu::CpuSurface,
    render::surface::FrameRGBA,
};

/// How many frames to render and where to put them.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SequenceOpts {
    pub out_dir: PathBuf,
    pub frames: u32,
    pub fps: f64,
}

impl SequenceOpts {
    pub fn validate(&self) -> MotionResult<()> {
        if self.frames == 0 {
            return Err(MotionError::validation("frame count must be > 0"));
        }
        if !self.fps.is_finite() || self.fps <= 0.0 {
            return Err(MotionError::validation("fps must be finite and > 0"));
        }
        Ok(())
    }
}

pub fn frame_file_name(index: u32) -> String {
    format!("frame_{index:05}.png")
}

/// Write one frame as a straight-alpha PNG.
pub fn save_frame_png(frame: &FrameRGBA, path: &Path) -> MotionResult<()> {
    let data = frame.to_straight_rgba8();
    image::save_buffer_with_format(
        path,
        &data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}

/// Mount a CPU engine for `project`, tick `frames` times at `1 / fps` and save each frame.
///
/// The first frame is rendered at `dt = 0`, so it shows every effect at its starting phase.
/// Returns a JSON summary suitable as an export job result.
#[tracing::instrument(skip(project), fields(frames = opts.frames, fps = opts.fps))]
pub fn render_sequence(project: &Project, opts: &SequenceOpts) -> MotionResult<serde_json::Value> {
    opts.validate()?;
    let store = project.build_store()?;
    std::fs::create_dir_all(&opts.out_dir)
        .with_context(|| format!("create output dir '{}'", opts.out_dir.display()))?;

    let surface = CpuSurface::new(project.engine.assets_root.clone());
    let mut engine = Engine::mount(project.engine.clone(), surface)?;
    engine.submit_settings(project.settings.clone());

    let dt = 1.0 / opts.fps;
    let mut files = Vec::with_capacity(opts.frames as usize);
    for i in 0..opts.frames {
        let report = engine.tick(&store, if i == 0 { 0.0 } else { dt })?;
        for fault in &report.faults {
            tracing::warn!(layer = %fault.key.0, effect = ?fault.key.1, reason = %fault.reason, "effect fault");
        }
        let frame = engine
            .surface_mut()
            .take_frame()
            .ok_or_else(|| MotionError::render("surface presented no frame"))?;
        let name = frame_file_name(i);
        save_frame_png(&frame, &opts.out_dir.join(&name))?;
        files.push(name);
    }

    let unmounted = engine.unmount()?;
    tracing::debug!(released = unmounted.released, "sequence rendered");
    Ok(json!({
        "dir": opts.out_dir.display().to_string(),
        "frames": opts.frames,
        "fps": opts.fps,
        "files": files,
    }))
}

#[cfg(test)]
#[path = "../../tests/unit/export/sequence.rs"]
mod tests;
