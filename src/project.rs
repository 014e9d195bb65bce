use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::{
    animation::config::EffectConfiguration,
    engine::EngineOpts,
    export::jobs::ExportRequest,
    foundation::error::{MotionError, MotionResult},
    layers::model::{DetectedObject, Layer},
    layers::store::LayerStore,
};

fn default_min_confidence() -> f64 {
    0.5
}

/// JSON project document: source image, detections, extra layers and effect settings.
///
/// ```json
/// {
///   "image": "photo.png",
///   "detections": [{ "label": "dog", "confidence": 0.9, "bbox": [10, 20, 100, 80] }],
///   "settings": { "dog-0": { "bounce": { "enabled": true, "height": 30 } } }
/// }
/// ```
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Project {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub engine: EngineOpts,
    /// Source image, relative to the assets root.
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub detections: Vec<DetectedObject>,
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,
    /// Layers added on top of the detected ones.
    #[serde(default)]
    pub layers: Vec<Layer>,
    #[serde(default)]
    pub settings: EffectConfiguration,
    /// Animation label sent with export requests.
    #[serde(default)]
    pub animation_type: Option<String>,
}

impl Project {
    pub fn from_reader<R: std::io::Read>(r: R) -> MotionResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| MotionError::serde(format!("parse project JSON: {e}")))
    }

    pub fn from_json_str(s: &str) -> MotionResult<Self> {
        serde_json::from_str(s).map_err(|e| MotionError::serde(format!("parse project JSON: {e}")))
    }

    /// Load from disk. A relative assets root is resolved against the file's directory.
    pub fn from_path(path: impl AsRef<Path>) -> MotionResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            MotionError::validation(format!("open project JSON '{}': {e}", path.display()))
        })?;
        let mut project = Self::from_reader(BufReader::new(f))?;
        if project.engine.assets_root.is_relative() {
            let base = path.parent().unwrap_or_else(|| Path::new("."));
            project.engine.assets_root = base.join(&project.engine.assets_root);
        }
        Ok(project)
    }

    /// Detected layers first (paint order follows detection order), then explicit layers.
    pub fn build_store(&self) -> MotionResult<LayerStore> {
        let mut store = match (&self.image, self.detections.is_empty()) {
            (Some(image), false) => {
                LayerStore::from_detections(&self.detections, image, self.min_confidence)?
            }
            (None, false) => {
                return Err(MotionError::validation(
                    "project has detections but no source image",
                ));
            }
            (_, true) => LayerStore::new(),
        };
        for layer in &self.layers {
            store.add(layer.clone())?;
        }
        Ok(store)
    }

    pub fn export_request(&self) -> MotionResult<ExportRequest> {
        let image_path = self
            .image
            .clone()
            .ok_or_else(|| MotionError::validation("project has no source image to export"))?;
        let animation_type = self
            .animation_type
            .clone()
            .unwrap_or_else(|| enabled_kinds_label(&self.settings));
        Ok(ExportRequest {
            image_path,
            animation_type,
            objects: self.detections.clone(),
        })
    }
}

/// `+`-joined names of every enabled effect, e.g. `bounce+rotate`.
fn enabled_kinds_label(settings: &EffectConfiguration) -> String {
    let mut kinds: Vec<&str> = settings
        .entries()
        .filter(|(_, _, s)| s.enabled)
        .map(|(_, kind, _)| kind)
        .collect();
    kinds.sort_unstable();
    kinds.dedup();
    kinds.join("+")
}

#[cfg(test)]
#[path = "../tests/unit/project/project.rs"]
mod tests;
