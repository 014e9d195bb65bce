use std::collections::BTreeMap;

use crate::{
    foundation::core::Vec2,
    foundation::error::{MotionError, MotionResult},
    layers::model::{DetectedObject, Layer, LayerContent, LayerId},
};

/// Ordered collection of layers. Index 0 paints first (bottom).
///
/// All mutation goes through the methods below; every successful mutation bumps
/// [`LayerStore::revision`].
#[derive(Clone, Debug, Default)]
pub struct LayerStore {
    layers: Vec<Layer>,
    revision: u64,
}

impl LayerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// One image layer per detection with `confidence >= min_confidence`, each cropped from
    /// `source_image` to its box. Detections with degenerate boxes are skipped.
    pub fn from_detections(
        objects: &[DetectedObject],
        source_image: &str,
        min_confidence: f64,
    ) -> MotionResult<Self> {
        let mut store = Self::new();
        let mut per_label: BTreeMap<String, usize> = BTreeMap::new();
        for obj in objects {
            if !(obj.confidence >= min_confidence) || !obj.bbox.is_valid() {
                tracing::debug!(
                    label = %obj.label,
                    confidence = obj.confidence,
                    "skipping detection"
                );
                continue;
            }
            let slug = slugify(&obj.label);
            let n = per_label.entry(slug.clone()).or_insert(0);
            let id = format!("{slug}-{n}");
            *n += 1;

            let mut layer = Layer::new(
                id,
                LayerContent::Image {
                    src: source_image.to_string(),
                    crop: Some(obj.bbox.to_rect()),
                },
                obj.bbox.center(),
                Vec2::new(obj.bbox.width, obj.bbox.height),
            );
            layer.name = obj.label.clone();
            store.add(layer)?;
        }
        Ok(store)
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Layers in paint order.
    pub fn iter(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &LayerId> {
        self.layers.iter().map(|l| &l.id)
    }

    pub fn get(&self, id: &LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| &l.id == id)
    }

    pub fn contains(&self, id: &LayerId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn index_of(&self, id: &LayerId) -> Option<usize> {
        self.layers.iter().position(|l| &l.id == id)
    }

    /// Add a layer on top of the stack.
    pub fn add(&mut self, layer: Layer) -> MotionResult<()> {
        let index = self.layers.len();
        self.insert(index, layer)
    }

    pub fn insert(&mut self, index: usize, layer: Layer) -> MotionResult<()> {
        if self.contains(&layer.id) {
            return Err(MotionError::validation(format!(
                "layer '{}' already exists",
                layer.id
            )));
        }
        if index > self.layers.len() {
            return Err(MotionError::validation(format!(
                "insert index {index} is out of range for {} layers",
                self.layers.len()
            )));
        }
        validate_geometry(&layer)?;
        tracing::debug!(layer = %layer.id, index, "adding layer");
        self.layers.insert(index, layer);
        self.renumber();
        Ok(())
    }

    pub fn remove(&mut self, id: &LayerId) -> MotionResult<Layer> {
        let index = self.require_index(id)?;
        let layer = self.layers.remove(index);
        tracing::debug!(layer = %id, "removed layer");
        self.renumber();
        Ok(layer)
    }

    /// Drag-and-drop reorder: take the layer at `from` and drop it at `to`.
    pub fn reorder(&mut self, from: usize, to: usize) -> MotionResult<()> {
        let len = self.layers.len();
        if from >= len || to >= len {
            return Err(MotionError::validation(format!(
                "reorder {from} -> {to} is out of range for {len} layers"
            )));
        }
        if from == to {
            return Ok(());
        }
        let layer = self.layers.remove(from);
        tracing::debug!(layer = %layer.id, from, to, "reordered layer");
        self.layers.insert(to, layer);
        self.renumber();
        Ok(())
    }

    pub fn move_to(&mut self, id: &LayerId, to: usize) -> MotionResult<()> {
        let from = self.require_index(id)?;
        self.reorder(from, to)
    }

    /// Flip visibility; returns the new value.
    pub fn toggle_visibility(&mut self, id: &LayerId) -> MotionResult<bool> {
        let layer = self.require_mut(id)?;
        layer.visible = !layer.visible;
        let visible = layer.visible;
        tracing::debug!(layer = %id, visible, "toggled visibility");
        self.revision += 1;
        Ok(visible)
    }

    /// Set the base opacity, clamped to `[0, 1]`.
    pub fn set_opacity(&mut self, id: &LayerId, opacity: f64) -> MotionResult<()> {
        if !opacity.is_finite() {
            return Err(MotionError::validation("opacity must be finite"));
        }
        let layer = self.require_mut(id)?;
        layer.opacity = opacity.clamp(0.0, 1.0);
        self.revision += 1;
        Ok(())
    }

    pub fn set_position(&mut self, id: &LayerId, center: Vec2) -> MotionResult<()> {
        if !center.is_finite() {
            return Err(MotionError::validation("position must be finite"));
        }
        let layer = self.require_mut(id)?;
        layer.x = center.x;
        layer.y = center.y;
        self.revision += 1;
        Ok(())
    }

    pub fn set_rotation(&mut self, id: &LayerId, rotation_rad: f64) -> MotionResult<()> {
        if !rotation_rad.is_finite() {
            return Err(MotionError::validation("rotation must be finite"));
        }
        self.require_mut(id)?.rotation = rotation_rad;
        self.revision += 1;
        Ok(())
    }

    pub fn set_scale(&mut self, id: &LayerId, scale: f64) -> MotionResult<()> {
        if !scale.is_finite() || scale < 0.0 {
            return Err(MotionError::validation("scale must be finite and >= 0"));
        }
        self.require_mut(id)?.scale = scale;
        self.revision += 1;
        Ok(())
    }

    fn require_index(&self, id: &LayerId) -> MotionResult<usize> {
        self.index_of(id)
            .ok_or_else(|| MotionError::validation(format!("unknown layer '{id}'")))
    }

    fn require_mut(&mut self, id: &LayerId) -> MotionResult<&mut Layer> {
        self.layers
            .iter_mut()
            .find(|l| &l.id == id)
            .ok_or_else(|| MotionError::validation(format!("unknown layer '{id}'")))
    }

    fn renumber(&mut self) {
        for (i, layer) in self.layers.iter_mut().enumerate() {
            layer.z_index = i;
        }
        self.revision += 1;
    }
}

fn validate_geometry(layer: &Layer) -> MotionResult<()> {
    let finite = [
        layer.x,
        layer.y,
        layer.width,
        layer.height,
        layer.rotation,
        layer.scale,
        layer.opacity,
    ]
    .iter()
    .all(|v| v.is_finite());
    if !finite {
        return Err(MotionError::validation(format!(
            "layer '{}' geometry must be finite",
            layer.id
        )));
    }
    if layer.width < 0.0 || layer.height < 0.0 {
        return Err(MotionError::validation(format!(
            "layer '{}' size must be >= 0",
            layer.id
        )));
    }
    Ok(())
}

fn slugify(label: &str) -> String {
    let slug: String = label
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();
    if slug.is_empty() {
        "object".to_string()
    } else {
        slug
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layers/store.rs"]
mod tests;
