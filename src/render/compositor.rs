//! Render Compositor: keeps a retained surface in step with the layer store.

use crate::{
    animation::combine::CombinedTransform,
    foundation::core::{Canvas, Rgba8Premul},
    foundation::error::{MotionError, MotionResult},
    layers::model::{Layer, LayerId},
    layers::store::LayerStore,
    render::surface::{NodeProps, NodeSpec, RenderSurface},
};

/// Counts of surface calls issued since mount.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct CompositorStats {
    pub inits: u64,
    pub destroys: u64,
    pub inserts: u64,
    pub removes: u64,
    pub moves: u64,
    pub updates: u64,
    pub presents: u64,
}

/// Owns a mounted surface and mirrors its node list.
///
/// The surface is initialized once in [`Compositor::mount`] and destroyed once in
/// [`Compositor::unmount`]; layer additions, removals and reorders are applied as individual
/// node operations.
#[derive(Debug)]
pub struct Compositor<S: RenderSurface> {
    surface: S,
    nodes: Vec<NodeSpec>,
    stage_scale: f64,
    stats: CompositorStats,
    live: bool,
}

impl<S: RenderSurface> Compositor<S> {
    #[tracing::instrument(skip(surface))]
    pub fn mount(
        mut surface: S,
        canvas: Canvas,
        background: Rgba8Premul,
        zoom_percent: u32,
    ) -> MotionResult<Self> {
        let stage_scale = zoom_to_scale(zoom_percent)?;
        surface.init(canvas, background)?;
        surface.set_stage_scale(stage_scale)?;
        Ok(Self {
            surface,
            nodes: Vec::new(),
            stage_scale,
            stats: CompositorStats {
                inits: 1,
                ..CompositorStats::default()
            },
            live: true,
        })
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn stats(&self) -> CompositorStats {
        self.stats
    }

    pub fn stage_scale(&self) -> f64 {
        self.stage_scale
    }

    pub fn is_live(&self) -> bool {
        self.live
    }

    /// Apply a zoom percentage as the stage scale.
    pub fn set_zoom(&mut self, zoom_percent: u32) -> MotionResult<()> {
        self.ensure_live()?;
        let scale = zoom_to_scale(zoom_percent)?;
        if scale != self.stage_scale {
            self.surface.set_stage_scale(scale)?;
            self.stage_scale = scale;
        }
        Ok(())
    }

    /// Bring the surface in line with `store` and paint `transforms`.
    ///
    /// Layers without a combined transform paint their stored transform.
    #[tracing::instrument(skip_all, fields(layers = store.len()))]
    pub fn sync(
        &mut self,
        store: &LayerStore,
        transforms: &[CombinedTransform],
    ) -> MotionResult<()> {
        self.ensure_live()?;

        // Drop nodes whose layer is gone.
        let mut i = 0;
        while i < self.nodes.len() {
            if store.contains(&self.nodes[i].id) {
                i += 1;
                continue;
            }
            let gone = self.nodes.remove(i);
            self.surface.remove_node(&gone.id)?;
            self.stats.removes += 1;
            tracing::debug!(layer = %gone.id, "removed node");
        }

        for (index, layer) in store.iter().enumerate() {
            let spec = node_spec(layer);
            match self.nodes.iter().position(|n| n.id == layer.id) {
                None => self.insert(index, spec)?,
                Some(pos) if self.nodes[pos] != spec => {
                    // Content or size changed: rebuild just this node.
                    self.nodes.remove(pos);
                    self.surface.remove_node(&layer.id)?;
                    self.stats.removes += 1;
                    self.insert(index, spec)?;
                }
                Some(pos) if pos != index => {
                    let node = self.nodes.remove(pos);
                    self.nodes.insert(index, node);
                    self.surface.move_node(&layer.id, index)?;
                    self.stats.moves += 1;
                }
                Some(_) => {}
            }

            let transform = transforms
                .iter()
                .find(|c| c.layer == layer.id)
                .map_or_else(|| layer.transform(), |c| c.transform);
            self.surface.update_node(
                &layer.id,
                &NodeProps {
                    transform,
                    visible: layer.visible,
                },
            )?;
            self.stats.updates += 1;
        }

        self.surface.present()?;
        self.stats.presents += 1;
        Ok(())
    }

    /// Destroy the surface's resources and hand it back.
    pub fn unmount(mut self) -> MotionResult<S> {
        self.teardown()?;
        Ok(self.surface)
    }

    pub(crate) fn teardown(&mut self) -> MotionResult<()> {
        if !self.live {
            return Ok(());
        }
        self.live = false;
        self.nodes.clear();
        self.surface.destroy()?;
        self.stats.destroys += 1;
        Ok(())
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &LayerId> {
        self.nodes.iter().map(|n| &n.id)
    }

    fn insert(&mut self, index: usize, spec: NodeSpec) -> MotionResult<()> {
        self.surface.insert_node(index, &spec)?;
        tracing::debug!(layer = %spec.id, index, "inserted node");
        self.nodes.insert(index, spec);
        self.stats.inserts += 1;
        Ok(())
    }

    fn ensure_live(&self) -> MotionResult<()> {
        if self.live {
            Ok(())
        } else {
            Err(MotionError::render("compositor is unmounted"))
        }
    }
}

fn node_spec(layer: &Layer) -> NodeSpec {
    NodeSpec {
        id: layer.id.clone(),
        content: layer.content.clone(),
        size: layer.size(),
    }
}

/// Zoom percentage to stage scale. `0` is rejected.
pub fn zoom_to_scale(zoom_percent: u32) -> MotionResult<f64> {
    if zoom_percent == 0 {
        return Err(MotionError::validation("zoom must be > 0 percent"));
    }
    Ok(f64::from(zoom_percent) / 100.0)
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
