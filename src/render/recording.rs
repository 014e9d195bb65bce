use crate::{
    foundation::core::{Canvas, Rgba8Premul},
    foundation::error::{MotionError, MotionResult},
    layers::model::LayerId,
    render::surface::{NodeProps, NodeSpec, RenderSurface},
};

/// One call received by a [`RecordingSurface`].
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum SurfaceOp {
    Init { width: u32, height: u32 },
    Insert { id: LayerId, index: usize },
    Remove { id: LayerId },
    Move { id: LayerId, index: usize },
    Update { id: LayerId },
    StageScale { scale: f64 },
    Present,
    Destroy,
}

/// Headless surface: keeps the retained node list and records every call.
///
/// Rejects calls on an uninitialized or destroyed surface, so lifecycle bugs surface as errors.
#[derive(Debug)]
pub struct RecordingSurface {
    ops: Vec<SurfaceOp>,
    nodes: Vec<(LayerId, Option<NodeProps>)>,
    stage_scale: f64,
    live: bool,
    record_updates: bool,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self {
            ops: Vec::new(),
            nodes: Vec::new(),
            stage_scale: 1.0,
            live: false,
            record_updates: true,
        }
    }

    /// Skip `Update`/`Present` entries in the op log (long simulations).
    pub fn without_update_log(mut self) -> Self {
        self.record_updates = false;
        self
    }

    pub fn ops(&self) -> &[SurfaceOp] {
        &self.ops
    }

    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }

    pub fn count(&self, pred: impl Fn(&SurfaceOp) -> bool) -> usize {
        self.ops.iter().filter(|op| pred(op)).count()
    }

    /// Node ids in paint order.
    pub fn order(&self) -> Vec<&LayerId> {
        self.nodes.iter().map(|(id, _)| id).collect()
    }

    pub fn props(&self, id: &LayerId) -> Option<&NodeProps> {
        self.nodes
            .iter()
            .find(|(n, _)| n == id)
            .and_then(|(_, p)| p.as_ref())
    }

    pub fn stage_scale(&self) -> f64 {
        self.stage_scale
    }

    pub fn is_live(&self) -> bool {
        self.live
    }

    fn ensure_live(&self) -> MotionResult<()> {
        if self.live {
            Ok(())
        } else {
            Err(MotionError::render("surface is not initialized"))
        }
    }

    fn position(&self, id: &LayerId) -> MotionResult<usize> {
        self.nodes
            .iter()
            .position(|(n, _)| n == id)
            .ok_or_else(|| MotionError::render(format!("no node for layer '{id}'")))
    }
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderSurface for RecordingSurface {
    fn init(&mut self, canvas: Canvas, _background: Rgba8Premul) -> MotionResult<()> {
        if self.live {
            return Err(MotionError::render("surface is already initialized"));
        }
        self.live = true;
        self.ops.push(SurfaceOp::Init {
            width: canvas.width,
            height: canvas.height,
        });
        Ok(())
    }

    fn insert_node(&mut self, index: usize, node: &NodeSpec) -> MotionResult<()> {
        self.ensure_live()?;
        if self.nodes.iter().any(|(n, _)| n == &node.id) {
            return Err(MotionError::render(format!(
                "node for layer '{}' already exists",
                node.id
            )));
        }
        let index = index.min(self.nodes.len());
        self.nodes.insert(index, (node.id.clone(), None));
        self.ops.push(SurfaceOp::Insert {
            id: node.id.clone(),
            index,
        });
        Ok(())
    }

    fn remove_node(&mut self, id: &LayerId) -> MotionResult<()> {
        self.ensure_live()?;
        let pos = self.position(id)?;
        self.nodes.remove(pos);
        self.ops.push(SurfaceOp::Remove { id: id.clone() });
        Ok(())
    }

    fn move_node(&mut self, id: &LayerId, index: usize) -> MotionResult<()> {
        self.ensure_live()?;
        let pos = self.position(id)?;
        let node = self.nodes.remove(pos);
        let index = index.min(self.nodes.len());
        self.nodes.insert(index, node);
        self.ops.push(SurfaceOp::Move {
            id: id.clone(),
            index,
        });
        Ok(())
    }

    fn update_node(&mut self, id: &LayerId, props: &NodeProps) -> MotionResult<()> {
        self.ensure_live()?;
        let pos = self.position(id)?;
        self.nodes[pos].1 = Some(*props);
        if self.record_updates {
            self.ops.push(SurfaceOp::Update { id: id.clone() });
        }
        Ok(())
    }

    fn set_stage_scale(&mut self, scale: f64) -> MotionResult<()> {
        self.ensure_live()?;
        self.stage_scale = scale;
        self.ops.push(SurfaceOp::StageScale { scale });
        Ok(())
    }

    fn present(&mut self) -> MotionResult<()> {
        self.ensure_live()?;
        if self.record_updates {
            self.ops.push(SurfaceOp::Present);
        }
        Ok(())
    }

    fn destroy(&mut self) -> MotionResult<()> {
        self.ensure_live()?;
        self.live = false;
        self.nodes.clear();
        self.ops.push(SurfaceOp::Destroy);
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/recording.rs"]
mod tests;
