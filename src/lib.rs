//! Layermotion animates the layers of a scene editor with procedural motion effects.
//!
//! Objects detected in a source image become layers. Each layer can carry any number of
//! effects (rotate, bounce, fade, ...) configured from an editor-style settings map:
//!
//! - Build a [`LayerStore`] (directly or from a [`Project`])
//! - Mount an [`Engine`] on a [`RenderSurface`]
//! - Submit an [`EffectConfiguration`] and call [`Engine::tick`] once per display frame
//! - Unmount to release every tick subscription and the surface
#![forbid(unsafe_code)]

pub mod animation;
pub mod assets;
pub mod effects;
pub mod engine;
pub mod export;
pub mod foundation;
pub mod layers;
pub mod project;
pub mod render;

pub use crate::animation::combine::CombinedTransform;
pub use crate::animation::config::{EffectConfiguration, EffectSetting};
pub use crate::animation::reconcile::ReconcileReport;
pub use crate::animation::scheduler::{InstanceFault, Scheduler, TickReport};
pub use crate::animation::ticker::TickerProbe;
pub use crate::effects::kind::EffectKind;
pub use crate::effects::params::EffectParams;
pub use crate::engine::{Engine, EngineOpts, UnmountReport};
pub use crate::export::cache_key::CacheKey;
pub use crate::export::jobs::{
    ExportBackend, ExportClient, ExportOutcome, ExportRequest, InMemoryExportQueue, JobId,
    JobStatus,
};
pub use crate::export::sequence::{SequenceOpts, render_sequence};
pub use crate::foundation::core::{
    Affine, Canvas, LayerTransform, Point, Rect, Rgb8, Rgba8Premul, Vec2,
};
pub use crate::foundation::error::{MotionError, MotionResult};
pub use crate::layers::model::{BBox, DetectedObject, Layer, LayerContent, LayerId, ShapeKind};
pub use crate::layers::store::LayerStore;
pub use crate::project::Project;
pub use crate::render::compositor::{Compositor, CompositorStats};
pub use crate::render::cpu::CpuSurface;
pub use crate::render::recording::{RecordingSurface, SurfaceOp};
pub use crate::render::surface::{FrameRGBA, NodeProps, NodeSpec, RenderSurface};
