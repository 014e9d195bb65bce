use std::path::PathBuf;

use crate::{
    animation::config::EffectConfiguration,
    animation::scheduler::{Scheduler, TickReport},
    animation::ticker::TickerProbe,
    foundation::core::{Canvas, LayerTransform, Rgba8Premul},
    foundation::error::{MotionError, MotionResult},
    layers::model::LayerId,
    layers::store::LayerStore,
    render::compositor::{Compositor, CompositorStats},
    render::surface::RenderSurface,
};

/// Engine construction options.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EngineOpts {
    pub canvas: Canvas,
    pub background: Rgba8Premul,
    /// Integer percentage, typically 50..=200.
    pub zoom_percent: u32,
    /// Upper bound on the elapsed time applied by a single tick.
    pub max_tick_secs: f64,
    /// Seed for jitter effects.
    pub seed: u64,
    /// Root that image layer paths are resolved against.
    pub assets_root: PathBuf,
}

impl Default for EngineOpts {
    fn default() -> Self {
        Self {
            canvas: Canvas::default(),
            background: Rgba8Premul::OPAQUE_WHITE,
            zoom_percent: 100,
            max_tick_secs: 0.25,
            seed: 0,
            assets_root: PathBuf::from("."),
        }
    }
}

impl EngineOpts {
    pub fn validate(&self) -> MotionResult<()> {
        Canvas::new(self.canvas.width, self.canvas.height)?;
        if self.zoom_percent == 0 {
            return Err(MotionError::validation("zoom must be > 0 percent"));
        }
        if !self.max_tick_secs.is_finite() || self.max_tick_secs <= 0.0 {
            return Err(MotionError::validation("max_tick_secs must be finite and > 0"));
        }
        Ok(())
    }
}

/// Result of [`Engine::unmount`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct UnmountReport {
    /// Subscriptions released by this call.
    pub released: usize,
    /// Subscriptions still registered afterwards. Always 0 on success.
    pub outstanding: usize,
}

/// Animation engine bound to one rendering surface.
///
/// The layer store stays outside the engine and is passed by reference into each tick; the
/// engine never mutates it.
pub struct Engine<S: RenderSurface> {
    opts: EngineOpts,
    zoom_percent: u32,
    scheduler: Scheduler,
    compositor: Compositor<S>,
}

impl<S: RenderSurface> Engine<S> {
    /// Initialize `surface` and start with no effects.
    #[tracing::instrument(skip(surface), fields(width = opts.canvas.width, height = opts.canvas.height))]
    pub fn mount(opts: EngineOpts, surface: S) -> MotionResult<Self> {
        opts.validate()?;
        let compositor =
            Compositor::mount(surface, opts.canvas, opts.background, opts.zoom_percent)?;
        tracing::debug!("engine mounted");
        Ok(Self {
            zoom_percent: opts.zoom_percent,
            scheduler: Scheduler::new(opts.max_tick_secs, opts.seed),
            compositor,
            opts,
        })
    }

    pub fn opts(&self) -> &EngineOpts {
        &self.opts
    }

    pub fn is_mounted(&self) -> bool {
        self.compositor.is_live()
    }

    /// Buffer a settings change; it is applied at the start of the next tick.
    pub fn submit_settings(&mut self, config: EffectConfiguration) {
        self.scheduler.submit(config);
    }

    pub fn settings(&self) -> &EffectConfiguration {
        self.scheduler.configuration()
    }

    pub fn zoom_percent(&self) -> u32 {
        self.zoom_percent
    }

    pub fn set_zoom(&mut self, zoom_percent: u32) -> MotionResult<()> {
        self.compositor.set_zoom(zoom_percent)?;
        self.zoom_percent = zoom_percent;
        Ok(())
    }

    /// Advance every effect by `dt` seconds and paint the result.
    pub fn tick(&mut self, store: &LayerStore, dt: f64) -> MotionResult<TickReport> {
        if !self.is_mounted() {
            return Err(MotionError::render("engine is unmounted"));
        }
        let report = self.scheduler.tick(store, dt);
        self.compositor.sync(store, &report.transforms)?;
        Ok(report)
    }

    /// Display-refresh entry point: elapsed time comes from the wall-clock timestamp.
    pub fn tick_at(&mut self, store: &LayerStore, now_secs: f64) -> MotionResult<TickReport> {
        let dt = self.scheduler.ticker_mut().advance_to(now_secs);
        self.tick(store, dt)
    }

    /// Release every tick subscription, then free the surface. Idempotent.
    #[tracing::instrument(skip(self))]
    pub fn unmount(&mut self) -> MotionResult<UnmountReport> {
        let released = self.scheduler.release_all();
        let outstanding = self.scheduler.outstanding_subscriptions();
        if outstanding != 0 {
            return Err(MotionError::animation(format!(
                "{outstanding} tick subscriptions outstanding at unmount"
            )));
        }
        self.compositor.teardown()?;
        tracing::debug!(released, "engine unmounted");
        Ok(UnmountReport {
            released,
            outstanding,
        })
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Instrumentation hook: counts live tick subscriptions, usable after the engine is gone.
    pub fn subscription_probe(&self) -> TickerProbe {
        self.scheduler.probe()
    }

    pub fn rendered(&self, layer: &LayerId) -> Option<&LayerTransform> {
        self.scheduler.rendered(layer)
    }

    pub fn compositor_stats(&self) -> CompositorStats {
        self.compositor.stats()
    }

    pub fn surface(&self) -> &S {
        self.compositor.surface()
    }

    pub fn surface_mut(&mut self) -> &mut S {
        self.compositor.surface_mut()
    }
}

impl<S: RenderSurface> Drop for Engine<S> {
    fn drop(&mut self) {
        if self.is_mounted()
            && let Err(err) = self.unmount()
        {
            tracing::warn!(error = %err, "engine unmount on drop failed");
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/engine/engine.rs"]
mod tests;
