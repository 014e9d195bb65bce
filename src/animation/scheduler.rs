use std::collections::BTreeMap;

use crate::{
    animation::combine::{CombinedTransform, combine},
    animation::config::EffectConfiguration,
    animation::instance::{EffectInstance, InstanceKey},
    animation::reconcile::{ReconcileCtx, ReconcileReport, reconcile},
    animation::ticker::{Ticker, TickerProbe},
    effects::kind::EffectKind,
    foundation::core::LayerTransform,
    layers::model::LayerId,
    layers::store::LayerStore,
};

/// An instance that contributed nothing on a tick.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct InstanceFault {
    pub key: InstanceKey,
    pub reason: String,
}

/// Outcome of one scheduler tick.
#[derive(Clone, Debug, Default, serde::Serialize)]
pub struct TickReport {
    pub frame: u64,
    /// Elapsed seconds fed to every instance this tick.
    pub dt: f64,
    /// Present when settings or the layer set changed since the previous tick.
    pub reconcile: Option<ReconcileReport>,
    /// One entry per layer, in paint order.
    pub transforms: Vec<CombinedTransform>,
    pub faults: Vec<InstanceFault>,
}

/// Animation Scheduler: owns every effect instance and its tick subscription.
///
/// Settings are buffered by [`Scheduler::submit`] and take effect at the start of the next
/// [`Scheduler::tick`], before any instance is advanced.
#[derive(Debug)]
pub struct Scheduler {
    ticker: Ticker,
    instances: Vec<EffectInstance>,
    pending: Option<EffectConfiguration>,
    current: EffectConfiguration,
    rendered: BTreeMap<LayerId, LayerTransform>,
    next_seq: u64,
    seed: u64,
    store_revision: Option<u64>,
}

impl Scheduler {
    pub fn new(max_tick_secs: f64, seed: u64) -> Self {
        Self {
            ticker: Ticker::new(max_tick_secs),
            instances: Vec::new(),
            pending: None,
            current: EffectConfiguration::default(),
            rendered: BTreeMap::new(),
            next_seq: 0,
            seed,
            store_revision: None,
        }
    }

    /// Buffer a new configuration. Only the latest submission before a tick is applied.
    pub fn submit(&mut self, config: EffectConfiguration) {
        self.pending = Some(config);
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Latest submitted configuration, applied or not.
    pub fn configuration(&self) -> &EffectConfiguration {
        self.pending.as_ref().unwrap_or(&self.current)
    }

    pub fn instances(&self) -> &[EffectInstance] {
        &self.instances
    }

    pub fn instance(&self, layer: &LayerId, kind: EffectKind) -> Option<&EffectInstance> {
        self.instances
            .iter()
            .find(|i| i.layer() == layer && i.kind() == kind)
    }

    pub fn outstanding_subscriptions(&self) -> usize {
        self.ticker.outstanding()
    }

    pub fn probe(&self) -> TickerProbe {
        self.ticker.probe()
    }

    pub fn ticker(&self) -> &Ticker {
        &self.ticker
    }

    pub fn ticker_mut(&mut self) -> &mut Ticker {
        &mut self.ticker
    }

    /// Transform painted for `layer` on the last tick.
    pub fn rendered(&self, layer: &LayerId) -> Option<&LayerTransform> {
        self.rendered.get(layer)
    }

    /// Run one tick: reconcile, advance every instance by `dt`, combine per layer.
    #[tracing::instrument(skip(self, store), fields(instances = self.instances.len()))]
    pub fn tick(&mut self, store: &LayerStore, dt: f64) -> TickReport {
        let dt = self.ticker.clamp_dt(dt);
        let frame = self.ticker.count_frame();
        let reconcile = self.reconcile(store);

        let mut faults = Vec::new();
        for inst in &mut self.instances {
            if let Err(err) = inst.advance(dt) {
                let key = inst.key();
                tracing::warn!(layer = %key.0, effect = %key.1, error = %err, "effect update isolated");
                faults.push(InstanceFault {
                    key,
                    reason: err.to_string(),
                });
            }
        }

        let transforms: Vec<CombinedTransform> = store
            .iter()
            .map(|layer| {
                combine(
                    layer,
                    self.instances.iter().filter(|i| i.layer() == &layer.id),
                )
            })
            .collect();

        self.rendered = transforms
            .iter()
            .map(|c| (c.layer.clone(), c.transform))
            .collect();

        TickReport {
            frame,
            dt,
            reconcile,
            transforms,
            faults,
        }
    }

    /// Release every subscription and drop every instance. Safe to call repeatedly.
    pub fn release_all(&mut self) -> usize {
        let released = self
            .instances
            .iter_mut()
            .map(|i| i.release())
            .filter(|released| *released)
            .count();
        self.instances.clear();
        self.rendered.clear();
        self.store_revision = None;
        if released > 0 {
            tracing::debug!(released, "released all effect instances");
        }
        released
    }

    fn reconcile(&mut self, store: &LayerStore) -> Option<ReconcileReport> {
        let store_changed = self.store_revision != Some(store.revision());
        if self.pending.is_none() && !store_changed {
            return None;
        }
        if let Some(config) = self.pending.take() {
            self.current = config;
        }
        self.store_revision = Some(store.revision());
        let ctx = ReconcileCtx {
            store,
            ticker: &self.ticker,
            seed: self.seed,
        };
        Some(reconcile(
            &mut self.instances,
            &mut self.next_seq,
            &self.current,
            &ctx,
        ))
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.release_all();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/scheduler.rs"]
mod tests;
