//! Settings Reconciler: diff a declarative [`EffectConfiguration`] against the live instance
//! set without disturbing instances whose settings did not change.

use std::collections::BTreeMap;

use crate::{
    animation::combine::combine,
    animation::config::EffectConfiguration,
    animation::instance::{EffectInstance, InstanceKey},
    animation::ticker::Ticker,
    effects::kind::EffectKind,
    effects::params::EffectParams,
    foundation::math::Fnv1a64,
    layers::model::LayerId,
    layers::store::LayerStore,
};

/// What one reconciliation pass changed.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct ReconcileReport {
    pub created: Vec<InstanceKey>,
    pub updated: Vec<InstanceKey>,
    pub destroyed: Vec<InstanceKey>,
    /// Instances whose layer is no longer in the store.
    pub pruned: Vec<InstanceKey>,
    /// Effect names outside the registry, left untouched.
    pub unknown_kinds: Vec<(LayerId, String)>,
    /// Settings addressed to layers the store does not contain.
    pub unknown_layers: Vec<LayerId>,
}

impl ReconcileReport {
    pub fn is_noop(&self) -> bool {
        self.created.is_empty()
            && self.updated.is_empty()
            && self.destroyed.is_empty()
            && self.pruned.is_empty()
    }
}

/// Inputs a reconciliation pass reads.
pub(crate) struct ReconcileCtx<'a> {
    pub store: &'a LayerStore,
    pub ticker: &'a Ticker,
    pub seed: u64,
}

/// Bring `instances` in line with `config`.
///
/// New instances are appended, so `instances` stays in registration order.
pub(crate) fn reconcile(
    instances: &mut Vec<EffectInstance>,
    next_seq: &mut u64,
    config: &EffectConfiguration,
    ctx: &ReconcileCtx<'_>,
) -> ReconcileReport {
    let mut report = ReconcileReport::default();
    let desired = desired_instances(config, ctx.store, &mut report);

    instances.retain_mut(|inst| {
        let key = inst.key();
        if !ctx.store.contains(inst.layer()) {
            inst.release();
            tracing::debug!(layer = %key.0, effect = %key.1, "pruned instance of removed layer");
            report.pruned.push(key);
            return false;
        }
        match desired.get(&key) {
            Some(params) => {
                if inst.set_params(*params) {
                    tracing::debug!(layer = %key.0, effect = %key.1, "updated instance params");
                    report.updated.push(key);
                }
                true
            }
            None => {
                inst.release();
                tracing::debug!(layer = %key.0, effect = %key.1, "destroyed instance");
                report.destroyed.push(key);
                false
            }
        }
    });

    for (key, params) in desired {
        if instances.iter().any(|i| i.layer() == &key.0 && i.kind() == key.1) {
            continue;
        }
        let Some(layer) = ctx.store.get(&key.0) else {
            continue;
        };
        // Channels driven by a live instance keep their last painted value; the rest follow
        // the store, including edits made since the previous tick.
        let baseline = combine(layer, instances.iter().filter(|i| i.layer() == &key.0)).transform;
        let seq = *next_seq;
        *next_seq += 1;
        let seed = instance_seed(ctx.seed, &key, seq);
        tracing::debug!(layer = %key.0, effect = %key.1, seq, "created instance");
        instances.push(EffectInstance::new(
            key.0.clone(),
            params,
            baseline,
            ctx.ticker.subscribe(),
            seq,
            seed,
        ));
        report.created.push(key);
    }

    report
}

fn desired_instances(
    config: &EffectConfiguration,
    store: &LayerStore,
    report: &mut ReconcileReport,
) -> BTreeMap<InstanceKey, EffectParams> {
    let mut desired = BTreeMap::new();
    for (layer, name, setting) in config.entries() {
        if !store.contains(layer) {
            if report.unknown_layers.last() != Some(layer) {
                report.unknown_layers.push(layer.clone());
            }
            continue;
        }
        let Some(kind) = EffectKind::parse(name) else {
            report.unknown_kinds.push((layer.clone(), name.to_string()));
            continue;
        };
        if setting.enabled {
            desired.insert((layer.clone(), kind), setting.typed_params(kind));
        }
    }
    desired
}

fn instance_seed(seed: u64, key: &InstanceKey, seq: u64) -> u64 {
    let mut h = Fnv1a64::new(seed);
    h.write_str(key.0.as_str());
    h.write_str(key.1.as_str());
    h.write_u64(seq);
    h.finish()
}

#[cfg(test)]
#[path = "../../tests/unit/animation/reconcile.rs"]
mod tests;
