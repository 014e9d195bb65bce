use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::{
    effects::kind::EffectKind,
    effects::params::EffectParams,
    foundation::error::{MotionError, MotionResult},
    layers::model::LayerId,
};

/// One `{enabled, ...params}` entry of the editor's settings object.
///
/// Parameters are kept as raw JSON: they are only interpreted (leniently) when an instance
/// is created or updated.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EffectSetting {
    #[serde(default)]
    pub enabled: bool,
    #[serde(flatten)]
    pub params: Map<String, Value>,
}

impl EffectSetting {
    pub fn enabled(params: Value) -> Self {
        Self {
            enabled: true,
            params: match params {
                Value::Object(map) => map,
                _ => Map::new(),
            },
        }
    }

    pub fn typed_params(&self, kind: EffectKind) -> EffectParams {
        EffectParams::from_json(kind, &Value::Object(self.params.clone()))
    }
}

/// Declarative Effect Configuration: `{layerId: {effectKind: {enabled, ...params}}}`.
///
/// Effect kinds are kept as the strings the editor sent; unknown names survive here and are
/// reported when the configuration is reconciled.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct EffectConfiguration {
    layers: BTreeMap<LayerId, BTreeMap<String, EffectSetting>>,
}

impl EffectConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(s: &str) -> MotionResult<Self> {
        serde_json::from_str(s).map_err(|e| MotionError::serde(format!("effect settings: {e}")))
    }

    pub fn from_value(v: Value) -> MotionResult<Self> {
        serde_json::from_value(v).map_err(|e| MotionError::serde(format!("effect settings: {e}")))
    }

    pub fn is_empty(&self) -> bool {
        self.layers.values().all(|m| m.is_empty())
    }

    /// Replace the setting for `(layer, kind)`.
    pub fn set(&mut self, layer: impl Into<LayerId>, kind: &str, setting: EffectSetting) {
        self.layers
            .entry(layer.into())
            .or_default()
            .insert(kind.to_string(), setting);
    }

    pub fn enable(&mut self, layer: impl Into<LayerId>, kind: EffectKind, params: Value) {
        self.set(layer, kind.as_str(), EffectSetting::enabled(params));
    }

    /// Mark `(layer, kind)` disabled, keeping its parameters. No-op when absent.
    pub fn disable(&mut self, layer: &LayerId, kind: EffectKind) {
        if let Some(setting) = self
            .layers
            .get_mut(layer)
            .and_then(|m| m.get_mut(kind.as_str()))
        {
            setting.enabled = false;
        }
    }

    /// Set a single parameter field, creating a disabled entry if needed.
    pub fn set_param(&mut self, layer: impl Into<LayerId>, kind: EffectKind, field: &str, value: Value) {
        self.layers
            .entry(layer.into())
            .or_default()
            .entry(kind.as_str().to_string())
            .or_default()
            .params
            .insert(field.to_string(), value);
    }

    pub fn get(&self, layer: &LayerId, kind: &str) -> Option<&EffectSetting> {
        self.layers.get(layer).and_then(|m| m.get(kind))
    }

    pub fn remove_layer(&mut self, layer: &LayerId) -> bool {
        self.layers.remove(layer).is_some()
    }

    /// Every `(layer, kind name, setting)` entry, layers sorted by id.
    pub fn entries(&self) -> impl Iterator<Item = (&LayerId, &str, &EffectSetting)> {
        self.layers.iter().flat_map(|(layer, kinds)| {
            kinds
                .iter()
                .map(move |(name, setting)| (layer, name.as_str(), setting))
        })
    }

    pub fn layer_ids(&self) -> impl Iterator<Item = &LayerId> {
        self.layers.keys()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/config.rs"]
mod tests;
