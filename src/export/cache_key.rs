use std::fmt;

use xxhash_rust::xxh3::Xxh3;

use crate::{
    foundation::error::{MotionError, MotionResult},
    layers::model::DetectedObject,
};

const XXH3_SEED: u64 = 0x5c1e_77a3_90d2_4b6f;

/// Deterministic identity of an export request: `{image_path}:{animation_type}:{hash}`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(image_path: &str, animation_type: &str, objects: &[DetectedObject]) -> MotionResult<Self> {
        if image_path.trim().is_empty() {
            return Err(MotionError::validation("export request needs an image path"));
        }
        if animation_type.trim().is_empty() {
            return Err(MotionError::validation("export request needs an animation type"));
        }
        if objects.is_empty() {
            return Err(MotionError::validation("export request needs detected objects"));
        }
        Ok(Self(format!(
            "{image_path}:{animation_type}:{:016x}",
            objects_fingerprint(objects)
        )))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stable hash of a detection list. Order-sensitive; floats hash by bit pattern.
pub fn objects_fingerprint(objects: &[DetectedObject]) -> u64 {
    let mut h = StableHasher::new();
    h.write_u64(objects.len() as u64);
    for obj in objects {
        h.write_str(&obj.label);
        h.write_f64(obj.confidence);
        let b = obj.bbox;
        for v in [b.x, b.y, b.width, b.height] {
            h.write_f64(v);
        }
    }
    h.finish()
}

struct StableHasher {
    inner: Xxh3,
}

impl StableHasher {
    fn new() -> Self {
        Self {
            inner: Xxh3::with_seed(XXH3_SEED),
        }
    }

    fn write_bytes(&mut self, b: &[u8]) {
        self.inner.update(b);
    }

    fn write_u64(&mut self, v: u64) {
        self.write_bytes(&v.to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        // -0.0 and 0.0 describe the same box.
        let v = if v == 0.0 { 0.0 } else { v };
        self.write_u64(v.to_bits());
    }

    fn write_str(&mut self, s: &str) {
        self.write_u64(s.len() as u64);
        self.write_bytes(s.as_bytes());
    }

    fn finish(self) -> u64 {
        self.inner.digest()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/cache_key.rs"]
mod tests;
