//! Shared types used across the ideom crates.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Default activation threshold for new ideoms and prefabs.
pub const DEFAULT_ACTIVATION_THRESHOLD: f64 = 0.5;

/// Default per-call decay rate for new ideoms.
pub const DEFAULT_DECAY_RATE: f64 = 0.1;

/// Unique identifier for an ideom in the graph.
///
/// Identifiers are plain strings so that persisted documents stay
/// human-editable. Fresh identifiers are random UUIDs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdeomId(pub String);

impl IdeomId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for IdeomId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for IdeomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for IdeomId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for IdeomId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Unique identifier for a prefab in the library.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrefabId(pub String);

impl PrefabId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for PrefabId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PrefabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PrefabId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for PrefabId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// An atomic concept node.
///
/// Outgoing connections are not stored on the node itself; they live
/// as edges in the graph that owns the node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ideom {
    pub id: IdeomId,
    /// Display name. Not unique: several ideoms may share one.
    pub name: String,
    /// Current activation, always within [0, 1].
    pub activation_level: f64,
    pub activation_threshold: f64,
    pub decay_rate: f64,
}

impl Ideom {
    pub fn new(id: impl Into<IdeomId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            activation_level: 0.0,
            activation_threshold: DEFAULT_ACTIVATION_THRESHOLD,
            decay_rate: DEFAULT_DECAY_RATE,
        }
    }

    /// Create an ideom with a fresh random identifier.
    pub fn named(name: impl Into<String>) -> Self {
        Self::new(IdeomId::new(), name)
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.activation_threshold = threshold;
        self
    }

    pub fn with_decay_rate(mut self, rate: f64) -> Self {
        self.decay_rate = rate;
        self
    }

    /// Raise the activation level by `strength`, saturating at 1.0.
    ///
    /// Returns the new level.
    pub fn activate(&mut self, strength: f64) -> f64 {
        self.activation_level = clamp_unit(self.activation_level + strength);
        self.activation_level
    }

    /// Lower the activation level by the decay rate, never below 0.
    pub fn decay(&mut self) {
        self.activation_level = (self.activation_level - self.decay_rate).max(0.0);
    }

    pub fn reset(&mut self) {
        self.activation_level = 0.0;
    }

    pub fn is_active(&self) -> bool {
        self.activation_level >= self.activation_threshold
    }
}

/// An edge removed by a pruning pass.
#[derive(Debug, Clone, PartialEq)]
pub struct PrunedConnection {
    pub from: IdeomId,
    pub to: IdeomId,
    pub final_weight: f64,
}

/// Clamp an activation value into [0, 1]. NaN collapses to 0.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activate_saturates_at_one() {
        let mut ideom = Ideom::new("dog", "dog");
        assert_eq!(ideom.activate(0.7), 0.7);
        assert_eq!(ideom.activate(0.7), 1.0);
    }

    #[test]
    fn decay_never_goes_negative() {
        let mut ideom = Ideom::new("dog", "dog").with_decay_rate(0.3);
        ideom.activate(0.2);
        ideom.decay();
        assert_eq!(ideom.activation_level, 0.0);
    }

    #[test]
    fn is_active_uses_own_threshold() {
        let mut ideom = Ideom::new("dog", "dog").with_threshold(0.4);
        ideom.activate(0.4);
        assert!(ideom.is_active());
    }

    #[test]
    fn fresh_ids_are_distinct() {
        assert_ne!(IdeomId::new(), IdeomId::new());
        assert_ne!(PrefabId::new(), PrefabId::new());
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let json = serde_json::to_string(&IdeomId::from("bark")).unwrap();
        assert_eq!(json, "\"bark\"");
    }
}
