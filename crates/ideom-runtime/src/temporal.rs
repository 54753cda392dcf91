//! Temporal history: a bounded ring of recent activation snapshots.
//!
//! Index 0 is always the newest snapshot when weights are applied. The
//! default blending weight for slot `i` is `1 - i / capacity`, so the
//! newest snapshot counts fully and older ones fade linearly.

use ideom_core::error::{IdeomError, Result};
use ideom_core::snapshot::ActivationSnapshot;
use ideom_core::types::IdeomId;
use std::collections::{HashSet, VecDeque};

#[derive(Debug, Clone)]
pub struct TemporalHistory {
    /// Oldest at the front, newest at the back.
    snapshots: VecDeque<ActivationSnapshot>,
    capacity: usize,
    /// Blending weights, newest first. Always `capacity` long.
    weights: Vec<f64>,
}

impl TemporalHistory {
    /// A history with linearly decreasing weights. A capacity of zero is
    /// raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let weights = (0..capacity)
            .map(|i| 1.0 - i as f64 / capacity as f64)
            .collect();
        Self {
            snapshots: VecDeque::with_capacity(capacity),
            capacity,
            weights,
        }
    }

    /// A history with custom blending weights, newest first.
    pub fn with_weights(capacity: usize, weights: Vec<f64>) -> Result<Self> {
        if capacity == 0 {
            return Err(IdeomError::InvalidConfig(
                "temporal history capacity must be at least 1".into(),
            ));
        }
        if weights.len() != capacity {
            return Err(IdeomError::InvalidConfig(format!(
                "expected {} temporal weights, got {}",
                capacity,
                weights.len()
            )));
        }
        Ok(Self {
            snapshots: VecDeque::with_capacity(capacity),
            capacity,
            weights,
        })
    }

    /// Append a snapshot, evicting the oldest once over capacity.
    pub fn push(&mut self, snapshot: ActivationSnapshot) {
        self.snapshots.push_back(snapshot);
        while self.snapshots.len() > self.capacity {
            self.snapshots.pop_front();
        }
    }

    /// Collapse the history into one snapshot.
    ///
    /// Each stored activation contributes `activation * w_i` and the
    /// contributions merge by maximum. Matched prefab ids are unioned.
    pub fn blended(&self) -> ActivationSnapshot {
        let mut blended = ActivationSnapshot::new();
        for (i, snapshot) in self.newest_first().enumerate() {
            let weight = self.weights.get(i).copied().unwrap_or(0.0);
            for (id, level) in snapshot.iter() {
                let weighted = level * weight;
                if weighted > 0.0 {
                    blended.add_activation(id.clone(), weighted);
                }
            }
            for prefab in snapshot.active_prefabs() {
                blended.add_active_prefab(prefab.clone());
            }
        }
        blended
    }

    /// Activation of `id` in every stored snapshot, oldest to newest.
    pub fn trend(&self, id: &IdeomId) -> Vec<f64> {
        self.snapshots.iter().map(|s| s.activation(id)).collect()
    }

    /// Ideoms whose newest level exceeds their oldest by at least
    /// `threshold`. Needs two snapshots.
    pub fn increasing(&self, threshold: f64) -> Vec<IdeomId> {
        let (Some(oldest), Some(newest)) = (self.oldest(), self.latest()) else {
            return Vec::new();
        };
        if self.snapshots.len() < 2 {
            return Vec::new();
        }
        newest
            .iter()
            .filter(|(id, level)| level - oldest.activation(id) >= threshold)
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Ideoms whose oldest level exceeds their newest by at least
    /// `threshold`. Needs two snapshots.
    pub fn decreasing(&self, threshold: f64) -> Vec<IdeomId> {
        let (Some(oldest), Some(newest)) = (self.oldest(), self.latest()) else {
            return Vec::new();
        };
        if self.snapshots.len() < 2 {
            return Vec::new();
        }
        oldest
            .iter()
            .filter(|(id, level)| level - newest.activation(id) >= threshold)
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Ideoms at or above `threshold` in every stored snapshot.
    pub fn persistent(&self, threshold: f64) -> Vec<IdeomId> {
        self.seen_ids()
            .into_iter()
            .filter(|id| self.snapshots.iter().all(|s| s.activation(id) >= threshold))
            .collect()
    }

    /// Trend of every ideom seen so far, once at least `min_len`
    /// snapshots are stored.
    pub fn detect_patterns(&self, min_len: usize) -> Vec<(IdeomId, Vec<f64>)> {
        if self.snapshots.is_empty() || self.snapshots.len() < min_len {
            return Vec::new();
        }
        self.seen_ids()
            .into_iter()
            .map(|id| {
                let trend = self.trend(&id);
                (id, trend)
            })
            .collect()
    }

    /// Every ideom id in the history, in first-seen order.
    pub fn seen_ids(&self) -> Vec<IdeomId> {
        let mut seen = HashSet::new();
        self.snapshots
            .iter()
            .flat_map(|s| s.ids())
            .filter(|id| seen.insert((*id).clone()))
            .cloned()
            .collect()
    }

    pub fn latest(&self) -> Option<&ActivationSnapshot> {
        self.snapshots.back()
    }

    pub fn oldest(&self) -> Option<&ActivationSnapshot> {
        self.snapshots.front()
    }

    /// Stored snapshots, newest first.
    pub fn newest_first(&self) -> impl Iterator<Item = &ActivationSnapshot> + '_ {
        self.snapshots.iter().rev()
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

impl Default for TemporalHistory {
    fn default() -> Self {
        Self::new(10)
    }
}
