//! Activation snapshot: the per-call record of which ideoms fired and
//! which prefabs matched.
//!
//! Activations merge by maximum, never by sum. The running total is kept
//! in step with the stored levels on every write so that `total()` is
//! always the sum of the map.

use crate::types::{IdeomId, PrefabId};
use std::collections::{HashMap, HashSet};
use std::fmt;

#[derive(Debug, Clone, Default)]
pub struct ActivationSnapshot {
    /// Discovery order of ideoms, used to break ties in `most_active`.
    order: Vec<IdeomId>,
    levels: HashMap<IdeomId, f64>,
    active_prefabs: Vec<PrefabId>,
    total: f64,
}

impl ActivationSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a snapshot from `(id, level)` pairs, merging duplicates by maximum.
    pub fn from_activations<I>(activations: I) -> Self
    where
        I: IntoIterator<Item = (IdeomId, f64)>,
    {
        let mut snapshot = Self::new();
        for (id, level) in activations {
            snapshot.add_activation(id, level);
        }
        snapshot
    }

    /// Record an activation. If the ideom is already present, the larger
    /// of the two values is kept.
    pub fn add_activation(&mut self, id: IdeomId, level: f64) {
        match self.levels.get_mut(&id) {
            Some(existing) => {
                if level > *existing {
                    self.total += level - *existing;
                    *existing = level;
                }
            }
            None => {
                self.total += level;
                self.order.push(id.clone());
                self.levels.insert(id, level);
            }
        }
    }

    /// Append a matched prefab id unless it is already recorded.
    pub fn add_active_prefab(&mut self, id: PrefabId) {
        if !self.active_prefabs.contains(&id) {
            self.active_prefabs.push(id);
        }
    }

    pub fn activation(&self, id: &IdeomId) -> f64 {
        self.levels.get(id).copied().unwrap_or(0.0)
    }

    pub fn contains(&self, id: &IdeomId) -> bool {
        self.levels.contains_key(id)
    }

    pub fn is_active(&self, id: &IdeomId, threshold: f64) -> bool {
        self.activation(id) >= threshold
    }

    /// Ids whose level is at least `threshold`, in discovery order.
    pub fn active(&self, threshold: f64) -> Vec<IdeomId> {
        self.iter()
            .filter(|(_, level)| *level >= threshold)
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Up to `n` ids, highest activation first. Equal levels keep
    /// discovery order.
    pub fn most_active(&self, n: usize) -> Vec<IdeomId> {
        let mut ranked: Vec<(&IdeomId, f64)> = self.iter().collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked.into_iter().take(n).map(|(id, _)| id.clone()).collect()
    }

    /// Combine two snapshots: per-ideom maximum, prefab ids unioned with
    /// the left side's ids first.
    pub fn merge(&self, other: &ActivationSnapshot) -> ActivationSnapshot {
        let mut merged = self.clone();
        merged.absorb(other);
        merged
    }

    /// In-place form of `merge`.
    pub fn absorb(&mut self, other: &ActivationSnapshot) {
        for (id, level) in other.iter() {
            self.add_activation(id.clone(), level);
        }
        for prefab in &other.active_prefabs {
            self.add_active_prefab(prefab.clone());
        }
    }

    /// A copy with every level multiplied by `factor`. Prefab ids are kept.
    pub fn scaled(&self, factor: f64) -> ActivationSnapshot {
        let mut scaled = ActivationSnapshot::new();
        for (id, level) in self.iter() {
            scaled.add_activation(id.clone(), level * factor);
        }
        scaled.active_prefabs = self.active_prefabs.clone();
        scaled
    }

    /// `(id, level)` pairs in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = (&IdeomId, f64)> + '_ {
        self.order
            .iter()
            .map(move |id| (id, self.levels.get(id).copied().unwrap_or(0.0)))
    }

    pub fn ids(&self) -> impl Iterator<Item = &IdeomId> + '_ {
        self.order.iter()
    }

    pub fn active_prefabs(&self) -> &[PrefabId] {
        &self.active_prefabs
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Two snapshots are equal when they hold the same levels and the same
/// set of matched prefabs. Discovery order is not compared.
impl PartialEq for ActivationSnapshot {
    fn eq(&self, other: &Self) -> bool {
        if self.levels != other.levels {
            return false;
        }
        let left: HashSet<&PrefabId> = self.active_prefabs.iter().collect();
        let right: HashSet<&PrefabId> = other.active_prefabs.iter().collect();
        left == right
    }
}

impl fmt::Display for ActivationSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ActivationSnapshot(total={:.3}, top=[", self.total)?;
        for (i, id) in self.most_active(5).iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {:.3}", id, self.activation(id))?;
        }
        write!(f, "], prefabs={})", self.active_prefabs.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> IdeomId {
        IdeomId::from(s)
    }

    #[test]
    fn add_activation_keeps_maximum() {
        let mut snap = ActivationSnapshot::new();
        snap.add_activation(id("dog"), 0.4);
        snap.add_activation(id("dog"), 0.9);
        snap.add_activation(id("dog"), 0.2);
        assert_eq!(snap.activation(&id("dog")), 0.9);
        assert!((snap.total() - 0.9).abs() < 1e-12);
        assert_eq!(snap.len(), 1);
    }

    #[test]
    fn total_tracks_sum_of_levels() {
        let mut snap = ActivationSnapshot::new();
        snap.add_activation(id("a"), 0.3);
        snap.add_activation(id("b"), 0.5);
        snap.add_activation(id("a"), 0.6);
        let sum: f64 = snap.iter().map(|(_, l)| l).sum();
        assert!((snap.total() - sum).abs() < 1e-12);
    }

    #[test]
    fn active_prefabs_are_deduplicated_in_discovery_order() {
        let mut snap = ActivationSnapshot::new();
        snap.add_active_prefab(PrefabId::from("p2"));
        snap.add_active_prefab(PrefabId::from("p1"));
        snap.add_active_prefab(PrefabId::from("p2"));
        assert_eq!(
            snap.active_prefabs(),
            &[PrefabId::from("p2"), PrefabId::from("p1")]
        );
    }

    #[test]
    fn most_active_breaks_ties_by_discovery_order() {
        let snap = ActivationSnapshot::from_activations(vec![
            (id("c"), 0.5),
            (id("a"), 0.9),
            (id("b"), 0.5),
        ]);
        assert_eq!(snap.most_active(3), vec![id("a"), id("c"), id("b")]);
        assert_eq!(snap.most_active(1), vec![id("a")]);
        assert_eq!(snap.most_active(10).len(), 3);
    }

    #[test]
    fn merge_is_commutative() {
        let mut a = ActivationSnapshot::from_activations(vec![(id("x"), 0.2), (id("y"), 0.7)]);
        a.add_active_prefab(PrefabId::from("p1"));
        let mut b = ActivationSnapshot::from_activations(vec![(id("x"), 0.6), (id("z"), 0.1)]);
        b.add_active_prefab(PrefabId::from("p2"));

        let ab = a.merge(&b);
        let ba = b.merge(&a);
        assert_eq!(ab, ba);
        assert_eq!(ab.activation(&id("x")), 0.6);
        assert_eq!(
            ab.active_prefabs(),
            &[PrefabId::from("p1"), PrefabId::from("p2")]
        );
    }

    #[test]
    fn merge_with_self_keeps_total() {
        let a = ActivationSnapshot::from_activations(vec![(id("x"), 0.2), (id("y"), 0.7)]);
        let aa = a.merge(&a);
        assert!((aa.total() - a.total()).abs() < 1e-12);
    }

    #[test]
    fn missing_ids_read_as_zero() {
        let snap = ActivationSnapshot::new();
        assert_eq!(snap.activation(&id("nothing")), 0.0);
        assert!(!snap.is_active(&id("nothing"), 0.1));
        assert!(snap.is_empty());
    }

    #[test]
    fn active_filters_by_threshold() {
        let snap = ActivationSnapshot::from_activations(vec![
            (id("a"), 0.2),
            (id("b"), 0.6),
            (id("c"), 0.5),
        ]);
        assert_eq!(snap.active(0.5), vec![id("b"), id("c")]);
    }

    #[test]
    fn display_lists_top_ideoms() {
        let snap = ActivationSnapshot::from_activations(vec![(id("dog"), 1.0)]);
        let text = snap.to_string();
        assert!(text.contains("dog: 1.000"));
    }
}
