//! Prefab library: the store of learned templates and exact-threshold
//! matching against a snapshot.
//!
//! Prefabs live in an arena of slots addressed through an id index.
//! Iteration follows insertion order.

use ideom_core::prefab::Prefab;
use ideom_core::snapshot::ActivationSnapshot;
use ideom_core::types::{IdeomId, PrefabId};
use std::collections::{HashMap, HashSet};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct PrefabLibrary {
    slots: Vec<Option<Prefab>>,
    index: HashMap<PrefabId, usize>,
    /// Threshold given to prefabs the library creates itself.
    default_threshold: f64,
}

impl PrefabLibrary {
    pub fn new(default_threshold: f64) -> Self {
        Self {
            slots: Vec::new(),
            index: HashMap::new(),
            default_threshold,
        }
    }

    pub fn default_threshold(&self) -> f64 {
        self.default_threshold
    }

    /// Insert a prefab, replacing any prefab with the same id in place.
    pub fn add(&mut self, prefab: Prefab) -> PrefabId {
        let id = prefab.id.clone();
        match self.index.get(&id) {
            Some(&slot) => self.slots[slot] = Some(prefab),
            None => {
                self.index.insert(id.clone(), self.slots.len());
                self.slots.push(Some(prefab));
            }
        }
        id
    }

    pub fn get(&self, id: &PrefabId) -> Option<&Prefab> {
        self.index.get(id).and_then(|&slot| self.slots[slot].as_ref())
    }

    pub fn get_mut(&mut self, id: &PrefabId) -> Option<&mut Prefab> {
        let slot = *self.index.get(id)?;
        self.slots[slot].as_mut()
    }

    pub fn remove(&mut self, id: &PrefabId) -> Option<Prefab> {
        let slot = self.index.remove(id)?;
        self.slots[slot].take()
    }

    /// Replace a stored prefab. Returns false if its id is unknown.
    pub fn update(&mut self, prefab: Prefab) -> bool {
        match self.get_mut(&prefab.id) {
            Some(existing) => {
                *existing = prefab;
                true
            }
            None => false,
        }
    }

    /// Every prefab, in insertion order.
    pub fn all(&self) -> impl Iterator<Item = &Prefab> + '_ {
        self.slots.iter().flatten()
    }

    pub fn ids(&self) -> Vec<PrefabId> {
        self.all().map(|p| p.id.clone()).collect()
    }

    pub fn by_tag(&self, tag: &str) -> Vec<&Prefab> {
        self.all().filter(|p| p.has_tag(tag)).collect()
    }

    pub fn by_name(&self, name: &str) -> Vec<&Prefab> {
        self.all().filter(|p| p.name == name).collect()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Prefabs scoring at least `threshold`, best first.
    ///
    /// Each returned copy carries its score as `activation_level`. The
    /// library itself is not modified.
    pub fn matching(&self, snapshot: &ActivationSnapshot, threshold: f64) -> Vec<Prefab> {
        let mut matches: Vec<Prefab> = self
            .all()
            .filter_map(|prefab| {
                let mut scored = prefab.clone();
                (scored.activate(snapshot) >= threshold).then_some(scored)
            })
            .collect();
        sort_by_score(&mut matches);
        matches
    }

    /// Like `matching`, but also records every matched id in the snapshot.
    pub fn find_matching(&self, snapshot: &mut ActivationSnapshot, threshold: f64) -> Vec<Prefab> {
        let matches = self.matching(snapshot, threshold);
        for prefab in &matches {
            snapshot.add_active_prefab(prefab.id.clone());
        }
        debug!(matched = matches.len(), threshold, "exact prefab matching");
        matches
    }

    /// Build and store a prefab from the snapshot's ideoms at or above
    /// `min_activation`, each weighted by its activation.
    pub fn create_from_snapshot<I, S>(
        &mut self,
        snapshot: &ActivationSnapshot,
        name: impl Into<String>,
        min_activation: f64,
        response_template: Option<String>,
        tags: I,
    ) -> PrefabId
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let weights: Vec<(IdeomId, f64)> = snapshot
            .iter()
            .filter(|(_, level)| *level >= min_activation)
            .map(|(id, level)| (id.clone(), level))
            .collect();
        let mut prefab = Prefab::new(name)
            .with_weights(weights)
            .with_threshold(self.default_threshold)
            .with_tags(tags);
        prefab.response_template = response_template;
        self.add(prefab)
    }

    /// Merge every pair of prefabs whose template similarity is at least
    /// `threshold`. Both inputs are replaced by the merged prefab. Returns
    /// the number of merges performed.
    ///
    /// A prefab takes part in at most one merge per call, pairing with the
    /// first similar partner in library order. A cluster of three or more
    /// similar prefabs collapses over repeated calls, and merged prefabs
    /// are only compared again on the next call.
    pub fn merge_similar(&mut self, threshold: f64) -> usize {
        let snapshot: Vec<Prefab> = self.all().cloned().collect();
        let mut consumed: HashSet<PrefabId> = HashSet::new();
        let mut merged = Vec::new();

        for (i, left) in snapshot.iter().enumerate() {
            if consumed.contains(&left.id) {
                continue;
            }
            for right in &snapshot[i + 1..] {
                if consumed.contains(&right.id) || consumed.contains(&left.id) {
                    continue;
                }
                if left.template_similarity(right) >= threshold {
                    merged.push(left.merged(right, self.default_threshold));
                    consumed.insert(left.id.clone());
                    consumed.insert(right.id.clone());
                }
            }
        }

        for id in &consumed {
            self.remove(id);
        }
        let count = merged.len();
        for prefab in merged {
            self.add(prefab);
        }
        debug!(merges = count, remaining = self.len(), "merged similar prefabs");
        count
    }
}

impl Default for PrefabLibrary {
    fn default() -> Self {
        Self::new(ideom_core::types::DEFAULT_ACTIVATION_THRESHOLD)
    }
}

/// Stable descending sort on `activation_level`.
pub(crate) fn sort_by_score(prefabs: &mut [Prefab]) {
    prefabs.sort_by(|a, b| {
        b.activation_level
            .partial_cmp(&a.activation_level)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}
