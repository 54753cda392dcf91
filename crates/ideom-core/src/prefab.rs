//! Prefabs: weighted ideom templates that stand for a learned response
//! pattern.
//!
//! A prefab's `activation_level` is derived. It is recomputed by scoring
//! against a snapshot and carries no authority of its own.

use crate::snapshot::ActivationSnapshot;
use crate::types::{IdeomId, PrefabId, DEFAULT_ACTIVATION_THRESHOLD};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prefab {
    pub id: PrefabId,
    pub name: String,
    pub ideom_weights: BTreeMap<IdeomId, f64>,
    #[serde(default)]
    pub activation_level: f64,
    pub activation_threshold: f64,
    pub response_template: Option<String>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

impl Prefab {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: PrefabId::new(),
            name: name.into(),
            ideom_weights: BTreeMap::new(),
            activation_level: 0.0,
            activation_threshold: DEFAULT_ACTIVATION_THRESHOLD,
            response_template: None,
            tags: BTreeSet::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<PrefabId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_weight(mut self, id: impl Into<IdeomId>, weight: f64) -> Self {
        self.ideom_weights.insert(id.into(), weight);
        self
    }

    pub fn with_weights<I>(mut self, weights: I) -> Self
    where
        I: IntoIterator<Item = (IdeomId, f64)>,
    {
        self.ideom_weights.extend(weights);
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.activation_threshold = threshold;
        self
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.response_template = Some(template.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Weighted average of the snapshot's activations over the template.
    ///
    /// `Σ(weight_i * activation_i) / Σ(weight_i)`; an empty template or a
    /// zero total weight scores 0.
    pub fn score(&self, snapshot: &ActivationSnapshot) -> f64 {
        weighted_score(
            self.ideom_weights.iter().map(|(id, w)| (id, *w)),
            snapshot,
        )
    }

    /// Score the snapshot and store the result as `activation_level`.
    pub fn activate(&mut self, snapshot: &ActivationSnapshot) -> f64 {
        self.activation_level = self.score(snapshot);
        self.activation_level
    }

    pub fn is_active(&self) -> bool {
        self.activation_level >= self.activation_threshold
    }

    pub fn weight(&self, id: &IdeomId) -> Option<f64> {
        self.ideom_weights.get(id).copied()
    }

    /// Insert or overwrite a template weight.
    pub fn add_weight(&mut self, id: IdeomId, weight: f64) {
        self.ideom_weights.insert(id, weight);
    }

    /// Overwrite an existing weight. Returns false if the ideom is not in
    /// the template.
    pub fn update_weight(&mut self, id: &IdeomId, weight: f64) -> bool {
        match self.ideom_weights.get_mut(id) {
            Some(w) => {
                *w = weight;
                true
            }
            None => false,
        }
    }

    pub fn remove_weight(&mut self, id: &IdeomId) -> Option<f64> {
        self.ideom_weights.remove(id)
    }

    pub fn add_tag(&mut self, tag: impl Into<String>) {
        self.tags.insert(tag.into());
    }

    pub fn remove_tag(&mut self, tag: &str) -> bool {
        self.tags.remove(tag)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub fn total_weight(&self) -> f64 {
        self.ideom_weights.values().sum()
    }

    /// Jaccard similarity of the two templates' ideom sets.
    pub fn template_similarity(&self, other: &Prefab) -> f64 {
        let union = self
            .ideom_weights
            .keys()
            .chain(other.ideom_weights.keys())
            .collect::<BTreeSet<_>>()
            .len();
        if union == 0 {
            return 0.0;
        }
        let shared = self
            .ideom_weights
            .keys()
            .filter(|id| other.ideom_weights.contains_key(*id))
            .count();
        shared as f64 / union as f64
    }

    /// Fold two prefabs into a new one.
    ///
    /// Weights are unioned and averaged where both templates name the same
    /// ideom. Tags are unioned. The response template comes from the input
    /// with the higher activation level, the left one on a tie.
    pub fn merged(&self, other: &Prefab, threshold: f64) -> Prefab {
        let mut weights = self.ideom_weights.clone();
        for (id, w) in &other.ideom_weights {
            weights
                .entry(id.clone())
                .and_modify(|existing| *existing = (*existing + w) / 2.0)
                .or_insert(*w);
        }
        let response_template = if self.activation_level >= other.activation_level {
            self.response_template.clone()
        } else {
            other.response_template.clone()
        };
        Prefab {
            id: PrefabId::new(),
            name: format!("Merged: {} + {}", self.name, other.name),
            ideom_weights: weights,
            activation_level: 0.0,
            activation_threshold: threshold,
            response_template,
            tags: self.tags.union(&other.tags).cloned().collect(),
        }
    }
}

/// Weighted average of snapshot activations over `(id, weight)` pairs.
/// Returns 0 when there are no pairs or the weights sum to zero.
pub fn weighted_score<'a, I>(weights: I, snapshot: &ActivationSnapshot) -> f64
where
    I: IntoIterator<Item = (&'a IdeomId, f64)>,
{
    let mut weighted = 0.0;
    let mut total = 0.0;
    for (id, w) in weights {
        weighted += w * snapshot.activation(id);
        total += w;
    }
    if total == 0.0 {
        0.0
    } else {
        weighted / total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dog_bark_snapshot() -> ActivationSnapshot {
        ActivationSnapshot::from_activations(vec![
            (IdeomId::from("dog"), 1.0),
            (IdeomId::from("bark"), 0.8),
        ])
    }

    #[test]
    fn score_is_weighted_average() {
        let prefab = Prefab::new("dog barks")
            .with_weight("dog", 1.0)
            .with_weight("bark", 0.5);
        let score = prefab.score(&dog_bark_snapshot());
        assert!((score - 1.4 / 1.5).abs() < 1e-9);
    }

    #[test]
    fn empty_template_scores_zero() {
        let prefab = Prefab::new("empty");
        assert_eq!(prefab.score(&dog_bark_snapshot()), 0.0);
    }

    #[test]
    fn zero_total_weight_scores_zero() {
        let prefab = Prefab::new("zero").with_weight("dog", 0.0);
        let score = prefab.score(&dog_bark_snapshot());
        assert_eq!(score, 0.0);
        assert!(!score.is_nan());
    }

    #[test]
    fn activate_stores_score() {
        let mut prefab = Prefab::new("dog").with_weight("dog", 1.0).with_threshold(0.9);
        prefab.activate(&dog_bark_snapshot());
        assert_eq!(prefab.activation_level, 1.0);
        assert!(prefab.is_active());
    }

    #[test]
    fn weight_and_tag_helpers() {
        let mut prefab = Prefab::new("p").with_tags(["greeting"]);
        prefab.add_weight(IdeomId::from("hi"), 0.4);
        assert!(prefab.update_weight(&IdeomId::from("hi"), 0.7));
        assert!(!prefab.update_weight(&IdeomId::from("bye"), 0.7));
        assert_eq!(prefab.weight(&IdeomId::from("hi")), Some(0.7));
        assert_eq!(prefab.remove_weight(&IdeomId::from("hi")), Some(0.7));

        prefab.add_tag("polite");
        assert!(prefab.has_tag("polite"));
        assert!(prefab.remove_tag("greeting"));
        assert!(!prefab.has_tag("greeting"));
    }

    #[test]
    fn merged_averages_shared_weights() {
        let mut left = Prefab::new("a")
            .with_weight("x", 1.0)
            .with_weight("y", 0.4)
            .with_template("left")
            .with_tags(["one"]);
        left.activation_level = 0.2;
        let mut right = Prefab::new("b")
            .with_weight("x", 0.5)
            .with_template("right")
            .with_tags(["two"]);
        right.activation_level = 0.6;

        let merged = left.merged(&right, 0.5);
        assert_eq!(merged.name, "Merged: a + b");
        assert_eq!(merged.weight(&IdeomId::from("x")), Some(0.75));
        assert_eq!(merged.weight(&IdeomId::from("y")), Some(0.4));
        assert_eq!(merged.response_template.as_deref(), Some("right"));
        assert!(merged.has_tag("one") && merged.has_tag("two"));
        assert_ne!(merged.id, left.id);
    }

    #[test]
    fn template_similarity_is_jaccard() {
        let a = Prefab::new("a").with_weight("x", 1.0).with_weight("y", 1.0);
        let b = Prefab::new("b").with_weight("y", 1.0).with_weight("z", 1.0);
        assert!((a.template_similarity(&b) - 1.0 / 3.0).abs() < 1e-9);
        assert_eq!(Prefab::new("e").template_similarity(&Prefab::new("f")), 0.0);
    }
}
