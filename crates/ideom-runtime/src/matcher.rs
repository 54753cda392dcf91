//! Advanced prefab matching.
//!
//! Exact threshold matching from the library is extended with three
//! strategies, each of which can be switched off in `MatchingConfig`:
//!
//! - **Partial**: a template that is only partly active, scored on the
//!   active overlap and its coverage.
//! - **Combination**: two templates that are weak alone but strong
//!   together, reported as a synthesized prefab.
//! - **Semantic**: templates whose ideoms resemble the active ideoms by
//!   neighborhood and name.
//!
//! Results are unioned, keep the best score per prefab id, and are sorted
//! best first.

use crate::library::{sort_by_score, PrefabLibrary};
use crate::similarity::ideom_similarity;
use ideom_core::config::MatchingConfig;
use ideom_core::prefab::{weighted_score, Prefab};
use ideom_core::snapshot::ActivationSnapshot;
use ideom_core::topology::IdeomGraph;
use ideom_core::types::{IdeomId, PrefabId};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// How a prefab came to match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrategy {
    Exact,
    Partial,
    Combination,
    Semantic,
}

/// A scored prefab. `prefab.activation_level` holds the score.
#[derive(Debug, Clone, PartialEq)]
pub struct PrefabMatch {
    pub prefab: Prefab,
    pub strategy: MatchStrategy,
}

impl PrefabMatch {
    pub fn score(&self) -> f64 {
        self.prefab.activation_level
    }
}

#[derive(Debug, Clone, Default)]
pub struct AdvancedMatcher {
    config: MatchingConfig,
}

impl AdvancedMatcher {
    pub fn new(config: MatchingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    /// Run every enabled strategy against the snapshot.
    ///
    /// Library prefabs that match by any strategy are recorded in the
    /// snapshot. Synthesized combinations are not, since they are not
    /// stored in the library.
    pub fn find_matching<G>(
        &self,
        library: &PrefabLibrary,
        graph: &G,
        snapshot: &mut ActivationSnapshot,
    ) -> Vec<PrefabMatch>
    where
        G: IdeomGraph + ?Sized,
    {
        let exact: Vec<PrefabMatch> = library
            .find_matching(snapshot, self.config.prefab_threshold)
            .into_iter()
            .map(|prefab| PrefabMatch { prefab, strategy: MatchStrategy::Exact })
            .collect();
        let exact_ids: HashSet<PrefabId> = exact.iter().map(|m| m.prefab.id.clone()).collect();

        let mut all = exact;
        if self.config.include_partial {
            all.extend(self.partial_matches(library, snapshot, &exact_ids));
        }
        if self.config.include_combinations {
            all.extend(self.combination_matches(library, snapshot, &exact_ids));
        }
        if self.config.include_semantic {
            all.extend(self.semantic_matches(library, graph, snapshot, self.config.semantic_threshold));
        }

        let matches = dedup_best(all);
        for m in &matches {
            if m.strategy != MatchStrategy::Combination && library.get(&m.prefab.id).is_some() {
                snapshot.add_active_prefab(m.prefab.id.clone());
            }
        }
        debug!(
            matched = matches.len(),
            exact = exact_ids.len(),
            "advanced prefab matching"
        );
        matches
    }

    /// Prefabs, other than exact matches, whose partial score reaches
    /// `partial_match_threshold`.
    pub fn partial_matches(
        &self,
        library: &PrefabLibrary,
        snapshot: &ActivationSnapshot,
        exclude: &HashSet<PrefabId>,
    ) -> Vec<PrefabMatch> {
        let active: HashSet<IdeomId> = snapshot.active(self.config.active_threshold).into_iter().collect();
        library
            .all()
            .filter(|prefab| !exclude.contains(&prefab.id))
            .filter_map(|prefab| {
                let score = partial_score(prefab, snapshot, &active);
                (score >= self.config.partial_match_threshold).then(|| scored(prefab, score, MatchStrategy::Partial))
            })
            .collect()
    }

    /// Pairs of non-exact prefabs whose union scores at least
    /// `combination_threshold`, synthesized into new prefabs.
    pub fn combination_matches(
        &self,
        library: &PrefabLibrary,
        snapshot: &ActivationSnapshot,
        exclude: &HashSet<PrefabId>,
    ) -> Vec<PrefabMatch> {
        let candidates: Vec<&Prefab> = library.all().filter(|p| !exclude.contains(&p.id)).collect();
        let mut combos = Vec::new();
        for (i, left) in candidates.iter().enumerate() {
            for right in &candidates[i + 1..] {
                let score = combination_score(left, right, snapshot);
                if score >= self.config.combination_threshold {
                    combos.push(PrefabMatch {
                        prefab: combine(left, right, score),
                        strategy: MatchStrategy::Combination,
                    });
                }
            }
        }
        combos
    }

    /// Prefabs whose template ideoms resemble the snapshot's active ideoms.
    pub fn semantic_matches<G>(
        &self,
        library: &PrefabLibrary,
        graph: &G,
        snapshot: &ActivationSnapshot,
        threshold: f64,
    ) -> Vec<PrefabMatch>
    where
        G: IdeomGraph + ?Sized,
    {
        let active = snapshot.active(self.config.active_threshold);
        library
            .all()
            .filter_map(|prefab| {
                let score = semantic_score(prefab, graph, &active);
                (score >= threshold).then(|| scored(prefab, score, MatchStrategy::Semantic))
            })
            .collect()
    }
}

/// Mean of the weighted score over the active overlap and the fraction of
/// the template that is active. 0 when nothing overlaps.
pub fn partial_score(prefab: &Prefab, snapshot: &ActivationSnapshot, active: &HashSet<IdeomId>) -> f64 {
    if prefab.ideom_weights.is_empty() {
        return 0.0;
    }
    let overlap: Vec<(&IdeomId, f64)> = prefab
        .ideom_weights
        .iter()
        .filter(|(id, _)| active.contains(*id))
        .map(|(id, w)| (id, *w))
        .collect();
    if overlap.is_empty() {
        return 0.0;
    }
    let coverage = overlap.len() as f64 / prefab.ideom_weights.len() as f64;
    (weighted_score(overlap, snapshot) + coverage) / 2.0
}

/// Weighted score of the union of two templates, taking the larger
/// weight where both name the same ideom.
pub fn combination_score(left: &Prefab, right: &Prefab, snapshot: &ActivationSnapshot) -> f64 {
    let union = union_max(left, right);
    weighted_score(union.iter().map(|(id, w)| (id, *w)), snapshot)
}

/// Average, over active ideoms that resemble anything in the template,
/// of the best similarity to a template ideom.
pub fn semantic_score<G>(prefab: &Prefab, graph: &G, active: &[IdeomId]) -> f64
where
    G: IdeomGraph + ?Sized,
{
    if active.is_empty() || prefab.ideom_weights.is_empty() {
        return 0.0;
    }
    let maxima: Vec<f64> = active
        .iter()
        .filter(|id| graph.contains(id))
        .map(|active_id| {
            prefab
                .ideom_weights
                .keys()
                .filter(|template_id| graph.contains(template_id))
                .map(|template_id| ideom_similarity(graph, active_id, template_id))
                .fold(0.0, f64::max)
        })
        .filter(|best| *best > 0.0)
        .collect();
    if maxima.is_empty() {
        return 0.0;
    }
    maxima.iter().sum::<f64>() / maxima.len() as f64
}

fn union_max(left: &Prefab, right: &Prefab) -> BTreeMap<IdeomId, f64> {
    let mut union = left.ideom_weights.clone();
    for (id, w) in &right.ideom_weights {
        union
            .entry(id.clone())
            .and_modify(|existing| *existing = existing.max(*w))
            .or_insert(*w);
    }
    union
}

fn combine(left: &Prefab, right: &Prefab, score: f64) -> Prefab {
    let response_template = if left.ideom_weights.len() >= right.ideom_weights.len() {
        left.response_template.clone()
    } else {
        right.response_template.clone()
    };
    Prefab {
        id: PrefabId::new(),
        name: format!("Combined: {} + {}", left.name, right.name),
        ideom_weights: union_max(left, right),
        activation_level: score,
        activation_threshold: left.activation_threshold.min(right.activation_threshold),
        response_template,
        tags: left.tags.union(&right.tags).cloned().collect(),
    }
}

fn scored(prefab: &Prefab, score: f64, strategy: MatchStrategy) -> PrefabMatch {
    let mut prefab = prefab.clone();
    prefab.activation_level = score;
    PrefabMatch { prefab, strategy }
}

/// Keep the best-scoring entry per prefab id, then sort best first.
fn dedup_best(matches: Vec<PrefabMatch>) -> Vec<PrefabMatch> {
    let mut unique: Vec<PrefabMatch> = Vec::with_capacity(matches.len());
    for candidate in matches {
        match unique.iter_mut().find(|m| m.prefab.id == candidate.prefab.id) {
            Some(existing) if candidate.score() > existing.score() => *existing = candidate,
            Some(_) => {}
            None => unique.push(candidate),
        }
    }
    unique.sort_by(|a, b| b.score().partial_cmp(&a.score()).unwrap_or(std::cmp::Ordering::Equal));
    unique
}

/// The prefabs of a match list, best first.
pub fn prefabs_of(matches: &[PrefabMatch]) -> Vec<Prefab> {
    let mut prefabs: Vec<Prefab> = matches.iter().map(|m| m.prefab.clone()).collect();
    sort_by_score(&mut prefabs);
    prefabs
}
