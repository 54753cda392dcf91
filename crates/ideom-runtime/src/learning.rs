//! Learning engine: Hebbian edge updates, template reinforcement and
//! feedback.
//!
//! Edges are directed. Every update adjusts `a -> b` and `b -> a` on their
//! own by the same delta, so two directions that start equal stay equal
//! under learning but may already differ from earlier manual edits.
//! Strengthening caps edge weights at 1.0 without lowering a heavier edge.
//! Template weights are not capped. An edge whose updated weight is at or below
//! `connection_strength_threshold` is removed rather than written.

use crate::library::PrefabLibrary;
use ideom_core::collaborators::Encoder;
use ideom_core::config::LearningConfig;
use ideom_core::feedback::Feedback;
use ideom_core::prefab::Prefab;
use ideom_core::snapshot::ActivationSnapshot;
use ideom_core::topology::IdeomGraph;
use ideom_core::types::{IdeomId, PrefabId};
use std::ops::AddAssign;
use tracing::{debug, info, warn};

/// Minimum activation for an ideom to enter a prefab built from a
/// successful snapshot.
const SUCCESSFUL_SNAPSHOT_MIN_ACTIVATION: f64 = 0.3;

/// Counts of what a learning call changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LearningReport {
    pub edges_strengthened: usize,
    pub edges_weakened: usize,
    pub edges_pruned: usize,
    pub prefabs_updated: usize,
    pub prefabs_created: usize,
    pub prefabs_merged: usize,
    pub template_weights_added: usize,
    pub template_weights_removed: usize,
}

impl LearningReport {
    pub fn is_empty(&self) -> bool {
        *self == LearningReport::default()
    }
}

impl AddAssign for LearningReport {
    fn add_assign(&mut self, other: Self) {
        self.edges_strengthened += other.edges_strengthened;
        self.edges_weakened += other.edges_weakened;
        self.edges_pruned += other.edges_pruned;
        self.prefabs_updated += other.prefabs_updated;
        self.prefabs_created += other.prefabs_created;
        self.prefabs_merged += other.prefabs_merged;
        self.template_weights_added += other.template_weights_added;
        self.template_weights_removed += other.template_weights_removed;
    }
}

#[derive(Debug, Clone)]
pub struct LearningEngine {
    config: LearningConfig,
    /// Threshold used to decide which prefabs a snapshot matched.
    prefab_threshold: f64,
}

impl LearningEngine {
    pub fn new(config: LearningConfig, prefab_threshold: f64) -> Self {
        Self { config, prefab_threshold }
    }

    pub fn config(&self) -> &LearningConfig {
        &self.config
    }

    /// Strengthen every co-active pair by `learning_rate * a_i * a_j`, then
    /// reinforce the templates of every prefab the snapshot matched.
    pub fn learn_from_activation(
        &self,
        graph: &mut dyn IdeomGraph,
        library: &mut PrefabLibrary,
        snapshot: &ActivationSnapshot,
    ) -> LearningReport {
        let mut report = LearningReport::default();
        let present = present_ideoms(graph, snapshot);
        for (i, (a, level_a)) in present.iter().enumerate() {
            for (b, level_b) in &present[i + 1..] {
                let delta = self.config.learning_rate * level_a * level_b;
                report += self.adjust_pair(graph, a, b, delta);
            }
        }

        for id in self.matched_prefabs(library, snapshot) {
            let Some(prefab) = library.get_mut(&id) else {
                continue;
            };
            report += reinforce_template(
                prefab,
                snapshot,
                self.config.learning_rate,
                Some(self.config.template_admission_threshold),
            );
        }

        debug!(?report, "learned from activation");
        report
    }

    /// Apply external feedback. Never fails: sub-steps that cannot run are
    /// skipped with a warning.
    ///
    /// A positive score reinforces the snapshot as `learn_from_activation`
    /// does; any other score weakens co-active edges and matched templates
    /// by `learning_rate * |score|`. A corrected response becomes a new
    /// prefab. Ideoms and prefabs the caller says should have been active
    /// are reinforced on top.
    pub fn learn_from_feedback(
        &self,
        graph: &mut dyn IdeomGraph,
        library: &mut PrefabLibrary,
        encoder: &mut dyn Encoder,
        feedback: &Feedback,
    ) -> LearningReport {
        let mut report = if feedback.is_positive() {
            self.learn_from_activation(graph, library, &feedback.snapshot)
        } else {
            self.weaken(graph, library, &feedback.snapshot, feedback.score.abs())
        };

        if let Some(response) = &feedback.corrected_response {
            report += self.learn_correction(graph, library, encoder, &feedback.input_text, response);
        }

        if !feedback.activated_ideoms.is_empty() {
            let known: Vec<(IdeomId, f64)> = feedback
                .activated_ideoms
                .iter()
                .filter(|id| {
                    let known = graph.contains(id);
                    if !known {
                        warn!(ideom = %id, "feedback names an unknown ideom, skipping");
                    }
                    known
                })
                .map(|id| (id.clone(), 1.0))
                .collect();
            let expected = ActivationSnapshot::from_activations(known);
            report += self.learn_from_activation(graph, library, &expected);
        }

        for prefab_id in &feedback.activated_prefabs {
            match library.get_mut(prefab_id) {
                Some(prefab) => {
                    report += reinforce_template(
                        prefab,
                        &feedback.snapshot,
                        self.config.learning_rate,
                        None,
                    );
                }
                None => warn!(prefab = %prefab_id, "feedback names an unknown prefab, skipping"),
            }
        }

        debug!(score = feedback.score, ?report, "learned from feedback");
        report
    }

    /// Store a prefab built from the snapshot's ideoms at or above 0.3.
    pub fn create_prefab_from_successful_snapshot<I, S>(
        &self,
        library: &mut PrefabLibrary,
        snapshot: &ActivationSnapshot,
        name: impl Into<String>,
        response_template: Option<String>,
        tags: I,
    ) -> PrefabId
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        library.create_from_snapshot(
            snapshot,
            name,
            SUCCESSFUL_SNAPSHOT_MIN_ACTIVATION,
            response_template,
            tags,
        )
    }

    /// Shift every co-active edge by the signed `learning_rate * score`.
    /// Templates are left alone.
    pub fn adjust_connection_strengths(&self, graph: &mut dyn IdeomGraph, feedback: &Feedback) -> LearningReport {
        let mut report = LearningReport::default();
        let delta = self.config.learning_rate * feedback.score;
        let present = present_ideoms(graph, &feedback.snapshot);
        for (i, (a, _)) in present.iter().enumerate() {
            for (b, _) in &present[i + 1..] {
                report += self.adjust_pair(graph, a, b, delta);
            }
        }
        report
    }

    /// Drop every edge below `connection_strength_threshold`, then merge
    /// prefabs whose templates overlap by at least
    /// `merge_similarity_threshold`.
    pub fn optimize(&self, graph: &mut dyn IdeomGraph, library: &mut PrefabLibrary) -> LearningReport {
        let pruned = graph.prune_edges_below(self.config.connection_strength_threshold);
        let merged = library.merge_similar(self.config.merge_similarity_threshold);
        let report = LearningReport {
            edges_pruned: pruned.len(),
            prefabs_merged: merged,
            ..LearningReport::default()
        };
        info!(
            edges_pruned = report.edges_pruned,
            prefabs_merged = report.prefabs_merged,
            "optimized graph and library"
        );
        report
    }

    fn weaken(
        &self,
        graph: &mut dyn IdeomGraph,
        library: &mut PrefabLibrary,
        snapshot: &ActivationSnapshot,
        magnitude: f64,
    ) -> LearningReport {
        let mut report = LearningReport::default();
        let delta = -self.config.learning_rate * magnitude;
        let present = present_ideoms(graph, snapshot);
        for (i, (a, _)) in present.iter().enumerate() {
            for (b, _) in &present[i + 1..] {
                report += self.adjust_pair(graph, a, b, delta);
            }
        }

        for id in self.matched_prefabs(library, snapshot) {
            let Some(prefab) = library.get_mut(&id) else {
                continue;
            };
            let mut touched = false;
            for (ideom, _) in snapshot.iter() {
                let Some(weight) = prefab.weight(ideom) else {
                    continue;
                };
                let lowered = weight + delta;
                if lowered > 0.0 {
                    prefab.update_weight(ideom, lowered);
                } else {
                    prefab.remove_weight(ideom);
                    report.template_weights_removed += 1;
                }
                touched = true;
            }
            if touched {
                report.prefabs_updated += 1;
            }
        }
        report
    }

    fn learn_correction(
        &self,
        graph: &mut dyn IdeomGraph,
        library: &mut PrefabLibrary,
        encoder: &mut dyn Encoder,
        input_text: &str,
        response: &str,
    ) -> LearningReport {
        let mut report = LearningReport::default();
        let input = encoder.encode(input_text, graph);
        if input.is_empty() {
            warn!("corrected response given for input that encodes to nothing, skipping");
            return report;
        }
        let answer = encoder.encode(response, graph);

        let words = input_text.split_whitespace().count();
        let prefab = Prefab::new(format!("Learned_{}_words", words))
            .with_weights(input.iter().cloned())
            .with_threshold(self.config.feedback_prefab_threshold)
            .with_template(response)
            .with_tags(["learned", "feedback"]);
        library.add(prefab);
        report.prefabs_created += 1;

        for (input_id, input_level) in &input {
            for (answer_id, answer_level) in &answer {
                if input_id == answer_id {
                    continue;
                }
                let strength = ((input_level + answer_level) / 2.0).min(1.0);
                if strength <= self.config.connection_strength_threshold {
                    continue;
                }
                for (from, to) in [(input_id, answer_id), (answer_id, input_id)] {
                    if strength > graph.weight(from, to) && graph.set_weight(from, to, strength) {
                        report.edges_strengthened += 1;
                    }
                }
            }
        }
        report
    }

    /// Apply `delta` to both directions between `a` and `b`.
    fn adjust_pair(&self, graph: &mut dyn IdeomGraph, a: &IdeomId, b: &IdeomId, delta: f64) -> LearningReport {
        let mut report = LearningReport::default();
        for (from, to) in [(a, b), (b, a)] {
            let current = graph.weight(from, to);
            // positive learning caps at 1 but never lowers an edge already above it
            let updated = if delta > 0.0 {
                current.max((current + delta).min(1.0))
            } else {
                current + delta
            };
            if updated > self.config.connection_strength_threshold {
                if updated != current {
                    graph.set_weight(from, to, updated);
                    if updated > current {
                        report.edges_strengthened += 1;
                    } else {
                        report.edges_weakened += 1;
                    }
                }
            } else if current > 0.0 {
                graph.set_weight(from, to, 0.0);
                report.edges_pruned += 1;
            }
        }
        report
    }

    /// Prefabs recorded on the snapshot, followed by any other prefab
    /// that scores at the match threshold.
    fn matched_prefabs(&self, library: &PrefabLibrary, snapshot: &ActivationSnapshot) -> Vec<PrefabId> {
        let mut ids: Vec<PrefabId> = snapshot.active_prefabs().to_vec();
        for prefab in library.matching(snapshot, self.prefab_threshold) {
            if !ids.contains(&prefab.id) {
                ids.push(prefab.id);
            }
        }
        ids
    }
}

/// Raise the weight of every template ideom present in the snapshot by
/// `rate * activation`. With an admission threshold, snapshot ideoms
/// strictly above it that are missing from the template are added at
/// their activation.
fn reinforce_template(
    prefab: &mut Prefab,
    snapshot: &ActivationSnapshot,
    rate: f64,
    admission: Option<f64>,
) -> LearningReport {
    let mut report = LearningReport::default();
    let mut touched = false;
    for (ideom, level) in snapshot.iter() {
        match prefab.weight(ideom) {
            Some(weight) => {
                prefab.update_weight(ideom, weight + rate * level);
                touched = true;
            }
            None => {
                if admission.is_some_and(|threshold| level > threshold) {
                    prefab.add_weight(ideom.clone(), level);
                    report.template_weights_added += 1;
                    touched = true;
                }
            }
        }
    }
    if touched {
        report.prefabs_updated += 1;
    }
    report
}

/// Snapshot ideoms that exist in the graph, with their levels.
fn present_ideoms(graph: &dyn IdeomGraph, snapshot: &ActivationSnapshot) -> Vec<(IdeomId, f64)> {
    snapshot
        .iter()
        .filter(|(id, _)| graph.contains(id))
        .map(|(id, level)| (id.clone(), level))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::LexiconEncoder;
    use crate::graph_impl::PetIdeomGraph;
    use ideom_core::types::Ideom;

    fn id(s: &str) -> IdeomId {
        IdeomId::from(s)
    }

    fn engine() -> LearningEngine {
        LearningEngine::new(LearningConfig::default(), 0.5)
    }

    fn dog_bark(weight: f64) -> PetIdeomGraph {
        let mut graph = PetIdeomGraph::new();
        graph.add(Ideom::new("dog", "dog"));
        graph.add(Ideom::new("bark", "bark"));
        graph.connect(&id("dog"), &id("bark"), weight).unwrap();
        graph
    }

    fn snapshot(levels: &[(&str, f64)]) -> ActivationSnapshot {
        ActivationSnapshot::from_activations(levels.iter().map(|(s, l)| (id(s), *l)))
    }

    #[test]
    fn co_activation_strengthens_both_directions() {
        let mut graph = dog_bark(0.5);
        let mut library = PrefabLibrary::default();
        let report = engine().learn_from_activation(
            &mut graph,
            &mut library,
            &snapshot(&[("dog", 1.0), ("bark", 0.8)]),
        );
        assert!((graph.weight(&id("dog"), &id("bark")) - 0.58).abs() < 1e-12);
        assert!((graph.weight(&id("bark"), &id("dog")) - 0.58).abs() < 1e-12);
        assert_eq!(report.edges_strengthened, 2);
    }

    #[test]
    fn repeated_learning_climbs_to_one() {
        let mut graph = dog_bark(0.5);
        let mut library = PrefabLibrary::default();
        let snap = snapshot(&[("dog", 1.0), ("bark", 1.0)]);
        let mut previous = graph.weight(&id("dog"), &id("bark"));
        for _ in 0..10 {
            engine().learn_from_activation(&mut graph, &mut library, &snap);
            let current = graph.weight(&id("dog"), &id("bark"));
            assert!(current >= previous);
            previous = current;
        }
        assert_eq!(previous, 1.0);
    }

    #[test]
    fn weak_co_activation_creates_no_edge() {
        let mut graph = PetIdeomGraph::new();
        graph.add(Ideom::new("a", "a"));
        graph.add(Ideom::new("b", "b"));
        let mut library = PrefabLibrary::default();
        engine().learn_from_activation(&mut graph, &mut library, &snapshot(&[("a", 0.5), ("b", 0.5)]));
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn matched_templates_are_reinforced_and_extended() {
        let mut graph = dog_bark(0.5);
        let mut library = PrefabLibrary::default();
        let prefab_id = library.add(Prefab::new("dogs").with_weight("dog", 0.5));
        let report = engine().learn_from_activation(
            &mut graph,
            &mut library,
            &snapshot(&[("dog", 1.0), ("bark", 0.8)]),
        );
        let prefab = library.get(&prefab_id).unwrap();
        assert!((prefab.weight(&id("dog")).unwrap() - 0.6).abs() < 1e-12);
        assert_eq!(prefab.weight(&id("bark")), Some(0.8));
        assert_eq!(report.template_weights_added, 1);
        assert_eq!(report.prefabs_updated, 1);
    }

    #[test]
    fn template_weights_grow_past_one() {
        let mut graph = PetIdeomGraph::new();
        graph.add(Ideom::new("a", "a"));
        let mut library = PrefabLibrary::default();
        let prefab_id = library.add(Prefab::new("heavy").with_weight("a", 2.0).with_threshold(0.1));
        let report = engine().learn_from_activation(&mut graph, &mut library, &snapshot(&[("a", 0.9)]));
        let weight = library.get(&prefab_id).unwrap().weight(&id("a")).unwrap();
        assert!((weight - 2.09).abs() < 1e-12);
        assert_eq!(report.prefabs_updated, 1);
    }

    #[test]
    fn negative_feedback_weakens_until_pruned() {
        let mut graph = dog_bark(0.5);
        let mut library = PrefabLibrary::default();
        let mut encoder = LexiconEncoder::new();
        let feedback = Feedback::new("dog bark", snapshot(&[("dog", 1.0), ("bark", 1.0)]), -1.0);

        let mut previous = graph.weight(&id("dog"), &id("bark"));
        for _ in 0..10 {
            engine().learn_from_feedback(&mut graph, &mut library, &mut encoder, &feedback);
            let current = graph.weight(&id("dog"), &id("bark"));
            assert!(current <= previous);
            previous = current;
        }
        assert_eq!(previous, 0.0);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn corrected_response_becomes_a_prefab() {
        let mut graph = PetIdeomGraph::new();
        let mut library = PrefabLibrary::default();
        let mut encoder = LexiconEncoder::new();
        let feedback = Feedback::new("dog", ActivationSnapshot::new(), 1.0)
            .with_correction("dogs bark loudly");

        let report = engine().learn_from_feedback(&mut graph, &mut library, &mut encoder, &feedback);
        assert_eq!(report.prefabs_created, 1);
        let learned = library.by_name("Learned_1_words");
        assert_eq!(learned.len(), 1);
        assert!(learned[0].has_tag("feedback"));
        assert_eq!(learned[0].response_template.as_deref(), Some("dogs bark loudly"));

        let dog = graph.by_name("dog")[0].id.clone();
        let bark = graph.by_name("bark")[0].id.clone();
        assert!((graph.weight(&dog, &bark) - 0.7).abs() < 1e-12);
        assert!((graph.weight(&bark, &dog) - 0.7).abs() < 1e-12);
    }

    #[test]
    fn unknown_feedback_ids_are_skipped() {
        let mut graph = dog_bark(0.5);
        let mut library = PrefabLibrary::default();
        let mut encoder = LexiconEncoder::new();
        let feedback = Feedback::new("", ActivationSnapshot::new(), 1.0)
            .with_activated_ideoms([id("ghost")])
            .with_activated_prefabs([PrefabId::from("missing")]);
        let report = engine().learn_from_feedback(&mut graph, &mut library, &mut encoder, &feedback);
        assert!(report.is_empty());
        assert_eq!(graph.weight(&id("dog"), &id("bark")), 0.5);
    }

    #[test]
    fn adjust_connection_strengths_uses_signed_score() {
        let mut graph = dog_bark(0.5);
        let up = Feedback::new("", snapshot(&[("dog", 1.0), ("bark", 1.0)]), 0.5);
        engine().adjust_connection_strengths(&mut graph, &up);
        assert!((graph.weight(&id("dog"), &id("bark")) - 0.55).abs() < 1e-12);

        let down = Feedback::new("", snapshot(&[("dog", 1.0), ("bark", 1.0)]), -1.0);
        engine().adjust_connection_strengths(&mut graph, &down);
        assert!((graph.weight(&id("bark"), &id("dog")) - 0.45).abs() < 1e-12);
    }

    #[test]
    fn successful_snapshot_keeps_strong_ideoms() {
        let mut library = PrefabLibrary::default();
        let prefab_id = engine().create_prefab_from_successful_snapshot(
            &mut library,
            &snapshot(&[("dog", 0.9), ("cat", 0.2)]),
            "dog only",
            None,
            ["auto"],
        );
        let prefab = library.get(&prefab_id).unwrap();
        assert_eq!(prefab.weight(&id("dog")), Some(0.9));
        assert_eq!(prefab.weight(&id("cat")), None);
    }

    #[test]
    fn optimize_prunes_and_merges() {
        let mut graph = dog_bark(0.5);
        graph.set_weight(&id("dog"), &id("bark"), 0.05);
        let mut library = PrefabLibrary::default();
        library.add(Prefab::new("a").with_weight("dog", 1.0).with_weight("bark", 1.0));
        library.add(Prefab::new("b").with_weight("dog", 0.5).with_weight("bark", 0.5));

        let report = engine().optimize(&mut graph, &mut library);
        assert_eq!(report.edges_pruned, 1);
        assert_eq!(report.prefabs_merged, 1);
        assert_eq!(library.len(), 1);
        assert_eq!(graph.weight(&id("bark"), &id("dog")), 0.5);
    }
}
