//! Signal propagation: spreading activation across the ideom graph.
//!
//! Seeds are activated first, then activation flows along outgoing edges
//! one step at a time. Only ideoms that were (re)activated in a step form
//! the next frontier. There is no permanent visited set, so a cycle keeps
//! contributing until `max_steps` is reached. The step bound alone
//! guarantees termination.

use crate::temporal::TemporalHistory;
use ideom_core::config::PropagationConfig;
use ideom_core::error::Result;
use ideom_core::snapshot::ActivationSnapshot;
use ideom_core::topology::IdeomGraph;
use ideom_core::types::IdeomId;
use std::collections::BTreeSet;
use tracing::debug;

/// Spreads activation and keeps the temporal history that biases later
/// propagations.
#[derive(Debug, Clone)]
pub struct SignalPropagator {
    config: PropagationConfig,
    history: TemporalHistory,
}

impl SignalPropagator {
    pub fn new(config: PropagationConfig) -> Result<Self> {
        let history = match &config.temporal_weights {
            Some(weights) => TemporalHistory::with_weights(config.history_capacity, weights.clone())?,
            None => TemporalHistory::new(config.history_capacity),
        };
        Ok(Self { config, history })
    }

    pub fn config(&self) -> &PropagationConfig {
        &self.config
    }

    pub fn history(&self) -> &TemporalHistory {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut TemporalHistory {
        &mut self.history
    }

    /// Plain propagation. The result is not recorded in the history.
    pub fn propagate<G>(&self, graph: &mut G, seeds: &[IdeomId], strength: f64) -> ActivationSnapshot
    where
        G: IdeomGraph + ?Sized,
    {
        let mut snapshot = ActivationSnapshot::new();
        let mut frontier: Vec<IdeomId> = Vec::with_capacity(seeds.len());

        for seed in seeds {
            if let Some(level) = graph.activate(seed, strength) {
                snapshot.add_activation(seed.clone(), level);
                if !frontier.contains(seed) {
                    frontier.push(seed.clone());
                }
            }
        }

        let mut steps = 0;
        while steps < self.config.max_steps && !frontier.is_empty() {
            steps += 1;
            let mut next: Vec<IdeomId> = Vec::new();
            for source in &frontier {
                let Some(level) = graph.get(source).map(|i| i.activation_level) else {
                    continue;
                };
                for (target, weight) in graph.connections(source) {
                    let signal = level * weight;
                    if signal <= self.config.propagation_threshold {
                        continue;
                    }
                    if let Some(new_level) = graph.activate(&target, signal) {
                        snapshot.add_activation(target.clone(), new_level);
                        if !next.contains(&target) {
                            next.push(target);
                        }
                    }
                }
            }
            frontier = next;
        }

        debug!(
            seeds = seeds.len(),
            steps,
            activated = snapshot.len(),
            "propagation finished"
        );
        snapshot
    }

    /// Propagate `seeds` while `context` ideoms are activated separately at
    /// `context_strength`. The merged result is recorded in the history.
    pub fn propagate_with_context<G>(
        &mut self,
        graph: &mut G,
        seeds: &[IdeomId],
        context: &[IdeomId],
        strength: f64,
        context_strength: f64,
    ) -> ActivationSnapshot
    where
        G: IdeomGraph + ?Sized,
    {
        let mut context_snapshot = ActivationSnapshot::new();
        for id in context {
            if let Some(level) = graph.activate(id, context_strength) {
                context_snapshot.add_activation(id.clone(), level);
            }
        }
        let result = self.propagate(graph, seeds, strength).merge(&context_snapshot);
        self.history.push(result.clone());
        result
    }

    /// Force each listed ideom's activation to zero.
    pub fn inhibit<G>(&self, graph: &mut G, ids: &[IdeomId])
    where
        G: IdeomGraph + ?Sized,
    {
        for id in ids {
            graph.set_activation(id, 0.0);
        }
    }

    /// Inhibit, then propagate. The result is recorded in the history.
    pub fn propagate_with_inhibition<G>(
        &mut self,
        graph: &mut G,
        seeds: &[IdeomId],
        inhibited: &[IdeomId],
        strength: f64,
    ) -> ActivationSnapshot
    where
        G: IdeomGraph + ?Sized,
    {
        self.inhibit(graph, inhibited);
        let result = self.propagate(graph, seeds, strength);
        self.history.push(result.clone());
        result
    }

    /// Propagate with the history biasing the seeds.
    ///
    /// Persistent ideoms join the seeds (or are boosted if already seeds),
    /// rising ideoms are boosted or injected, falling seeds are damped.
    /// Each seed is propagated on its own and the results merge by maximum,
    /// then the blended history is merged in at `temporal_influence`.
    pub fn propagate_with_temporal_context<G>(
        &mut self,
        graph: &mut G,
        seeds: &[IdeomId],
        strength: f64,
        temporal_influence: f64,
        trend_influence: f64,
    ) -> ActivationSnapshot
    where
        G: IdeomGraph + ?Sized,
    {
        let blended = self.history.blended();
        let persistent = self.history.persistent(self.config.persistent_threshold);
        let increasing = self.history.increasing(self.config.trend_threshold);
        let decreasing = self.history.decreasing(self.config.trend_threshold);

        let mut adjusted: Vec<(IdeomId, f64)> = Vec::new();
        for id in seeds {
            if !adjusted.iter().any(|(seen, _)| seen == id) {
                adjusted.push((id.clone(), strength));
            }
        }
        for id in &persistent {
            match adjusted.iter_mut().find(|(seen, _)| seen == id) {
                Some((_, s)) => *s *= self.config.persistent_boost,
                None => adjusted.push((id.clone(), strength * self.config.persistent_seed_factor)),
            }
        }
        for id in &increasing {
            match adjusted.iter_mut().find(|(seen, _)| seen == id) {
                Some((_, s)) => *s *= 1.0 + trend_influence,
                None => adjusted.push((id.clone(), strength * trend_influence)),
            }
        }
        for id in &decreasing {
            if let Some((_, s)) = adjusted.iter_mut().find(|(seen, _)| seen == id) {
                *s *= 1.0 - trend_influence;
            }
        }

        let mut result = ActivationSnapshot::new();
        for (id, seed_strength) in &adjusted {
            let partial = self.propagate(graph, std::slice::from_ref(id), *seed_strength);
            result.absorb(&partial);
        }
        for (id, level) in blended.iter() {
            let weighted = level * temporal_influence;
            if weighted > 0.0 {
                result.add_activation(id.clone(), weighted);
            }
        }
        for prefab in blended.active_prefabs() {
            result.add_active_prefab(prefab.clone());
        }

        debug!(
            seeds = seeds.len(),
            persistent = persistent.len(),
            increasing = increasing.len(),
            decreasing = decreasing.len(),
            "temporal propagation finished"
        );
        self.history.push(result.clone());
        result
    }

    /// Propagate, then add a linear extrapolation for every ideom whose
    /// last two recorded levels are rising. The result is recorded in the
    /// history.
    pub fn propagate_with_pattern_prediction<G>(
        &mut self,
        graph: &mut G,
        seeds: &[IdeomId],
        strength: f64,
        prediction_weight: f64,
    ) -> ActivationSnapshot
    where
        G: IdeomGraph + ?Sized,
    {
        let mut result = self.propagate(graph, seeds, strength);
        let mut predicted = 0usize;
        for (id, trend) in self.history.detect_patterns(2) {
            if let [.., previous, last] = trend[..] {
                if last > previous {
                    let extrapolated = (last + (last - previous)).min(1.0);
                    result.add_activation(id, extrapolated * prediction_weight);
                    predicted += 1;
                }
            }
        }
        debug!(predicted, "pattern prediction applied");
        self.history.push(result.clone());
        result
    }

    /// Ids at or above `threshold` after a plain propagation.
    pub fn activation_spread<G>(
        &self,
        graph: &mut G,
        seeds: &[IdeomId],
        strength: f64,
        threshold: f64,
    ) -> BTreeSet<IdeomId>
    where
        G: IdeomGraph + ?Sized,
    {
        self.propagate(graph, seeds, strength)
            .active(threshold)
            .into_iter()
            .collect()
    }
}
