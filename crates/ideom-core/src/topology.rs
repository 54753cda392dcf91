//! Topology: the ideom graph seam.
//!
//! Nodes are ideoms; edges are directed weights. `connect` writes the same
//! weight in both directions, after which each direction is updated on its
//! own. This is a trait so that the reasoning machinery does not depend on
//! a particular graph backend.

use crate::error::Result;
use crate::types::{Ideom, IdeomId, PrunedConnection};
use std::collections::{HashSet, VecDeque};

pub trait IdeomGraph {
    /// Insert an ideom. An existing ideom with the same id has its data
    /// replaced and keeps its edges.
    fn add(&mut self, ideom: Ideom) -> IdeomId;

    fn get(&self, id: &IdeomId) -> Option<&Ideom>;

    fn get_mut(&mut self, id: &IdeomId) -> Option<&mut Ideom>;

    /// Remove an ideom and every edge that touches it.
    fn remove(&mut self, id: &IdeomId) -> Option<Ideom>;

    /// Write `weight` on both `a -> b` and `b -> a`.
    ///
    /// Fails with `NodeNotFound` if either endpoint is missing.
    fn connect(&mut self, a: &IdeomId, b: &IdeomId, weight: f64) -> Result<()>;

    /// Set a single direction. A weight of zero or less removes the edge.
    /// Returns false if either endpoint is missing.
    fn set_weight(&mut self, from: &IdeomId, to: &IdeomId, weight: f64) -> bool;

    /// Weight of `from -> to`, or 0 when there is no such edge.
    fn weight(&self, from: &IdeomId, to: &IdeomId) -> f64;

    /// Outgoing edges of `id` in creation order.
    fn connections(&self, id: &IdeomId) -> Vec<(IdeomId, f64)>;

    /// Every edge as `(from, to, weight)`.
    fn all_edges(&self) -> Vec<(IdeomId, IdeomId, f64)>;

    /// Ids in insertion order.
    fn ids(&self) -> Vec<IdeomId>;

    /// Ideoms sharing a display name, in insertion order.
    fn by_name(&self, name: &str) -> Vec<&Ideom>;

    /// Raise an ideom's activation by `strength`, saturating at 1.
    /// Returns the new level, or `None` for an unknown id.
    fn activate(&mut self, id: &IdeomId, strength: f64) -> Option<f64>;

    /// Force an activation level (clamped into [0, 1]).
    fn set_activation(&mut self, id: &IdeomId, level: f64) -> bool;

    fn decay_all(&mut self);

    fn reset_activations(&mut self);

    /// Remove every edge whose weight is below `threshold`.
    fn prune_edges_below(&mut self, threshold: f64) -> Vec<PrunedConnection>;

    fn len(&self) -> usize;

    fn edge_count(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn contains(&self, id: &IdeomId) -> bool {
        self.get(id).is_some()
    }

    /// Targets of the outgoing edges of `id`.
    fn connected(&self, id: &IdeomId) -> Vec<&Ideom> {
        self.connections(id)
            .into_iter()
            .filter_map(|(to, _)| self.get(&to))
            .collect()
    }

    /// Targets whose edge weight is at least `threshold`.
    fn strongly_connected(&self, id: &IdeomId, threshold: f64) -> Vec<&Ideom> {
        self.connections(id)
            .into_iter()
            .filter(|(_, w)| *w >= threshold)
            .filter_map(|(to, _)| self.get(&to))
            .collect()
    }

    /// Breadth-first ids reachable within `depth` hops, starting with `id`.
    fn neighborhood(&self, id: &IdeomId, depth: usize) -> Vec<IdeomId> {
        if !self.contains(id) {
            return Vec::new();
        }
        let mut seen = HashSet::from([id.clone()]);
        let mut order = vec![id.clone()];
        let mut queue = VecDeque::from([(id.clone(), 0usize)]);
        while let Some((current, dist)) = queue.pop_front() {
            if dist == depth {
                continue;
            }
            for (next, _) in self.connections(&current) {
                if seen.insert(next.clone()) {
                    order.push(next.clone());
                    queue.push_back((next, dist + 1));
                }
            }
        }
        order
    }

    /// Ideoms at or above `threshold`, or their own activation threshold
    /// when none is given.
    fn active(&self, threshold: Option<f64>) -> Vec<&Ideom> {
        self.ids()
            .into_iter()
            .filter_map(|id| self.get(&id))
            .filter(|ideom| ideom.activation_level >= threshold.unwrap_or(ideom.activation_threshold))
            .collect()
    }
}
