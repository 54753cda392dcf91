//! Concrete implementation of the IdeomGraph trait using petgraph.
//!
//! Ideoms live in a `StableDiGraph` so that node and edge handles stay
//! valid across removals. HashMap indices give O(1) lookup by id and by
//! display name.

use ideom_core::error::{IdeomError, Result};
use ideom_core::topology::IdeomGraph;
use ideom_core::types::{clamp_unit, Ideom, IdeomId, PrunedConnection};
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use petgraph::Direction;
use std::collections::HashMap;

/// Petgraph-backed ideom graph.
#[derive(Debug, Clone, Default)]
pub struct PetIdeomGraph {
    graph: StableDiGraph<Ideom, f64>,
    /// Map from our IdeomId to petgraph's internal index.
    node_index: HashMap<IdeomId, NodeIndex>,
    /// Display name to ids. Names are not unique.
    name_index: HashMap<String, Vec<IdeomId>>,
    /// Insertion order of live ideoms.
    order: Vec<IdeomId>,
}

impl PetIdeomGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn index_of(&self, id: &IdeomId) -> Option<NodeIndex> {
        self.node_index.get(id).copied()
    }

    fn unindex_name(&mut self, name: &str, id: &IdeomId) {
        if let Some(ids) = self.name_index.get_mut(name) {
            ids.retain(|other| other != id);
            if ids.is_empty() {
                self.name_index.remove(name);
            }
        }
    }

    fn outgoing(&self, idx: NodeIndex) -> Vec<(EdgeIndex, NodeIndex, f64)> {
        let mut edges: Vec<_> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| (e.id(), e.target(), *e.weight()))
            .collect();
        edges.sort_by_key(|(edge, _, _)| *edge);
        edges
    }
}

impl IdeomGraph for PetIdeomGraph {
    fn add(&mut self, ideom: Ideom) -> IdeomId {
        let id = ideom.id.clone();
        if let Some(idx) = self.index_of(&id) {
            let old_name = self.graph[idx].name.clone();
            if old_name != ideom.name {
                self.unindex_name(&old_name, &id);
                self.name_index.entry(ideom.name.clone()).or_default().push(id.clone());
            }
            self.graph[idx] = ideom;
            return id;
        }
        self.name_index.entry(ideom.name.clone()).or_default().push(id.clone());
        let idx = self.graph.add_node(ideom);
        self.node_index.insert(id.clone(), idx);
        self.order.push(id.clone());
        id
    }

    fn get(&self, id: &IdeomId) -> Option<&Ideom> {
        self.index_of(id).and_then(|idx| self.graph.node_weight(idx))
    }

    fn get_mut(&mut self, id: &IdeomId) -> Option<&mut Ideom> {
        let idx = self.index_of(id)?;
        self.graph.node_weight_mut(idx)
    }

    fn remove(&mut self, id: &IdeomId) -> Option<Ideom> {
        let idx = self.node_index.remove(id)?;
        // petgraph drops every incident edge along with the node.
        let ideom = self.graph.remove_node(idx)?;
        self.unindex_name(&ideom.name, id);
        self.order.retain(|other| other != id);
        Some(ideom)
    }

    fn connect(&mut self, a: &IdeomId, b: &IdeomId, weight: f64) -> Result<()> {
        if !self.contains(a) {
            return Err(IdeomError::NodeNotFound(a.clone()));
        }
        if !self.contains(b) {
            return Err(IdeomError::NodeNotFound(b.clone()));
        }
        self.set_weight(a, b, weight);
        self.set_weight(b, a, weight);
        Ok(())
    }

    fn set_weight(&mut self, from: &IdeomId, to: &IdeomId, weight: f64) -> bool {
        let (Some(from_idx), Some(to_idx)) = (self.index_of(from), self.index_of(to)) else {
            return false;
        };
        let existing = self.graph.find_edge(from_idx, to_idx);
        match (existing, weight > 0.0) {
            (Some(edge), true) => self.graph[edge] = weight,
            (Some(edge), false) => {
                self.graph.remove_edge(edge);
            }
            (None, true) => {
                self.graph.add_edge(from_idx, to_idx, weight);
            }
            (None, false) => {}
        }
        true
    }

    fn weight(&self, from: &IdeomId, to: &IdeomId) -> f64 {
        let (Some(from_idx), Some(to_idx)) = (self.index_of(from), self.index_of(to)) else {
            return 0.0;
        };
        self.graph
            .find_edge(from_idx, to_idx)
            .map(|edge| self.graph[edge])
            .unwrap_or(0.0)
    }

    fn connections(&self, id: &IdeomId) -> Vec<(IdeomId, f64)> {
        let Some(idx) = self.index_of(id) else {
            return Vec::new();
        };
        self.outgoing(idx)
            .into_iter()
            .map(|(_, target, w)| (self.graph[target].id.clone(), w))
            .collect()
    }

    fn all_edges(&self) -> Vec<(IdeomId, IdeomId, f64)> {
        self.graph
            .edge_references()
            .map(|e| {
                (
                    self.graph[e.source()].id.clone(),
                    self.graph[e.target()].id.clone(),
                    *e.weight(),
                )
            })
            .collect()
    }

    fn ids(&self) -> Vec<IdeomId> {
        self.order.clone()
    }

    fn by_name(&self, name: &str) -> Vec<&Ideom> {
        self.name_index
            .get(name)
            .map(|ids| ids.iter().filter_map(|id| self.get(id)).collect())
            .unwrap_or_default()
    }

    fn activate(&mut self, id: &IdeomId, strength: f64) -> Option<f64> {
        self.get_mut(id).map(|ideom| ideom.activate(strength))
    }

    fn set_activation(&mut self, id: &IdeomId, level: f64) -> bool {
        match self.get_mut(id) {
            Some(ideom) => {
                ideom.activation_level = clamp_unit(level);
                true
            }
            None => false,
        }
    }

    fn decay_all(&mut self) {
        for ideom in self.graph.node_weights_mut() {
            ideom.decay();
        }
    }

    fn reset_activations(&mut self) {
        for ideom in self.graph.node_weights_mut() {
            ideom.reset();
        }
    }

    fn prune_edges_below(&mut self, threshold: f64) -> Vec<PrunedConnection> {
        let doomed: Vec<(EdgeIndex, PrunedConnection)> = self
            .graph
            .edge_references()
            .filter(|e| *e.weight() < threshold)
            .map(|e| {
                (
                    e.id(),
                    PrunedConnection {
                        from: self.graph[e.source()].id.clone(),
                        to: self.graph[e.target()].id.clone(),
                        final_weight: *e.weight(),
                    },
                )
            })
            .collect();

        // Stable indices: removing one edge never shifts another.
        doomed
            .into_iter()
            .map(|(edge, pruned)| {
                self.graph.remove_edge(edge);
                pruned
            })
            .collect()
    }

    fn len(&self) -> usize {
        self.graph.node_count()
    }

    fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> IdeomId {
        IdeomId::from(s)
    }

    fn graph_with(names: &[&str]) -> PetIdeomGraph {
        let mut graph = PetIdeomGraph::new();
        for name in names {
            graph.add(Ideom::new(*name, *name));
        }
        graph
    }

    #[test]
    fn add_and_get() {
        let graph = graph_with(&["dog"]);
        assert_eq!(graph.get(&id("dog")).map(|i| i.name.as_str()), Some("dog"));
        assert!(graph.get(&id("cat")).is_none());
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn connect_writes_both_directions() {
        let mut graph = graph_with(&["dog", "bark"]);
        graph.connect(&id("dog"), &id("bark"), 0.8).unwrap();
        assert_eq!(graph.weight(&id("dog"), &id("bark")), 0.8);
        assert_eq!(graph.weight(&id("bark"), &id("dog")), 0.8);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn connect_unknown_endpoint_fails() {
        let mut graph = graph_with(&["dog"]);
        let err = graph.connect(&id("dog"), &id("ghost"), 0.5).unwrap_err();
        assert!(matches!(err, IdeomError::NodeNotFound(ref missing) if missing == &id("ghost")));
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn directions_can_diverge() {
        let mut graph = graph_with(&["a", "b"]);
        graph.connect(&id("a"), &id("b"), 0.5).unwrap();
        graph.set_weight(&id("a"), &id("b"), 0.9);
        assert_eq!(graph.weight(&id("a"), &id("b")), 0.9);
        assert_eq!(graph.weight(&id("b"), &id("a")), 0.5);
    }

    #[test]
    fn non_positive_weight_removes_edge() {
        let mut graph = graph_with(&["a", "b"]);
        graph.connect(&id("a"), &id("b"), 0.5).unwrap();
        graph.set_weight(&id("a"), &id("b"), 0.0);
        assert_eq!(graph.weight(&id("a"), &id("b")), 0.0);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn remove_cascades_edges() {
        let mut graph = graph_with(&["a", "b", "c"]);
        graph.connect(&id("a"), &id("b"), 0.5).unwrap();
        graph.connect(&id("c"), &id("b"), 0.5).unwrap();
        let removed = graph.remove(&id("b")).unwrap();
        assert_eq!(removed.name, "b");
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.connections(&id("a")).is_empty());
        assert!(graph.by_name("b").is_empty());
        assert_eq!(graph.ids(), vec![id("a"), id("c")]);
    }

    #[test]
    fn by_name_returns_every_match() {
        let mut graph = PetIdeomGraph::new();
        graph.add(Ideom::new("bank-1", "bank"));
        graph.add(Ideom::new("bank-2", "bank"));
        graph.add(Ideom::new("river", "river"));
        let banks: Vec<_> = graph.by_name("bank").into_iter().map(|i| i.id.clone()).collect();
        assert_eq!(banks, vec![id("bank-1"), id("bank-2")]);
    }

    #[test]
    fn re_adding_keeps_edges_and_reindexes_name() {
        let mut graph = graph_with(&["a", "b"]);
        graph.connect(&id("a"), &id("b"), 0.4).unwrap();
        graph.add(Ideom::new("a", "alpha"));
        assert_eq!(graph.weight(&id("a"), &id("b")), 0.4);
        assert!(graph.by_name("a").is_empty());
        assert_eq!(graph.by_name("alpha").len(), 1);
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn decay_and_reset() {
        let mut graph = graph_with(&["a"]);
        graph.activate(&id("a"), 0.5);
        graph.decay_all();
        assert!((graph.get(&id("a")).unwrap().activation_level - 0.4).abs() < 1e-12);
        graph.reset_activations();
        assert_eq!(graph.get(&id("a")).unwrap().activation_level, 0.0);
    }

    #[test]
    fn active_uses_node_threshold_by_default() {
        let mut graph = PetIdeomGraph::new();
        graph.add(Ideom::new("low", "low").with_threshold(0.2));
        graph.add(Ideom::new("high", "high").with_threshold(0.9));
        graph.activate(&id("low"), 0.3);
        graph.activate(&id("high"), 0.3);
        let active: Vec<_> = graph.active(None).into_iter().map(|i| i.id.clone()).collect();
        assert_eq!(active, vec![id("low")]);
        assert_eq!(graph.active(Some(0.3)).len(), 2);
    }

    #[test]
    fn prune_removes_weak_edges() {
        let mut graph = graph_with(&["a", "b", "c"]);
        graph.connect(&id("a"), &id("b"), 0.05).unwrap();
        graph.connect(&id("a"), &id("c"), 0.5).unwrap();
        let pruned = graph.prune_edges_below(0.1);
        assert_eq!(pruned.len(), 2);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.weight(&id("a"), &id("c")), 0.5);
    }

    #[test]
    fn neighborhood_is_breadth_first() {
        let mut graph = graph_with(&["a", "b", "c", "d"]);
        graph.set_weight(&id("a"), &id("b"), 0.5);
        graph.set_weight(&id("b"), &id("c"), 0.5);
        graph.set_weight(&id("c"), &id("d"), 0.5);
        assert_eq!(graph.neighborhood(&id("a"), 2), vec![id("a"), id("b"), id("c")]);
        assert_eq!(graph.neighborhood(&id("a"), 0), vec![id("a")]);
    }

    #[test]
    fn strongly_connected_filters_by_weight() {
        let mut graph = graph_with(&["a", "b", "c"]);
        graph.connect(&id("a"), &id("b"), 0.9).unwrap();
        graph.connect(&id("a"), &id("c"), 0.2).unwrap();
        let strong: Vec<_> = graph
            .strongly_connected(&id("a"), 0.5)
            .into_iter()
            .map(|i| i.id.clone())
            .collect();
        assert_eq!(strong, vec![id("b")]);
        assert_eq!(graph.connected(&id("a")).len(), 2);
    }
}
