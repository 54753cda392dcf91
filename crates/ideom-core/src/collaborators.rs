//! Collaborator seams: turning text into seed activations and turning a
//! snapshot back into text.
//!
//! Both are strategy objects handed to the reasoner when it is built.

use crate::prefab::Prefab;
use crate::snapshot::ActivationSnapshot;
use crate::topology::IdeomGraph;
use crate::types::IdeomId;

/// Converts input text into ordered seed activations.
///
/// An encoder may add ideoms to the graph for tokens it has not seen.
pub trait Encoder {
    fn encode(&mut self, text: &str, graph: &mut dyn IdeomGraph) -> Vec<(IdeomId, f64)>;
}

/// Produces a textual response for a snapshot and its matched prefabs.
///
/// `matches` is sorted best-first.
pub trait Renderer {
    fn render(
        &self,
        snapshot: &ActivationSnapshot,
        matches: &[Prefab],
        graph: &dyn IdeomGraph,
    ) -> String;
}
