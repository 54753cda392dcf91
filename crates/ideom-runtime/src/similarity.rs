//! Ideom similarity used by semantic matching.
//!
//! Two ideoms are similar when they point at the same neighbors and carry
//! similar names.

use ideom_core::topology::IdeomGraph;
use ideom_core::types::IdeomId;
use std::collections::HashSet;

/// Similarity of two ideoms in [0, 1].
///
/// Identical ids score 1. Otherwise the score is the mean of the Jaccard
/// index over outgoing neighbor sets and the name similarity. Unknown ids
/// score 0, and so do two ideoms that both have no outgoing edges.
pub fn ideom_similarity<G>(graph: &G, a: &IdeomId, b: &IdeomId) -> f64
where
    G: IdeomGraph + ?Sized,
{
    if a == b {
        return 1.0;
    }
    let (Some(left), Some(right)) = (graph.get(a), graph.get(b)) else {
        return 0.0;
    };
    let left_neighbors: HashSet<IdeomId> = graph.connections(a).into_iter().map(|(id, _)| id).collect();
    let right_neighbors: HashSet<IdeomId> = graph.connections(b).into_iter().map(|(id, _)| id).collect();
    if left_neighbors.is_empty() && right_neighbors.is_empty() {
        return 0.0;
    }
    (jaccard(&left_neighbors, &right_neighbors) + name_similarity(&left.name, &right.name)) / 2.0
}

/// Jaccard index of two sets; 0 when both are empty.
pub fn jaccard<T: Eq + std::hash::Hash>(a: &HashSet<T>, b: &HashSet<T>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

/// Mean of the edit-distance similarity and the common-prefix ratio.
pub fn name_similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let longest = a.len().max(b.len());
    if longest == 0 {
        return 0.0;
    }
    let edit = 1.0 - levenshtein(&a, &b) as f64 / longest as f64;
    let prefix = common_prefix_len(&a, &b) as f64 / longest as f64;
    (edit + prefix) / 2.0
}

/// Levenshtein distance over chars.
pub fn levenshtein(a: &[char], b: &[char]) -> usize {
    if a.len() < b.len() {
        return levenshtein(b, a);
    }
    if b.is_empty() {
        return a.len();
    }
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    for (i, ca) in a.iter().enumerate() {
        let mut current = Vec::with_capacity(b.len() + 1);
        current.push(i + 1);
        for (j, cb) in b.iter().enumerate() {
            let insertion = previous[j + 1] + 1;
            let deletion = current[j] + 1;
            let substitution = previous[j] + usize::from(ca != cb);
            current.push(insertion.min(deletion).min(substitution));
        }
        previous = current;
    }
    previous[b.len()]
}

fn common_prefix_len(a: &[char], b: &[char]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph_impl::PetIdeomGraph;
    use ideom_core::types::Ideom;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn levenshtein_classic_cases() {
        assert_eq!(levenshtein(&chars("kitten"), &chars("sitting")), 3);
        assert_eq!(levenshtein(&chars(""), &chars("abc")), 3);
        assert_eq!(levenshtein(&chars("same"), &chars("same")), 0);
    }

    #[test]
    fn name_similarity_blends_edit_and_prefix() {
        assert_eq!(name_similarity("dog", "dog"), 1.0);
        // edit: 1 - 1/4, prefix: 3/4
        assert!((name_similarity("dog", "dogs") - 0.75).abs() < 1e-12);
        assert_eq!(name_similarity("abc", "xyz"), 0.0);
    }

    #[test]
    fn jaccard_of_empty_sets_is_zero() {
        let empty: HashSet<u8> = HashSet::new();
        assert_eq!(jaccard(&empty, &empty), 0.0);
        let a = HashSet::from([1, 2]);
        let b = HashSet::from([2, 3]);
        assert!((jaccard(&a, &b) - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn ideom_similarity_uses_neighbors_and_names() {
        let mut graph = PetIdeomGraph::new();
        for name in ["dog", "dogs", "bark", "cat"] {
            graph.add(Ideom::new(name, name));
        }
        graph.set_weight(&IdeomId::from("dog"), &IdeomId::from("bark"), 0.8);
        graph.set_weight(&IdeomId::from("dogs"), &IdeomId::from("bark"), 0.8);

        let dog = IdeomId::from("dog");
        assert_eq!(ideom_similarity(&graph, &dog, &dog), 1.0);
        // neighbors identical, names 0.75
        let s = ideom_similarity(&graph, &dog, &IdeomId::from("dogs"));
        assert!((s - 0.875).abs() < 1e-12);
        assert_eq!(ideom_similarity(&graph, &dog, &IdeomId::from("ghost")), 0.0);
    }

    #[test]
    fn isolated_ideoms_are_not_similar_by_name_alone() {
        let mut graph = PetIdeomGraph::new();
        for name in ["dog", "dogs", "bark"] {
            graph.add(Ideom::new(name, name));
        }
        let dog = IdeomId::from("dog");
        let dogs = IdeomId::from("dogs");
        assert_eq!(ideom_similarity(&graph, &dog, &dogs), 0.0);

        // one side with an edge brings the name back in
        graph.set_weight(&dog, &IdeomId::from("bark"), 0.8);
        assert!((ideom_similarity(&graph, &dog, &dogs) - 0.375).abs() < 1e-12);
    }
}
