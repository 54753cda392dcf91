//! State persistence: save/load the ideom graph and the prefab library.
//!
//! Two independent JSON documents, each a map keyed by id:
//!
//! - `ideoms.json`: id → { name, connections, activation_threshold, decay_rate }
//! - `prefabs.json`: id → { name, ideom_weights, activation_threshold,
//!   response_template, tags }
//!
//! Loading is all-or-nothing per document. The whole file is parsed and
//! checked before anything is built, so a malformed file never leaves a
//! half-populated graph behind.

use crate::graph_impl::PetIdeomGraph;
use crate::library::PrefabLibrary;
use ideom_core::error::{IdeomError, Result};
use ideom_core::prefab::Prefab;
use ideom_core::topology::IdeomGraph;
use ideom_core::types::{Ideom, IdeomId, PrefabId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

pub const IDEOMS_FILE: &str = "ideoms.json";
pub const PREFABS_FILE: &str = "prefabs.json";

/// Serializable ideom with its outgoing connections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredIdeom {
    pub name: String,
    #[serde(default)]
    pub connections: BTreeMap<IdeomId, f64>,
    pub activation_threshold: f64,
    pub decay_rate: f64,
}

/// Serializable prefab. The derived activation level is not stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredPrefab {
    pub name: String,
    #[serde(default)]
    pub ideom_weights: BTreeMap<IdeomId, f64>,
    pub activation_threshold: f64,
    pub response_template: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

pub type IdeomDocument = BTreeMap<IdeomId, StoredIdeom>;
pub type PrefabDocument = BTreeMap<PrefabId, StoredPrefab>;

/// Capture every ideom and its outgoing edges.
pub fn ideom_document<G>(graph: &G) -> IdeomDocument
where
    G: IdeomGraph + ?Sized,
{
    graph
        .ids()
        .into_iter()
        .filter_map(|id| {
            let ideom = graph.get(&id)?;
            let stored = StoredIdeom {
                name: ideom.name.clone(),
                connections: graph.connections(&id).into_iter().collect(),
                activation_threshold: ideom.activation_threshold,
                decay_rate: ideom.decay_rate,
            };
            Some((id, stored))
        })
        .collect()
}

pub fn prefab_document(library: &PrefabLibrary) -> PrefabDocument {
    library
        .all()
        .map(|prefab| {
            let stored = StoredPrefab {
                name: prefab.name.clone(),
                ideom_weights: prefab.ideom_weights.clone(),
                activation_threshold: prefab.activation_threshold,
                response_template: prefab.response_template.clone(),
                tags: prefab.tags.iter().cloned().collect(),
            };
            (prefab.id.clone(), stored)
        })
        .collect()
}

/// Save the graph to a JSON file, creating parent directories as needed.
pub fn save_ideoms<G>(graph: &G, path: &Path) -> Result<()>
where
    G: IdeomGraph + ?Sized,
{
    let document = ideom_document(graph);
    write_json(path, &document)?;
    info!(path = %path.display(), ideoms = document.len(), "saved ideoms");
    Ok(())
}

/// Load a graph saved with [`save_ideoms`]. Every connection must name an
/// ideom present in the same document.
pub fn load_ideoms(path: &Path) -> Result<PetIdeomGraph> {
    let document: IdeomDocument = read_json(path)?;
    for (id, stored) in &document {
        if let Some(target) = stored.connections.keys().find(|t| !document.contains_key(*t)) {
            return Err(IdeomError::load_failure(
                path,
                format!("ideom {} connects to unknown ideom {}", id, target),
            ));
        }
    }

    let mut graph = PetIdeomGraph::new();
    for (id, stored) in &document {
        graph.add(
            Ideom::new(id.clone(), stored.name.clone())
                .with_threshold(stored.activation_threshold)
                .with_decay_rate(stored.decay_rate),
        );
    }
    for (id, stored) in &document {
        for (target, weight) in &stored.connections {
            graph.set_weight(id, target, *weight);
        }
    }
    info!(
        path = %path.display(),
        ideoms = graph.len(),
        edges = graph.edge_count(),
        "loaded ideoms"
    );
    Ok(graph)
}

pub fn save_prefabs(library: &PrefabLibrary, path: &Path) -> Result<()> {
    let document = prefab_document(library);
    write_json(path, &document)?;
    info!(path = %path.display(), prefabs = document.len(), "saved prefabs");
    Ok(())
}

/// Load a library saved with [`save_prefabs`].
pub fn load_prefabs(path: &Path, default_threshold: f64) -> Result<PrefabLibrary> {
    let document: PrefabDocument = read_json(path)?;
    let mut library = PrefabLibrary::new(default_threshold);
    for (id, stored) in document {
        let mut prefab = Prefab::new(stored.name)
            .with_id(id)
            .with_weights(stored.ideom_weights)
            .with_threshold(stored.activation_threshold)
            .with_tags(stored.tags);
        prefab.response_template = stored.response_template;
        library.add(prefab);
    }
    info!(path = %path.display(), prefabs = library.len(), "loaded prefabs");
    Ok(library)
}

/// Write `ideoms.json` and `prefabs.json` into `dir`.
pub fn save_state<G>(graph: &G, library: &PrefabLibrary, dir: &Path) -> Result<()>
where
    G: IdeomGraph + ?Sized,
{
    save_ideoms(graph, &dir.join(IDEOMS_FILE))?;
    save_prefabs(library, &dir.join(PREFABS_FILE))
}

/// Read both documents from `dir`. Fails without returning anything if
/// either document is missing or malformed.
pub fn load_state(dir: &Path, default_threshold: f64) -> Result<(PetIdeomGraph, PrefabLibrary)> {
    let graph = load_ideoms(&dir.join(IDEOMS_FILE))?;
    let library = load_prefabs(&dir.join(PREFABS_FILE), default_threshold)?;
    Ok((graph, library))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, json)?;
    Ok(())
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path).map_err(|e| IdeomError::load_failure(path, e))?;
    serde_json::from_str(&content).map_err(|e| IdeomError::load_failure(path, e))
}
