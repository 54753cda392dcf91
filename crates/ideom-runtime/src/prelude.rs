//! Ideom Runtime Prelude: convenient imports for common usage.
//!
//! ```rust
//! use ideom_runtime::prelude::*;
//! ```

// Re-export the graph arena
pub use crate::graph_impl::PetIdeomGraph;

// Re-export propagation and temporal history
pub use crate::propagation::SignalPropagator;
pub use crate::temporal::TemporalHistory;

// Re-export prefab library and matching
pub use crate::library::PrefabLibrary;
pub use crate::matcher::{AdvancedMatcher, MatchStrategy, PrefabMatch};

// Re-export learning
pub use crate::learning::{LearningEngine, LearningReport};

// Re-export default strategies
pub use crate::encoder::LexiconEncoder;
pub use crate::renderer::TemplateRenderer;

// Re-export persistence
pub use crate::persistence::{
    load_ideoms, load_prefabs, load_state, save_ideoms, save_prefabs, save_state,
    StoredIdeom, StoredPrefab, IDEOMS_FILE, PREFABS_FILE,
};

// Re-export the reasoner
pub use crate::reasoner::{Reasoner, ReasoningResult};
pub use crate::reasoner_builder::ReasonerBuilder;

// Re-export from core
pub use ideom_core::prelude::*;
