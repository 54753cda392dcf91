//! Ideom Core Prelude: convenient imports for common usage.
//!
//! ```rust
//! use ideom_core::prelude::*;
//! ```

// Re-export identifiers and node data
pub use crate::types::{clamp_unit, Ideom, IdeomId, PrefabId, PrunedConnection};

// Re-export snapshots, prefabs and feedback
pub use crate::snapshot::ActivationSnapshot;
pub use crate::prefab::{weighted_score, Prefab};
pub use crate::feedback::Feedback;

// Re-export the graph and collaborator seams
pub use crate::topology::IdeomGraph;
pub use crate::collaborators::{Encoder, Renderer};

// Re-export configuration
pub use crate::config::{
    EngineConfig, GraphConfig, LearningConfig, MatchingConfig, PropagationConfig,
    ReasoningConfig,
};

// Re-export error types
pub use crate::error::{IdeomError, Result};
