//! # Ideom
//!
//! Symbolic spreading-activation reasoning over a graph of concept nodes
//! ("ideoms") and learned weighted templates ("prefabs").
//!
//! ## Quick Start
//!
//! ```rust
//! use ideom::prelude::*;
//!
//! let mut reasoner = Reasoner::new(EngineConfig::default()).unwrap();
//! let dog = reasoner.create_ideom("dog");
//! let bark = reasoner.create_ideom("bark");
//! reasoner.connect(&dog, &bark, 0.8).unwrap();
//! reasoner.create_prefab(
//!     "dog barks",
//!     [(dog, 1.0), (bark, 0.5)],
//!     Some("The {most_active_ideom} barks.".to_string()),
//!     ["animals"],
//! );
//!
//! let result = reasoner.process("dog", &[]);
//! assert_eq!(result.response, "The dog barks.");
//! ```
//!
//! ## Architecture
//!
//! - [`ideom_core`] - Shared types, the graph and collaborator traits,
//!   configuration and errors
//! - [`ideom_runtime`] - Graph arena, propagation, matching, learning,
//!   persistence and the reasoner
//!
//! ## Key Concepts
//!
//! | Concept | What It Does |
//! |---------|--------------|
//! | Propagation | Spreads activation along weighted edges for a bounded number of steps |
//! | Temporal context | Biases seeds by what persisted, rose or fell in recent snapshots |
//! | Prefab matching | Scores weighted templates exactly, partially, in pairs and by similarity |
//! | Hebbian learning | Strengthens co-active edges; negative feedback weakens and prunes them |
//!
//! ## Persistence
//!
//! ```rust,ignore
//! use ideom::prelude::*;
//! use std::path::Path;
//!
//! reasoner.save(Path::new("state"))?;
//! let restored = ReasonerBuilder::new().with_state_dir("state").build()?;
//! ```

// Re-export all subcrates
pub use ideom_core as core;
pub use ideom_runtime as runtime;

/// Prelude module for convenient imports.
///
/// ```rust
/// use ideom::prelude::*;
/// ```
pub mod prelude {
    pub use ideom_runtime::prelude::*;
}
