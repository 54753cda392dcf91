//! # Ideom Core
//!
//! Core traits and types for the ideom spreading-activation engine.
//!
//! - **Ideom** - an atomic concept node with an activation level in [0, 1]
//! - **ActivationSnapshot** - which ideoms fired in one call, merged by maximum
//! - **Prefab** - a weighted ideom template scored against a snapshot
//! - **IdeomGraph** - the graph seam implemented by `ideom-runtime`
//! - **Encoder / Renderer** - text in, text out, injected as strategies
//!
//! ## Quick Start
//!
//! ```rust
//! use ideom_core::prelude::*;
//!
//! let mut snapshot = ActivationSnapshot::new();
//! snapshot.add_activation(IdeomId::from("dog"), 1.0);
//! snapshot.add_activation(IdeomId::from("bark"), 0.8);
//!
//! let prefab = Prefab::new("dog barks")
//!     .with_weight("dog", 1.0)
//!     .with_weight("bark", 0.5);
//! assert!((prefab.score(&snapshot) - 0.933).abs() < 1e-3);
//! ```

pub mod types;
pub mod snapshot;
pub mod prefab;
pub mod feedback;
pub mod topology;
pub mod collaborators;
pub mod config;
pub mod error;
pub mod prelude;
