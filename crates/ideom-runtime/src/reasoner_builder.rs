//! Reasoner builder with optional saved state.
//!
//! # Example
//!
//! ```rust
//! use ideom_runtime::reasoner_builder::ReasonerBuilder;
//! use ideom_core::config::EngineConfig;
//!
//! let mut reasoner = ReasonerBuilder::new()
//!     .with_config(EngineConfig::default())
//!     .build()
//!     .unwrap();
//! let result = reasoner.process("the dog barks", &[]);
//! assert!(!result.response.is_empty());
//! ```

use crate::persistence::IDEOMS_FILE;
use crate::reasoner::Reasoner;
use ideom_core::collaborators::{Encoder, Renderer};
use ideom_core::config::EngineConfig;
use ideom_core::error::Result;
use std::path::{Path, PathBuf};

/// Builder for a [`Reasoner`].
///
/// Encoder and renderer default to `LexiconEncoder` and
/// `TemplateRenderer` configured from the engine config.
pub struct ReasonerBuilder {
    config: EngineConfig,
    encoder: Option<Box<dyn Encoder>>,
    renderer: Option<Box<dyn Renderer>>,
    state_dir: Option<PathBuf>,
}

impl Default for ReasonerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReasonerBuilder {
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            encoder: None,
            renderer: None,
            state_dir: None,
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_encoder(mut self, encoder: impl Encoder + 'static) -> Self {
        self.encoder = Some(Box::new(encoder));
        self
    }

    pub fn with_renderer(mut self, renderer: impl Renderer + 'static) -> Self {
        self.renderer = Some(Box::new(renderer));
        self
    }

    /// Load saved state from `dir` on build.
    ///
    /// A directory without an `ideoms.json` starts empty. A directory with
    /// malformed documents fails the build.
    pub fn with_state_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.state_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Validate the configuration and assemble the reasoner.
    pub fn build(self) -> Result<Reasoner> {
        let mut reasoner = Reasoner::from_parts(self.config, self.encoder, self.renderer)?;
        if let Some(dir) = self.state_dir {
            if dir.join(IDEOMS_FILE).exists() {
                reasoner.load(&dir)?;
            }
        }
        Ok(reasoner)
    }
}
