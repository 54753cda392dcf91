//! Engine configuration.
//!
//! Every tunable threshold of the engine lives here and is handed to the
//! reasoner at construction. Sections mirror the components they drive.
//! Any field left out of a TOML document takes its default.

use crate::error::{IdeomError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub graph: GraphConfig,
    #[serde(default)]
    pub propagation: PropagationConfig,
    #[serde(default)]
    pub matching: MatchingConfig,
    #[serde(default)]
    pub learning: LearningConfig,
    #[serde(default)]
    pub reasoning: ReasoningConfig,
}

/// Defaults applied to ideoms created by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphConfig {
    #[serde(default = "default_activation_threshold")]
    pub default_activation_threshold: f64,
    #[serde(default = "default_decay_rate")]
    pub default_decay_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropagationConfig {
    /// Minimum signal that crosses an edge.
    #[serde(default = "default_propagation_threshold")]
    pub propagation_threshold: f64,
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
    /// Custom blending weights, newest first. Must match `history_capacity`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temporal_weights: Option<Vec<f64>>,
    #[serde(default = "default_temporal_influence")]
    pub temporal_influence: f64,
    #[serde(default = "default_trend_influence")]
    pub trend_influence: f64,
    #[serde(default = "default_prediction_weight")]
    pub prediction_weight: f64,
    #[serde(default = "default_persistent_threshold")]
    pub persistent_threshold: f64,
    #[serde(default = "default_trend_threshold")]
    pub trend_threshold: f64,
    /// Multiplier for a persistent ideom that is already a seed.
    #[serde(default = "default_persistent_boost")]
    pub persistent_boost: f64,
    /// Fraction of the base strength given to a persistent ideom that is
    /// not a seed.
    #[serde(default = "default_persistent_seed_factor")]
    pub persistent_seed_factor: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchingConfig {
    #[serde(default = "default_prefab_threshold")]
    pub prefab_threshold: f64,
    #[serde(default = "default_partial_match_threshold")]
    pub partial_match_threshold: f64,
    #[serde(default = "default_combination_threshold")]
    pub combination_threshold: f64,
    #[serde(default = "default_semantic_threshold")]
    pub semantic_threshold: f64,
    /// Level at which a snapshot ideom counts as active for partial and
    /// semantic matching.
    #[serde(default = "default_active_threshold")]
    pub active_threshold: f64,
    #[serde(default = "default_true")]
    pub include_partial: bool,
    #[serde(default = "default_true")]
    pub include_combinations: bool,
    #[serde(default = "default_true")]
    pub include_semantic: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningConfig {
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    /// Edges at or below this weight are pruned.
    #[serde(default = "default_connection_strength_threshold")]
    pub connection_strength_threshold: f64,
    #[serde(default = "default_merge_similarity_threshold")]
    pub merge_similarity_threshold: f64,
    /// Snapshot level above which an ideom is admitted into a matched
    /// prefab's template.
    #[serde(default = "default_template_admission_threshold")]
    pub template_admission_threshold: f64,
    /// Minimum activation for an ideom to enter a prefab learned from a
    /// corrected response.
    #[serde(default = "default_feedback_prefab_threshold")]
    pub feedback_prefab_threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasoningConfig {
    #[serde(default = "default_initial_strength")]
    pub initial_strength: f64,
    #[serde(default = "default_context_strength")]
    pub context_strength: f64,
    #[serde(default = "default_true")]
    pub use_temporal_context: bool,
    #[serde(default = "default_true")]
    pub use_pattern_prediction: bool,
    #[serde(default = "default_true")]
    pub learn_from_input: bool,
    #[serde(default = "default_true")]
    pub create_unknown_ideoms: bool,
}

fn default_true() -> bool { true }
fn default_activation_threshold() -> f64 { 0.5 }
fn default_decay_rate() -> f64 { 0.1 }
fn default_propagation_threshold() -> f64 { 0.1 }
fn default_max_steps() -> usize { 10 }
fn default_history_capacity() -> usize { 10 }
fn default_temporal_influence() -> f64 { 0.3 }
fn default_trend_influence() -> f64 { 0.2 }
fn default_prediction_weight() -> f64 { 0.3 }
fn default_persistent_threshold() -> f64 { 0.5 }
fn default_trend_threshold() -> f64 { 0.1 }
fn default_persistent_boost() -> f64 { 1.2 }
fn default_persistent_seed_factor() -> f64 { 0.8 }
fn default_prefab_threshold() -> f64 { 0.5 }
fn default_partial_match_threshold() -> f64 { 0.6 }
fn default_combination_threshold() -> f64 { 0.7 }
fn default_semantic_threshold() -> f64 { 0.6 }
fn default_active_threshold() -> f64 { 0.5 }
fn default_learning_rate() -> f64 { 0.1 }
fn default_connection_strength_threshold() -> f64 { 0.1 }
fn default_merge_similarity_threshold() -> f64 { 0.8 }
fn default_template_admission_threshold() -> f64 { 0.5 }
fn default_feedback_prefab_threshold() -> f64 { 0.3 }
fn default_initial_strength() -> f64 { 1.0 }
fn default_context_strength() -> f64 { 0.5 }

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            default_activation_threshold: default_activation_threshold(),
            default_decay_rate: default_decay_rate(),
        }
    }
}

impl Default for PropagationConfig {
    fn default() -> Self {
        Self {
            propagation_threshold: default_propagation_threshold(),
            max_steps: default_max_steps(),
            history_capacity: default_history_capacity(),
            temporal_weights: None,
            temporal_influence: default_temporal_influence(),
            trend_influence: default_trend_influence(),
            prediction_weight: default_prediction_weight(),
            persistent_threshold: default_persistent_threshold(),
            trend_threshold: default_trend_threshold(),
            persistent_boost: default_persistent_boost(),
            persistent_seed_factor: default_persistent_seed_factor(),
        }
    }
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            prefab_threshold: default_prefab_threshold(),
            partial_match_threshold: default_partial_match_threshold(),
            combination_threshold: default_combination_threshold(),
            semantic_threshold: default_semantic_threshold(),
            active_threshold: default_active_threshold(),
            include_partial: true,
            include_combinations: true,
            include_semantic: true,
        }
    }
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            learning_rate: default_learning_rate(),
            connection_strength_threshold: default_connection_strength_threshold(),
            merge_similarity_threshold: default_merge_similarity_threshold(),
            template_admission_threshold: default_template_admission_threshold(),
            feedback_prefab_threshold: default_feedback_prefab_threshold(),
        }
    }
}

impl Default for ReasoningConfig {
    fn default() -> Self {
        Self {
            initial_strength: default_initial_strength(),
            context_strength: default_context_strength(),
            use_temporal_context: true,
            use_pattern_prediction: true,
            learn_from_input: true,
            create_unknown_ideoms: true,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: EngineConfig =
            toml::from_str(content).map_err(|e| IdeomError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML file. A missing file is an I/O error, not a default.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| IdeomError::InvalidConfig(e.to_string()))
    }

    /// Reject values the engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        let p = &self.propagation;
        if p.history_capacity == 0 {
            return Err(IdeomError::InvalidConfig(
                "propagation.history_capacity must be at least 1".into(),
            ));
        }
        if let Some(weights) = &p.temporal_weights {
            if weights.len() != p.history_capacity {
                return Err(IdeomError::InvalidConfig(format!(
                    "propagation.temporal_weights has {} entries but history_capacity is {}",
                    weights.len(),
                    p.history_capacity
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.learning.learning_rate) {
            return Err(IdeomError::InvalidConfig(
                "learning.learning_rate must be within [0, 1]".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = EngineConfig::default();
        assert_eq!(config.propagation.propagation_threshold, 0.1);
        assert_eq!(config.propagation.max_steps, 10);
        assert_eq!(config.matching.partial_match_threshold, 0.6);
        assert_eq!(config.learning.merge_similarity_threshold, 0.8);
        assert!(config.reasoning.use_temporal_context);
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
            [propagation]
            max_steps = 3

            [learning]
            learning_rate = 0.25
            "#,
        )
        .unwrap();
        assert_eq!(config.propagation.max_steps, 3);
        assert_eq!(config.propagation.propagation_threshold, 0.1);
        assert_eq!(config.learning.learning_rate, 0.25);
        assert_eq!(config.matching, MatchingConfig::default());
    }

    #[test]
    fn toml_round_trip() {
        let mut config = EngineConfig::default();
        config.matching.include_semantic = false;
        let text = config.to_toml_string().unwrap();
        assert_eq!(EngineConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn mismatched_temporal_weights_are_rejected() {
        let err = EngineConfig::from_toml_str(
            r#"
            [propagation]
            history_capacity = 3
            temporal_weights = [1.0, 0.5]
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, IdeomError::InvalidConfig(_)));
    }

    #[test]
    fn malformed_toml_is_invalid_config() {
        let err = EngineConfig::from_toml_str("[propagation\nmax_steps = ").unwrap_err();
        assert!(matches!(err, IdeomError::InvalidConfig(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = EngineConfig::load(Path::new("/nonexistent/ideom.toml")).unwrap_err();
        assert!(matches!(err, IdeomError::Io(_)));
    }
}
