//! External feedback on a reasoning result.

use crate::snapshot::ActivationSnapshot;
use crate::types::{IdeomId, PrefabId};

/// A judgement on one reasoning cycle.
///
/// `score` is expected in [-1, 1]; out-of-range values are clamped when
/// the feedback is built. Positive scores reinforce what fired, anything
/// else weakens it.
#[derive(Debug, Clone)]
pub struct Feedback {
    pub input_text: String,
    pub snapshot: ActivationSnapshot,
    pub score: f64,
    pub corrected_response: Option<String>,
    /// Ideoms the caller asserts should have been active.
    pub activated_ideoms: Vec<IdeomId>,
    /// Prefabs the caller asserts should have matched.
    pub activated_prefabs: Vec<PrefabId>,
}

impl Feedback {
    pub fn new(input_text: impl Into<String>, snapshot: ActivationSnapshot, score: f64) -> Self {
        let score = if score.is_nan() { 0.0 } else { score.clamp(-1.0, 1.0) };
        Self {
            input_text: input_text.into(),
            snapshot,
            score,
            corrected_response: None,
            activated_ideoms: Vec::new(),
            activated_prefabs: Vec::new(),
        }
    }

    pub fn with_correction(mut self, response: impl Into<String>) -> Self {
        self.corrected_response = Some(response.into());
        self
    }

    pub fn with_activated_ideoms<I>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = IdeomId>,
    {
        self.activated_ideoms.extend(ids);
        self
    }

    pub fn with_activated_prefabs<I>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = PrefabId>,
    {
        self.activated_prefabs.extend(ids);
        self
    }

    pub fn is_positive(&self) -> bool {
        self.score > 0.0
    }
}
