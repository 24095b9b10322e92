//! The stopping rule.
//!
//! Evaluated after every recorded response, in strict order: minimum length,
//! maximum length, precision.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of evaluating the stopping rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopDecision {
    /// Fewer than `min_questions` responses; precision is not consulted.
    MinimumNotReached,
    /// Minimum reached but the estimate is not precise enough yet.
    Continue,
    /// Hard ceiling reached; overrides precision.
    MaxQuestionsReached,
    /// Standard error is at or below the threshold.
    PrecisionReached,
}

impl StopDecision {
    /// Evaluate the rule for `answered` responses and the current `se`.
    pub fn evaluate(
        answered: usize,
        se: f64,
        se_threshold: f64,
        min_questions: usize,
        max_questions: usize,
    ) -> Self {
        if answered < min_questions {
            StopDecision::MinimumNotReached
        } else if answered >= max_questions {
            StopDecision::MaxQuestionsReached
        } else if se <= se_threshold {
            StopDecision::PrecisionReached
        } else {
            StopDecision::Continue
        }
    }

    /// Whether the exam should end.
    pub fn is_stop(self) -> bool {
        matches!(
            self,
            StopDecision::MaxQuestionsReached | StopDecision::PrecisionReached
        )
    }

    /// Machine-readable reason string.
    pub fn reason(self) -> &'static str {
        match self {
            StopDecision::MinimumNotReached => "minimum_not_reached",
            StopDecision::Continue => "continue",
            StopDecision::MaxQuestionsReached => "max_questions_reached",
            StopDecision::PrecisionReached => "precision_reached",
        }
    }
}

impl fmt::Display for StopDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason())
    }
}
