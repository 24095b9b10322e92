//! Maximum-likelihood ability estimation and its standard error.
//!
//! Newton-Raphson on the 3PL score function. The iteration cap and the
//! `[-4, 4]` clamp keep all-correct and all-incorrect patterns, whose MLE is
//! unbounded, from diverging.

use serde::{Deserialize, Serialize};

use crate::irt::{information, probability_correct, test_information};
use crate::model::{clamp_theta, ResponseRecord, DEFAULT_DISCRIMINATION, DEFAULT_GUESSING};

/// Maximum Newton-Raphson iterations per estimate.
pub const MAX_ITERATIONS: usize = 20;

/// Below this total information the likelihood is treated as flat.
pub const MIN_INFORMATION: f64 = 1e-4;

/// Step size under which the iteration is considered converged.
pub const CONVERGENCE_TOLERANCE: f64 = 1e-3;

/// Standard error reported when there is no information at all.
pub const MAX_STANDARD_ERROR: f64 = 1.0;

/// Result of a Newton-Raphson run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    /// Final ability estimate, within `[-4, 4]`.
    pub theta: f64,
    /// Iterations performed (0 when there were no responses).
    pub iterations: usize,
    /// Whether the last step fell under the convergence tolerance.
    pub converged: bool,
}

/// Run Newton-Raphson from `start` over `responses`.
pub fn newton_raphson(start: f64, responses: &[ResponseRecord]) -> Estimate {
    if responses.is_empty() {
        return Estimate {
            theta: start,
            iterations: 0,
            converged: false,
        };
    }

    let a = DEFAULT_DISCRIMINATION;
    let c = DEFAULT_GUESSING;
    let mut theta = start;
    let mut iterations = 0;
    let mut converged = false;

    for _ in 0..MAX_ITERATIONS {
        iterations += 1;
        let mut numerator = 0.0;
        let mut denominator = 0.0;

        for r in responses {
            let p = probability_correct(theta, r.difficulty, a, c);
            let q = 1.0 - p;
            let w = a * (p - c) / (1.0 - c);
            if r.correct {
                if p > 0.0 {
                    numerator += w * (1.0 - p) / p;
                }
            } else if q > 0.0 {
                numerator -= w * p / q;
            }
            denominator += information(theta, r.difficulty, a, c);
        }

        if denominator.abs() < MIN_INFORMATION {
            tracing::trace!(theta, denominator, "flat likelihood, stopping");
            break;
        }

        let delta = numerator / denominator;
        theta = clamp_theta(theta + delta);
        tracing::trace!(iteration = iterations, theta, delta, "newton-raphson step");

        if delta.abs() < CONVERGENCE_TOLERANCE {
            converged = true;
            break;
        }
    }

    tracing::debug!(
        theta,
        iterations,
        converged,
        responses = responses.len(),
        "ability estimated"
    );

    Estimate {
        theta,
        iterations,
        converged,
    }
}

/// Maximum-likelihood ability estimate starting from `current_theta`.
///
/// Returns `current_theta` unchanged when there are no responses.
pub fn estimate_ability(current_theta: f64, responses: &[ResponseRecord]) -> f64 {
    newton_raphson(current_theta, responses).theta
}

/// Standard error of the ability estimate: `1 / sqrt(total information)`.
///
/// Returns [`MAX_STANDARD_ERROR`] with no responses or zero information.
pub fn standard_error(theta: f64, responses: &[ResponseRecord]) -> f64 {
    if responses.is_empty() {
        return MAX_STANDARD_ERROR;
    }
    let total = test_information(theta, responses.iter().map(|r| r.difficulty));
    if total > 0.0 {
        1.0 / total.sqrt()
    } else {
        MAX_STANDARD_ERROR
    }
}
