//! Precision statistics over simulated exams.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::scoring::cefr_level_for;
use crate::simulation::SimulatedExam;

/// Aggregate statistics across all simulated exams.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationStats {
    /// Statistics over every exam.
    pub overall: AbilityStats,
    /// Statistics per true-ability point, in the order first simulated.
    pub per_theta: Vec<AbilityStats>,
    /// How many exams ended for each reason.
    pub stop_reasons: BTreeMap<String, usize>,
}

/// Recovery statistics for a group of exams.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbilityStats {
    /// True ability of the group, or `None` for the overall group.
    pub true_theta: Option<f64>,
    /// Number of exams.
    pub exams: usize,
    /// Mean final estimate.
    pub mean_estimate: f64,
    /// Mean of estimate minus truth.
    pub bias: f64,
    /// Root mean squared error of the estimate.
    pub rmse: f64,
    /// Mean final standard error.
    pub mean_se: f64,
    /// Mean number of items administered.
    pub mean_length: f64,
    pub min_length: usize,
    pub max_length: usize,
    /// Share of exams whose estimated level matches the true level.
    pub classification_accuracy: f64,
}

/// Mean of `values`; `0.0` when empty.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Mean signed error of `estimates` against `truths`.
pub fn bias(estimates: &[f64], truths: &[f64]) -> f64 {
    let errors: Vec<f64> = estimates.iter().zip(truths).map(|(e, t)| e - t).collect();
    mean(&errors)
}

/// Root mean squared error of `estimates` against `truths`.
pub fn rmse(estimates: &[f64], truths: &[f64]) -> f64 {
    let squared: Vec<f64> = estimates
        .iter()
        .zip(truths)
        .map(|(e, t)| (e - t).powi(2))
        .collect();
    mean(&squared).sqrt()
}

fn group_stats(true_theta: Option<f64>, exams: &[&SimulatedExam]) -> AbilityStats {
    let estimates: Vec<f64> = exams.iter().map(|e| e.final_theta).collect();
    let truths: Vec<f64> = exams.iter().map(|e| e.true_theta).collect();
    let ses: Vec<f64> = exams.iter().map(|e| e.final_se).collect();
    let lengths: Vec<f64> = exams.iter().map(|e| e.length() as f64).collect();

    let matched = exams
        .iter()
        .filter(|e| cefr_level_for(e.final_theta) == cefr_level_for(e.true_theta))
        .count();

    AbilityStats {
        true_theta,
        exams: exams.len(),
        mean_estimate: mean(&estimates),
        bias: bias(&estimates, &truths),
        rmse: rmse(&estimates, &truths),
        mean_se: mean(&ses),
        mean_length: mean(&lengths),
        min_length: exams.iter().map(|e| e.length()).min().unwrap_or(0),
        max_length: exams.iter().map(|e| e.length()).max().unwrap_or(0),
        classification_accuracy: matched as f64 / exams.len().max(1) as f64,
    }
}

/// Compute aggregate statistics from simulated exams.
pub fn compute_simulation_stats(exams: &[SimulatedExam]) -> SimulationStats {
    let all: Vec<&SimulatedExam> = exams.iter().collect();
    let overall = group_stats(None, &all);

    // Group by true ability, preserving first-seen order.
    let mut groups: Vec<(f64, Vec<&SimulatedExam>)> = Vec::new();
    for exam in exams {
        match groups.iter_mut().find(|(theta, _)| *theta == exam.true_theta) {
            Some((_, group)) => group.push(exam),
            None => groups.push((exam.true_theta, vec![exam])),
        }
    }
    let per_theta = groups
        .iter()
        .map(|(theta, group)| group_stats(Some(*theta), group))
        .collect();

    let mut stop_reasons = BTreeMap::new();
    for exam in exams {
        *stop_reasons.entry(exam.end.reason().to_string()).or_insert(0) += 1;
    }

    SimulationStats {
        overall,
        per_theta,
        stop_reasons,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CefrLevel;
    use crate::session::SessionSummary;
    use crate::simulation::ExamEnd;
    use crate::stopping::StopDecision;

    fn exam(true_theta: f64, final_theta: f64, length: usize, end: ExamEnd) -> SimulatedExam {
        SimulatedExam {
            true_theta,
            replication: 1,
            seed: 0,
            administered: (0..length).map(|i| format!("q{i}")).collect(),
            final_theta,
            final_se: 0.4,
            end,
            summary: SessionSummary {
                total_questions: length,
                correct_answers: 0,
                ability: final_theta,
                cefr_level: CefrLevel::B1,
                band_score: 5.0,
                score_percentage: 50.0,
                standard_error: 0.4,
                ability_history: vec![],
                stop_decision: StopDecision::Continue,
            },
        }
    }

    #[test]
    fn bias_and_rmse() {
        assert!((bias(&[1.0, 3.0], &[2.0, 2.0]) - 0.0).abs() < f64::EPSILON);
        assert!((rmse(&[1.0, 3.0], &[2.0, 2.0]) - 1.0).abs() < f64::EPSILON);
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn aggregates_per_theta_and_reasons() {
        let max = ExamEnd::Stopped(StopDecision::MaxQuestionsReached);
        let precise = ExamEnd::Stopped(StopDecision::PrecisionReached);
        let exams = vec![
            exam(0.0, 0.2, 10, precise),
            exam(0.0, -0.2, 14, max),
            exam(2.0, 2.6, 12, precise),
            exam(2.0, 1.8, 8, ExamEnd::BankExhausted),
        ];
        let stats = compute_simulation_stats(&exams);

        assert_eq!(stats.overall.exams, 4);
        assert_eq!(stats.overall.min_length, 8);
        assert_eq!(stats.overall.max_length, 14);
        assert!((stats.overall.mean_length - 11.0).abs() < 1e-12);

        assert_eq!(stats.per_theta.len(), 2);
        assert_eq!(stats.per_theta[0].true_theta, Some(0.0));
        assert!(stats.per_theta[0].bias.abs() < 1e-12);
        assert!((stats.per_theta[1].bias - 0.2).abs() < 1e-12);
        // 2.6 lands in C2 while the true level is C1.
        assert!((stats.per_theta[1].classification_accuracy - 0.5).abs() < 1e-12);

        assert_eq!(stats.stop_reasons.get("precision_reached"), Some(&2));
        assert_eq!(stats.stop_reasons.get("item_bank_exhausted"), Some(&1));
    }

    #[test]
    fn empty_input() {
        let stats = compute_simulation_stats(&[]);
        assert_eq!(stats.overall.exams, 0);
        assert_eq!(stats.overall.classification_accuracy, 0.0);
        assert!(stats.per_theta.is_empty());
    }
}
