//! Monte-Carlo simulation of complete adaptive exams.
//!
//! Each simulated test-taker has a known true ability. Items are chosen by a
//! real [`CatSession`], answers are drawn from the 3PL model at the true
//! ability, and the final estimate is compared with the truth.

use std::time::{Duration, Instant};

use anyhow::Result;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CatError;
use crate::model::{clamp_theta, Difficulty, ItemBank, ItemParameters, THETA_MAX, THETA_MIN};
use crate::report::{BankSummary, SimulationReport};
use crate::session::{CatSession, SessionConfig, SessionSummary};
use crate::statistics::compute_simulation_stats;
use crate::stopping::StopDecision;

/// Configuration for a simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Limits applied to every simulated session.
    pub session: SessionConfig,
    /// Starting level of every simulated session.
    pub initial_level: Difficulty,
    /// Exams per true-ability point.
    pub replications: usize,
    /// Base seed; exam `i` uses `seed + i`.
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            initial_level: Difficulty::default(),
            replications: 20,
            seed: 0,
        }
    }
}

/// Default grid of true abilities: -3.0 to 3.0 in steps of 1.0.
pub fn default_theta_grid() -> Vec<f64> {
    (-3..=3).map(f64::from).collect()
}

/// How a simulated exam ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExamEnd {
    /// The stopping rule ended the exam.
    Stopped(StopDecision),
    /// Every item in the bank was administered before the rule stopped.
    BankExhausted,
}

impl ExamEnd {
    pub fn reason(&self) -> &'static str {
        match self {
            ExamEnd::Stopped(decision) => decision.reason(),
            ExamEnd::BankExhausted => "item_bank_exhausted",
        }
    }
}

/// Outcome of one simulated exam.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatedExam {
    /// Ability the answers were generated from.
    pub true_theta: f64,
    /// Replication number within its ability point (1-based).
    pub replication: usize,
    /// Seed of the exam's RNG.
    pub seed: u64,
    /// Administered item IDs, in order.
    pub administered: Vec<String>,
    /// Final unrounded ability estimate.
    pub final_theta: f64,
    /// Final unrounded standard error.
    pub final_se: f64,
    pub end: ExamEnd,
    pub summary: SessionSummary,
}

impl SimulatedExam {
    /// Estimate minus truth.
    pub fn error(&self) -> f64 {
        self.final_theta - self.true_theta
    }

    /// Number of items administered.
    pub fn length(&self) -> usize {
        self.administered.len()
    }
}

/// Progress reporting trait.
pub trait ProgressReporter {
    fn on_exam_start(&self, true_theta: f64, replication: usize);
    fn on_exam_complete(&self, exam: &SimulatedExam);
    fn on_simulation_complete(&self, total: usize, elapsed: Duration);
}

/// No-op progress reporter.
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn on_exam_start(&self, _: f64, _: usize) {}
    fn on_exam_complete(&self, _: &SimulatedExam) {}
    fn on_simulation_complete(&self, _: usize, _: Duration) {}
}

/// Run one adaptive exam for a simulee of ability `true_theta`.
///
/// Items are drawn without replacement from `bank`; the same `rng` drives both
/// tie-breaking and the simulated answers.
pub fn simulate_exam<R: Rng>(
    true_theta: f64,
    bank: &ItemBank,
    initial_level: &Difficulty,
    config: SessionConfig,
    rng: &mut R,
) -> Result<(CatSession, Vec<String>, ExamEnd), CatError> {
    let true_theta = clamp_theta(true_theta);
    let mut session = CatSession::new(initial_level.clone(), config)?;
    let mut available = bank.items.clone();
    let mut administered = Vec::new();

    let end = loop {
        let decision = session.should_stop();
        if decision.is_stop() {
            break ExamEnd::Stopped(decision);
        }

        let index = match session.select_next_item(&available, rng)? {
            Some(item) => available.iter().position(|c| std::ptr::eq(c, item)),
            None => None,
        };
        let Some(index) = index else {
            break ExamEnd::BankExhausted;
        };
        let item = available.remove(index);

        let b = item.difficulty.resolve(config.unknown_level)?;
        let p = ItemParameters::with_difficulty(b).probability(true_theta);
        let correct = rng.random::<f64>() < p;

        session.record_response(Difficulty::Numeric(b), correct)?;
        administered.push(item.id);
    };

    Ok((session, administered, end))
}

/// Runs simulation batches over an item bank.
pub struct Simulator {
    config: SimulationConfig,
}

impl Simulator {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Simulate `replications` exams at every ability in `thetas`.
    pub fn run(
        &self,
        bank: &ItemBank,
        thetas: &[f64],
        progress: &dyn ProgressReporter,
    ) -> Result<SimulationReport> {
        self.config.session.validate()?;
        anyhow::ensure!(
            self.config.replications >= 1,
            "replications must be at least 1"
        );
        if let Some(theta) = thetas
            .iter()
            .find(|t| !(THETA_MIN..=THETA_MAX).contains(*t))
        {
            anyhow::bail!(
                "true theta {theta} is outside the ability scale [{THETA_MIN}, {THETA_MAX}]"
            );
        }

        let start = Instant::now();
        let total = thetas.len() * self.config.replications;
        tracing::info!(
            bank = %bank.id,
            items = bank.items.len(),
            exams = total,
            "starting simulation"
        );

        let mut exams = Vec::with_capacity(total);
        let mut index: u64 = 0;

        for &true_theta in thetas {
            for replication in 1..=self.config.replications {
                progress.on_exam_start(true_theta, replication);

                let seed = self.config.seed.wrapping_add(index);
                index += 1;
                let mut rng = Pcg64::seed_from_u64(seed);

                let (session, administered, end) = simulate_exam(
                    true_theta,
                    bank,
                    &self.config.initial_level,
                    self.config.session,
                    &mut rng,
                )?;

                let exam = SimulatedExam {
                    true_theta,
                    replication,
                    seed,
                    administered,
                    final_theta: session.ability(),
                    final_se: session.standard_error(),
                    end,
                    summary: session.summary(),
                };
                tracing::debug!(
                    true_theta,
                    replication,
                    estimate = exam.final_theta,
                    length = exam.length(),
                    reason = exam.end.reason(),
                    "exam complete"
                );
                progress.on_exam_complete(&exam);
                exams.push(exam);
            }
        }

        let elapsed = start.elapsed();
        progress.on_simulation_complete(exams.len(), elapsed);

        let aggregate = compute_simulation_stats(&exams);

        Ok(SimulationReport {
            id: Uuid::new_v4(),
            created_at: chrono::Utc::now(),
            bank: BankSummary {
                id: bank.id.clone(),
                name: bank.name.clone(),
                item_count: bank.items.len(),
            },
            config: self.config.clone(),
            thetas: thetas.to_vec(),
            exams,
            aggregate,
            duration_ms: elapsed.as_millis() as u64,
        })
    }
}
