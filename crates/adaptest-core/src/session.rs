//! Per-attempt CAT session.
//!
//! A [`CatSession`] owns all mutable state of one exam attempt. It is a plain
//! value: callers hold it by `&mut`, persist it however they like (it is
//! serde-serializable) and hand it the RNG used for item selection.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::CatError;
use crate::estimator::{self, MAX_STANDARD_ERROR};
use crate::model::{
    clamp_theta, CandidateItem, CefrLevel, Difficulty, ResponseRecord, UnknownLevelPolicy,
};
use crate::scoring::{cefr_level_for, round_to, score_percentage};
use crate::selector;
use crate::stopping::StopDecision;

/// Stopping limits and input policy for a session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Stop once the standard error is at or below this value.
    #[serde(default = "default_se_threshold")]
    pub se_threshold: f64,
    /// No early stop before this many responses.
    #[serde(default = "default_min_questions")]
    pub min_questions: usize,
    /// Hard ceiling on the number of responses.
    #[serde(default = "default_max_questions")]
    pub max_questions: usize,
    /// How unrecognised difficulty labels are treated.
    #[serde(default)]
    pub unknown_level: UnknownLevelPolicy,
}

fn default_se_threshold() -> f64 {
    0.3
}

fn default_min_questions() -> usize {
    10
}

fn default_max_questions() -> usize {
    30
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            se_threshold: default_se_threshold(),
            min_questions: default_min_questions(),
            max_questions: default_max_questions(),
            unknown_level: UnknownLevelPolicy::default(),
        }
    }
}

impl SessionConfig {
    /// Check the configuration constraints.
    pub fn validate(&self) -> Result<(), CatError> {
        if !(self.se_threshold.is_finite() && self.se_threshold > 0.0) {
            return Err(CatError::InvalidConfig(format!(
                "se_threshold must be a positive number, got {}",
                self.se_threshold
            )));
        }
        if self.min_questions < 1 {
            return Err(CatError::InvalidConfig(
                "min_questions must be at least 1".into(),
            ));
        }
        if self.max_questions < self.min_questions {
            return Err(CatError::InvalidConfig(format!(
                "max_questions ({}) must be >= min_questions ({})",
                self.max_questions, self.min_questions
            )));
        }
        Ok(())
    }
}

/// State of one adaptive exam attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatSession {
    config: SessionConfig,
    initial_ability: f64,
    ability: f64,
    responses: Vec<ResponseRecord>,
    ability_history: Vec<f64>,
    se_history: Vec<f64>,
}

impl CatSession {
    /// Start a session at a level label or numeric ability.
    pub fn new(initial: impl Into<Difficulty>, config: SessionConfig) -> Result<Self, CatError> {
        config.validate()?;
        let theta = initial.into().resolve(config.unknown_level)?;
        Ok(Self::seeded(clamp_theta(theta), config))
    }

    fn seeded(theta: f64, config: SessionConfig) -> Self {
        Self {
            config,
            initial_ability: theta,
            ability: theta,
            responses: Vec::new(),
            ability_history: vec![theta],
            se_history: vec![MAX_STANDARD_ERROR],
        }
    }

    /// Rebuild a session by replaying a persisted response log in order.
    pub fn replay<'a, I>(
        initial: impl Into<Difficulty>,
        config: SessionConfig,
        responses: I,
    ) -> Result<Self, CatError>
    where
        I: IntoIterator<Item = &'a LoggedResponse>,
    {
        let mut session = Self::new(initial, config)?;
        for r in responses {
            session.record_response(r.difficulty.clone(), r.correct)?;
        }
        Ok(session)
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Ability the session started from.
    pub fn initial_ability(&self) -> f64 {
        self.initial_ability
    }

    /// Current ability estimate.
    pub fn ability(&self) -> f64 {
        self.ability
    }

    pub fn responses(&self) -> &[ResponseRecord] {
        &self.responses
    }

    pub fn ability_history(&self) -> &[f64] {
        &self.ability_history
    }

    pub fn se_history(&self) -> &[f64] {
        &self.se_history
    }

    /// Number of recorded responses.
    pub fn answered(&self) -> usize {
        self.responses.len()
    }

    pub fn correct_answers(&self) -> usize {
        self.responses.iter().filter(|r| r.correct).count()
    }

    /// Pick the next item from `available` at the current ability.
    ///
    /// `available` must only contain items not yet administered; the session
    /// does not track item identities.
    pub fn select_next_item<'a, R: Rng>(
        &self,
        available: &'a [CandidateItem],
        rng: &mut R,
    ) -> Result<Option<&'a CandidateItem>, CatError> {
        selector::select_next_item(self.ability, available, self.config.unknown_level, rng)
    }

    /// Record a response, re-estimate ability and return the new standard error.
    pub fn record_response(
        &mut self,
        difficulty: impl Into<Difficulty>,
        correct: bool,
    ) -> Result<f64, CatError> {
        let b = difficulty.into().resolve(self.config.unknown_level)?;
        self.responses.push(ResponseRecord::new(b, correct));
        self.update_ability();
        Ok(self.calculate_se())
    }

    fn update_ability(&mut self) {
        self.ability = estimator::estimate_ability(self.ability, &self.responses);
        self.ability_history.push(self.ability);
    }

    /// Standard error at the current ability, appended to the SE history.
    pub fn calculate_se(&mut self) -> f64 {
        let se = self.standard_error();
        self.se_history.push(se);
        se
    }

    /// Standard error at the current ability, without recording it.
    pub fn standard_error(&self) -> f64 {
        estimator::standard_error(self.ability, &self.responses)
    }

    /// Evaluate the stopping rule.
    pub fn should_stop(&self) -> StopDecision {
        StopDecision::evaluate(
            self.responses.len(),
            self.standard_error(),
            self.config.se_threshold,
            self.config.min_questions,
            self.config.max_questions,
        )
    }

    pub fn cefr_level(&self) -> CefrLevel {
        cefr_level_for(self.ability)
    }

    pub fn score_percentage(&self) -> f64 {
        score_percentage(self.ability)
    }

    /// Reporting snapshot of the session.
    pub fn summary(&self) -> SessionSummary {
        let cefr_level = self.cefr_level();
        let stop_decision = self.should_stop();

        if self.responses.is_empty() {
            return SessionSummary {
                total_questions: 0,
                correct_answers: 0,
                ability: self.ability,
                cefr_level,
                band_score: cefr_level.band(),
                score_percentage: 50.0,
                standard_error: MAX_STANDARD_ERROR,
                ability_history: self.ability_history.clone(),
                stop_decision,
            };
        }

        SessionSummary {
            total_questions: self.responses.len(),
            correct_answers: self.correct_answers(),
            ability: round_to(self.ability, 3),
            cefr_level,
            band_score: cefr_level.band(),
            score_percentage: round_to(self.score_percentage(), 1),
            standard_error: round_to(self.standard_error(), 3),
            ability_history: self
                .ability_history
                .iter()
                .map(|a| round_to(*a, 3))
                .collect(),
            stop_decision,
        }
    }
}

/// Serializable snapshot of a session for reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub total_questions: usize,
    pub correct_answers: usize,
    pub ability: f64,
    pub cefr_level: CefrLevel,
    pub band_score: f64,
    pub score_percentage: f64,
    pub standard_error: f64,
    pub ability_history: Vec<f64>,
    pub stop_decision: StopDecision,
}

/// One entry of a persisted response log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggedResponse {
    #[serde(default)]
    pub difficulty: Difficulty,
    pub correct: bool,
}

/// A persisted exam attempt: where it started and what was answered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionLog {
    #[serde(default)]
    pub initial_level: Difficulty,
    /// Session limits recorded with the log, if any.
    #[serde(default)]
    pub config: Option<SessionConfig>,
    #[serde(default)]
    pub responses: Vec<LoggedResponse>,
}

impl SessionLog {
    /// Replay the log. The log's own config wins over `fallback`.
    pub fn replay(&self, fallback: SessionConfig) -> Result<CatSession, CatError> {
        let config = self.config.unwrap_or(fallback);
        CatSession::replay(self.initial_level.clone(), config, &self.responses)
    }

    /// Append a response to the log.
    pub fn push(&mut self, difficulty: impl Into<Difficulty>, correct: bool) {
        self.responses.push(LoggedResponse {
            difficulty: difficulty.into(),
            correct,
        });
    }
}
