//! adaptest configuration file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::model::{Difficulty, UnknownLevelPolicy};
use crate::session::SessionConfig;

/// Top-level adaptest configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaptestConfig {
    /// Starting level (label or numeric ability) for new sessions.
    #[serde(default)]
    pub initial_level: Difficulty,
    /// Standard-error stop threshold.
    #[serde(default = "default_se_threshold")]
    pub se_threshold: f64,
    /// Minimum number of questions before an early stop.
    #[serde(default = "default_min_questions")]
    pub min_questions: usize,
    /// Maximum number of questions.
    #[serde(default = "default_max_questions")]
    pub max_questions: usize,
    /// Treatment of unrecognised difficulty labels.
    #[serde(default)]
    pub unknown_level: UnknownLevelPolicy,
    /// Seed for item selection and simulated responses.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Simulated exams per ability point.
    #[serde(default = "default_replications")]
    pub replications: usize,
    /// Output directory for reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_se_threshold() -> f64 {
    SessionConfig::default().se_threshold
}
fn default_min_questions() -> usize {
    SessionConfig::default().min_questions
}
fn default_max_questions() -> usize {
    SessionConfig::default().max_questions
}
fn default_replications() -> usize {
    20
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./adaptest-results")
}

impl Default for AdaptestConfig {
    fn default() -> Self {
        Self {
            initial_level: Difficulty::default(),
            se_threshold: default_se_threshold(),
            min_questions: default_min_questions(),
            max_questions: default_max_questions(),
            unknown_level: UnknownLevelPolicy::default(),
            seed: None,
            replications: default_replications(),
            output_dir: default_output_dir(),
        }
    }
}

impl AdaptestConfig {
    /// The validated session limits described by this config.
    pub fn session_config(&self) -> Result<SessionConfig> {
        let config = SessionConfig {
            se_threshold: self.se_threshold,
            min_questions: self.min_questions,
            max_questions: self.max_questions,
            unknown_level: self.unknown_level,
        };
        config.validate()?;
        Ok(config)
    }

    /// Apply `ADAPTEST_*` environment overrides.
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(v) = env_override::<f64>("ADAPTEST_SE_THRESHOLD")? {
            self.se_threshold = v;
        }
        if let Some(v) = env_override::<usize>("ADAPTEST_MIN_QUESTIONS")? {
            self.min_questions = v;
        }
        if let Some(v) = env_override::<usize>("ADAPTEST_MAX_QUESTIONS")? {
            self.max_questions = v;
        }
        if let Some(v) = env_override::<u64>("ADAPTEST_SEED")? {
            self.seed = Some(v);
        }
        Ok(())
    }
}

fn env_override<T>(name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("invalid value for {name}: '{raw}' ({e})")),
        Err(_) => Ok(None),
    }
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order without a path:
/// 1. `adaptest.toml` in the current directory
/// 2. `~/.config/adaptest/config.toml`
///
/// Environment variable overrides: `ADAPTEST_SE_THRESHOLD`,
/// `ADAPTEST_MIN_QUESTIONS`, `ADAPTEST_MAX_QUESTIONS`, `ADAPTEST_SEED`.
pub fn load_config_from(path: Option<&Path>) -> Result<AdaptestConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("adaptest.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            parse_config_str(
                &std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read config: {}", path.display()))?,
            )
            .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => AdaptestConfig::default(),
    };

    config.apply_env_overrides()?;
    Ok(config)
}

/// Parse a config from a TOML string.
pub fn parse_config_str(content: &str) -> Result<AdaptestConfig> {
    Ok(toml::from_str::<AdaptestConfig>(content)?)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("adaptest"))
}
