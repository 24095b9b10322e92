//! Core data model types for adaptest.
//!
//! Proficiency levels, item difficulties, item parameters and the records a
//! session accumulates while an exam is running.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CatError;

/// Discrimination parameter shared by every item.
pub const DEFAULT_DISCRIMINATION: f64 = 1.0;

/// Guessing parameter shared by every item (four-option multiple choice).
pub const DEFAULT_GUESSING: f64 = 0.25;

/// Lower bound of the ability scale.
pub const THETA_MIN: f64 = -4.0;

/// Upper bound of the ability scale.
pub const THETA_MAX: f64 = 4.0;

/// Clamp an ability value onto the `[THETA_MIN, THETA_MAX]` scale.
#[inline]
pub fn clamp_theta(theta: f64) -> f64 {
    theta.clamp(THETA_MIN, THETA_MAX)
}

/// CEFR proficiency levels, ordered from beginner to mastery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CefrLevel {
    A1,
    A2,
    B1,
    B2,
    C1,
    C2,
}

impl CefrLevel {
    /// All levels in ascending order.
    pub const ALL: [CefrLevel; 6] = [
        CefrLevel::A1,
        CefrLevel::A2,
        CefrLevel::B1,
        CefrLevel::B2,
        CefrLevel::C1,
        CefrLevel::C2,
    ];

    /// Anchor difficulty (`b`) for items labelled with this level.
    pub fn anchor(self) -> f64 {
        match self {
            CefrLevel::A1 => -2.0,
            CefrLevel::A2 => -1.0,
            CefrLevel::B1 => 0.0,
            CefrLevel::B2 => 1.0,
            CefrLevel::C1 => 2.0,
            CefrLevel::C2 => 3.0,
        }
    }

    /// Band score on the 0-9 scale.
    pub fn band(self) -> f64 {
        match self {
            CefrLevel::A1 => 2.5,
            CefrLevel::A2 => 3.5,
            CefrLevel::B1 => 5.0,
            CefrLevel::B2 => 6.5,
            CefrLevel::C1 => 7.5,
            CefrLevel::C2 => 9.0,
        }
    }

    /// General descriptor for the level.
    pub fn description(self) -> &'static str {
        match self {
            CefrLevel::A1 => "Basic User - Beginner",
            CefrLevel::A2 => "Basic User - Elementary",
            CefrLevel::B1 => "Independent User - Intermediate",
            CefrLevel::B2 => "Independent User - Upper Intermediate",
            CefrLevel::C1 => "Proficient User - Advanced",
            CefrLevel::C2 => "Proficient User - Mastery",
        }
    }
}

impl fmt::Display for CefrLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CefrLevel::A1 => "A1",
            CefrLevel::A2 => "A2",
            CefrLevel::B1 => "B1",
            CefrLevel::B2 => "B2",
            CefrLevel::C1 => "C1",
            CefrLevel::C2 => "C2",
        };
        f.write_str(label)
    }
}

impl FromStr for CefrLevel {
    type Err = CatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A1" => Ok(CefrLevel::A1),
            "A2" => Ok(CefrLevel::A2),
            "B1" => Ok(CefrLevel::B1),
            "B2" => Ok(CefrLevel::B2),
            "C1" => Ok(CefrLevel::C1),
            "C2" => Ok(CefrLevel::C2),
            _ => Err(CatError::UnknownLevel(s.to_string())),
        }
    }
}

/// What to do with a difficulty that cannot be mapped to a `b` value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownLevelPolicy {
    /// Fall back to the B1 anchor (`0.0`) and log a warning.
    #[default]
    Lenient,
    /// Reject the difficulty with an error.
    Strict,
}

/// An item difficulty as supplied by the item bank or the delivery layer.
///
/// Deserializes from either a level label (`"B2"`) or a number (`1.0`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Difficulty {
    Numeric(f64),
    Label(String),
}

impl Difficulty {
    /// Map this difficulty onto the `b` parameter.
    ///
    /// Labels resolve to their CEFR anchor; numbers are used as-is. Anything
    /// else is handled according to `policy`.
    pub fn resolve(&self, policy: UnknownLevelPolicy) -> Result<f64, CatError> {
        match self {
            Difficulty::Numeric(b) if b.is_finite() => Ok(*b),
            Difficulty::Numeric(b) => match policy {
                UnknownLevelPolicy::Lenient => {
                    tracing::warn!("non-finite difficulty {b}, using B1 anchor");
                    Ok(CefrLevel::B1.anchor())
                }
                UnknownLevelPolicy::Strict => Err(CatError::NonFiniteDifficulty(*b)),
            },
            Difficulty::Label(label) => match label.parse::<CefrLevel>() {
                Ok(level) => Ok(level.anchor()),
                Err(e) => match policy {
                    UnknownLevelPolicy::Lenient => {
                        tracing::warn!("unknown difficulty level '{label}', using B1 anchor");
                        Ok(CefrLevel::B1.anchor())
                    }
                    UnknownLevelPolicy::Strict => Err(e),
                },
            },
        }
    }

    /// Returns the CEFR level if this is a recognised label.
    pub fn level(&self) -> Option<CefrLevel> {
        match self {
            Difficulty::Label(label) => label.parse().ok(),
            Difficulty::Numeric(_) => None,
        }
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty::Label("B1".to_string())
    }
}

impl From<CefrLevel> for Difficulty {
    fn from(level: CefrLevel) -> Self {
        Difficulty::Label(level.to_string())
    }
}

impl From<f64> for Difficulty {
    fn from(b: f64) -> Self {
        Difficulty::Numeric(b)
    }
}

impl From<&str> for Difficulty {
    fn from(label: &str) -> Self {
        Difficulty::Label(label.to_string())
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Numeric(b) => write!(f, "{b}"),
            Difficulty::Label(label) => f.write_str(label),
        }
    }
}

/// 3PL item parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ItemParameters {
    /// Difficulty.
    pub b: f64,
    /// Discrimination.
    pub a: f64,
    /// Guessing (lower asymptote).
    pub c: f64,
}

impl ItemParameters {
    /// Parameters for an item of difficulty `b` with the shared `a` and `c`.
    pub fn with_difficulty(b: f64) -> Self {
        Self {
            b,
            a: DEFAULT_DISCRIMINATION,
            c: DEFAULT_GUESSING,
        }
    }

    /// Probability of a correct response at `theta`.
    pub fn probability(&self, theta: f64) -> f64 {
        crate::irt::probability_correct(theta, self.b, self.a, self.c)
    }

    /// Fisher information at `theta`.
    pub fn information(&self, theta: f64) -> f64 {
        crate::irt::information(theta, self.b, self.a, self.c)
    }
}

/// An item offered by the item bank.
///
/// Only `difficulty` is interpreted; the rest is carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateItem {
    /// Item identifier.
    pub id: String,
    /// Level label or numeric `b`.
    #[serde(default)]
    pub difficulty: Difficulty,
    /// Content category (grammar, vocabulary, ...).
    #[serde(default)]
    pub category: Option<String>,
    /// Free-form tags.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl CandidateItem {
    pub fn new(id: impl Into<String>, difficulty: impl Into<Difficulty>) -> Self {
        Self {
            id: id.into(),
            difficulty: difficulty.into(),
            category: None,
            tags: Vec::new(),
        }
    }
}

/// One administered item and whether it was answered correctly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResponseRecord {
    /// Resolved `b` of the item.
    pub difficulty: f64,
    pub correct: bool,
}

impl ResponseRecord {
    pub fn new(difficulty: f64, correct: bool) -> Self {
        Self {
            difficulty,
            correct,
        }
    }

    pub fn parameters(&self) -> ItemParameters {
        ItemParameters::with_difficulty(self.difficulty)
    }
}

/// A named collection of candidate items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemBank {
    /// Unique identifier for this bank.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub items: Vec<CandidateItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_display_and_parse() {
        assert_eq!(CefrLevel::B2.to_string(), "B2");
        assert_eq!("C1".parse::<CefrLevel>().unwrap(), CefrLevel::C1);
        // Labels are exact: no case folding, no trimming.
        assert!("c1".parse::<CefrLevel>().is_err());
        assert!(" A2 ".parse::<CefrLevel>().is_err());
        assert!(matches!(
            "D1".parse::<CefrLevel>(),
            Err(CatError::UnknownLevel(_))
        ));
    }

    #[test]
    fn anchors_and_bands() {
        let anchors: Vec<f64> = CefrLevel::ALL.iter().map(|l| l.anchor()).collect();
        assert_eq!(anchors, vec![-2.0, -1.0, 0.0, 1.0, 2.0, 3.0]);
        let bands: Vec<f64> = CefrLevel::ALL.iter().map(|l| l.band()).collect();
        assert_eq!(bands, vec![2.5, 3.5, 5.0, 6.5, 7.5, 9.0]);
    }

    #[test]
    fn resolve_lenient_defaults_unknown_to_b1() {
        let d = Difficulty::from("Z9");
        assert_eq!(d.resolve(UnknownLevelPolicy::Lenient).unwrap(), 0.0);
        let nan = Difficulty::Numeric(f64::NAN);
        assert_eq!(nan.resolve(UnknownLevelPolicy::Lenient).unwrap(), 0.0);
        let lower = Difficulty::from("c2");
        assert_eq!(lower.resolve(UnknownLevelPolicy::Lenient).unwrap(), 0.0);
        assert_eq!(lower.level(), None);
    }

    #[test]
    fn resolve_strict_rejects_unknown() {
        let d = Difficulty::from("Z9");
        assert_eq!(
            d.resolve(UnknownLevelPolicy::Strict),
            Err(CatError::UnknownLevel("Z9".into()))
        );
        let inf = Difficulty::Numeric(f64::INFINITY);
        assert!(inf.resolve(UnknownLevelPolicy::Strict).is_err());
    }

    #[test]
    fn resolve_numeric_and_label() {
        assert_eq!(
            Difficulty::from(1.7).resolve(UnknownLevelPolicy::Strict).unwrap(),
            1.7
        );
        assert_eq!(
            Difficulty::from(CefrLevel::C2)
                .resolve(UnknownLevelPolicy::Strict)
                .unwrap(),
            3.0
        );
    }

    #[test]
    fn difficulty_deserializes_untagged() {
        let items: Vec<CandidateItem> = serde_json::from_str(
            r#"[{"id": "q1", "difficulty": "B2"}, {"id": "q2", "difficulty": -0.5}, {"id": "q3"}]"#,
        )
        .unwrap();
        assert_eq!(items[0].difficulty.level(), Some(CefrLevel::B2));
        assert_eq!(items[1].difficulty, Difficulty::Numeric(-0.5));
        assert_eq!(items[2].difficulty.level(), Some(CefrLevel::B1));
    }

    #[test]
    fn clamp_theta_bounds() {
        assert_eq!(clamp_theta(9.0), THETA_MAX);
        assert_eq!(clamp_theta(-9.0), THETA_MIN);
        assert_eq!(clamp_theta(1.25), 1.25);
    }
}
