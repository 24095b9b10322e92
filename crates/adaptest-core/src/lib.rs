//! adaptest-core: Item response model, ability estimation and adaptive sessions.
//!
//! This crate defines the 3PL response model, the estimator, item selection,
//! the stopping rule and score conversions that the rest of adaptest builds
//! on, plus item-bank loading, configuration and simulation.

pub mod bank;
pub mod config;
pub mod error;
pub mod estimator;
pub mod irt;
pub mod model;
pub mod report;
pub mod scoring;
pub mod selector;
pub mod session;
pub mod simulation;
pub mod statistics;
pub mod stopping;

pub use error::CatError;
pub use model::{CandidateItem, CefrLevel, Difficulty, ItemBank, UnknownLevelPolicy};
pub use session::{CatSession, SessionConfig, SessionSummary};
pub use stopping::StopDecision;
