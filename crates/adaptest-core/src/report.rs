//! Simulation report types with JSON persistence.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::simulation::{SimulatedExam, SimulationConfig};
use crate::statistics::SimulationStats;

/// A complete simulation report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Summary of the item bank.
    pub bank: BankSummary,
    /// Configuration the exams ran with.
    pub config: SimulationConfig,
    /// True abilities that were simulated.
    pub thetas: Vec<f64>,
    /// Individual exam outcomes.
    pub exams: Vec<SimulatedExam>,
    /// Aggregate statistics.
    pub aggregate: SimulationStats,
    /// Total wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

/// Summary of an item bank (without the items themselves).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankSummary {
    pub id: String,
    pub name: String,
    pub item_count: usize,
}

impl SimulationReport {
    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: SimulationReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Format the per-ability statistics as a markdown table.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();
        let overall = &self.aggregate.overall;

        md.push_str(&format!(
            "**{}** ({} items): {} exams, RMSE {:.3}, mean length {:.1}\n\n",
            self.bank.name, self.bank.item_count, overall.exams, overall.rmse, overall.mean_length
        ));

        md.push_str("| True θ | Exams | Mean θ̂ | Bias | RMSE | Mean SE | Mean length | Level match |\n");
        md.push_str("|--------|-------|--------|------|------|---------|-------------|-------------|\n");
        for stats in &self.aggregate.per_theta {
            md.push_str(&format!(
                "| {:.1} | {} | {:.3} | {:+.3} | {:.3} | {:.3} | {:.1} | {:.0}% |\n",
                stats.true_theta.unwrap_or(f64::NAN),
                stats.exams,
                stats.mean_estimate,
                stats.bias,
                stats.rmse,
                stats.mean_se,
                stats.mean_length,
                stats.classification_accuracy * 100.0
            ));
        }

        if !self.aggregate.stop_reasons.is_empty() {
            md.push_str("\n### Stop reasons\n\n");
            for (reason, count) in &self.aggregate.stop_reasons {
                md.push_str(&format!("- {reason}: {count}\n"));
            }
        }

        md
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CandidateItem, CefrLevel, ItemBank};
    use crate::simulation::{NoopReporter, Simulator};

    fn make_report() -> SimulationReport {
        let items = CefrLevel::ALL
            .iter()
            .flat_map(|level| (0..4).map(move |i| CandidateItem::new(format!("{level}-{i}"), *level)))
            .collect();
        let bank = ItemBank {
            id: "test".into(),
            name: "Test".into(),
            description: String::new(),
            items,
        };
        let config = SimulationConfig {
            replications: 2,
            seed: 11,
            ..SimulationConfig::default()
        };
        Simulator::new(config)
            .run(&bank, &[-1.0, 1.0], &NoopReporter)
            .unwrap()
    }

    #[test]
    fn json_roundtrip() {
        let report = make_report();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("report.json");

        report.save_json(&path).unwrap();
        let loaded = SimulationReport::load_json(&path).unwrap();

        assert_eq!(loaded.id, report.id);
        assert_eq!(loaded.bank.id, "test");
        assert_eq!(loaded.bank.item_count, 24);
        assert_eq!(loaded.exams.len(), 4);
        assert_eq!(loaded.config, report.config);
        assert_eq!(loaded.aggregate.per_theta.len(), 2);
    }

    #[test]
    fn load_missing_file_has_context() {
        let err = SimulationReport::load_json(Path::new("/no/such/report.json")).unwrap_err();
        assert!(format!("{err:#}").contains("failed to read report"));
    }

    #[test]
    fn markdown_output() {
        let md = make_report().to_markdown();
        assert!(md.contains("**Test** (24 items): 4 exams"));
        assert!(md.contains("| -1.0 | 2 |"));
        assert!(md.contains("| 1.0 | 2 |"));
        assert!(md.contains("Stop reasons"));
    }
}
