//! The `adaptest simulate` command.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use adaptest_core::bank::{load_banks, merge_banks, validate_item_bank};
use adaptest_core::config::load_config_from;
use adaptest_core::report::SimulationReport;
use adaptest_core::simulation::{
    default_theta_grid, ProgressReporter, SimulatedExam, SimulationConfig, Simulator,
};
use adaptest_report::html::write_simulation_html;

/// Console progress reporter.
struct ConsoleReporter;

impl ProgressReporter for ConsoleReporter {
    fn on_exam_start(&self, true_theta: f64, replication: usize) {
        tracing::trace!(true_theta, replication, "exam start");
    }

    fn on_exam_complete(&self, exam: &SimulatedExam) {
        eprintln!(
            "  Done: θ={:+.1} #{} -> {:+.3} (SE {:.3}, {} items, {})",
            exam.true_theta,
            exam.replication,
            exam.final_theta,
            exam.final_se,
            exam.length(),
            exam.end.reason(),
        );
    }

    fn on_simulation_complete(&self, total: usize, elapsed: Duration) {
        eprintln!(
            "\nComplete: {total} exams ({:.1}s)",
            elapsed.as_secs_f64()
        );
    }
}

fn parse_thetas(raw: &str) -> Result<Vec<f64>> {
    let thetas = raw
        .split(',')
        .map(|s| {
            s.trim()
                .parse::<f64>()
                .ok()
                .filter(|t| t.is_finite())
                .ok_or_else(|| anyhow::anyhow!("invalid theta value: '{}'", s.trim()))
        })
        .collect::<Result<Vec<_>>>()?;
    anyhow::ensure!(!thetas.is_empty(), "theta must have at least one value");
    Ok(thetas)
}

fn parse_formats(raw: &str) -> Result<Vec<&'static str>> {
    if raw == "all" {
        return Ok(vec!["json", "html", "markdown"]);
    }
    raw.split(',')
        .map(|f| match f.trim() {
            "json" => Ok("json"),
            "html" => Ok("html"),
            "markdown" | "md" => Ok("markdown"),
            other => anyhow::bail!(
                "unknown format: '{other}' (expected json, html, markdown or all)"
            ),
        })
        .collect()
}

pub fn execute(
    bank_path: PathBuf,
    theta: Option<String>,
    replications: Option<usize>,
    seed: Option<u64>,
    output: Option<PathBuf>,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let session = config.session_config()?;

    let banks = load_banks(&bank_path)?;
    let bank = merge_banks(banks)
        .with_context(|| format!("no item banks found in {}", bank_path.display()))?;

    let warnings = validate_item_bank(&bank);
    if !warnings.is_empty() {
        eprintln!(
            "Warning: item bank '{}' has {} validation warning(s); run `adaptest validate` for details.",
            bank.id,
            warnings.len()
        );
    }
    anyhow::ensure!(!bank.items.is_empty(), "item bank '{}' has no items", bank.id);

    let formats = parse_formats(&format)?;
    let thetas = match &theta {
        Some(raw) => parse_thetas(raw)?,
        None => default_theta_grid(),
    };

    let sim_config = SimulationConfig {
        session,
        initial_level: config.initial_level.clone(),
        replications: replications.unwrap_or(config.replications),
        seed: seed.or(config.seed).unwrap_or(0),
    };

    eprintln!(
        "adaptest v{}: simulating {} abilities x {} replications on {} items",
        env!("CARGO_PKG_VERSION"),
        thetas.len(),
        sim_config.replications,
        bank.items.len()
    );
    eprintln!();

    let report = Simulator::new(sim_config).run(&bank, &thetas, &ConsoleReporter)?;

    print_summary(&report);

    let output = output.unwrap_or(config.output_dir);
    std::fs::create_dir_all(&output)
        .with_context(|| format!("failed to create output directory {}", output.display()))?;
    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");

    for fmt in formats {
        match fmt {
            "json" => {
                let path = output.join(format!("simulation-{timestamp}.json"));
                report.save_json(&path)?;
                eprintln!("Results saved to: {}", path.display());
            }
            "html" => {
                let path = output.join(format!("simulation-{timestamp}.html"));
                write_simulation_html(&report, &path)?;
                eprintln!("HTML report: {}", path.display());
            }
            _ => {
                let path = output.join(format!("simulation-{timestamp}.md"));
                std::fs::write(&path, report.to_markdown())
                    .with_context(|| format!("failed to write {}", path.display()))?;
                eprintln!("Markdown summary: {}", path.display());
            }
        }
    }

    Ok(())
}

fn print_summary(report: &SimulationReport) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec![
        "True θ",
        "Exams",
        "Mean θ̂",
        "Bias",
        "RMSE",
        "Mean SE",
        "Length",
        "Level match",
    ]);

    let overall = &report.aggregate.overall;
    for stats in report.aggregate.per_theta.iter().chain(std::iter::once(overall)) {
        let label = stats
            .true_theta
            .map(|t| format!("{t:+.1}"))
            .unwrap_or_else(|| "all".to_string());
        table.add_row(vec![
            Cell::new(label),
            Cell::new(stats.exams),
            Cell::new(format!("{:+.3}", stats.mean_estimate)),
            Cell::new(format!("{:+.3}", stats.bias)),
            Cell::new(format!("{:.3}", stats.rmse)),
            Cell::new(format!("{:.3}", stats.mean_se)),
            Cell::new(format!(
                "{:.1} ({}-{})",
                stats.mean_length, stats.min_length, stats.max_length
            )),
            Cell::new(format!("{:.0}%", stats.classification_accuracy * 100.0)),
        ]);
    }

    eprintln!("\n{table}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_theta_list() {
        assert_eq!(parse_thetas("-1, 0.5,2").unwrap(), vec![-1.0, 0.5, 2.0]);
        assert!(parse_thetas("1,abc").is_err());
        assert!(parse_thetas("NaN").is_err());
    }

    #[test]
    fn parse_format_list() {
        assert_eq!(parse_formats("all").unwrap(), vec!["json", "html", "markdown"]);
        assert_eq!(parse_formats("json, md").unwrap(), vec!["json", "markdown"]);
        let err = parse_formats("json,pdf").unwrap_err();
        assert!(err.to_string().contains("unknown format: 'pdf'"));
    }
}
