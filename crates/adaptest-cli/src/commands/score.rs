//! The `adaptest score` command.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use comfy_table::Table;

use adaptest_core::config::load_config_from;
use adaptest_core::session::{SessionLog, SessionSummary};
use adaptest_report::html::generate_session_html;

pub fn execute(
    log_path: PathBuf,
    format: String,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let log = load_log(&log_path)?;

    let session = log
        .replay(config.session_config()?)
        .with_context(|| format!("failed to replay {}", log_path.display()))?;
    let summary = session.summary();

    tracing::debug!(
        responses = summary.total_questions,
        ability = summary.ability,
        "replayed session"
    );

    let rendered = match format.as_str() {
        "json" => serde_json::to_string_pretty(&summary)?,
        "html" => {
            let title = log_path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "session".to_string());
            generate_session_html(&summary, &title)
        }
        "text" => render_text(&summary),
        other => anyhow::bail!("unknown format: '{other}' (expected text, json or html)"),
    };

    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("Saved to: {}", path.display());
        }
        None => println!("{rendered}"),
    }

    Ok(())
}

fn load_log(path: &Path) -> Result<SessionLog> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read response log {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse response log {}", path.display()))
}

fn render_text(summary: &SessionSummary) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Field", "Value"]);
    table.add_row(vec!["Questions".to_string(), summary.total_questions.to_string()]);
    table.add_row(vec!["Correct".to_string(), summary.correct_answers.to_string()]);
    table.add_row(vec!["Ability".to_string(), format!("{:.3}", summary.ability)]);
    table.add_row(vec!["Standard error".to_string(), format!("{:.3}", summary.standard_error)]);
    table.add_row(vec!["CEFR level".to_string(), summary.cefr_level.to_string()]);
    table.add_row(vec!["Band score".to_string(), format!("{:.1}", summary.band_score)]);
    table.add_row(vec!["Score".to_string(), format!("{:.1}%", summary.score_percentage)]);
    table.add_row(vec!["Status".to_string(), summary.stop_decision.to_string()]);

    format!("{table}\n{}", summary.cefr_level.description())
}
