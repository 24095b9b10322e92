//! HTML report generator.
//!
//! Produces a self-contained HTML file with all CSS/JS inlined.

use anyhow::{Context, Result};
use std::path::Path;

use adaptest_core::model::CefrLevel;
use adaptest_core::report::SimulationReport;
use adaptest_core::session::SessionSummary;
use adaptest_core::statistics::AbilityStats;

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn push_head(html: &mut String, title: &str) {
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!("<title>adaptest: {}</title>\n", html_escape(title)));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");
}

fn push_raw_json<T: serde::Serialize>(html: &mut String, value: &T) {
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(&html_escape(
        &serde_json::to_string_pretty(value).unwrap_or_default(),
    ));
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");
}

/// Generate an HTML report for a single session.
pub fn generate_session_html(summary: &SessionSummary, title: &str) -> String {
    let mut html = String::new();
    push_head(&mut html, title);

    html.push_str("<header>\n");
    html.push_str("<h1>adaptest session report</h1>\n");
    html.push_str(&format!(
        "<p class=\"meta\">{} | {} questions | {} correct | {}</p>\n",
        html_escape(title),
        summary.total_questions,
        summary.correct_answers,
        summary.stop_decision
    ));
    html.push_str("</header>\n");

    html.push_str("<section class=\"dashboard\">\n");
    html.push_str("<h2>Result</h2>\n");
    html.push_str("<table class=\"summary\">\n");
    html.push_str("<thead><tr><th>Level</th><th>Band</th><th>Score</th><th>Ability</th><th>SE</th></tr></thead>\n");
    html.push_str(&format!(
        "<tbody><tr><td class=\"level\">{}</td><td>{:.1}</td><td>{:.1}%</td><td>{:.3}</td><td>{:.3}</td></tr></tbody></table>\n",
        summary.cefr_level,
        summary.band_score,
        summary.score_percentage,
        summary.ability,
        summary.standard_error
    ));
    html.push_str(&format!(
        "<p class=\"descriptor\">{}</p>\n",
        html_escape(summary.cefr_level.description())
    ));

    if !summary.ability_history.is_empty() {
        html.push_str("<h2>Ability trajectory</h2>\n");
        html.push_str(&generate_trajectory_chart(&summary.ability_history));
    }
    html.push_str("</section>\n");

    push_raw_json(&mut html, summary);

    html.push_str("</body>\n</html>");
    html
}

/// Write a session HTML report to a file.
pub fn write_session_html(summary: &SessionSummary, title: &str, path: &Path) -> Result<()> {
    write_file(path, &generate_session_html(summary, title))
}

/// Generate an HTML report for a simulation run.
pub fn generate_simulation_html(report: &SimulationReport) -> String {
    let mut html = String::new();
    push_head(&mut html, &report.bank.name);

    let overall = &report.aggregate.overall;

    html.push_str("<header>\n");
    html.push_str("<h1>adaptest simulation report</h1>\n");
    html.push_str(&format!(
        "<p class=\"meta\">Item bank: <strong>{}</strong> | {} items | {} exams | {}</p>\n",
        html_escape(&report.bank.name),
        report.bank.item_count,
        overall.exams,
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    html.push_str("<section class=\"dashboard\">\n");
    html.push_str("<h2>Precision by ability</h2>\n");
    html.push_str("<table class=\"summary\">\n");
    html.push_str("<thead><tr><th>True θ</th><th>Exams</th><th>Mean θ̂</th><th>Bias</th><th>RMSE</th><th>Mean SE</th><th>Mean length</th><th>Level match</th></tr></thead>\n");
    html.push_str("<tbody>\n");
    for stats in &report.aggregate.per_theta {
        html.push_str(&stats_row(stats));
    }
    html.push_str(&stats_row(overall));
    html.push_str("</tbody></table>\n");

    if !report.aggregate.per_theta.is_empty() {
        html.push_str(&generate_rmse_chart(&report.aggregate.per_theta));
    }

    if !report.aggregate.stop_reasons.is_empty() {
        html.push_str("<h2>Stop reasons</h2>\n<ul>\n");
        for (reason, count) in &report.aggregate.stop_reasons {
            html.push_str(&format!("<li>{}: {}</li>\n", html_escape(reason), count));
        }
        html.push_str("</ul>\n");
    }
    html.push_str("</section>\n");

    html.push_str("<section class=\"results\">\n");
    html.push_str("<h2>Exams</h2>\n");
    html.push_str("<table class=\"results-table\" id=\"results\">\n");
    html.push_str("<thead><tr><th onclick=\"sortTable(0)\">True θ</th><th onclick=\"sortTable(1)\">Rep</th><th onclick=\"sortTable(2)\">Estimate</th><th onclick=\"sortTable(3)\">SE</th><th onclick=\"sortTable(4)\">Items</th><th onclick=\"sortTable(5)\">Level</th><th onclick=\"sortTable(6)\">Ended</th></tr></thead>\n");
    html.push_str("<tbody>\n");
    for exam in &report.exams {
        let level_class = if adaptest_core::scoring::cefr_level_for(exam.true_theta)
            == exam.summary.cefr_level
        {
            "pass"
        } else {
            "fail"
        };
        html.push_str(&format!(
            "<tr><td>{:.1}</td><td>{}</td><td>{:.3}</td><td>{:.3}</td><td>{}</td><td class=\"{}\">{}</td><td>{}</td></tr>\n",
            exam.true_theta,
            exam.replication,
            exam.final_theta,
            exam.final_se,
            exam.length(),
            level_class,
            exam.summary.cefr_level,
            exam.end.reason()
        ));
    }
    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    push_raw_json(&mut html, report);

    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write a simulation HTML report to a file.
pub fn write_simulation_html(report: &SimulationReport, path: &Path) -> Result<()> {
    write_file(path, &generate_simulation_html(report))
}

fn write_file(path: &Path, html: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write HTML report to {}", path.display()))?;
    Ok(())
}

fn stats_row(stats: &AbilityStats) -> String {
    let label = match stats.true_theta {
        Some(theta) => format!("{theta:.1}"),
        None => "<strong>all</strong>".to_string(),
    };
    format!(
        "<tr><td>{}</td><td>{}</td><td>{:.3}</td><td>{:+.3}</td><td>{:.3}</td><td>{:.3}</td><td>{:.1}</td><td>{:.0}%</td></tr>\n",
        label,
        stats.exams,
        stats.mean_estimate,
        stats.bias,
        stats.rmse,
        stats.mean_se,
        stats.mean_length,
        stats.classification_accuracy * 100.0
    )
}

fn generate_rmse_chart(per_theta: &[AbilityStats]) -> String {
    let bar_height = 30;
    let max_width = 400;
    let padding = 10;
    let label_width = 120;

    let max_rmse = per_theta
        .iter()
        .map(|s| s.rmse)
        .fold(0.0_f64, f64::max)
        .max(1.0);
    let total_height = per_theta.len() * (bar_height + padding) + padding;

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        label_width + max_width + 60,
        total_height
    );

    for (i, stats) in per_theta.iter().enumerate() {
        let y = i * (bar_height + padding) + padding;
        let width = (stats.rmse / max_rmse * max_width as f64) as usize;

        let color = if stats.rmse <= 0.3 {
            "#22c55e"
        } else if stats.rmse <= 0.6 {
            "#eab308"
        } else {
            "#ef4444"
        };

        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"14\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">θ = {:.1}</text>\n",
            label_width - 10,
            y + bar_height / 2,
            stats.true_theta.unwrap_or_default()
        ));
        svg.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" rx=\"4\"/>\n",
            label_width, y, width, bar_height, color
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" dominant-baseline=\"middle\">RMSE {:.3}</text>\n",
            label_width + width + 8,
            y + bar_height / 2,
            stats.rmse
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

/// Line chart of the ability estimate after each response, on the [-4, 4]
/// scale with a guide line at every level anchor.
fn generate_trajectory_chart(history: &[f64]) -> String {
    let width = 520.0;
    let height = 240.0;
    let left = 40.0;
    let right = 10.0;
    let top = 10.0;
    let bottom = 20.0;

    let plot_w = width - left - right;
    let plot_h = height - top - bottom;
    let y_of = |theta: f64| top + (4.0 - theta.clamp(-4.0, 4.0)) / 8.0 * plot_h;
    let step = if history.len() > 1 {
        plot_w / (history.len() - 1) as f64
    } else {
        0.0
    };

    let mut svg = format!(
        "<svg width=\"{width}\" height=\"{height}\" xmlns=\"http://www.w3.org/2000/svg\">\n"
    );

    for level in CefrLevel::ALL {
        let y = y_of(level.anchor());
        svg.push_str(&format!(
            "  <line x1=\"{left}\" y1=\"{y:.1}\" x2=\"{:.1}\" y2=\"{y:.1}\" stroke=\"#9ca3af\" stroke-dasharray=\"4 4\"/>\n",
            width - right
        ));
        svg.push_str(&format!(
            "  <text x=\"{:.1}\" y=\"{y:.1}\" font-size=\"11\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">{level}</text>\n",
            left - 6.0
        ));
    }

    let points: Vec<String> = history
        .iter()
        .enumerate()
        .map(|(i, theta)| format!("{:.1},{:.1}", left + i as f64 * step, y_of(*theta)))
        .collect();
    svg.push_str(&format!(
        "  <polyline points=\"{}\" fill=\"none\" stroke=\"#3b82f6\" stroke-width=\"2\"/>\n",
        points.join(" ")
    ));

    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --pass: #dcfce7; --fail: #fde2e2; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --pass: #064e3b; --fail: #7f1d1d; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta, .descriptor { color: #6b7280; }
.level { font-weight: bold; font-size: 1.4rem; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); cursor: pointer; }
.pass { background: var(--pass); }
.fail { background: var(--fail); }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;

const JS: &str = r#"
function sortTable(col) {
  const table = document.getElementById('results');
  const tbody = table.querySelector('tbody');
  const rows = Array.from(tbody.querySelectorAll('tr'));
  const asc = table.dataset.sortCol == col && table.dataset.sortDir == 'asc' ? false : true;
  rows.sort((a, b) => {
    const va = parseFloat(a.cells[col].textContent);
    const vb = parseFloat(b.cells[col].textContent);
    if (!isNaN(va) && !isNaN(vb)) return asc ? va - vb : vb - va;
    return asc
      ? a.cells[col].textContent.localeCompare(b.cells[col].textContent)
      : b.cells[col].textContent.localeCompare(a.cells[col].textContent);
  });
  table.dataset.sortCol = col;
  table.dataset.sortDir = asc ? 'asc' : 'desc';
  rows.forEach(r => tbody.appendChild(r));
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use adaptest_core::model::{CandidateItem, ItemBank};
    use adaptest_core::session::{CatSession, SessionConfig};
    use adaptest_core::simulation::{NoopReporter, SimulationConfig, Simulator};

    fn make_summary() -> SessionSummary {
        let mut session = CatSession::new("B1", SessionConfig::default()).unwrap();
        for (level, correct) in [("B1", true), ("B2", true), ("C1", false), ("B2", true)] {
            session.record_response(level, correct).unwrap();
        }
        session.summary()
    }

    fn make_simulation_report() -> SimulationReport {
        let items = CefrLevel::ALL
            .iter()
            .flat_map(|level| {
                (0..3).map(move |i| CandidateItem::new(format!("{level}-{i}"), *level))
            })
            .collect();
        let bank = ItemBank {
            id: "test-bank".into(),
            name: "Test <Bank>".into(),
            description: String::new(),
            items,
        };
        let config = SimulationConfig {
            replications: 2,
            seed: 5,
            ..SimulationConfig::default()
        };
        Simulator::new(config)
            .run(&bank, &[-1.0, 2.0], &NoopReporter)
            .unwrap()
    }

    #[test]
    fn escape_special_characters() {
        assert_eq!(
            html_escape("<a href=\"x\">&'"),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#x27;"
        );
    }

    #[test]
    fn session_report_contains_required_elements() {
        let summary = make_summary();
        let html = generate_session_html(&summary, "candidate 42");

        assert!(html.contains("<html"));
        assert!(html.contains("</html>"));
        assert!(html.contains("candidate 42"));
        assert!(html.contains(&summary.cefr_level.to_string()));
        assert!(html.contains("<polyline"));
        assert!(html.contains("Raw JSON Data"));
    }

    #[test]
    fn empty_session_has_no_trajectory() {
        let summary = CatSession::new("B1", SessionConfig::default())
            .unwrap()
            .summary();
        let html = generate_session_html(&summary, "empty");
        assert!(!html.contains("<polyline"));
        assert!(html.contains("50.0%"));
    }

    #[test]
    fn simulation_report_contains_required_elements() {
        let report = make_simulation_report();
        let html = generate_simulation_html(&report);

        assert!(html.contains("Test &lt;Bank&gt;"));
        assert!(!html.contains("Test <Bank>"));
        assert!(html.contains("18 items"));
        assert!(html.contains("RMSE"));
        assert!(html.contains("<strong>all</strong>"));
        assert!(html.contains("sortTable"));
    }

    #[test]
    fn write_reports_to_file() {
        let dir = tempfile::tempdir().unwrap();

        let sim_path = dir.path().join("out").join("simulation.html");
        write_simulation_html(&make_simulation_report(), &sim_path).unwrap();
        let content = std::fs::read_to_string(&sim_path).unwrap();
        assert!(content.contains("<html"));

        let session_path = dir.path().join("session.html");
        write_session_html(&make_summary(), "s", &session_path).unwrap();
        assert!(session_path.exists());
    }
}
