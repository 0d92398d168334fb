//! Markdown report generation
//!
//! Writes the same information as the stdout report to a file, for runs
//! that configure `output.summary-path`.

use crate::output::report::CrawlReport;
use crate::state::CrawlPhase;
use crate::MirrorError;
use std::fs;
use std::path::Path;

/// Writes `report` as markdown to `output_path`, creating parent directories
pub fn write_markdown_report(report: &CrawlReport, output_path: &Path) -> Result<(), MirrorError> {
    let markdown = format_markdown_report(report);

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(output_path, markdown)?;

    tracing::info!(path = %output_path.display(), "Wrote markdown report");
    Ok(())
}

/// Formats a run report as markdown
pub fn format_markdown_report(report: &CrawlReport) -> String {
    let mut md = String::new();

    md.push_str("# Review Mirror Report\n\n");

    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Account**: {}\n", report.account));
    md.push_str(&format!("- **Started**: {}\n", report.started_at.to_rfc3339()));
    if let Some(finished) = &report.finished_at {
        md.push_str(&format!("- **Finished**: {}\n", finished.to_rfc3339()));
    }
    if let Some(duration) = report.duration_seconds() {
        md.push_str(&format!(
            "- **Duration**: {} seconds ({:.2} minutes)\n",
            duration,
            duration as f64 / 60.0
        ));
    }
    md.push_str(&format!("- **Config Hash**: {}\n\n", report.config_hash));

    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!("- **Listing Pages**: {}\n", report.listing_pages));
    md.push_str(&format!("- **Frontier Size**: {}\n", report.frontier_size));
    md.push_str(&format!("- **Attempted**: {}\n", report.attempted()));
    md.push_str(&format!("- **Captured**: {}\n", report.captured()));
    md.push_str(&format!("- **Failed**: {}\n", report.failed()));
    md.push_str(&format!(
        "- **Success Rate**: {:.2}%\n\n",
        report.success_rate()
    ));

    md.push_str("## Phase Breakdown\n\n");
    md.push_str("| Phase | Captured | Failed |\n");
    md.push_str("|-------|----------|--------|\n");
    for phase in [CrawlPhase::Discovery, CrawlPhase::Detail] {
        let (ok, err) = report.phase_counts(phase);
        md.push_str(&format!("| {} | {} | {} |\n", phase, ok, err));
    }
    md.push('\n');

    md.push_str("## Page State Breakdown\n\n");
    md.push_str("| State | Count |\n");
    md.push_str("|-------|-------|\n");
    for (state, count) in report.state_counts() {
        md.push_str(&format!("| {} | {} |\n", state, count));
    }
    md.push('\n');

    md.push_str("## Pages\n\n");
    md.push_str("| Phase | URL | State | Key | Bytes | Title |\n");
    md.push_str("|-------|-----|-------|-----|-------|-------|\n");
    for outcome in &report.outcomes {
        md.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} |\n",
            outcome.phase,
            outcome.url,
            outcome.state,
            outcome
                .storage_key
                .as_ref()
                .map(|k| k.as_str())
                .unwrap_or("-"),
            outcome.bytes,
            escape_cell(outcome.title.as_deref().unwrap_or("")),
        ));
    }
    md.push('\n');

    let failures: Vec<_> = report.failures().collect();
    if !failures.is_empty() {
        md.push_str("## Failures\n\n");
        for outcome in failures {
            md.push_str(&format!(
                "- `{}` ({}): {}\n",
                outcome.url,
                outcome.state,
                outcome.error.as_deref().unwrap_or("unknown error")
            ));
        }
        md.push('\n');
    }

    md
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}
