//! Run summaries for the console.
//!
//! Supports the human-readable summary and JSON serialization.

use anyhow::Result;
use std::io::Write;

use crate::update::UpdateReport;

/// Writes the human-readable summary of a run.
pub fn write_summary<W: Write>(out: &mut W, report: &UpdateReport) -> Result<()> {
    let prefix = if report.dry_run { "[dry run] " } else { "" };

    if let Some(deploy) = &report.deploy {
        let verb = if report.dry_run { "Would copy" } else { "Copied" };
        writeln!(out, "{prefix}{verb} to {}", deploy.display())?;
    }

    match (report.host_changed, report.dry_run) {
        (true, false) => writeln!(
            out,
            "Updated {} fallback with {} states.",
            report.host.display(),
            report.states
        )?,
        (true, true) => writeln!(
            out,
            "{prefix}Would update {} fallback with {} states.",
            report.host.display(),
            report.states
        )?,
        (false, _) => writeln!(
            out,
            "{prefix}{} fallback already up to date ({} states).",
            report.host.display(),
            report.states
        )?,
    }

    for marker in &report.inserted_markers {
        writeln!(out, "  Inserted missing {marker}")?;
    }

    writeln!(out, "  Tax year: {}", report.year)?;
    writeln!(out, "  Last updated: {}", report.updated)?;

    if !report.dry_run {
        writeln!(out, "\nCommit and push to deploy.")?;
    }

    Ok(())
}

/// Writes the run summary as pretty-printed JSON.
pub fn write_json<W: Write>(out: &mut W, report: &UpdateReport) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, report)?;
    writeln!(out)?;
    Ok(())
}
