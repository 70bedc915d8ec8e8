use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use qr_labels::{BatchArchiver, BatchReport, CollisionPolicy, FailurePolicy, QrLabeler, Table, label_text};

/// Write one line per row: index, label and archive name, or the reason the
/// row cannot be rendered.
pub fn list(table: &Table, labeler: &QrLabeler, out: &mut impl Write) -> Result<()> {
    for record in table.records() {
        let line = match (label_text(record), labeler.compositor().file_name(record)) {
            (Ok(label), Ok(name)) => format!("{}\t{label}\t{name}", record.index()),
            (Err(e), _) | (_, Err(e)) => format!("{}\t! {e}", record.index()),
        };
        writeln!(out, "{line}")?;
    }
    Ok(())
}

pub fn preview(table: &Table, labeler: &QrLabeler, row: usize, out: &Path) -> Result<()> {
    let labeled = labeler.preview(table, row)?;
    let png = labeled.to_png().context("failed to encode preview")?;
    std::fs::write(out, png).with_context(|| format!("failed to write {}", out.display()))?;
    tracing::info!(path = %out.display(), label = %labeled.label, "Preview written");
    Ok(())
}

pub fn export(
    table: &Table,
    labeler: &QrLabeler,
    failure_policy: FailurePolicy,
    collision_policy: CollisionPolicy,
    out: &Path,
) -> Result<BatchReport> {
    let output = BatchArchiver::new(labeler)
        .failure_policy(failure_policy)
        .collision_policy(collision_policy)
        .run(table)?;
    std::fs::write(out, &output.bytes)
        .with_context(|| format!("failed to write {}", out.display()))?;
    tracing::info!(path = %out.display(), bytes = output.bytes.len(), "Archive written");
    Ok(output.report)
}

/// Human-readable batch summary.
pub fn print_report(report: &BatchReport, out: &mut impl Write) -> Result<()> {
    writeln!(out, "{} images written", report.members.len())?;
    for name in &report.overwritten {
        writeln!(out, "overwritten: {name}")?;
    }
    for skipped in &report.skipped {
        writeln!(out, "skipped row {}: {}", skipped.index, skipped.reason)?;
    }
    Ok(())
}
