use console::{style, Emoji};

use crate::resolve::Report;

static SUCCESS: Emoji<'_, '_> = Emoji("✅ ", "");
static WARNING: Emoji<'_, '_> = Emoji("⚠️  ", "");
static ERROR: Emoji<'_, '_> = Emoji("❌ ", "");

const MAX_LISTED: usize = 10;

/// Diagnostics on stderr, keeping stdout for the order itself.
pub fn print_summary(report: &Report) {
    let resolution = &report.resolution;
    let diagnostics = report.diagnostics();

    if diagnostics.is_empty() {
        eprintln!(
            "{}{} units in {} stages",
            SUCCESS,
            style(resolution.units.len()).green(),
            style(resolution.order.stages.len()).cyan()
        );
        return;
    }

    for cycle in &diagnostics.cycles {
        let members: Vec<String> = cycle
            .members
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        eprintln!(
            "{}{} {}",
            WARNING,
            style(&cycle.name).yellow().bold(),
            members.join(", ")
        );
    }

    if !diagnostics.unresolved.is_empty() {
        eprintln!(
            "{}Unresolved ({}):",
            ERROR,
            style(diagnostics.unresolved.len()).red()
        );
        for missing in diagnostics.unresolved.iter().take(MAX_LISTED) {
            eprintln!(
                "  - {} requires {}",
                missing.path.display(),
                style(&missing.symbol).red()
            );
        }
        if diagnostics.unresolved.len() > MAX_LISTED {
            eprintln!("  ... and {} more", diagnostics.unresolved.len() - MAX_LISTED);
        }
    }

    for ambiguous in &diagnostics.ambiguous {
        eprintln!(
            "{}{} defined {} times, using {}",
            WARNING,
            style(&ambiguous.symbol).yellow(),
            ambiguous.rejected.len() + 1,
            style(ambiguous.chosen.display()).dim()
        );
    }

    for failure in &diagnostics.decode_errors {
        eprintln!(
            "{}Excluded {}: {}",
            ERROR,
            failure.path.display(),
            style(&failure.reason).dim()
        );
    }
}

/// `Err` when `strict` and the report has anything blocking.
pub fn check_strict(report: &Report, strict: bool) -> anyhow::Result<()> {
    if strict && report.has_blocking_diagnostics() {
        let diagnostics = report.diagnostics();
        anyhow::bail!(
            "{} cycle(s), {} unresolved requirement(s), {} excluded file(s)",
            diagnostics.cycles.len(),
            diagnostics.unresolved.len(),
            diagnostics.decode_errors.len()
        );
    }
    Ok(())
}
