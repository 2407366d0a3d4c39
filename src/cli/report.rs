use anyhow::{Context, Result};
use console::{style, Emoji};
use std::fs;
use std::path::PathBuf;

use crate::cli::args::ScanArgs;
use crate::cli::load::load_report;
use crate::cli::summary::check_strict;
use crate::generate::generate_dependency_report;

static WRITTEN: Emoji<'_, '_> = Emoji("📄 ", "");

pub fn run_report(scan: &ScanArgs, output: Option<&PathBuf>, strict: bool) -> Result<()> {
    let report = load_report(scan)?;
    let markdown = generate_dependency_report(&report);

    match output {
        Some(path) => {
            fs::write(path, &markdown)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("{}Report written to {}", WRITTEN, style(path.display()).green());
        }
        None => print!("{}", markdown),
    }

    check_strict(&report, strict)
}
