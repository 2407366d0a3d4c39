use anyhow::Result;
use console::style;

use crate::cli::args::ScanArgs;
use crate::cli::load::load_report;

pub fn run_units(scan: &ScanArgs, json: bool) -> Result<()> {
    let report = load_report(scan)?;
    let units = &report.resolution.units;

    if json {
        println!("{}", serde_json::to_string_pretty(units)?);
        return Ok(());
    }

    for unit in units {
        println!(
            "{} {}",
            style(&unit.relative_path).green(),
            style(format!("({}, {:?})", unit.language, unit.origin).to_lowercase()).dim()
        );
        let defines: Vec<&str> = unit.defines.iter().map(|s| s.as_str()).collect();
        let requires: Vec<&str> = unit.requires.iter().map(|s| s.as_str()).collect();
        if !defines.is_empty() {
            println!("   defines:  {}", defines.join(", "));
        }
        if !requires.is_empty() {
            println!("   requires: {}", style(requires.join(", ")).cyan());
        }
    }

    for failure in &report.decode_errors {
        eprintln!(
            "{} {}: {}",
            style("excluded").red(),
            failure.path.display(),
            failure.reason
        );
    }

    Ok(())
}
