use anyhow::Result;

use crate::cli::args::ScanArgs;
use crate::cli::load::load_report;
use crate::cli::summary::{check_strict, print_summary};
use crate::emit::{render_flat, render_stages, JsonOutput};

pub fn run_order(scan: &ScanArgs, flat: bool, json: bool, units: bool, strict: bool) -> Result<()> {
    let report = load_report(scan)?;

    if json {
        println!("{}", JsonOutput::from_report(&report, units).to_json());
    } else {
        let text = if flat {
            render_flat(&report)
        } else {
            render_stages(&report)
        };
        print!("{}", text);
        print_summary(&report);
    }

    check_strict(&report, strict)
}
