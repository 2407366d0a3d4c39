use anyhow::Result;
use buildorder::cli::{run_order, run_report, run_units, Args, Command};
use clap::Parser;

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();

    match &args.command {
        Command::Order {
            scan,
            flat,
            json,
            units,
            strict,
        } => run_order(scan, *flat, *json, *units, *strict),
        Command::Units { scan, json } => run_units(scan, *json),
        Command::Report {
            scan,
            output,
            strict,
        } => run_report(scan, output.as_ref(), *strict),
    }
}
