use anyhow::{Context, Result};
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::cli::args::ScanArgs;
use crate::config::Config;
use crate::patch;
use crate::resolve::{resolve_snapshot, Report};
use crate::scan::{scan, ScanOptions};

static SCANNING: Emoji<'_, '_> = Emoji("🔎 ", "");

/// Config file first, command-line flags on top.
pub fn scan_options(args: &ScanArgs) -> Result<(Config, ScanOptions)> {
    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::discover(&args.path)?,
    };

    let mut scan_config = config.scan.clone();
    if let Some(lang) = args.lang {
        scan_config.language = lang;
    }
    if args.subdirs {
        scan_config.include_subdirs = true;
    }
    if args.no_gitignore {
        scan_config.respect_gitignore = false;
    }
    if let Some(dir) = &args.srcdir2 {
        scan_config.secondary_dir = Some(dir.clone());
    }
    scan_config.extra_files.extend(args.extra.iter().cloned());
    scan_config.exclude.extend(args.exclude.iter().cloned());

    let mut options = scan_config.to_options(&args.path);
    if args.only_extra {
        options.walk_root = false;
    }
    Ok((config, options))
}

/// Scans, patches and resolves the tree `args` names.
pub fn load_report(args: &ScanArgs) -> Result<Report> {
    let (config, options) = scan_options(args)?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(format!("{}Scanning {}...", SCANNING, options.root.display()));
    pb.enable_steady_tick(Duration::from_millis(100));

    let mut snapshot = scan(&options)
        .with_context(|| format!("Failed to scan {}", options.root.display()))?;
    log::debug!(
        "scanned {} file(s) under {}",
        snapshot.len(),
        snapshot.root.display()
    );

    if let Some(target) = &args.target {
        let set = patch::select(&config.patch_sets, target)
            .with_context(|| format!("No patch set for target '{}'", target))?;
        log::debug!("applying patch set {} v{}", set.target, set.version);
        snapshot = patch::apply(&snapshot, set)?;
    }

    pb.set_message(format!("{}Resolving {} file(s)...", SCANNING, snapshot.len()));
    let report = resolve_snapshot(&snapshot);
    pb.finish_and_clear();

    Ok(report)
}
