//! Snapshot in, compile order and diagnostics out.

use crate::analyze::{build_order, extract_unit, AmbiguousDefinition, Resolution};
use crate::error::{ExtractError, ScanError};
use crate::scan::{scan, ScanOptions, Snapshot};
use crate::types::{DecodeFailure, SourceUnit, SymbolName};
use rayon::prelude::*;
use serde::Serialize;
use std::path::PathBuf;

/// Result of one resolver run.
#[derive(Debug, Clone)]
pub struct Report {
    pub root: PathBuf,
    pub input_digest: String,
    pub resolution: Resolution,
    pub decode_errors: Vec<DecodeFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedEntry {
    pub path: PathBuf,
    pub symbol: SymbolName,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleEntry {
    pub name: String,
    pub members: Vec<PathBuf>,
}

/// Everything a caller may want to escalate, by path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    pub cycles: Vec<CycleEntry>,
    pub unresolved: Vec<UnresolvedEntry>,
    pub ambiguous: Vec<AmbiguousDefinition>,
    pub decode_errors: Vec<DecodeFailure>,
}

impl Diagnostics {
    pub fn is_empty(&self) -> bool {
        self.cycles.is_empty()
            && self.unresolved.is_empty()
            && self.ambiguous.is_empty()
            && self.decode_errors.is_empty()
    }
}

impl Report {
    pub fn diagnostics(&self) -> Diagnostics {
        let resolution = &self.resolution;
        Diagnostics {
            cycles: resolution
                .cycles
                .iter()
                .map(|c| CycleEntry {
                    name: c.name.clone(),
                    members: c
                        .members
                        .iter()
                        .map(|&id| resolution.unit(id).path.clone())
                        .collect(),
                })
                .collect(),
            unresolved: resolution
                .unresolved
                .iter()
                .map(|u| UnresolvedEntry {
                    path: resolution.unit(u.unit).path.clone(),
                    symbol: u.symbol.clone(),
                })
                .collect(),
            ambiguous: resolution.ambiguous.clone(),
            decode_errors: self.decode_errors.clone(),
        }
    }

    /// Any cycle, unresolved requirement or excluded file.
    pub fn has_blocking_diagnostics(&self) -> bool {
        !self.resolution.is_clean() || !self.decode_errors.is_empty()
    }
}

/// Extracts every file in parallel, then orders the units.
///
/// Extraction results are collected in snapshot order before any graph work
/// starts, so the symbol table always sees the complete set of definitions.
pub fn resolve_snapshot(snapshot: &Snapshot) -> Report {
    let results: Vec<Result<SourceUnit, ExtractError>> =
        snapshot.files.par_iter().map(extract_unit).collect();

    let mut units = Vec::with_capacity(results.len());
    let mut decode_errors = snapshot.unreadable.clone();
    for result in results {
        match result {
            Ok(unit) => units.push(unit),
            Err(ExtractError::Decode { path, source }) => {
                log::warn!("skipping {}: not valid UTF-8 ({})", path.display(), source);
                decode_errors.push(DecodeFailure {
                    path,
                    reason: source.to_string(),
                });
            }
        }
    }

    log::debug!(
        "extracted {} unit(s), {} excluded",
        units.len(),
        decode_errors.len()
    );

    Report {
        root: snapshot.root.clone(),
        input_digest: snapshot.digest(),
        resolution: build_order(units),
        decode_errors,
    }
}

/// Scans `options.root` and resolves it.
pub fn resolve_directory(options: &ScanOptions) -> Result<Report, ScanError> {
    let snapshot = scan(options)?;
    Ok(resolve_snapshot(&snapshot))
}
