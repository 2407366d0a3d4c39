//! Compile order for legacy Fortran and C source trees.
//!
//! A directory is read into an immutable [`scan::Snapshot`], optionally
//! patched, then every file is reduced to the symbols it defines and
//! requires. Requirements are resolved against definitions and the resulting
//! graph is ordered into stages, with dependency cycles kept together.

pub mod analyze;
pub mod cli;
pub mod config;
pub mod emit;
pub mod error;
pub mod generate;
pub mod patch;
pub mod resolve;
pub mod scan;
pub mod types;

pub use analyze::{build_order, extract, extract_unit, Resolution};
pub use config::Config;
pub use resolve::{resolve_directory, resolve_snapshot, Diagnostics, Report};
pub use scan::{scan, ScanOptions, Snapshot};
pub use types::{Language, LanguageKind, Origin, SourceFile, SourceUnit, SymbolName};
