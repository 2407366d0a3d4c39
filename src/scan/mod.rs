mod filter;
mod snapshot;
mod walker;

pub use filter::should_include_file;
pub use snapshot::Snapshot;
pub use walker::{scan, ScanOptions};
