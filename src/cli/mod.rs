mod args;
mod load;
mod order;
mod report;
mod summary;
mod units;

pub use args::{Args, Command, ScanArgs};
pub use load::{load_report, scan_options};
pub use order::run_order;
pub use report::run_report;
pub use summary::{check_strict, print_summary};
pub use units::run_units;
