mod report;

pub use report::generate_dependency_report;
