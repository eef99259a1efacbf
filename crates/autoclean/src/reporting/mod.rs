//! Report rendering and output files.
//!
//! [`RunReport`] wraps a [`CleaningReport`](crate::types::CleaningReport)
//! with run metadata. It is used for JSON output to stdout (`--json`), the
//! report file (`--emit-report`) and library callers alike.
//!
//! # Example
//!
//! ```rust,ignore
//! use autoclean::reporting::{ReportGenerator, RunReport};
//!
//! let generator = ReportGenerator::new(PathBuf::from("output"), "sales");
//! let csv_path = generator.write_cleaned_data(&outcome.table)?;
//! let report = RunReport::new("data/sales.csv", Some(&csv_path), outcome.report);
//! generator.write_report(&report)?;
//! println!("{}", render_summary(&report.cleaning));
//! ```

mod generator;

pub use generator::{ReportGenerator, RunReport, render_summary};
