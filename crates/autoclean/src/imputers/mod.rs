//! Imputation module for handling missing values.
//!
//! Provides the statistics used to fill absent cells: median for numbers,
//! mode for categories, lower median for dates.

mod statistical;

pub use statistical::StatisticalImputer;
