//! Data quality scoring.
//!
//! The score combines the fraction of absent cells and the fraction of
//! duplicate rows into one number between 0 and 100.

mod scorer;

pub use scorer::{QualityComparison, QualityScorer};
