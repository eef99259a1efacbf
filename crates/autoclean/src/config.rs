//! Policy parameters for type inference and cleaning.
//!
//! The inference and repair heuristics depend on a handful of thresholds.
//! They have sensible defaults and are exposed here through a builder so
//! callers (and the CLI) can tune them without touching the algorithms.

use serde::{Deserialize, Serialize};

/// Default cardinality ratio below which a column is categorical.
pub const DEFAULT_CATEGORICAL_CARDINALITY_RATIO: f64 = 0.5;

/// Default exclusive upper bound on the text length of a date value.
pub const DEFAULT_DATETIME_MAX_TEXT_LEN: usize = 50;

/// Default fraction of absent cells above which a row is pruned.
pub const DEFAULT_ROW_MISSING_THRESHOLD: f64 = 0.5;

/// Label used to fill categorical columns with no values and text columns.
pub const FALLBACK_LABEL: &str = "Unknown";

/// Thresholds shared by the inference engine and the cleaning pipeline.
///
/// Use [`CleaningPolicy::builder()`] for a validated configuration.
///
/// # Example
///
/// ```rust,ignore
/// use autoclean::config::CleaningPolicy;
///
/// let policy = CleaningPolicy::builder()
///     .categorical_cardinality_ratio(0.3)
///     .row_missing_threshold(0.6)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningPolicy {
    /// A non-numeric, non-date column is categorical when its distinct
    /// value count is strictly below `ratio * row_count`.
    /// Default: 0.5
    pub categorical_cardinality_ratio: f64,

    /// Date candidates must have a text form strictly shorter than this.
    /// Guards against free text that happens to contain a date.
    /// Default: 50
    pub datetime_max_text_len: usize,

    /// Rows whose fraction of absent cells (measured right after
    /// deduplication) strictly exceeds this are removed.
    /// Default: 0.5
    pub row_missing_threshold: f64,
}

impl Default for CleaningPolicy {
    fn default() -> Self {
        Self {
            categorical_cardinality_ratio: DEFAULT_CATEGORICAL_CARDINALITY_RATIO,
            datetime_max_text_len: DEFAULT_DATETIME_MAX_TEXT_LEN,
            row_missing_threshold: DEFAULT_ROW_MISSING_THRESHOLD,
        }
    }
}

impl CleaningPolicy {
    /// Create a new policy builder.
    pub fn builder() -> CleaningPolicyBuilder {
        CleaningPolicyBuilder::default()
    }

    /// Load a policy from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        let policy: CleaningPolicy = serde_json::from_str(json)?;
        policy
            .validate()
            .map_err(|e| crate::error::CleaningError::InvalidConfig(e.to_string()))?;
        Ok(policy)
    }

    /// Validate the policy and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let ratio = self.categorical_cardinality_ratio;
        if !(ratio > 0.0 && ratio <= 1.0) {
            return Err(ConfigValidationError::InvalidRatio {
                field: "categorical_cardinality_ratio".to_string(),
                value: ratio,
            });
        }

        if !(0.0..=1.0).contains(&self.row_missing_threshold) {
            return Err(ConfigValidationError::InvalidRatio {
                field: "row_missing_threshold".to_string(),
                value: self.row_missing_threshold,
            });
        }

        if self.datetime_max_text_len == 0 {
            return Err(ConfigValidationError::InvalidTextLength(
                self.datetime_max_text_len,
            ));
        }

        Ok(())
    }
}

/// Errors that can occur during policy validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid ratio for '{field}': {value} (must be within 0.0 and 1.0)")]
    InvalidRatio { field: String, value: f64 },

    #[error("Invalid datetime text length: {0} (must be at least 1)")]
    InvalidTextLength(usize),
}

/// Builder for [`CleaningPolicy`] with fluent API.
#[derive(Debug, Default)]
pub struct CleaningPolicyBuilder {
    categorical_cardinality_ratio: Option<f64>,
    datetime_max_text_len: Option<usize>,
    row_missing_threshold: Option<f64>,
}

impl CleaningPolicyBuilder {
    /// Set the cardinality ratio for categorical detection.
    ///
    /// # Arguments
    /// * `ratio` - Value in (0.0, 1.0] (e.g., 0.5 = fewer distinct values than half the rows)
    pub fn categorical_cardinality_ratio(mut self, ratio: f64) -> Self {
        self.categorical_cardinality_ratio = Some(ratio);
        self
    }

    /// Set the exclusive maximum text length of a date value.
    pub fn datetime_max_text_len(mut self, len: usize) -> Self {
        self.datetime_max_text_len = Some(len);
        self
    }

    /// Set the threshold for pruning sparse rows.
    ///
    /// # Arguments
    /// * `threshold` - Value between 0.0 and 1.0 (e.g., 0.5 = more than half the cells absent)
    pub fn row_missing_threshold(mut self, threshold: f64) -> Self {
        self.row_missing_threshold = Some(threshold);
        self
    }

    /// Build the policy.
    ///
    /// Returns a validated `CleaningPolicy` or an error if validation fails.
    pub fn build(self) -> Result<CleaningPolicy, ConfigValidationError> {
        let policy = CleaningPolicy {
            categorical_cardinality_ratio: self
                .categorical_cardinality_ratio
                .unwrap_or(DEFAULT_CATEGORICAL_CARDINALITY_RATIO),
            datetime_max_text_len: self
                .datetime_max_text_len
                .unwrap_or(DEFAULT_DATETIME_MAX_TEXT_LEN),
            row_missing_threshold: self
                .row_missing_threshold
                .unwrap_or(DEFAULT_ROW_MISSING_THRESHOLD),
        };

        policy.validate()?;
        Ok(policy)
    }
}
