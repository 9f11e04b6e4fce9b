//! Typed errors for the listing pipeline
//!
//! Everything ends up in an `anyhow::Error` at the binary boundary; the
//! variants here exist so `main` can tell source/configuration failures
//! apart from data failures.

use serde_json::json;
use thiserror::Error;

/// Configuration and source (connection) failures.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Listings table could not be opened or read.
    #[error("failed to read listings table {path}: {reason}")]
    Unreadable { path: String, reason: String },

    /// A column the pipeline needs is absent from the table.
    #[error("listings table has no column named '{0}'")]
    MissingColumn(String),

    /// A query against the table failed.
    #[error("query on listings table failed: {0}")]
    Query(String),

    /// Configuration value out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl SourceError {
    /// Short category name used in the structured fatal-error record.
    pub fn name(&self) -> &'static str {
        match self {
            SourceError::Unreadable { .. } => "Error opening listings table",
            SourceError::MissingColumn(_) => "Error reading listings columns",
            SourceError::Query(_) => "Error querying listings table",
            SourceError::InvalidConfig(_) => "Error in configuration",
        }
    }
}

/// Structured record for a source or configuration failure at the top of
/// `err`'s chain; `None` for every other error.
///
/// Fields are `error name`, `error message` and `error chain` (the full
/// context chain, outermost first).
pub fn fatal_record(err: &anyhow::Error) -> Option<String> {
    let source_err = err.downcast_ref::<SourceError>()?;
    let record = json!({
        "error name": source_err.name(),
        "error message": source_err.to_string(),
        "error chain": format!("{:#}", err),
    });
    serde_json::to_string(&record).ok()
}

/// A price field that is not a number once formatting is stripped.
#[derive(Error, Debug, PartialEq)]
#[error("malformed price '{raw}'")]
pub struct PriceError {
    pub raw: String,
}

/// Feature table construction failures.
#[derive(Error, Debug, PartialEq)]
pub enum FeatureError {
    #[error("row key {0} appears twice in one table")]
    DuplicateKey(usize),

    #[error("row key {0} missing from indicator table")]
    MissingKey(usize),

    #[error("need at least {required} listings to cluster, got {provided}")]
    TooFewRows { required: usize, provided: usize },

    #[error("cannot standardize an empty feature table")]
    Empty,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_error_names() {
        let err = SourceError::MissingColumn("price".to_string());
        assert_eq!(err.name(), "Error reading listings columns");
        assert!(err.to_string().contains("price"));
    }

    #[test]
    fn test_feature_error_message() {
        let err = FeatureError::TooFewRows {
            required: 3,
            provided: 2,
        };
        assert_eq!(err.to_string(), "need at least 3 listings to cluster, got 2");
    }

    #[test]
    fn test_fatal_record_is_escaped_json() {
        let err = anyhow::Error::from(SourceError::Unreadable {
            path: "C:\\data\\\"listings\".csv".to_string(),
            reason: "line 1\nline 2".to_string(),
        })
        .context("opening listings source");

        let record = fatal_record(&err).unwrap();
        assert!(!record.contains('\n'));
        let value: serde_json::Value = serde_json::from_str(&record).unwrap();
        assert_eq!(value["error name"], "Error opening listings table");
        let message = value["error message"].as_str().unwrap();
        assert!(message.contains("\"listings\".csv"));
        assert!(message.contains("line 1\nline 2"));
        let chain = value["error chain"].as_str().unwrap();
        assert!(chain.starts_with("opening listings source: "));
        assert!(chain.contains("line 2"));
    }

    #[test]
    fn test_fatal_record_skips_other_errors() {
        let err = anyhow::Error::from(FeatureError::Empty);
        assert!(fatal_record(&err).is_none());
    }
}
