//! Error types for diagram parsing, scenario import and rating validation.

use thiserror::Error;

/// Errors raised while parsing a state diagram document.
///
/// Only top-level shape problems are errors; per-state structural issues
/// (missing actions, bad transitions) are reported by the validator
/// instead of failing the parse.
#[derive(Error, Debug)]
pub enum DiagramError {
    /// The input text is not valid JSON
    #[error("State diagram is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// A required top-level field is absent
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// A top-level field is present but has the wrong type
    #[error("Field '{field}' has the wrong type: expected {expected}")]
    WrongType {
        /// Name of the offending field
        field: &'static str,
        /// Expected JSON type
        expected: &'static str,
    },
}

/// Errors raised while importing an external scenario.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// The input text is not valid JSON
    #[error("Scenario is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The scenario document is not a JSON object
    #[error("Scenario must be a JSON object")]
    NotAnObject,

    /// The detected change type does not normalize to a known value
    #[error("Unknown change type: '{0}'")]
    UnknownChangeType(String),

    /// The detected implementation does not normalize to a known value
    #[error("Unknown implementation type: '{0}'")]
    UnknownImplementation(String),
}

/// A 1-5 rating supplied outside its valid range.
///
/// Raised at the edit/import boundary; the scoring functions themselves
/// assume pre-validated inputs.
#[derive(Error, Debug)]
pub enum RatingError {
    #[error("{field} must be between 1 and 5, got {value}")]
    OutOfRange {
        /// Name of the rating field
        field: &'static str,
        /// The rejected value
        value: u32,
    },
}
