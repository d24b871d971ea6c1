//! Error types for controller configuration.

use thiserror::Error;

/// Result type for controller operations.
pub type ControlResult<T> = Result<T, ControlError>;

/// Errors reported when a configuration change is rejected.
///
/// A rejected change never alters controller state.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ControlError {
    /// Invalid argument provided to a control function.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// Bound pair where `upper` does not exceed `lower`.
    #[error("Invalid {what} bounds: upper ({upper}) must be greater than lower ({lower})")]
    InvalidBounds {
        what: &'static str,
        lower: i32,
        upper: i32,
    },

    /// Integral limit whose magnitude is not greater than 1.
    #[error("Invalid max integral cumulation: {value} (magnitude must be greater than 1)")]
    InvalidMaxCumulation { value: i64 },

    /// Negative or non-finite gain.
    #[error("Invalid {what} gain: {value}")]
    InvalidGain { what: &'static str, value: f64 },
}
