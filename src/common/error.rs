//! Error types for push_planner

use thiserror::Error;

use crate::planning::configuration::Slot;

/// Main error type for planning and validation
#[derive(Error, Debug)]
pub enum PushError {
    /// The problem layout is malformed
    #[error("Invalid problem: {0}")]
    InvalidProblem(String),
    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    /// Path planning failed
    #[error("Planning error: {0}")]
    Planning(String),
    /// A sample could not be added to the roadmap
    #[error("Insert failed: {0}")]
    Insert(#[from] InsertError),
}

/// Recoverable reasons for a rejected roadmap insertion.
///
/// Callers are expected to draw a fresh sample and try again.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InsertError {
    #[error("no nearest configuration in the roadmap")]
    NoNearestConfiguration,
    #[error("no legal extension for {slot:?} from {from} towards {to}")]
    NoLegalExtension { slot: Slot, from: f64, to: f64 },
}

/// Result type alias for planning and validation
pub type PushResult<T> = Result<T, PushError>;
