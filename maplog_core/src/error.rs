//! Error types for the maplog_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for maplog_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Form input rejected before a workout was created
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Location service denied or unavailable
    #[error(transparent)]
    Geolocation(#[from] GeolocationError),

    /// Storage boundary failure (quota exceeded, backend unavailable)
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// A workout id is already held by the store
    #[error("Duplicate workout id: {0}")]
    DuplicateId(String),

    /// A persisted entry could not be rebuilt into a workout
    #[error("Invalid workout record: {0}")]
    InvalidRecord(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Reason a submitted form was rejected
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} must be a number")]
    NotFinite { field: &'static str },

    #[error("{field} must be a positive number")]
    NotPositive { field: &'static str },

    #[error("unknown workout type: {0:?}")]
    UnknownType(String),
}

impl ValidationError {
    /// Message shown to the user when a submission is rejected
    pub fn user_message(&self) -> String {
        match self {
            ValidationError::UnknownType(_) => "Please choose a workout type".to_string(),
            _ => format!("Inputs have to be positive numbers! ({})", self),
        }
    }
}

/// Failure outcome of a position request
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GeolocationError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("location unavailable")]
    Unavailable,
}

impl GeolocationError {
    /// Message shown to the user when no position could be obtained
    pub fn user_message(&self) -> &'static str {
        "Could not get your position"
    }
}
