//! # AppError
//!
//! Centralized error handling for the media-board services.
//! Maps domain-specific failures to actionable error types.

use thiserror::Error;

/// The primary error type for all mb-core operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing or malformed required input (e.g., empty forum name, bad id)
    #[error("{0}")]
    Validation(String),

    /// Role check failed (e.g., non-administrator creating a forum)
    #[error("{0}")]
    PermissionDenied(String),

    /// Lookup yielded nothing where a record is required
    #[error("{0} not found with ID {1}")]
    NotFound(String, String),

    /// Resource already exists (e.g., duplicate account email)
    #[error("conflict: {0}")]
    Conflict(String),

    /// Any failure of an underlying store or collaborator
    #[error("store error: {0:#}")]
    Store(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(kind: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound(kind.into(), id.to_string())
    }
}

/// A specialized Result type for media-board logic.
pub type Result<T> = std::result::Result<T, AppError>;
