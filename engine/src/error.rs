//! Error types for the Rollstock engine.

use thiserror::Error;

/// All possible errors from the Rollstock engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("unknown record field: {0}")]
    UnknownField(String),

    #[error("record has no cacheable key (empty sku and package id)")]
    MissingKey,
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
