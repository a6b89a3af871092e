//! Error types for the Ferret library.
//!
//! All fallible operations return [`Result`], whose error type is the
//! [`FerretError`] enum. Only the index lifecycle, the storage boundary and the
//! index-existence checks of the search operations produce errors; tokenizing,
//! scoring, fuzzy matching and faceting are infallible.
//!
//! # Examples
//!
//! ```
//! use ferret::error::{FerretError, Result};
//!
//! fn lookup(name: &str) -> Result<()> {
//!     Err(FerretError::index_not_found(name))
//! }
//!
//! let err = lookup("products").unwrap_err();
//! assert_eq!(err.code(), "INDEX_NOT_FOUND");
//! assert_eq!(err.to_string(), "Index \"products\" not found");
//! ```

use std::io;

use thiserror::Error;

/// Boxed error cause carried by [`FerretError::Storage`].
pub type BoxedCause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The main error type for Ferret operations.
#[derive(Error, Debug)]
pub enum FerretError {
    /// The named index exists in neither the cache nor storage.
    #[error("Index \"{0}\" not found")]
    IndexNotFound(String),

    /// A document looked up by id does not exist.
    #[error("Document \"{0}\" not found")]
    DocumentNotFound(String),

    /// Persistence or codec failure, with the underlying cause attached.
    #[error("Storage error: {message}")]
    Storage {
        message: String,
        #[source]
        source: Option<BoxedCause>,
    },

    /// I/O errors outside the storage boundary (config files, CLI input).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON errors outside the storage boundary.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result type alias for operations that may fail with FerretError.
pub type Result<T> = std::result::Result<T, FerretError>;

impl FerretError {
    /// Create an index-not-found error.
    pub fn index_not_found<S: Into<String>>(name: S) -> Self {
        FerretError::IndexNotFound(name.into())
    }

    /// Create a document-not-found error.
    pub fn document_not_found<S: Into<String>>(id: S) -> Self {
        FerretError::DocumentNotFound(id.into())
    }

    /// Create a storage error without an underlying cause.
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        FerretError::Storage {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a storage error wrapping the cause that produced it.
    pub fn storage_with_source<S, E>(msg: S, source: E) -> Self
    where
        S: Into<String>,
        E: Into<BoxedCause>,
    {
        FerretError::Storage {
            message: msg.into(),
            source: Some(source.into()),
        }
    }

    /// Create an invalid configuration error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        FerretError::InvalidConfig(msg.into())
    }

    /// Create an invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        FerretError::InvalidArgument(msg.into())
    }

    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            FerretError::IndexNotFound(_) => "INDEX_NOT_FOUND",
            FerretError::DocumentNotFound(_) => "DOCUMENT_NOT_FOUND",
            FerretError::Storage { .. } => "STORAGE_ERROR",
            FerretError::Io(_) => "IO_ERROR",
            FerretError::Json(_) => "JSON_ERROR",
            FerretError::InvalidConfig(_) => "INVALID_CONFIG",
            FerretError::InvalidArgument(_) => "INVALID_ARGUMENT",
        }
    }

    /// Whether this error reports a missing index or document.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            FerretError::IndexNotFound(_) | FerretError::DocumentNotFound(_)
        )
    }
}
