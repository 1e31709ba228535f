//! Error types for notes import and key-value storage.
//!
//! Grading itself never fails: missing reference data is a scope exclusion
//! and empty input is a classification. These types cover the two places
//! where user-supplied data can be rejected.

use std::path::PathBuf;

use thiserror::Error;

/// Reasons a notes import payload is rejected.
///
/// An import that fails with any of these leaves stored notes untouched.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The payload is not valid JSON.
    #[error("import file is not valid JSON")]
    InvalidJson(#[from] serde_json::Error),

    /// The payload is JSON but not an object.
    #[error("import file must contain a JSON object, got {0}")]
    NotAnObject(&'static str),

    /// The object has no `notes` field.
    #[error("import file has no `notes` field")]
    MissingNotes,

    /// The `notes` field is present but not a string.
    #[error("`notes` must be a string, got {0}")]
    NotesNotString(&'static str),

    /// The import file could not be read.
    #[error("failed to read import file {path}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The validated notes could not be written.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors from a key-value storage port.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("storage I/O failed at {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backing file exists but does not hold a string map.
    #[error("storage file {path} is corrupt: {message}")]
    Corrupt { path: PathBuf, message: String },
}

impl ImportError {
    /// Returns `true` if the payload itself was at fault, as opposed to the
    /// file system or the storage port.
    pub fn is_malformed_payload(&self) -> bool {
        matches!(
            self,
            ImportError::InvalidJson(_)
                | ImportError::NotAnObject(_)
                | ImportError::MissingNotes
                | ImportError::NotesNotString(_)
        )
    }
}

/// Name of a JSON value's type, for error messages.
pub(crate) fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
