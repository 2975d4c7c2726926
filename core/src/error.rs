use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = MedError> = std::result::Result<T, E>;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum MedError {
    /// Missing or malformed user input.
    #[error("{field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// Malformed "HH:MM" time string.
    #[error("Invalid time '{0}'. Use 24-hour HH:MM (e.g. 09:00)")]
    Format(String),

    #[error("'{0}' is already in your medication list")]
    Duplicate(String),

    #[error("'{0}' not found")]
    NotFound(String),

    #[error("No user profile found. Run `medinote profile init` first")]
    ProfileNotFound,

    #[error("Storage error at {}: {source}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: BoxedSource,
    },
}

impl MedError {
    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub(crate) fn storage(path: impl Into<PathBuf>, source: impl Into<BoxedSource>) -> Self {
        Self::Storage {
            path: path.into(),
            source: source.into(),
        }
    }

    /// True for errors that mean "the thing you asked about does not exist".
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::ProfileNotFound)
    }
}
