use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CcNotifyError {
    #[error("notify command cannot be empty")]
    EmptyCommand,

    #[error("unterminated top-level notify assignment")]
    UnterminatedAssignment,

    #[error("Malformed settings: {reason}")]
    MalformedSettings { reason: String },

    #[error("Failed to access {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Could not determine the home directory")]
    NoHomeDir,

    #[error("Could not resolve the cc-notify executable path: {0}")]
    ExecutableNotFound(std::io::Error),

    #[error("Invalid notify payload: {0}")]
    InvalidPayload(String),

    #[error("Preferences error: {0}")]
    PreferencesError(#[from] confique::Error),

    #[error("Notification failed: {0}")]
    NotifyFailed(String),
}

impl CcNotifyError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        CcNotifyError::MalformedSettings {
            reason: reason.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CcNotifyError::IoError {
            path: path.into(),
            source,
        }
    }
}
