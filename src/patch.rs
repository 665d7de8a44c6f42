//! The contract shared by both config back ends.
//!
//! Each host tool stores its hook registration in a different format, but the
//! installer only ever needs two operations: register this executable, or
//! remove every registration of it. Both return the full replacement text and
//! whether it should be written back, so callers can skip a no-op write.

use std::path::Path;

use crate::error::CcNotifyError;

/// Outcome of patching a document in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    /// The complete document text to write back.
    pub content: String,
    /// Whether the caller should write `content` back.
    pub changed: bool,
}

impl Patch {
    pub fn changed(content: String) -> Self {
        Self {
            content,
            changed: true,
        }
    }

    pub fn unchanged(content: String) -> Self {
        Self {
            content,
            changed: false,
        }
    }
}

/// A config format that can register and unregister cc-notify.
///
/// Implementations are pure: no I/O, no logging, no shared state.
pub trait HookPatcher {
    /// Insert or replace the registration pointing at `exe_path`.
    fn upsert(&self, content: &str, exe_path: &Path) -> Result<Patch, CcNotifyError>;

    /// Remove any registration, leaving everything else in place.
    fn remove(&self, content: &str) -> Result<Patch, CcNotifyError>;
}
