//! Default file locations.
//!
//! Codex and Claude Code keep their config under dot-directories in the home
//! directory on every platform. cc-notify's own preferences live in the
//! platform config directory (XDG on Linux, `~/Library/Application Support`
//! on macOS, `%APPDATA%` on Windows).

use std::path::{Path, PathBuf};

use crate::error::CcNotifyError;

pub const APP_NAME: &str = "cc-notify";
const PREFERENCES_FILE: &str = "preferences.toml";

/// Where each config file lives.
#[derive(Debug, Clone, PartialEq)]
pub struct Locations {
    /// Codex CLI `config.toml`.
    pub codex_config: PathBuf,
    /// Claude Code `settings.json`.
    pub claude_settings: PathBuf,
    /// cc-notify's own preferences file.
    pub preferences: PathBuf,
}

impl Locations {
    /// Resolve the default locations for the current user.
    ///
    /// `CODEX_HOME`, when set and non-empty, replaces `~/.codex`.
    pub fn discover() -> Result<Self, CcNotifyError> {
        let user = directories::UserDirs::new().ok_or(CcNotifyError::NoHomeDir)?;
        let codex_home = std::env::var_os("CODEX_HOME")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        let preferences = directories::ProjectDirs::from("", "", APP_NAME)
            .map(|proj| proj.config_dir().join(PREFERENCES_FILE))
            .unwrap_or_else(|| user.home_dir().join(".cc-notify").join(PREFERENCES_FILE));

        Ok(Self::from_home(user.home_dir(), codex_home, preferences))
    }

    /// Build locations relative to an explicit home directory.
    pub fn from_home(home: &Path, codex_home: Option<PathBuf>, preferences: PathBuf) -> Self {
        let codex_home = codex_home.unwrap_or_else(|| home.join(".codex"));
        Self {
            codex_config: codex_home.join("config.toml"),
            claude_settings: home.join(".claude").join("settings.json"),
            preferences,
        }
    }

    /// Everything under one directory. Useful in tests.
    pub fn under(root: &Path) -> Self {
        Self::from_home(root, None, root.join(APP_NAME).join(PREFERENCES_FILE))
    }
}
