//! User preferences for how notifications look and behave.
//!
//! Preferences are a confique struct, so defaults, the TOML file and
//! environment overrides are layered in one place, and `cc-notify prefs`
//! prints a commented template generated from the doc comments below.
//!
//! ```text
//! Compiled defaults     #[config(default = ...)]
//!        ↑ overridden by
//! preferences.toml      platform config dir
//!        ↑ overridden by
//! Environment vars      CC_NOTIFY_*
//! ```

use std::path::Path;

use confique::Config;
use serde::Deserialize;

use crate::error::CcNotifyError;
use crate::event::{ContentMode, RenderOptions};
use crate::notifier::NotifyMode;
use crate::types::Tool;

pub const DEFAULT_TOAST_APP_ID: &str = "cc-notify.desktop";
const LEGACY_TOAST_APP_IDS: [&str; 2] = ["Windows PowerShell", "codex-notified.desktop"];

#[derive(Config, Debug, Clone, PartialEq)]
pub struct Preferences {
    /// Send notifications at all.
    #[config(default = true, env = "CC_NOTIFY_ENABLED")]
    pub enabled: bool,

    /// How notifications are shown on Windows: "auto" (toast, falling back to
    /// a popup), "toast" or "popup".
    #[config(default = "auto", env = "CC_NOTIFY_MODE")]
    pub mode: NotifyMode,

    /// What goes in the notification body: "summary", "complete" or "full".
    #[config(default = "summary", env = "CC_NOTIFY_CONTENT")]
    pub content: ContentMode,

    /// Append the working directory name to the body.
    #[config(default = true)]
    pub include_dir: bool,

    /// Append the model name to the body.
    #[config(default = false)]
    pub include_model: bool,

    /// Append the raw event type to the body.
    #[config(default = false)]
    pub include_event: bool,

    /// Application id toasts are attributed to.
    #[config(
        default = "cc-notify.desktop",
        env = "CC_NOTIFY_TOAST_APP_ID",
        deserialize_with = normalize_app_id
    )]
    pub toast_app_id: String,

    /// Overrides for notifications coming from Codex CLI.
    #[config(nested)]
    pub codex: ToolOverrides,

    /// Overrides for notifications coming from Claude Code.
    #[config(nested)]
    pub claude: ToolOverrides,
}

/// Per-tool overrides. Unset fields fall back to the global value.
#[derive(Config, Debug, Clone, PartialEq)]
pub struct ToolOverrides {
    /// Send notifications for this tool.
    pub enabled: Option<bool>,

    /// Display mode for this tool.
    pub mode: Option<NotifyMode>,

    /// Body content for this tool.
    pub content: Option<ContentMode>,
}

/// The settings that apply to one tool after overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Effective {
    pub enabled: bool,
    pub mode: NotifyMode,
    pub content: ContentMode,
}

impl Preferences {
    /// Load from `path` (missing is fine) with `CC_NOTIFY_*` overrides.
    pub fn load(path: &Path) -> Result<Self, CcNotifyError> {
        Ok(Self::builder().env().file(path).load()?)
    }

    /// Load from `path` only, ignoring the environment.
    pub fn load_file(path: &Path) -> Result<Self, CcNotifyError> {
        Ok(Self::builder().file(path).load()?)
    }

    /// Compiled defaults only.
    pub fn defaults() -> Result<Self, CcNotifyError> {
        Ok(Self::builder().load()?)
    }

    /// Commented TOML template generated from the struct's doc comments.
    pub fn template() -> String {
        confique::toml::template::<Self>(confique::toml::FormatOptions::default())
    }

    pub fn for_tool(&self, tool: Tool) -> Effective {
        let overrides = match tool {
            Tool::Codex => &self.codex,
            Tool::Claude => &self.claude,
        };
        Effective {
            enabled: overrides.enabled.unwrap_or(self.enabled),
            mode: overrides.mode.unwrap_or(self.mode),
            content: overrides.content.unwrap_or(self.content),
        }
    }

    pub fn render_options(&self, tool: Tool) -> RenderOptions {
        RenderOptions {
            content: self.for_tool(tool).content,
            include_dir: self.include_dir,
            include_model: self.include_model,
            include_event: self.include_event,
        }
    }
}

/// Map empty and retired app ids onto the current default.
fn normalize_app_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let id = String::deserialize(deserializer)?;
    let id = id.trim();
    if id.is_empty() || LEGACY_TOAST_APP_IDS.contains(&id) {
        return Ok(DEFAULT_TOAST_APP_ID.to_string());
    }
    Ok(id.to_string())
}
