//! Event payloads and how they become notification text.
//!
//! Codex passes a JSON payload as the last argument of the notify command.
//! Claude Code writes its own hook input to stdin; [`from_claude_hook_input`]
//! maps it onto the same [`Payload`] shape so rendering is shared.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::CcNotifyError;
use crate::types::Tool;

pub const TURN_COMPLETE: &str = "agent-turn-complete";
pub const TURN_PAUSED: &str = "agent-turn-paused";

const MAX_BODY_CHARS: usize = 300;
const DEFAULT_BODY: &str = "Task completed";

/// A notify event payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Payload {
    #[serde(rename = "type")]
    pub kind: String,
    pub summary: String,
    pub last_assistant_message: String,
    pub cwd: String,
    pub model: String,
    pub transcript_path: String,
}

/// Which part of the payload becomes the notification body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentMode {
    /// The summary, falling back to the last assistant message.
    #[default]
    Summary,
    /// Just "complete" or "waiting for approval".
    Complete,
    /// The last assistant message, falling back to the summary.
    Full,
}

impl ContentMode {
    /// Case-insensitive lookup. Unknown names fall back to [`ContentMode::Summary`].
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "complete" => ContentMode::Complete,
            "full" => ContentMode::Full,
            _ => ContentMode::Summary,
        }
    }
}

impl<'de> Deserialize<'de> for ContentMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self::from_name(&String::deserialize(deserializer)?))
    }
}

/// Rendering switches taken from preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub content: ContentMode,
    pub include_dir: bool,
    pub include_model: bool,
    pub include_event: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            content: ContentMode::Summary,
            include_dir: true,
            include_model: false,
            include_event: false,
        }
    }
}

/// Notification text ready to hand to a notifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub title: String,
    pub body: String,
}

/// Parse a payload, tolerating a BOM and surrounding whitespace.
pub fn parse_payload(raw: &str) -> Result<Payload, CcNotifyError> {
    let raw = raw.trim_start_matches('\u{FEFF}').trim();
    let payload: Payload = serde_json::from_str(raw)
        .map_err(|e| CcNotifyError::InvalidPayload(e.to_string()))?;
    if payload.kind.trim().is_empty() {
        return Err(CcNotifyError::InvalidPayload("missing type".into()));
    }
    Ok(payload)
}

/// Convert Claude Code hook input (stdin JSON) into a payload.
///
/// `Notification` hooks fire when Claude is waiting on the user; every other
/// hook is treated as a finished turn.
pub fn from_claude_hook_input(raw: &str) -> Result<Payload, CcNotifyError> {
    let raw = raw.trim_start_matches('\u{FEFF}').trim();
    if raw.is_empty() {
        return Err(CcNotifyError::InvalidPayload("empty claude hook input".into()));
    }
    let input: Value = serde_json::from_str(raw)
        .map_err(|e| CcNotifyError::InvalidPayload(format!("parse claude hook input: {e}")))?;

    let field = |name: &str| {
        input
            .get(name)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    let hook_event = input
        .get("hook_event_name")
        .or_else(|| input.get("hook_type"))
        .and_then(Value::as_str)
        .unwrap_or_default();

    let (kind, summary) = if hook_event == "Notification" {
        (TURN_PAUSED, field("message"))
    } else {
        let session = field("session_id");
        let summary = if session.is_empty() {
            String::new()
        } else {
            format!("Claude Code session {session} completed")
        };
        (TURN_COMPLETE, summary)
    };

    Ok(Payload {
        kind: kind.to_string(),
        summary,
        last_assistant_message: String::new(),
        cwd: field("cwd"),
        model: field("model"),
        transcript_path: field("transcript_path"),
    })
}

/// Render title and body for `payload`. Returns `None` for event types that
/// should not produce a notification.
pub fn render(payload: &Payload, tool: Tool, opts: &RenderOptions) -> Option<Rendered> {
    let paused = match payload.kind.as_str() {
        TURN_COMPLETE => false,
        TURN_PAUSED => true,
        _ => return None,
    };

    let title = if paused {
        format!("{} Needs Input", tool.display_name())
    } else {
        format!("{} Task Complete", tool.display_name())
    };

    let fallback = if paused {
        "Waiting for your approval"
    } else {
        DEFAULT_BODY
    };
    let body = match opts.content {
        ContentMode::Complete if paused => "waiting for approval".to_string(),
        ContentMode::Complete => "complete".to_string(),
        ContentMode::Full => first_non_empty(&[
            payload.last_assistant_message.as_str(),
            payload.summary.as_str(),
            fallback,
        ]),
        ContentMode::Summary => first_non_empty(&[
            payload.summary.as_str(),
            payload.last_assistant_message.as_str(),
            fallback,
        ]),
    };
    let mut body = clean_text(&body);

    if opts.include_dir
        && let Some(dir) = dir_name(&payload.cwd)
    {
        body.push_str("\nDir: ");
        body.push_str(dir);
    }
    if opts.include_model {
        let model = payload.model.trim();
        if !model.is_empty() {
            body.push_str("\nModel: ");
            body.push_str(model);
        }
    }
    if opts.include_event {
        body.push_str("\nEvent: ");
        body.push_str(&payload.kind);
    }

    Some(Rendered { title, body })
}

fn first_non_empty(values: &[&str]) -> String {
    values
        .iter()
        .map(|v| v.trim())
        .find(|v| !v.is_empty())
        .unwrap_or_default()
        .to_string()
}

/// Collapse runs of whitespace within each line, trim, and cap the length.
fn clean_text(value: &str) -> String {
    let lines: Vec<String> = value
        .replace("\r\n", "\n")
        .split('\n')
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect();
    let result = lines.join("\n").trim().to_string();

    if result.chars().count() > MAX_BODY_CHARS {
        let mut truncated: String = result.chars().take(MAX_BODY_CHARS - 3).collect();
        truncated.push_str("...");
        return truncated;
    }
    if result.is_empty() {
        return DEFAULT_BODY.to_string();
    }
    result
}

/// Last path component of `cwd`, accepting both separators.
fn dir_name(cwd: &str) -> Option<&str> {
    let trimmed = cwd.trim().trim_end_matches(['/', '\\']);
    let name = trimmed.rsplit(['/', '\\']).next()?.trim();
    if name.is_empty() || name == "." || name.ends_with(':') {
        return None;
    }
    Some(name)
}
