//! Claude Code settings patching: manage cc-notify entries under `hooks` in
//! `settings.json`.
//!
//! The settings file is decoded into an untyped [`serde_json::Value`] so that
//! every key this module does not know about (permissions, env, other tools'
//! hooks, extra fields inside hook entries) survives the round trip. Only the
//! matcher-group lists of the [`HOOK_EVENTS`] are touched, and within them
//! only entries whose command contains [`HOOK_MARKER`].
//!
//! ```text
//! { "hooks": { "Stop": [ { "matcher": "", "hooks": [ { "type": "command",
//!                                                      "command": "... notify --claude" } ] } ] } }
//! ```

use std::path::Path;

use serde_json::{Map, Value, json};

use crate::error::CcNotifyError;
use crate::patch::{HookPatcher, Patch};

/// Substring identifying a hook command as ours.
pub const HOOK_MARKER: &str = "cc-notify";

/// Hook events cc-notify registers for: task finished, and permission or
/// idle prompts.
pub const HOOK_EVENTS: [&str; 2] = ["Stop", "Notification"];

const HOOKS_KEY: &str = "hooks";

/// The Claude Code back end of [`HookPatcher`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ClaudeSettings;

impl HookPatcher for ClaudeSettings {
    fn upsert(&self, content: &str, exe_path: &Path) -> Result<Patch, CcNotifyError> {
        upsert_hooks(content, &exe_path.to_string_lossy())
    }

    fn remove(&self, content: &str) -> Result<Patch, CcNotifyError> {
        remove_hooks(content)
    }
}

/// The command Claude Code runs for each registered event.
pub fn hook_command(exe_path: &str) -> String {
    format!("{exe_path} notify --claude")
}

/// Register cc-notify for every hook event, replacing earlier registrations.
///
/// Always reports a change: the fresh entry is appended after any foreign
/// groups, even when an identical one was just stripped.
pub fn upsert_hooks(content: &str, exe_path: &str) -> Result<Patch, CcNotifyError> {
    let mut root = parse_settings(content)?;
    let mut hooks = take_hooks(&mut root)?;
    let command = hook_command(exe_path);

    for event in HOOK_EVENTS {
        let (mut groups, _) = strip_our_hooks(matcher_groups(&hooks, event)?);
        groups.push(json!({
            "matcher": "",
            "hooks": [{ "type": "command", "command": command.as_str() }],
        }));
        hooks.insert(event.to_string(), Value::Array(groups));
    }

    root.insert(HOOKS_KEY.to_string(), Value::Object(hooks));
    Ok(Patch::changed(serialize(root)?))
}

/// Remove every cc-notify hook entry.
///
/// Event lists left empty are deleted, and so is `hooks` itself once it has
/// no events left. If nothing matched, the input is returned as is.
pub fn remove_hooks(content: &str) -> Result<Patch, CcNotifyError> {
    let mut root = parse_settings(content)?;
    let mut hooks = take_hooks(&mut root)?;
    let mut any_changed = false;

    for event in HOOK_EVENTS {
        let (groups, removed) = strip_our_hooks(matcher_groups(&hooks, event)?);
        if !removed {
            continue;
        }
        any_changed = true;
        if groups.is_empty() {
            hooks.remove(event);
        } else {
            hooks.insert(event.to_string(), Value::Array(groups));
        }
    }

    if !any_changed {
        return Ok(Patch::unchanged(content.to_string()));
    }

    if !hooks.is_empty() {
        root.insert(HOOKS_KEY.to_string(), Value::Object(hooks));
    }
    Ok(Patch::changed(serialize(root)?))
}

fn parse_settings(content: &str) -> Result<Map<String, Value>, CcNotifyError> {
    let content = content.trim_start_matches('\u{FEFF}').trim();
    if content.is_empty() {
        return Ok(Map::new());
    }

    let value: Value = serde_json::from_str(content)
        .map_err(|e| CcNotifyError::malformed(format!("parse claude settings: {e}")))?;
    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        other => Err(CcNotifyError::malformed(format!(
            "claude settings must be a JSON object, found {}",
            kind(&other)
        ))),
    }
}

/// Detach the `hooks` mapping from the root; callers put it back if needed.
fn take_hooks(root: &mut Map<String, Value>) -> Result<Map<String, Value>, CcNotifyError> {
    match root.remove(HOOKS_KEY) {
        None | Some(Value::Null) => Ok(Map::new()),
        Some(Value::Object(hooks)) => Ok(hooks),
        Some(other) => Err(CcNotifyError::malformed(format!(
            "parse hooks: expected an object, found {}",
            kind(&other)
        ))),
    }
}

fn matcher_groups(hooks: &Map<String, Value>, event: &str) -> Result<Vec<Value>, CcNotifyError> {
    match hooks.get(event) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(groups)) => Ok(groups.clone()),
        Some(other) => Err(CcNotifyError::malformed(format!(
            "parse hook event {event}: expected an array, found {}",
            kind(other)
        ))),
    }
}

/// Drop our entries from each matcher group.
///
/// A group that only held our entries is dropped with them; groups that keep
/// foreign entries, or never had any entries, stay where they are. Returns
/// whether anything was removed.
fn strip_our_hooks(groups: Vec<Value>) -> (Vec<Value>, bool) {
    let mut changed = false;
    let mut kept = Vec::with_capacity(groups.len());

    for mut group in groups {
        let Some(entries) = group.get_mut(HOOKS_KEY).and_then(Value::as_array_mut) else {
            kept.push(group);
            continue;
        };

        let before = entries.len();
        entries.retain(|entry| !is_our_hook(entry));
        if entries.len() == before {
            kept.push(group);
            continue;
        }

        changed = true;
        if !entries.is_empty() {
            kept.push(group);
        }
    }

    (kept, changed)
}

fn is_our_hook(entry: &Value) -> bool {
    entry
        .get("command")
        .and_then(Value::as_str)
        .is_some_and(|command| command.contains(HOOK_MARKER))
}

fn serialize(root: Map<String, Value>) -> Result<String, CcNotifyError> {
    let mut out = serde_json::to_string_pretty(&Value::Object(root))
        .map_err(|e| CcNotifyError::malformed(format!("serialize claude settings: {e}")))?;
    out.push('\n');
    Ok(out)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
