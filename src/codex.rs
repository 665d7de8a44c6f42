//! Codex CLI config patching: manage the top-level `notify` key in
//! `config.toml`.
//!
//! This is deliberately not a TOML parser. A full round-trip through a TOML
//! library would reformat the user's file and fail on anything it does not
//! understand elsewhere in the document. Instead the document is handled as a
//! list of lines: the root region ends at the first `[table]` header, and a
//! `notify = ...` assignment in that region is located together with any
//! continuation lines of a multi-line array. Every other line is left as is.
//!
//! Replacements are always rendered on a single line, so a hand-formatted
//! multi-line `notify` array collapses to one line when it is rewritten.

use std::path::Path;

use crate::assignment::AssignmentState;
use crate::error::CcNotifyError;
use crate::lines::{
    detect_newline, first_table_index, join_lines, split_lines, strip_bom,
    trim_leading_blank_lines,
};
use crate::patch::{HookPatcher, Patch};

const NOTIFY_KEY: &str = "notify";

/// The Codex back end of [`HookPatcher`].
#[derive(Debug, Default, Clone, Copy)]
pub struct CodexConfig;

impl HookPatcher for CodexConfig {
    fn upsert(&self, content: &str, exe_path: &Path) -> Result<Patch, CcNotifyError> {
        let exe = exe_path.to_string_lossy();
        upsert_notify(content, &[&*exe, "notify"])
    }

    fn remove(&self, content: &str) -> Result<Patch, CcNotifyError> {
        remove_notify(content)
    }
}

/// Insert or replace the top-level `notify` assignment.
///
/// `command` is the argv Codex should run, e.g. `[exe_path, "notify"]`.
pub fn upsert_notify<S: AsRef<str>>(content: &str, command: &[S]) -> Result<Patch, CcNotifyError> {
    if command.is_empty() {
        return Err(CcNotifyError::EmptyCommand);
    }

    let (bom, body) = strip_bom(content);
    let newline = detect_newline(body);
    let mut lines = split_lines(body);
    let notify_line = render_notify_line(command);

    if lines.is_empty() {
        return Ok(Patch::changed(format!("{bom}{notify_line}{newline}")));
    }

    let first_table = first_table_index(&lines);
    match find_top_level_notify(&lines[..first_table])? {
        Some((start, end)) => {
            if end - start == 1 && lines[start].trim() == notify_line {
                return Ok(Patch::unchanged(content.to_string()));
            }
            lines.splice(start..end, [notify_line]);
        }
        None if first_table == 0 => {
            // Keep a blank line between the new key and the table that
            // previously opened the file.
            lines.splice(0..0, [notify_line, String::new()]);
        }
        None => {
            lines.insert(first_table, notify_line);
        }
    }

    Ok(Patch::changed(format!("{bom}{}", join_lines(&lines, newline))))
}

/// Remove the top-level `notify` assignment, if there is one.
pub fn remove_notify(content: &str) -> Result<Patch, CcNotifyError> {
    let (bom, body) = strip_bom(content);
    let newline = detect_newline(body);
    let mut lines = split_lines(body);
    if lines.is_empty() {
        return Ok(Patch::unchanged(content.to_string()));
    }

    let first_table = first_table_index(&lines);
    let Some((start, end)) = find_top_level_notify(&lines[..first_table])? else {
        return Ok(Patch::unchanged(content.to_string()));
    };

    lines.drain(start..end);
    trim_leading_blank_lines(&mut lines);
    Ok(Patch::changed(format!("{bom}{}", join_lines(&lines, newline))))
}

/// Locate the first `notify = ...` assignment among the root lines.
///
/// Returns the half-open line span covering the assignment and its
/// continuation lines. A value that is still open when the root region ends
/// is an error: editing around it could destroy unrelated content.
fn find_top_level_notify(root: &[String]) -> Result<Option<(usize, usize)>, CcNotifyError> {
    let Some(start) = root.iter().position(|line| is_notify_assignment_start(line)) else {
        return Ok(None);
    };

    let mut state = AssignmentState::new();
    state.scan(after_equals(&root[start]));
    let mut end = start + 1;
    while state.needs_continuation() && end < root.len() {
        state.scan(&root[end]);
        end += 1;
    }
    if state.needs_continuation() {
        return Err(CcNotifyError::UnterminatedAssignment);
    }
    Ok(Some((start, end)))
}

fn is_notify_assignment_start(line: &str) -> bool {
    let trimmed = line.trim_start_matches([' ', '\t']);
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return false;
    }

    let key_end = trimmed
        .find([' ', '\t', '='])
        .unwrap_or(trimmed.len());
    if &trimmed[..key_end] != NOTIFY_KEY {
        return false;
    }

    trimmed[key_end..]
        .trim_start_matches([' ', '\t'])
        .starts_with('=')
}

fn after_equals(line: &str) -> &str {
    line.split_once('=').map_or("", |(_, value)| value)
}

/// Render `notify = ["part", ...]` on one line.
pub fn render_notify_line<S: AsRef<str>>(command: &[S]) -> String {
    let parts: Vec<String> = command
        .iter()
        .map(|part| quote_toml_string(part.as_ref()))
        .collect();
    format!("{NOTIFY_KEY} = [{}]", parts.join(", "))
}

/// Quote a TOML basic string, escaping only what must be escaped.
fn quote_toml_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}
