//! Install and uninstall: read a host tool's config file, patch it, write it
//! back when something changed.
//!
//! The patching itself is pure (see [`HookPatcher`]). This module owns the
//! I/O around it. The whole read-modify-write cycle runs under an exclusive
//! lock on a `<file>.lock` sibling, so two concurrent installs against the
//! same path cannot drop each other's change. New content goes to a
//! `<file>.cc-notify.tmp` sibling first and is renamed over the target only
//! once it is fully on disk; a failed write leaves the old file intact.

use std::ffi::OsString;
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::debug;

use crate::claude::ClaudeSettings;
use crate::codex::CodexConfig;
use crate::error::CcNotifyError;
use crate::patch::{HookPatcher, Patch};
use crate::paths::Locations;
use crate::types::Tool;

/// What happened to a config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileChange {
    /// The file was rewritten (or created).
    Written,
    /// The file already had the desired content; nothing was written.
    Unchanged,
    /// Uninstall found no file to patch.
    Missing,
}

/// Install or uninstall.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Install,
    Uninstall,
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Op::Install => f.write_str("install"),
            Op::Uninstall => f.write_str("uninstall"),
        }
    }
}

/// Result of installing into or uninstalling from one tool. Returned to the
/// caller for display.
#[derive(Debug, Clone, PartialEq)]
pub struct HookReport {
    pub tool: Tool,
    pub op: Op,
    pub path: PathBuf,
    pub change: FileChange,
}

impl fmt::Display for HookReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tool = self.tool;
        let noun = tool.hook_noun();
        let path = self.path.display();
        match (self.op, self.change) {
            (Op::Install, FileChange::Written) => write!(f, "{tool}: installed {noun} in {path}"),
            (Op::Install, _) => write!(f, "{tool}: {noun} already configured"),
            (Op::Uninstall, FileChange::Written) => {
                write!(f, "{tool}: removed {noun} from {path}")
            }
            (Op::Uninstall, FileChange::Unchanged) => write!(f, "{tool}: {noun} not configured"),
            (Op::Uninstall, FileChange::Missing) => write!(
                f,
                "{tool}: {} not found, nothing to uninstall",
                tool.file_noun()
            ),
        }
    }
}

impl Tool {
    /// The config format this tool uses.
    pub fn patcher(self) -> &'static dyn HookPatcher {
        match self {
            Tool::Codex => &CodexConfig,
            Tool::Claude => &ClaudeSettings,
        }
    }

    /// This tool's config file among `locations`.
    pub fn config_path(self, locations: &Locations) -> &Path {
        match self {
            Tool::Codex => &locations.codex_config,
            Tool::Claude => &locations.claude_settings,
        }
    }
}

/// Register `exe_path` with `tool`.
pub fn install_tool(
    tool: Tool,
    locations: &Locations,
    exe_path: &Path,
) -> Result<HookReport, CcNotifyError> {
    let path = tool.config_path(locations);
    let change = install(path, tool.patcher(), exe_path)?;
    Ok(HookReport {
        tool,
        op: Op::Install,
        path: path.to_path_buf(),
        change,
    })
}

/// Remove cc-notify's registration from `tool`.
pub fn uninstall_tool(tool: Tool, locations: &Locations) -> Result<HookReport, CcNotifyError> {
    let path = tool.config_path(locations);
    let change = uninstall(path, tool.patcher())?;
    Ok(HookReport {
        tool,
        op: Op::Uninstall,
        path: path.to_path_buf(),
        change,
    })
}

const LOCK_SUFFIX: &str = "lock";
const TEMP_SUFFIX: &str = "cc-notify.tmp";

/// Upsert the registration in the file at `path`, creating it and its parent
/// directories if needed.
pub fn install(
    path: &Path,
    patcher: &dyn HookPatcher,
    exe_path: &Path,
) -> Result<FileChange, CcNotifyError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| CcNotifyError::io(parent, e))?;
    }

    let _lock = lock_sibling(path)?;
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(CcNotifyError::io(path, e)),
    };
    write_patch(path, patcher.upsert(&content, exe_path)?)
}

/// Remove the registration from the file at `path`. A missing file is not an
/// error.
pub fn uninstall(path: &Path, patcher: &dyn HookPatcher) -> Result<FileChange, CcNotifyError> {
    if !path.exists() {
        debug!(path = %path.display(), "config file not found");
        return Ok(FileChange::Missing);
    }

    let _lock = lock_sibling(path)?;
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(FileChange::Missing),
        Err(e) => return Err(CcNotifyError::io(path, e)),
    };
    write_patch(path, patcher.remove(&content)?)
}

/// `<path>.<suffix>` in the same directory.
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".");
    name.push(suffix);
    path.with_file_name(name)
}

/// Exclusive lock held until the returned handle is dropped.
fn lock_sibling(path: &Path) -> Result<File, CcNotifyError> {
    let lock_path = sibling(path, LOCK_SUFFIX);
    let lock_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&lock_path)
        .map_err(|e| CcNotifyError::io(&lock_path, e))?;
    lock_file
        .lock_exclusive()
        .map_err(|e| CcNotifyError::io(&lock_path, e))?;
    Ok(lock_file)
}

fn write_patch(path: &Path, patch: Patch) -> Result<FileChange, CcNotifyError> {
    if !patch.changed {
        debug!(path = %path.display(), "config already up to date");
        return Ok(FileChange::Unchanged);
    }

    replace(path, &patch.content)?;
    debug!(path = %path.display(), bytes = patch.content.len(), "config rewritten");
    Ok(FileChange::Written)
}

/// Write `content` to a temp sibling, then rename it over `path`. A symlinked
/// config is replaced at its destination so the link survives.
fn replace(path: &Path, content: &str) -> Result<(), CcNotifyError> {
    let target = match fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_symlink() => {
            fs::canonicalize(path).map_err(|e| CcNotifyError::io(path, e))?
        }
        _ => path.to_path_buf(),
    };
    let temp = sibling(&target, TEMP_SUFFIX);

    let result = write_temp(&temp, &target, content).and_then(|()| fs::rename(&temp, &target));
    if let Err(e) = result {
        if let Err(cleanup) = fs::remove_file(&temp) {
            debug!(temp = %temp.display(), error = %cleanup, "temp file not removed");
        }
        return Err(CcNotifyError::io(&target, e));
    }
    Ok(())
}

fn write_temp(temp: &Path, target: &Path, content: &str) -> io::Result<()> {
    let mut file = File::create(temp)?;
    file.write_all(content.as_bytes())?;
    file.sync_all()?;
    if let Ok(meta) = fs::metadata(target) {
        fs::set_permissions(temp, meta.permissions())?;
    }
    Ok(())
}
