//! Desktop notifications for Codex CLI and Claude Code.
//!
//! cc-notify registers itself with both tools and turns their "turn finished"
//! and "waiting for input" events into desktop notifications.
//!
//! # Registration
//!
//! Codex reads a top-level `notify` array from `~/.codex/config.toml`; Claude
//! Code reads `hooks.Stop` and `hooks.Notification` from
//! `~/.claude/settings.json`. Both files belong to the user, so installs
//! touch as little as possible:
//!
//! - **[`codex`]** edits the TOML line by line. Only the root-level `notify`
//!   assignment is rewritten; comments, other keys, tables, a BOM and CRLF
//!   line endings survive untouched.
//! - **[`claude`]** edits the JSON document, replacing only hook entries whose
//!   command mentions `cc-notify` and leaving every other hook and setting in
//!   place.
//!
//! Both implement [`HookPatcher`], a pure `content -> content` transform. The
//! [`install`] module wraps it with file I/O under an exclusive lock.
//!
//! # Notifications
//!
//! `cc-notify notify` parses an event [`Payload`](event::Payload), renders it
//! according to the user's [`Preferences`] and hands the result to a
//! [`Notifier`]. On Windows that is a PowerShell toast or popup; elsewhere the
//! notification is logged.
//!
//! # Core library, optional CLI
//!
//! Every operation is an [`Action`] handled by [`App::handle()`]. The clap
//! adapter (the `cli` module, behind the default `clap` feature) only parses
//! arguments into an `Action`.

pub mod app;
pub mod claude;
pub mod codex;
pub mod error;
pub mod event;
pub mod install;
pub mod notifier;
pub mod patch;
pub mod paths;
pub mod prefs;
pub mod types;

mod assignment;
#[cfg(feature = "clap")]
mod cli;
mod lines;

pub use app::{App, Outcome};
#[cfg(feature = "clap")]
pub use cli::{Cli, Command, NotifyArgs, TargetArg};
pub use error::CcNotifyError;
pub use install::{FileChange, HookReport};
pub use notifier::{Notifier, NotifyMode};
pub use patch::{HookPatcher, Patch};
pub use paths::Locations;
pub use prefs::Preferences;
pub use types::{Action, PayloadSource, Target, Tool};
