//! Clap adapter.
//!
//! Compiled only with the `clap` feature (on by default). The parsed
//! [`Cli`] is turned into a framework-agnostic [`Action`] by
//! [`Cli::into_action()`]; everything after that goes through
//! [`App::handle()`](crate::App::handle).

use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};

use crate::types::{Action, PayloadSource, Target, Tool};

/// Desktop notifications for Codex CLI and Claude Code.
#[derive(Debug, Parser)]
#[command(name = "cc-notify", version)]
pub struct Cli {
    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Register cc-notify in the Codex config and Claude Code settings.
    Install {
        #[arg(value_enum, default_value_t = TargetArg::All)]
        target: TargetArg,
    },
    /// Remove cc-notify from the Codex config and Claude Code settings.
    Uninstall {
        #[arg(value_enum, default_value_t = TargetArg::All)]
        target: TargetArg,
    },
    /// Show a notification for an event payload.
    Notify(NotifyArgs),
    /// Send a test notification.
    TestNotify {
        title: Option<String>,
        body: Option<String>,
        /// Force a toast instead of the configured mode.
        #[arg(long)]
        toast: bool,
    },
    /// Print a commented preferences template.
    Prefs {
        /// Print the preferences file location instead.
        #[arg(long)]
        path: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TargetArg {
    All,
    Codex,
    Claude,
}

/// Where `notify` gets its payload. At most one source may be given.
#[derive(Debug, Args)]
#[command(group(ArgGroup::new("source").args(["claude", "file", "b64", "payload"])))]
pub struct NotifyArgs {
    /// Read Claude Code hook input from stdin.
    #[arg(long)]
    pub claude: bool,

    /// Read the payload JSON from a file.
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Base64-encoded payload JSON.
    #[arg(long, value_name = "BASE64")]
    pub b64: Option<String>,

    /// Payload JSON. Multiple arguments are joined with spaces.
    #[arg(allow_hyphen_values = true)]
    pub payload: Vec<String>,
}

impl From<TargetArg> for Target {
    fn from(arg: TargetArg) -> Self {
        match arg {
            TargetArg::All => Target::All,
            TargetArg::Codex => Target::Only(Tool::Codex),
            TargetArg::Claude => Target::Only(Tool::Claude),
        }
    }
}

impl NotifyArgs {
    fn into_source(self) -> PayloadSource {
        if self.claude {
            return PayloadSource::ClaudeStdin;
        }
        if let Some(path) = self.file {
            return PayloadSource::File(path);
        }
        if let Some(encoded) = self.b64 {
            return PayloadSource::Base64(encoded);
        }
        PayloadSource::Inline(self.payload.join(" "))
    }
}

impl Cli {
    /// Convert clap-parsed args into a framework-agnostic `Action`.
    pub fn into_action(self) -> Action {
        match self.command {
            Command::Install { target } => Action::Install {
                target: target.into(),
            },
            Command::Uninstall { target } => Action::Uninstall {
                target: target.into(),
            },
            Command::Notify(args) => Action::Notify {
                source: args.into_source(),
            },
            Command::TestNotify { title, body, toast } => Action::TestNotify { title, body, toast },
            Command::Prefs { path } => Action::Preferences { show_path: path },
        }
    }
}
