use std::fmt;
use std::path::PathBuf;

/// A host tool cc-notify can hook into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    /// Codex CLI, configured through `config.toml`.
    Codex,
    /// Claude Code, configured through `settings.json`.
    Claude,
}

impl Tool {
    pub const ALL: [Tool; 2] = [Tool::Codex, Tool::Claude];

    pub fn name(self) -> &'static str {
        match self {
            Tool::Codex => "codex",
            Tool::Claude => "claude",
        }
    }

    /// What the registration is called in user-facing messages.
    pub fn hook_noun(self) -> &'static str {
        match self {
            Tool::Codex => "notify command",
            Tool::Claude => "hook",
        }
    }

    pub fn file_noun(self) -> &'static str {
        match self {
            Tool::Codex => "config file",
            Tool::Claude => "settings file",
        }
    }

    /// Product name used in notification titles.
    pub fn display_name(self) -> &'static str {
        match self {
            Tool::Codex => "Codex",
            Tool::Claude => "Claude Code",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which tools an install or uninstall applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Target {
    #[default]
    All,
    Only(Tool),
}

impl Target {
    pub fn tools(self) -> Vec<Tool> {
        match self {
            Target::All => Tool::ALL.to_vec(),
            Target::Only(tool) => vec![tool],
        }
    }
}

/// Where a `notify` invocation reads its event payload from.
#[derive(Debug, Clone, PartialEq)]
pub enum PayloadSource {
    /// JSON passed on the command line (Codex appends it as the last argument).
    Inline(String),
    /// JSON read from a file.
    File(PathBuf),
    /// Base64-encoded JSON.
    Base64(String),
    /// Claude Code hook input on stdin.
    ClaudeStdin,
}

/// A cc-notify operation, independent of any CLI framework.
/// The CLI layer converts parsed clap args into this.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Install { target: Target },
    Uninstall { target: Target },
    Notify { source: PayloadSource },
    TestNotify {
        title: Option<String>,
        body: Option<String>,
        toast: bool,
    },
    Preferences { show_path: bool },
}
