//! Dispatch for [`Action`]s.
//!
//! [`App::handle`] is the single entry point the binary calls after parsing
//! arguments. It returns an [`Outcome`] for the caller to print; nothing in
//! here writes to stdout.

use std::fmt;
use std::io::Read;
use std::path::PathBuf;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::debug;

use crate::error::CcNotifyError;
use crate::event::{self, Payload};
use crate::install::{self, HookReport, Op};
use crate::notifier::{self, NotifyMode, Notifier};
use crate::paths::Locations;
use crate::prefs::Preferences;
use crate::types::{Action, PayloadSource, Target, Tool};

const TEST_TITLE: &str = "cc-notify Notification Test";
const TEST_BODY: &str = "cc-notify is ready";
const TOAST_TEST_TITLE: &str = "cc-notify Toast Test";
const TOAST_TEST_BODY: &str = "toast mode test from cc-notify";

/// One tool that failed during an install or uninstall over every tool.
#[derive(Debug)]
pub struct ToolFailure {
    pub tool: Tool,
    pub op: Op,
    pub error: CcNotifyError,
}

impl fmt::Display for ToolFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  {} {}: {}", self.tool, self.op, self.error)
    }
}

/// Result of handling an action. Returned to the caller for display.
#[derive(Debug)]
pub enum Outcome {
    /// Install or uninstall results, plus per-tool failures when every tool
    /// was targeted.
    Hooks {
        reports: Vec<HookReport>,
        failures: Vec<ToolFailure>,
    },
    /// A notification was shown.
    Notified { kind: String, tool: Tool },
    /// Preferences turned notifications off for this tool.
    Disabled(Tool),
    /// The event type does not produce a notification.
    Ignored { kind: String },
    /// A test notification was shown.
    TestSent,
    /// The commented preferences template.
    Template(String),
    /// Where the preferences file lives.
    PreferencesPath(PathBuf),
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Hooks { reports, .. } => {
                for (i, report) in reports.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{report}")?;
                }
                Ok(())
            }
            Outcome::Notified { kind, tool } => write!(f, "notification sent: {kind} ({tool})"),
            Outcome::Disabled(tool) => write!(f, "notifications disabled for {tool}"),
            Outcome::Ignored { kind } => write!(f, "ignored event type: {kind}"),
            Outcome::TestSent => write!(f, "test notification sent"),
            Outcome::Template(t) => write!(f, "{t}"),
            Outcome::PreferencesPath(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Everything an action needs from the environment.
pub struct App {
    locations: Locations,
    exe_path: Option<PathBuf>,
    notifier: Option<Box<dyn Notifier>>,
    use_env: bool,
}

impl App {
    pub fn new(locations: Locations) -> Self {
        Self {
            locations,
            exe_path: None,
            notifier: None,
            use_env: true,
        }
    }

    /// Default locations for the current user.
    pub fn discover() -> Result<Self, CcNotifyError> {
        Ok(Self::new(Locations::discover()?))
    }

    /// Register this path instead of the running executable.
    pub fn exe_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.exe_path = Some(path.into());
        self
    }

    /// Show notifications through `notifier` instead of the platform default.
    pub fn notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Ignore `CC_NOTIFY_*` variables when loading preferences.
    pub fn no_env(mut self) -> Self {
        self.use_env = false;
        self
    }

    pub fn locations(&self) -> &Locations {
        &self.locations
    }

    pub fn handle(&self, action: &Action, stdin: &mut dyn Read) -> Result<Outcome, CcNotifyError> {
        match action {
            Action::Install { target } => {
                let exe = self.resolve_exe()?;
                self.for_each_tool(*target, Op::Install, |tool| {
                    install::install_tool(tool, &self.locations, &exe)
                })
            }
            Action::Uninstall { target } => self.for_each_tool(*target, Op::Uninstall, |tool| {
                install::uninstall_tool(tool, &self.locations)
            }),
            Action::Notify { source } => self.notify(source, stdin),
            Action::TestNotify { title, body, toast } => {
                self.test_notify(title.as_deref(), body.as_deref(), *toast)
            }
            Action::Preferences { show_path: true } => {
                Ok(Outcome::PreferencesPath(self.locations.preferences.clone()))
            }
            Action::Preferences { show_path: false } => Ok(Outcome::Template(Preferences::template())),
        }
    }

    /// Run `f` for every targeted tool. With [`Target::All`] a failing tool is
    /// collected and the rest still run; a single named tool fails outright.
    fn for_each_tool<F>(&self, target: Target, op: Op, f: F) -> Result<Outcome, CcNotifyError>
    where
        F: Fn(Tool) -> Result<HookReport, CcNotifyError>,
    {
        let mut reports = Vec::new();
        let mut failures = Vec::new();
        for tool in target.tools() {
            match f(tool) {
                Ok(report) => reports.push(report),
                Err(error) if target == Target::All => {
                    debug!(%tool, %op, %error, "tool failed");
                    failures.push(ToolFailure { tool, op, error });
                }
                Err(error) => return Err(error),
            }
        }
        Ok(Outcome::Hooks { reports, failures })
    }

    fn resolve_exe(&self) -> Result<PathBuf, CcNotifyError> {
        if let Some(path) = &self.exe_path {
            return Ok(path.clone());
        }
        let exe = std::env::current_exe().map_err(CcNotifyError::ExecutableNotFound)?;
        let exe = std::path::absolute(&exe).map_err(CcNotifyError::ExecutableNotFound)?;
        debug!(exe = %exe.display(), "resolved executable");
        Ok(exe)
    }

    fn preferences(&self) -> Result<Preferences, CcNotifyError> {
        if self.use_env {
            Preferences::load(&self.locations.preferences)
        } else {
            Preferences::load_file(&self.locations.preferences)
        }
    }

    fn notifier_for(&self, mode: NotifyMode, app_id: &str) -> Box<dyn Notifier + '_> {
        match &self.notifier {
            Some(n) => Box::new(Borrowed(n.as_ref())),
            None => notifier::default_notifier(mode, app_id),
        }
    }

    fn notify(&self, source: &PayloadSource, stdin: &mut dyn Read) -> Result<Outcome, CcNotifyError> {
        let (tool, payload) = read_payload(source, stdin)?;
        let prefs = self.preferences()?;

        let effective = prefs.for_tool(tool);
        if !effective.enabled {
            return Ok(Outcome::Disabled(tool));
        }

        let Some(rendered) = event::render(&payload, tool, &prefs.render_options(tool)) else {
            debug!(kind = %payload.kind, "event type not rendered");
            return Ok(Outcome::Ignored { kind: payload.kind });
        };

        self.notifier_for(effective.mode, &prefs.toast_app_id)
            .notify(&rendered.title, &rendered.body)?;
        Ok(Outcome::Notified {
            kind: payload.kind,
            tool,
        })
    }

    fn test_notify(
        &self,
        title: Option<&str>,
        body: Option<&str>,
        toast: bool,
    ) -> Result<Outcome, CcNotifyError> {
        let prefs = self.preferences()?;
        let (mode, default_title, default_body) = if toast {
            (NotifyMode::Toast, TOAST_TEST_TITLE, TOAST_TEST_BODY)
        } else {
            (prefs.mode, TEST_TITLE, TEST_BODY)
        };
        let title = non_blank(title).unwrap_or(default_title);
        let body = non_blank(body).unwrap_or(default_body);

        self.notifier_for(mode, &prefs.toast_app_id)
            .notify(title, body)?;
        Ok(Outcome::TestSent)
    }
}

/// Lets a stored notifier be handed out behind a fresh box.
struct Borrowed<'a>(&'a dyn Notifier);

impl Notifier for Borrowed<'_> {
    fn notify(&self, title: &str, body: &str) -> Result<(), CcNotifyError> {
        self.0.notify(title, body)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn read_payload(
    source: &PayloadSource,
    stdin: &mut dyn Read,
) -> Result<(Tool, Payload), CcNotifyError> {
    let raw = match source {
        PayloadSource::ClaudeStdin => {
            let mut input = String::new();
            stdin
                .read_to_string(&mut input)
                .map_err(|e| CcNotifyError::io("<stdin>", e))?;
            return Ok((Tool::Claude, event::from_claude_hook_input(&input)?));
        }
        PayloadSource::Inline(raw) => raw.clone(),
        PayloadSource::File(path) => {
            std::fs::read_to_string(path).map_err(|e| CcNotifyError::io(path, e))?
        }
        PayloadSource::Base64(encoded) => {
            let bytes = STANDARD
                .decode(encoded.trim())
                .map_err(|e| CcNotifyError::InvalidPayload(format!("decode base64 payload: {e}")))?;
            String::from_utf8(bytes)
                .map_err(|e| CcNotifyError::InvalidPayload(format!("decode base64 payload: {e}")))?
        }
    };

    if raw.trim().is_empty() {
        return Err(CcNotifyError::InvalidPayload(
            "notify payload argument is required".into(),
        ));
    }
    Ok((Tool::Codex, event::parse_payload(&raw)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::fs;
    use std::io::Cursor;
    use std::rc::Rc;
    use tempfile::TempDir;

    type Sent = Rc<RefCell<Vec<(String, String)>>>;

    struct Recorder(Sent);

    impl Notifier for Recorder {
        fn notify(&self, title: &str, body: &str) -> Result<(), CcNotifyError> {
            self.0.borrow_mut().push((title.to_string(), body.to_string()));
            Ok(())
        }
    }

    struct Failing;

    impl Notifier for Failing {
        fn notify(&self, _: &str, _: &str) -> Result<(), CcNotifyError> {
            Err(CcNotifyError::NotifyFailed("no display".into()))
        }
    }

    fn app(dir: &TempDir) -> (App, Sent) {
        let sent = Sent::default();
        let app = App::new(Locations::under(dir.path()))
            .exe_path("/opt/bin/cc-notify")
            .notifier(Box::new(Recorder(sent.clone())))
            .no_env();
        (app, sent)
    }

    fn run(app: &App, action: Action) -> Result<Outcome, CcNotifyError> {
        app.handle(&action, &mut Cursor::new(Vec::new()))
    }

    fn inline(json: &str) -> Action {
        Action::Notify {
            source: PayloadSource::Inline(json.into()),
        }
    }

    #[test]
    fn install_all_then_uninstall_all() {
        let dir = TempDir::new().unwrap();
        let (app, _) = app(&dir);

        let outcome = run(&app, Action::Install { target: Target::All }).unwrap();
        let Outcome::Hooks { reports, failures } = &outcome else {
            panic!("expected hooks outcome");
        };
        assert_eq!(reports.len(), 2);
        assert!(failures.is_empty());
        let text = outcome.to_string();
        assert!(text.contains("codex: installed notify command in"));
        assert!(text.contains("claude: installed hook in"));

        let codex = fs::read_to_string(&app.locations().codex_config).unwrap();
        assert_eq!(codex, "notify = [\"/opt/bin/cc-notify\", \"notify\"]\n");
        let claude = fs::read_to_string(&app.locations().claude_settings).unwrap();
        assert!(claude.contains("/opt/bin/cc-notify notify --claude"));

        let outcome = run(&app, Action::Uninstall { target: Target::All }).unwrap();
        assert!(outcome.to_string().contains("claude: removed hook from"));
        assert_eq!(fs::read_to_string(&app.locations().codex_config).unwrap(), "");
    }

    #[test]
    fn all_target_collects_failures() {
        let dir = TempDir::new().unwrap();
        let (app, _) = app(&dir);
        let settings = &app.locations().claude_settings;
        fs::create_dir_all(settings.parent().unwrap()).unwrap();
        fs::write(settings, "[1, 2]").unwrap();

        let outcome = run(&app, Action::Install { target: Target::All }).unwrap();
        let Outcome::Hooks { reports, failures } = outcome else {
            panic!("expected hooks outcome");
        };
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].tool, Tool::Codex);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].tool, Tool::Claude);
        assert!(failures[0].to_string().starts_with("  claude install: "));
    }

    #[test]
    fn named_target_propagates_failure() {
        let dir = TempDir::new().unwrap();
        let (app, _) = app(&dir);
        let settings = &app.locations().claude_settings;
        fs::create_dir_all(settings.parent().unwrap()).unwrap();
        fs::write(settings, "{ broken").unwrap();

        let result = run(
            &app,
            Action::Install {
                target: Target::Only(Tool::Claude),
            },
        );
        assert!(matches!(result, Err(CcNotifyError::MalformedSettings { .. })));
    }

    #[test]
    fn notify_inline_codex_payload() {
        let dir = TempDir::new().unwrap();
        let (app, sent) = app(&dir);

        let outcome = run(
            &app,
            inline(r#"{"type":"agent-turn-complete","summary":"Refactored parser","cwd":"/src/app"}"#),
        )
        .unwrap();
        assert_eq!(outcome.to_string(), "notification sent: agent-turn-complete (codex)");
        assert_eq!(
            sent.borrow().as_slice(),
            [(
                "Codex Task Complete".to_string(),
                "Refactored parser\nDir: app".to_string()
            )]
        );
    }

    #[test]
    fn notify_from_file_and_base64() {
        let dir = TempDir::new().unwrap();
        let (app, sent) = app(&dir);
        let json = r#"{"type":"agent-turn-paused","summary":"Approve rm?"}"#;

        let path = dir.path().join("payload.json");
        fs::write(&path, json).unwrap();
        run(
            &app,
            Action::Notify {
                source: PayloadSource::File(path),
            },
        )
        .unwrap();
        run(
            &app,
            Action::Notify {
                source: PayloadSource::Base64(STANDARD.encode(json)),
            },
        )
        .unwrap();

        let sent = sent.borrow();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0], sent[1]);
        assert_eq!(sent[0].0, "Codex Needs Input");
        assert_eq!(sent[0].1, "Approve rm?");
    }

    #[test]
    fn notify_rejects_bad_base64() {
        let dir = TempDir::new().unwrap();
        let (app, _) = app(&dir);
        let result = run(
            &app,
            Action::Notify {
                source: PayloadSource::Base64("***".into()),
            },
        );
        assert!(matches!(result, Err(CcNotifyError::InvalidPayload(_))));
    }

    #[test]
    fn notify_requires_payload() {
        let dir = TempDir::new().unwrap();
        let (app, _) = app(&dir);
        assert!(matches!(
            run(&app, inline("   ")),
            Err(CcNotifyError::InvalidPayload(_))
        ));
    }

    #[test]
    fn notify_claude_reads_stdin() {
        let dir = TempDir::new().unwrap();
        let (app, sent) = app(&dir);
        let mut stdin = Cursor::new(br#"{"hook_event_name":"Stop","session_id":"s1"}"#.to_vec());

        let outcome = app
            .handle(
                &Action::Notify {
                    source: PayloadSource::ClaudeStdin,
                },
                &mut stdin,
            )
            .unwrap();
        assert_eq!(outcome.to_string(), "notification sent: agent-turn-complete (claude)");
        assert_eq!(sent.borrow()[0].0, "Claude Code Task Complete");
        assert_eq!(sent.borrow()[0].1, "Claude Code session s1 completed");
    }

    #[test]
    fn notify_ignores_unknown_event_types() {
        let dir = TempDir::new().unwrap();
        let (app, sent) = app(&dir);
        let outcome = run(&app, inline(r#"{"type":"session-start"}"#)).unwrap();
        assert_eq!(outcome.to_string(), "ignored event type: session-start");
        assert!(sent.borrow().is_empty());
    }

    #[test]
    fn notify_respects_disabled_tool() {
        let dir = TempDir::new().unwrap();
        let (app, sent) = app(&dir);
        let prefs = &app.locations().preferences;
        fs::create_dir_all(prefs.parent().unwrap()).unwrap();
        fs::write(prefs, "[codex]\nenabled = false\n").unwrap();

        let outcome = run(&app, inline(r#"{"type":"agent-turn-complete"}"#)).unwrap();
        assert_eq!(outcome.to_string(), "notifications disabled for codex");
        assert!(sent.borrow().is_empty());
    }

    #[test]
    fn notify_tolerates_unknown_mode_in_preferences() {
        let dir = TempDir::new().unwrap();
        let (app, sent) = app(&dir);
        let prefs = &app.locations().preferences;
        fs::create_dir_all(prefs.parent().unwrap()).unwrap();
        fs::write(prefs, "mode = \"banner\"\ncontent = \"Complete\"\n").unwrap();

        let outcome = run(&app, inline(r#"{"type":"agent-turn-complete"}"#)).unwrap();
        assert_eq!(outcome.to_string(), "notification sent: agent-turn-complete (codex)");
        assert_eq!(sent.borrow()[0].1, "complete");
    }

    #[test]
    fn notify_surfaces_notifier_errors() {
        let dir = TempDir::new().unwrap();
        let app = App::new(Locations::under(dir.path()))
            .notifier(Box::new(Failing))
            .no_env();
        assert!(matches!(
            run(&app, inline(r#"{"type":"agent-turn-complete"}"#)),
            Err(CcNotifyError::NotifyFailed(_))
        ));
    }

    #[test]
    fn test_notify_defaults_and_overrides() {
        let dir = TempDir::new().unwrap();
        let (app, sent) = app(&dir);

        let outcome = run(
            &app,
            Action::TestNotify {
                title: None,
                body: Some("  ".into()),
                toast: false,
            },
        )
        .unwrap();
        assert_eq!(outcome.to_string(), "test notification sent");
        run(
            &app,
            Action::TestNotify {
                title: Some("Hello".into()),
                body: None,
                toast: true,
            },
        )
        .unwrap();

        let sent = sent.borrow();
        assert_eq!(sent[0], (TEST_TITLE.to_string(), TEST_BODY.to_string()));
        assert_eq!(sent[1], ("Hello".to_string(), TOAST_TEST_BODY.to_string()));
    }

    #[test]
    fn preferences_template_and_path() {
        let dir = TempDir::new().unwrap();
        let (app, _) = app(&dir);

        let path = run(&app, Action::Preferences { show_path: true }).unwrap();
        assert_eq!(
            path.to_string(),
            app.locations().preferences.display().to_string()
        );
        let template = run(&app, Action::Preferences { show_path: false }).unwrap();
        assert!(template.to_string().contains("toast_app_id"));
    }
}
