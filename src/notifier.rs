//! Delivering a rendered notification to the desktop.
//!
//! On Windows a short PowerShell script raises a toast (or a WScript popup).
//! User text never appears in the script source: it is embedded as base64 and
//! decoded inside the script, and the whole script is passed through
//! `-EncodedCommand`, so quoting cannot break out.

use std::process::Command;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, info, warn};

use crate::error::CcNotifyError;

const POWERSHELL: &str = "powershell.exe";
const POPUP_TIMEOUT_SECS: u32 = 8;

/// How a notification is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifyMode {
    /// Toast, falling back to a popup if the toast fails.
    #[default]
    Auto,
    Toast,
    Popup,
}

impl NotifyMode {
    /// Case-insensitive lookup. Unknown names fall back to [`NotifyMode::Auto`].
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "toast" => NotifyMode::Toast,
            "popup" => NotifyMode::Popup,
            _ => NotifyMode::Auto,
        }
    }
}

impl<'de> Deserialize<'de> for NotifyMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self::from_name(&String::deserialize(deserializer)?))
    }
}

/// Something that can show a notification.
pub trait Notifier {
    fn notify(&self, title: &str, body: &str) -> Result<(), CcNotifyError>;
}

/// Runs an external program to completion.
pub trait CommandRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<(), CcNotifyError>;
}

/// [`CommandRunner`] backed by [`std::process::Command`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<(), CcNotifyError> {
        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|e| CcNotifyError::NotifyFailed(format!("spawn {program}: {e}")))?;
        if output.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(CcNotifyError::NotifyFailed(format!(
            "{program} exited with {}: {}",
            output.status,
            stderr.trim()
        )))
    }
}

/// Shows notifications through PowerShell.
pub struct PowerShellNotifier<R = SystemRunner> {
    mode: NotifyMode,
    app_id: String,
    runner: R,
}

impl PowerShellNotifier<SystemRunner> {
    pub fn new(mode: NotifyMode, app_id: impl Into<String>) -> Self {
        Self::with_runner(mode, app_id, SystemRunner)
    }
}

impl<R: CommandRunner> PowerShellNotifier<R> {
    pub fn with_runner(mode: NotifyMode, app_id: impl Into<String>, runner: R) -> Self {
        Self {
            mode,
            app_id: app_id.into(),
            runner,
        }
    }

    fn run_script(&self, script: &str) -> Result<(), CcNotifyError> {
        let args = [
            "-NoProfile",
            "-NonInteractive",
            "-ExecutionPolicy",
            "Bypass",
            "-EncodedCommand",
        ]
        .into_iter()
        .map(String::from)
        .chain(std::iter::once(encode_command(script)))
        .collect::<Vec<_>>();
        self.runner.run(POWERSHELL, &args)
    }
}

impl<R: CommandRunner> Notifier for PowerShellNotifier<R> {
    fn notify(&self, title: &str, body: &str) -> Result<(), CcNotifyError> {
        match self.mode {
            NotifyMode::Toast => self.run_script(&toast_script(title, body, &self.app_id)),
            NotifyMode::Popup => self.run_script(&popup_script(title, body)),
            NotifyMode::Auto => {
                match self.run_script(&toast_script(title, body, &self.app_id)) {
                    Ok(()) => Ok(()),
                    Err(e) => {
                        warn!(error = %e, "toast failed, falling back to popup");
                        self.run_script(&popup_script(title, body))
                    }
                }
            }
        }
    }
}

/// Records notifications in the log. Used where no desktop backend exists.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, title: &str, body: &str) -> Result<(), CcNotifyError> {
        info!(%title, %body, "notification");
        Ok(())
    }
}

/// The notifier for the current platform.
pub fn default_notifier(mode: NotifyMode, app_id: &str) -> Box<dyn Notifier> {
    if cfg!(windows) {
        debug!(?mode, app_id, "using powershell notifier");
        Box::new(PowerShellNotifier::new(mode, app_id))
    } else {
        Box::new(LogNotifier)
    }
}

fn b64(value: &str) -> String {
    STANDARD.encode(value.as_bytes())
}

fn toast_script(title: &str, body: &str, app_id: &str) -> String {
    format!(
        r#"$ErrorActionPreference = 'Stop'
$null = [Windows.UI.Notifications.ToastNotificationManager, Windows.UI.Notifications, ContentType = WindowsRuntime]
$null = [Windows.Data.Xml.Dom.XmlDocument, Windows.Data.Xml.Dom.XmlDocument, ContentType = WindowsRuntime]
$title = [System.Text.Encoding]::UTF8.GetString([System.Convert]::FromBase64String('{title}'))
$body = [System.Text.Encoding]::UTF8.GetString([System.Convert]::FromBase64String('{body}'))
$appId = [System.Text.Encoding]::UTF8.GetString([System.Convert]::FromBase64String('{app_id}'))
$xml = New-Object Windows.Data.Xml.Dom.XmlDocument
$xml.LoadXml("<toast><visual><binding template='ToastGeneric'><text></text><text></text></binding></visual></toast>")
$text = $xml.GetElementsByTagName('text')
$null = $text.Item(0).AppendChild($xml.CreateTextNode($title))
$null = $text.Item(1).AppendChild($xml.CreateTextNode($body))
$toast = [Windows.UI.Notifications.ToastNotification]::new($xml)
[Windows.UI.Notifications.ToastNotificationManager]::CreateToastNotifier($appId).Show($toast)
"#,
        title = b64(title),
        body = b64(body),
        app_id = b64(app_id),
    )
}

fn popup_script(title: &str, body: &str) -> String {
    format!(
        r#"$ErrorActionPreference = 'Stop'
$title = [System.Text.Encoding]::UTF8.GetString([System.Convert]::FromBase64String('{title}'))
$body = [System.Text.Encoding]::UTF8.GetString([System.Convert]::FromBase64String('{body}'))
$shell = New-Object -ComObject WScript.Shell
$null = $shell.Popup($body, {POPUP_TIMEOUT_SECS}, $title, 0x40)
"#,
        title = b64(title),
        body = b64(body),
    )
}

/// Base64 of the script's UTF-16LE bytes, as `-EncodedCommand` expects.
fn encode_command(script: &str) -> String {
    let bytes: Vec<u8> = script.encode_utf16().flat_map(u16::to_le_bytes).collect();
    STANDARD.encode(bytes)
}
