// Rendering of command results and failures.
//
// Results go to stdout, errors and warnings to stderr. A terminal gets text;
// anything else (or `--json`) gets one JSON object per line.

use std::io::{self, IsTerminal, Write};

use serde::Serialize;

use folio_client::config::{API_URL_ENV, TOKEN_ENV};
use folio_client::{RemoteError, StoreError};

const ANSI_RED: &str = "\x1b[31m";
const ANSI_YELLOW: &str = "\x1b[33m";
const ANSI_RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Plain text, colored labels on a terminal.
    Human,
    /// One JSON object per line.
    Json,
}

impl OutputFormat {
    /// `--json` wins; otherwise text only when stdout is a terminal.
    pub fn detect(json_flag: bool) -> Self {
        if json_flag {
            return Self::Json;
        }
        Self::detect_from_terminal(io::stdout().is_terminal())
    }

    pub fn detect_from_terminal(is_tty: bool) -> Self {
        if is_tty {
            Self::Human
        } else {
            Self::Json
        }
    }
}

/// Print a command result to stdout. `human_fn` only runs for text output.
pub fn print_output<T, F>(format: OutputFormat, value: &T, human_fn: F) -> io::Result<()>
where
    T: Serialize,
    F: FnOnce(&T) -> String,
{
    write_output(&mut io::stdout().lock(), format, value, human_fn)
}

pub fn write_output<W, T, F>(
    writer: &mut W,
    format: OutputFormat,
    value: &T,
    human_fn: F,
) -> io::Result<()>
where
    W: Write,
    T: Serialize,
    F: FnOnce(&T) -> String,
{
    match format {
        OutputFormat::Human => writeln!(writer, "{}", human_fn(value)),
        OutputFormat::Json => {
            serde_json::to_writer(&mut *writer, value).map_err(io::Error::other)?;
            writeln!(writer)
        }
    }
}

/// Write an error to stderr in the selected format.
pub fn print_error(format: OutputFormat, code: &str, message: &str) {
    let mut err = io::stderr().lock();
    match format {
        OutputFormat::Human => {
            let line =
                render_human_stderr_line("error", message, io::stderr().is_terminal(), ANSI_RED);
            let _ = writeln!(err, "{line}");
        }
        OutputFormat::Json => {
            let obj = serde_json::json!({
                "error": {
                    "code": code,
                    "message": message,
                }
            });
            let _ = serde_json::to_writer(&mut err, &obj);
            let _ = writeln!(err);
        }
    }
}

/// Write a warning to stderr in the selected format.
pub fn print_warning(format: OutputFormat, code: &str, message: &str) {
    let mut err = io::stderr().lock();
    match format {
        OutputFormat::Human => {
            let line = render_human_stderr_line(
                "warning",
                message,
                io::stderr().is_terminal(),
                ANSI_YELLOW,
            );
            let _ = writeln!(err, "{line}");
        }
        OutputFormat::Json => {
            let obj = serde_json::json!({
                "warning": {
                    "code": code,
                    "message": message,
                }
            });
            let _ = serde_json::to_writer(&mut err, &obj);
            let _ = writeln!(err);
        }
    }
}

/// Print a mapped, actionable error for a command failure.
pub fn print_anyhow_error(format: OutputFormat, error: &anyhow::Error) {
    let (code, message) = actionable_error(error);
    print_error(format, code, &message);
}

fn actionable_error(error: &anyhow::Error) -> (&'static str, String) {
    let message = format!("{error:#}");

    for cause in error.chain() {
        if let Some(store_err) = cause.downcast_ref::<StoreError>() {
            return match store_err {
                StoreError::NoWorkspace => (
                    "NO_WORKSPACE",
                    "No workspace selected. Run: folio ws list, then folio ws use <name>"
                        .to_string(),
                ),
                StoreError::InvalidMove(_) => ("INVALID_MOVE", message),
                StoreError::Remote(remote) => remote_error(remote, message),
            };
        }
        if let Some(remote) = cause.downcast_ref::<RemoteError>() {
            return remote_error(remote, message);
        }
    }

    let lower = message.to_ascii_lowercase();
    if lower.contains("remote unreachable") {
        return ("NETWORK_UNREACHABLE", unreachable_hint(&message));
    }
    if lower.contains("page") && lower.contains("not found") {
        return ("PAGE_NOT_FOUND", format!("{message}. Run: folio ls to see available pages"));
    }
    if lower.contains("workspace") && lower.contains("not found") {
        return ("WORKSPACE_NOT_FOUND", format!("{message}. Run: folio ws list"));
    }

    ("API_ERROR", message)
}

fn remote_error(remote: &RemoteError, message: String) -> (&'static str, String) {
    match remote {
        RemoteError::Transport(_) => ("NETWORK_UNREACHABLE", unreachable_hint(&message)),
        error if error.is_unauthorized() => (
            "AUTH_FAILURE",
            format!("Authentication failed ({message}). Set a valid token in {TOKEN_ENV}"),
        ),
        error if error.is_not_found() => ("NOT_FOUND", message),
        _ => ("API_ERROR", message),
    }
}

fn unreachable_hint(message: &str) -> String {
    format!("{message}. Check api_url in ~/.folio/config.toml or set {API_URL_ENV}")
}

fn render_human_stderr_line(label: &str, message: &str, is_tty: bool, color: &str) -> String {
    if is_tty {
        format!("{color}{label}:{ANSI_RESET} {message}")
    } else {
        format!("{label}: {message}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Listing {
        workspace: String,
        pages: Vec<String>,
    }

    fn listing() -> Listing {
        Listing { workspace: "Personal".into(), pages: vec!["Inbox".into(), "Roadmap".into()] }
    }

    #[test]
    fn detect_tty_returns_human() {
        assert_eq!(OutputFormat::detect_from_terminal(true), OutputFormat::Human);
    }

    #[test]
    fn detect_pipe_returns_json() {
        assert_eq!(OutputFormat::detect_from_terminal(false), OutputFormat::Json);
    }

    #[test]
    fn json_flag_overrides_tty() {
        assert_eq!(OutputFormat::detect(true), OutputFormat::Json);
    }

    #[test]
    fn human_output_uses_renderer() {
        let mut buf = Vec::new();
        write_output(&mut buf, OutputFormat::Human, &listing(), |l| {
            format!("{}: {}", l.workspace, l.pages.join(", "))
        })
        .unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "Personal: Inbox, Roadmap\n");
    }

    #[test]
    fn json_output_is_one_line_and_skips_renderer() {
        let mut buf = Vec::new();
        write_output(&mut buf, OutputFormat::Json, &listing(), |_| {
            unreachable!("renderer is not used for JSON")
        })
        .unwrap();
        let output = String::from_utf8(buf).unwrap();
        assert_eq!(output.lines().count(), 1);
        let parsed: serde_json::Value = serde_json::from_str(output.trim()).unwrap();
        assert_eq!(parsed["pages"][1], "Roadmap");
    }

    #[test]
    fn stderr_writers_do_not_panic() {
        print_error(OutputFormat::Human, "TEST_ERR", "something broke");
        print_error(OutputFormat::Json, "TEST_ERR", "something broke");
        print_warning(OutputFormat::Json, "EMPTY_INPUT", "nothing to write");
    }

    #[test]
    fn human_stderr_line_colors_only_on_tty() {
        let line = render_human_stderr_line("error", "boom", true, ANSI_RED);
        assert!(line.starts_with(ANSI_RED));
        assert!(line.contains(ANSI_RESET));
        let plain = render_human_stderr_line("warning", "careful", false, ANSI_YELLOW);
        assert_eq!(plain, "warning: careful");
    }

    #[test]
    fn actionable_error_no_workspace_message() {
        let err = anyhow::Error::new(StoreError::NoWorkspace);
        let (code, message) = actionable_error(&err);
        assert_eq!(code, "NO_WORKSPACE");
        assert!(message.contains("folio ws use"));
    }

    #[test]
    fn actionable_error_unreachable_message() {
        let err = anyhow::Error::new(RemoteError::Transport("connection refused".into()))
            .context("listing pages");
        let (code, message) = actionable_error(&err);
        assert_eq!(code, "NETWORK_UNREACHABLE");
        assert!(message.contains(API_URL_ENV));
    }

    #[test]
    fn actionable_error_auth_failure_message() {
        let err = anyhow::Error::new(StoreError::Remote(RemoteError::Status {
            status: 401,
            detail: "Not authenticated".into(),
        }));
        let (code, message) = actionable_error(&err);
        assert_eq!(code, "AUTH_FAILURE");
        assert!(message.contains(TOKEN_ENV));
    }

    #[test]
    fn actionable_error_page_not_found_message() {
        let err = anyhow::anyhow!("page `Ghost` not found");
        let (code, message) = actionable_error(&err);
        assert_eq!(code, "PAGE_NOT_FOUND");
        assert!(message.contains("folio ls"));
    }

    #[test]
    fn actionable_error_recorded_refresh_failure() {
        let err = anyhow::anyhow!("failed to fetch workspaces: remote unreachable: dns error");
        let (code, _) = actionable_error(&err);
        assert_eq!(code, "NETWORK_UNREACHABLE");
    }

    #[test]
    fn actionable_error_falls_back_to_message() {
        let err = anyhow::anyhow!("remote returned 500: boom");
        let (code, message) = actionable_error(&err);
        assert_eq!(code, "API_ERROR");
        assert_eq!(message, "remote returned 500: boom");
    }
}
