// Consistent exit codes for the folio CLI.
//
//   0  = success
//   1  = general error
//   2  = usage/argument error (bad reference, invalid move, no workspace)
//   11 = authentication error
//   12 = conflict reported by the API
//   13 = network error
//   14 = not found

use std::process;

use folio_client::{RemoteError, StoreError};

/// Named exit codes for the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    Error = 1,
    Usage = 2,
    Auth = 11,
    Conflict = 12,
    Network = 13,
    NotFound = 14,
}

impl ExitCode {
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Map an anyhow error to an exit code by inspecting the error chain.
    pub fn from_error(err: &anyhow::Error) -> Self {
        for cause in err.chain() {
            if let Some(store_err) = cause.downcast_ref::<StoreError>() {
                return Self::from_store_error(store_err);
            }
            if let Some(remote_err) = cause.downcast_ref::<RemoteError>() {
                return Self::from_remote_error(remote_err);
            }
        }

        // Refresh failures arrive as recorded messages.
        let msg = format!("{err:#}");
        if msg.contains("remote unreachable") {
            return Self::Network;
        }
        if msg.contains("remote returned 401") || msg.contains("remote returned 403") {
            return Self::Auth;
        }
        if msg.contains("not found") {
            return Self::NotFound;
        }
        if msg.contains("matches") && msg.contains("use an id") {
            return Self::Usage;
        }

        Self::Error
    }

    pub fn from_store_error(err: &StoreError) -> Self {
        match err {
            StoreError::Remote(remote) => Self::from_remote_error(remote),
            StoreError::NoWorkspace | StoreError::InvalidMove(_) => Self::Usage,
        }
    }

    pub fn from_remote_error(err: &RemoteError) -> Self {
        match err {
            RemoteError::Transport(_) => Self::Network,
            RemoteError::InvalidRequest(_) => Self::Usage,
            RemoteError::Decode(_) => Self::Error,
            RemoteError::Status { status, .. } => match status {
                401 | 403 => Self::Auth,
                404 => Self::NotFound,
                409 => Self::Conflict,
                400 | 422 => Self::Usage,
                _ => Self::Error,
            },
        }
    }
}

impl From<ExitCode> for process::ExitCode {
    fn from(code: ExitCode) -> Self {
        process::ExitCode::from(code.code() as u8)
    }
}
