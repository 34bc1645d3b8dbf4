use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure reported by the multiplexer service.
#[derive(Debug, Error)]
pub enum MuxError {
    #[error("{0} is not installed or not on PATH")]
    NotAvailable(&'static str),

    #[error("failed to execute tmux: {0}")]
    Io(#[from] io::Error),

    /// The server ran the command and rejected it (stale pane id, window
    /// index already in use, unknown target).
    #[error("{0}")]
    CommandFailed(String),

    #[error("unexpected tmux output: {0}")]
    Parse(String),
}

impl MuxError {
    /// Only a rejected command leaves the server in a usable state; spawn and
    /// parse failures mean nothing further can be trusted.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, MuxError::CommandFailed(_))
    }
}

/// Top-level error for loading a config and playing it against a session.
#[derive(Debug, Error)]
pub enum DashError {
    #[error("config parse error: {0}")]
    ConfigParse(String),

    #[error("config file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("tmux session not found: {0}")]
    SessionNotFound(String),

    #[error(transparent)]
    Mux(#[from] MuxError),
}

pub type Result<T, E = DashError> = std::result::Result<T, E>;

/// Decide whether a failed best-effort step is downgraded or aborts the run.
///
/// `Ok(Some(v))` is the happy path, `Ok(None)` means the failure was
/// recoverable and the caller should take its fallback.
pub fn recover<T>(result: std::result::Result<T, MuxError>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_recoverable() => Ok(None),
        Err(e) => Err(e.into()),
    }
}
