//! The multiplexer seam.
//!
//! The layout engine talks to tmux only through [`Multiplexer`], which keeps
//! the ordering logic testable against a recording fake. [`TmuxClient`]
//! (in `executor`) is the implementation used by the binary.
//!
//! [`TmuxClient`]: crate::executor::TmuxClient

use serde::{Deserialize, Serialize};

use crate::error::MuxError;

/// Runtime pane identifier, e.g. "%3"
pub type PaneId = String;

/// A running tmux session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Session ID (e.g., "$0")
    pub id: String,
    pub name: String,
}

/// Size of the controlling terminal in cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalGeometry {
    pub height: u32,
    pub width: u32,
}

/// How a new pane is placed next to its source.
///
/// `Vert` puts the new pane beside the source (both keep the full height),
/// `Horz` stacks it below (both keep the full width).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitDirection {
    #[default]
    Vert,
    Horz,
}

pub trait Multiplexer {
    fn list_sessions(&self) -> Result<Vec<Session>, MuxError>;

    fn session_by_id(&self, id: &str) -> Result<Option<Session>, MuxError> {
        Ok(self.list_sessions()?.into_iter().find(|s| s.id == id))
    }

    fn session_by_name(&self, name: &str) -> Result<Option<Session>, MuxError> {
        Ok(self.list_sessions()?.into_iter().find(|s| s.name == name))
    }

    fn new_window(&mut self, session: &Session, name: &str, index: u32) -> Result<(), MuxError>;

    fn select_window(&mut self, session: &Session, index: u32) -> Result<(), MuxError>;

    /// Active pane of the session's current window
    fn attached_pane(&self, session: &Session) -> Result<PaneId, MuxError>;

    /// Make `pane` the attached pane. A pane outside the current window is a
    /// `CommandFailed` error, the same as a pane that no longer exists.
    fn select_pane(&mut self, pane: &str) -> Result<(), MuxError>;

    /// Split `source` and return the id of the new pane
    fn split_pane(&mut self, source: &str, direction: SplitDirection) -> Result<PaneId, MuxError>;

    fn set_pane_width(&mut self, pane: &str, cells: u32) -> Result<(), MuxError>;

    fn set_pane_height(&mut self, pane: &str, cells: u32) -> Result<(), MuxError>;

    /// Type `text` into the pane followed by Enter. Does not wait for it to run.
    fn send_keys(&mut self, pane: &str, text: &str) -> Result<(), MuxError>;

    /// Toggle the zoomed (maximized) state of a pane
    fn toggle_zoom(&mut self, pane: &str) -> Result<(), MuxError>;

    fn terminal_size(&self) -> Result<TerminalGeometry, MuxError>;
}
