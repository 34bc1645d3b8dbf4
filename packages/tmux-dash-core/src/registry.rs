use std::collections::HashMap;

use crate::mux::PaneId;

/// Pane name to runtime pane id, for one `play_session` run.
///
/// Shared by every window of the run, so pane names are expected to be
/// unique across the whole config. Recording a name twice keeps the latest id.
#[derive(Debug, Default)]
pub struct PaneIdRegistry {
    panes: HashMap<String, PaneId>,
}

impl PaneIdRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, name: &str, pane_id: PaneId) {
        self.panes.insert(name.to_string(), pane_id);
    }

    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.panes.get(name).map(String::as_str)
    }
}
