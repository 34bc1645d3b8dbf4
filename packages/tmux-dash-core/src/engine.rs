//! Layout materialization.
//!
//! [`LayoutEngine`] replays a validated [`Config`] against one tmux session as
//! a strictly ordered series of window, split, select and resize calls. Every
//! call blocks until tmux answers, and the order matters: a pane is resized
//! only after it became the attached pane, and a pane can only be split from
//! once its name was recorded.
//!
//! Two failures are survivable. Creating a window at an index that is taken
//! reuses the existing window, and a split source that can no longer be
//! selected falls back to the attached pane. Anything else aborts the run and
//! leaves whatever was already created in place.

use std::path::{Path, PathBuf};

use crate::config::{Config, PaneAction, PaneSpec, SplitSpec, WindowSpec};
use crate::error::{recover, MuxError, Result};
use crate::mux::{Multiplexer, PaneId, Session, TerminalGeometry};
use crate::registry::PaneIdRegistry;

/// A best-effort fallback taken during a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Degradation {
    /// The window index was already in use; its existing window was configured
    WindowExists { index: u32 },
    /// `from` named a pane not created yet; split from the attached pane instead
    UnresolvedFrom { pane: String, from: String },
    /// The split source could not be selected; split from `fallback` instead
    StaleSplitSource {
        pane: String,
        source: PaneId,
        fallback: PaneId,
    },
}

/// What a finished run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaySummary {
    pub windows: usize,
    pub panes: usize,
    pub degradations: Vec<Degradation>,
}

/// Zooms a pane for as long as it lives.
///
/// [`ZoomGuard::restore`] unzooms and reports failure; dropping the guard
/// without restoring unzooms on a best-effort basis.
struct ZoomGuard<'m, M: Multiplexer + ?Sized> {
    mux: &'m mut M,
    pane: PaneId,
    restored: bool,
}

impl<'m, M: Multiplexer + ?Sized> ZoomGuard<'m, M> {
    fn zoom(mux: &'m mut M, pane: PaneId) -> std::result::Result<Self, MuxError> {
        mux.toggle_zoom(&pane)?;
        Ok(Self {
            mux,
            pane,
            restored: false,
        })
    }

    fn restore(mut self) -> std::result::Result<(), MuxError> {
        self.restored = true;
        self.mux.toggle_zoom(&self.pane)
    }
}

impl<M: Multiplexer + ?Sized> Drop for ZoomGuard<'_, M> {
    fn drop(&mut self) {
        if !self.restored {
            if let Err(e) = self.mux.toggle_zoom(&self.pane) {
                log::error!("Failed to unzoom {}: {}", self.pane, e);
            }
        }
    }
}

/// Command line typed into a pane for a `module` entry
pub fn module_command(module_dir: &Path, module: &str) -> String {
    format!("{}/{}", module_dir.display(), module)
}

pub struct LayoutEngine<'a, M: Multiplexer + ?Sized> {
    mux: &'a mut M,
    session: &'a Session,
    config: &'a Config,
    module_dir: PathBuf,
    registry: PaneIdRegistry,
    summary: PlaySummary,
}

impl<'a, M: Multiplexer + ?Sized> LayoutEngine<'a, M> {
    pub fn new(
        mux: &'a mut M,
        session: &'a Session,
        config: &'a Config,
        module_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            mux,
            session,
            config,
            module_dir: module_dir.into(),
            registry: PaneIdRegistry::new(),
            summary: PlaySummary::default(),
        }
    }

    /// Materialize every window and pane of the config, in declaration order.
    pub fn play_session(mut self) -> Result<PlaySummary> {
        let geometry = self.capture_geometry()?;
        log::debug!(
            "Terminal is {}x{} (width x height)",
            geometry.width,
            geometry.height
        );

        let config = self.config;
        for window in &config.windows {
            self.setup_window(window, geometry)?;
        }
        Ok(self.summary)
    }

    /// Read the real terminal size by briefly zooming the attached pane.
    fn capture_geometry(&mut self) -> Result<TerminalGeometry> {
        let pane = self.mux.attached_pane(self.session)?;
        let guard = ZoomGuard::zoom(&mut *self.mux, pane)?;
        let geometry = guard.mux.terminal_size();
        guard.restore()?;
        Ok(geometry?)
    }

    fn setup_window(&mut self, window: &WindowSpec, geometry: TerminalGeometry) -> Result<()> {
        let created = recover(self.mux.new_window(self.session, &window.name, window.number))?;
        if created.is_none() {
            log::warn!("Window {} exists, results may vary", window.number);
            self.degrade(Degradation::WindowExists {
                index: window.number,
            });
        }
        self.mux.select_window(self.session, window.number)?;
        self.summary.windows += 1;

        for pane in &window.panes {
            self.setup_pane(pane, geometry)?;
        }
        Ok(())
    }

    fn setup_pane(&mut self, pane: &PaneSpec, geometry: TerminalGeometry) -> Result<()> {
        if let Some(split) = &pane.split {
            self.make_split(&pane.name, split, geometry)?;
        }

        // Unsplit panes are named after whatever pane is attached.
        let attached = self.mux.attached_pane(self.session)?;
        self.registry.record(&pane.name, attached.clone());
        self.summary.panes += 1;

        match &pane.action {
            PaneAction::Command(command) => self.mux.send_keys(&attached, command)?,
            PaneAction::Module(module) => {
                let command = module_command(&self.module_dir, module);
                self.mux.send_keys(&attached, &command)?
            }
            PaneAction::None => {}
        }
        Ok(())
    }

    fn make_split(&mut self, name: &str, split: &SplitSpec, geometry: TerminalGeometry) -> Result<()> {
        let mut source = self.mux.attached_pane(self.session)?;
        if let Some(from) = &split.from {
            match self.registry.lookup(from) {
                Some(id) => source = id.to_string(),
                None => {
                    log::warn!("{} not assigned, check ordering", from);
                    self.degrade(Degradation::UnresolvedFrom {
                        pane: name.to_string(),
                        from: from.clone(),
                    });
                }
            }
        }

        let source = match recover(self.mux.select_pane(&source))? {
            Some(()) => source,
            None => {
                let fallback = self.mux.attached_pane(self.session)?;
                log::error!("Cannot select {}, splitting from {}", source, fallback);
                self.degrade(Degradation::StaleSplitSource {
                    pane: name.to_string(),
                    source,
                    fallback: fallback.clone(),
                });
                fallback
            }
        };

        let new_pane = self.mux.split_pane(&source, split.direction)?;
        self.mux.select_pane(&new_pane)?;

        if let Some(width) = split.width {
            let cells = width.resolve(geometry.width);
            log::debug!("Pane {} width {} -> {} cells", name, width, cells);
            self.mux.set_pane_width(&new_pane, cells)?;
        }
        if let Some(height) = split.height {
            let cells = height.resolve(geometry.height);
            log::debug!("Pane {} height {} -> {} cells", name, height, cells);
            self.mux.set_pane_height(&new_pane, cells)?;
        }
        Ok(())
    }

    fn degrade(&mut self, degradation: Degradation) {
        self.summary.degradations.push(degradation);
    }
}
