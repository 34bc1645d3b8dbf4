pub mod config;
pub mod engine;
pub mod error;
pub mod executor;
pub mod mux;
pub mod registry;
pub mod session;
pub mod size;

// Re-export the types a caller needs to play a config
pub use config::{load_and_validate, validate, Config, PaneAction, PaneSpec, SplitSpec, WindowSpec};
pub use engine::{Degradation, LayoutEngine, PlaySummary};
pub use error::{DashError, MuxError, Result};
pub use executor::TmuxClient;
pub use mux::{Multiplexer, PaneId, Session, SplitDirection, TerminalGeometry};
pub use registry::PaneIdRegistry;
pub use size::Size;

/// Environment variable overriding the config file path
pub const CONFIG_ENV: &str = "TMUX_DASH_CONFIG";

/// Environment variable overriding the module directory
pub const MODULE_DIR_ENV: &str = "TMUX_DASH_MODULE_DIR";
