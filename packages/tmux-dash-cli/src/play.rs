use std::path::PathBuf;

use clap::Args;
use tmux_dash_core::config::{default_config_path, load_and_validate};
use tmux_dash_core::session::{self, TMUX_ENV};
use tmux_dash_core::{LayoutEngine, PlaySummary, Result, TmuxClient, CONFIG_ENV, MODULE_DIR_ENV};

#[derive(Args, Debug)]
pub struct PlayArgs {
    /// Config file [default: ~/.config/tmux-dash/config.yml]
    #[arg(short, long, env = CONFIG_ENV)]
    pub config: Option<PathBuf>,

    /// Directory `module` entries are resolved against [default: <binary dir>/modules]
    #[arg(short, long, env = MODULE_DIR_ENV)]
    pub module_dir: Option<PathBuf>,

    /// Target session by ID (e.g., $3)
    #[arg(short = 'i', long, group = "target")]
    pub session_id: Option<String>,

    /// Target session by name
    #[arg(short = 'n', long, group = "target")]
    pub session_name: Option<String>,
}

impl PlayArgs {
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(default_config_path)
    }

    pub fn module_dir(&self) -> PathBuf {
        self.module_dir.clone().unwrap_or_else(default_module_dir)
    }
}

/// `modules/` next to the running binary
fn default_module_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.canonicalize().ok())
        .and_then(|exe| exe.parent().map(|dir| dir.join("modules")))
        .unwrap_or_else(|| PathBuf::from("modules"))
}

/// Validate the config, find the session and lay it out. Blocks until done.
pub fn run(args: PlayArgs) -> Result<PlaySummary> {
    let config_path = args.config_path();
    log::debug!("Reading config from {}", config_path.display());
    let config = load_and_validate(&config_path)?;

    let mut client = TmuxClient::new();
    let ambient = std::env::var(TMUX_ENV).ok();
    let session = session::locate(
        &client,
        args.session_id.as_deref(),
        args.session_name.as_deref(),
        ambient.as_deref(),
    )?;
    log::info!("Laying out session {} ({})", session.name, session.id);

    LayoutEngine::new(&mut client, &session, &config, args.module_dir()).play_session()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_paths_win() {
        let args = PlayArgs {
            config: Some(PathBuf::from("/etc/dash.yml")),
            module_dir: Some(PathBuf::from("/opt/modules")),
            session_id: None,
            session_name: None,
        };
        assert_eq!(args.config_path(), PathBuf::from("/etc/dash.yml"));
        assert_eq!(args.module_dir(), PathBuf::from("/opt/modules"));
    }

    #[test]
    fn test_default_module_dir_is_named_modules() {
        assert!(default_module_dir().ends_with("modules"));
    }
}
