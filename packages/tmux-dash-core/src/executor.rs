use std::fs::File;
use std::io;
use std::os::fd::AsRawFd;
use std::process::Command;

use crate::error::MuxError;
use crate::mux::{Multiplexer, PaneId, Session, SplitDirection, TerminalGeometry};

nix::ioctl_read_bad!(tiocgwinsz, libc::TIOCGWINSZ, libc::winsize);

/// Talks to the running tmux server through the `tmux` binary.
#[derive(Debug, Clone)]
pub struct TmuxClient {
    binary: String,
    /// `<session id>:<index>` of the window last created or selected
    current_window: Option<String>,
}

impl Default for TmuxClient {
    fn default() -> Self {
        Self {
            binary: "tmux".to_string(),
            current_window: None,
        }
    }
}

impl TmuxClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different tmux binary (e.g. a wrapper that selects a socket)
    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            ..Self::default()
        }
    }

    pub fn execute(&self, args: &[&str]) -> Result<String, MuxError> {
        log::debug!("{} {}", self.binary, args.join(" "));
        let output = Command::new(&self.binary).args(args).output().map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                MuxError::NotAvailable("tmux")
            } else {
                MuxError::Io(e)
            }
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MuxError::CommandFailed(format!(
                "tmux {} failed: {}",
                args.join(" "),
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

fn window_target(session: &Session, index: u32) -> String {
    format!("{}:{}", session.id, index)
}

fn split_flag(direction: SplitDirection) -> &'static str {
    match direction {
        SplitDirection::Vert => "-h",
        SplitDirection::Horz => "-v",
    }
}

/// Parse `list-sessions -F "#{session_id}\t#{session_name}"` output
pub fn parse_list_sessions(output: &str) -> Vec<Session> {
    output
        .lines()
        .filter_map(|line| {
            let (id, name) = line.split_once('\t')?;
            Some(Session {
                id: id.to_string(),
                name: name.to_string(),
            })
        })
        .collect()
}

fn pane_id(output: String) -> Result<PaneId, MuxError> {
    if output.starts_with('%') && !output.contains(char::is_whitespace) {
        Ok(output)
    } else {
        Err(MuxError::Parse(format!("expected a pane id, got {:?}", output)))
    }
}

impl Multiplexer for TmuxClient {
    fn list_sessions(&self) -> Result<Vec<Session>, MuxError> {
        let output = self.execute(&["list-sessions", "-F", "#{session_id}\t#{session_name}"])?;
        Ok(parse_list_sessions(&output))
    }

    fn new_window(&mut self, session: &Session, name: &str, index: u32) -> Result<(), MuxError> {
        let target = window_target(session, index);
        self.execute(&["new-window", "-t", &target, "-n", name])?;
        self.current_window = Some(target);
        Ok(())
    }

    fn select_window(&mut self, session: &Session, index: u32) -> Result<(), MuxError> {
        let target = window_target(session, index);
        self.execute(&["select-window", "-t", &target])?;
        self.current_window = Some(target);
        Ok(())
    }

    fn attached_pane(&self, session: &Session) -> Result<PaneId, MuxError> {
        pane_id(self.execute(&["display-message", "-p", "-t", &session.id, "#{pane_id}"])?)
    }

    /// tmux happily selects a pane in any window, so a pane outside the
    /// current window is rejected here.
    fn select_pane(&mut self, pane: &str) -> Result<(), MuxError> {
        if let Some(current) = &self.current_window {
            let window = self.execute(&[
                "display-message",
                "-p",
                "-t",
                pane,
                "#{session_id}:#{window_index}",
            ])?;
            if &window != current {
                return Err(MuxError::CommandFailed(format!(
                    "pane {} is in window {}, not {}",
                    pane, window, current
                )));
            }
        }
        self.execute(&["select-pane", "-t", pane])?;
        Ok(())
    }

    fn split_pane(&mut self, source: &str, direction: SplitDirection) -> Result<PaneId, MuxError> {
        pane_id(self.execute(&[
            "split-window",
            split_flag(direction),
            "-P",
            "-F",
            "#{pane_id}",
            "-t",
            source,
        ])?)
    }

    fn set_pane_width(&mut self, pane: &str, cells: u32) -> Result<(), MuxError> {
        self.execute(&["resize-pane", "-t", pane, "-x", &cells.to_string()])?;
        Ok(())
    }

    fn set_pane_height(&mut self, pane: &str, cells: u32) -> Result<(), MuxError> {
        self.execute(&["resize-pane", "-t", pane, "-y", &cells.to_string()])?;
        Ok(())
    }

    fn send_keys(&mut self, pane: &str, text: &str) -> Result<(), MuxError> {
        self.execute(&["send-keys", "-t", pane, text, "Enter"])?;
        Ok(())
    }

    fn toggle_zoom(&mut self, pane: &str) -> Result<(), MuxError> {
        self.execute(&["resize-pane", "-Z", "-t", pane])?;
        Ok(())
    }

    fn terminal_size(&self) -> Result<TerminalGeometry, MuxError> {
        let tty = File::open("/dev/tty")?;
        let mut size = libc::winsize {
            ws_row: 0,
            ws_col: 0,
            ws_xpixel: 0,
            ws_ypixel: 0,
        };
        unsafe { tiocgwinsz(tty.as_raw_fd(), &mut size) }
            .map_err(|e| MuxError::Io(io::Error::from(e)))?;

        if size.ws_row == 0 || size.ws_col == 0 {
            return Err(MuxError::Parse("controlling terminal reported 0x0".to_string()));
        }
        Ok(TerminalGeometry {
            height: u32::from(size.ws_row),
            width: u32::from(size.ws_col),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list_sessions() {
        let sessions = parse_list_sessions("$0\tmain\n$3\tdash board\n\ngarbage\n");
        assert_eq!(
            sessions,
            vec![
                Session {
                    id: "$0".into(),
                    name: "main".into()
                },
                Session {
                    id: "$3".into(),
                    name: "dash board".into()
                },
            ]
        );
    }

    #[test]
    fn test_split_flag_mapping() {
        assert_eq!(split_flag(SplitDirection::Vert), "-h");
        assert_eq!(split_flag(SplitDirection::Horz), "-v");
    }

    #[test]
    fn test_window_target() {
        let session = Session {
            id: "$2".into(),
            name: "work".into(),
        };
        assert_eq!(window_target(&session, 4), "$2:4");
    }

    #[test]
    fn test_pane_id_output() {
        assert_eq!(pane_id("%12".to_string()).unwrap(), "%12");
        assert!(matches!(pane_id(String::new()), Err(MuxError::Parse(_))));
        assert!(matches!(pane_id("no server".to_string()), Err(MuxError::Parse(_))));
    }

    /// A stand-in tmux that logs its arguments and reports every pane as
    /// living in window `$0:1`.
    fn stub_tmux(dir: &std::path::Path) -> (String, std::path::PathBuf) {
        use std::os::unix::fs::PermissionsExt;

        let log = dir.join("calls.log");
        let script = dir.join("tmux");
        std::fs::write(
            &script,
            format!(
                "#!/bin/sh\necho \"$*\" >> '{}'\ncase \"$1\" in\n  display-message) echo '$0:1' ;;\nesac\nexit 0\n",
                log.display()
            ),
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        (script.display().to_string(), log)
    }

    #[test]
    fn test_select_pane_rejects_other_window() {
        let dir = tempfile::tempdir().unwrap();
        let (binary, log) = stub_tmux(dir.path());
        let session = Session {
            id: "$0".into(),
            name: "dash".into(),
        };
        let mut client = TmuxClient::with_binary(binary);

        client.select_window(&session, 2).unwrap();
        let err = client.select_pane("%1").unwrap_err();
        assert!(err.is_recoverable());
        assert!(err.to_string().contains("not $0:2"));
        let calls = std::fs::read_to_string(&log).unwrap();
        assert!(!calls.contains("select-pane"));

        client.select_window(&session, 1).unwrap();
        client.select_pane("%1").unwrap();
        let calls = std::fs::read_to_string(&log).unwrap();
        assert!(calls.contains("select-pane -t %1"));
    }

    #[test]
    fn test_select_pane_without_window_context() {
        let dir = tempfile::tempdir().unwrap();
        let (binary, log) = stub_tmux(dir.path());
        let mut client = TmuxClient::with_binary(binary);

        client.select_pane("%7").unwrap();
        let calls = std::fs::read_to_string(&log).unwrap();
        assert_eq!(calls.trim(), "select-pane -t %7");
    }

    #[test]
    fn test_missing_binary_is_not_available() {
        let client = TmuxClient::with_binary("tmux-dash-definitely-missing-binary");
        assert!(matches!(
            client.list_sessions(),
            Err(MuxError::NotAvailable("tmux"))
        ));
    }
}
