use crate::error::{DashError, Result};
use crate::mux::{Multiplexer, Session};

/// Environment variable tmux sets inside its panes
pub const TMUX_ENV: &str = "TMUX";

/// Session name from a `$TMUX` value: its last comma-separated field
pub fn session_name_from_env(tmux_var: &str) -> Option<&str> {
    tmux_var
        .rsplit(',')
        .next()
        .map(str::trim)
        .filter(|name| !name.is_empty())
}

/// Resolve the session to lay out.
///
/// An explicit id wins over an explicit name; with neither, the session is
/// derived from `ambient` (the value of `$TMUX`, if the caller is inside tmux).
pub fn locate<M: Multiplexer + ?Sized>(
    mux: &M,
    id: Option<&str>,
    name: Option<&str>,
    ambient: Option<&str>,
) -> Result<Session> {
    let (found, wanted) = if let Some(id) = id {
        (mux.session_by_id(id)?, format!("id {}", id))
    } else if let Some(name) = name {
        (mux.session_by_name(name)?, format!("name {}", name))
    } else {
        let name = ambient.and_then(session_name_from_env).ok_or_else(|| {
            DashError::SessionNotFound(
                "not inside tmux, pass --session-id or --session-name".to_string(),
            )
        })?;
        (mux.session_by_name(name)?, format!("name {}", name))
    };

    found.ok_or(DashError::SessionNotFound(wanted))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MuxError;
    use crate::mux::{PaneId, SplitDirection, TerminalGeometry};

    /// Only answers session queries
    struct Sessions(Vec<Session>);

    impl Multiplexer for Sessions {
        fn list_sessions(&self) -> Result<Vec<Session>, MuxError> {
            Ok(self.0.clone())
        }
        fn new_window(&mut self, _: &Session, _: &str, _: u32) -> Result<(), MuxError> {
            unimplemented!()
        }
        fn select_window(&mut self, _: &Session, _: u32) -> Result<(), MuxError> {
            unimplemented!()
        }
        fn attached_pane(&self, _: &Session) -> Result<PaneId, MuxError> {
            unimplemented!()
        }
        fn select_pane(&mut self, _: &str) -> Result<(), MuxError> {
            unimplemented!()
        }
        fn split_pane(&mut self, _: &str, _: SplitDirection) -> Result<PaneId, MuxError> {
            unimplemented!()
        }
        fn set_pane_width(&mut self, _: &str, _: u32) -> Result<(), MuxError> {
            unimplemented!()
        }
        fn set_pane_height(&mut self, _: &str, _: u32) -> Result<(), MuxError> {
            unimplemented!()
        }
        fn send_keys(&mut self, _: &str, _: &str) -> Result<(), MuxError> {
            unimplemented!()
        }
        fn toggle_zoom(&mut self, _: &str) -> Result<(), MuxError> {
            unimplemented!()
        }
        fn terminal_size(&self) -> Result<TerminalGeometry, MuxError> {
            unimplemented!()
        }
    }

    fn server() -> Sessions {
        Sessions(vec![
            Session {
                id: "$0".into(),
                name: "main".into(),
            },
            Session {
                id: "$1".into(),
                name: "dash".into(),
            },
        ])
    }

    #[test]
    fn test_session_name_from_env() {
        assert_eq!(session_name_from_env("/tmp/tmux-1000/default,4242,dash"), Some("dash"));
        assert_eq!(session_name_from_env("dash"), Some("dash"));
        assert_eq!(session_name_from_env("/tmp/tmux-1000/default,4242,"), None);
        assert_eq!(session_name_from_env(""), None);
    }

    #[test]
    fn test_locate_by_id() {
        let session = locate(&server(), Some("$1"), None, None).unwrap();
        assert_eq!(session.name, "dash");
    }

    #[test]
    fn test_id_takes_priority_over_name() {
        let session = locate(&server(), Some("$0"), Some("dash"), Some("x,1,dash")).unwrap();
        assert_eq!(session.name, "main");
    }

    #[test]
    fn test_locate_by_name() {
        let session = locate(&server(), None, Some("main"), Some("x,1,dash")).unwrap();
        assert_eq!(session.id, "$0");
    }

    #[test]
    fn test_locate_from_ambient() {
        let session = locate(&server(), None, None, Some("/tmp/tmux-1000/default,77,dash")).unwrap();
        assert_eq!(session.id, "$1");
    }

    #[test]
    fn test_missing_sessions_are_errors() {
        assert!(matches!(
            locate(&server(), Some("$9"), None, None),
            Err(DashError::SessionNotFound(msg)) if msg == "id $9"
        ));
        assert!(matches!(
            locate(&server(), None, Some("nope"), None),
            Err(DashError::SessionNotFound(_))
        ));
        assert!(matches!(
            locate(&server(), None, None, None),
            Err(DashError::SessionNotFound(_))
        ));
        assert!(matches!(
            locate(&server(), None, None, Some("/tmp/sock,1,gone")),
            Err(DashError::SessionNotFound(_))
        ));
    }
}
