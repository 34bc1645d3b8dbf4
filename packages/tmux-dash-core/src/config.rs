//! Dashboard configuration: loading, validation and the typed model.
//!
//! A config is a YAML mapping of window name to window, where each window
//! holds a `number` and a mapping of pane name to pane:
//!
//! ```yaml
//! monitor:
//!   number: 1
//!   top:
//!     split:
//!     command: htop
//!   log:
//!     split:
//!       direction: horz
//!       from: top
//!       height: 30%
//!     module: tail-syslog
//! ```
//!
//! [`validate`] walks the raw YAML once, rejecting the first violation it
//! finds, and produces a [`Config`] the layout engine can follow without
//! looking at YAML again. Declaration order is preserved throughout.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde_yaml::{Mapping, Value};

use crate::error::{DashError, Result};
use crate::mux::SplitDirection;
use crate::size::Size;

/// Key holding the window index inside a window mapping
pub const NUMBER_KEY: &str = "number";

const PANE_DIRECTIVES: &[&str] = &["split", "command", "module"];
const SPLIT_DIRECTIVES: &[&str] = &["direction", "from", "width", "height"];

/// Get the default config path: ~/.config/tmux-dash/config.yml
pub fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("tmux-dash")
        .join("config.yml")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub windows: Vec<WindowSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowSpec {
    pub name: String,
    /// Target window index
    pub number: u32,
    pub panes: Vec<PaneSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaneSpec {
    pub name: String,
    /// `None` means "use whatever pane is attached"
    pub split: Option<SplitSpec>,
    pub action: PaneAction,
}

/// What to type into a pane once it exists
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PaneAction {
    #[default]
    None,
    Command(String),
    /// Path fragment under the module directory
    Module(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SplitSpec {
    pub direction: SplitDirection,
    /// Name of an earlier pane to split away from
    pub from: Option<String>,
    pub width: Option<Size>,
    pub height: Option<Size>,
}

/// Read a config file into raw YAML.
pub fn load_config(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => DashError::ConfigNotFound(path.to_path_buf()),
        _ => DashError::Io {
            path: path.to_path_buf(),
            source: e,
        },
    })?;
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_yaml::from_str(&text)?)
}

/// Read and validate a config file.
pub fn load_and_validate(path: &Path) -> Result<Config> {
    validate(&load_config(path)?)
}

/// Where in the config a violation was found
#[derive(Default, Clone, Copy)]
struct Location<'a> {
    window: Option<&'a str>,
    pane: Option<&'a str>,
    directive: Option<&'a str>,
}

impl<'a> Location<'a> {
    fn window(window: &'a str) -> Self {
        Self {
            window: Some(window),
            ..Self::default()
        }
    }

    fn pane(self, pane: &'a str) -> Self {
        Self {
            pane: Some(pane),
            ..self
        }
    }

    fn directive(self, directive: &'a str) -> Self {
        Self {
            directive: Some(directive),
            ..self
        }
    }

    fn error(&self, problem: &str) -> DashError {
        let mut parts = Vec::new();
        if let Some(w) = self.window {
            parts.push(format!("window '{}'", w));
        }
        if let Some(p) = self.pane {
            parts.push(format!("pane '{}'", p));
        }
        if let Some(d) = self.directive {
            parts.push(format!("directive '{}'", d));
        }
        if parts.is_empty() {
            DashError::ConfigParse(problem.to_string())
        } else {
            DashError::ConfigParse(format!("{}: {}", problem, parts.join(", ")))
        }
    }
}

/// Check a parsed config against the layout grammar and build the typed model.
///
/// Fails with [`DashError::ConfigParse`] on the first violation.
pub fn validate(raw: &Value) -> Result<Config> {
    let windows = match raw {
        Value::Mapping(m) if !m.is_empty() => m,
        Value::Mapping(_) | Value::Null => return Err(Location::default().error("Empty config")),
        _ => return Err(Location::default().error("Config must be a mapping of windows")),
    };

    let mut config = Config {
        windows: Vec::with_capacity(windows.len()),
    };
    for (key, window) in windows {
        let name = key_name(key).ok_or_else(|| Location::default().error("Invalid window name"))?;
        config.windows.push(validate_window(&name, window)?);
    }
    Ok(config)
}

fn validate_window(name: &str, raw: &Value) -> Result<WindowSpec> {
    let at = Location::window(name);
    let window = raw
        .as_mapping()
        .ok_or_else(|| at.error("Window must be a mapping"))?;

    let number = match window.get(NUMBER_KEY) {
        None => return Err(at.error("No window number")),
        Some(v) => v
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| at.directive(NUMBER_KEY).error("Invalid window number"))?,
    };

    let pane_names = pane_names(window);
    let mut panes = Vec::new();
    for (key, pane) in window {
        let Some(pane_name) = key_name(key) else {
            return Err(at.error("Invalid pane name"));
        };
        if pane_name == NUMBER_KEY {
            continue;
        }
        panes.push(validate_pane(at.pane(&pane_name), &pane_name, pane, &pane_names)?);
    }

    Ok(WindowSpec {
        name: name.to_string(),
        number,
        panes,
    })
}

fn validate_pane(at: Location<'_>, name: &str, raw: &Value, siblings: &[String]) -> Result<PaneSpec> {
    let pane = raw
        .as_mapping()
        .ok_or_else(|| at.error("Pane must be a mapping"))?;

    // Presence is the gate, an empty split is still required.
    if pane.get("split").is_none() {
        return Err(at.error("\"split\" key missing"));
    }

    let mut spec = PaneSpec {
        name: name.to_string(),
        split: None,
        action: PaneAction::None,
    };
    let mut command = None;
    let mut module = None;

    for (key, value) in pane {
        let directive = key.as_str().unwrap_or_default();
        if !PANE_DIRECTIVES.contains(&directive) {
            let shown = key_name(key).unwrap_or_default();
            return Err(at.directive(&shown).error("Invalid directive"));
        }
        let at = at.directive(directive);
        match directive {
            "split" => spec.split = validate_split(at, value, siblings)?,
            "command" => command = Some(string_value(at, value)?),
            "module" => module = Some(string_value(at, value)?),
            _ => unreachable!("directive list checked above"),
        }
    }

    spec.action = match (command, module) {
        (Some(c), _) => PaneAction::Command(c),
        (None, Some(m)) => PaneAction::Module(m),
        (None, None) => PaneAction::None,
    };
    Ok(spec)
}

fn validate_split(at: Location<'_>, raw: &Value, siblings: &[String]) -> Result<Option<SplitSpec>> {
    let split = match raw {
        Value::Null => return Ok(None),
        Value::Mapping(m) if m.is_empty() => return Ok(None),
        Value::Mapping(m) => m,
        _ => return Err(at.error("Invalid value")),
    };

    let mut spec = SplitSpec::default();
    for (key, value) in split {
        let directive = key.as_str().unwrap_or_default();
        if !SPLIT_DIRECTIVES.contains(&directive) {
            let shown = format!("split.{}", key_name(key).unwrap_or_default());
            return Err(at.directive(&shown).error("Invalid directive"));
        }
        let shown = format!("split.{}", directive);
        let at = at.directive(&shown);
        match directive {
            "direction" => {
                spec.direction = serde_yaml::from_value(value.clone())
                    .map_err(|_| at.error("Invalid value"))?;
            }
            "from" => {
                let from = key_name(value)
                    .filter(|f| siblings.contains(f))
                    .ok_or_else(|| at.error("Pane not found"))?;
                spec.from = Some(from);
            }
            "width" => spec.width = Some(size_value(at, value)?),
            "height" => spec.height = Some(size_value(at, value)?),
            _ => unreachable!("directive list checked above"),
        }
    }
    Ok(Some(spec))
}

fn percent_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(\d+)%$").expect("static pattern"))
}

/// Parse a width/height value: a cell count or `"<digits>%"`.
fn size_value(at: Location<'_>, value: &Value) -> Result<Size> {
    let size = match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()).map(Size::Cells),
        Value::String(s) => percent_pattern()
            .captures(s.trim())
            .and_then(|caps| caps[1].parse().ok())
            .map(Size::Percent),
        _ => None,
    };
    size.ok_or_else(|| at.error("Invalid value"))
}

fn string_value(at: Location<'_>, value: &Value) -> Result<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| at.error("Invalid value"))
}

/// Render a mapping key as a name. YAML allows bare numbers as keys.
fn key_name(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Names of every pane declared in a window, regardless of order.
fn pane_names(window: &Mapping) -> Vec<String> {
    window
        .keys()
        .filter_map(key_name)
        .filter(|k| k != NUMBER_KEY)
        .collect()
}
