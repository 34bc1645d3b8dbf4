use std::fmt;

/// A pane width or height as written in the config
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Size {
    /// Absolute number of terminal cells
    Cells(u32),
    /// Percentage of the terminal dimension, e.g. `"50%"`
    Percent(u32),
}

impl Size {
    /// Convert to an absolute cell count against `dimension`.
    ///
    /// Percentages truncate: `50%` of 81 columns is 40.
    pub fn resolve(self, dimension: u32) -> u32 {
        match self {
            Size::Cells(n) => n,
            Size::Percent(p) => (u64::from(p) * u64::from(dimension) / 100) as u32,
        }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Size::Cells(n) => write!(f, "{}", n),
            Size::Percent(p) => write!(f, "{}%", p),
        }
    }
}
