//! Column color palettes

use crate::core::{Color, Result, SankeyError};

/// The ten-color categorical cycle used when no palette is configured
pub const CATEGORICAL: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// Ordered list of colors, repeated cyclically when more are needed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Color>,
}

impl Palette {
    /// Build a palette from hex colors; each must look like `#rrggbb`
    pub fn new<I, S>(colors: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let colors: Vec<Color> = colors.into_iter().map(|c| Color::new(c)).collect();
        if colors.is_empty() {
            return Err(SankeyError::config_error("palette must contain at least one color"));
        }
        if let Some(bad) = colors.iter().find(|c| !is_hex_color(c.as_str())) {
            return Err(SankeyError::config_error(format!(
                "palette color '{}' is not a #rrggbb hex color",
                bad
            )));
        }
        Ok(Self { colors })
    }

    pub fn categorical() -> Self {
        Self {
            colors: CATEGORICAL.iter().map(|c| Color::new(*c)).collect(),
        }
    }

    /// Exactly `n` colors, cycling through the palette
    pub fn sized(&self, n: usize) -> Vec<Color> {
        self.colors.iter().cycle().take(n).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::categorical()
    }
}

fn is_hex_color(s: &str) -> bool {
    s.len() == 7 && s.starts_with('#') && s[1..].chars().all(|c| c.is_ascii_hexdigit())
}
