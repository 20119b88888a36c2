use serde::{Deserialize, Serialize};
use tracing::warn;

/// How the renderer draws the series. Bar covers grouped and stacked bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChartMode {
    #[default]
    Line,
    Bar,
}

impl ChartMode {
    pub fn parse_or_default(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "line" | "area" => ChartMode::Line,
            "bar" | "stacked" | "grouped" => ChartMode::Bar,
            _ => {
                warn!("Unknown chart mode {:?}, falling back to line", raw);
                ChartMode::Line
            }
        }
    }
}
