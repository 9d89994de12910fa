use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Category names seeded under the root on first run, in order
pub const DEFAULT_CATEGORIES: [&str; 8] = [
    "Health",
    "Relationships",
    "Work",
    "Travel",
    "Skills",
    "Money",
    "Home",
    "Creativity",
];

/// Configuration from config.toml in the data directory
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub map: MapConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    /// Categories created when the map is first generated
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,
    /// Zoom change for the zoom keys
    #[serde(default = "default_zoom_step")]
    pub zoom_step: f64,
    /// Zoom change per mouse wheel notch
    #[serde(default = "default_wheel_step")]
    pub wheel_step: f64,
    /// Pointer travel (in pixels) before a press on a node becomes a drag
    #[serde(default = "default_drag_threshold")]
    pub drag_threshold: f64,
}

impl Default for MapConfig {
    fn default() -> Self {
        MapConfig {
            categories: default_categories(),
            zoom_step: default_zoom_step(),
            wheel_step: default_wheel_step(),
            drag_threshold: default_drag_threshold(),
        }
    }
}

fn default_categories() -> Vec<String> {
    DEFAULT_CATEGORIES.iter().map(|s| s.to_string()).collect()
}

fn default_zoom_step() -> f64 {
    0.10
}

fn default_wheel_step() -> f64 {
    0.06
}

fn default_drag_threshold() -> f64 {
    3.0
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UiConfig {
    /// Theme overrides, e.g. `highlight = "#FB4196"`
    #[serde(default)]
    pub colors: HashMap<String, String>,
}
