use std::env;

use serde::{Deserialize, Serialize};

fn default_width() -> f64 {
    400.0
}

fn default_height() -> f64 {
    200.0
}

fn default_offset_x() -> f64 {
    10.0
}

fn default_offset_y() -> f64 {
    20.0
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct PopupConfig {
    /// Used when the rendered popup reports a non-positive width
    #[serde(default = "default_width")]
    pub default_width: f64,
    #[serde(default = "default_height")]
    pub default_height: f64,
    #[serde(default = "default_offset_x")]
    pub offset_x: f64,
    #[serde(default = "default_offset_y")]
    pub offset_y: f64,
}

impl PopupConfig {
    pub fn new() -> Self {
        let read = |key: &str, fallback: fn() -> f64| {
            env::var(key)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(fallback)
        };

        Self {
            default_width: read("POPUP_DEFAULT_WIDTH", default_width),
            default_height: read("POPUP_DEFAULT_HEIGHT", default_height),
            offset_x: read("POPUP_OFFSET_X", default_offset_x),
            offset_y: read("POPUP_OFFSET_Y", default_offset_y),
        }
    }
}

impl Default for PopupConfig {
    fn default() -> Self {
        Self {
            default_width: default_width(),
            default_height: default_height(),
            offset_x: default_offset_x(),
            offset_y: default_offset_y(),
        }
    }
}
