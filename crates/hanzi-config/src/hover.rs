use std::env;

use serde::{Deserialize, Serialize};

fn default_delay_ms() -> u64 {
    50
}

fn default_max_length() -> usize {
    7
}

fn default_hide_distance_px() -> f64 {
    4.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HoverConfig {
    /// How long the pointer must rest before a lookup fires
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
    /// Most characters collected from the page per lookup
    #[serde(default = "default_max_length")]
    pub max_length: usize,
    /// Pointer travel off text that dismisses the popup
    #[serde(default = "default_hide_distance_px")]
    pub hide_distance_px: f64,
}

impl HoverConfig {
    pub fn new() -> Self {
        let delay_ms = env::var("HOVER_DELAY_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_delay_ms);

        let max_length = env::var("HOVER_MAX_LENGTH")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|n: &usize| *n > 0)
            .unwrap_or_else(default_max_length);

        let hide_distance_px = env::var("HOVER_HIDE_DISTANCE_PX")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_hide_distance_px);

        Self {
            delay_ms,
            max_length,
            hide_distance_px,
        }
    }
}

impl Default for HoverConfig {
    fn default() -> Self {
        Self {
            delay_ms: default_delay_ms(),
            max_length: default_max_length(),
            hide_distance_px: default_hide_distance_px(),
        }
    }
}
