use std::env;

use serde::{Deserialize, Serialize};

use self::dictionary::DictionaryConfig;
use self::hover::HoverConfig;
use self::popup::PopupConfig;

pub mod dictionary;
pub mod hover;
pub mod popup;

fn default_channel_capacity() -> usize {
    64
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub hover: HoverConfig,
    pub dictionary: DictionaryConfig,
    pub popup: PopupConfig,

    /// Capacity of each page <-> background message channel
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
    /// Emit logs as JSON lines
    pub log_json: bool,
}

impl Config {
    pub fn new() -> Self {
        let channel_capacity = env::var("CHANNEL_CAPACITY")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_channel_capacity);

        let log_json = env::var("HANZI_LOG_JSON")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Config {
            hover: HoverConfig::new(),
            dictionary: DictionaryConfig::new(),
            popup: PopupConfig::new(),

            channel_capacity,
            log_json,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hover: HoverConfig::default(),
            dictionary: DictionaryConfig::default(),
            popup: PopupConfig::default(),
            channel_capacity: default_channel_capacity(),
            log_json: false,
        }
    }
}
