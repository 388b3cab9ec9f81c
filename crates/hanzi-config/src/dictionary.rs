use std::env;

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct DictionaryConfig {
    /// CC-CEDICT file to load; the bundled sample is used when unset
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub additional_paths: Vec<String>,
}

impl DictionaryConfig {
    pub fn new() -> Self {
        let path = env::var("DICTIONARY_PATH").ok().filter(|p| !p.is_empty());

        let additional_paths = env::var("DICTIONARY_ADDITIONAL_PATHS")
            .map(|v| {
                v.split(';')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            path,
            additional_paths,
        }
    }
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self {
            path: None,
            additional_paths: vec![],
        }
    }
}
