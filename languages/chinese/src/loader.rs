use std::path::Path;

use hanzi_config::dictionary::DictionaryConfig;
use hanzi_core::dictionary::{DictionaryIndex, LoadError};

use crate::cedict;

pub struct CedictLoader;

impl CedictLoader {
    /// Load the bundled sample dictionary
    pub fn load_embedded() -> Result<DictionaryIndex, LoadError> {
        let content = include_str!("../data/cedict_sample.u8");
        tracing::info!("Loading embedded CC-CEDICT sample...");
        let dict = DictionaryIndex::build(cedict::parse(content)?)?;
        tracing::info!("Loaded {} dictionary entries", dict.entry_count());
        Ok(dict)
    }

    /// Load dictionary from file path. `.json` files hold raw entry records,
    /// anything else is read as CC-CEDICT.
    pub fn load_from_file(path: &Path) -> Result<DictionaryIndex, LoadError> {
        let content = std::fs::read_to_string(path)?;
        let dict = if path.extension().is_some_and(|ext| ext == "json") {
            tracing::info!("Loading JSON dictionary from file: {}", path.display());
            DictionaryIndex::from_json(&content)?
        } else {
            tracing::info!("Loading CC-CEDICT from file: {}", path.display());
            DictionaryIndex::build(cedict::parse(&content)?)?
        };
        tracing::info!("Loaded {} dictionary entries from file", dict.entry_count());
        Ok(dict)
    }

    /// Load the configured base dictionary and merge every additional file.
    /// Any failure aborts the whole load.
    pub fn load(config: &DictionaryConfig) -> Result<DictionaryIndex, LoadError> {
        let mut dict = match &config.path {
            Some(path) => Self::load_from_file(Path::new(path))?,
            None => Self::load_embedded()?,
        };

        for path in &config.additional_paths {
            let additional = Self::load_from_file(Path::new(path))?;
            tracing::info!("Merging additional dictionary from: {}", path);
            dict = dict.merge(additional);
        }

        Ok(dict)
    }
}
