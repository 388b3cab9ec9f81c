use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use hanzi_config::Config;

/// Load config from a JSON file; absent fields keep their defaults
pub fn load_config_file(path: &Path) -> anyhow::Result<Config> {
    tracing::info!("Loading config from {}", path.display());
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let config = serde_json::from_reader(reader)?;
    Ok(config)
}

/// Config file if given, environment otherwise
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => load_config_file(path),
        None => Ok(Config::new()),
    }
}
