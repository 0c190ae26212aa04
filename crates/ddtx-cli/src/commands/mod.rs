pub mod batch;
pub mod config;
pub mod process;

use std::fs;
use std::path::Path;

use ddtx_core::{ExtractionConfig, SourceDocument};

/// Load the configuration given with `--config`, or the defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<ExtractionConfig> {
    match config_path {
        Some(path) => Ok(ExtractionConfig::from_file(Path::new(path))?),
        None => Ok(ExtractionConfig::default()),
    }
}

/// Read a token dump, naming it after the file when it carries no name.
pub fn read_source(path: &Path) -> anyhow::Result<SourceDocument> {
    let content = fs::read_to_string(path)?;
    let mut source: SourceDocument = serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Invalid token file {}: {}", path.display(), e))?;

    if source.file_name.is_empty() {
        source.file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
    }
    Ok(source)
}
