use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::Maturity;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse JSON config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to parse YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Unsupported config format for {0} (expected .json, .yaml, or .yml)")]
    UnsupportedFormat(PathBuf),
}

/// Convenience result type for config operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Keyboard commands of a microcode text view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    /// Prompt for a block number or address and jump to it.
    pub goto: char,
    /// Open the expression graph of the instruction under the cursor.
    pub insn_graph: char,
    /// Open the block graph of the whole function.
    pub block_graph: char,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self { goto: 'G', insn_graph: 'I', block_graph: 'M' }
    }
}

/// Serializable explorer settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    /// How many text views may share one base title (the first plus suffixed copies).
    pub max_title_instances: usize,
    /// Maturity preselected when generating microcode.
    pub default_maturity: Maturity,
    /// Whether explorer views retain the microcode so graphs can be opened.
    pub keep_ir: bool,
    pub keys: KeyBindings,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            max_title_instances: 3,
            default_maturity: Maturity::Generated,
            keep_ir: true,
            keys: KeyBindings::default(),
        }
    }
}

/// Load an explorer config, choosing the format by file extension.
pub fn load_config(path: &Path) -> ConfigResult<ExplorerConfig> {
    let body = fs::read_to_string(path)
        .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => Ok(serde_json::from_str(&body)?),
        Some("yaml") | Some("yml") => Ok(serde_yaml::from_str(&body)?),
        _ => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
    }
}

/// Load the config at `path` if one is given and exists, defaults otherwise.
pub fn load_config_or_default(path: Option<&Path>) -> ConfigResult<ExplorerConfig> {
    match path {
        Some(p) if p.exists() => load_config(p),
        _ => Ok(ExplorerConfig::default()),
    }
}
