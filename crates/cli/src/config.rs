use anyhow::{Context, Result};
use index::FilterConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub filter: FilterConfig,
    /// Only the first `max_records` extraction records are scanned
    pub max_records: usize,
    pub output: OutputConfig,
    /// Reified keys that become document fields; all keys when unset
    pub allowed_keys: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub pretty: bool,
    /// Minimum relation count for an object to show up in class reports
    pub class_min_count: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            filter: FilterConfig::default(),
            max_records: 100_000,
            output: OutputConfig::default(),
            allowed_keys: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            pretty: true,
            class_min_count: 25,
        }
    }
}

impl AppConfig {
    /// Load from a JSON file; fields left out keep their defaults.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .context(format!("Failed to read config file: {:?}", path))?;
        Self::from_json(&content).context(format!("Failed to parse config file: {:?}", path))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub async fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path).await,
            None => Ok(Self::default()),
        }
    }
}
