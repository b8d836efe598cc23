use crate::extract::patterns::PatternSpec;
use anyhow::{Context as AnyhowContext, Result};
use serde::{Deserialize, Serialize};
use std::fs;

pub const DEFAULT_MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// Runtime settings for the ingest boundary and the extractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Upload size limit in bytes.
    pub max_file_size: u64,
    /// Accepted file extensions, without the dot. A subset of `bpprocess`,
    /// `bpobject` and `bprelease`; anything else is rejected at startup.
    pub allowed_extensions: Vec<String>,
    /// Extra name rules, tried after the built-in ones.
    pub extra_patterns: Vec<PatternSpec>,
    /// Key prefix for the Redis analysis store.
    pub redis_key_prefix: String,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            allowed_extensions: vec!["bpprocess".into(), "bpobject".into(), "bprelease".into()],
            extra_patterns: Vec::new(),
            redis_key_prefix: "bpscan".to_string(),
        }
    }
}

pub fn load_config_from_yaml(file_path: &str) -> Result<AnalyzerConfig> {
    let yaml_content = fs::read_to_string(file_path)
        .with_context(|| format!("Failed to read config file from {}", file_path))?;

    let config: AnalyzerConfig = serde_yaml::from_str(&yaml_content)
        .with_context(|| format!("Failed to deserialize config from {}", file_path))?;

    Ok(config)
}
