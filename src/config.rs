//! Engine configuration.
//!
//! Loaded from a TOML file; every field has a default so a missing file
//! yields a working configuration.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::capability::{CapabilityCache, BASELINE_FORMATS};
use crate::path_template::PathResolver;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    #[error("Failed to parse config file {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Formats every runtime is assumed to decode
    #[serde(default = "default_baseline_formats")]
    pub baseline_formats: Vec<String>,

    /// Formats probed once at startup
    #[serde(default = "default_advanced_formats")]
    pub advanced_formats: Vec<String>,

    /// Path template macros, expanded before token substitution
    #[serde(default = "default_replacements")]
    pub replacements: BTreeMap<String, String>,

    /// Source id stamped on assets of packs that declare none
    #[serde(default = "default_builtin_pack_id")]
    pub builtin_pack_id: String,

    /// Prefix for `/`-rooted asset paths
    #[serde(default = "default_asset_root")]
    pub asset_root: String,
}

fn default_baseline_formats() -> Vec<String> {
    BASELINE_FORMATS.iter().map(|f| f.to_string()).collect()
}

fn default_advanced_formats() -> Vec<String> {
    vec!["webp".to_string()]
}

fn default_replacements() -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    map.insert(
        "ext".to_string(),
        "{lq:.lq:}.{format:webp:webp:png:png}".to_string(),
    );
    map
}

fn default_builtin_pack_id() -> String {
    "buildIn".to_string()
}

fn default_asset_root() -> String {
    "assets/".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            baseline_formats: default_baseline_formats(),
            advanced_formats: default_advanced_formats(),
            replacements: default_replacements(),
            builtin_pack_id: default_builtin_pack_id(),
            asset_root: default_asset_root(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.baseline_formats.is_empty() {
            return Err(ConfigError::Invalid(
                "baseline_formats must name at least one format".into(),
            ));
        }

        if let Some(name) = self
            .replacements
            .keys()
            .find(|name| name.is_empty() || name.contains([':', '{', '}']))
        {
            return Err(ConfigError::Invalid(format!(
                "replacement name {:?} must be non-empty and free of ':', '{{' and '}}'",
                name
            )));
        }

        Ok(())
    }

    pub fn resolver(&self) -> PathResolver {
        PathResolver::new(self.replacements.clone())
    }

    /// Build the process-wide capability cache. Call once and share the
    /// handle with every loader.
    pub fn capability_cache(&self) -> Arc<CapabilityCache> {
        Arc::new(CapabilityCache::new(
            self.baseline_formats.clone(),
            self.advanced_formats.clone(),
        ))
    }
}
