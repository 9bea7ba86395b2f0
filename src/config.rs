use crate::log_debug;
use crate::metadata::DEFAULT_LOG_LIMIT;
use crate::svn::DEFAULT_METADATA_DIR;

use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Project configuration filename, looked up in the project root
pub const PROJECT_CONFIG_FILENAME: &str = ".svnbuildinfo.toml";

/// Settings for talking to Subversion
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Executable used for every `svn` invocation
    #[serde(default = "default_svn_command")]
    pub svn_command: String,
    /// How many log entries end up in `tags`
    #[serde(default = "default_log_limit")]
    pub log_limit: usize,
    /// Administrative directory that marks a working copy root
    #[serde(default = "default_metadata_dir")]
    pub metadata_dir: String,
}

/// One configuration file; unset fields leave lower layers alone
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfigLayer {
    pub svn_command: Option<String>,
    pub log_limit: Option<usize>,
    pub metadata_dir: Option<String>,
}

fn default_svn_command() -> String {
    "svn".to_string()
}

fn default_log_limit() -> usize {
    DEFAULT_LOG_LIMIT
}

fn default_metadata_dir() -> String {
    DEFAULT_METADATA_DIR.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            svn_command: default_svn_command(),
            log_limit: default_log_limit(),
            metadata_dir: default_metadata_dir(),
        }
    }
}

impl Config {
    /// Load defaults, then the personal config, then the project config in
    /// `root`. Missing files are skipped; broken ones are errors.
    pub fn load(root: &Path) -> Result<Self> {
        Self::load_from(Self::personal_config_path().as_deref(), root)
    }

    /// Same layering as [`Config::load`] with an explicit personal config
    /// path. Project settings override personal ones field by field.
    pub fn load_from(personal: Option<&Path>, root: &Path) -> Result<Self> {
        let mut config = Self::default();

        if let Some(personal) = personal
            && let Some(layer) = Self::read_layer(personal)?
        {
            config.apply(layer);
        }

        if let Some(layer) = Self::read_layer(&Self::project_config_path(root))? {
            config.apply(layer);
        }

        log_debug!("Configuration loaded: {:?}", config);
        Ok(config)
    }

    /// Load only the project configuration on top of the defaults.
    pub fn load_project(root: &Path) -> Result<Self> {
        let mut config = Self::default();
        if let Some(layer) = Self::read_layer(&Self::project_config_path(root))? {
            config.apply(layer);
        }
        Ok(config)
    }

    pub fn apply(&mut self, layer: ConfigLayer) {
        if let Some(command) = layer.svn_command.filter(|c| !c.trim().is_empty()) {
            self.svn_command = command;
        }
        if let Some(limit) = layer.log_limit.filter(|l| *l > 0) {
            self.log_limit = limit;
        }
        if let Some(dir) = layer.metadata_dir.filter(|d| !d.trim().is_empty()) {
            self.metadata_dir = dir;
        }
    }

    pub fn project_config_path(root: &Path) -> PathBuf {
        root.join(PROJECT_CONFIG_FILENAME)
    }

    /// `<config dir>/svn-buildinfo/config.toml`, if the platform has one
    pub fn personal_config_path() -> Option<PathBuf> {
        config_dir().map(|dir| dir.join("svn-buildinfo").join("config.toml"))
    }

    fn read_layer(path: &Path) -> Result<Option<ConfigLayer>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let layer: ConfigLayer = toml::from_str(&content).with_context(|| {
            format!(
                "Invalid configuration file format in {}. Please check it for syntax errors.",
                path.display()
            )
        })?;

        log_debug!("Read config layer from {}: {:?}", path.display(), layer);
        Ok(Some(layer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.svn_command, "svn");
        assert_eq!(config.log_limit, 10);
        assert_eq!(config.metadata_dir, ".svn");
    }

    #[test]
    fn test_layer_overrides_only_set_fields() {
        let mut config = Config::default();
        config.apply(ConfigLayer {
            svn_command: Some("/opt/svn/bin/svn".to_string()),
            log_limit: None,
            metadata_dir: Some(String::new()),
        });
        assert_eq!(config.svn_command, "/opt/svn/bin/svn");
        assert_eq!(config.log_limit, 10);
        assert_eq!(config.metadata_dir, ".svn");
    }

    #[test]
    fn test_zero_log_limit_is_ignored() {
        let mut config = Config::default();
        config.apply(ConfigLayer {
            log_limit: Some(0),
            ..ConfigLayer::default()
        });
        assert_eq!(config.log_limit, 10);
    }
}
