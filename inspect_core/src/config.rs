use serde::Deserialize;
use std::{error::Error, fs, path::Path, path::PathBuf};

use crate::plugin_utils;

/// The engine's plugin configuration file.
///
/// ```toml
/// [general]
/// plugin_folder = "./plugins"
///
/// [[plugins]]
/// name = "cloudtrail"
/// init_config = "{\"s3\":\"bucket\"}"
///
/// [logging]
/// type = "console"
/// threshold = "info"
/// ```
///
/// The `[logging]` table is read by `liblogger` and ignored here.
#[derive(Debug, Deserialize)]
pub struct InspectConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub plugins: Vec<PluginConfig>,
}

#[derive(Debug, Deserialize)]
pub struct GeneralConfig {
    /// Folder searched for plugin libraries that have no explicit `library_path`.
    #[serde(default = "default_plugin_folder")]
    pub plugin_folder: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            plugin_folder: default_plugin_folder(),
        }
    }
}

fn default_plugin_folder() -> String {
    ".".to_string()
}

#[derive(Debug, Deserialize)]
pub struct PluginConfig {
    /// Plugin library name, without platform prefix or extension.
    pub name: String,

    /// Explicit path to the library. Overrides `general.plugin_folder`.
    #[serde(default)]
    pub library_path: Option<String>,

    /// Text handed to the plugin's `init` callback.
    #[serde(default)]
    pub init_config: String,

    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl PluginConfig {
    pub fn resolve_library_path(&self, general: &GeneralConfig) -> PathBuf {
        match &self.library_path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(plugin_utils::resolve_plugin_binary_path(&general.plugin_folder, &self.name)),
        }
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<InspectConfig, Box<dyn Error>> {
        let content = fs::read_to_string(path)?;
        Self::load_from_str(&content)
    }

    pub fn load_from_str(content: &str) -> Result<InspectConfig, Box<dyn Error>> {
        let config: InspectConfig = toml::from_str(content)?;

        Self::validate_general(&config.general)?;
        for (idx, plugin) in config.plugins.iter().enumerate() {
            Self::validate_plugin(plugin, idx)?;
        }

        Ok(config)
    }

    fn validate_general(general: &GeneralConfig) -> Result<(), Box<dyn Error>> {
        if general.plugin_folder.trim().is_empty() {
            return Err("Empty 'plugin_folder' in [general] section".into());
        }
        Ok(())
    }

    fn validate_plugin(plugin: &PluginConfig, index: usize) -> Result<(), Box<dyn Error>> {
        if plugin.name.trim().is_empty() {
            return Err(format!("Plugin at index {} is missing 'name'", index).into());
        }
        if let Some(path) = &plugin.library_path {
            if path.trim().is_empty() {
                return Err(format!("Plugin at index {} has an empty 'library_path'", index).into());
            }
        }
        if plugin.init_config.contains('\0') {
            return Err(format!("Plugin at index {} has a NUL byte in 'init_config'", index).into());
        }
        Ok(())
    }
}
