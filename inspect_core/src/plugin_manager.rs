//! Plugin Manager Module
//!
//! Owns every configured source plugin together with the filter-check
//! catalog their fields are registered in, and guarantees plugin ids and
//! names are unique across the plugins it holds.

use std::path::Path;

use liblogger::{log_error, log_info, Logger};
use plugin_api::SourcePluginInfo;

use crate::config::InspectConfig;
use crate::error::PluginError;
use crate::filtercheck::FilterCheckList;
use crate::plugin_loader::load_source_plugin;
use crate::source_plugin::SourcePlugin;

/// Manages the lifecycle of source plugins: binding, registration and teardown.
#[derive(Default)]
pub struct SourcePluginManager {
    // Dropped before the plugins so no filter check outlives its binding's state.
    filter_checks: FilterCheckList,
    plugins: Vec<SourcePlugin>,
}

impl SourcePluginManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a plugin from an in-process capability table.
    pub fn add_plugin(&mut self, info: &SourcePluginInfo, config: &str) -> Result<&SourcePlugin, PluginError> {
        let plugin = SourcePlugin::bind(info, config)?;
        self.install(plugin)
    }

    /// Loads a plugin library from `path` and binds it.
    pub fn load_plugin<P: AsRef<Path>>(&mut self, path: P, config: &str) -> Result<&SourcePlugin, PluginError> {
        let loaded = load_source_plugin(path)?;
        let plugin = SourcePlugin::bind_with_library(loaded.info(), config, Some(loaded.library()))?;
        log_info!(&format!(
            "Bound source plugin {} (id {}) from {}",
            plugin.name(),
            plugin.id(),
            loaded.path().display()
        ));
        self.install(plugin)
    }

    /// Loads every enabled plugin listed in `config`, stopping at the first failure.
    ///
    /// Returns the number of plugins loaded.
    pub fn load_from_config(&mut self, config: &InspectConfig) -> Result<usize, PluginError> {
        let mut loaded = 0;
        for plugin in config.plugins.iter().filter(|p| p.enabled) {
            let path = plugin.resolve_library_path(&config.general);
            log_info!(&format!("Loading source plugin {} from {}", plugin.name, path.display()));

            if let Err(e) = self.load_plugin(&path, &plugin.init_config) {
                log_error!(&format!("Failed to load source plugin {}: {}", plugin.name, e));
                return Err(e);
            }
            loaded += 1;
        }
        Ok(loaded)
    }

    fn install(&mut self, plugin: SourcePlugin) -> Result<&SourcePlugin, PluginError> {
        if let Some(existing) = self.plugin_by_id(plugin.id()) {
            return Err(PluginError::DuplicatePluginId {
                id: plugin.id(),
                existing: existing.name().to_string(),
            });
        }
        // Checks are registered and removed under `plugin_<name>`, so names must be unique too.
        if let Some(existing) = self.plugin_by_name(plugin.name()) {
            return Err(PluginError::DuplicatePluginName {
                name: plugin.name().to_string(),
                existing_id: existing.id(),
            });
        }

        plugin.register(&mut self.filter_checks);
        let index = self.plugins.len();
        self.plugins.push(plugin);
        Ok(&self.plugins[index])
    }

    /// Unregisters and releases the plugin with `id`. Returns whether it existed.
    pub fn unload_plugin(&mut self, id: u32) -> bool {
        let Some(position) = self.plugins.iter().position(|p| p.id() == id) else {
            return false;
        };

        let plugin = self.plugins.remove(position);
        self.filter_checks.remove(plugin.prototype().name());
        log_info!(&format!("Unloaded source plugin {} (id {})", plugin.name(), id));
        true
    }

    pub fn plugins(&self) -> &[SourcePlugin] {
        &self.plugins
    }

    pub fn plugin_by_id(&self, id: u32) -> Option<&SourcePlugin> {
        self.plugins.iter().find(|p| p.id() == id)
    }

    pub fn plugin_by_name(&self, name: &str) -> Option<&SourcePlugin> {
        self.plugins.iter().find(|p| p.name() == name)
    }

    pub fn filter_checks(&self) -> &FilterCheckList {
        &self.filter_checks
    }

    /// Unregisters every filter check, then releases every plugin.
    pub fn shutdown(&mut self) {
        if self.plugins.is_empty() {
            return;
        }
        self.filter_checks.clear();
        let count = self.plugins.len();
        self.plugins.clear();
        log_info!(&format!("Released {} source plugins", count));
        if let Err(e) = Logger::flush() {
            eprintln!("Failed to flush logs: {}", e);
        }
    }
}

impl Drop for SourcePluginManager {
    fn drop(&mut self) {
        self.shutdown();
    }
}
