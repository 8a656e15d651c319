use std::path::{Path, PathBuf};
use std::sync::Arc;

use libloading::{Library, Symbol};
use liblogger::log_debug;
use plugin_api::{GetSourcePluginInfoFn, SourcePluginInfo, SOURCE_PLUGIN_ENTRY_SYMBOL};

use crate::error::PluginError;

/// A source plugin library and a copy of the capability table it exports.
pub struct LoadedLibrary {
    path: PathBuf,
    library: Arc<Library>,
    info: SourcePluginInfo,
}

impl LoadedLibrary {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn info(&self) -> &SourcePluginInfo {
        &self.info
    }

    /// Shared handle keeping the library mapped.
    pub fn library(&self) -> Arc<Library> {
        Arc::clone(&self.library)
    }
}

/// Loads a source plugin from a shared library file.
/// This assumes the plugin exports a `get_source_plugin_info()` function.
pub fn load_source_plugin<P: AsRef<Path>>(path: P) -> Result<LoadedLibrary, PluginError> {
    let path = path.as_ref().to_path_buf();
    let load_error = |reason: String| PluginError::Load {
        path: path.clone(),
        reason,
    };

    unsafe {
        let lib = Library::new(&path).map_err(|e| load_error(e.to_string()))?;

        let info = {
            let entry: Symbol<GetSourcePluginInfoFn> = lib
                .get(SOURCE_PLUGIN_ENTRY_SYMBOL)
                .map_err(|e| load_error(format!("missing symbol: {}", e)))?;

            let info_ptr = entry();
            if info_ptr.is_null() {
                return Err(load_error("get_source_plugin_info returned null".to_string()));
            }
            *info_ptr
        };

        log_debug!(&format!("Loaded plugin library {}", path.display()));

        Ok(LoadedLibrary {
            path,
            library: Arc::new(lib),
            info,
        })
    }
}
