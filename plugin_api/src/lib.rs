// plugin_api/src/lib.rs

pub mod error_buffer;
pub mod plugin_macros;
pub mod return_codes;
pub mod source_plugin_info;

pub use error_buffer::{read_error, write_error, PLUGIN_ERROR_BUF_SIZE};
pub use return_codes::{PLUGIN_EOF, PLUGIN_FAILURE, PLUGIN_SUCCESS, PLUGIN_TIMEOUT};
pub use source_plugin_info::*;

/// Name of the symbol every source plugin library must export.
///
/// The symbol is a function with the [`GetSourcePluginInfoFn`] signature
/// returning a pointer to a table that stays valid while the library is loaded.
pub const SOURCE_PLUGIN_ENTRY_SYMBOL: &[u8] = b"get_source_plugin_info";
