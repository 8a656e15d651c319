pub mod config;
pub mod error;
pub mod event;
pub mod field_info;
pub mod filtercheck;
pub mod filtercheck_plugin;
pub mod plugin_loader;
pub mod plugin_manager;
pub mod plugin_utils;
pub mod schema;
pub mod source_plugin;

pub use config::{ConfigLoader, InspectConfig};
pub use error::{ExtractError, PluginError, SchemaError};
pub use event::{Event, PLUGIN_EVENT_TYPE};
pub use field_info::{FieldInfo, FieldType, PrintFormat};
pub use filtercheck::{BoundFilterCheck, FilterCheck, FilterCheckList};
pub use filtercheck_plugin::{PluginFieldCheck, PluginFieldPrototype};
pub use plugin_loader::load_source_plugin;
pub use plugin_manager::SourcePluginManager;
pub use schema::parse_fields;
pub use source_plugin::{CaptureSession, NextEvent, PluginCallbacks, SourcePlugin};
