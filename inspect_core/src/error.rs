//! Error types for plugin setup and field extraction.

use std::path::PathBuf;

use thiserror::Error;

use crate::field_info::FieldType;

/// Reasons a plugin's field schema is rejected.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("field schema is not a valid JSON array of records: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("field schema declares no fields")]
    Empty,

    #[error("field entry {index} has no {attribute}")]
    MissingAttribute { index: usize, attribute: &'static str },

    #[error("field entry {index} has invalid type '{field_type}'")]
    InvalidType { index: usize, field_type: String },

    #[error("field entry {index} redeclares field '{name}'")]
    DuplicateField { index: usize, name: String },
}

/// Failures while binding, registering, loading or driving a source plugin.
#[derive(Debug, Error)]
pub enum PluginError {
    #[error("invalid source plugin: '{capability}' method missing")]
    ContractViolation { capability: &'static str },

    #[error("invalid plugin config: {0}")]
    InvalidConfig(String),

    #[error("plugin {plugin} failed to initialize: {message}")]
    Initialization { plugin: String, message: String },

    #[error("plugin {plugin}: '{capability}' returned null")]
    NullReturn { plugin: String, capability: &'static str },

    #[error("error in plugin {plugin}: {source}")]
    Schema {
        plugin: String,
        #[source]
        source: SchemaError,
    },

    #[error("field index {index} out of range for '{check}' ({count} fields)")]
    FieldIndexOutOfRange { check: String, index: usize, count: usize },

    #[error("'{check}' has no field named '{field}'")]
    UnknownField { check: String, field: String },

    #[error("plugin id {id} is already used by plugin {existing}")]
    DuplicatePluginId { id: u32, existing: String },

    #[error("plugin name {name} is already used by plugin id {existing_id}")]
    DuplicatePluginName { name: String, existing_id: u32 },

    #[error("plugin {plugin} failed to open an event stream (rc={rc})")]
    Open { plugin: String, rc: i32 },

    #[error("plugin {plugin} failed to produce an event (rc={rc})")]
    Next { plugin: String, rc: i32 },

    #[error("payload of {len} bytes does not fit the plugin ABI")]
    PayloadTooLarge { len: usize },

    #[error("failed to load plugin library {path}: {reason}")]
    Load { path: PathBuf, reason: String },
}

/// Failures while extracting a field value from an event.
///
/// A field that simply does not apply to an event is not an error; extractors
/// report that as `Ok(None)`.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("malformed plugin event: {0}")]
    MalformedEvent(String),

    #[error("plugin {plugin} returned no value for field '{field}'")]
    ExtractionFailed { plugin: String, field: String },

    /// The schema accepted a type the extractor has no path for. This is a
    /// contract violation between schema parsing and extraction, not a
    /// per-event condition, and must not be treated as an absent value.
    #[error("plugin extract error: unsupported field type {field_type} for field '{field}'")]
    UnsupportedFieldType { field: String, field_type: FieldType },
}
