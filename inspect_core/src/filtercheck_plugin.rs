//! Filter checks for fields declared by source plugins.
//!
//! One [`PluginFieldPrototype`] is registered per plugin under the name
//! `plugin_<plugin name>`. Every use of one of its fields in a filter
//! expression gets its own [`PluginFieldCheck`] bound to that field's index.
//!
//! All plugins share the [`PLUGIN_EVENT_TYPE`] tag, so matching the tag alone
//! would let a field of plugin A read events produced by plugin B. Extraction
//! therefore checks the tag first and then the plugin id carried in the event.

use std::ffi::CStr;
use std::fmt;
use std::sync::Arc;

use crate::error::{ExtractError, PluginError};
use crate::event::{Event, PLUGIN_EVENT_TYPE, PLUGIN_ID_PARAM, PLUGIN_PAYLOAD_PARAM};
use crate::field_info::{FieldInfo, FieldType};
use crate::filtercheck::{BoundFilterCheck, FilterCheck};
use crate::source_plugin::PluginShared;

/// The unbound filter check of one plugin. Inert until instantiated.
#[derive(Clone)]
pub struct PluginFieldPrototype {
    name: Arc<str>,
    shared: Arc<PluginShared>,
}

impl PluginFieldPrototype {
    pub(crate) fn new(shared: Arc<PluginShared>) -> Self {
        Self {
            name: Arc::from(format!("plugin_{}", shared.name)),
            shared,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn plugin_id(&self) -> u32 {
        self.shared.id
    }

    pub fn fields(&self) -> &[FieldInfo] {
        &self.shared.fields
    }

    /// Creates an instance bound to the field at `field_index`.
    pub fn instantiate(&self, field_index: usize) -> Result<PluginFieldCheck, PluginError> {
        if field_index >= self.shared.fields.len() {
            return Err(PluginError::FieldIndexOutOfRange {
                check: self.name.to_string(),
                index: field_index,
                count: self.shared.fields.len(),
            });
        }

        Ok(PluginFieldCheck {
            name: Arc::clone(&self.name),
            shared: Arc::clone(&self.shared),
            field_index,
            evaluations: 0,
            value: Vec::new(),
        })
    }

    pub fn instantiate_by_name(&self, field_name: &str) -> Result<PluginFieldCheck, PluginError> {
        let index = self
            .shared
            .fields
            .iter()
            .position(|f| f.name() == field_name)
            .ok_or_else(|| PluginError::UnknownField {
                check: self.name.to_string(),
                field: field_name.to_string(),
            })?;
        self.instantiate(index)
    }
}

impl fmt::Debug for PluginFieldPrototype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginFieldPrototype")
            .field("name", &self.name)
            .field("plugin_id", &self.shared.id)
            .field("fields", &self.shared.fields.len())
            .finish()
    }
}

impl FilterCheck for PluginFieldPrototype {
    fn name(&self) -> &str {
        &self.name
    }

    fn fields(&self) -> &[FieldInfo] {
        &self.shared.fields
    }

    fn allocate(&self, field_index: usize) -> Result<Box<dyn BoundFilterCheck>, PluginError> {
        Ok(Box::new(self.instantiate(field_index)?))
    }
}

/// A plugin field bound to one field index.
///
/// Clones share the plugin's callbacks and field list but keep their own
/// evaluation counter and value buffer.
#[derive(Clone)]
pub struct PluginFieldCheck {
    name: Arc<str>,
    shared: Arc<PluginShared>,
    field_index: usize,
    evaluations: u64,
    value: Vec<u8>,
}

impl PluginFieldCheck {
    pub fn field_index(&self) -> usize {
        self.field_index
    }

    pub fn field(&self) -> &FieldInfo {
        &self.shared.fields[self.field_index]
    }

    pub fn plugin_id(&self) -> u32 {
        self.shared.id
    }

    /// Number of events this instance has been evaluated against.
    pub fn evaluations(&self) -> u64 {
        self.evaluations
    }

    pub fn reset_evaluations(&mut self) {
        self.evaluations = 0;
    }

    /// Extracts the bound field from `evt`.
    ///
    /// Returns `Ok(None)` for events that are not plugin events or that were
    /// produced by a different plugin. String values are copied out of the
    /// plugin's buffer; the returned slice lives until the next call.
    ///
    /// `ExtractError::UnsupportedFieldType` is fatal: integer and float
    /// fields pass schema validation but have no extraction path.
    pub fn extract(&mut self, evt: &Event) -> Result<Option<&[u8]>, ExtractError> {
        self.evaluations += 1;

        if evt.event_type() != PLUGIN_EVENT_TYPE {
            return Ok(None);
        }

        if event_plugin_id(evt)? != self.shared.id {
            return Ok(None);
        }

        let payload = evt
            .param(PLUGIN_PAYLOAD_PARAM)
            .ok_or_else(|| ExtractError::MalformedEvent("missing payload parameter".to_string()))?;

        let field = &self.shared.fields[self.field_index];
        match field.field_type() {
            FieldType::String => {
                let len = u32::try_from(payload.len()).map_err(|_| {
                    ExtractError::MalformedEvent(format!("payload of {} bytes is too large", payload.len()))
                })?;

                let ret = (self.shared.callbacks.extract_as_string)(self.field_index as u32, payload.as_ptr(), len);
                if ret.is_null() {
                    return Err(ExtractError::ExtractionFailed {
                        plugin: self.shared.name.clone(),
                        field: field.name().to_string(),
                    });
                }

                // The plugin only guarantees the buffer until its next extraction.
                let bytes = unsafe { CStr::from_ptr(ret) }.to_bytes();
                self.value.clear();
                self.value.extend_from_slice(bytes);
                Ok(Some(self.value.as_slice()))
            }
            FieldType::Integer | FieldType::Float => Err(ExtractError::UnsupportedFieldType {
                field: field.name().to_string(),
                field_type: field.field_type(),
            }),
        }
    }
}

fn event_plugin_id(evt: &Event) -> Result<u32, ExtractError> {
    let raw = evt
        .param(PLUGIN_ID_PARAM)
        .ok_or_else(|| ExtractError::MalformedEvent("missing plugin id parameter".to_string()))?;
    let bytes: [u8; 4] = raw.try_into().map_err(|_| {
        ExtractError::MalformedEvent(format!("plugin id parameter is {} bytes, expected 4", raw.len()))
    })?;
    Ok(u32::from_ne_bytes(bytes))
}

impl fmt::Debug for PluginFieldCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginFieldCheck")
            .field("name", &self.name)
            .field("plugin_id", &self.shared.id)
            .field("field", &self.field().name())
            .field("evaluations", &self.evaluations)
            .finish()
    }
}

impl BoundFilterCheck for PluginFieldCheck {
    fn check_name(&self) -> &str {
        &self.name
    }

    fn field(&self) -> &FieldInfo {
        PluginFieldCheck::field(self)
    }

    fn extract(&mut self, evt: &Event) -> Result<Option<&[u8]>, ExtractError> {
        PluginFieldCheck::extract(self, evt)
    }

    fn clone_box(&self) -> Box<dyn BoundFilterCheck> {
        Box::new(self.clone())
    }
}
