//! Binding between the engine and one source plugin.
//!
//! A [`SourcePlugin`] is created from the plugin's capability table. It
//! checks the table once, runs the plugin's initializer, reads the plugin's
//! identity and field schema, and from then on owns the plugin's opaque
//! state until it is dropped.

use std::fmt;
use std::ptr;
use std::sync::Arc;

use libc::{c_char, c_void};
use libloading::Library;
use liblogger::{log_debug, log_info, LogLevel, Logger};
use plugin_api::{
    read_error, CloseFn, DestroyFn, EventToStringFn, ExtractAsStringFn, GetIdFn, GetStringFn,
    InitFn, NextFn, OpenFn, SourcePluginInfo, PLUGIN_EOF, PLUGIN_ERROR_BUF_SIZE, PLUGIN_FAILURE,
    PLUGIN_SUCCESS, PLUGIN_TIMEOUT,
};

use crate::error::PluginError;
use crate::event::Event;
use crate::field_info::FieldInfo;
use crate::filtercheck::FilterCheckList;
use crate::filtercheck_plugin::PluginFieldPrototype;
use crate::plugin_utils::string_from_plugin;
use crate::schema::parse_fields;

/// A capability table that passed validation.
///
/// Required callbacks are plain function pointers; only `init` and `destroy`
/// stay optional.
#[derive(Clone, Copy)]
pub struct PluginCallbacks {
    pub init: Option<InitFn>,
    pub destroy: Option<DestroyFn>,
    pub get_id: GetIdFn,
    pub get_name: GetStringFn,
    pub get_fields: GetStringFn,
    pub open: OpenFn,
    pub close: CloseFn,
    pub next: NextFn,
    pub event_to_string: EventToStringFn,
    pub extract_as_string: ExtractAsStringFn,
}

impl PluginCallbacks {
    /// Checks that every required capability is present.
    ///
    /// Nothing in the table is called. The first missing capability is
    /// reported, in the order get_id, open, close, next, event_to_string,
    /// get_name, get_fields, extract_as_string.
    pub fn from_info(info: &SourcePluginInfo) -> Result<Self, PluginError> {
        Ok(Self {
            get_id: required(info.get_id, "get_id")?,
            open: required(info.open, "open")?,
            close: required(info.close, "close")?,
            next: required(info.next, "next")?,
            event_to_string: required(info.event_to_string, "event_to_string")?,
            get_name: required(info.get_name, "get_name")?,
            get_fields: required(info.get_fields, "get_fields")?,
            extract_as_string: required(info.extract_as_string, "extract_as_string")?,
            init: info.init,
            destroy: info.destroy,
        })
    }
}

fn required<T>(callback: Option<T>, capability: &'static str) -> Result<T, PluginError> {
    callback.ok_or(PluginError::ContractViolation { capability })
}

/// The plugin's opaque state. Released through `destroy` exactly once, on drop.
struct PluginState {
    ptr: *mut c_void,
    destroy: Option<DestroyFn>,
}

// The pointer is only ever handed back to the plugin that produced it, and a
// binding is driven from one thread at a time.
unsafe impl Send for PluginState {}

impl PluginState {
    fn as_ptr(&self) -> *mut c_void {
        self.ptr
    }
}

impl Drop for PluginState {
    fn drop(&mut self) {
        if let Some(destroy) = self.destroy.take() {
            destroy(self.ptr);
        }
        self.ptr = ptr::null_mut();
    }
}

/// The immutable part of a binding, shared with every filter check built for it.
pub(crate) struct PluginShared {
    pub(crate) id: u32,
    pub(crate) name: String,
    pub(crate) fields: Vec<FieldInfo>,
    pub(crate) callbacks: PluginCallbacks,
    // Keeps the callbacks mapped for as long as any filter check can call them.
    _library: Option<Arc<Library>>,
}

/// A configured source plugin.
pub struct SourcePlugin {
    // Declared first so the state is destroyed while the library is still loaded.
    state: PluginState,
    shared: Arc<PluginShared>,
}

impl SourcePlugin {
    /// Binds the plugin and registers its filter check into `filter_checks`.
    ///
    /// Registration is the last step: when any earlier step fails the
    /// catalog is left untouched.
    pub fn configure(
        info: &SourcePluginInfo,
        config: &str,
        filter_checks: &mut FilterCheckList,
    ) -> Result<Self, PluginError> {
        let plugin = Self::bind(info, config)?;
        plugin.register(filter_checks);
        Ok(plugin)
    }

    /// Validates the table, initializes the plugin and parses its schema
    /// without registering anything.
    pub fn bind(info: &SourcePluginInfo, config: &str) -> Result<Self, PluginError> {
        Self::bind_with_library(info, config, None)
    }

    pub(crate) fn bind_with_library(
        info: &SourcePluginInfo,
        config: &str,
        library: Option<Arc<Library>>,
    ) -> Result<Self, PluginError> {
        let callbacks = PluginCallbacks::from_info(info)?;

        let name = unsafe { string_from_plugin((callbacks.get_name)()) }.ok_or_else(|| PluginError::NullReturn {
            plugin: "<unnamed>".to_string(),
            capability: "get_name",
        })?;

        let config = std::ffi::CString::new(config).map_err(|e| PluginError::InvalidConfig(e.to_string()))?;

        let state = match callbacks.init {
            Some(init) => {
                let mut err = [0 as c_char; PLUGIN_ERROR_BUF_SIZE];
                let mut rc = PLUGIN_FAILURE;
                let ptr = init(config.as_ptr(), err.as_mut_ptr(), &mut rc);
                if rc != PLUGIN_SUCCESS {
                    // A failed init hands back no state we are allowed to keep or destroy.
                    let mut message = read_error(&err);
                    if message.is_empty() {
                        message = format!("init returned {}", rc);
                    }
                    return Err(PluginError::Initialization { plugin: name, message });
                }
                PluginState {
                    ptr,
                    destroy: callbacks.destroy,
                }
            }
            None => PluginState {
                ptr: ptr::null_mut(),
                destroy: callbacks.destroy,
            },
        };

        let id = (callbacks.get_id)();

        let schema = unsafe { string_from_plugin((callbacks.get_fields)()) }.ok_or_else(|| PluginError::NullReturn {
            plugin: name.clone(),
            capability: "get_fields",
        })?;
        if Logger::enabled(LogLevel::Debug) {
            log_debug!(&format!("Parsing field schema of plugin {}", name), Some(schema.clone()));
        }

        let fields = parse_fields(&schema).map_err(|source| PluginError::Schema {
            plugin: name.clone(),
            source,
        })?;

        log_info!(&format!(
            "Configured source plugin {} (id {}) with {} fields",
            name,
            id,
            fields.len()
        ));

        Ok(Self {
            state,
            shared: Arc::new(PluginShared {
                id,
                name,
                fields,
                callbacks,
                _library: library,
            }),
        })
    }

    /// Adds this plugin's `plugin_<name>` filter check to the catalog.
    pub fn register(&self, filter_checks: &mut FilterCheckList) {
        filter_checks.add_filter_check(Box::new(self.prototype()));
    }

    /// A fresh prototype for this plugin's fields.
    pub fn prototype(&self) -> PluginFieldPrototype {
        PluginFieldPrototype::new(Arc::clone(&self.shared))
    }

    pub fn id(&self) -> u32 {
        self.shared.id
    }

    pub fn name(&self) -> &str {
        &self.shared.name
    }

    pub fn fields(&self) -> &[FieldInfo] {
        &self.shared.fields
    }

    /// Whether the plugin handed back a non-null state from `init`.
    pub fn has_state(&self) -> bool {
        !self.state.as_ptr().is_null()
    }

    /// Starts an event stream. The stream is closed when the session is dropped.
    pub fn open(&self) -> Result<CaptureSession<'_>, PluginError> {
        let mut rc = PLUGIN_FAILURE;
        let handle = (self.shared.callbacks.open)(self.state.as_ptr(), &mut rc);
        if rc != PLUGIN_SUCCESS {
            return Err(PluginError::Open {
                plugin: self.shared.name.clone(),
                rc,
            });
        }

        log_debug!(&format!("Opened event stream of plugin {}", self.shared.name));
        Ok(CaptureSession { plugin: self, handle })
    }

    /// Renders a payload with the plugin's `event_to_string`.
    pub fn event_to_string(&self, payload: &[u8]) -> Result<String, PluginError> {
        let len = u32::try_from(payload.len()).map_err(|_| PluginError::PayloadTooLarge { len: payload.len() })?;
        let rendered = (self.shared.callbacks.event_to_string)(payload.as_ptr(), len);
        unsafe { string_from_plugin(rendered) }.ok_or_else(|| PluginError::NullReturn {
            plugin: self.shared.name.clone(),
            capability: "event_to_string",
        })
    }
}

impl fmt::Debug for SourcePlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourcePlugin")
            .field("id", &self.shared.id)
            .field("name", &self.shared.name)
            .field("fields", &self.shared.fields.len())
            .field("has_state", &self.has_state())
            .finish()
    }
}

impl Drop for SourcePlugin {
    fn drop(&mut self) {
        log_debug!(&format!("Releasing source plugin {} (id {})", self.shared.name, self.shared.id));
    }
}

/// Outcome of one `next` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextEvent {
    /// A plugin event carrying a copy of the payload.
    Event(Event),
    /// Nothing ready yet.
    Timeout,
    /// The stream is exhausted.
    Eof,
}

/// An open event stream of a [`SourcePlugin`].
pub struct CaptureSession<'a> {
    plugin: &'a SourcePlugin,
    handle: *mut c_void,
}

impl CaptureSession<'_> {
    pub fn next_event(&mut self) -> Result<NextEvent, PluginError> {
        let shared = &self.plugin.shared;
        let mut data: *mut u8 = ptr::null_mut();
        let mut len: u32 = 0;

        let rc = (shared.callbacks.next)(self.plugin.state.as_ptr(), self.handle, &mut data, &mut len);
        match rc {
            PLUGIN_SUCCESS => {
                let payload = if len == 0 {
                    Vec::new()
                } else if data.is_null() {
                    return Err(PluginError::NullReturn {
                        plugin: shared.name.clone(),
                        capability: "next",
                    });
                } else {
                    // The buffer is only valid until the next call, so copy it out.
                    unsafe { std::slice::from_raw_parts(data, len as usize) }.to_vec()
                };
                Ok(NextEvent::Event(Event::plugin_event(shared.id, payload)))
            }
            PLUGIN_TIMEOUT => Ok(NextEvent::Timeout),
            PLUGIN_EOF => Ok(NextEvent::Eof),
            rc => Err(PluginError::Next {
                plugin: shared.name.clone(),
                rc,
            }),
        }
    }
}

impl Drop for CaptureSession<'_> {
    fn drop(&mut self) {
        (self.plugin.shared.callbacks.close)(self.plugin.state.as_ptr(), self.handle);
        log_debug!(&format!("Closed event stream of plugin {}", self.plugin.shared.name));
    }
}
