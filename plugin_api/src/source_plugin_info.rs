use libc::{c_char, c_void};

/// Creates the plugin's private state from a NUL-terminated config string.
///
/// The plugin stores its status in `rc` and, on failure, a NUL-terminated
/// diagnostic of at most `PLUGIN_ERROR_BUF_SIZE` bytes in `err`.
pub type InitFn = extern "C" fn(config: *const c_char, err: *mut c_char, rc: *mut i32) -> *mut c_void;

/// Releases the state returned by `init`. Called at most once.
pub type DestroyFn = extern "C" fn(state: *mut c_void);

/// Returns the plugin's numeric id. Must be stable for the library's lifetime.
pub type GetIdFn = extern "C" fn() -> u32;

/// Returns a NUL-terminated string owned by the plugin.
pub type GetStringFn = extern "C" fn() -> *const c_char;

/// Starts an event stream and returns its handle.
pub type OpenFn = extern "C" fn(state: *mut c_void, rc: *mut i32) -> *mut c_void;

/// Ends an event stream started by `open`.
pub type CloseFn = extern "C" fn(state: *mut c_void, handle: *mut c_void);

/// Produces the next event payload. The buffer stays owned by the plugin and
/// is valid until the next call on the same handle.
pub type NextFn = extern "C" fn(
    state: *mut c_void,
    handle: *mut c_void,
    data: *mut *mut u8,
    datalen: *mut u32,
) -> i32;

/// Renders an event payload as a NUL-terminated string owned by the plugin.
pub type EventToStringFn = extern "C" fn(data: *const u8, datalen: u32) -> *const c_char;

/// Extracts field `field_id` from an event payload as a NUL-terminated string.
///
/// The returned buffer is owned by the plugin and only valid until the next
/// extraction call; a null return means the extraction failed.
pub type ExtractAsStringFn =
    extern "C" fn(field_id: u32, data: *const u8, datalen: u32) -> *const c_char;

/// Signature of the [`crate::SOURCE_PLUGIN_ENTRY_SYMBOL`] export.
pub type GetSourcePluginInfoFn = unsafe extern "C" fn() -> *const SourcePluginInfo;

/// The capability table a source plugin hands to the engine.
///
/// Every callback is optional at the ABI level so a table can be declared
/// partially; the engine checks the required ones before using any of them.
/// `init` and `destroy` are the only callbacks a plugin may legitimately omit.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct SourcePluginInfo {
    pub init: Option<InitFn>,
    pub destroy: Option<DestroyFn>,
    pub get_id: Option<GetIdFn>,
    pub get_name: Option<GetStringFn>,
    /// Returns the JSON field schema: an array of `{name, type, desc}` records.
    pub get_fields: Option<GetStringFn>,
    pub open: Option<OpenFn>,
    pub close: Option<CloseFn>,
    pub next: Option<NextFn>,
    pub event_to_string: Option<EventToStringFn>,
    pub extract_as_string: Option<ExtractAsStringFn>,
}

impl SourcePluginInfo {
    /// A table with no callbacks, handy as a base for struct update syntax.
    pub const fn empty() -> Self {
        Self {
            init: None,
            destroy: None,
            get_id: None,
            get_name: None,
            get_fields: None,
            open: None,
            close: None,
            next: None,
            event_to_string: None,
            extract_as_string: None,
        }
    }
}

impl Default for SourcePluginInfo {
    fn default() -> Self {
        Self::empty()
    }
}

impl std::fmt::Debug for SourcePluginInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourcePluginInfo")
            .field("init", &self.init.is_some())
            .field("destroy", &self.destroy.is_some())
            .field("get_id", &self.get_id.is_some())
            .field("get_name", &self.get_name.is_some())
            .field("get_fields", &self.get_fields.is_some())
            .field("open", &self.open.is_some())
            .field("close", &self.close.is_some())
            .field("next", &self.next.is_some())
            .field("event_to_string", &self.event_to_string.is_some())
            .field("extract_as_string", &self.extract_as_string.is_some())
            .finish()
    }
}
