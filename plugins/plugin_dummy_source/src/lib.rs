//! A source plugin emitting `count` synthetic events, then EOF.
//!
//! Init config (JSON, all keys optional):
//!
//! ```json
//! {"count": 3, "prefix": "event"}
//! ```

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::ptr;

use libc::{c_char, c_void};
use liblogger::{log_debug, log_info};
use plugin_api::{
    declare_source_plugin, write_error, SourcePluginInfo, PLUGIN_EOF, PLUGIN_FAILURE, PLUGIN_SUCCESS,
};
use serde::Deserialize;

pub const DUMMY_PLUGIN_ID: u32 = 999;

const PLUGIN_NAME: &[u8] = b"dummy\0";

const FIELDS: &[u8] = concat!(
    r#"[{"name":"dummy.value","type":"string","desc":"The full event payload"},"#,
    r#"{"name":"dummy.prefix","type":"string","desc":"The configured payload prefix"},"#,
    r#"{"name":"dummy.seq","type":"integer","desc":"Sequence number of the event"}]"#,
    "\0"
)
.as_bytes();

#[derive(Debug, Deserialize)]
#[serde(default)]
struct DummyConfig {
    count: u64,
    prefix: String,
}

impl Default for DummyConfig {
    fn default() -> Self {
        Self {
            count: 3,
            prefix: "event".to_string(),
        }
    }
}

struct DummyState {
    config: DummyConfig,
}

struct DummyStream {
    emitted: u64,
    payload: Vec<u8>,
}

thread_local! {
    // Strings handed to the engine stay valid until the next call on this thread.
    static RETURNED: RefCell<CString> = RefCell::new(CString::default());
}

fn hand_out(text: String) -> *const c_char {
    let Ok(text) = CString::new(text) else {
        return ptr::null();
    };
    RETURNED.with(|cell| {
        *cell.borrow_mut() = text;
        cell.borrow().as_ptr()
    })
}

fn payload_str<'a>(data: *const u8, datalen: u32) -> Option<&'a str> {
    if data.is_null() {
        return None;
    }
    let bytes = unsafe { std::slice::from_raw_parts(data, datalen as usize) };
    std::str::from_utf8(bytes).ok()
}

extern "C" fn plugin_init(config: *const c_char, err: *mut c_char, rc: *mut i32) -> *mut c_void {
    let raw = if config.is_null() {
        String::new()
    } else {
        unsafe { CStr::from_ptr(config) }.to_string_lossy().into_owned()
    };

    let parsed = if raw.trim().is_empty() {
        Ok(DummyConfig::default())
    } else {
        serde_json::from_str::<DummyConfig>(&raw)
    };

    match parsed {
        Ok(config) => {
            log_info!(&format!(
                "[plugin_dummy_source] init: {} events with prefix '{}'",
                config.count, config.prefix
            ));
            unsafe { *rc = PLUGIN_SUCCESS };
            Box::into_raw(Box::new(DummyState { config })) as *mut c_void
        }
        Err(e) => {
            unsafe {
                write_error(err, &format!("invalid config: {}", e));
                *rc = PLUGIN_FAILURE;
            }
            ptr::null_mut()
        }
    }
}

extern "C" fn plugin_destroy(state: *mut c_void) {
    if !state.is_null() {
        drop(unsafe { Box::from_raw(state as *mut DummyState) });
    }
    log_debug!("[plugin_dummy_source] destroy");
}

extern "C" fn plugin_get_id() -> u32 {
    DUMMY_PLUGIN_ID
}

extern "C" fn plugin_get_name() -> *const c_char {
    PLUGIN_NAME.as_ptr() as *const c_char
}

extern "C" fn plugin_get_fields() -> *const c_char {
    FIELDS.as_ptr() as *const c_char
}

extern "C" fn plugin_open(state: *mut c_void, rc: *mut i32) -> *mut c_void {
    if state.is_null() {
        unsafe { *rc = PLUGIN_FAILURE };
        return ptr::null_mut();
    }
    unsafe { *rc = PLUGIN_SUCCESS };
    Box::into_raw(Box::new(DummyStream {
        emitted: 0,
        payload: Vec::new(),
    })) as *mut c_void
}

extern "C" fn plugin_close(_state: *mut c_void, handle: *mut c_void) {
    if !handle.is_null() {
        drop(unsafe { Box::from_raw(handle as *mut DummyStream) });
    }
}

extern "C" fn plugin_next(state: *mut c_void, handle: *mut c_void, data: *mut *mut u8, datalen: *mut u32) -> i32 {
    if state.is_null() || handle.is_null() {
        return PLUGIN_FAILURE;
    }
    let state = unsafe { &*(state as *const DummyState) };
    let stream = unsafe { &mut *(handle as *mut DummyStream) };

    if stream.emitted >= state.config.count {
        return PLUGIN_EOF;
    }
    stream.emitted += 1;
    stream.payload = format!("{} {}", state.config.prefix, stream.emitted).into_bytes();

    unsafe {
        *data = stream.payload.as_mut_ptr();
        *datalen = stream.payload.len() as u32;
    }
    PLUGIN_SUCCESS
}

extern "C" fn plugin_event_to_string(data: *const u8, datalen: u32) -> *const c_char {
    match payload_str(data, datalen) {
        Some(payload) => hand_out(format!("dummy: {}", payload)),
        None => ptr::null(),
    }
}

extern "C" fn plugin_extract_as_string(field_id: u32, data: *const u8, datalen: u32) -> *const c_char {
    let Some(payload) = payload_str(data, datalen) else {
        return ptr::null();
    };
    let (prefix, seq) = payload.rsplit_once(' ').unwrap_or((payload, ""));

    match field_id {
        0 => hand_out(payload.to_string()),
        1 => hand_out(prefix.to_string()),
        2 => hand_out(seq.to_string()),
        _ => ptr::null(),
    }
}

declare_source_plugin!(SourcePluginInfo {
    init: Some(plugin_init),
    destroy: Some(plugin_destroy),
    get_id: Some(plugin_get_id),
    get_name: Some(plugin_get_name),
    get_fields: Some(plugin_get_fields),
    open: Some(plugin_open),
    close: Some(plugin_close),
    next: Some(plugin_next),
    event_to_string: Some(plugin_event_to_string),
    extract_as_string: Some(plugin_extract_as_string),
});

#[cfg(test)]
mod tests {
    use super::*;
    use inspect_core::error::{ExtractError, PluginError};
    use inspect_core::{FilterCheckList, NextEvent, SourcePlugin};

    fn info() -> SourcePluginInfo {
        unsafe { *get_source_plugin_info() }
    }

    #[test]
    fn exported_table_binds() {
        let mut checks = FilterCheckList::new();
        let plugin = SourcePlugin::configure(&info(), "", &mut checks).unwrap();

        assert_eq!(plugin.id(), DUMMY_PLUGIN_ID);
        assert_eq!(plugin.name(), "dummy");
        assert_eq!(plugin.fields().len(), 3);
        assert_eq!(checks.names(), vec!["plugin_dummy"]);
    }

    #[test]
    fn stream_follows_config() {
        let plugin = SourcePlugin::bind(&info(), r#"{"count": 2, "prefix": "tick"}"#).unwrap();
        let prototype = plugin.prototype();
        let mut value = prototype.instantiate_by_name("dummy.value").unwrap();
        let mut prefix = prototype.instantiate_by_name("dummy.prefix").unwrap();
        let mut seq = prototype.instantiate_by_name("dummy.seq").unwrap();

        let mut session = plugin.open().unwrap();
        let mut seen = Vec::new();
        while let NextEvent::Event(evt) = session.next_event().unwrap() {
            seen.push(String::from_utf8(value.extract(&evt).unwrap().unwrap().to_vec()).unwrap());
            assert_eq!(prefix.extract(&evt).unwrap(), Some(&b"tick"[..]));
            assert!(matches!(seq.extract(&evt), Err(ExtractError::UnsupportedFieldType { .. })));
        }

        assert_eq!(seen, vec!["tick 1", "tick 2"]);
        assert_eq!(plugin.event_to_string(b"tick 1").unwrap(), "dummy: tick 1");
    }

    #[test]
    fn invalid_config_fails_init() {
        let err = SourcePlugin::bind(&info(), "{not json").unwrap_err();
        match err {
            PluginError::Initialization { plugin, message } => {
                assert_eq!(plugin, "dummy");
                assert!(message.starts_with("invalid config:"), "{message}");
            }
            other => panic!("unexpected error {other}"),
        }
    }
}
