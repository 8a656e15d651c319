#![allow(dead_code)]

//! In-process source plugins used by the integration tests.
//!
//! The init config doubles as a tag: lifecycle callbacks record how often
//! they ran per tag, so tests running in parallel do not see each other's
//! counts. A config starting with `fail` makes `init` fail.

use std::cell::RefCell;
use std::collections::HashMap;
use std::ffi::{CStr, CString};
use std::ptr;
use std::sync::Mutex;

use libc::{c_char, c_void};
use plugin_api::{write_error, SourcePluginInfo, PLUGIN_EOF, PLUGIN_FAILURE, PLUGIN_SUCCESS, PLUGIN_TIMEOUT};

pub const PROC_PLUGIN_ID: u32 = 5;
pub const OTHER_PLUGIN_ID: u32 = 7;
pub const TWIN_PLUGIN_ID: u32 = 8;

static DESTROYED: Mutex<Option<HashMap<String, usize>>> = Mutex::new(None);
static CLOSED: Mutex<Option<HashMap<String, usize>>> = Mutex::new(None);

fn bump(counter: &Mutex<Option<HashMap<String, usize>>>, tag: &str) {
    let mut guard = counter.lock().unwrap();
    *guard.get_or_insert_with(HashMap::new).entry(tag.to_string()).or_default() += 1;
}

fn read(counter: &Mutex<Option<HashMap<String, usize>>>, tag: &str) -> usize {
    counter
        .lock()
        .unwrap()
        .as_ref()
        .and_then(|m| m.get(tag).copied())
        .unwrap_or(0)
}

/// How many times `destroy` ran for the state created with config `tag`.
pub fn destroyed(tag: &str) -> usize {
    read(&DESTROYED, tag)
}

/// How many times `close` ran for streams opened on the state tagged `tag`.
pub fn closed(tag: &str) -> usize {
    read(&CLOSED, tag)
}

struct DemoState {
    tag: String,
}

/// Scripted event stream: `None` entries produce a timeout.
struct DemoStream {
    script: Vec<Option<&'static [u8]>>,
    cursor: usize,
    current: Vec<u8>,
}

extern "C" fn demo_init(config: *const c_char, err: *mut c_char, rc: *mut i32) -> *mut c_void {
    let tag = unsafe { CStr::from_ptr(config) }.to_string_lossy().into_owned();
    if tag.starts_with("fail") {
        unsafe {
            write_error(err, &format!("bad config: {}", tag));
            *rc = PLUGIN_FAILURE;
        }
        return ptr::null_mut();
    }

    unsafe { *rc = PLUGIN_SUCCESS };
    Box::into_raw(Box::new(DemoState { tag })) as *mut c_void
}

extern "C" fn demo_destroy(state: *mut c_void) {
    if state.is_null() {
        bump(&DESTROYED, "<null>");
        return;
    }
    let state = unsafe { Box::from_raw(state as *mut DemoState) };
    bump(&DESTROYED, &state.tag);
}

extern "C" fn demo_open(_state: *mut c_void, rc: *mut i32) -> *mut c_void {
    let stream = DemoStream {
        script: vec![Some(&b"nginx"[..]), None, Some(&b"redis"[..])],
        cursor: 0,
        current: Vec::new(),
    };
    unsafe { *rc = PLUGIN_SUCCESS };
    Box::into_raw(Box::new(stream)) as *mut c_void
}

extern "C" fn failing_open(_state: *mut c_void, rc: *mut i32) -> *mut c_void {
    unsafe { *rc = PLUGIN_FAILURE };
    ptr::null_mut()
}

extern "C" fn demo_close(state: *mut c_void, handle: *mut c_void) {
    drop(unsafe { Box::from_raw(handle as *mut DemoStream) });
    let tag = if state.is_null() {
        "<null>".to_string()
    } else {
        unsafe { &*(state as *const DemoState) }.tag.clone()
    };
    bump(&CLOSED, &tag);
}

extern "C" fn demo_next(_state: *mut c_void, handle: *mut c_void, data: *mut *mut u8, datalen: *mut u32) -> i32 {
    let stream = unsafe { &mut *(handle as *mut DemoStream) };
    let Some(step) = stream.script.get(stream.cursor).copied() else {
        return PLUGIN_EOF;
    };
    stream.cursor += 1;

    match step {
        Some(payload) => {
            stream.current = payload.to_vec();
            unsafe {
                *data = stream.current.as_mut_ptr();
                *datalen = stream.current.len() as u32;
            }
            PLUGIN_SUCCESS
        }
        None => PLUGIN_TIMEOUT,
    }
}

thread_local! {
    static RENDERED: RefCell<CString> = RefCell::new(CString::default());
}

fn hold(text: String) -> *const c_char {
    RENDERED.with(|cell| {
        *cell.borrow_mut() = CString::new(text).unwrap();
        cell.borrow().as_ptr()
    })
}

fn payload_text(data: *const u8, datalen: u32) -> String {
    let bytes = unsafe { std::slice::from_raw_parts(data, datalen as usize) };
    String::from_utf8_lossy(bytes).into_owned()
}

extern "C" fn demo_event_to_string(data: *const u8, datalen: u32) -> *const c_char {
    hold(format!("proc event: {}", payload_text(data, datalen)))
}

/// Field 0 returns the payload, field 1 its upper-case form, anything else fails.
extern "C" fn demo_extract_as_string(field_id: u32, data: *const u8, datalen: u32) -> *const c_char {
    let text = payload_text(data, datalen);
    match field_id {
        0 => hold(text),
        1 => hold(text.to_uppercase()),
        _ => ptr::null(),
    }
}

extern "C" fn proc_id() -> u32 {
    PROC_PLUGIN_ID
}

extern "C" fn proc_name() -> *const c_char {
    b"proc\0".as_ptr() as *const c_char
}

extern "C" fn proc_fields() -> *const c_char {
    concat!(
        r#"[{"name":"proc.name","type":"string","desc":"process name"},"#,
        r#"{"name":"proc.upper","type":"string","desc":"upper-case process name"},"#,
        r#"{"name":"proc.broken","type":"string","desc":"always fails"},"#,
        r#"{"name":"proc.pid","type":"integer","desc":"process id"},"#,
        r#"{"name":"proc.cpu","type":"float","desc":"cpu usage"}]"#,
        "\0"
    )
    .as_ptr() as *const c_char
}

extern "C" fn other_id() -> u32 {
    OTHER_PLUGIN_ID
}

extern "C" fn other_name() -> *const c_char {
    b"other\0".as_ptr() as *const c_char
}

extern "C" fn other_fields() -> *const c_char {
    b"[{\"name\":\"proc.name\",\"type\":\"string\",\"desc\":\"process name\"}]\0".as_ptr() as *const c_char
}

extern "C" fn twin_id() -> u32 {
    TWIN_PLUGIN_ID
}

extern "C" fn integer_fields() -> *const c_char {
    b"[{\"name\":\"a\",\"type\":\"integer\",\"desc\":\"d\"}]\0".as_ptr() as *const c_char
}

extern "C" fn bool_fields() -> *const c_char {
    b"[{\"name\":\"x\",\"type\":\"bool\",\"desc\":\"d\"}]\0".as_ptr() as *const c_char
}

extern "C" fn null_string() -> *const c_char {
    ptr::null()
}

/// Plugin id 5 named `proc` with string, integer and float fields.
pub fn proc_plugin_info() -> SourcePluginInfo {
    SourcePluginInfo {
        init: Some(demo_init),
        destroy: Some(demo_destroy),
        get_id: Some(proc_id),
        get_name: Some(proc_name),
        get_fields: Some(proc_fields),
        open: Some(demo_open),
        close: Some(demo_close),
        next: Some(demo_next),
        event_to_string: Some(demo_event_to_string),
        extract_as_string: Some(demo_extract_as_string),
    }
}

/// Plugin id 7 named `other`, declaring a field with the same name as `proc`.
pub fn other_plugin_info() -> SourcePluginInfo {
    SourcePluginInfo {
        get_id: Some(other_id),
        get_name: Some(other_name),
        get_fields: Some(other_fields),
        ..proc_plugin_info()
    }
}

/// Named `proc` like [`proc_plugin_info`], but with id 8.
pub fn twin_proc_plugin_info() -> SourcePluginInfo {
    SourcePluginInfo {
        get_id: Some(twin_id),
        ..proc_plugin_info()
    }
}

/// Same identity as `proc`, but the schema declares a single integer field.
pub fn integer_plugin_info() -> SourcePluginInfo {
    SourcePluginInfo {
        get_fields: Some(integer_fields),
        ..proc_plugin_info()
    }
}

/// Same identity as `proc`, but the schema uses the unknown type "bool".
pub fn bool_schema_plugin_info() -> SourcePluginInfo {
    SourcePluginInfo {
        get_fields: Some(bool_fields),
        ..proc_plugin_info()
    }
}

pub fn null_schema_plugin_info() -> SourcePluginInfo {
    SourcePluginInfo {
        get_fields: Some(null_string),
        ..proc_plugin_info()
    }
}

pub fn failing_open_plugin_info() -> SourcePluginInfo {
    SourcePluginInfo {
        open: Some(failing_open),
        ..proc_plugin_info()
    }
}

/// Names of the capabilities `configure` requires.
pub const REQUIRED_CAPABILITIES: [&str; 8] = [
    "get_id",
    "open",
    "close",
    "next",
    "event_to_string",
    "get_name",
    "get_fields",
    "extract_as_string",
];

/// `info` with the named required capability removed.
pub fn without(mut info: SourcePluginInfo, capability: &str) -> SourcePluginInfo {
    match capability {
        "get_id" => info.get_id = None,
        "open" => info.open = None,
        "close" => info.close = None,
        "next" => info.next = None,
        "event_to_string" => info.event_to_string = None,
        "get_name" => info.get_name = None,
        "get_fields" => info.get_fields = None,
        "extract_as_string" => info.extract_as_string = None,
        other => panic!("unknown capability {other}"),
    }
    info
}
