use std::ffi::CStr;

use libc::c_char;

/// Returns the filename of the plugin based on platform (e.g., libfoo.so, foo.dll, libfoo.dylib)
pub fn resolve_plugin_filename(name: &str) -> String {
    if cfg!(target_os = "windows") {
        format!("{}.dll", name)
    } else if cfg!(target_os = "macos") {
        format!("lib{}.dylib", name)
    } else {
        format!("lib{}.so", name)
    }
}

/// Combines the folder and resolved filename into a full path.
pub fn resolve_plugin_binary_path(folder: &str, name: &str) -> String {
    let mut base_path = std::path::PathBuf::from(folder);
    base_path.push(resolve_plugin_filename(name));
    base_path.to_string_lossy().into_owned()
}

/// Copies a NUL-terminated string returned by a plugin. `None` for null.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string that stays valid
/// for the duration of the call.
pub(crate) unsafe fn string_from_plugin(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    Some(CStr::from_ptr(ptr).to_string_lossy().into_owned())
}
