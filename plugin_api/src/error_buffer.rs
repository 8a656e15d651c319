use libc::c_char;

/// Size in bytes of the diagnostic buffer handed to a plugin's `init`.
///
/// The buffer includes room for the terminating NUL, so at most
/// `PLUGIN_ERROR_BUF_SIZE - 1` bytes of message survive.
pub const PLUGIN_ERROR_BUF_SIZE: usize = 256;

/// Copies `message` into a plugin error buffer, truncating it to fit.
///
/// Intended for plugin authors filling in the `err` argument of `init`.
///
/// # Safety
/// `buf` must be null or point to at least [`PLUGIN_ERROR_BUF_SIZE`] writable bytes.
pub unsafe fn write_error(buf: *mut c_char, message: &str) {
    if buf.is_null() {
        return;
    }

    let bytes = message.as_bytes();
    let len = bytes.len().min(PLUGIN_ERROR_BUF_SIZE - 1);
    std::ptr::copy_nonoverlapping(bytes.as_ptr(), buf as *mut u8, len);
    *buf.add(len) = 0;
}

/// Reads the diagnostic a plugin left in an error buffer.
///
/// Stops at the first NUL; a buffer without one is read in full. Invalid
/// UTF-8 is replaced rather than rejected.
pub fn read_error(buf: &[c_char]) -> String {
    let bytes: Vec<u8> = buf
        .iter()
        .take_while(|c| **c != 0)
        .map(|c| *c as u8)
        .collect();
    String::from_utf8_lossy(&bytes).into_owned()
}
