/// Return codes shared by the plugin callbacks that report a status.
///
/// The values line up with the capture library's codes so a plugin can hand
/// them through unchanged.

/// The call completed.
pub const PLUGIN_SUCCESS: i32 = 0;

/// The call failed. For `init` the plugin is expected to have written a
/// diagnostic into the error buffer.
pub const PLUGIN_FAILURE: i32 = 1;

/// `next` had no event ready; the caller may poll again.
pub const PLUGIN_TIMEOUT: i32 = -1;

/// `next` reached the end of the event stream.
pub const PLUGIN_EOF: i32 = 6;
