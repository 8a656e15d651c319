//! The slice of the engine's event record the plugin bridge reads.

/// Type tag carried by every event produced by a source plugin.
///
/// All plugins share this one tag; the originating plugin is identified by
/// the id stored in parameter 0.
pub const PLUGIN_EVENT_TYPE: u16 = 322;

/// Index of the parameter holding the originating plugin id (4 bytes, native endian).
pub const PLUGIN_ID_PARAM: usize = 0;

/// Index of the parameter holding the plugin-defined payload.
pub const PLUGIN_PAYLOAD_PARAM: usize = 1;

/// An event record: a type tag plus raw parameter values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    event_type: u16,
    params: Vec<Vec<u8>>,
}

impl Event {
    pub fn new(event_type: u16, params: Vec<Vec<u8>>) -> Self {
        Self { event_type, params }
    }

    /// Builds a plugin event carrying `payload` on behalf of `plugin_id`.
    pub fn plugin_event(plugin_id: u32, payload: impl Into<Vec<u8>>) -> Self {
        Self::new(
            PLUGIN_EVENT_TYPE,
            vec![plugin_id.to_ne_bytes().to_vec(), payload.into()],
        )
    }

    pub fn event_type(&self) -> u16 {
        self.event_type
    }

    pub fn param(&self, index: usize) -> Option<&[u8]> {
        self.params.get(index).map(Vec::as_slice)
    }

    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    pub fn is_plugin_event(&self) -> bool {
        self.event_type == PLUGIN_EVENT_TYPE
    }
}
