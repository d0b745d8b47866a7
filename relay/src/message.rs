use events::NormalizedEvent;
use std::sync::Arc;

/// Event name live clients listen for. Kept apart from the HTTP API's naming.
pub const BOARD_UPDATE: &str = "board-update";

/// A serialized event ready to be written to any live transport.
///
/// The JSON body is produced once per publish and shared between every
/// recipient's queue.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    event: &'static str,
    data: Arc<str>,
}

impl Frame {
    pub fn board_update(event: &NormalizedEvent) -> Result<Self, serde_json::Error> {
        Ok(Self {
            event: BOARD_UPDATE,
            data: serde_json::to_string(event)?.into(),
        })
    }

    /// The event name (SSE `event:` field).
    pub fn event(&self) -> &'static str {
        self.event
    }

    /// The JSON body (SSE `data:` field).
    pub fn data(&self) -> &str {
        &self.data
    }

    /// Single-message form for transports without named events, such as a
    /// WebSocket text frame: `{"event": "board-update", "data": {...}}`.
    pub fn to_envelope(&self) -> String {
        // `data` is already valid JSON, so it is spliced in as-is.
        format!(r#"{{"event":"{}","data":{}}}"#, self.event, self.data)
    }
}
