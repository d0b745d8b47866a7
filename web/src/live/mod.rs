//! Live-connection HTTP handlers for the web layer.
//!
//! Both transports carry the same `board-update` frames. Routing, queues
//! and the topic registry live in the `relay` crate; these handlers only
//! move frames from a connection's queue onto its socket.

pub(crate) mod sse;
pub(crate) mod websocket;
