//! Live relay of board events to connected clients.
//!
//! # Architecture
//!
//! - **Topic-scoped routing**: every live connection joins one or more topics
//!   (Trello board ids). An event goes only to the connections subscribed to
//!   its board.
//! - **Dual-index registry**: `ConnectionRegistry` keeps connections by id and
//!   a topic index over them, both in DashMaps, so join, leave and lookup
//!   never take a global lock.
//! - **Bounded per-connection queues**: publishing only enqueues. Each
//!   connection task writes its own queue to its own socket, and a connection
//!   whose queue overflows is dropped.
//! - **Ephemeral messages**: nothing is stored. A client that is not connected
//!   when an event arrives never sees it.
//!
//! # Message Flow
//!
//! 1. A client opens `/ws` or `/sse`; the web layer calls
//!    `Manager::open_connection` with the board to follow
//! 2. A webhook delivery is normalized into a `NormalizedEvent` and handed to
//!    the `EventPublisher`
//! 3. `RelayEventHandler` calls `Manager::publish`, which serializes the event
//!    once and enqueues it for every member of the topic
//! 4. On disconnect the connection task calls `Manager::unregister_connection`
//!    before dropping its socket
//!
//! # Modules
//!
//! - `connection`: ConnectionRegistry and ConnectionId
//! - `manager`: publishing and connection lifecycle
//! - `message`: the `board-update` wire frame
//! - `domain_event_handler`: `EventHandler` bridge from the events crate

pub mod connection;
pub mod domain_event_handler;
pub mod manager;
pub mod message;

pub use domain_event_handler::RelayEventHandler;
pub use manager::Manager;
