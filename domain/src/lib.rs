//! Domain layer of the board relay: classification of upstream webhook
//! payloads and the task/board operations proxied to Trello.

pub use events::{EventKind, NormalizedEvent, Topic};

pub mod board;
pub mod error;
pub mod gateway;
pub mod normalizer;
pub mod task;
