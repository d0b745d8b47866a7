//! Event system infrastructure for the board relay.
//!
//! This crate defines the relay's stable internal representation of a board
//! change and the plumbing that hands those events to interested parties.
//!
//! # Architecture
//!
//! - **NormalizedEvent**: a classified upstream change scoped to one board
//! - **EventHandler**: Trait for implementing event handlers
//! - **EventPublisher**: Publishes events to registered handlers
//!
//! This crate has no dependencies on internal crates, so both the webhook
//! ingress (producer) and the live relay (consumer) can depend on it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Identifier of a broadcast scope. In practice this is a Trello board id.
///
/// A `Topic` is never empty; construct one with [`Topic::new`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Topic(String);

impl Topic {
    /// Returns `None` for an empty or all-whitespace identifier.
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            None
        } else {
            Some(Self(id))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The closed set of task changes the relay understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    TaskCreated,
    TaskUpdated,
    TaskMoved,
    TaskDeleted,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::TaskCreated => "TaskCreated",
            EventKind::TaskUpdated => "TaskUpdated",
            EventKind::TaskMoved => "TaskMoved",
            EventKind::TaskDeleted => "TaskDeleted",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A board change that has been classified and is ready to be relayed.
///
/// Fields are private so an event cannot be altered after construction;
/// the topic is non-empty by construction of [`Topic`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedEvent {
    topic: Topic,
    kind: EventKind,
    /// The upstream `action.data` object, passed through untouched.
    payload: Map<String, Value>,
}

impl NormalizedEvent {
    pub fn new(topic: Topic, kind: EventKind, payload: Map<String, Value>) -> Self {
        Self {
            topic,
            kind,
            payload,
        }
    }

    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn payload(&self) -> &Map<String, Value> {
        &self.payload
    }
}

/// Trait for handling normalized events.
/// Implementations perform side effects like pushing to live connections
/// or logging.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: &NormalizedEvent);
}

/// Publishes events to registered handlers.
/// Handlers are called sequentially in registration order.
#[derive(Clone)]
pub struct EventPublisher {
    handlers: Arc<Vec<Arc<dyn EventHandler>>>,
}

impl EventPublisher {
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(Vec::new()),
        }
    }

    /// Register a new event handler.
    /// Note: This creates a new publisher instance with the additional handler.
    /// Store the returned publisher in your application state.
    pub fn with_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        let mut handlers = (*self.handlers).clone();
        handlers.push(handler);
        self.handlers = Arc::new(handlers);
        self
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Publish an event to all registered handlers.
    /// Handlers don't report failures; each one deals with its own.
    pub async fn publish(&self, event: NormalizedEvent) {
        for handler in self.handlers.iter() {
            handler.handle(&event).await;
        }
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}
