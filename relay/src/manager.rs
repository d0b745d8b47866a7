use crate::connection::{ConnectionId, ConnectionRegistry};
use crate::message::Frame;
use events::{NormalizedEvent, Topic};
use log::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError, Receiver, Sender};

/// Default bound of each connection's outbound queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Outcome of one [`Manager::publish`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishReport {
    /// Connections the event was queued for.
    pub delivered: usize,
    /// Connections that were full or already closed and got torn down.
    pub dropped: usize,
}

/// Routes board events to the live connections subscribed to each board.
///
/// Delivery only ever enqueues: every connection drains its own bounded
/// queue from its own task, so a slow peer fills up its queue and gets
/// dropped instead of holding up everyone else.
pub struct Manager {
    registry: Arc<ConnectionRegistry>,
    queue_capacity: usize,
    /// Set by `shutdown`; connections opened afterwards are closed at once.
    closed: AtomicBool,
}

impl Manager {
    pub fn new() -> Self {
        Self::with_queue_capacity(DEFAULT_QUEUE_CAPACITY)
    }

    pub fn with_queue_capacity(queue_capacity: usize) -> Self {
        Self {
            registry: Arc::new(ConnectionRegistry::new()),
            queue_capacity: queue_capacity.max(1),
            closed: AtomicBool::new(false),
        }
    }

    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    /// Register a connection backed by an existing queue sender.
    ///
    /// After `shutdown` the connection is removed again straight away, so its
    /// queue closes and the transport task ends instead of idling.
    pub fn register_connection(&self, sender: Sender<Frame>) -> ConnectionId {
        let connection_id = self.registry.register(sender);
        // Checked after inserting: either this sees the flag or the drain
        // in `shutdown` sees the entry.
        if self.closed.load(Ordering::SeqCst) {
            self.registry.unsubscribe_all(&connection_id);
            debug!(
                "Refused live connection {} during shutdown",
                connection_id.as_str()
            );
            return connection_id;
        }
        info!("Registered new live connection {}", connection_id.as_str());
        connection_id
    }

    /// Create a bounded outbound queue, register it, and subscribe it to
    /// `topic`. The caller's connection task drains the returned receiver.
    pub fn open_connection(&self, topic: &Topic) -> (ConnectionId, Receiver<Frame>) {
        let (tx, rx) = mpsc::channel(self.queue_capacity);
        let connection_id = self.register_connection(tx);
        self.subscribe(topic, &connection_id);
        (connection_id, rx)
    }

    pub fn subscribe(&self, topic: &Topic, connection_id: &ConnectionId) -> bool {
        let subscribed = self.registry.subscribe(topic, connection_id);
        if subscribed {
            debug!(
                "Connection {} joined topic {topic}",
                connection_id.as_str()
            );
        }
        subscribed
    }

    pub fn unsubscribe(&self, topic: &Topic, connection_id: &ConnectionId) {
        self.registry.unsubscribe(topic, connection_id);
    }

    /// Unregister a connection by ID, leaving every topic it joined.
    pub fn unregister_connection(&self, connection_id: &ConnectionId) {
        if self.registry.unsubscribe_all(connection_id) {
            info!("Unregistered live connection {}", connection_id.as_str());
        }
    }

    /// Push an event to every connection currently subscribed to its topic.
    ///
    /// Never blocks and never fails: a connection whose queue is full or
    /// closed is torn down and the rest still get the event.
    pub fn publish(&self, event: &NormalizedEvent) -> PublishReport {
        let frame = match Frame::board_update(event) {
            Ok(frame) => frame,
            Err(e) => {
                error!("Failed to serialize {} event: {e}", event.kind());
                return PublishReport::default();
            }
        };

        let mut report = PublishReport::default();
        for member in self.registry.members(event.topic()) {
            match member.sender.try_send(frame.clone()) {
                Ok(()) => report.delivered += 1,
                Err(TrySendError::Full(_)) => {
                    warn!(
                        "Connection {} is not keeping up ({} queued events). Dropping it.",
                        member.connection_id.as_str(),
                        self.queue_capacity
                    );
                    self.registry.unsubscribe_all(&member.connection_id);
                    report.dropped += 1;
                }
                Err(TrySendError::Closed(_)) => {
                    warn!(
                        "Connection {} is closed. Connection will be cleaned up.",
                        member.connection_id.as_str()
                    );
                    self.registry.unsubscribe_all(&member.connection_id);
                    report.dropped += 1;
                }
            }
        }

        info!(
            "Broadcasted {} to topic {}: {} delivered, {} dropped",
            event.kind(),
            event.topic(),
            report.delivered,
            report.dropped
        );
        report
    }

    /// Tear down every live connection. Their tasks see their queues close
    /// and shut the underlying sockets.
    pub fn shutdown(&self) -> usize {
        self.closed.store(true, Ordering::SeqCst);
        let closed = self.registry.drain();
        info!("Closed {closed} live connection(s)");
        closed
    }
}

impl Default for Manager {
    fn default() -> Self {
        Self::new()
    }
}
