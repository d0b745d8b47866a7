use crate::Manager;
use async_trait::async_trait;
use events::{EventHandler, NormalizedEvent};
use log::*;
use std::sync::Arc;

/// Handles normalized events by pushing them to the live connections
/// subscribed to the event's board.
pub struct RelayEventHandler {
    manager: Arc<Manager>,
}

impl RelayEventHandler {
    pub fn new(manager: Arc<Manager>) -> Self {
        Self { manager }
    }
}

#[async_trait]
impl EventHandler for RelayEventHandler {
    async fn handle(&self, event: &NormalizedEvent) {
        debug!(
            "Handling {} event for board {}",
            event.kind(),
            event.topic()
        );
        self.manager.publish(event);
    }
}
