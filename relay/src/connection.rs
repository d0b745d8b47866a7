use crate::message::Frame;
use dashmap::DashMap;
use events::Topic;
use log::*;
use std::collections::HashSet;
use tokio::sync::mpsc::Sender;

/// Unique identifier for a connection (server-generated)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

/// What the registry knows about a live connection: the write end of its
/// outbound queue and the topics it joined. The transport task owns the
/// socket itself.
#[derive(Debug)]
struct ConnectionInfo {
    sender: Sender<Frame>,
    topics: HashSet<Topic>,
}

/// One entry of a [`ConnectionRegistry::members`] snapshot.
#[derive(Debug, Clone)]
pub struct Member {
    pub connection_id: ConnectionId,
    pub sender: Sender<Frame>,
}

/// Concurrent topic registry with dual indices.
///
/// Lock ordering: a `connections` entry may be held while a `topic_index`
/// entry is taken, never the other way around. `subscribe` holds the
/// connection entry for its whole update, and `unsubscribe_all` removes the
/// connection entry before touching the index, so a subscribe racing a
/// teardown either completes first (and is then undone) or finds the
/// connection gone.
pub struct ConnectionRegistry {
    /// Primary storage: lookup by connection_id for registration/cleanup - O(1)
    connections: DashMap<ConnectionId, ConnectionInfo>,

    /// Secondary index: topic to subscribed connections, for routing - O(1)
    topic_index: DashMap<Topic, HashSet<ConnectionId>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
            topic_index: DashMap::new(),
        }
    }

    /// Register a new connection with no subscriptions - O(1)
    pub fn register(&self, sender: Sender<Frame>) -> ConnectionId {
        let connection_id = ConnectionId::new();
        self.connections.insert(
            connection_id.clone(),
            ConnectionInfo {
                sender,
                topics: HashSet::new(),
            },
        );
        connection_id
    }

    /// Add a connection to a topic. Subscribing twice is a no-op.
    ///
    /// Returns `false` if the connection isn't registered, e.g. because it
    /// was torn down concurrently.
    pub fn subscribe(&self, topic: &Topic, connection_id: &ConnectionId) -> bool {
        let Some(mut info) = self.connections.get_mut(connection_id) else {
            return false;
        };

        if info.topics.insert(topic.clone()) {
            self.topic_index
                .entry(topic.clone())
                .or_default()
                .insert(connection_id.clone());
        }
        true
    }

    /// Remove a connection from one topic. Unknown connections and topics
    /// the connection never joined are ignored.
    pub fn unsubscribe(&self, topic: &Topic, connection_id: &ConnectionId) {
        let Some(mut info) = self.connections.get_mut(connection_id) else {
            return;
        };

        if info.topics.remove(topic) {
            self.remove_from_index(topic, connection_id);
        }
    }

    /// Remove a connection from every topic and drop its queue sender.
    /// Safe to call for a connection that is already gone.
    pub fn unsubscribe_all(&self, connection_id: &ConnectionId) -> bool {
        // The connection entry goes first so no subscribe can slip in behind us.
        let Some((_, info)) = self.connections.remove(connection_id) else {
            return false;
        };

        for topic in &info.topics {
            self.remove_from_index(topic, connection_id);
        }
        true
    }

    fn remove_from_index(&self, topic: &Topic, connection_id: &ConnectionId) {
        if let Some(mut entry) = self.topic_index.get_mut(topic) {
            entry.remove(connection_id);

            // Clean up empty topic entries
            if entry.is_empty() {
                drop(entry); // Release lock before removal
                self.topic_index.remove_if(topic, |_, ids| ids.is_empty());
            }
        }
    }

    /// Point-in-time copy of the connections subscribed to `topic`.
    ///
    /// The returned list is detached from the registry, so callers may send
    /// to it while other tasks join and leave.
    pub fn members(&self, topic: &Topic) -> Vec<Member> {
        // Copy the ids and release the index entry before touching
        // `connections`, to respect the lock ordering.
        let connection_ids: Vec<ConnectionId> = match self.topic_index.get(topic) {
            Some(ids) => ids.iter().cloned().collect(),
            None => return Vec::new(),
        };

        connection_ids
            .into_iter()
            .filter_map(|connection_id| {
                let info = self.connections.get(&connection_id)?;
                // Left the topic between the two lookups.
                if !info.topics.contains(topic) {
                    return None;
                }
                let sender = info.sender.clone();
                drop(info);
                Some(Member {
                    connection_id,
                    sender,
                })
            })
            .collect()
    }

    /// Topics the connection currently belongs to.
    pub fn topics_of(&self, connection_id: &ConnectionId) -> Vec<Topic> {
        self.connections
            .get(connection_id)
            .map(|info| info.topics.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Tear down every connection. Returns how many were removed.
    pub fn drain(&self) -> usize {
        let connection_ids: Vec<ConnectionId> = self
            .connections
            .iter()
            .map(|entry| entry.key().clone())
            .collect();

        let removed = connection_ids
            .iter()
            .filter(|connection_id| self.unsubscribe_all(connection_id))
            .count();
        debug!("Drained {removed} connection(s) from the registry");
        removed
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn topic_count(&self) -> usize {
        self.topic_index.len()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
