//! Clients for the third-party services the relay talks to.

pub mod trello;
