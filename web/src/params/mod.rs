//! This module holds typed parameters for various endpoint inputs.
//!
//! Request bodies use the field names of the public API (`listId`,
//! `defaultLists`), which are translated to Trello's names by the gateway.

pub(crate) mod board;
pub(crate) mod live;
pub(crate) mod task;
