//! Task operations. A task is a Trello card; the relay keeps no state of
//! its own, every call goes straight to the upstream API.

use crate::error::Error;
use crate::gateway::trello::{Task, TrelloClient};
use log::*;
use serde_json::{Map, Value};

pub use crate::gateway::trello::Task as Model;

pub async fn create(
    client: &TrelloClient,
    list_id: &str,
    name: &str,
    desc: Option<&str>,
) -> Result<Task, Error> {
    let task = client.create_card(list_id, name, desc).await?;
    info!("Created task {} in list {list_id}", task.id);
    Ok(task)
}

pub async fn update(
    client: &TrelloClient,
    task_id: &str,
    fields: &Map<String, Value>,
) -> Result<Task, Error> {
    debug!(
        "Updating task {task_id} fields: {:?}",
        fields.keys().collect::<Vec<_>>()
    );
    client.update_card(task_id, fields).await
}

pub async fn delete(client: &TrelloClient, task_id: &str) -> Result<(), Error> {
    client.delete_card(task_id).await?;
    info!("Deleted task {task_id}");
    Ok(())
}
