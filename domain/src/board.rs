use crate::error::Error;
use crate::gateway::trello::{Board, TrelloClient};
use log::*;

pub use crate::gateway::trello::Board as Model;

/// Creates a board on Trello. When `default_lists` is `None` Trello decides
/// whether to add its standard To Do / Doing / Done lists.
pub async fn create(
    client: &TrelloClient,
    name: &str,
    default_lists: Option<bool>,
) -> Result<Board, Error> {
    let board = client.create_board(name, default_lists).await?;
    info!("Created board {} ({})", board.id, board.name);
    Ok(board)
}
