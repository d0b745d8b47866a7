use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(as = CreateBoardParams)]
pub struct CreateParams {
    pub name: String,
    /// Whether Trello should add its default lists to the new board.
    pub default_lists: Option<bool>,
}
