use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(as = CreateTaskParams)]
pub struct CreateParams {
    /// The list the new task is added to.
    pub list_id: String,
    pub name: String,
    pub desc: Option<String>,
}
