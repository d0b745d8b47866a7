use crate::error::ErrorBody;
use crate::extractors::json_body::JsonBody;
use crate::params::task::CreateParams;
use crate::{AppState, Error};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::task as TaskApi;
use serde_json::{Map, Value};

use log::*;

/// POST create a new task (Trello card)
#[utoipa::path(
    post,
    path = "/api/tasks",
    request_body = CreateParams,
    responses(
        (status = 201, description = "Successfully created a new task", body = domain::gateway::trello::Task),
        (status = 500, description = "Trello API call failed", body = ErrorBody)
    )
)]
pub async fn create(
    State(app_state): State<AppState>,
    JsonBody(params): JsonBody<CreateParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST Create a new task from: {params:?}");

    let task = TaskApi::create(
        app_state.trello_client()?,
        &params.list_id,
        &params.name,
        params.desc.as_deref(),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(task)))
}

/// PUT update a task. The body is a map of Trello card fields and is
/// forwarded as-is.
#[utoipa::path(
    put,
    path = "/api/tasks/{task_id}",
    params(
        ("task_id" = String, Path, description = "Id of the task to update"),
    ),
    responses(
        (status = 200, description = "Successfully updated the task", body = domain::gateway::trello::Task),
        (status = 500, description = "Trello API call failed", body = ErrorBody)
    )
)]
pub async fn update(
    State(app_state): State<AppState>,
    Path(task_id): Path<String>,
    JsonBody(fields): JsonBody<Map<String, Value>>,
) -> Result<impl IntoResponse, Error> {
    debug!("PUT Update task {task_id}");

    let task = TaskApi::update(app_state.trello_client()?, &task_id, &fields).await?;

    Ok(Json(task))
}

/// DELETE a task
#[utoipa::path(
    delete,
    path = "/api/tasks/{task_id}",
    params(
        ("task_id" = String, Path, description = "Id of the task to delete"),
    ),
    responses(
        (status = 204, description = "Successfully deleted the task"),
        (status = 500, description = "Trello API call failed", body = ErrorBody)
    )
)]
pub async fn delete(
    State(app_state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<impl IntoResponse, Error> {
    debug!("DELETE task {task_id}");

    TaskApi::delete(app_state.trello_client()?, &task_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
