use crate::error::ErrorBody;
use crate::extractors::json_body::JsonBody;
use crate::params::board::CreateParams;
use crate::{AppState, Error};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::board as BoardApi;

use log::*;

/// POST create a new board on Trello
#[utoipa::path(
    post,
    path = "/api/boards",
    request_body = CreateParams,
    responses(
        (status = 201, description = "Successfully created a new board", body = domain::gateway::trello::Board),
        (status = 500, description = "Trello API call failed", body = ErrorBody)
    )
)]
pub async fn create(
    State(app_state): State<AppState>,
    JsonBody(params): JsonBody<CreateParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST Create a new board from: {params:?}");

    let board = BoardApi::create(
        app_state.trello_client()?,
        &params.name,
        params.default_lists,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(board)))
}

#[cfg(test)]
mod tests {
    use crate::router::define_routes;
    use crate::test_support;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use mockito::{Matcher, Server};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn create_request(body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/boards")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_board_returns_201_with_board() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/boards")
            .match_query(Matcher::Any)
            .match_body(Matcher::Json(json!({"name": "Hiring", "defaultLists": true})))
            .with_status(200)
            .with_body(json!({"id": "B1", "name": "Hiring", "prefs": {"background": "blue"}}).to_string())
            .create_async()
            .await;

        let app = define_routes(test_support::app_state(test_support::config(&server.url(), &[])));
        let response = app
            .oneshot(create_request(json!({"name": "Hiring", "defaultLists": true})))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({"id": "B1", "name": "Hiring", "prefs": {"background": "blue"}}));
    }

    #[tokio::test]
    async fn test_create_board_upstream_failure_returns_500() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/boards")
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let app = define_routes(test_support::app_state(test_support::config(&server.url(), &[])));
        let response = app
            .oneshot(create_request(json!({"name": "Hiring"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            body,
            json!({"error": "Failed upstream API call to /boards. Status: 500"})
        );
    }
}
