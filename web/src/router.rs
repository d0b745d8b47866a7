use crate::controller::{
    board_controller, health_check_controller, task_controller, webhook_controller,
};
use crate::live::{sse, websocket};
use crate::{error, params, AppState};
use axum::{
    routing::{get, head, post, put},
    Router,
};

use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

// Global definition of the OpenAPI document. To be a part of the
// rendered document, a path and schema must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "Board Relay API"
        ),
        paths(
            board_controller::create,
            health_check_controller::health_check,
            sse::sse_handler,
            task_controller::create,
            task_controller::update,
            task_controller::delete,
            websocket::websocket_handler,
        ),
        components(
            schemas(
                domain::board::Model,
                domain::task::Model,
                error::ErrorBody,
                params::board::CreateParams,
                params::task::CreateParams,
            )
        ),
        tags(
            (name = "board_relay", description = "Trello board relay and task proxy API")
        )
    )]
struct ApiDoc;

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(board_routes(app_state.clone()))
        .merge(health_routes())
        .merge(task_routes(app_state.clone()))
        .merge(webhook_routes(app_state.clone()))
        .merge(live_routes(app_state))
        .merge(RapiDoc::with_openapi("/api-docs/openapi2.json", ApiDoc::openapi()).path("/rapidoc"))
}

fn board_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/api/boards", post(board_controller::create))
        .with_state(app_state)
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

fn task_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/api/tasks", post(task_controller::create))
        .route(
            "/api/tasks/{task_id}",
            put(task_controller::update).delete(task_controller::delete),
        )
        .with_state(app_state)
}

/// Trello deliveries (no authentication). `/api/webhook/trello` is the path
/// older webhook registrations point at.
fn webhook_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/api/webhook",
            head(webhook_controller::validate).post(webhook_controller::receive),
        )
        .route(
            "/api/webhook/trello",
            head(webhook_controller::validate).post(webhook_controller::receive),
        )
        .with_state(app_state)
}

fn live_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/ws", get(websocket::websocket_handler))
        .route("/sse", get(sse::sse_handler))
        .with_state(app_state)
}
