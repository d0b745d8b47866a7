use crate::params::live::ConnectParams;
use crate::AppState;
use async_stream::stream;
use axum::extract::{Query, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use log::*;
use relay::connection::ConnectionId;
use relay::Manager;
use std::convert::Infallible;
use std::sync::Arc;

/// Unregisters its connection when the SSE stream is dropped, which is
/// how axum reports that the client went away.
struct ConnectionGuard {
    manager: Arc<Manager>,
    connection_id: ConnectionId,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        debug!(
            "SSE connection {} closed, cleaning up",
            self.connection_id.as_str()
        );
        self.manager.unregister_connection(&self.connection_id);
    }
}

/// GET a Server-Sent Events stream of board updates
///
/// Every update is an event named `board-update` whose data is
/// `{"topic", "kind", "payload"}`.
#[utoipa::path(
    get,
    path = "/sse",
    params(ConnectParams),
    responses(
        (status = 200, description = "Event stream of board updates", content_type = "text/event-stream", body = String),
    )
)]
pub(crate) async fn sse_handler(
    State(app_state): State<AppState>,
    Query(params): Query<ConnectParams>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let topic = params.topic_or(&app_state.default_topic);
    let manager = app_state.relay_manager.clone();
    let (connection_id, mut rx) = manager.open_connection(&topic);
    debug!(
        "SSE connection {} following board {topic}",
        connection_id.as_str()
    );

    let guard = ConnectionGuard {
        manager,
        connection_id,
    };

    // The stream ends when the registry drops the queue (slow client or
    // shutdown); the guard covers the client disconnecting first.
    let stream = stream! {
        let _guard = guard;
        while let Some(frame) = rx.recv().await {
            yield Ok(Event::default().event(frame.event()).data(frame.data()));
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}
