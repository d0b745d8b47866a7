use crate::params::live::ConnectParams;
use crate::AppState;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use domain::Topic;
use futures::{SinkExt, StreamExt};
use log::*;
use relay::Manager;
use std::sync::Arc;

/// GET a WebSocket of board updates
///
/// The connection is subscribed to the requested board (or the configured
/// one) as soon as the upgrade completes. Each update arrives as a text frame
/// holding `{"event": "board-update", "data": {"topic", "kind", "payload"}}`.
#[utoipa::path(
    get,
    path = "/ws",
    params(ConnectParams),
    responses(
        (status = 101, description = "Switched to the WebSocket protocol"),
        (status = 400, description = "Not a WebSocket upgrade request"),
    )
)]
pub(crate) async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<AppState>,
    Query(params): Query<ConnectParams>,
) -> impl IntoResponse {
    let topic = params.topic_or(&app_state.default_topic);
    let manager = app_state.relay_manager.clone();
    ws.on_upgrade(move |socket| handle_socket(socket, manager, topic))
}

/// Drives one WebSocket: forwards queued frames to the peer and watches for
/// the peer going away. Clients have nothing to say on this channel, so
/// anything they send is ignored.
async fn handle_socket(socket: WebSocket, manager: Arc<Manager>, topic: Topic) {
    let (mut sender, mut receiver) = socket.split();
    let (connection_id, mut outbound) = manager.open_connection(&topic);
    debug!(
        "WebSocket connection {} following board {topic}",
        connection_id.as_str()
    );

    loop {
        tokio::select! {
            frame = outbound.recv() => {
                // `None` once the registry has dropped us: slow peer or shutdown.
                let Some(frame) = frame else { break };
                if let Err(e) = sender.send(Message::Text(frame.to_envelope().into())).await {
                    debug!("WebSocket send to {} failed: {e}", connection_id.as_str());
                    break;
                }
            }
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => continue,
                Some(Err(e)) => {
                    debug!("WebSocket receive from {} failed: {e}", connection_id.as_str());
                    break;
                }
            },
        }
    }

    // Leave the registry before the socket goes away.
    manager.unregister_connection(&connection_id);
    let _ = sender.close().await;
    debug!("WebSocket connection {} closed", connection_id.as_str());
}

#[cfg(test)]
mod tests {
    use crate::router::define_routes;
    use crate::test_support;
    use domain::{EventKind, NormalizedEvent, Topic};
    use futures::{SinkExt, StreamExt};
    use relay::Manager;
    use serde_json::{json, Map, Value};
    use std::net::SocketAddr;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::net::TcpListener;
    use tokio_tungstenite::tungstenite::Message;

    async fn serve() -> (SocketAddr, Arc<Manager>) {
        let state = test_support::app_state(test_support::config("http://127.0.0.1:9", &[]));
        let manager = state.relay_manager.clone();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, define_routes(state)).await.unwrap();
        });
        (addr, manager)
    }

    // The socket task registers after the handshake response has been sent.
    async fn wait_for(mut condition: impl FnMut() -> bool) {
        for _ in 0..250 {
            if condition() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("condition not reached within 5s");
    }

    fn card_created(board: &str) -> NormalizedEvent {
        let mut payload = Map::new();
        payload.insert("card".to_string(), json!({"id": "C1", "name": "X"}));
        NormalizedEvent::new(Topic::new(board).unwrap(), EventKind::TaskCreated, payload)
    }

    #[tokio::test]
    async fn test_websocket_follows_configured_board_and_leaves_on_close() {
        let (addr, manager) = serve().await;
        let b1 = Topic::new("B1").unwrap();

        let (mut socket, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws"))
            .await
            .unwrap();
        wait_for(|| manager.registry().members(&b1).len() == 1).await;

        // Client messages are ignored.
        socket
            .send(Message::Text("hello".to_string().into()))
            .await
            .unwrap();
        manager.publish(&card_created("B2"));
        let report = manager.publish(&card_created("B1"));
        assert_eq!(report.delivered, 1);

        let message = tokio::time::timeout(Duration::from_secs(5), socket.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        let text = message.into_text().unwrap();
        let envelope: Value = serde_json::from_str(text.as_str()).unwrap();
        assert_eq!(
            envelope,
            json!({
                "event": "board-update",
                "data": {
                    "topic": "B1",
                    "kind": "TaskCreated",
                    "payload": {"card": {"id": "C1", "name": "X"}}
                }
            })
        );

        socket.close(None).await.unwrap();
        wait_for(|| manager.registry().connection_count() == 0).await;
        assert!(manager.registry().members(&b1).is_empty());
    }

    #[tokio::test]
    async fn test_websocket_board_query_selects_topic() {
        let (addr, manager) = serve().await;
        let b2 = Topic::new("B2").unwrap();

        let (socket, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws?board=B2"))
            .await
            .unwrap();
        wait_for(|| manager.registry().members(&b2).len() == 1).await;
        assert!(manager
            .registry()
            .members(&Topic::new("B1").unwrap())
            .is_empty());

        // Dropping the client without a close frame also tears the connection down.
        drop(socket);
        wait_for(|| manager.registry().connection_count() == 0).await;
    }

    #[tokio::test]
    async fn test_shutdown_closes_open_websockets() {
        let (addr, manager) = serve().await;

        let (mut socket, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws"))
            .await
            .unwrap();
        wait_for(|| manager.registry().connection_count() == 1).await;

        assert_eq!(manager.shutdown(), 1);

        let closed = tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                match socket.next().await {
                    Some(Ok(Message::Close(_))) | None | Some(Err(_)) => return,
                    Some(Ok(_)) => continue,
                }
            }
        })
        .await;
        assert!(closed.is_ok(), "server did not close the socket");
    }
}
