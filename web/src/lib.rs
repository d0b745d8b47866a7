//! HTTP surface of the board relay: the Trello webhook receiver, the task
//! CRUD proxy and the live-connection endpoints.

use axum::http::{HeaderValue, Method};
use domain::gateway::trello::TrelloClient;
use domain::Topic;
use events::EventPublisher;
use log::*;
use relay::Manager;
use service::config::Config;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

pub use error::{Error, Result};

mod controller;
mod error;
mod extractors;
mod live;
mod params;
pub mod router;

/// State shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    pub service_state: service::AppState,
    pub relay_manager: Arc<Manager>,
    pub event_publisher: EventPublisher,
    /// `None` when Trello credentials aren't configured; the CRUD endpoints
    /// then fail while webhook relaying keeps working.
    pub trello_client: Option<Arc<TrelloClient>>,
    /// Board that live clients follow unless they ask for another.
    pub default_topic: Topic,
}

impl AppState {
    pub fn new(
        service_state: service::AppState,
        relay_manager: Arc<Manager>,
        event_publisher: EventPublisher,
        trello_client: Option<TrelloClient>,
        default_topic: Topic,
    ) -> Self {
        Self {
            service_state,
            relay_manager,
            event_publisher,
            trello_client: trello_client.map(Arc::new),
            default_topic,
        }
    }

    pub fn config(&self) -> &Config {
        self.service_state.config_ref()
    }

    pub fn trello_client(&self) -> core::result::Result<&TrelloClient, domain::error::Error> {
        self.trello_client
            .as_deref()
            .ok_or_else(|| domain::error::Error::config("Trello API credentials are not configured"))
    }
}

/// Serves the API until Ctrl-C or SIGTERM, then closes every live
/// connection and lets in-flight requests finish.
pub async fn init_server(app_state: AppState) -> std::io::Result<()> {
    let config = app_state.config();
    let interface = config.interface.as_deref().unwrap_or("0.0.0.0");
    let listen_addr = format!("{}:{}", interface, config.port);

    info!("Server starting... listening for connections on http://{listen_addr}");

    let cors_layer = cors_layer(config);
    let manager = app_state.relay_manager.clone();
    let listener = TcpListener::bind(&listen_addr).await?;
    let app = router::define_routes(app_state).layer(cors_layer);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(manager))
        .await
}

fn cors_layer(config: &Config) -> CorsLayer {
    let allowed_origins = if config.allows_any_origin() {
        AllowOrigin::from(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|origin| match origin.parse() {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!("Ignoring invalid CORS origin {origin:?}: {e}");
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::HEAD,
        ])
        .allow_headers(Any)
}

async fn shutdown_signal(manager: Arc<Manager>) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, closing live connections");
    manager.shutdown();
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_layer_builds_for_explicit_origins() {
        let config = Config::from_args([
            "board_relay",
            "--allowed-origins",
            "http://localhost:5173,not a header\nvalue",
        ]);
        assert!(!config.allows_any_origin());
        let _layer = cors_layer(&config);
    }

    #[test]
    fn test_trello_client_missing_is_a_config_error() {
        let config = test_support::config("http://127.0.0.1:9", &[]);
        let mut state = test_support::app_state(config);
        assert!(state.trello_client().is_ok());

        state.trello_client = None;
        let err = state.trello_client().err().unwrap();
        assert_eq!(
            err.to_string(),
            "Configuration error: Trello API credentials are not configured"
        );
    }
}
