use domain::gateway::trello::TrelloClient;
use domain::Topic;
use events::EventPublisher;
use log::{error, info, warn};
use relay::{Manager, RelayEventHandler};
use service::{config::Config, logging::Logger};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let config = Config::new();
    if let Err(e) = Logger::init_logger(&config) {
        eprintln!("Failed to initialize logging: {e}");
        std::process::exit(1);
    }

    info!("Starting up board relay in {} mode", config.runtime_env());

    let default_topic = match config.trello_board_id().and_then(Topic::new) {
        Some(topic) => topic,
        None => {
            error!("TRELLO_BOARD_ID must be set to the board live clients follow by default");
            std::process::exit(1);
        }
    };

    let relay_manager = Arc::new(Manager::with_queue_capacity(
        config.outbound_queue_capacity,
    ));
    let event_publisher = EventPublisher::new()
        .with_handler(Arc::new(RelayEventHandler::new(relay_manager.clone())));

    // Webhooks still relay without credentials; only the task API needs them.
    let trello_client = match TrelloClient::new(&config) {
        Ok(client) => Some(client),
        Err(e) => {
            warn!("{e}. Task and board endpoints will fail until it is configured.");
            None
        }
    };

    let app_state = web::AppState::new(
        service::AppState::new(config),
        relay_manager,
        event_publisher,
        trello_client,
        default_topic,
    );

    if let Err(e) = web::init_server(app_state).await {
        error!("Server exited with an error: {e}");
        std::process::exit(1);
    }
}
