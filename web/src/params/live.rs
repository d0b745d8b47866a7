use domain::Topic;
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct ConnectParams {
    /// Board to follow. Defaults to the board the relay is configured for.
    pub(crate) board: Option<String>,
}

impl ConnectParams {
    /// The requested board, or `default` when none (or a blank one) was given.
    pub(crate) fn topic_or(self, default: &Topic) -> Topic {
        self.board
            .and_then(Topic::new)
            .unwrap_or_else(|| default.clone())
    }
}
