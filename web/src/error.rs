use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use domain::error::{DomainErrorKind, Error as DomainError, ExternalErrorKind, InternalErrorKind};

use log::*;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub struct Error(DomainError);

/// JSON body returned with every failed API call.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&self.0)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        write!(fmt, "{}", self.0)
    }
}

// Every failure reaching the API surface is reported as a 500 carrying the
// domain error's message; the kind only decides how loudly it is logged.
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let message = self.0.to_string();
        match &self.0.error_kind {
            DomainErrorKind::External(ExternalErrorKind::Upstream { .. })
            | DomainErrorKind::Internal(InternalErrorKind::InvalidInput(_)) => {
                warn!("{message}");
            }
            DomainErrorKind::External(ExternalErrorKind::Other(_)) => {
                warn!("{message}: {:?}", self.0.source());
            }
            DomainErrorKind::Internal(InternalErrorKind::Config(_))
            | DomainErrorKind::Internal(InternalErrorKind::Other(_)) => {
                error!("{message}");
            }
        }

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody { error: message }),
        )
            .into_response()
    }
}

impl<E> From<E> for Error
where
    E: Into<DomainError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::{json, Value};

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_upstream_error_is_500_with_message() {
        let err = Error::from(DomainError::upstream("/cards/C1", Some(404), None));
        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({"error": "Failed upstream API call to /cards/C1. Status: 404"})
        );
    }

    #[tokio::test]
    async fn test_config_error_is_500_with_message() {
        let err = Error::from(DomainError::config("TRELLO_API_KEY is not set"));
        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({"error": "Configuration error: TRELLO_API_KEY is not set"})
        );
    }
}
