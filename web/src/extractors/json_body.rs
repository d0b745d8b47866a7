use crate::Error;
use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use domain::error::Error as DomainError;
use log::*;

/// JSON request body whose rejections are reported like every other API
/// failure: a 500 carrying `{"error": message}` instead of axum's plain text.
pub(crate) struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => {
                debug!("Rejected request body ({}): {rejection}", rejection.status());
                Err(DomainError::invalid_input(rejection.body_text()).into())
            }
        }
    }
}
