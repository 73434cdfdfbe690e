use axum::{
    Json,
    extract::{FromRequest, Request},
};
use tracing::warn;

use crate::common::server_error::ServerError;

/// Json extractor whose rejection is a `ServerError::Validation` instead of axum's plain text.
pub struct AppJson<T>(pub T);

impl<T, S> FromRequest<S> for AppJson<T>
where
    T: serde::de::DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(AppJson(value)),
            Err(rejection) => {
                let message = format!("Malformed request body: {}", rejection.body_text());
                warn!("{}", message);
                Err(ServerError::Validation(message))
            }
        }
    }
}
