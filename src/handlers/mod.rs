pub mod health;
pub mod orders;

use async_trait::async_trait;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::Json;

use crate::errors::ServiceError;

/// JSON body extractor whose rejection speaks the API's error envelope.
/// Axum's stock `Json` rejects malformed or incomplete bodies with a
/// plain-text 422; clients of this API are promised a 400 with
/// `{success, message}` naming the offending field.
pub struct AppJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for AppJson<T>
where
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = ServiceError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ServiceError::ValidationError(rejection.body_text()))?;
        Ok(Self(value))
    }
}
