//! Request Body Extraction
//!
//! The request schemas are plain serde structs with `deny_unknown_fields`, so
//! deserialization itself is the validation pass: a missing required field,
//! a wrong type, or an extra field all fail here, before any handler logic
//! runs.
//!
//! Axum's stock `Json` rejection answers with plain text and its own status
//! codes; this wrapper reroutes every body failure into the API's 422
//! envelope with the deserializer's diagnostic attached as
//! `validationResults`.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// JSON body extractor whose rejection is the 422 validation envelope.
pub struct BodyJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for BodyJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(BodyJson(value)),
            Err(rejection) => Err(ApiError::InvalidBody(diagnostics(rejection))),
        }
    }
}

fn diagnostics(rejection: JsonRejection) -> Vec<String> {
    vec![rejection.body_text()]
}
