//! Error Handling Module
//!
//! Provides the domain error type for the lending workflow and its mapping to
//! HTTP responses. Uses thiserror for domain errors and integrates with
//! tracing for structured logging.
//!
//! # Design Decision
//!
//! Every domain failure is reported as HTTP 422 with the envelope
//! `{"error": {"statusCode": 422, "message": "..."}}`, whether the cause is a
//! missing row, a lending conflict, or a malformed body. Collapsing 404/409
//! into 422 is part of the API contract and is kept deliberately.
//!
//! Infrastructure failures (database unreachable) are the one exception: they
//! map to 500 and never leak internal detail to the client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// API error type
///
/// The message strings are observable behavior: clients match on them, so
/// they are preserved verbatim, grammar warts included.
#[derive(Debug, Error)]
pub enum ApiError {
    // ============ Lookup failures ============
    #[error("No user can be found with id: {0}")]
    UserNotFound(i64),

    #[error("No book can be found with id: {0}")]
    BookNotFound(i64),

    /// The borrow workflow words its book lookup failure differently
    /// from the read endpoints.
    #[error("No book can be found with given id: {0}")]
    BookUnknownForBorrow(i64),

    // ============ Lending conflicts ============
    #[error("You already borrowed this book")]
    AlreadyBorrowed,

    #[error("You borrowed this book at past")]
    BorrowedAtPast,

    #[error("Book borrowed by someone else at this time")]
    BorrowedBySomeoneElse,

    #[error("This book does not borrowed by this user")]
    NotBorrowedByThisUser,

    // ============ Body validation ============
    #[error("Request body is not valid")]
    InvalidBody(Vec<String>),

    // ============ Infrastructure ============
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Error envelope, `{"error": {...}}` at the top level.
#[derive(Serialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub status_code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_results: Option<Vec<String>>,
}

impl ApiError {
    fn envelope(self) -> (StatusCode, ErrorEnvelope) {
        let (status, message, validation_results) = match self {
            ApiError::Internal(err) => {
                // Internal errors are logged, not exposed
                tracing::error!("internal error: {err:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
            ApiError::InvalidBody(results) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Request body is not valid".to_string(),
                Some(results),
            ),
            other => (StatusCode::UNPROCESSABLE_ENTITY, other.to_string(), None),
        };

        let envelope = ErrorEnvelope {
            error: ErrorBody {
                status_code: status.as_u16(),
                message,
                validation_results,
            },
        };
        (status, envelope)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, envelope) = self.envelope();
        (status, Json(envelope)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope_of(err: ApiError) -> serde_json::Value {
        let (_, envelope) = err.envelope();
        serde_json::to_value(envelope).unwrap()
    }

    #[test]
    fn user_not_found_message_mentions_id() {
        let v = envelope_of(ApiError::UserNotFound(42));
        assert_eq!(v["error"]["statusCode"], 422);
        assert_eq!(v["error"]["message"], "No user can be found with id: 42");
    }

    #[test]
    fn borrow_book_lookup_uses_given_id_wording() {
        let v = envelope_of(ApiError::BookUnknownForBorrow(7));
        assert_eq!(v["error"]["message"], "No book can be found with given id: 7");
    }

    #[test]
    fn internal_error_hides_detail_and_maps_to_500() {
        let v = envelope_of(ApiError::Internal(anyhow::anyhow!("pool timed out")));
        assert_eq!(v["error"]["statusCode"], 500);
        assert_eq!(v["error"]["message"], "Internal server error");
    }

    #[test]
    fn validation_results_serialized_only_when_present() {
        let v = envelope_of(ApiError::AlreadyBorrowed);
        assert!(v["error"].get("validationResults").is_none());

        let v = envelope_of(ApiError::InvalidBody(vec!["unknown field `age`".into()]));
        assert_eq!(v["error"]["validationResults"][0], "unknown field `age`");
    }
}
