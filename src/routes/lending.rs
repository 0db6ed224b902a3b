//! Lending Endpoints
//!
//! Thin handlers over the borrow/return workflow in `services::lending`.
//! Both take the user and book as route parameters; return additionally
//! takes a `{score}` body.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::db::Loan;
use crate::error::ApiError;
use crate::extract::BodyJson;
use crate::services::lending;
use crate::AppState;

/// POST /users/:userId/return/:bookId body: the rating, required, numeric.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReturnBook {
    pub score: f64,
}

/// POST /users/:userId/borrow/:bookId
///
/// Returns the created loan row: `{id, whichBook, whoBorrows, stillBorrows}`.
pub async fn borrow_book(
    State(state): State<AppState>,
    Path((user_id, book_id)): Path<(i64, i64)>,
) -> Result<Json<Loan>, ApiError> {
    let loan = lending::borrow_book(&*state.db, user_id, book_id).await?;
    tracing::info!(user_id, book_id, loan_id = loan.id, "book borrowed");
    Ok(Json(loan))
}

/// POST /users/:userId/return/:bookId
///
/// Closes the loan and folds the submitted score into the book's running
/// average. Success is an empty 200.
pub async fn return_book(
    State(state): State<AppState>,
    Path((user_id, book_id)): Path<(i64, i64)>,
    BodyJson(body): BodyJson<ReturnBook>,
) -> Result<StatusCode, ApiError> {
    lending::return_book(&*state.db, user_id, book_id, body.score).await?;
    tracing::info!(user_id, book_id, score = body.score, "book returned");
    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn return_body_requires_numeric_score() {
        let err = serde_json::from_value::<ReturnBook>(serde_json::json!({
            "score": "five",
        }))
        .unwrap_err();
        assert!(err.to_string().contains("invalid type"));

        let ok = serde_json::from_value::<ReturnBook>(serde_json::json!({ "score": 5 }));
        assert_eq!(ok.unwrap().score, 5.0);
    }

    #[test]
    fn return_body_rejects_extra_fields() {
        let err = serde_json::from_value::<ReturnBook>(serde_json::json!({
            "score": 5,
            "comment": "great read",
        }))
        .unwrap_err();
        assert!(err.to_string().contains("comment"));
    }

    #[test]
    fn loan_row_serializes_with_wire_names() {
        let loan = Loan {
            id: 1,
            book_id: 2,
            user_id: 3,
            still_borrows: true,
        };
        let v = serde_json::to_value(&loan).unwrap();
        assert_eq!(v["whichBook"], 2);
        assert_eq!(v["whoBorrows"], 3);
        assert_eq!(v["stillBorrows"], true);
    }
}
