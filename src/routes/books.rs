//! Book Endpoints
//!
//! Registration, listing, and the single-book view. A new book starts with
//! score 0 and no ratings; the score only moves when a loan is returned.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::db::{Book, LendingStore, Listing};
use crate::error::ApiError;
use crate::extract::BodyJson;
use crate::AppState;

// ============ Request/Response Types ============

/// POST /books body. Unknown fields are rejected.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateBook {
    pub name: String,
}

/// GET /books/:bookId response: id, name and current average score
#[derive(Debug, Serialize)]
pub struct BookDetail {
    pub id: i64,
    pub name: String,
    pub score: f64,
}

// ============ Handlers ============

/// POST /books
pub async fn create_book(
    State(state): State<AppState>,
    BodyJson(body): BodyJson<CreateBook>,
) -> Result<Json<Book>, ApiError> {
    let book = state.db.create_book(&body.name).await?;
    tracing::debug!(book_id = book.id, "book registered");
    Ok(Json(book))
}

/// GET /books
pub async fn list_books(State(state): State<AppState>) -> Result<Json<Vec<Listing>>, ApiError> {
    let books = state.db.list_books().await?;
    Ok(Json(books))
}

/// GET /books/:bookId
pub async fn get_book(
    State(state): State<AppState>,
    Path(book_id): Path<i64>,
) -> Result<Json<BookDetail>, ApiError> {
    let book = state
        .db
        .find_book(book_id)
        .await?
        .ok_or(ApiError::BookNotFound(book_id))?;

    Ok(Json(BookDetail {
        id: book.id,
        name: book.name,
        score: book.score,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_book_body_rejects_unknown_fields() {
        let err = serde_json::from_value::<CreateBook>(serde_json::json!({
            "name": "Dune",
            "author": "Frank Herbert",
        }))
        .unwrap_err();
        assert!(err.to_string().contains("author"));
    }

    #[test]
    fn book_row_serializes_with_wire_names() {
        let book = Book {
            id: 3,
            name: "Dune".into(),
            score: 0.0,
            scored_by: 0,
        };
        let v = serde_json::to_value(&book).unwrap();
        assert_eq!(v["scoredBy"], 0);
        assert_eq!(v["score"], 0.0);
    }
}
