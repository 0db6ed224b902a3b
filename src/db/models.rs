//! Database Models
//!
//! Row types for the lending schema. The serde renames reproduce the API's
//! wire names (`whichBook`, `whoBorrows`, `stillBorrows`, `scoredBy`), so a
//! created row can be returned to the client verbatim.

use serde::Serialize;
use sqlx::FromRow;

/// Registered library member
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// Registered book with its running average rating
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Book {
    pub id: i64,
    pub name: String,

    /// Equal-weight mean of all ratings submitted on return
    pub score: f64,

    /// Number of ratings contributing to `score`
    #[serde(rename = "scoredBy")]
    pub scored_by: i64,
}

/// One loan event.
///
/// Loan rows are append-only history: created on borrow, flipped to
/// `still_borrows = false` on return, never deleted.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Loan {
    pub id: i64,

    #[serde(rename = "whichBook")]
    pub book_id: i64,

    #[serde(rename = "whoBorrows")]
    pub user_id: i64,

    /// True while the loan is open
    #[serde(rename = "stillBorrows")]
    pub still_borrows: bool,
}

/// Listing row for `GET /users` and `GET /books`
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Listing {
    pub id: i64,
    pub name: String,
}

/// A user's loan joined with the borrowed book, for the user detail view
#[derive(Debug, Clone, FromRow)]
pub struct LoanedBook {
    pub name: String,
    pub score: f64,
    pub still_borrows: bool,
}
