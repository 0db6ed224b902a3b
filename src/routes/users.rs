//! User Endpoints
//!
//! Registration, listing, and the detail view with the user's borrowing
//! history partitioned into past (closed loans) and present (open loans).

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::db::{LendingStore, Listing, LoanedBook, User};
use crate::error::ApiError;
use crate::extract::BodyJson;
use crate::AppState;

// ============ Request/Response Types ============

/// POST /users body. Unknown fields are rejected, both required.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
}

/// GET /users/:userId response
#[derive(Debug, Serialize)]
pub struct UserDetail {
    pub id: i64,
    pub name: String,
    pub books: BorrowedBooks,
}

#[derive(Debug, Serialize)]
pub struct BorrowedBooks {
    pub past: Vec<BookEntry>,
    pub present: Vec<BookEntry>,
}

/// A borrowed book as shown in the user detail: name and score only
#[derive(Debug, Serialize, PartialEq)]
pub struct BookEntry {
    pub name: String,
    pub score: f64,
}

// ============ Handlers ============

/// POST /users
///
/// Register a user. Returns the created row verbatim, generated id included.
pub async fn create_user(
    State(state): State<AppState>,
    BodyJson(body): BodyJson<CreateUser>,
) -> Result<Json<User>, ApiError> {
    let user = state.db.create_user(&body.name, &body.email).await?;
    tracing::debug!(user_id = user.id, "user registered");
    Ok(Json(user))
}

/// GET /users
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<Listing>>, ApiError> {
    let users = state.db.list_users().await?;
    Ok(Json(users))
}

/// GET /users/:userId
///
/// User detail with borrowing history split into `past` and `present`.
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<UserDetail>, ApiError> {
    let user = state
        .db
        .find_user(user_id)
        .await?
        .ok_or(ApiError::UserNotFound(user_id))?;

    let loans = state.db.loaned_books(user_id).await?;
    let (past, present) = partition_loans(loans);

    Ok(Json(UserDetail {
        id: user.id,
        name: user.name,
        books: BorrowedBooks { past, present },
    }))
}

// ============ Helpers ============

/// Split a user's loans into closed (past) and open (present) books.
fn partition_loans(loans: Vec<LoanedBook>) -> (Vec<BookEntry>, Vec<BookEntry>) {
    let mut past = Vec::new();
    let mut present = Vec::new();

    for loan in loans {
        let entry = BookEntry {
            name: loan.name,
            score: loan.score,
        };
        if loan.still_borrows {
            present.push(entry);
        } else {
            past.push(entry);
        }
    }

    (past, present)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaned(name: &str, score: f64, still_borrows: bool) -> LoanedBook {
        LoanedBook {
            name: name.to_string(),
            score,
            still_borrows,
        }
    }

    #[test]
    fn loans_partition_by_open_flag() {
        let loans = vec![
            loaned("Dune", 5.0, false),
            loaned("Hyperion", 4.5, true),
            loaned("Solaris", 3.0, false),
        ];

        let (past, present) = partition_loans(loans);

        assert_eq!(
            past,
            vec![
                BookEntry { name: "Dune".into(), score: 5.0 },
                BookEntry { name: "Solaris".into(), score: 3.0 },
            ]
        );
        assert_eq!(present, vec![BookEntry { name: "Hyperion".into(), score: 4.5 }]);
    }

    #[test]
    fn create_user_body_rejects_unknown_fields() {
        let err = serde_json::from_value::<CreateUser>(serde_json::json!({
            "name": "Alice",
            "email": "alice@example.com",
            "age": 30,
        }))
        .unwrap_err();
        assert!(err.to_string().contains("age"));
    }

    #[test]
    fn create_user_body_requires_email() {
        let err =
            serde_json::from_value::<CreateUser>(serde_json::json!({ "name": "Alice" }))
                .unwrap_err();
        assert!(err.to_string().contains("email"));
    }
}
