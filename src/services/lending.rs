//! Lending Workflow
//!
//! Borrow and return over any `LendingStore`, plus the score-averaging
//! arithmetic. The precondition checks run in a fixed order because the order
//! is observable: a request naming a nonexistent book that the user has
//! already borrowed in the past reports "borrowed at past", not "book not
//! found".

use anyhow::Error;

use crate::db::{Loan, LendingStore};
use crate::error::ApiError;

/// Recompute a book's running average after one more rating.
///
/// Every rating carries equal weight: the stored mean is unrolled back into a
/// sum, the new rating added, and the mean taken over the grown count.
pub fn next_average(score: f64, scored_by: i64, submitted: f64) -> (f64, i64) {
    let count = scored_by + 1;
    ((score * scored_by as f64 + submitted) / count as f64, count)
}

/// Borrow a book for a user.
///
/// Checks, in order, each fast-fail:
/// 1. the user exists;
/// 2. the user has no loan row for this book, open or closed (a closed row
///    permanently blocks re-borrowing, see the note below);
/// 3. nobody else holds the book right now;
/// 4. the book exists.
///
/// On success a new open loan row is created and returned.
///
/// Note: step 2 means returning a book never makes it borrowable again by
/// the same user; the closed row reports "borrowed at past" forever. This
/// looks more like an accident than a policy, but it is observable behavior
/// and kept as-is.
pub async fn borrow_book<S: LendingStore + ?Sized>(
    store: &S,
    user_id: i64,
    book_id: i64,
) -> Result<Loan, ApiError> {
    if store.find_user(user_id).await?.is_none() {
        return Err(ApiError::UserNotFound(user_id));
    }

    if let Some(existing) = store.find_loan(user_id, book_id).await? {
        return Err(if existing.still_borrows {
            ApiError::AlreadyBorrowed
        } else {
            ApiError::BorrowedAtPast
        });
    }

    if store.find_open_loan_for_book(book_id).await?.is_some() {
        return Err(ApiError::BorrowedBySomeoneElse);
    }

    if store.find_book(book_id).await?.is_none() {
        return Err(ApiError::BookUnknownForBorrow(book_id));
    }

    // The availability check above can race with a concurrent borrow; the
    // partial unique index turns the loser's insert into a unique violation,
    // reported with the same message as the check itself.
    store.create_loan(user_id, book_id).await.map_err(|err| {
        if is_unique_violation(&err) {
            ApiError::BorrowedBySomeoneElse
        } else {
            err.into()
        }
    })
}

/// Return a borrowed book with a rating.
///
/// The user must exist and must currently hold the book. The loan closure
/// and the score update land in one store call, which the PostgreSQL
/// implementation runs as a single transaction.
pub async fn return_book<S: LendingStore + ?Sized>(
    store: &S,
    user_id: i64,
    book_id: i64,
    submitted: f64,
) -> Result<(), ApiError> {
    if store.find_user(user_id).await?.is_none() {
        return Err(ApiError::UserNotFound(user_id));
    }

    let loan = store
        .find_open_loan(user_id, book_id)
        .await?
        .ok_or(ApiError::NotBorrowedByThisUser)?;

    let Some(book) = store.find_book(book_id).await? else {
        // An open loan always references an existing book
        return Err(Error::msg(format!(
            "open loan {} references missing book {book_id}",
            loan.id
        ))
        .into());
    };

    let (new_score, new_scored_by) = next_average(book.score, book.scored_by, submitted);
    store
        .finalize_return(loan.id, book.id, new_score, new_scored_by)
        .await?;

    Ok(())
}

fn is_unique_violation(err: &Error) -> bool {
    err.downcast_ref::<sqlx::Error>()
        .and_then(|e| match e {
            sqlx::Error::Database(db) => Some(db.is_unique_violation()),
            _ => None,
        })
        .unwrap_or(false)
}
