//! Lending Store Trait
//!
//! Storage interface for the lending workflow. The PostgreSQL implementation
//! lives on `Database` in `db/mod.rs`; the mock below backs the workflow
//! tests, so precondition ordering and score arithmetic are exercised without
//! a running database.
//!
//! `finalize_return` is a single call on purpose: closing the loan and
//! writing the new score must land atomically, so the transaction boundary
//! belongs to the store, not the workflow.

use anyhow::Result;
use async_trait::async_trait;

use super::models::{Book, Loan, User};

#[async_trait]
pub trait LendingStore: Send + Sync {
    async fn find_user(&self, user_id: i64) -> Result<Option<User>>;

    async fn find_book(&self, book_id: i64) -> Result<Option<Book>>;

    /// Any loan row for the pair, open or closed. The pair has at most one.
    async fn find_loan(&self, user_id: i64, book_id: i64) -> Result<Option<Loan>>;

    /// The open loan for the pair, if the user currently holds the book.
    async fn find_open_loan(&self, user_id: i64, book_id: i64) -> Result<Option<Loan>>;

    /// The book's open loan regardless of borrower.
    async fn find_open_loan_for_book(&self, book_id: i64) -> Result<Option<Loan>>;

    /// Insert an open loan row and return it.
    async fn create_loan(&self, user_id: i64, book_id: i64) -> Result<Loan>;

    /// Close the loan and persist the book's recomputed score, atomically.
    async fn finalize_return(
        &self,
        loan_id: i64,
        book_id: i64,
        new_score: f64,
        new_scored_by: i64,
    ) -> Result<()>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::Mutex;

    /// In-memory store for workflow tests.
    #[derive(Default)]
    pub struct MockLendingStore {
        inner: Mutex<Inner>,
    }

    #[derive(Default)]
    struct Inner {
        users: Vec<User>,
        books: Vec<Book>,
        loans: Vec<Loan>,
    }

    impl MockLendingStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn add_user(&self, name: &str, email: &str) -> i64 {
            let mut inner = self.inner.lock().unwrap();
            let id = inner.users.len() as i64 + 1;
            inner.users.push(User {
                id,
                name: name.to_string(),
                email: email.to_string(),
            });
            id
        }

        pub fn add_book(&self, name: &str) -> i64 {
            self.add_rated_book(name, 0.0, 0)
        }

        pub fn add_rated_book(&self, name: &str, score: f64, scored_by: i64) -> i64 {
            let mut inner = self.inner.lock().unwrap();
            let id = inner.books.len() as i64 + 1;
            inner.books.push(Book {
                id,
                name: name.to_string(),
                score,
                scored_by,
            });
            id
        }

        /// Seed a loan row directly, bypassing the workflow. Lets tests set
        /// up histories the workflow itself can no longer produce, like a
        /// loan referencing a book that was never registered.
        pub fn add_loan(&self, user_id: i64, book_id: i64, still_borrows: bool) -> i64 {
            let mut inner = self.inner.lock().unwrap();
            let id = inner.loans.len() as i64 + 1;
            inner.loans.push(Loan {
                id,
                book_id,
                user_id,
                still_borrows,
            });
            id
        }

        pub fn book(&self, book_id: i64) -> Book {
            let inner = self.inner.lock().unwrap();
            inner
                .books
                .iter()
                .find(|b| b.id == book_id)
                .cloned()
                .unwrap()
        }

        pub fn loan_count(&self) -> usize {
            self.inner.lock().unwrap().loans.len()
        }
    }

    #[async_trait]
    impl LendingStore for MockLendingStore {
        async fn find_user(&self, user_id: i64) -> Result<Option<User>> {
            let inner = self.inner.lock().unwrap();
            Ok(inner.users.iter().find(|u| u.id == user_id).cloned())
        }

        async fn find_book(&self, book_id: i64) -> Result<Option<Book>> {
            let inner = self.inner.lock().unwrap();
            Ok(inner.books.iter().find(|b| b.id == book_id).cloned())
        }

        async fn find_loan(&self, user_id: i64, book_id: i64) -> Result<Option<Loan>> {
            let inner = self.inner.lock().unwrap();
            Ok(inner
                .loans
                .iter()
                .find(|l| l.user_id == user_id && l.book_id == book_id)
                .cloned())
        }

        async fn find_open_loan(&self, user_id: i64, book_id: i64) -> Result<Option<Loan>> {
            let inner = self.inner.lock().unwrap();
            Ok(inner
                .loans
                .iter()
                .find(|l| l.user_id == user_id && l.book_id == book_id && l.still_borrows)
                .cloned())
        }

        async fn find_open_loan_for_book(&self, book_id: i64) -> Result<Option<Loan>> {
            let inner = self.inner.lock().unwrap();
            Ok(inner
                .loans
                .iter()
                .find(|l| l.book_id == book_id && l.still_borrows)
                .cloned())
        }

        async fn create_loan(&self, user_id: i64, book_id: i64) -> Result<Loan> {
            let mut inner = self.inner.lock().unwrap();
            if inner.loans.iter().any(|l| l.book_id == book_id && l.still_borrows) {
                // Mirrors the partial unique index on (book_id) WHERE still_borrows
                anyhow::bail!("unique violation: one_open_loan_per_book");
            }
            let loan = Loan {
                id: inner.loans.len() as i64 + 1,
                book_id,
                user_id,
                still_borrows: true,
            };
            inner.loans.push(loan.clone());
            Ok(loan)
        }

        async fn finalize_return(
            &self,
            loan_id: i64,
            book_id: i64,
            new_score: f64,
            new_scored_by: i64,
        ) -> Result<()> {
            let mut inner = self.inner.lock().unwrap();
            if let Some(loan) = inner.loans.iter_mut().find(|l| l.id == loan_id) {
                loan.still_borrows = false;
            }
            if let Some(book) = inner.books.iter_mut().find(|b| b.id == book_id) {
                book.score = new_score;
                book.scored_by = new_scored_by;
            }
            Ok(())
        }
    }
}
