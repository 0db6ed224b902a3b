//! Database Module
//!
//! PostgreSQL access through a SQLx connection pool. `Database` owns the pool
//! and exposes the queries the routes and the lending workflow need; the
//! `LendingStore` trait in `repository` is the seam the workflow runs over.
//!
//! Two invariants live at this layer rather than in application code:
//!
//! - the partial unique index `one_open_loan_per_book` guarantees at most one
//!   open loan per book even under concurrent borrow requests;
//! - `finalize_return` wraps the loan closure and the score update in one
//!   transaction, so a crash between the two writes cannot leave a closed
//!   loan with a stale score.

mod models;
mod repository;

pub use models::*;
pub use repository::LendingStore;

#[cfg(test)]
pub use repository::mock::MockLendingStore;

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};

/// Database connection and queries
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to PostgreSQL.
    ///
    /// # Connection Pool Settings
    ///
    /// - max_connections: 10
    /// - min_connections: 1
    /// - acquire_timeout: 3s
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .min_connections(1)
            .acquire_timeout(std::time::Duration::from_secs(3))
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Run embedded migrations
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Health check
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    // ============ Registration ============

    pub async fn create_user(&self, name: &str, email: &str) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email)
            VALUES ($1, $2)
            RETURNING id, name, email
            "#,
        )
        .bind(name)
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn create_book(&self, name: &str) -> Result<Book> {
        let book = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (name)
            VALUES ($1)
            RETURNING id, name, score, scored_by
            "#,
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(book)
    }

    // ============ Reads ============

    pub async fn list_users(&self) -> Result<Vec<Listing>> {
        let users = sqlx::query_as::<_, Listing>("SELECT id, name FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(users)
    }

    pub async fn list_books(&self) -> Result<Vec<Listing>> {
        let books = sqlx::query_as::<_, Listing>("SELECT id, name FROM books ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(books)
    }

    /// All of a user's loans joined with each book's name and score, for the
    /// past/present partition in the user detail view.
    pub async fn loaned_books(&self, user_id: i64) -> Result<Vec<LoanedBook>> {
        let loans = sqlx::query_as::<_, LoanedBook>(
            r#"
            SELECT b.name, b.score, bb.still_borrows
            FROM borrowed_books bb
            JOIN books b ON b.id = bb.book_id
            WHERE bb.user_id = $1
            ORDER BY bb.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(loans)
    }
}

#[async_trait]
impl LendingStore for Database {
    async fn find_user(&self, user_id: i64) -> Result<Option<User>> {
        let user =
            sqlx::query_as::<_, User>("SELECT id, name, email FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(user)
    }

    async fn find_book(&self, book_id: i64) -> Result<Option<Book>> {
        let book = sqlx::query_as::<_, Book>(
            "SELECT id, name, score, scored_by FROM books WHERE id = $1",
        )
        .bind(book_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(book)
    }

    async fn find_loan(&self, user_id: i64, book_id: i64) -> Result<Option<Loan>> {
        let loan = sqlx::query_as::<_, Loan>(
            r#"
            SELECT id, book_id, user_id, still_borrows
            FROM borrowed_books
            WHERE user_id = $1 AND book_id = $2
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(loan)
    }

    async fn find_open_loan(&self, user_id: i64, book_id: i64) -> Result<Option<Loan>> {
        let loan = sqlx::query_as::<_, Loan>(
            r#"
            SELECT id, book_id, user_id, still_borrows
            FROM borrowed_books
            WHERE user_id = $1 AND book_id = $2 AND still_borrows
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(loan)
    }

    async fn find_open_loan_for_book(&self, book_id: i64) -> Result<Option<Loan>> {
        let loan = sqlx::query_as::<_, Loan>(
            r#"
            SELECT id, book_id, user_id, still_borrows
            FROM borrowed_books
            WHERE book_id = $1 AND still_borrows
            "#,
        )
        .bind(book_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(loan)
    }

    async fn create_loan(&self, user_id: i64, book_id: i64) -> Result<Loan> {
        let loan = sqlx::query_as::<_, Loan>(
            r#"
            INSERT INTO borrowed_books (book_id, user_id, still_borrows)
            VALUES ($1, $2, TRUE)
            RETURNING id, book_id, user_id, still_borrows
            "#,
        )
        .bind(book_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(loan)
    }

    async fn finalize_return(
        &self,
        loan_id: i64,
        book_id: i64,
        new_score: f64,
        new_scored_by: i64,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE borrowed_books SET still_borrows = FALSE WHERE id = $1")
            .bind(loan_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE books SET score = $1, scored_by = $2 WHERE id = $3")
            .bind(new_score)
            .bind(new_scored_by)
            .bind(book_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
