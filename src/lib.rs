//! Library Lending API
//!
//! REST API for a small lending library: register users and books, list and
//! inspect them, borrow a book, and return it with a rating that feeds the
//! book's running average score.
//!
//! ## Modules
//!
//! - `config`: environment-based settings
//! - `error`: domain error type and the 422 error envelope
//! - `extract`: JSON body extraction with validation diagnostics
//! - `routes`: HTTP endpoint handlers
//! - `services`: the borrow/return workflow
//! - `db`: PostgreSQL access and the `LendingStore` seam

use std::sync::Arc;

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod routes;
pub mod services;

// Re-exports for convenience
pub use config::Config;
pub use db::Database;
pub use error::ApiError;

/// Application-wide shared state
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub config: Arc<Config>,
}
