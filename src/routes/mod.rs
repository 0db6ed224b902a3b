//! API Routes Module
//!
//! All HTTP endpoints.
//!
//! # Routes
//! - `GET  /health` - health check
//! - `POST /users`, `GET /users`, `GET /users/:userId` - user registration and reads
//! - `POST /books`, `GET /books`, `GET /books/:bookId` - book registration and reads
//! - `POST /users/:userId/borrow/:bookId` - borrow a book
//! - `POST /users/:userId/return/:bookId` - return it with a rating

pub mod books;
pub mod health;
pub mod lending;
pub mod users;
