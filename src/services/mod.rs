//! Services Module
//!
//! Business logic layer. The lending workflow is the only nontrivial logic
//! in the system; everything else is CRUD plumbing in the routes.

pub mod lending;
