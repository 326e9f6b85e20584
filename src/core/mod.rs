//! Core repository logic - framework-agnostic operations over the Artiverse schema.
//!
//! Every function takes a database connection and returns `Result` types. Operations
//! that write more than one row run inside a single database transaction.

pub mod follow;
pub mod friendship;
pub mod notification;
pub mod password_reset;
pub mod post;
pub mod profile;
pub mod report;
pub mod user;
