//! Infrastructure layer for Parley.
//!
//! Contains implementations of the store traits defined in `parley-core`
//! (SQLite via sqlx) and the configuration loader.

pub mod config;
pub mod sqlite;
