//! HTTP/REST API layer for Parley.
//!
//! Axum-based REST API for session and event operations, envelope response
//! format, and CORS support.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod response;
pub mod router;
