//! Shared domain types for Parley.
//!
//! This crate contains the core domain types used across the Parley workspace:
//! conversation sessions, timeline events, pagination, configuration, and
//! their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod config;
pub mod error;
pub mod event;
pub mod page;
pub mod session;

/// Open key-value map used for session metadata and event payloads.
pub type JsonObject = serde_json::Map<String, serde_json::Value>;
