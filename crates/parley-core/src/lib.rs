//! Business logic and store trait definitions for Parley.
//!
//! This crate defines the "ports" (store traits) that the infrastructure
//! layer implements, plus the service that enforces cross-entity rules on top
//! of them. It depends only on `parley-types` -- never on `parley-infra` or
//! any database/IO crate.

pub mod repository;
pub mod service;
