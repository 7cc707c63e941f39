//! Store trait definitions (ports).
//!
//! These traits define the storage interface that the infrastructure layer
//! (parley-infra) implements. Both stores stand alone: neither references the
//! other, and only the conversation service holds both.

pub mod event;
pub mod session;
