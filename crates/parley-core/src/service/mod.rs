//! Business logic services (use cases).
//!
//! Services orchestrate store calls and business rules. They depend on
//! traits (ports) -- never on concrete infrastructure implementations.

pub mod conversation;
