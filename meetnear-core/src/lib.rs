//! Core types and service wiring for the meetnear meetup coordinator.

/// Assembly of the collaborators backing the service.
pub mod collaborators;
/// Runtime settings and configuration errors.
pub mod config;
/// Domain models and identifiers shared by all collaborators.
pub mod model;
/// Traits describing the collaborator interfaces.
pub mod ports;
/// Meetup coordination service used by clients.
pub mod service;

pub use collaborators::*;
pub use config::*;
pub use model::*;
pub use ports::*;
pub use service::*;
