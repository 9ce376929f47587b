//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer.
//!
//! # Modules
//!
//! - [`cache`] - Feed caching (Redis and no-op implementations)
//! - [`calendar_source`] - HTTP calendar feeds and the catalog file
//! - [`persistence`] - PostgreSQL and in-memory repository implementations

pub mod cache;
pub mod calendar_source;
pub mod persistence;
