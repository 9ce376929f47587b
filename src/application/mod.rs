//! Application layer services implementing business logic.
//!
//! Services coordinate validation, the calendar source and the repositories,
//! and provide a clean API for HTTP handlers.
//!
//! # Available Services
//!
//! - [`services::shorten_service::ShortenService`] - Short link creation and calendar resolution
//! - [`services::catalog_service::CatalogService`] - Read-only catalog lookups

pub mod services;
