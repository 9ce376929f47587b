//! Business logic services for the application layer.

pub mod catalog_service;
pub mod shorten_service;

pub use catalog_service::CatalogService;
pub use shorten_service::{LinkKind, ShortenService};
