//! Calendar source backed by HTTP feeds and a catalog file.
//!
//! - [`HttpCalendarSource`] - fetches course and subject feeds through the feed cache
//! - [`Catalog`] - calendar URLs and subject groups read from a JSON file

mod catalog;
mod http_source;

pub use catalog::{Catalog, CatalogError};
pub use http_source::{DEFAULT_MAX_FEED_BYTES, HttpCalendarSource, SUBJECT_ID_PLACEHOLDER};
