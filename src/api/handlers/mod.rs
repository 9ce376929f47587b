//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod calendar;
pub mod catalog;
pub mod health;
pub mod shorten;

pub use calendar::{calendar_handler, composite_calendar_handler};
pub use catalog::{courses_handler, extcourses_handler, idinfo_handler, urlinfo_handler};
pub use health::health_handler;
pub use shorten::{composite_shorten_handler, shorten_handler};
