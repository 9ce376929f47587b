//! Data Transfer Objects for API requests and responses.
//!
//! Requests arrive as query strings; every parameter is optional at this
//! level so that missing values reach the request validator and are reported
//! with a proper rule instead of an extractor rejection.

pub mod catalog;
pub mod health;
pub mod shorten;
