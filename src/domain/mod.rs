//! Domain layer containing business entities and logic.
//!
//! Everything here is independent of HTTP, storage and transport concerns.
//!
//! # Architecture
//!
//! - [`entities`] - Stored link records
//! - [`repositories`] - Data access trait definitions
//! - [`calendar`] - ICS document model and merging
//! - [`calendar_source`] - Upstream calendar feed trait
//! - [`canonical_key`] - Order-independent request fingerprints
//! - [`validation`] - Request validation rules
//!
//! # Shortening Flow
//!
//! 1. [`validation::RequestValidator`] checks the request shape
//! 2. Feeds are fetched through [`calendar_source::CalendarSource`] and the
//!    selected subjects are checked against them
//! 3. A [`canonical_key::CanonicalKey`] identifies the request
//! 4. The repository's atomic get-or-create returns the existing or new record

pub mod calendar;
pub mod calendar_source;
pub mod canonical_key;
pub mod entities;
pub mod repositories;
pub mod validation;
