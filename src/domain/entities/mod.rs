//! Core domain entities representing the stored link records.
//!
//! Entities are plain data structures without persistence concerns. Each
//! record kind comes with a `New*` struct used for creation:
//!
//! - [`SimpleLink`] / [`NewSimpleLink`] - one calendar feed filtered by a subject selection
//! - [`CompositeLink`] / [`NewCompositeLink`] - an optional base calendar merged with
//!   external subject feeds

pub mod composite_link;
pub mod simple_link;

pub use composite_link::{CompositeLink, NewCompositeLink};
pub use simple_link::{NewSimpleLink, SimpleLink};
