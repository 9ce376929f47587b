//! Repository implementations.
//!
//! # Repositories
//!
//! - [`PgSimpleLinkRepository`] / [`PgCompositeLinkRepository`] - PostgreSQL via SQLx
//! - [`MemorySimpleLinkRepository`] / [`MemoryCompositeLinkRepository`] - in-process
//!   stores used by tests and when no database is configured

pub mod memory;
pub mod pg_composite_link_repository;
pub mod pg_simple_link_repository;

pub use memory::{MemoryCompositeLinkRepository, MemorySimpleLinkRepository};
pub use pg_composite_link_repository::PgCompositeLinkRepository;
pub use pg_simple_link_repository::PgSimpleLinkRepository;
