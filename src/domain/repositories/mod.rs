//! Repository trait definitions for the domain layer.
//!
//! These traits abstract link storage. Implementations live in
//! `crate::infrastructure::persistence`; mock implementations are generated
//! via `mockall` for service tests.
//!
//! # Available Repositories
//!
//! - [`SimpleLinkRepository`] - filtered single-calendar links
//! - [`CompositeLinkRepository`] - merged multi-feed links
//!
//! # Get-or-create
//!
//! Both repositories expose an atomic `get_or_create` keyed on the canonical
//! request key. The outcome is a [`GetOrCreate`]: the caller retries with a
//! new short code only on [`GetOrCreate::CodeTaken`].

pub mod composite_link_repository;
pub mod simple_link_repository;

pub use composite_link_repository::CompositeLinkRepository;
pub use simple_link_repository::SimpleLinkRepository;

#[cfg(test)]
pub use composite_link_repository::MockCompositeLinkRepository;
#[cfg(test)]
pub use simple_link_repository::MockSimpleLinkRepository;

/// Outcome of an atomic get-or-create on the canonical key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GetOrCreate<T> {
    /// A new record was stored under the proposed code.
    Created(T),
    /// A record with the same canonical key already existed.
    Existing(T),
    /// The proposed code belongs to another record; draw a new one.
    CodeTaken,
}

impl<T> GetOrCreate<T> {
    pub fn into_record(self) -> Option<T> {
        match self {
            Self::Created(record) | Self::Existing(record) => Some(record),
            Self::CodeTaken => None,
        }
    }
}
