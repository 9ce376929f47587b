//! Repository trait for simple link data access.

use crate::domain::entities::{NewSimpleLink, SimpleLink};
use crate::domain::repositories::GetOrCreate;
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for simple links.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgSimpleLinkRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::MemorySimpleLinkRepository`] - in-process store
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SimpleLinkRepository: Send + Sync {
    /// Returns the record for `new_link.canonical_key`, creating it under
    /// `new_link.code` when no such record exists.
    ///
    /// Concurrent calls with the same canonical key all observe the same
    /// record.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StoreUnavailable`] on storage errors.
    async fn get_or_create(
        &self,
        new_link: NewSimpleLink,
    ) -> Result<GetOrCreate<SimpleLink>, AppError>;

    /// Finds a link by its short code.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StoreUnavailable`] on storage errors.
    async fn find_by_code(&self, code: &str) -> Result<Option<SimpleLink>, AppError>;

    /// Deletes a link by short code. Returns `true` if a record was removed.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StoreUnavailable`] on storage errors.
    async fn delete(&self, code: &str) -> Result<bool, AppError>;

    /// Counts stored links.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StoreUnavailable`] on storage errors.
    async fn count(&self) -> Result<i64, AppError>;
}
