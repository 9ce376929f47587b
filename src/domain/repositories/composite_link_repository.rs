//! Repository trait for composite link data access.

use crate::domain::entities::{CompositeLink, NewCompositeLink};
use crate::domain::repositories::GetOrCreate;
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for composite links.
///
/// Same contract as [`crate::domain::repositories::SimpleLinkRepository`],
/// over a separate code space.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgCompositeLinkRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::MemoryCompositeLinkRepository`] - in-process store
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompositeLinkRepository: Send + Sync {
    /// Returns the record for `new_link.canonical_key`, creating it under
    /// `new_link.code` when no such record exists.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StoreUnavailable`] on storage errors.
    async fn get_or_create(
        &self,
        new_link: NewCompositeLink,
    ) -> Result<GetOrCreate<CompositeLink>, AppError>;

    /// Finds a composite link by its short code.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StoreUnavailable`] on storage errors.
    async fn find_by_code(&self, code: &str) -> Result<Option<CompositeLink>, AppError>;

    /// Deletes a composite link by short code. Returns `true` if a record was removed.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StoreUnavailable`] on storage errors.
    async fn delete(&self, code: &str) -> Result<bool, AppError>;

    /// Counts stored composite links.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StoreUnavailable`] on storage errors.
    async fn count(&self) -> Result<i64, AppError>;
}
