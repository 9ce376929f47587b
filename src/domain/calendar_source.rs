//! Access to upstream calendar feeds and the course catalog.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Errors reported by a calendar source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    #[error("calendar not found: {0}")]
    NotFound(String),

    #[error("calendar source unavailable: {0}")]
    Unavailable(String),

    #[error("malformed calendar data: {0}")]
    Malformed(String),
}

/// A group of external subjects offered together (usually one study programme).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectGroup {
    pub id: String,
    pub course_name: String,
    pub subjects: Vec<String>,
}

/// Upstream provider of calendar feeds.
///
/// # Implementations
///
/// - [`crate::infrastructure::calendar_source::HttpCalendarSource`] - HTTP feeds plus a catalog file
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CalendarSource: Send + Sync {
    /// Fetches the raw ICS document of a course calendar.
    ///
    /// # Errors
    ///
    /// - [`SourceError::NotFound`] if the source has no such calendar
    /// - [`SourceError::Malformed`] if the body is not a calendar
    /// - [`SourceError::Unavailable`] on transport errors
    async fn course_calendar(&self, url: &str) -> Result<String, SourceError>;

    /// Fetches the raw ICS document of an external subject.
    ///
    /// # Errors
    ///
    /// Same as [`CalendarSource::course_calendar`].
    async fn subject_calendar(&self, subject_id: &str) -> Result<String, SourceError>;

    /// Lists the course calendar URLs offered to users.
    async fn calendars(&self) -> Result<Vec<String>, SourceError>;

    /// Lists the external subject groups.
    async fn subject_groups(&self) -> Result<Vec<SubjectGroup>, SourceError>;
}
