//! Read-only lookups backing the catalog endpoints.

use std::sync::Arc;

use serde_json::json;

use crate::domain::calendar::{Calendar, SubjectEntry};
use crate::domain::calendar_source::{CalendarSource, SourceError, SubjectGroup};
use crate::domain::validation::{RequestValidator, ValidationError, check_subject_id};
use crate::error::AppError;

/// Service answering questions about available calendars and subjects.
pub struct CatalogService {
    source: Arc<dyn CalendarSource>,
    validator: RequestValidator,
}

impl CatalogService {
    pub fn new(source: Arc<dyn CalendarSource>, validator: RequestValidator) -> Self {
        Self { source, validator }
    }

    /// Subjects offered by the calendar at `url`.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] if the URL is not an accepted calendar URL
    ///   or the source has no such calendar
    /// - [`AppError::SourceUnavailable`] if the feed cannot be fetched or parsed
    pub async fn subjects_for_url(&self, url: Option<&str>) -> Result<Vec<SubjectEntry>, AppError> {
        let url = self.validator.check_url(url)?;

        let body = self
            .source
            .course_calendar(&url)
            .await
            .map_err(|e| match e {
                SourceError::NotFound(_) => {
                    AppError::from(ValidationError::InvalidUrl { url: url.clone() })
                }
                other => AppError::from(other),
            })?;

        let calendar = Calendar::parse(&body).map_err(|e| {
            AppError::source_unavailable(
                "Malformed calendar feed",
                json!({ "feed": url, "reason": e.to_string() }),
            )
        })?;

        Ok(calendar.subject_catalog())
    }

    /// Course calendar URLs offered to users.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::SourceUnavailable`] if the catalog cannot be read.
    pub async fn calendars(&self) -> Result<Vec<String>, AppError> {
        Ok(self.source.calendars().await?)
    }

    /// External subject groups.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::SourceUnavailable`] if the catalog cannot be read.
    pub async fn subject_groups(&self) -> Result<Vec<SubjectGroup>, AppError> {
        Ok(self.source.subject_groups().await?)
    }

    /// Looks up one subject group by id.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] if the id is missing or ill-formed
    /// - [`AppError::NotFound`] if no group has this id
    pub async fn course_info(&self, id: Option<&str>) -> Result<SubjectGroup, AppError> {
        let id = id.unwrap_or_default();
        check_subject_id(id)?;

        self.source
            .subject_groups()
            .await?
            .into_iter()
            .find(|group| group.id == id)
            .ok_or_else(|| AppError::not_found("Course not found", json!({ "id": id })))
    }
}
