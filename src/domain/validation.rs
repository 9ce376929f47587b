//! Request validation for shortening requests.
//!
//! Rules are evaluated in a fixed order and the first failure wins:
//!
//! 1. calendar URL is present and matches the accepted feed pattern
//! 2. subject lists are present and non-empty
//! 3. subject lists have no empty element or trailing separator
//! 4. no subject identifier is named twice
//! 5. every subject is known to the calendar source
//!
//! Rules 1-4 are pure and live in [`RequestValidator`]. Rule 5 needs the
//! calendar source, so the shortening service runs it through
//! [`ensure_in_catalog`] and [`check_subject_id`] once the feeds are fetched.

use regex::Regex;
use serde_json::{Value, json};
use std::collections::HashSet;
use validator::ValidateUrl;

/// Separator used in the `subjects` and `extra_subjects` query parameters.
pub const SUBJECT_SEPARATOR: char = '~';

/// Reasons a shortening request is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Calendar URL is missing or is not an accepted calendar feed")]
    InvalidUrl { url: String },

    #[error("Subject list is missing or empty")]
    MissingSubjects,

    #[error("Subject list contains an empty element or a trailing separator")]
    MalformedSubjectList { list: String },

    #[error("Subject '{subject}' is named more than once")]
    DuplicateSubjects { subject: String },

    #[error("Subject '{subject}' is not offered by the calendar source")]
    UnknownSubject { subject: String },
}

impl ValidationError {
    /// Short rule name reported in error details.
    pub fn rule(&self) -> &'static str {
        match self {
            Self::InvalidUrl { .. } => "invalid_url",
            Self::MissingSubjects => "missing_subjects",
            Self::MalformedSubjectList { .. } => "malformed_subject_list",
            Self::DuplicateSubjects { .. } => "duplicate_subjects",
            Self::UnknownSubject { .. } => "unknown_subject",
        }
    }

    pub fn details(&self) -> Value {
        match self {
            Self::InvalidUrl { url } => json!({ "rule": self.rule(), "url": url }),
            Self::MissingSubjects => json!({ "rule": self.rule() }),
            Self::MalformedSubjectList { list } => json!({ "rule": self.rule(), "list": list }),
            Self::DuplicateSubjects { subject } | Self::UnknownSubject { subject } => {
                json!({ "rule": self.rule(), "subject": subject })
            }
        }
    }
}

/// A calendar URL together with the subjects picked from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarSelection {
    pub url: String,
    pub subjects: Vec<String>,
}

/// A validated composite request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeSelection {
    /// Present only when the request asked for a base calendar.
    pub base: Option<CalendarSelection>,
    pub extra_subjects: Vec<String>,
}

impl CompositeSelection {
    pub fn has_base_calendar(&self) -> bool {
        self.base.is_some()
    }

    pub fn base_subjects(&self) -> &[String] {
        self.base
            .as_ref()
            .map(|b| b.subjects.as_slice())
            .unwrap_or_default()
    }
}

/// Applies the request rules that need no I/O.
#[derive(Debug, Clone)]
pub struct RequestValidator {
    url_pattern: Regex,
}

impl RequestValidator {
    /// Creates a validator accepting calendar URLs that match `url_pattern`.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern is not a valid regular expression.
    pub fn new(url_pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            url_pattern: Regex::new(url_pattern)?,
        })
    }

    /// Checks a calendar feed URL (rule 1).
    pub fn check_url(&self, url: Option<&str>) -> Result<String, ValidationError> {
        let url = url.unwrap_or_default();

        if url.is_empty() || !url.validate_url() || !self.url_pattern.is_match(url) {
            return Err(ValidationError::InvalidUrl {
                url: url.to_string(),
            });
        }

        Ok(url.to_string())
    }

    /// Validates a `/shorten` request.
    pub fn validate_simple(
        &self,
        url: Option<&str>,
        subjects: Option<&str>,
    ) -> Result<CalendarSelection, ValidationError> {
        let url = self.check_url(url)?;
        let raw = require_list(subjects)?;
        let subjects = parse_subject_list(raw)?;

        if let Some(subject) = first_duplicate(subjects.iter()) {
            return Err(ValidationError::DuplicateSubjects { subject });
        }

        Ok(CalendarSelection { url, subjects })
    }

    /// Validates a `/cshorten` request.
    ///
    /// Without a base calendar the `url` and `subjects` parameters are ignored.
    pub fn validate_composite(
        &self,
        has_base_calendar: bool,
        url: Option<&str>,
        subjects: Option<&str>,
        extra_subjects: Option<&str>,
    ) -> Result<CompositeSelection, ValidationError> {
        let base_url = if has_base_calendar {
            Some(self.check_url(url)?)
        } else {
            None
        };

        let raw_base = if has_base_calendar {
            Some(require_list(subjects)?)
        } else {
            None
        };
        let raw_extra = require_list(extra_subjects)?;

        let base = match (base_url, raw_base) {
            (Some(url), Some(raw)) => Some(CalendarSelection {
                url,
                subjects: parse_subject_list(raw)?,
            }),
            _ => None,
        };
        let extra_subjects = parse_subject_list(raw_extra)?;

        let base_subjects = base.as_ref().map(|b| b.subjects.as_slice()).unwrap_or(&[]);
        if let Some(subject) = first_duplicate(base_subjects.iter().chain(extra_subjects.iter())) {
            return Err(ValidationError::DuplicateSubjects { subject });
        }

        Ok(CompositeSelection {
            base,
            extra_subjects,
        })
    }
}

fn require_list(raw: Option<&str>) -> Result<&str, ValidationError> {
    match raw {
        Some(raw) if !raw.is_empty() => Ok(raw),
        _ => Err(ValidationError::MissingSubjects),
    }
}

/// Splits a `~`-separated subject list.
///
/// # Errors
///
/// Returns [`ValidationError::MalformedSubjectList`] for a trailing separator
/// or any empty element.
pub fn parse_subject_list(raw: &str) -> Result<Vec<String>, ValidationError> {
    let malformed = || ValidationError::MalformedSubjectList {
        list: raw.to_string(),
    };

    if raw.ends_with(SUBJECT_SEPARATOR) {
        return Err(malformed());
    }

    raw.split(SUBJECT_SEPARATOR)
        .map(|s| {
            if s.is_empty() {
                Err(malformed())
            } else {
                Ok(s.to_string())
            }
        })
        .collect()
}

fn first_duplicate<'a>(subjects: impl Iterator<Item = &'a String>) -> Option<String> {
    let mut seen = HashSet::new();
    subjects.into_iter().find(|s| !seen.insert(*s)).cloned()
}

/// Checks that every selected subject is offered by a calendar (rule 5).
pub fn ensure_in_catalog(
    selected: &[String],
    catalog: &HashSet<&str>,
) -> Result<(), ValidationError> {
    match selected.iter().find(|s| !catalog.contains(s.as_str())) {
        Some(subject) => Err(ValidationError::UnknownSubject {
            subject: subject.clone(),
        }),
        None => Ok(()),
    }
}

/// Checks that an external subject identifier can name a subject feed.
///
/// Identifiers end up in a URL path, so only `[A-Za-z0-9._-]` is accepted.
pub fn check_subject_id(subject: &str) -> Result<(), ValidationError> {
    let well_formed = !subject.is_empty()
        && subject
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));

    if well_formed {
        Ok(())
    } else {
        Err(ValidationError::UnknownSubject {
            subject: subject.to_string(),
        })
    }
}
