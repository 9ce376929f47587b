//! Composite link entity: external subject feeds merged with an optional base calendar.

use chrono::{DateTime, Utc};

use crate::domain::canonical_key::{CanonicalKey, sorted};
use crate::domain::validation::CompositeSelection;

/// A stored short link for a merged calendar.
///
/// `base_url` is set exactly when `has_base_calendar` is true. The union of
/// `base_subjects` and `extra_subjects` never contains a repeated identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeLink {
    pub id: i64,
    pub code: String,
    pub has_base_calendar: bool,
    pub base_url: Option<String>,
    pub base_subjects: Vec<String>,
    pub extra_subjects: Vec<String>,
    /// Merged event count observed when the link was created.
    pub event_count: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Input data for creating a composite link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCompositeLink {
    pub code: String,
    pub has_base_calendar: bool,
    pub base_url: Option<String>,
    pub base_subjects: Vec<String>,
    pub extra_subjects: Vec<String>,
    pub event_count: Option<i64>,
    pub canonical_key: CanonicalKey,
}

impl NewCompositeLink {
    pub fn new(code: String, selection: &CompositeSelection, event_count: Option<i64>) -> Self {
        let base_url = selection.base.as_ref().map(|b| b.url.clone());

        Self {
            code,
            has_base_calendar: selection.has_base_calendar(),
            canonical_key: CanonicalKey::composite(
                selection.has_base_calendar(),
                base_url.as_deref().unwrap_or_default(),
                selection.base_subjects(),
                &selection.extra_subjects,
            ),
            base_url,
            base_subjects: sorted(selection.base_subjects()),
            extra_subjects: sorted(&selection.extra_subjects),
            event_count,
        }
    }

    /// Same record with a freshly drawn code.
    pub fn with_code(self, code: String) -> Self {
        Self { code, ..self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::validation::CalendarSelection;

    #[test]
    fn test_new_composite_without_base() {
        let selection = CompositeSelection {
            base: None,
            extra_subjects: vec!["200".to_string(), "100".to_string()],
        };

        let new_link = NewCompositeLink::new("code".to_string(), &selection, Some(7));

        assert!(!new_link.has_base_calendar);
        assert!(new_link.base_url.is_none());
        assert!(new_link.base_subjects.is_empty());
        assert_eq!(new_link.extra_subjects, vec!["100", "200"]);
        assert_eq!(new_link.event_count, Some(7));
    }

    #[test]
    fn test_new_composite_with_base() {
        let selection = CompositeSelection {
            base: Some(CalendarSelection {
                url: "https://calendar.example/dept/42".to_string(),
                subjects: vec!["B".to_string(), "A".to_string()],
            }),
            extra_subjects: vec!["100".to_string()],
        };

        let new_link = NewCompositeLink::new("code".to_string(), &selection, None);

        assert!(new_link.has_base_calendar);
        assert_eq!(
            new_link.base_url.as_deref(),
            Some("https://calendar.example/dept/42")
        );
        assert_eq!(new_link.base_subjects, vec!["A", "B"]);
        assert_eq!(
            new_link.canonical_key,
            CanonicalKey::composite(
                true,
                "https://calendar.example/dept/42",
                &["A".to_string(), "B".to_string()],
                &["100".to_string()]
            )
        );
    }
}
