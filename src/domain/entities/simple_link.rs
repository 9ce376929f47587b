//! Simple link entity: a calendar feed filtered to a subject selection.

use chrono::{DateTime, Utc};

use crate::domain::canonical_key::{CanonicalKey, sorted};
use crate::domain::validation::CalendarSelection;

/// A stored short link for one filtered calendar feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleLink {
    pub id: i64,
    pub code: String,
    pub url: String,
    /// Selected subjects, sorted.
    pub subjects: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Input data for creating a simple link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSimpleLink {
    pub code: String,
    pub url: String,
    pub subjects: Vec<String>,
    pub canonical_key: CanonicalKey,
}

impl NewSimpleLink {
    /// Builds the record for a validated selection; subjects are stored sorted.
    pub fn new(code: String, selection: &CalendarSelection) -> Self {
        Self {
            code,
            url: selection.url.clone(),
            subjects: sorted(&selection.subjects),
            canonical_key: CanonicalKey::simple(&selection.url, &selection.subjects),
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

    #[test]
    fn test_new_simple_link_sorts_subjects() {
        let selection = CalendarSelection {
            url: "https://calendar.example/dept/42".to_string(),
            subjects: vec!["CS102".to_string(), "CS101".to_string()],
        };

        let new_link = NewSimpleLink::new("abc".to_string(), &selection);

        assert_eq!(new_link.subjects, vec!["CS101", "CS102"]);
        assert_eq!(
            new_link.canonical_key,
            CanonicalKey::simple(&selection.url, &new_link.subjects)
        );
    }

    #[test]
    fn test_with_code_keeps_key() {
        let selection = CalendarSelection {
            url: "https://calendar.example/dept/42".to_string(),
            subjects: vec!["CS101".to_string()],
        };
        let first = NewSimpleLink::new("first".to_string(), &selection);

        let second = first.clone().with_code("second".to_string());

        assert_eq!(second.code, "second");
        assert_eq!(second.canonical_key, first.canonical_key);
    }
}
