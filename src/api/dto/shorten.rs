//! DTOs for the shortening endpoints.

use serde::{Deserialize, Serialize};

/// Query of `GET /shorten`.
#[derive(Debug, Default, Deserialize)]
pub struct ShortenQuery {
    pub url: Option<String>,
    /// `~`-separated subject identifiers.
    pub subjects: Option<String>,
}

/// Query of `GET /cshorten`.
#[derive(Debug, Default, Deserialize)]
pub struct CompositeShortenQuery {
    /// Only the literal `true` enables the base calendar.
    pub has_base_calendar: Option<String>,
    pub url: Option<String>,
    pub subjects: Option<String>,
    pub extra_subjects: Option<String>,
}

impl CompositeShortenQuery {
    pub fn has_base_calendar(&self) -> bool {
        self.has_base_calendar.as_deref() == Some("true")
    }
}

/// Response of both shortening endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct ShortenResponse {
    pub shortened: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_base_calendar_is_strict() {
        let query = |flag: Option<&str>| CompositeShortenQuery {
            has_base_calendar: flag.map(str::to_string),
            ..Default::default()
        };

        assert!(query(Some("true")).has_base_calendar());
        assert!(!query(Some("TRUE")).has_base_calendar());
        assert!(!query(Some("1")).has_base_calendar());
        assert!(!query(Some("false")).has_base_calendar());
        assert!(!query(None).has_base_calendar());
    }
}
