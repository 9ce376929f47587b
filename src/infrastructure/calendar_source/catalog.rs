//! Course catalog loaded from a JSON file.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::domain::calendar_source::SubjectGroup;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Calendars and subject groups offered to users.
///
/// ```json
/// {
///   "cals": ["https://search.usi.ch/.../ics"],
///   "groups": [{ "id": "77", "course_name": "Master in ...", "subjects": ["35263"] }]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub cals: Vec<String>,
    #[serde(default)]
    pub groups: Vec<SubjectGroup>,
}

impl Catalog {
    /// Reads and parses the catalog file.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if the file cannot be read or is not valid JSON.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(raw)?)
    }
}
