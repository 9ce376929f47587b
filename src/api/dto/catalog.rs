//! DTOs for the catalog endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::calendar::SubjectEntry;

/// Query of `GET /urlinfo`.
#[derive(Debug, Deserialize)]
pub struct UrlInfoQuery {
    pub url: Option<String>,
}

/// Query of `GET /idinfo`.
#[derive(Debug, Deserialize)]
pub struct IdInfoQuery {
    pub id: Option<String>,
}

/// One subject offered by a course calendar.
#[derive(Debug, Serialize, Deserialize)]
pub struct CourseEntry {
    pub id: String,
    pub name: String,
}

impl From<SubjectEntry> for CourseEntry {
    fn from(entry: SubjectEntry) -> Self {
        Self {
            id: entry.id,
            name: entry.name,
        }
    }
}

/// Response of `GET /urlinfo`.
#[derive(Debug, Serialize, Deserialize)]
pub struct UrlInfoResponse {
    pub courses: Vec<CourseEntry>,
}

/// Response of `GET /courses`.
#[derive(Debug, Serialize, Deserialize)]
pub struct CoursesResponse {
    pub cals: Vec<String>,
}
