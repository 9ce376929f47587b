//! Handlers for the read-only catalog endpoints.

use axum::{
    Json,
    extract::{Query, State},
};

use crate::api::dto::catalog::{
    CourseEntry, CoursesResponse, IdInfoQuery, UrlInfoQuery, UrlInfoResponse,
};
use crate::domain::calendar_source::SubjectGroup;
use crate::error::AppError;
use crate::state::AppState;

/// Lists the subjects offered by a course calendar.
///
/// # Endpoint
///
/// `GET /urlinfo?url=<calendar url>`
///
/// # Response
///
/// ```json
/// { "courses": [{ "id": "https://search.usi.ch/...", "name": "Algebra" }] }
/// ```
pub async fn urlinfo_handler(
    State(state): State<AppState>,
    Query(query): Query<UrlInfoQuery>,
) -> Result<Json<UrlInfoResponse>, AppError> {
    let subjects = state
        .catalog_service
        .subjects_for_url(query.url.as_deref())
        .await?;

    Ok(Json(UrlInfoResponse {
        courses: subjects.into_iter().map(CourseEntry::from).collect(),
    }))
}

/// Returns one subject group.
///
/// # Endpoint
///
/// `GET /idinfo?id=<group id>`
pub async fn idinfo_handler(
    State(state): State<AppState>,
    Query(query): Query<IdInfoQuery>,
) -> Result<Json<SubjectGroup>, AppError> {
    let group = state
        .catalog_service
        .course_info(query.id.as_deref())
        .await?;

    Ok(Json(group))
}

/// Lists the course calendars users can pick from.
///
/// # Endpoint
///
/// `GET /courses`
pub async fn courses_handler(
    State(state): State<AppState>,
) -> Result<Json<CoursesResponse>, AppError> {
    let cals = state.catalog_service.calendars().await?;
    Ok(Json(CoursesResponse { cals }))
}

/// Lists the external subject groups.
///
/// # Endpoint
///
/// `GET /extcourses`
pub async fn extcourses_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<SubjectGroup>>, AppError> {
    Ok(Json(state.catalog_service.subject_groups().await?))
}
