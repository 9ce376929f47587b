//! Public API route configuration.

use crate::api::handlers::{
    calendar_handler, composite_calendar_handler, composite_shorten_handler, courses_handler,
    extcourses_handler, idinfo_handler, shorten_handler, urlinfo_handler,
};
use crate::state::AppState;
use axum::{Router, routing::get};

/// All calendar routes.
///
/// # Endpoints
///
/// - `GET /shorten`     - Short link for a filtered course calendar
/// - `GET /s/{code}`    - Filtered calendar behind a short link
/// - `GET /cshorten`    - Short link for a merged calendar
/// - `GET /cs/{code}`   - Merged calendar behind a composite short link
/// - `GET /urlinfo`     - Subjects offered by a course calendar
/// - `GET /idinfo`      - One external subject group
/// - `GET /courses`     - Course calendars on offer
/// - `GET /extcourses`  - External subject groups
pub fn calendar_routes() -> Router<AppState> {
    Router::new()
        .route("/shorten", get(shorten_handler))
        .route("/s/{code}", get(calendar_handler))
        .route("/cshorten", get(composite_shorten_handler))
        .route("/cs/{code}", get(composite_calendar_handler))
        .route("/urlinfo", get(urlinfo_handler))
        .route("/idinfo", get(idinfo_handler))
        .route("/courses", get(courses_handler))
        .route("/extcourses", get(extcourses_handler))
}
