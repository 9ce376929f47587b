//! Handlers serving the calendars behind short codes.

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};

use crate::error::AppError;
use crate::state::AppState;

const CALENDAR_CONTENT_TYPE: &str = "text/calendar; charset=utf-8";

/// Serves the filtered calendar of a simple short link.
///
/// # Endpoint
///
/// `GET /s/{code}`
///
/// # Errors
///
/// - 404 if the code is unknown
/// - 502 if the upstream calendar cannot be fetched
pub async fn calendar_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let ics = state.shorten_service.resolve(&code).await?;

    Ok(([(header::CONTENT_TYPE, CALENDAR_CONTENT_TYPE)], ics))
}

/// Serves the merged calendar of a composite short link.
///
/// # Endpoint
///
/// `GET /cs/{code}`
///
/// Feeds are fetched again on every request, so the calendar follows
/// upstream changes.
///
/// # Errors
///
/// - 404 if the code is unknown
/// - 502 if any feed cannot be fetched
pub async fn composite_calendar_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let ics = state.shorten_service.resolve_composite(&code).await?;

    Ok(([(header::CONTENT_TYPE, CALENDAR_CONTENT_TYPE)], ics))
}
