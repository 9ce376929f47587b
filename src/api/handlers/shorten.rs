//! Handlers for the shortening endpoints.

use axum::{
    Json,
    extract::{Query, State},
    http::HeaderMap,
};

use crate::api::dto::shorten::{CompositeShortenQuery, ShortenQuery, ShortenResponse};
use crate::application::services::{LinkKind, ShortenService};
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::public_url::public_base_url;

/// Creates (or reuses) a short link for a filtered course calendar.
///
/// # Endpoint
///
/// `GET /shorten?url=<calendar url>&subjects=A~B`
///
/// # Response
///
/// ```json
/// { "shortened": "https://cal.example/s/Ab3dE6gH9k" }
/// ```
///
/// Repeating a request, in any subject order, returns the same short URL.
///
/// # Errors
///
/// - 400 for validation failures (see `details.rule`)
/// - 502 if the calendar source is unavailable
/// - 503 if the store is unavailable
pub async fn shorten_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ShortenQuery>,
) -> Result<Json<ShortenResponse>, AppError> {
    let link = state
        .shorten_service
        .shorten(query.url.as_deref(), query.subjects.as_deref())
        .await?;

    let base = public_base_url(state.public_base_url.as_deref(), &headers);

    Ok(Json(ShortenResponse {
        shortened: ShortenService::short_url(&base, LinkKind::Simple, &link.code),
    }))
}

/// Creates (or reuses) a short link for a merged calendar.
///
/// # Endpoint
///
/// `GET /cshorten?has_base_calendar=true&url=<calendar url>&subjects=A~B&extra_subjects=1~2`
///
/// Without `has_base_calendar=true` only `extra_subjects` is used.
///
/// # Errors
///
/// - 400 for validation failures, including a subject named twice
/// - 502 if a feed is unavailable
/// - 503 if the store is unavailable
pub async fn composite_shorten_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<CompositeShortenQuery>,
) -> Result<Json<ShortenResponse>, AppError> {
    let link = state
        .shorten_service
        .shorten_composite(
            query.has_base_calendar(),
            query.url.as_deref(),
            query.subjects.as_deref(),
            query.extra_subjects.as_deref(),
        )
        .await?;

    let base = public_base_url(state.public_base_url.as_deref(), &headers);

    Ok(Json(ShortenResponse {
        shortened: ShortenService::short_url(&base, LinkKind::Composite, &link.code),
    }))
}
