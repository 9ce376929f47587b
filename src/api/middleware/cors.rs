//! Cross-origin access for browser front-ends.

use axum::http::Method;
use tower_http::cors::{Any, CorsLayer};

/// Allows `GET` requests from any origin.
///
/// Every response carries `Access-Control-Allow-Origin: *`, including error
/// responses, so browser clients can read validation failures.
pub fn layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any)
}
