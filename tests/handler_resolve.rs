mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use calendar_shortener::routes::router;
use common::{COURSE_URL, code_of, create_test_state, default_source, event_count};
use serde_json::Value;

fn server() -> (TestServer, common::TestApp) {
    let app = create_test_state(default_source());
    let server = TestServer::new(router(app.state.clone())).unwrap();
    (server, app)
}

async fn create(server: &TestServer, subjects: &str) -> String {
    let shortened = server
        .get("/shorten")
        .add_query_param("url", COURSE_URL)
        .add_query_param("subjects", subjects)
        .await
        .json::<Value>()["shortened"]
        .as_str()
        .unwrap()
        .to_string();
    code_of(&shortened).to_string()
}

#[tokio::test]
async fn test_resolve_filters_calendar() {
    let (server, _app) = server();
    let code = create(&server, "CS101").await;

    let response = server.get(&format!("/s/{code}")).await;

    response.assert_status_ok();
    assert_eq!(
        response.header("content-type"),
        "text/calendar; charset=utf-8"
    );
    let body = response.text();
    assert_eq!(event_count(&body), 2);
    assert!(body.contains("SUMMARY:CS101"));
    assert!(!body.contains("SUMMARY:CS102"));
    assert!(!body.contains("SUMMARY:MA201"));
    // non-event components are kept
    assert!(body.contains("BEGIN:VTIMEZONE"));
    assert!(body.ends_with("END:VCALENDAR\r\n"));
}

#[tokio::test]
async fn test_resolve_fetches_upstream_every_time() {
    let (server, app) = server();
    let code = create(&server, "CS101~CS102").await;
    let after_create = app.source.fetches();

    server.get(&format!("/s/{code}")).await.assert_status_ok();
    server.get(&format!("/s/{code}")).await.assert_status_ok();

    assert_eq!(app.source.fetches(), after_create + 2);
}

#[tokio::test]
async fn test_resolve_unknown_code() {
    let (server, _app) = server();

    let response = server.get("/s/AAAAAAAAAA").await;

    response.assert_status_not_found();
    assert_eq!(response.json::<Value>()["error"]["code"], "not_found");
}

#[tokio::test]
async fn test_resolve_ill_formed_code_skips_store() {
    let (server, app) = server();

    let response = server.get("/s/bad-code!").await;

    response.assert_status_not_found();
    assert_eq!(app.source.fetches(), 0);
}

#[tokio::test]
async fn test_simple_code_is_not_a_composite_code() {
    let (server, _app) = server();
    let code = create(&server, "CS101").await;

    server
        .get(&format!("/cs/{code}"))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_resolve_with_source_down() {
    let (server, app) = server();
    let code = create(&server, "CS101").await;
    app.source.set_down(true);

    let response = server.get(&format!("/s/{code}")).await;

    response.assert_status(StatusCode::BAD_GATEWAY);
    assert_eq!(
        response.json::<Value>()["error"]["code"],
        "source_unavailable"
    );
}

#[tokio::test]
async fn test_composite_resolve_with_source_down() {
    let (server, app) = server();
    let shortened = server
        .get("/cshorten")
        .add_query_param("extra_subjects", "100~200")
        .await
        .json::<Value>()["shortened"]
        .as_str()
        .unwrap()
        .to_string();
    app.source.set_down(true);

    let response = server.get(&format!("/cs/{}", code_of(&shortened))).await;

    response.assert_status(StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_trailing_slash_is_normalized() {
    use calendar_shortener::routes::app_router;
    use tower::ServiceExt;

    let app = create_test_state(default_source());
    let service = app_router(app.state.clone());

    let request = axum::http::Request::builder()
        .uri("/s/AAAAAAAAAA/")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = service.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"]["code"], "not_found");
}
