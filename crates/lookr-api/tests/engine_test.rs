#![allow(clippy::unwrap_used)]
// Integration tests for `CrudEngine` over `HttpTransport` using wiremock.

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{
    body_json, body_string_contains, header, method, path, query_param, query_param_is_missing,
};
use wiremock::{Mock, MockServer, ResponseTemplate};

use lookr_api::models::{AlertAppliedDashboardFilter, ComparisonType, WriteAlert, WriteTheme};
use lookr_api::{
    ApiError, Credentials, CrudEngine, Error, Field, HttpTransport, TransportError,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn engine_for(server: &MockServer, credentials: Credentials) -> CrudEngine<HttpTransport> {
    let transport =
        HttpTransport::with_client(reqwest::Client::new(), &server.uri(), credentials, "4.0")
            .unwrap();
    CrudEngine::new(transport)
}

async fn setup() -> (MockServer, CrudEngine<HttpTransport>) {
    let server = MockServer::start().await;
    let engine = engine_for(&server, Credentials::AccessToken(SecretString::from("tok")));
    (server, engine)
}

fn corp_theme() -> serde_json::Value {
    json!({ "id": "42", "name": "corp", "can": { "view": true } })
}

// ── Authentication ──────────────────────────────────────────────────

#[tokio::test]
async fn test_access_token_sent_as_token_header() {
    let (server, engine) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/4.0/themes"))
        .and(header("authorization", "token tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let listing = engine.themes().list(&CancellationToken::new()).await.unwrap();
    assert!(listing.items.is_empty());
}

#[tokio::test]
async fn test_client_credentials_login_once_and_reuse_token() {
    let server = MockServer::start().await;
    let engine = engine_for(
        &server,
        Credentials::client_credentials("id-1", SecretString::from("s3cret")),
    );

    Mock::given(method("POST"))
        .and(path("/api/4.0/login"))
        .and(body_string_contains("client_id=id-1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "access_token": "fresh", "expires_in": 3600 })),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/4.0/themes"))
        .and(header("authorization", "token fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(2)
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    engine.themes().list(&cancel).await.unwrap();
    engine.themes().list(&cancel).await.unwrap();
}

fn login_engine(server: &MockServer) -> CrudEngine<HttpTransport> {
    engine_for(
        server,
        Credentials::client_credentials("id-1", SecretString::from("s3cret")),
    )
}

async fn mount_login_status(server: &MockServer, template: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/api/4.0/login"))
        .respond_with(template)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_rejected_login_is_unauthorized() {
    let server = MockServer::start().await;
    let engine = login_engine(&server);
    mount_login_status(
        &server,
        ResponseTemplate::new(401).set_body_json(json!({ "message": "bad creds" })),
    )
    .await;

    let result = engine.themes().get("1", &CancellationToken::new()).await;

    assert!(
        matches!(
            result,
            Err(Error::Transport(TransportError::Unauthorized { status: Some(401), .. }))
        ),
        "expected Unauthorized, got: {result:?}"
    );
}

#[tokio::test]
async fn test_login_outage_is_server_error() {
    let server = MockServer::start().await;
    let engine = login_engine(&server);
    mount_login_status(
        &server,
        ResponseTemplate::new(503).set_body_json(json!({ "message": "maintenance" })),
    )
    .await;

    let err = engine
        .themes()
        .get("1", &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(err.is_transient());
    assert!(
        matches!(
            err,
            Error::Api(ApiError::ServerError { status: 503, ref message }) if message == "maintenance"
        ),
        "expected ServerError, got: {err:?}"
    );
}

#[tokio::test]
async fn test_login_rate_limited() {
    let server = MockServer::start().await;
    let engine = login_engine(&server);
    mount_login_status(
        &server,
        ResponseTemplate::new(429).insert_header("retry-after", "7"),
    )
    .await;

    let err = engine
        .themes()
        .get("1", &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Api(ApiError::RateLimited {
            retry_after_secs: Some(7)
        })
    ));
}

#[tokio::test]
async fn test_missing_login_endpoint_is_not_entity_not_found() {
    let server = MockServer::start().await;
    let engine = login_engine(&server);
    mount_login_status(&server, ResponseTemplate::new(404).set_body_string("Not found")).await;

    let err = engine
        .themes()
        .get("1", &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(!err.is_not_found());
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn test_logout_failure_is_reported() {
    let server = MockServer::start().await;
    let engine = login_engine(&server);
    mount_login_status(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({ "access_token": "fresh" })),
    )
    .await;
    Mock::given(method("DELETE"))
        .and(path("/api/4.0/logout"))
        .and(header("authorization", "token fresh"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "message": "boom" })))
        .expect(1)
        .mount(&server)
        .await;

    engine.transport().login().await.unwrap();
    let err = engine.transport().logout().await.unwrap_err();

    assert!(matches!(
        err,
        Error::Api(ApiError::ServerError { status: 500, .. })
    ));
}

#[tokio::test]
async fn test_logout_without_session_is_noop() {
    let (_server, engine) = setup().await;
    engine.transport().logout().await.unwrap();
}

#[tokio::test]
async fn test_forbidden_is_unauthorized_not_api_error() {
    let (server, engine) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/4.0/themes/1"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden"))
        .mount(&server)
        .await;

    let result = engine.themes().get("1", &CancellationToken::new()).await;

    assert!(matches!(
        result,
        Err(Error::Transport(TransportError::Unauthorized { status: Some(403), .. }))
    ));
}

// ── Read-after-write ────────────────────────────────────────────────

#[tokio::test]
async fn test_create_then_forced_read() {
    let (server, engine) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/4.0/themes"))
        .and(body_json(json!({ "name": "corp" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(corp_theme()))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/4.0/themes/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(corp_theme()))
        .expect(1)
        .mount(&server)
        .await;

    let write = WriteTheme {
        name: "corp".to_owned().into(),
        ..WriteTheme::default()
    };
    let theme = engine
        .themes()
        .create(&write, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(theme.id.as_deref(), Some("42"));
    assert_eq!(theme.name.as_deref(), Some("corp"));
    let can = theme.can.value().unwrap();
    assert_eq!(can.get("view"), Some(&true));
    assert!(theme.settings.is_absent());
}

#[tokio::test]
async fn test_create_without_id_in_response_fails() {
    let (server, engine) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/4.0/themes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "corp" })))
        .mount(&server)
        .await;

    let result = engine
        .themes()
        .create(&WriteTheme::default(), &CancellationToken::new())
        .await;

    assert!(matches!(result, Err(Error::Decode(_))));
}

#[tokio::test]
async fn test_alert_update_uses_put_and_rereads() {
    let (server, engine) = setup().await;

    let write = WriteAlert {
        comparison_type: ComparisonType::GreaterThan.into(),
        threshold: 10.0.into(),
        applied_dashboard_filters: vec![AlertAppliedDashboardFilter {
            field_name: "orders.status".to_owned().into(),
            ..AlertAppliedDashboardFilter::default()
        }]
        .into(),
        ..WriteAlert::default()
    };

    Mock::given(method("PUT"))
        .and(path("/api/4.0/alerts/5"))
        .and(body_json(json!({
            "comparison_type": "GREATER_THAN",
            "threshold": 10.0,
            "applied_dashboard_filters": [{ "field_name": "orders.status" }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "5" })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/4.0/alerts/5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "5",
            "comparison_type": "GREATER_THAN",
            "threshold": 10.0,
            "followed": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let alert = engine
        .alerts()
        .update("5", &write, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(alert.comparison_type.as_deref(), Some("GREATER_THAN"));
    assert_eq!(alert.followed, Field::Present(false));
}

#[tokio::test]
async fn test_delete_confirmed_by_not_found() {
    let (server, engine) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/4.0/themes/42"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/4.0/themes/42"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "Not found" })))
        .expect(1)
        .mount(&server)
        .await;

    let survivor = engine
        .themes()
        .delete("42", &CancellationToken::new())
        .await
        .unwrap();
    assert!(survivor.is_none());
}

#[tokio::test]
async fn test_delete_reports_survivor() {
    let (server, engine) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/4.0/themes/42"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/4.0/themes/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(corp_theme()))
        .mount(&server)
        .await;

    let survivor = engine
        .themes()
        .delete("42", &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(survivor.unwrap().id.as_deref(), Some("42"));
}

// ── Pagination ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_alert_search_follows_link_header() {
    let (server, engine) = setup().await;
    let next = format!("{}/api/4.0/alerts/search?offset=2", server.uri());

    Mock::given(method("GET"))
        .and(path("/api/4.0/alerts/search"))
        .and(query_param_is_missing("offset"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("link", format!("<{next}>; rel=\"next\"").as_str())
                .insert_header("x-ratelimit-remaining", "9")
                .set_body_json(json!([{ "id": "1" }, { "id": "2" }])),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/4.0/alerts/search"))
        .and(query_param("offset", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-ratelimit-remaining", "8")
                .set_body_json(json!([{ "id": "3" }])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let listing = engine.alerts().list(&CancellationToken::new()).await.unwrap();

    let ids: Vec<_> = listing.items.iter().filter_map(|a| a.id.as_deref()).collect();
    assert_eq!(ids, vec!["1", "2", "3"]);
    assert_eq!(listing.pages, 2);
    assert_eq!(listing.rate_limit.remaining, Some(8));
}

#[tokio::test]
async fn test_body_cursor_sent_back_as_query() {
    let (server, engine) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/4.0/themes"))
        .and(query_param_is_missing("cursor"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "data": [{ "id": "1" }], "next_cursor": "B" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/4.0/themes"))
        .and(query_param("cursor", "B"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "data": [{ "id": "2" }] })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let listing = engine.themes().list(&CancellationToken::new()).await.unwrap();
    assert_eq!(listing.items.len(), 2);
}

// ── Error decoding ──────────────────────────────────────────────────

#[tokio::test]
async fn test_validation_error_carries_fields() {
    let (server, engine) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/4.0/themes"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "message": "Validation Failed",
            "errors": [{ "field": "name", "code": "invalid", "message": "must be alphanumeric" }]
        })))
        .mount(&server)
        .await;

    let write = WriteTheme {
        name: "not ok!".to_owned().into(),
        ..WriteTheme::default()
    };
    let err = engine
        .themes()
        .create(&write, &CancellationToken::new())
        .await
        .unwrap_err();

    let Error::Api(ApiError::Validation { status, errors, .. }) = err else {
        panic!("expected validation error, got: {err:?}");
    };
    assert_eq!(status, 422);
    assert_eq!(errors[0].field, "name");
}

#[tokio::test]
async fn test_rate_limited_with_retry_after() {
    let (server, engine) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/4.0/themes/1"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "30"))
        .mount(&server)
        .await;

    let err = engine
        .themes()
        .get("1", &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(err.is_transient());
    assert!(matches!(
        err,
        Error::Api(ApiError::RateLimited {
            retry_after_secs: Some(30)
        })
    ));
}

#[tokio::test]
async fn test_cancelled_request_is_aborted() {
    let (server, engine) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/4.0/themes/1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(std::time::Duration::from_secs(10))
                .set_body_json(corp_theme()),
        )
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let result = engine.themes().get("1", &cancel).await;
    assert!(matches!(result, Err(Error::Cancelled)));
}
