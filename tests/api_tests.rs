use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use console_router::{
    AccessLevel, AppConfig, AppState, InMemorySessionStore, SessionState, create_router,
    models::RouteSummary, sitemap,
};
use serde_json::Value;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceExt;
use uuid::Uuid;

const ADMIN_ID: Uuid = Uuid::from_u128(10);
const USER_ID: Uuid = Uuid::from_u128(11);

async fn app_with_base(base_path: &str) -> Router {
    let mut config = AppConfig::default();
    config.base_path = base_path.to_string();

    let sessions = Arc::new(InMemorySessionStore::new());
    sessions.login(ADMIN_ID, AccessLevel::Admin, None).await;
    sessions.login(USER_ID, AccessLevel::User, None).await;

    let table = sitemap::console_table(&config.base_path).unwrap();
    create_router(AppState::new(table, sessions as SessionState, config))
}

async fn app() -> Router {
    app_with_base("/").await
}

async fn get(app: Router, uri: &str, user: Option<Uuid>) -> (StatusCode, header::HeaderMap, Vec<u8>) {
    let mut request = Request::builder().uri(uri);
    if let Some(id) = user {
        request = request.header("x-user-id", id.to_string());
    }
    let response = app
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec();
    (status, headers, body)
}

fn json(body: &[u8]) -> Value {
    serde_json::from_slice(body).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let (status, headers, body) = get(app().await, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"ok");
    assert!(headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn test_route_listing_carries_access_metadata() {
    let (status, _, body) = get(app().await, "/api/routes", None).await;
    assert_eq!(status, StatusCode::OK);

    let routes: Vec<RouteSummary> = serde_json::from_slice(&body).unwrap();
    assert_eq!(routes.len(), sitemap::console_routes().len());
    assert_eq!(routes[0].path, "/about");

    let gated: Vec<&str> = routes
        .iter()
        .filter(|r| r.access == Some(AccessLevel::Admin))
        .map(|r| r.path.as_str())
        .collect();
    assert_eq!(
        gated,
        vec!["/admin/userManage", "/admin/appManage", "/admin/chatManage"]
    );
}

#[tokio::test]
async fn test_navigate_endpoint_reports_redirect_for_anonymous() {
    let (status, _, body) = get(app().await, "/api/navigate?path=/admin/userManage", None).await;
    assert_eq!(status, StatusCode::OK);

    let value = json(&body);
    assert_eq!(value["role"], "notLogin");
    assert_eq!(value["navigation"]["outcome"], "redirect");
    assert_eq!(value["navigation"]["to"], "/noAuth");
}

#[tokio::test]
async fn test_navigate_endpoint_allows_admin() {
    let (_, _, body) = get(
        app().await,
        "/api/navigate?path=/admin/userManage",
        Some(ADMIN_ID),
    )
    .await;

    let value = json(&body);
    assert_eq!(value["role"], "admin");
    assert_eq!(value["navigation"]["outcome"], "render");
    assert_eq!(value["navigation"]["view"]["component"], "UserManagePage");
}

#[tokio::test]
async fn test_page_fallback_redirects_denied_pages() {
    let (status, headers, _) = get(app().await, "/admin/userManage", Some(USER_ID)).await;
    assert_eq!(status, StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(headers[header::LOCATION], "/noAuth");
}

#[tokio::test]
async fn test_page_fallback_renders_dynamic_page() {
    let (status, _, body) = get(app().await, "/app/edit/42", None).await;
    assert_eq!(status, StatusCode::OK);

    let value = json(&body);
    assert_eq!(value["outcome"], "render");
    assert_eq!(value["params"]["id"], "42");
    assert_eq!(value["view"]["chunk"], "pages/AppEditPage.js");
}

#[tokio::test]
async fn test_page_fallback_unknown_page_is_not_found() {
    let (status, _, body) = get(app().await, "/nothing/here", Some(ADMIN_ID)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let value = json(&body);
    assert_eq!(value["outcome"], "notFound");
    assert_eq!(value["view"]["id"], sitemap::NOT_FOUND_VIEW);
}

#[tokio::test]
async fn test_base_path_applies_to_pages_and_redirects() {
    let (status, headers, _) = get(
        app_with_base("/console").await,
        "/console/admin/chatManage",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(headers[header::LOCATION], "/console/noAuth");

    let (status, _, _) = get(app_with_base("/console").await, "/console/noAuth", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_served_over_tcp() {
    let router = app().await;
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    let response = client
        .get(format!("{}/api/navigate", address))
        .query(&[("path", "/app/chat/123")])
        .send()
        .await
        .expect("req fail");
    assert!(response.status().is_success());
    let value: Value = response.json().await.unwrap();
    assert_eq!(value["navigation"]["params"]["id"], "123");

    let response = client
        .get(format!("{}/admin/appManage", address))
        .send()
        .await
        .expect("req fail");
    assert_eq!(response.status(), reqwest::StatusCode::TEMPORARY_REDIRECT);
}

#[tokio::test]
async fn test_relative_base_path_still_redirects_absolutely() {
    let (status, headers, _) = get(
        app_with_base("console").await,
        "/console/admin/userManage",
        Some(USER_ID),
    )
    .await;
    assert_eq!(status, StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(headers[header::LOCATION], "/console/noAuth");
}
