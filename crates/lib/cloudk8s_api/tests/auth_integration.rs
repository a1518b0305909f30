//! End-to-end tests of the login and protected routes, driven through the
//! router with `oneshot`. The credential store is in memory.

use std::collections::HashMap;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::{Duration, Utc};
use cloudk8s_api::config::{ApiConfig, AppInfo};
use cloudk8s_api::{AppState, router};
use cloudk8s_core::auth::password::hash_password;
use cloudk8s_core::auth::{
    AdminAccount, AdminAuthenticator, Authenticator, JwtChecker, StoreAuthenticator,
};
use cloudk8s_core::config::{AuthMode, Settings};
use cloudk8s_core::health::StaticHealth;
use cloudk8s_core::models::auth::StoredUser;
use cloudk8s_core::store::CredentialStore;
use cloudk8s_core::store::memory::MemoryStore;
use serde_json::Value;
use tower::ServiceExt;

const ADMIN_PASSWORD: &str = "Sup3r-Secret!";
const APP: &str = "goCloudK8sExample";

fn settings(extra: &[(&str, &str)]) -> Settings {
    let mut vars: HashMap<String, String> = [
        ("JWT_SECRET", "a-very-long-integration-secret"),
        ("JWT_ISSUER_ID", "integration-issuer"),
        ("JWT_CONTEXT_KEY", "jwtdata"),
        ("JWT_AUTH_URL", "/login"),
        ("ADMIN_PASSWORD", ADMIN_PASSWORD),
        ("DB_PASSWORD", "postgres"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    for (k, v) in extra {
        vars.insert(k.to_string(), v.to_string());
    }
    Settings::from_lookup(APP, move |key| vars.get(key).cloned()).expect("settings")
}

struct TestApp {
    app: Router,
    jwt: Arc<JwtChecker>,
    store: Arc<MemoryStore>,
    readiness: Arc<StaticHealth>,
}

fn build(extra: &[(&str, &str)]) -> TestApp {
    let settings = settings(extra);
    let info = AppInfo {
        app: APP.to_string(),
        version: "1.2.3".to_string(),
        build_stamp: "2026-10-18T00:00:00Z".to_string(),
        repository: "github.com/example/cloudk8s".to_string(),
        revision: "abc1234".to_string(),
    };
    let jwt = Arc::new(JwtChecker::new(&settings.jwt));
    let admin = AdminAccount::from_config(&settings.admin);
    let store = Arc::new(MemoryStore::with_users([
        StoredUser {
            id: 7,
            login: "jroe".to_string(),
            first_name: "Jane".to_string(),
            last_name: "Roe".to_string(),
            email: "jane.roe@example.org".to_string(),
            is_active: true,
        },
        StoredUser {
            id: 42,
            login: "CORP\\jdoe".to_string(),
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            email: "john.doe@example.org".to_string(),
            is_active: true,
        },
        StoredUser {
            id: 500,
            login: "CORP\\goadmin".to_string(),
            first_name: "Mallory".to_string(),
            last_name: "Admin".to_string(),
            email: "mallory@example.org".to_string(),
            is_active: true,
        },
    ]));

    let (authenticator, credential_store) = match settings.auth.mode {
        AuthMode::Admin => {
            let authenticator: Arc<dyn Authenticator> = Arc::new(AdminAuthenticator::new(admin));
            (authenticator, None)
        }
        AuthMode::Employee => {
            let dyn_store: Arc<dyn CredentialStore> = store.clone();
            let authenticator: Arc<dyn Authenticator> = Arc::new(StoreAuthenticator::new(
                admin,
                dyn_store.clone(),
                settings.auth.admin_ids.clone(),
            ));
            (authenticator, Some(dyn_store))
        }
    };

    let readiness = Arc::new(StaticHealth::new(true));
    let state = AppState {
        config: Arc::new(ApiConfig::from_settings(&settings, info)),
        jwt: jwt.clone(),
        authenticator,
        store: credential_store,
        readiness: readiness.clone(),
        health: Arc::new(StaticHealth::new(true)),
    };
    TestApp {
        app: router(state),
        jwt,
        store,
        readiness,
    }
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, HeaderMapSnapshot, Value) {
    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let cookies = response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_string)
        .collect();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, HeaderMapSnapshot { cookies }, json)
}

struct HeaderMapSnapshot {
    cookies: Vec<String>,
}

fn form_login(login: &str, hashed: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(format!("login={login}&hashed={hashed}")))
        .unwrap()
}

fn status_with(token: &str) -> Request<Body> {
    Request::builder()
        .uri("/goapi/v1/status")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

async fn admin_token(app: &Router) -> String {
    let (status, _, body) = send(app, form_login("goadmin", &hash_password(ADMIN_PASSWORD))).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["token"].as_str().expect("token").to_string()
}

#[tokio::test]
async fn form_login_then_status_with_bearer() {
    let t = build(&[]);
    let token = admin_token(&t.app).await;
    assert_eq!(token.split('.').count(), 3);

    let (status, _, body) = send(&t.app, status_with(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["claims"]["user"]["login"], "goadmin");
    assert_eq!(body["claims"]["user"]["is_admin"], true);
    assert_eq!(body["claims"]["sub"], APP);
    assert_eq!(body["claims"]["iss"], "integration-issuer");
}

#[tokio::test]
async fn json_login_accepts_uppercase_digest() {
    let t = build(&[]);
    let payload = serde_json::json!({
        "username": "goadmin",
        "password_hash": hash_password(ADMIN_PASSWORD).to_uppercase(),
    });
    let request = Request::builder()
        .method("POST")
        .uri("/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap();
    let (status, _, body) = send(&t.app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let t = build(&[]);
    let (status, _, body) = send(&t.app, form_login("goadmin", &hash_password("nope"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "username not found or password invalid");
}

#[tokio::test]
async fn malformed_credentials_are_bad_requests() {
    let t = build(&[]);
    let (status, _, _) = send(&t.app, form_login("goadmin", "not-a-digest")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = send(&t.app, form_login("a", &hash_password(ADMIN_PASSWORD))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let request = Request::builder()
        .method("POST")
        .uri("/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, _, _) = send(&t.app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_token_is_bad_request() {
    let t = build(&[]);
    let request = Request::builder()
        .uri("/goapi/v1/status")
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = send(&t.app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn empty_bearer_token_is_unauthorized() {
    let t = build(&[]);
    for value in ["Bearer ", "Bearer", ""] {
        let request = Request::builder()
            .uri("/goapi/v1/status")
            .header(header::AUTHORIZATION, value)
            .body(Body::empty())
            .unwrap();
        let (status, _, body) = send(&t.app, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{value:?}");
        assert_eq!(body["status"], "error");
    }
}

#[tokio::test]
async fn expired_and_tampered_tokens_are_unauthorized() {
    let t = build(&[]);
    let admin = AdminAccount::new(960901, 99999, "goadmin", "goadmin@example.org", ADMIN_PASSWORD);
    let stale = t
        .jwt
        .issue_token_at(&admin.identity(), Utc::now() - Duration::minutes(61))
        .expect("token");
    let (status, _, _) = send(&t.app, status_with(&stale)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let mut token = admin_token(&t.app).await;
    token.push('x');
    let (status, _, _) = send(&t.app, status_with(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_from_cookie_or_websocket_protocol() {
    let t = build(&[]);
    let token = admin_token(&t.app).await;

    let request = Request::builder()
        .uri("/goapi/v1/status")
        .header(header::COOKIE, format!("goJWT_token={token}"))
        .body(Body::empty())
        .unwrap();
    let (status, _, _) = send(&t.app, request).await;
    assert_eq!(status, StatusCode::OK);

    let request = Request::builder()
        .uri("/goapi/v1/status")
        .header(header::SEC_WEBSOCKET_PROTOCOL, format!("Authorization, {token}"))
        .body(Body::empty())
        .unwrap();
    let (status, _, _) = send(&t.app, request).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn trusted_header_login_only_in_employee_mode() {
    for extra in [vec![], vec![("ALLOWED_HOSTS", "localhost")]] {
        let t = build(&extra);
        let (status, _, _) = send(&t.app, trusted_login("localhost", Some("goadmin"))).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }
}

fn employee() -> TestApp {
    build(&[
        ("AUTH_MODE", "employee"),
        ("ALLOWED_HOSTS", "localhost,app.example.org"),
        ("ADMIN_IDS", "42"),
    ])
}

fn trusted_login(host: &str, user: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri("/login").header(header::HOST, host);
    if let Some(user) = user {
        builder = builder.header("UserId", user);
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn trusted_header_login_sets_cookie() {
    let t = employee();
    let (status, headers, body) = send(&t.app, trusted_login("127.0.0.1:8080", Some("jroe"))).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["status"], "success");

    let cookie = headers
        .cookies
        .iter()
        .find(|c| c.starts_with("goJWT_token="))
        .expect("jwt cookie");
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Secure"));
    assert!(cookie.contains("SameSite=Lax"));

    let pair = cookie.split(';').next().expect("cookie pair");
    let request = Request::builder()
        .uri("/goapi/v1/status")
        .header(header::HOST, "app.example.org")
        .header(header::COOKIE, pair)
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = send(&t.app, request).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["claims"]["user"]["login"], "jroe");
    assert_eq!(body["claims"]["user"]["name"], "Roe, Jane");
    assert_eq!(body["claims"]["user"]["is_admin"], false);
}

#[tokio::test]
async fn trusted_header_login_rejections() {
    let t = employee();
    let (status, _, _) = send(&t.app, trusted_login("localhost", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _, _) = send(&t.app, trusted_login("evil.example.com", Some("jroe"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _, _) = send(&t.app, trusted_login("localhost", Some("nobody"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn domain_qualified_store_login_maps_admin_ids() {
    let t = employee();
    let stored = t.store.get("jdoe").await.expect("lookup").expect("stored user");
    assert_eq!(stored.login, "CORP\\jdoe");

    let (status, headers, body) = send(&t.app, trusted_login("localhost", Some("jdoe"))).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let pair = headers.cookies[0].split(';').next().expect("cookie pair").to_string();

    let request = Request::builder()
        .uri("/goapi/v1/status")
        .header(header::HOST, "localhost")
        .header(header::COOKIE, pair)
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = send(&t.app, request).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let user = &body["claims"]["user"];
    assert_eq!(user["login"], "jdoe");
    assert_eq!(user["user_id"], 42);
    assert_eq!(user["external_id"], 42);
    assert_eq!(user["is_admin"], true);
    assert_eq!(user["groups"], serde_json::json!([0, 1]));
}

#[tokio::test]
async fn store_user_logs_in_with_form() {
    let t = employee();
    let mut request = form_login("jroe", &hash_password("checked-by-the-proxy"));
    request
        .headers_mut()
        .insert(header::HOST, "localhost".parse().unwrap());
    let (status, _, body) = send(&t.app, request).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let token = body["token"].as_str().expect("token");

    let mut request = status_with(token);
    request
        .headers_mut()
        .insert(header::HOST, "localhost".parse().unwrap());
    let (status, _, body) = send(&t.app, request).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["claims"]["user"]["login"], "jroe");
    assert_eq!(body["claims"]["user"]["user_id"], 7);
    assert_eq!(body["claims"]["user"]["is_admin"], false);
}

#[tokio::test]
async fn admin_login_is_not_granted_through_store_user() {
    let t = employee();
    let mut request = form_login("goadmin", &hash_password("not-the-admin-password"));
    request
        .headers_mut()
        .insert(header::HOST, "localhost".parse().unwrap());
    let (status, _, body) = send(&t.app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED, "{body}");

    let (status, headers, _) = send(&t.app, trusted_login("localhost", Some("goadmin"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(headers.cookies.is_empty());

    let token = admin_token_for_host(&t.app, "localhost").await;
    let mut request = status_with(&token);
    request
        .headers_mut()
        .insert(header::HOST, "localhost".parse().unwrap());
    let (status, _, body) = send(&t.app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["claims"]["user"]["user_id"], 960901);
}

#[tokio::test]
async fn deactivated_caller_is_rejected_in_employee_mode() {
    let t = employee();
    let (status, headers, _) = send(&t.app, trusted_login("localhost", Some("jroe"))).await;
    assert_eq!(status, StatusCode::OK);
    let pair = headers.cookies[0].split(';').next().unwrap().to_string();

    assert!(t.store.deactivate(7));
    let request = Request::builder()
        .uri("/goapi/v1/status")
        .header(header::HOST, "localhost")
        .header(header::COOKIE, pair)
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = send(&t.app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "current calling user does not exist");
}

#[tokio::test]
async fn status_rejects_foreign_host() {
    let t = employee();
    let token = admin_token_for_host(&t.app, "localhost").await;
    let request = Request::builder()
        .uri("/goapi/v1/status")
        .header(header::HOST, "evil.example.com")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let (status, _, _) = send(&t.app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

async fn admin_token_for_host(app: &Router, host: &str) -> String {
    let mut request = form_login("goadmin", &hash_password(ADMIN_PASSWORD));
    request
        .headers_mut()
        .insert(header::HOST, host.parse().unwrap());
    let (status, _, body) = send(app, request).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["token"].as_str().expect("token").to_string()
}

#[tokio::test]
async fn probes_follow_health_checks() {
    let t = build(&[]);
    let get = |uri: &str| Request::builder().uri(uri).body(Body::empty()).unwrap();

    let (status, _, body) = send(&t.app, get("/readiness")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isOk"], true);
    assert_eq!(body["msg"], format!("({APP}) is ready"));

    t.readiness.set(false);
    let (status, _, body) = send(&t.app, get("/readiness")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["isOk"], false);

    let (status, _, body) = send(&t.app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn app_info_and_unknown_routes() {
    let t = build(&[]);
    let get = |uri: &str| Request::builder().uri(uri).body(Body::empty()).unwrap();

    let (status, _, body) = send(&t.app, get("/goAppInfo")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["app"], APP);
    assert_eq!(body["version"], "1.2.3");
    assert_eq!(body["revision"], "abc1234");
    assert_eq!(body["authUrl"], "/login");
    assert_eq!(body["statusUrl"], "/goapi/v1/status");

    let (status, _, body) = send(&t.app, get("/nowhere")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}
