use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::Service;

use server::routes::{self, auth};
use service::auth::domain::{CreateAdminInput, ProfileInput};
use service::auth::repository::{mock::MockAdminRepository, AdminRepository};
use service::{AdminService, PasswordHasher};

fn cors() -> tower_http::cors::CorsLayer { tower_http::cors::CorsLayer::very_permissive() }

struct TestApp {
    app: Router,
    repo: Arc<MockAdminRepository>,
    admin: Arc<AdminService<dyn AdminRepository>>,
}

fn build_app(jwt_secret: Option<&str>) -> TestApp {
    let repo = Arc::new(MockAdminRepository::default());
    let store: Arc<dyn AdminRepository> = repo.clone();
    let admin = Arc::new(AdminService::new(store, PasswordHasher::default()));
    let state = auth::ServerState {
        admin: admin.clone(),
        auth: auth::ServerAuthConfig { jwt_secret: jwt_secret.map(str::to_string) },
    };
    TestApp { app: routes::build_router(cors(), state), repo, admin }
}

async fn seed(admin: &AdminService<dyn AdminRepository>, email: &str, password: &str) {
    let profile = ProfileInput {
        first_name: "Admin".into(),
        last_name: "Kondan".into(),
        phone: "+91 8275063636".into(),
        address: None,
    };
    admin
        .create(CreateAdminInput { email: email.into(), password: password.into(), profile })
        .await
        .expect("seed admin");
}

async fn post_auth(app: &Router, body: Value) -> anyhow::Result<(StatusCode, Value)> {
    let req = Request::builder()
        .method("POST")
        .uri("/api/admin-auth")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body)?))?;
    let resp = app.clone().call(req).await?;
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    Ok((status, serde_json::from_slice(&bytes)?))
}

#[tokio::test]
async fn test_login_success_returns_profile_without_hash() -> anyhow::Result<()> {
    let t = build_app(None);
    seed(&t.admin, "admin@kondantheretreat.com", "Admin@123").await;

    let (status, body) = post_auth(&t.app, json!({"action": "login", "email": "admin@kondantheretreat.com", "password": "Admin@123"})).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["email"], "admin@kondantheretreat.com");
    assert_eq!(body["user"]["first_name"], "Admin");
    assert_eq!(body["user"]["phone"], "+91 8275063636");
    assert!(body["user"].get("password_hash").is_none());
    assert!(body.get("token").is_none());
    Ok(())
}

#[tokio::test]
async fn test_login_issues_token_when_secret_configured() -> anyhow::Result<()> {
    let t = build_app(Some("test-secret"));
    seed(&t.admin, "admin@example.com", "Secret1").await;

    let (status, body) = post_auth(&t.app, json!({"action": "login", "email": "ADMIN@example.com ", "password": "Secret1"})).await?;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().expect("token present");
    let decoded = jsonwebtoken::decode::<auth::Claims>(
        token,
        &jsonwebtoken::DecodingKey::from_secret(b"test-secret"),
        &jsonwebtoken::Validation::default(),
    )?;
    assert_eq!(decoded.claims.sub, "admin@example.com");
    Ok(())
}

#[tokio::test]
async fn test_unknown_email_and_wrong_password_are_indistinguishable() -> anyhow::Result<()> {
    let t = build_app(None);
    seed(&t.admin, "admin@example.com", "Secret1").await;

    let (s1, b1) = post_auth(&t.app, json!({"action": "login", "email": "ghost@example.com", "password": "Secret1"})).await?;
    let (s2, b2) = post_auth(&t.app, json!({"action": "login", "email": "admin@example.com", "password": "wrong-pass"})).await?;
    assert_eq!(s1, StatusCode::UNAUTHORIZED);
    assert_eq!(s1, s2);
    assert_eq!(b1, b2);
    assert_eq!(b1["success"], false);
    Ok(())
}

#[tokio::test]
async fn test_inactive_admin_is_forbidden() -> anyhow::Result<()> {
    let t = build_app(None);
    seed(&t.admin, "admin@example.com", "Secret1").await;
    t.admin.set_active("admin@example.com", false).await?;

    let (status, body) = post_auth(&t.app, json!({"action": "login", "email": "admin@example.com", "password": "Secret1"})).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["success"], false);
    Ok(())
}

#[tokio::test]
async fn test_unsupported_action_and_bad_body() -> anyhow::Result<()> {
    let t = build_app(None);

    let (status, body) = post_auth(&t.app, json!({"action": "signup", "email": "a@b.com", "password": "Secret1"})).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Unsupported action");

    let (status, _) = post_auth(&t.app, json!({"email": "a@b.com"})).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post_auth(&t.app, json!({"action": "login", "email": "a@b.com", "password": ""})).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn test_store_outage_is_503() -> anyhow::Result<()> {
    let t = build_app(None);
    t.repo.set_unavailable(true);

    let (status, body) = post_auth(&t.app, json!({"action": "login", "email": "admin@example.com", "password": "Secret1"})).await?;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["success"], false);
    Ok(())
}

#[tokio::test]
async fn test_health_over_tcp() -> anyhow::Result<()> {
    let t = build_app(None);
    let listener = tokio::net::TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, t.app).await { eprintln!("server error: {}", e); }
    });

    let res = reqwest::get(format!("http://{}/health", addr)).await?;
    assert_eq!(res.status(), reqwest::StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn test_unreachable_rest_store_still_starts_and_reports_503() -> anyhow::Result<()> {
    let closed = tokio::net::TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let dead_addr = closed.local_addr()?;
    drop(closed);

    let mut cfg = configs::AppConfig::default();
    cfg.supabase.url = format!("http://{dead_addr}");
    cfg.supabase.service_key = "service-key".into();
    cfg.supabase.timeout_secs = 2;
    cfg.validate()?;

    let state = server::startup::build_state(&cfg).await?;
    let app = routes::build_router(cors(), state);
    let (status, _) = post_auth(&app, json!({"action": "login", "email": "admin@example.com", "password": "Secret1"})).await?;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    Ok(())
}
