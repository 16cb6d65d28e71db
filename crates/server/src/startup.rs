use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use configs::AppConfig;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::errors::StartupError;
use crate::routes::{self, auth};
use service::{auth::repo, AdminService, PasswordHasher};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("server address: {e}")))
}

/// Connect the configured store and assemble shared handler state.
pub async fn build_state(cfg: &AppConfig) -> Result<auth::ServerState, StartupError> {
    let hasher = PasswordHasher::new(cfg.auth.bcrypt_cost)?;
    let store = repo::connect(cfg).await?;
    let admin = Arc::new(AdminService::new(store, hasher));
    if let Err(e) = admin.check_store().await {
        // login requests will report 503 until the store comes back
        warn!(error = %e, code = e.code(), "admin store not reachable at startup");
    }
    Ok(auth::ServerState {
        admin,
        auth: auth::ServerAuthConfig { jwt_secret: cfg.auth.jwt_secret.clone() },
    })
}

/// Public entry: build the app and run the HTTP server until `shutdown` resolves
pub async fn run(cfg: AppConfig, shutdown: impl std::future::Future<Output = ()> + Send + 'static) -> Result<(), StartupError> {
    let state = build_state(&cfg).await?;
    let app: Router = routes::build_router(build_cors(), state);

    let addr = bind_addr(&cfg)?;
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(anyhow::Error::from)?;
    info!(%addr, backend = ?cfg.store.backend, "admin auth server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(anyhow::Error::from)?;
    Ok(())
}
