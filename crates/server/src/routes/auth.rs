use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use jsonwebtoken::{encode, EncodingKey, Header as JwtHeader};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use service::auth::domain::{AdminProfile, LoginInput};
use service::auth::repository::AdminRepository;
use service::AdminService;

use crate::errors::ApiError;

#[derive(Clone)]
pub struct ServerAuthConfig {
    /// When present, successful logins carry a signed token
    pub jwt_secret: Option<String>,
}

#[derive(Clone)]
pub struct ServerState {
    pub admin: Arc<AdminService<dyn AdminRepository>>,
    pub auth: ServerAuthConfig,
}

/// `{action: "login", email, password}`
#[derive(Deserialize)]
pub struct AuthRequest {
    pub action: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub user: AdminProfile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub uid: String,
    pub exp: usize,
}

const TOKEN_TTL_HOURS: i64 = 12;

pub fn issue_token(secret: &str, user: &AdminProfile) -> Result<String, jsonwebtoken::errors::Error> {
    let exp = (chrono::Utc::now() + chrono::Duration::hours(TOKEN_TTL_HOURS)).timestamp() as usize;
    let claims = Claims { sub: user.email.clone(), uid: user.id.to_string(), exp };
    encode(&JwtHeader::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
}

/// Admin auth endpoint. Only the `login` action is supported.
#[instrument(skip_all)]
pub async fn admin_auth(
    State(state): State<ServerState>,
    payload: Result<Json<AuthRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, ApiError> {
    let Json(req) = payload.map_err(|e| {
        debug!(error = %e, "malformed auth request");
        ApiError::bad_request("Invalid request body")
    })?;

    match req.action.as_str() {
        "login" => {
            if req.email.trim().is_empty() || req.password.is_empty() {
                return Err(ApiError::bad_request("Email and password are required"));
            }
            let user = state.admin.authenticate(LoginInput { email: req.email, password: req.password }).await?;
            let token = match &state.auth.jwt_secret {
                Some(secret) => Some(issue_token(secret, &user).map_err(|e| {
                    tracing::error!(error = %e, "token signing failed");
                    ApiError::new(axum::http::StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
                })?),
                None => None,
            };
            Ok(Json(AuthResponse { success: true, user, token }))
        }
        _ => Err(ApiError::bad_request("Unsupported action")),
    }
}
