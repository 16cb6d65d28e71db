use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use service::AdminError;
use thiserror::Error;
use tracing::{error, warn};

/// Message shared by unknown-email and wrong-password failures.
pub const LOGIN_FAILED: &str = "Invalid email or password";

/// Failure body of the login surface: `{success: false, error}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl From<AdminError> for ApiError {
    fn from(e: AdminError) -> Self {
        let code = e.code();
        match e {
            e if e.is_auth_failure() => ApiError::new(StatusCode::UNAUTHORIZED, LOGIN_FAILED),
            AdminError::InactiveAccount => ApiError::new(StatusCode::FORBIDDEN, "Account is inactive"),
            AdminError::Validation(msg) => ApiError::bad_request(msg),
            AdminError::DuplicateEmail => ApiError::new(StatusCode::CONFLICT, "An admin with this email already exists"),
            AdminError::StoreUnavailable(msg) => {
                warn!(code, error = %msg, "admin store unavailable");
                ApiError::new(StatusCode::SERVICE_UNAVAILABLE, "Service temporarily unavailable")
            }
            other => {
                error!(code, error = %other, "admin request failed");
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(serde_json::json!({"success": false, "error": self.message}))).into_response()
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Admin(#[from] AdminError),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_and_bad_password_look_the_same() {
        let a = ApiError::from(AdminError::NotFound);
        let b = ApiError::from(AdminError::InvalidCredentials);
        assert_eq!(a.status, b.status);
        assert_eq!(a.message, b.message);
        assert_eq!(a.status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn outage_is_503_without_details() {
        let e = ApiError::from(AdminError::StoreUnavailable("tcp connect error 10.0.0.5".into()));
        assert_eq!(e.status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(!e.message.contains("10.0.0.5"));
    }

    #[test]
    fn inactive_is_forbidden() {
        assert_eq!(ApiError::from(AdminError::InactiveAccount).status, StatusCode::FORBIDDEN);
    }
}
