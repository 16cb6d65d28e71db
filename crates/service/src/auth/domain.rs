use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::AdminError;

/// Minimum password length (in characters) for creation and reset.
pub const MIN_PASSWORD_LEN: usize = 6;
/// bcrypt only looks at the first 72 bytes; longer inputs are refused instead of silently truncated.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Canonical lookup form of an email: trimmed and lower-cased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Password policy shared by creation, reset and offline hashing.
pub fn validate_password(password: &str) -> Result<(), AdminError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AdminError::Validation(format!("password too short (>={MIN_PASSWORD_LEN})")));
    }
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(AdminError::Validation(format!("password too long (<={MAX_PASSWORD_BYTES} bytes)")));
    }
    Ok(())
}

/// Profile attributes supplied at creation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileInput {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: Option<String>,
}

/// Creation input
#[derive(Clone, Serialize, Deserialize)]
pub struct CreateAdminInput {
    pub email: String,
    pub password: String,
    #[serde(flatten)]
    pub profile: ProfileInput,
}

/// Login input
#[derive(Clone, Serialize, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Stored admin row (includes the hash; never leaves the service layer).
#[derive(Clone, PartialEq)]
pub struct AdminAccount {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address: Option<String>,
    /// Tri-state as stored; only `Some(true)` may log in.
    pub is_active: Option<bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AdminAccount {
    pub fn is_login_eligible(&self) -> bool {
        self.is_active == Some(true)
    }

    pub fn profile(&self) -> AdminProfile {
        AdminProfile {
            id: self.id,
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            phone: self.phone.clone(),
            address: self.address.clone(),
            is_active: self.is_login_eligible(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    pub fn status(&self) -> AdminStatus {
        AdminStatus {
            email: self.email.clone(),
            is_active: self.is_active,
            has_password_hash: !self.password_hash.trim().is_empty(),
            login_eligible: self.is_login_eligible(),
        }
    }
}

impl std::fmt::Debug for AdminAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminAccount")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("is_active", &self.is_active)
            .field("updated_at", &self.updated_at)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for CreateAdminInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateAdminInput")
            .field("email", &self.email)
            .field("profile", &self.profile)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for LoginInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginInput").field("email", &self.email).finish_non_exhaustive()
    }
}

/// Public view of an admin (business view, no hash)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminProfile {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Login-eligibility diagnostics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminStatus {
    pub email: String,
    pub is_active: Option<bool>,
    pub has_password_hash: bool,
    pub login_eligible: bool,
}

/// Row to insert (hashed, normalized)
#[derive(Debug, Clone)]
pub struct NewAdmin {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address: Option<String>,
}

/// Columns to overwrite on an existing row; `None` leaves a column as is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdminChanges {
    pub password_hash: Option<String>,
    pub is_active: Option<bool>,
}
