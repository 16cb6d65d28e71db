use thiserror::Error;

/// Business errors for admin credential workflows
#[derive(Debug, Error)]
pub enum AdminError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("an admin with this email already exists")]
    DuplicateEmail,
    #[error("admin not found")]
    NotFound,
    #[error("admin account is inactive")]
    InactiveAccount,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("repository error: {0}")]
    Repository(String),
    #[error("hashing error: {0}")]
    Hash(String),
}

impl AdminError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            AdminError::Validation(_) => 1001,
            AdminError::DuplicateEmail => 1002,
            AdminError::NotFound => 1003,
            AdminError::InvalidCredentials => 1004,
            AdminError::InactiveAccount => 1005,
            AdminError::Hash(_) => 1101,
            AdminError::Repository(_) => 1200,
            AdminError::StoreUnavailable(_) => 1201,
        }
    }

    /// Failures that outer surfaces must present identically (no user enumeration).
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, AdminError::NotFound | AdminError::InvalidCredentials)
    }

    /// Transient store failures a caller may retry with backoff.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AdminError::StoreUnavailable(_))
    }
}

impl From<models::errors::ModelError> for AdminError {
    fn from(e: models::errors::ModelError) -> Self {
        use models::errors::ModelError;
        match e {
            ModelError::Validation(msg) => AdminError::Validation(msg),
            ModelError::UniqueViolation(_) => AdminError::DuplicateEmail,
            ModelError::Unavailable(msg) => AdminError::StoreUnavailable(msg),
            ModelError::Db(msg) => AdminError::Repository(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::errors::ModelError;

    #[test]
    fn codes_are_distinct() {
        let all = [
            AdminError::Validation(String::new()),
            AdminError::DuplicateEmail,
            AdminError::NotFound,
            AdminError::InactiveAccount,
            AdminError::InvalidCredentials,
            AdminError::StoreUnavailable(String::new()),
            AdminError::Repository(String::new()),
            AdminError::Hash(String::new()),
        ];
        let mut codes: Vec<u16> = all.iter().map(AdminError::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), all.len());
    }

    #[test]
    fn model_errors_keep_their_kind() {
        assert!(matches!(AdminError::from(ModelError::UniqueViolation("admin_email_key".into())), AdminError::DuplicateEmail));
        assert!(AdminError::from(ModelError::Unavailable("refused".into())).is_retryable());
        assert!(matches!(AdminError::from(ModelError::Db("boom".into())), AdminError::Repository(_)));
    }

    #[test]
    fn enumeration_safe_grouping() {
        assert!(AdminError::NotFound.is_auth_failure());
        assert!(AdminError::InvalidCredentials.is_auth_failure());
        assert!(!AdminError::InactiveAccount.is_auth_failure());
    }
}
