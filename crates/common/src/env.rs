//! Environment helpers
//!
//! `.env` loading and trimmed lookups shared by the config layer and binaries.

use tracing::debug;

/// Load `.env` from the working directory if present.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => debug!(path = %path.display(), "loaded .env"),
        Err(e) if e.not_found() => {}
        Err(e) => debug!(error = %e, ".env present but unreadable"),
    }
}

/// Read an environment variable, treating unset and blank values alike.
pub fn var_non_empty(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values_are_absent() {
        std::env::set_var("COMMON_ENV_TEST_BLANK", "   ");
        assert_eq!(var_non_empty("COMMON_ENV_TEST_BLANK"), None);
        std::env::set_var("COMMON_ENV_TEST_SET", " value ");
        assert_eq!(var_non_empty("COMMON_ENV_TEST_SET").as_deref(), Some("value"));
    }
}
