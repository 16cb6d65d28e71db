use tracing::warn;

use super::errors::AdminError;

/// bcrypt wrapper with a fixed work factor.
///
/// Hashing and verification run on tokio's blocking pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self { cost: configs::MIN_BCRYPT_COST }
    }
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Result<Self, AdminError> {
        if !(configs::MIN_BCRYPT_COST..=configs::MAX_BCRYPT_COST).contains(&cost) {
            return Err(AdminError::Validation(format!(
                "bcrypt cost must be in {}..={}, got {cost}",
                configs::MIN_BCRYPT_COST,
                configs::MAX_BCRYPT_COST
            )));
        }
        Ok(Self { cost })
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub async fn hash(&self, plaintext: &str) -> Result<String, AdminError> {
        let plaintext = plaintext.to_owned();
        let cost = self.cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(plaintext, cost))
            .await
            .map_err(|e| AdminError::Hash(e.to_string()))?
            .map_err(|e| AdminError::Hash(e.to_string()))
    }

    /// Compare `plaintext` against a stored digest. A malformed digest never matches.
    pub async fn verify(&self, plaintext: &str, digest: &str) -> Result<bool, AdminError> {
        let plaintext = plaintext.to_owned();
        let digest = digest.to_owned();
        let res = tokio::task::spawn_blocking(move || bcrypt::verify(plaintext, &digest))
            .await
            .map_err(|e| AdminError::Hash(e.to_string()))?;
        match res {
            Ok(matched) => Ok(matched),
            Err(e) => {
                warn!(error = %e, "stored password hash is not a valid bcrypt digest");
                Ok(false)
            }
        }
    }
}
