use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{debug, info, instrument, warn};

use super::domain::{
    normalize_email, validate_password, AdminChanges, AdminProfile, AdminStatus, CreateAdminInput, LoginInput,
    NewAdmin, MAX_PASSWORD_BYTES,
};
use super::errors::AdminError;
use super::hasher::PasswordHasher;
use super::repository::AdminRepository;

/// Admin credential service independent of web framework and store backend.
///
/// Holds one store handle for the life of the process; every operation is a
/// plain request/response call against it with no implicit retries.
pub struct AdminService<R: AdminRepository + ?Sized> {
    repo: Arc<R>,
    hasher: PasswordHasher,
    // Verified against when the email is unknown so both failure paths pay for a bcrypt round.
    decoy_hash: OnceCell<String>,
}

fn validate_email(email: &str) -> Result<(), AdminError> {
    if email.is_empty() {
        return Err(AdminError::Validation("email required".into()));
    }
    if !email.contains('@') {
        return Err(AdminError::Validation("invalid email".into()));
    }
    Ok(())
}

impl<R: AdminRepository + ?Sized> AdminService<R> {
    pub fn new(repo: Arc<R>, hasher: PasswordHasher) -> Self {
        Self { repo, hasher, decoy_hash: OnceCell::new() }
    }

    pub fn hasher(&self) -> &PasswordHasher {
        &self.hasher
    }

    /// Create a new, active admin with a hashed password.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::AdminService, hasher::PasswordHasher, repository::mock::MockAdminRepository};
    /// use service::auth::domain::{CreateAdminInput, ProfileInput};
    /// use std::sync::Arc;
    /// let svc = AdminService::new(Arc::new(MockAdminRepository::default()), PasswordHasher::default());
    /// let input = CreateAdminInput {
    ///     email: " Admin@Example.com ".into(),
    ///     password: "Secret1".into(),
    ///     profile: ProfileInput { first_name: "A".into(), last_name: "B".into(), ..Default::default() },
    /// };
    /// let admin = tokio_test::block_on(svc.create(input)).unwrap();
    /// assert_eq!(admin.email, "admin@example.com");
    /// assert!(admin.is_active);
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn create(&self, input: CreateAdminInput) -> Result<AdminProfile, AdminError> {
        let email = normalize_email(&input.email);
        validate_email(&email)?;
        validate_password(&input.password)?;

        let password_hash = self.hasher.hash(&input.password).await?;
        let address = input.profile.address.map(|a| a.trim().to_string()).filter(|a| !a.is_empty());
        let new = NewAdmin {
            email,
            password_hash,
            first_name: input.profile.first_name.trim().to_string(),
            last_name: input.profile.last_name.trim().to_string(),
            phone: input.profile.phone.trim().to_string(),
            address,
        };

        let created = self.repo.insert(new).await.inspect_err(|e| {
            if matches!(e, AdminError::DuplicateEmail) {
                debug!("admin email already taken");
            }
        })?;
        info!(admin_id = %created.id, email = %created.email, "admin_created");
        Ok(created.profile())
    }

    /// Check an email/password pair and return the public profile.
    ///
    /// The active flag is checked before the password, so a deactivated admin
    /// is refused even with the right password.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::AdminService, hasher::PasswordHasher, repository::mock::MockAdminRepository};
    /// use service::auth::domain::{CreateAdminInput, LoginInput, ProfileInput};
    /// use std::sync::Arc;
    /// let svc = AdminService::new(Arc::new(MockAdminRepository::default()), PasswordHasher::default());
    /// let profile = ProfileInput { first_name: "A".into(), last_name: "B".into(), ..Default::default() };
    /// let _ = tokio_test::block_on(svc.create(CreateAdminInput { email: "u@e.com".into(), password: "Passw0rd".into(), profile }));
    /// let me = tokio_test::block_on(svc.authenticate(LoginInput { email: "U@E.com".into(), password: "Passw0rd".into() })).unwrap();
    /// assert_eq!(me.first_name, "A");
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn authenticate(&self, input: LoginInput) -> Result<AdminProfile, AdminError> {
        let email = normalize_email(&input.email);
        let Some(account) = self.repo.find_by_email(&email).await? else {
            self.burn_decoy(&input.password).await;
            debug!("login for unknown admin");
            return Err(AdminError::NotFound);
        };

        if !account.is_login_eligible() {
            info!(admin_id = %account.id, is_active = ?account.is_active, "login refused: inactive");
            return Err(AdminError::InactiveAccount);
        }

        if input.password.len() > MAX_PASSWORD_BYTES {
            // no stored password is this long; bcrypt would compare only the first 72 bytes
            self.burn_decoy(&input.password).await;
            info!(admin_id = %account.id, "login refused: bad password");
            return Err(AdminError::InvalidCredentials);
        }

        if !self.hasher.verify(&input.password, &account.password_hash).await? {
            info!(admin_id = %account.id, "login refused: bad password");
            return Err(AdminError::InvalidCredentials);
        }

        info!(admin_id = %account.id, "admin_logged_in");
        Ok(account.profile())
    }

    /// Replace the stored hash. Unknown emails are an error, never a silent no-op.
    #[instrument(skip(self, new_password))]
    pub async fn reset_password(&self, email: &str, new_password: &str) -> Result<AdminProfile, AdminError> {
        let email = normalize_email(email);
        validate_password(new_password)?;
        let password_hash = self.hasher.hash(new_password).await?;
        let changes = AdminChanges { password_hash: Some(password_hash), ..Default::default() };
        let updated = self.repo.update_by_email(&email, changes).await?.ok_or(AdminError::NotFound)?;
        info!(admin_id = %updated.id, "admin_password_reset");
        Ok(updated.profile())
    }

    /// Set the login gate. Setting the current value is a successful no-op.
    #[instrument(skip(self))]
    pub async fn set_active(&self, email: &str, active: bool) -> Result<AdminProfile, AdminError> {
        let email = normalize_email(email);
        let current = self.repo.find_by_email(&email).await?.ok_or(AdminError::NotFound)?;
        if current.is_active == Some(active) {
            debug!(admin_id = %current.id, active, "active flag unchanged");
            return Ok(current.profile());
        }
        let changes = AdminChanges { is_active: Some(active), ..Default::default() };
        let updated = self.repo.update_by_email(&email, changes).await?.ok_or(AdminError::NotFound)?;
        info!(admin_id = %updated.id, from = ?current.is_active, to = active, "admin_active_changed");
        Ok(updated.profile())
    }

    /// Login-eligibility diagnostics for one admin.
    #[instrument(skip(self))]
    pub async fn status(&self, email: &str) -> Result<AdminStatus, AdminError> {
        let email = normalize_email(email);
        let account = self.repo.find_by_email(&email).await?.ok_or(AdminError::NotFound)?;
        Ok(account.status())
    }

    /// All admins, newest first.
    pub async fn list(&self) -> Result<Vec<AdminProfile>, AdminError> {
        let all = self.repo.list().await?;
        Ok(all.iter().map(|a| a.profile()).collect())
    }

    /// Confirm the store is reachable.
    pub async fn check_store(&self) -> Result<(), AdminError> {
        self.repo.ping().await
    }

    async fn burn_decoy(&self, password: &str) {
        let decoy = self.decoy_hash.get_or_try_init(|| self.hasher.hash("decoy-password")).await;
        match decoy {
            Ok(hash) => {
                let _ = self.hasher.verify(password, hash).await;
            }
            Err(e) => warn!(error = %e, "decoy hash unavailable"),
        }
    }
}
