use async_trait::async_trait;

use super::domain::{AdminAccount, AdminChanges, NewAdmin};
use super::errors::AdminError;

/// Repository abstraction over the admin table.
///
/// Implementations must report a uniqueness violation on insert as
/// [`AdminError::DuplicateEmail`] and connectivity failures as
/// [`AdminError::StoreUnavailable`]. Emails passed in are already normalized.
#[async_trait]
pub trait AdminRepository: Send + Sync {
    async fn insert(&self, admin: NewAdmin) -> Result<AdminAccount, AdminError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<AdminAccount>, AdminError>;
    /// Overwrite columns on the row matching `email` and refresh `updated_at`.
    /// `Ok(None)` means no row matched.
    async fn update_by_email(&self, email: &str, changes: AdminChanges) -> Result<Option<AdminAccount>, AdminError>;
    /// All admins, newest first.
    async fn list(&self) -> Result<Vec<AdminAccount>, AdminError>;
    /// Cheap read proving the store and table are reachable.
    async fn ping(&self) -> Result<(), AdminError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Mutex, MutexGuard};
    use uuid::Uuid;

    #[derive(Default)]
    pub struct MockAdminRepository {
        rows: Mutex<HashMap<String, AdminAccount>>, // key: email (unique constraint)
        writes: AtomicUsize,
        unavailable: AtomicBool,
    }

    impl MockAdminRepository {
        fn rows(&self) -> MutexGuard<'_, HashMap<String, AdminAccount>> {
            self.rows.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
        }

        fn check_up(&self) -> Result<(), AdminError> {
            if self.unavailable.load(Ordering::SeqCst) {
                return Err(AdminError::StoreUnavailable("mock store offline".into()));
            }
            Ok(())
        }

        /// Simulate an outage: every call fails with `StoreUnavailable` while set.
        pub fn set_unavailable(&self, down: bool) {
            self.unavailable.store(down, Ordering::SeqCst);
        }

        /// Number of successful inserts and updates.
        pub fn write_count(&self) -> usize {
            self.writes.load(Ordering::SeqCst)
        }

        pub fn len(&self) -> usize {
            self.rows().len()
        }

        pub fn is_empty(&self) -> bool {
            self.rows().is_empty()
        }

        /// Overwrite the raw active flag, bypassing the service (legacy `NULL` rows).
        pub fn force_active_flag(&self, email: &str, flag: Option<bool>) {
            if let Some(row) = self.rows().get_mut(email) {
                row.is_active = flag;
            }
        }

        /// Overwrite the raw stored hash, bypassing the service.
        pub fn force_password_hash(&self, email: &str, hash: &str) {
            if let Some(row) = self.rows().get_mut(email) {
                row.password_hash = hash.to_string();
            }
        }
    }

    #[async_trait]
    impl AdminRepository for MockAdminRepository {
        async fn insert(&self, admin: NewAdmin) -> Result<AdminAccount, AdminError> {
            self.check_up()?;
            if admin.password_hash.trim().is_empty() {
                return Err(AdminError::Validation("password hash required".into()));
            }
            let mut rows = self.rows();
            if rows.contains_key(&admin.email) {
                return Err(AdminError::DuplicateEmail);
            }
            let now = Utc::now();
            let row = AdminAccount {
                id: Uuid::new_v4(),
                email: admin.email.clone(),
                password_hash: admin.password_hash,
                first_name: admin.first_name,
                last_name: admin.last_name,
                phone: admin.phone,
                address: admin.address,
                is_active: Some(true),
                created_at: now,
                updated_at: now,
            };
            rows.insert(admin.email, row.clone());
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(row)
        }

        async fn find_by_email(&self, email: &str) -> Result<Option<AdminAccount>, AdminError> {
            self.check_up()?;
            Ok(self.rows().get(email).cloned())
        }

        async fn update_by_email(&self, email: &str, changes: AdminChanges) -> Result<Option<AdminAccount>, AdminError> {
            self.check_up()?;
            if matches!(&changes.password_hash, Some(h) if h.trim().is_empty()) {
                return Err(AdminError::Validation("password hash required".into()));
            }
            let mut rows = self.rows();
            let Some(row) = rows.get_mut(email) else { return Ok(None) };
            if let Some(hash) = changes.password_hash {
                row.password_hash = hash;
            }
            if let Some(active) = changes.is_active {
                row.is_active = Some(active);
            }
            row.updated_at = Utc::now();
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(Some(row.clone()))
        }

        async fn list(&self) -> Result<Vec<AdminAccount>, AdminError> {
            self.check_up()?;
            let mut all: Vec<AdminAccount> = self.rows().values().cloned().collect();
            all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(all)
        }

        async fn ping(&self) -> Result<(), AdminError> {
            self.check_up()
        }
    }
}
