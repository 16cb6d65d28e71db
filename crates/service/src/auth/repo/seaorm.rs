use sea_orm::DatabaseConnection;

use models::admin::{self, AdminPatch, NewAdminRow};

use crate::auth::domain::{AdminAccount, AdminChanges, NewAdmin};
use crate::auth::errors::AdminError;
use crate::auth::repository::AdminRepository;

/// Direct PostgreSQL backend over the `admin` entity.
pub struct SeaOrmAdminRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmAdminRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn to_domain(m: admin::Model) -> AdminAccount {
    AdminAccount {
        id: m.id,
        email: m.email,
        password_hash: m.password_hash,
        first_name: m.first_name,
        last_name: m.last_name,
        phone: m.phone,
        address: m.address,
        is_active: m.is_active,
        created_at: m.created_at.into(),
        updated_at: m.updated_at.into(),
    }
}

#[async_trait::async_trait]
impl AdminRepository for SeaOrmAdminRepository {
    async fn insert(&self, a: NewAdmin) -> Result<AdminAccount, AdminError> {
        let row = NewAdminRow {
            email: a.email,
            password_hash: a.password_hash,
            first_name: a.first_name,
            last_name: a.last_name,
            phone: a.phone,
            address: a.address,
        };
        Ok(to_domain(admin::insert(&self.db, row).await?))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<AdminAccount>, AdminError> {
        Ok(admin::find_by_email(&self.db, email).await?.map(to_domain))
    }

    async fn update_by_email(&self, email: &str, changes: AdminChanges) -> Result<Option<AdminAccount>, AdminError> {
        let patch = AdminPatch { password_hash: changes.password_hash, is_active: changes.is_active };
        Ok(admin::update_by_email(&self.db, email, patch).await?.map(to_domain))
    }

    async fn list(&self) -> Result<Vec<AdminAccount>, AdminError> {
        Ok(admin::list_recent(&self.db).await?.into_iter().map(to_domain).collect())
    }

    async fn ping(&self) -> Result<(), AdminError> {
        models::db::test_connection(&self.db).await?;
        // also proves the table exists
        admin::find_by_email(&self.db, "").await?;
        Ok(())
    }
}
