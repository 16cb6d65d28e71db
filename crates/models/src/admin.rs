use chrono::Utc;
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::Expr;
use sea_orm::{DatabaseConnection, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "admin")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address: Option<String>,
    pub is_active: Option<bool>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Column values for a new admin row. Email is expected to be normalized already.
#[derive(Debug, Clone)]
pub struct NewAdminRow {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address: Option<String>,
}

/// Partial update applied by email; `None` leaves a column untouched.
#[derive(Debug, Clone, Default)]
pub struct AdminPatch {
    pub password_hash: Option<String>,
    pub is_active: Option<bool>,
}

impl AdminPatch {
    pub fn is_empty(&self) -> bool {
        self.password_hash.is_none() && self.is_active.is_none()
    }
}

pub async fn insert(db: &DatabaseConnection, row: NewAdminRow) -> Result<Model, ModelError> {
    if row.email.trim().is_empty() { return Err(ModelError::Validation("email required".into())); }
    if row.password_hash.trim().is_empty() { return Err(ModelError::Validation("password hash required".into())); }
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(row.email),
        password_hash: Set(row.password_hash),
        first_name: Set(row.first_name),
        last_name: Set(row.last_name),
        phone: Set(row.phone),
        address: Set(row.address),
        is_active: Set(Some(true)),
        created_at: Set(now),
        updated_at: Set(now),
    };
    Ok(am.insert(db).await?)
}

pub async fn find_by_email(db: &DatabaseConnection, email: &str) -> Result<Option<Model>, ModelError> {
    Ok(Entity::find().filter(Column::Email.eq(email)).one(db).await?)
}

/// Apply `patch` to the row matching `email`, refreshing `updated_at`.
/// Returns `None` when no row matched.
pub async fn update_by_email(db: &DatabaseConnection, email: &str, patch: AdminPatch) -> Result<Option<Model>, ModelError> {
    if patch.is_empty() {
        return find_by_email(db, email).await;
    }
    if matches!(&patch.password_hash, Some(h) if h.trim().is_empty()) {
        return Err(ModelError::Validation("password hash required".into()));
    }
    let now: DateTimeWithTimeZone = Utc::now().into();
    let mut update = Entity::update_many()
        .col_expr(Column::UpdatedAt, Expr::value(now))
        .filter(Column::Email.eq(email));
    if let Some(hash) = patch.password_hash {
        update = update.col_expr(Column::PasswordHash, Expr::value(hash));
    }
    if let Some(active) = patch.is_active {
        update = update.col_expr(Column::IsActive, Expr::value(active));
    }
    let mut rows = update.exec_with_returning(db).await?;
    Ok(rows.pop())
}

/// All admins, newest first.
pub async fn list_recent(db: &DatabaseConnection) -> Result<Vec<Model>, ModelError> {
    Ok(Entity::find().order_by_desc(Column::CreatedAt).all(db).await?)
}
