//! Store backends implementing [`AdminRepository`](super::repository::AdminRepository).

pub mod rest;
pub mod seaorm;

use std::sync::Arc;

use configs::{AppConfig, StoreBackend};
use tracing::info;

use super::errors::AdminError;
use super::repository::AdminRepository;

/// Open the configured store once; the handle is shared for the life of the process.
pub async fn connect(cfg: &AppConfig) -> Result<Arc<dyn AdminRepository>, AdminError> {
    match cfg.store.backend {
        StoreBackend::Rest => {
            let repo = rest::RestAdminRepository::new(&cfg.supabase)?;
            info!(backend = "rest", table = %cfg.supabase.table, "admin store ready");
            Ok(Arc::new(repo))
        }
        StoreBackend::Postgres => {
            let db = models::db::connect_with_config(&cfg.database).await?;
            info!(backend = "postgres", "admin store ready");
            Ok(Arc::new(seaorm::SeaOrmAdminRepository::new(db)))
        }
    }
}
