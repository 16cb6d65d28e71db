//! Service layer for administrator credentials.
//! - Separates the credential workflow from the store it runs against.
//! - Store backends: Supabase REST, direct Postgres (via `models`), and an in-memory mock.
//! - Provides clear error types and documented interfaces.

pub mod auth;

pub use auth::{AdminError, AdminService, PasswordHasher};
