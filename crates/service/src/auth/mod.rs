//! Auth module: three-layer architecture (domain, repository, service).
//!
//! This module centralizes admin creation, login and credential maintenance under the service crate.

pub mod domain;
pub mod errors;
pub mod hasher;
pub mod repository;
pub mod service;
pub mod repo;

pub use errors::AdminError;
pub use hasher::PasswordHasher;
pub use service::AdminService;
