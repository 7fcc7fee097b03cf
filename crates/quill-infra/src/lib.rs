//! # Quill Infrastructure
//!
//! Concrete implementations of the ports defined in `quill-core`.
//!
//! ## Feature Flags
//!
//! - `postgres` (default) - PostgreSQL repositories via SeaORM
//!
//! Without `postgres` only the in-memory repositories are available.

pub mod auth;
pub mod database;
pub mod memory;

pub use auth::{
    Argon2PasswordService, GoogleConfig, GoogleOAuthClient, JwtConfig, JwtTokenService,
};
pub use database::DatabaseConfig;
pub use memory::{InMemoryCategoryRepository, InMemoryPostRepository, InMemoryUserRepository};

#[cfg(feature = "postgres")]
pub use database::{
    PostgresCategoryRepository, PostgresPostRepository, PostgresUserRepository,
};
