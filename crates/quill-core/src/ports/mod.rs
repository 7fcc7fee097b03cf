//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod repository;

pub use auth::{
    AuthError, ExternalProfile, IdentityProvider, PasswordService, TokenClaims, TokenService,
};
pub use repository::{
    BaseRepository, CategoryRepository, Page, PostQuery, PostRepository, UserRepository,
};
