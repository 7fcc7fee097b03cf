//! # Quill Core
//!
//! The domain layer of the Quill blog backend: entities, ports and the
//! services that enforce authentication and content-ownership rules.
//! This crate has zero infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

pub use error::{DomainError, RepoError};
