//! # Quill Shared
//!
//! Wire types shared by the server and any Rust client: request DTOs and
//! the JSON response envelope.

pub mod dto;
pub mod response;

pub use response::{ApiResponse, Empty, ErrorResponse};
