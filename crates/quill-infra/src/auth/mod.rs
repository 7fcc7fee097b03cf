//! Authentication implementations.

mod google;
mod jwt;
mod password;

pub use google::{GoogleConfig, GoogleOAuthClient};
pub use jwt::{JwtConfig, JwtTokenService};
pub use password::Argon2PasswordService;
