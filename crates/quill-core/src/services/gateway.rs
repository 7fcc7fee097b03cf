//! Auth gateway - turns a bearer header into a live user record.

use std::sync::Arc;

use crate::domain::User;
use crate::error::DomainError;
use crate::ports::{AuthError, BaseRepository, TokenService, UserRepository};

pub struct AuthGateway {
    tokens: Arc<dyn TokenService>,
    users: Arc<dyn UserRepository>,
}

impl AuthGateway {
    pub fn new(tokens: Arc<dyn TokenService>, users: Arc<dyn UserRepository>) -> Self {
        Self { tokens, users }
    }

    /// Pull the token out of an `Authorization: Bearer <token>` value.
    pub fn bearer_token(authorization: Option<&str>) -> Result<&str, AuthError> {
        let value = authorization.ok_or(AuthError::MissingAuth)?;
        match value.strip_prefix("Bearer ").map(str::trim) {
            Some(token) if !token.is_empty() => Ok(token),
            _ => Err(AuthError::MissingAuth),
        }
    }

    /// Verify the token and load the account it names.
    ///
    /// A valid token for an account that no longer exists is rejected.
    pub async fn authenticate(&self, authorization: Option<&str>) -> Result<User, DomainError> {
        let token = Self::bearer_token(authorization)?;

        let claims = self.tokens.validate_token(token).map_err(|e| {
            tracing::debug!(error = %e, "Bearer token rejected");
            DomainError::from(e)
        })?;

        match self.users.find_by_id(claims.user_id).await? {
            Some(user) => Ok(user),
            None => {
                tracing::warn!(user_id = %claims.user_id, "Token refers to a missing account");
                Err(DomainError::Unauthenticated(
                    "Not authorized, user not found".to_string(),
                ))
            }
        }
    }

    /// Issue a fresh token for `user`.
    pub fn issue(&self, user: &User) -> Result<String, DomainError> {
        Ok(self.tokens.generate_token(user.id)?)
    }

    pub fn expiration_seconds(&self) -> i64 {
        self.tokens.expiration_seconds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token_extraction() {
        assert_eq!(AuthGateway::bearer_token(Some("Bearer abc")).unwrap(), "abc");
        assert!(matches!(
            AuthGateway::bearer_token(None),
            Err(AuthError::MissingAuth)
        ));
        assert!(AuthGateway::bearer_token(Some("Basic abc")).is_err());
        assert!(AuthGateway::bearer_token(Some("Bearer   ")).is_err());
    }
}
