//! Federated identity bridge - maps a provider-asserted identity onto a
//! local account, creating one on first sign-in.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{EMAIL_MAX_LEN, NAME_MAX_LEN, User, mask_email, normalize_email};
use crate::error::{DomainError, RepoError};
use crate::ports::{BaseRepository, ExternalProfile, PasswordService, UserRepository};

pub struct FederatedIdentityBridge {
    users: Arc<dyn UserRepository>,
    passwords: Arc<dyn PasswordService>,
}

impl FederatedIdentityBridge {
    pub fn new(users: Arc<dyn UserRepository>, passwords: Arc<dyn PasswordService>) -> Self {
        Self { users, passwords }
    }

    /// Return the account for `profile.email`, creating it if absent.
    ///
    /// Existing accounts are returned untouched: no name or avatar sync.
    pub async fn resolve_or_create(&self, profile: &ExternalProfile) -> Result<User, DomainError> {
        let email = normalize_email(&profile.email);
        if email.is_empty() {
            return Err(DomainError::validation(
                "Identity provider did not supply an email",
            ));
        }
        if email.chars().count() > EMAIL_MAX_LEN {
            return Err(DomainError::validation(
                "Identity provider email is too long",
            ));
        }

        if let Some(user) = self.users.find_by_email(&email).await? {
            return Ok(user);
        }

        // Never handed out; it only keeps the hash column populated.
        let password_hash = self.passwords.hash(&throwaway_password()).await?;

        let name = match profile.name.trim() {
            "" => email.split('@').next().unwrap_or_default(),
            name => name,
        };
        let name = display_name(name);
        let mut user = User::new(name, &email, password_hash);
        user.avatar = profile.avatar.clone();
        user.google_id = Some(profile.provider_id.clone());

        match self.users.insert(user).await {
            Ok(user) => {
                tracing::info!(
                    user_id = %user.id,
                    email = %mask_email(&user.email),
                    "Created account from federated login"
                );
                Ok(user)
            }
            Err(RepoError::Constraint(_)) => {
                tracing::warn!(
                    email = %mask_email(&email),
                    "Concurrent first federated login, using existing account"
                );
                self.users.find_by_email(&email).await?.ok_or_else(|| {
                    DomainError::Duplicate(
                        "Account is being created, please retry login".to_string(),
                    )
                })
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Provider names are not ours to reject; clip them to fit instead.
fn display_name(name: &str) -> String {
    name.chars().take(NAME_MAX_LEN).collect::<String>().trim_end().to_string()
}

fn throwaway_password() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}
