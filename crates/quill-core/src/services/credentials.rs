//! Credential store - account creation and password checks.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{EMAIL_MAX_LEN, NAME_MAX_LEN, Role, User, mask_email, normalize_email};
use crate::error::{DomainError, RepoError};
use crate::ports::{AuthError, BaseRepository, PasswordService, UserRepository};

pub const MIN_PASSWORD_LEN: usize = 6;

const DUPLICATE_EMAIL: &str = "User already exists with this email";

pub struct CredentialStore {
    users: Arc<dyn UserRepository>,
    passwords: Arc<dyn PasswordService>,
}

impl CredentialStore {
    pub fn new(users: Arc<dyn UserRepository>, passwords: Arc<dyn PasswordService>) -> Self {
        Self { users, passwords }
    }

    /// Register a new account. The password is hashed before it is stored.
    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: Option<Role>,
    ) -> Result<User, DomainError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("Please provide a name"));
        }
        if name.chars().count() > NAME_MAX_LEN {
            return Err(DomainError::Validation(format!(
                "Name cannot be more than {NAME_MAX_LEN} characters"
            )));
        }
        let email = normalize_email(email);
        if email.chars().count() > EMAIL_MAX_LEN || !is_plausible_email(&email) {
            return Err(DomainError::validation("Please provide a valid email"));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(DomainError::Validation(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(DomainError::Duplicate(DUPLICATE_EMAIL.to_string()));
        }

        let password_hash = self.passwords.hash(password).await?;
        let user = User::new(name.to_string(), &email, password_hash)
            .with_role(role.unwrap_or_default());

        // The unique index still decides when two registrations interleave.
        let user = self.users.insert(user).await.map_err(|e| match e {
            RepoError::Constraint(_) => DomainError::Duplicate(DUPLICATE_EMAIL.to_string()),
            other => other.into(),
        })?;

        tracing::info!(user_id = %user.id, email = %mask_email(&user.email), "User registered");
        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        Ok(self.users.find_by_email(&normalize_email(email)).await?)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        Ok(self.users.find_by_id(id).await?)
    }

    pub async fn verify_password(&self, user: &User, password: &str) -> Result<bool, DomainError> {
        Ok(self.passwords.verify(password, &user.password_hash).await?)
    }

    /// Check an email/password pair.
    ///
    /// Unknown email and wrong password fail identically.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, DomainError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(DomainError::validation("Please provide email and password"));
        }

        let Some(user) = self.find_by_email(email).await? else {
            tracing::debug!(email = %mask_email(email), "Login for unknown email");
            return Err(AuthError::InvalidCredentials.into());
        };

        if !self.verify_password(&user, password).await? {
            tracing::debug!(user_id = %user.id, "Login with wrong password");
            return Err(AuthError::InvalidCredentials.into());
        }

        Ok(user)
    }
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.contains('@'),
        None => false,
    }
}
