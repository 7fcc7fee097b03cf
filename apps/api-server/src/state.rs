//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::ports::{
    CategoryRepository, IdentityProvider, PasswordService, PostRepository, TokenService,
    UserRepository,
};
use quill_core::services::{
    AuthGateway, CategoryService, CredentialStore, FederatedIdentityBridge, PostService,
};
use quill_infra::{
    Argon2PasswordService, GoogleOAuthClient, InMemoryCategoryRepository, InMemoryPostRepository,
    InMemoryUserRepository, JwtTokenService,
};

use crate::config::AppConfig;

/// The three stores every service is built from.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub posts: Arc<dyn PostRepository>,
}

impl Repositories {
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            categories: Arc::new(InMemoryCategoryRepository::new()),
            posts: Arc::new(InMemoryPostRepository::new()),
        }
    }

    #[cfg(feature = "postgres")]
    async fn postgres(config: &quill_infra::DatabaseConfig) -> std::io::Result<Self> {
        use quill_infra::{PostgresCategoryRepository, PostgresPostRepository, PostgresUserRepository};

        let db = quill_infra::database::connect(config)
            .await
            .map_err(|e| std::io::Error::other(format!("database connection failed: {e}")))?;

        Ok(Self {
            users: Arc::new(PostgresUserRepository::new(db.clone())),
            categories: Arc::new(PostgresCategoryRepository::new(db.clone())),
            posts: Arc::new(PostgresPostRepository::new(db)),
        })
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub credentials: Arc<CredentialStore>,
    pub gateway: Arc<AuthGateway>,
    pub federation: Arc<FederatedIdentityBridge>,
    pub posts: Arc<PostService>,
    pub categories: Arc<CategoryService>,
    /// Present only when Google login is configured.
    pub identity_provider: Option<Arc<dyn IdentityProvider>>,
    pub client_url: String,
    pub environment: String,
}

impl AppState {
    /// Build the application state from configuration.
    pub async fn new(config: &AppConfig) -> std::io::Result<Self> {
        let repositories = Self::repositories(config).await?;

        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(config.jwt.clone()));
        let identity_provider = config.google.clone().map(|google| {
            tracing::info!("Google login enabled");
            Arc::new(GoogleOAuthClient::new(google, &config.jwt.secret)) as Arc<dyn IdentityProvider>
        });

        let state = Self::assemble(
            repositories,
            Arc::new(Argon2PasswordService::new()),
            tokens,
            identity_provider,
            config.client_url.clone(),
            config.environment.clone(),
        );

        tracing::info!("Application state initialized");
        Ok(state)
    }

    #[cfg(feature = "postgres")]
    async fn repositories(config: &AppConfig) -> std::io::Result<Repositories> {
        match &config.database {
            Some(database) => Repositories::postgres(database).await,
            None => {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
                Ok(Repositories::in_memory())
            }
        }
    }

    #[cfg(not(feature = "postgres"))]
    async fn repositories(_config: &AppConfig) -> std::io::Result<Repositories> {
        tracing::info!("Running without postgres feature - using in-memory repositories");
        Ok(Repositories::in_memory())
    }

    /// Wire the domain services over the given ports.
    pub fn assemble(
        repositories: Repositories,
        passwords: Arc<dyn PasswordService>,
        tokens: Arc<dyn TokenService>,
        identity_provider: Option<Arc<dyn IdentityProvider>>,
        client_url: String,
        environment: String,
    ) -> Self {
        let Repositories {
            users,
            categories,
            posts,
        } = repositories;

        Self {
            credentials: Arc::new(CredentialStore::new(users.clone(), passwords.clone())),
            gateway: Arc::new(AuthGateway::new(tokens, users.clone())),
            federation: Arc::new(FederatedIdentityBridge::new(users.clone(), passwords)),
            posts: Arc::new(PostService::new(posts, users, categories.clone())),
            categories: Arc::new(CategoryService::new(categories)),
            identity_provider,
            client_url,
            environment,
        }
    }
}
