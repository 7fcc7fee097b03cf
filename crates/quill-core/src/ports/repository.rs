use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Category, Comment, Post, User};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Insert a new entity. Unique-key clashes fail with `RepoError::Constraint`.
    async fn insert(&self, entity: T) -> Result<T, RepoError>;

    /// Overwrite an existing entity. Fails with `RepoError::NotFound` if absent.
    async fn update(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by their (normalized) email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, RepoError>;
}

/// Category repository.
#[async_trait]
pub trait CategoryRepository: BaseRepository<Category, Uuid> {
    /// All categories, sorted by name.
    async fn list(&self) -> Result<Vec<Category>, RepoError>;

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Category>, RepoError>;
}

/// Filter and pagination for post listings.
#[derive(Debug, Clone)]
pub struct PostQuery {
    pub category: Option<Uuid>,
    pub search: Option<String>,
    /// 1-based.
    pub page: u64,
    pub limit: u64,
}

impl PostQuery {
    pub const DEFAULT_LIMIT: u64 = 10;
    pub const MAX_LIMIT: u64 = 100;
    /// Keeps `offset()` within a signed 64-bit SQL OFFSET for any limit.
    pub const MAX_PAGE: u64 = i64::MAX as u64 / Self::MAX_LIMIT;

    /// Build a query, applying defaults and clamping paging to sane bounds.
    pub fn new(
        page: Option<u64>,
        limit: Option<u64>,
        category: Option<Uuid>,
        search: Option<String>,
    ) -> Self {
        Self {
            category,
            search: search
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            page: page.unwrap_or(1).clamp(1, Self::MAX_PAGE),
            limit: limit
                .unwrap_or(Self::DEFAULT_LIMIT)
                .clamp(1, Self::MAX_LIMIT),
        }
    }

    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.limit)
    }

    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

/// One page of results plus the unpaginated total.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

/// Post repository.
///
/// `update` writes the editable fields only; the view counter and the
/// comment list change exclusively through their own atomic operations.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// Newest first, ties broken by id.
    async fn list(&self, query: &PostQuery) -> Result<Page<Post>, RepoError>;

    /// Atomically bump the view counter and return the updated post.
    async fn increment_views(&self, id: Uuid) -> Result<Option<Post>, RepoError>;

    /// Append a comment. Fails with `RepoError::NotFound` if the post is gone.
    async fn add_comment(&self, post_id: Uuid, comment: Comment) -> Result<Comment, RepoError>;

    /// Remove a comment. Fails with `RepoError::NotFound` if it does not exist.
    async fn delete_comment(&self, post_id: Uuid, comment_id: Uuid) -> Result<(), RepoError>;
}
