use std::cmp::Reverse;
use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use quill_core::domain::{Comment, Post};
use quill_core::error::RepoError;
use quill_core::ports::{BaseRepository, Page, PostQuery, PostRepository};

/// In-memory post store. Comments are held inside their post.
#[derive(Default)]
pub struct InMemoryPostRepository {
    store: RwLock<HashMap<Uuid, Post>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.store.read().await.get(&id).cloned())
    }

    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        let mut store = self.store.write().await;
        if store.contains_key(&post.id) {
            return Err(RepoError::Constraint("posts_pkey".to_string()));
        }
        store.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let mut store = self.store.write().await;
        let stored = store.get_mut(&post.id).ok_or(RepoError::NotFound)?;

        stored.title = post.title;
        stored.content = post.content;
        stored.excerpt = post.excerpt;
        stored.category_id = post.category_id;
        stored.tags = post.tags;
        stored.is_published = post.is_published;
        stored.updated_at = post.updated_at;

        Ok(stored.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.store
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn list(&self, query: &PostQuery) -> Result<Page<Post>, RepoError> {
        let store = self.store.read().await;

        let mut matching: Vec<&Post> = store
            .values()
            .filter(|p| query.category.is_none_or(|c| p.category_id == c))
            .filter(|p| query.search.as_deref().is_none_or(|s| p.matches_search(s)))
            .collect();
        matching.sort_by_key(|p| Reverse((p.created_at, p.id)));

        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(usize::try_from(query.offset()).unwrap_or(usize::MAX))
            .take(query.limit as usize)
            .cloned()
            .collect();

        Ok(Page { items, total })
    }

    async fn increment_views(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let mut store = self.store.write().await;
        Ok(store.get_mut(&id).map(|post| {
            post.view_count += 1;
            post.clone()
        }))
    }

    async fn add_comment(&self, post_id: Uuid, comment: Comment) -> Result<Comment, RepoError> {
        let mut store = self.store.write().await;
        let post = store.get_mut(&post_id).ok_or(RepoError::NotFound)?;
        post.comments.push(comment.clone());
        Ok(comment)
    }

    async fn delete_comment(&self, post_id: Uuid, comment_id: Uuid) -> Result<(), RepoError> {
        let mut store = self.store.write().await;
        let post = store.get_mut(&post_id).ok_or(RepoError::NotFound)?;
        let before = post.comments.len();
        post.comments.retain(|c| c.id != comment_id);
        if post.comments.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}
