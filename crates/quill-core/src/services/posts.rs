//! Posts and their embedded comments.
//!
//! Mutating a post or category needs no ownership: any caller that reaches
//! the route may do it. Comment removal is the one owner-only operation.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::{Category, Comment, EXCERPT_MAX_LEN, Post, TITLE_MAX_LEN, User};
use crate::error::{DomainError, RepoError};
use crate::ports::{
    BaseRepository, CategoryRepository, Page, PostQuery, PostRepository, UserRepository,
};

/// Public projection of a user, as embedded in posts and comments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySummary {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

impl From<&Category> for CategorySummary {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id,
            name: category.name.clone(),
            slug: category.slug.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CommentDetails {
    pub comment: Comment,
    /// `None` when the owning account cannot be resolved.
    pub user: Option<UserSummary>,
}

/// A post with its references resolved for display.
///
/// `post.comments` is emptied; the resolved list lives in `comments`.
#[derive(Debug, Clone)]
pub struct PostDetails {
    pub post: Post,
    pub author: Option<UserSummary>,
    pub category: Option<CategorySummary>,
    pub comments: Vec<CommentDetails>,
}

/// Input for creating a post.
#[derive(Debug, Clone, Default)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub category_id: Uuid,
    /// Used only when the caller is not authenticated.
    pub author_id: Option<Uuid>,
    pub tags: Vec<String>,
    pub is_published: Option<bool>,
}

/// Partial update of a post. An empty excerpt clears it.
#[derive(Debug, Clone, Default)]
pub struct PostPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub category_id: Option<Uuid>,
    pub tags: Option<Vec<String>>,
    pub is_published: Option<bool>,
}

pub struct PostService {
    posts: Arc<dyn PostRepository>,
    users: Arc<dyn UserRepository>,
    categories: Arc<dyn CategoryRepository>,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        users: Arc<dyn UserRepository>,
        categories: Arc<dyn CategoryRepository>,
    ) -> Self {
        Self {
            posts,
            users,
            categories,
        }
    }

    pub async fn list(&self, query: &PostQuery) -> Result<Page<PostDetails>, DomainError> {
        let page = self.posts.list(query).await?;
        Ok(Page {
            items: self.resolve(page.items).await?,
            total: page.total,
        })
    }

    /// Fetch one post and count the read. Not idempotent: every successful
    /// call increments the view counter.
    pub async fn view(&self, id: Uuid) -> Result<PostDetails, DomainError> {
        let post = self
            .posts
            .increment_views(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Post", id))?;
        self.resolve_one(post).await
    }

    /// Attribution goes to `caller` if present, else to the draft's author.
    pub async fn create(
        &self,
        draft: PostDraft,
        caller: Option<&User>,
    ) -> Result<PostDetails, DomainError> {
        let author_id = caller
            .map(|u| u.id)
            .or(draft.author_id)
            .ok_or_else(|| DomainError::validation("Post author is required"))?;

        let title = validate_title(&draft.title)?;
        let content = validate_content(&draft.content)?;
        let excerpt = validate_excerpt(draft.excerpt)?;

        if caller.is_none() && self.users.find_by_id(author_id).await?.is_none() {
            return Err(DomainError::validation("Post author does not exist"));
        }
        self.ensure_category(draft.category_id).await?;

        let mut post = Post::new(author_id, draft.category_id, title, content);
        post.excerpt = excerpt;
        post.tags = clean_tags(draft.tags);
        post.is_published = draft.is_published.unwrap_or(false);

        let post = self.posts.insert(post).await?;
        tracing::info!(post_id = %post.id, author_id = %post.author_id, "Post created");
        self.resolve_one(post).await
    }

    pub async fn update(&self, id: Uuid, patch: PostPatch) -> Result<PostDetails, DomainError> {
        let mut post = self
            .posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Post", id))?;

        if let Some(title) = patch.title {
            post.title = validate_title(&title)?;
        }
        if let Some(content) = patch.content {
            post.content = validate_content(&content)?;
        }
        if let Some(excerpt) = patch.excerpt {
            post.excerpt = validate_excerpt(Some(excerpt))?;
        }
        if let Some(category_id) = patch.category_id {
            self.ensure_category(category_id).await?;
            post.category_id = category_id;
        }
        if let Some(tags) = patch.tags {
            post.tags = clean_tags(tags);
        }
        if let Some(is_published) = patch.is_published {
            post.is_published = is_published;
        }
        post.updated_at = Utc::now();

        let post = self.posts.update(post).await.map_err(|e| match e {
            RepoError::NotFound => DomainError::not_found("Post", id),
            other => other.into(),
        })?;
        self.resolve_one(post).await
    }

    /// Delete a post together with its comments.
    pub async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        self.posts.delete(id).await.map_err(|e| match e {
            RepoError::NotFound => DomainError::not_found("Post", id),
            other => other.into(),
        })?;
        tracing::info!(post_id = %id, "Post deleted");
        Ok(())
    }

    /// Comments of a post, oldest first. Does not count as a view.
    pub async fn comments(&self, post_id: Uuid) -> Result<Vec<CommentDetails>, DomainError> {
        let post = self
            .posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Post", post_id))?;
        let users = self.users_by_id(comment_user_ids(&post.comments)).await?;
        Ok(attach_users(post.comments, &users))
    }

    pub async fn add_comment(
        &self,
        post_id: Uuid,
        caller: &User,
        content: &str,
    ) -> Result<CommentDetails, DomainError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(DomainError::validation("Comment content is required"));
        }

        let comment = Comment::new(caller.id, content.to_string());
        let comment = self
            .posts
            .add_comment(post_id, comment)
            .await
            .map_err(|e| match e {
                RepoError::NotFound => DomainError::not_found("Post", post_id),
                other => other.into(),
            })?;

        tracing::debug!(post_id = %post_id, comment_id = %comment.id, "Comment added");
        Ok(CommentDetails {
            comment,
            user: Some(UserSummary::from(caller)),
        })
    }

    /// Remove a comment. Only its owner may do this.
    pub async fn delete_comment(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
        caller: &User,
    ) -> Result<(), DomainError> {
        let post = self
            .posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Post", post_id))?;
        let comment = post
            .comment(comment_id)
            .ok_or_else(|| DomainError::not_found("Comment", comment_id))?;

        if comment.user_id != caller.id {
            tracing::warn!(
                comment_id = %comment_id,
                caller = %caller.id,
                "Refused to delete another user's comment"
            );
            return Err(DomainError::Forbidden(
                "Not authorized to delete this comment".to_string(),
            ));
        }

        // Owners never change, so a concurrent removal is the only way
        // this can miss.
        self.posts
            .delete_comment(post_id, comment_id)
            .await
            .map_err(|e| match e {
                RepoError::NotFound => DomainError::not_found("Comment", comment_id),
                other => other.into(),
            })
    }

    async fn ensure_category(&self, id: Uuid) -> Result<(), DomainError> {
        match self.categories.find_by_id(id).await? {
            Some(_) => Ok(()),
            None => Err(DomainError::validation("Category does not exist")),
        }
    }

    async fn resolve_one(&self, post: Post) -> Result<PostDetails, DomainError> {
        let mut resolved = self.resolve(vec![post]).await?;
        resolved
            .pop()
            .ok_or_else(|| DomainError::Internal("post vanished during resolution".to_string()))
    }

    async fn resolve(&self, posts: Vec<Post>) -> Result<Vec<PostDetails>, DomainError> {
        let mut user_ids: HashSet<Uuid> = posts.iter().map(|p| p.author_id).collect();
        for post in &posts {
            user_ids.extend(comment_user_ids(&post.comments));
        }
        let category_ids: Vec<Uuid> = posts
            .iter()
            .map(|p| p.category_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        let users = self.users_by_id(user_ids).await?;
        let categories: HashMap<Uuid, CategorySummary> = self
            .categories
            .find_by_ids(&category_ids)
            .await?
            .iter()
            .map(|c| (c.id, CategorySummary::from(c)))
            .collect();

        Ok(posts
            .into_iter()
            .map(|mut post| {
                let comments = attach_users(std::mem::take(&mut post.comments), &users);
                PostDetails {
                    author: users.get(&post.author_id).cloned(),
                    category: categories.get(&post.category_id).cloned(),
                    comments,
                    post,
                }
            })
            .collect())
    }

    async fn users_by_id(
        &self,
        ids: impl IntoIterator<Item = Uuid>,
    ) -> Result<HashMap<Uuid, UserSummary>, RepoError> {
        let ids: Vec<Uuid> = ids.into_iter().collect();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        Ok(self
            .users
            .find_by_ids(&ids)
            .await?
            .iter()
            .map(|u| (u.id, UserSummary::from(u)))
            .collect())
    }
}

fn comment_user_ids(comments: &[Comment]) -> HashSet<Uuid> {
    comments.iter().map(|c| c.user_id).collect()
}

fn attach_users(
    comments: Vec<Comment>,
    users: &HashMap<Uuid, UserSummary>,
) -> Vec<CommentDetails> {
    comments
        .into_iter()
        .map(|comment| CommentDetails {
            user: users.get(&comment.user_id).cloned(),
            comment,
        })
        .collect()
}

fn validate_title(title: &str) -> Result<String, DomainError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(DomainError::validation("Please provide a title"));
    }
    if title.chars().count() > TITLE_MAX_LEN {
        return Err(DomainError::Validation(format!(
            "Title cannot be more than {TITLE_MAX_LEN} characters"
        )));
    }
    Ok(title.to_string())
}

fn validate_content(content: &str) -> Result<String, DomainError> {
    if content.trim().is_empty() {
        return Err(DomainError::validation("Please provide content"));
    }
    Ok(content.to_string())
}

fn validate_excerpt(excerpt: Option<String>) -> Result<Option<String>, DomainError> {
    let Some(excerpt) = excerpt.map(|e| e.trim().to_string()) else {
        return Ok(None);
    };
    if excerpt.is_empty() {
        return Ok(None);
    }
    if excerpt.chars().count() > EXCERPT_MAX_LEN {
        return Err(DomainError::Validation(format!(
            "Excerpt cannot be more than {EXCERPT_MAX_LEN} characters"
        )));
    }
    Ok(Some(excerpt))
}

fn clean_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}
