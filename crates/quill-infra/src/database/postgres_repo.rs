//! PostgreSQL repository implementations.

use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::{Expr, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Unchanged, ColumnTrait, Condition, DbConn, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use quill_core::domain::{Category, Comment, Post, User, mask_email};
use quill_core::error::RepoError;
use quill_core::ports::{
    BaseRepository, CategoryRepository, Page, PostQuery, PostRepository, UserRepository,
};

use super::entity::category::{self, Entity as CategoryEntity};
use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, map_db_err};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL category repository.
pub type PostgresCategoryRepository = PostgresBaseRepository<CategoryEntity>;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_email = %mask_email(email), "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, RepoError> {
        let result = UserEntity::find()
            .filter(user::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn list(&self) -> Result<Vec<Category>, RepoError> {
        let result = CategoryEntity::find()
            .order_by_asc(category::Column::Name)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Category>, RepoError> {
        let result = CategoryEntity::find()
            .filter(category::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

/// PostgreSQL post repository. Comments live in their own table keyed by
/// `post_id` and are stitched back onto the post on every read.
pub struct PostgresPostRepository {
    db: DbConn,
}

impl PostgresPostRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    async fn comments_for(
        &self,
        post_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<Comment>>, RepoError> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = CommentEntity::find()
            .filter(comment::Column::PostId.is_in(post_ids.iter().copied()))
            .order_by_asc(comment::Column::CreatedAt)
            .order_by_asc(comment::Column::Id)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        let mut grouped: HashMap<Uuid, Vec<Comment>> = HashMap::new();
        for row in rows {
            grouped.entry(row.post_id).or_default().push(row.into());
        }
        Ok(grouped)
    }

    async fn with_comments(&self, model: post::Model) -> Result<Post, RepoError> {
        let mut comments = self.comments_for(&[model.id]).await?;
        let mut post: Post = model.into();
        post.comments = comments.remove(&post.id).unwrap_or_default();
        Ok(post)
    }
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Case-insensitive substring match over title, content and excerpt.
fn search_condition(term: &str) -> Condition {
    let pattern = format!("%{}%", escape_like(term));
    let like = || LikeExpr::new(pattern.clone()).escape('\\');

    Condition::any()
        .add(Expr::col(post::Column::Title).ilike(like()))
        .add(Expr::col(post::Column::Content).ilike(like()))
        .add(Expr::col(post::Column::Excerpt).ilike(like()))
}

#[async_trait]
impl BaseRepository<Post, Uuid> for PostgresPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let model = PostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        match model {
            Some(model) => Ok(Some(self.with_comments(model).await?)),
            None => Ok(None),
        }
    }

    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        let active_model: post::ActiveModel = post.into();
        let model = active_model.insert(&self.db).await.map_err(map_db_err)?;

        Ok(model.into())
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        // Leaves view_count, author and created_at untouched.
        let active_model = post::ActiveModel {
            id: Unchanged(post.id),
            category_id: Set(post.category_id),
            title: Set(post.title),
            content: Set(post.content),
            excerpt: Set(post.excerpt),
            tags: Set(post.tags.into()),
            is_published: Set(post.is_published),
            updated_at: Set(post.updated_at.into()),
            ..Default::default()
        };
        let model = active_model.update(&self.db).await.map_err(map_db_err)?;

        self.with_comments(model).await
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let result = PostEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn list(&self, query: &PostQuery) -> Result<Page<Post>, RepoError> {
        let mut select = PostEntity::find();
        if let Some(category_id) = query.category {
            select = select.filter(post::Column::CategoryId.eq(category_id));
        }
        if let Some(term) = query.search.as_deref() {
            select = select.filter(search_condition(term));
        }

        let total = select
            .clone()
            .count(&self.db)
            .await
            .map_err(map_db_err)?;

        let models = select
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .offset(query.offset())
            .limit(query.limit)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
        let mut comments = self.comments_for(&ids).await?;

        let items = models
            .into_iter()
            .map(|model| {
                let mut post: Post = model.into();
                post.comments = comments.remove(&post.id).unwrap_or_default();
                post
            })
            .collect();

        Ok(Page { items, total })
    }

    async fn increment_views(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let result = PostEntity::update_many()
            .col_expr(
                post::Column::ViewCount,
                Expr::col(post::Column::ViewCount).add(1),
            )
            .filter(post::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Ok(None);
        }

        self.find_by_id(id).await
    }

    async fn add_comment(&self, post_id: Uuid, comment: Comment) -> Result<Comment, RepoError> {
        // A missing post surfaces as a foreign-key violation, i.e. NotFound.
        let model = comment::ActiveModel::from_comment(post_id, comment)
            .insert(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(model.into())
    }

    async fn delete_comment(&self, post_id: Uuid, comment_id: Uuid) -> Result<(), RepoError> {
        let result = CommentEntity::delete_many()
            .filter(comment::Column::Id.eq(comment_id))
            .filter(comment::Column::PostId.eq(post_id))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }
}
