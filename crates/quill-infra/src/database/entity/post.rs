//! Post entity for SeaORM.
//!
//! `author_id` and `category_id` are plain columns, not foreign keys: a post
//! whose category is deleted keeps the dangling id.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub author_id: Uuid,
    pub category_id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub excerpt: Option<String>,
    #[sea_orm(column_type = "JsonBinary")]
    pub tags: Json,
    pub is_published: bool,
    pub view_count: i64,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::comment::Entity")]
    Comment,
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to Domain Post. Comments are loaded
/// separately and start out empty.
impl From<Model> for quill_core::domain::Post {
    fn from(model: Model) -> Self {
        let tags = serde_json::from_value(model.tags).unwrap_or_else(|e| {
            tracing::warn!(post_id = %model.id, error = %e, "Malformed tags column");
            Vec::new()
        });

        Self {
            id: model.id,
            author_id: model.author_id,
            category_id: model.category_id,
            title: model.title,
            content: model.content,
            excerpt: model.excerpt,
            tags,
            is_published: model.is_published,
            view_count: model.view_count,
            comments: Vec::new(),
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

/// Conversion from Domain Post to SeaORM ActiveModel (post row only).
impl From<quill_core::domain::Post> for ActiveModel {
    fn from(post: quill_core::domain::Post) -> Self {
        Self {
            id: Set(post.id),
            author_id: Set(post.author_id),
            category_id: Set(post.category_id),
            title: Set(post.title),
            content: Set(post.content),
            excerpt: Set(post.excerpt),
            tags: Set(Json::from(post.tags)),
            is_published: Set(post.is_published),
            view_count: Set(post.view_count),
            created_at: Set(post.created_at.into()),
            updated_at: Set(post.updated_at.into()),
        }
    }
}
