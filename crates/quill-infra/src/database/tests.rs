use chrono::Utc;
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
use uuid::Uuid;

use quill_core::domain::{Post, Role, User};
use quill_core::error::RepoError;
use quill_core::ports::{BaseRepository, PostRepository, UserRepository};

use super::entity::{comment, post, user};
use super::postgres_repo::{PostgresPostRepository, PostgresUserRepository};

fn post_model(id: Uuid, view_count: i64) -> post::Model {
    let now = Utc::now();
    post::Model {
        id,
        author_id: Uuid::new_v4(),
        category_id: Uuid::new_v4(),
        title: "Test Post".to_owned(),
        content: "Content".to_owned(),
        excerpt: None,
        tags: serde_json::json!(["rust", "web"]),
        is_published: true,
        view_count,
        created_at: now.into(),
        updated_at: now.into(),
    }
}

#[tokio::test]
async fn test_find_post_by_id_loads_comments() {
    let post_id = Uuid::new_v4();
    let commenter = Uuid::new_v4();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![post_model(post_id, 3)]])
        .append_query_results([vec![comment::Model {
            id: Uuid::new_v4(),
            post_id,
            user_id: commenter,
            content: "Nice".to_owned(),
            created_at: Utc::now().into(),
        }]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let post: Post = repo.find_by_id(post_id).await.unwrap().unwrap();

    assert_eq!(post.id, post_id);
    assert_eq!(post.title, "Test Post");
    assert_eq!(post.tags, vec!["rust".to_string(), "web".to_string()]);
    assert_eq!(post.comments.len(), 1);
    assert_eq!(post.comments[0].user_id, commenter);
}

#[tokio::test]
async fn test_increment_views_on_missing_post() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    assert!(repo.increment_views(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_increment_views_returns_updated_post() {
    let post_id = Uuid::new_v4();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .append_query_results([vec![post_model(post_id, 8)]])
        .append_query_results([Vec::<comment::Model>::new()])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let post = repo.increment_views(post_id).await.unwrap().unwrap();
    assert_eq!(post.view_count, 8);
}

#[tokio::test]
async fn test_delete_missing_comment_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let result = repo.delete_comment(Uuid::new_v4(), Uuid::new_v4()).await;

    assert!(matches!(result, Err(RepoError::NotFound)));
}

#[tokio::test]
async fn test_find_user_by_email() {
    let user_id = Uuid::new_v4();
    let now = Utc::now();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![user::Model {
            id: user_id,
            name: "Ada".to_owned(),
            email: "ada@example.com".to_owned(),
            password_hash: "$argon2id$stub".to_owned(),
            role: "admin".to_owned(),
            avatar: None,
            google_id: Some("g-1".to_owned()),
            created_at: now.into(),
            updated_at: now.into(),
        }]])
        .into_connection();

    let repo = PostgresUserRepository::new(db);
    let user: User = repo.find_by_email("ada@example.com").await.unwrap().unwrap();

    assert_eq!(user.id, user_id);
    assert_eq!(user.role, Role::Admin);
    assert_eq!(user.google_id.as_deref(), Some("g-1"));
}
