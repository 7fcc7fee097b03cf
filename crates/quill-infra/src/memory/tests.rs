//! Service-level scenarios run against the in-memory repositories.

use std::sync::Arc;

use argon2::Params;
use chrono::{TimeDelta, Utc};
use uuid::Uuid;

use quill_core::DomainError;
use quill_core::domain::{EMAIL_MAX_LEN, NAME_MAX_LEN, Post, User};
use quill_core::ports::{BaseRepository, ExternalProfile, PostQuery, TokenService};
use quill_core::services::{
    AuthGateway, CategoryDraft, CategoryPatch, CategoryService, CredentialStore,
    FederatedIdentityBridge, PostDraft, PostPatch, PostService,
};

use super::{InMemoryCategoryRepository, InMemoryPostRepository, InMemoryUserRepository};
use crate::auth::{Argon2PasswordService, JwtConfig, JwtTokenService};

struct Fixture {
    users: Arc<InMemoryUserRepository>,
    post_repo: Arc<InMemoryPostRepository>,
    tokens: Arc<JwtTokenService>,
    credentials: CredentialStore,
    gateway: AuthGateway,
    bridge: Arc<FederatedIdentityBridge>,
    posts: Arc<PostService>,
    categories: CategoryService,
}

fn jwt_config(expiration_days: i64) -> JwtConfig {
    JwtConfig {
        secret: "fixture-secret".to_string(),
        expiration_days,
        issuer: "fixture".to_string(),
    }
}

impl Fixture {
    fn new() -> Self {
        let users = Arc::new(InMemoryUserRepository::new());
        let category_repo = Arc::new(InMemoryCategoryRepository::new());
        let post_repo = Arc::new(InMemoryPostRepository::new());
        let passwords = Arc::new(Argon2PasswordService::with_params(
            Params::new(1024, 1, 1, None).unwrap(),
        ));
        let tokens = Arc::new(JwtTokenService::new(jwt_config(30)));

        Self {
            credentials: CredentialStore::new(users.clone(), passwords.clone()),
            gateway: AuthGateway::new(tokens.clone(), users.clone()),
            bridge: Arc::new(FederatedIdentityBridge::new(users.clone(), passwords)),
            posts: Arc::new(PostService::new(
                post_repo.clone(),
                users.clone(),
                category_repo.clone(),
            )),
            categories: CategoryService::new(category_repo),
            users,
            post_repo,
            tokens,
        }
    }

    async fn user(&self, name: &str) -> User {
        self.credentials
            .create_user(name, &format!("{name}@example.com"), "password123", None)
            .await
            .unwrap()
    }

    async fn category(&self, name: &str) -> Uuid {
        self.categories
            .create(CategoryDraft {
                name: name.to_string(),
                description: None,
            })
            .await
            .unwrap()
            .id
    }

    async fn post(&self, author: &User, category_id: Uuid, title: &str, content: &str) -> Uuid {
        self.posts
            .create(
                PostDraft {
                    title: title.to_string(),
                    content: content.to_string(),
                    category_id,
                    ..Default::default()
                },
                Some(author),
            )
            .await
            .unwrap()
            .post
            .id
    }
}

fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

#[tokio::test]
async fn test_register_twice_with_same_email_fails() {
    let fx = Fixture::new();

    let user = fx
        .credentials
        .create_user("Ada", "ada@example.com", "password123", None)
        .await
        .unwrap();
    let token = fx.tokens.generate_token(user.id).unwrap();
    assert_eq!(fx.tokens.validate_token(&token).unwrap().user_id, user.id);

    let second = fx
        .credentials
        .create_user("Imposter", "ADA@example.com", "password456", None)
        .await;
    assert!(matches!(second, Err(DomainError::Duplicate(_))));
    assert_eq!(fx.users.len().await, 1);
}

#[tokio::test]
async fn test_register_validates_input() {
    let fx = Fixture::new();

    for (name, email, password) in [
        ("", "ada@example.com", "password123"),
        ("Ada", "not-an-email", "password123"),
        ("Ada", "ada@example.com", "short"),
    ] {
        let result = fx.credentials.create_user(name, email, password, None).await;
        assert!(matches!(result, Err(DomainError::Validation(_))), "{email}");
    }
}

#[tokio::test]
async fn test_register_rejects_oversized_name_and_email() {
    let fx = Fixture::new();
    let long_name = "n".repeat(NAME_MAX_LEN + 1);
    let long_email = format!("{}@example.com", "a".repeat(EMAIL_MAX_LEN));

    let result = fx
        .credentials
        .create_user(&long_name, "ada@example.com", "password123", None)
        .await;
    assert!(matches!(result, Err(DomainError::Validation(_))));

    let result = fx
        .credentials
        .create_user("Ada", &long_email, "password123", None)
        .await;
    assert!(matches!(result, Err(DomainError::Validation(_))));

    let at_limit = fx
        .credentials
        .create_user(&"n".repeat(NAME_MAX_LEN), "ada@example.com", "password123", None)
        .await
        .unwrap();
    assert_eq!(at_limit.name.chars().count(), NAME_MAX_LEN);
    assert_eq!(fx.users.len().await, 1);
}

#[tokio::test]
async fn test_login_checks_password() {
    let fx = Fixture::new();
    let user = fx.user("ada").await;

    let wrong = fx.credentials.authenticate("ada@example.com", "nope-nope").await;
    assert!(matches!(wrong, Err(DomainError::Unauthenticated(_))));

    let unknown = fx.credentials.authenticate("bob@example.com", "password123").await;
    assert!(matches!(unknown, Err(DomainError::Unauthenticated(_))));

    let missing = fx.credentials.authenticate("", "password123").await;
    assert!(matches!(missing, Err(DomainError::Validation(_))));

    let found = fx
        .credentials
        .authenticate("Ada@Example.com", "password123")
        .await
        .unwrap();
    assert_eq!(found.id, user.id);
}

#[tokio::test]
async fn test_gateway_resolves_token_to_user() {
    let fx = Fixture::new();
    let user = fx.user("ada").await;
    let token = fx.gateway.issue(&user).unwrap();

    let resolved = fx
        .gateway
        .authenticate(Some(bearer(&token).as_str()))
        .await
        .unwrap();
    assert_eq!(resolved.id, user.id);
}

#[tokio::test]
async fn test_gateway_rejects_missing_tampered_and_expired_tokens() {
    let fx = Fixture::new();
    let user = fx.user("ada").await;
    let token = fx.gateway.issue(&user).unwrap();

    assert!(matches!(
        fx.gateway.authenticate(None).await,
        Err(DomainError::Unauthenticated(_))
    ));

    let (signed, signature) = token.rsplit_once('.').unwrap();
    let mut signature: Vec<char> = signature.chars().collect();
    signature[0] = if signature[0] == 'A' { 'B' } else { 'A' };
    let tampered = format!("{signed}.{}", signature.into_iter().collect::<String>());
    assert!(matches!(
        fx.gateway.authenticate(Some(bearer(&tampered).as_str())).await,
        Err(DomainError::Unauthenticated(_))
    ));

    let expired_tokens = Arc::new(JwtTokenService::new(jwt_config(-1)));
    let expired = expired_tokens.generate_token(user.id).unwrap();
    assert!(matches!(
        fx.gateway.authenticate(Some(bearer(&expired).as_str())).await,
        Err(DomainError::Unauthenticated(_))
    ));
}

#[tokio::test]
async fn test_gateway_rejects_token_of_deleted_account() {
    let fx = Fixture::new();
    let user = fx.user("ada").await;
    let token = fx.gateway.issue(&user).unwrap();

    fx.users.delete(user.id).await.unwrap();

    assert!(matches!(
        fx.gateway.authenticate(Some(bearer(&token).as_str())).await,
        Err(DomainError::Unauthenticated(_))
    ));
}

fn google_profile(email: &str) -> ExternalProfile {
    ExternalProfile {
        provider_id: "google-123".to_string(),
        email: email.to_string(),
        name: "Grace Hopper".to_string(),
        avatar: Some("https://example.com/grace.png".to_string()),
    }
}

#[tokio::test]
async fn test_federated_login_reuses_existing_account_unmodified() {
    let fx = Fixture::new();
    let existing = fx.user("grace").await;

    let resolved = fx
        .bridge
        .resolve_or_create(&google_profile("Grace@example.com"))
        .await
        .unwrap();

    assert_eq!(resolved.id, existing.id);
    assert_eq!(resolved.name, "grace");
    assert!(resolved.google_id.is_none());
    assert!(resolved.avatar.is_none());
}

#[tokio::test]
async fn test_federated_login_creates_account() {
    let fx = Fixture::new();

    let user = fx
        .bridge
        .resolve_or_create(&google_profile("grace@example.com"))
        .await
        .unwrap();

    assert_eq!(user.name, "Grace Hopper");
    assert_eq!(user.google_id.as_deref(), Some("google-123"));
    assert_eq!(user.avatar.as_deref(), Some("https://example.com/grace.png"));
    assert!(!user.password_hash.is_empty());

    // The throwaway password is not something anyone can log in with.
    let login = fx
        .credentials
        .authenticate("grace@example.com", "password123")
        .await;
    assert!(login.is_err());
}

#[tokio::test]
async fn test_federated_login_clips_long_provider_name() {
    let fx = Fixture::new();
    let mut profile = google_profile("grace@example.com");
    profile.name = "Grace ".repeat(40);

    let user = fx.bridge.resolve_or_create(&profile).await.unwrap();
    assert!(user.name.chars().count() <= NAME_MAX_LEN);
    assert!(user.name.starts_with("Grace Grace"));

    profile.email = format!("{}@example.com", "g".repeat(EMAIL_MAX_LEN));
    let result = fx.bridge.resolve_or_create(&profile).await;
    assert!(matches!(result, Err(DomainError::Validation(_))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_first_federated_logins_create_one_user() {
    let fx = Fixture::new();

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let bridge = fx.bridge.clone();
            tokio::spawn(async move {
                bridge
                    .resolve_or_create(&google_profile("grace@example.com"))
                    .await
            })
        })
        .collect();

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap().unwrap().id);
    }

    assert_eq!(ids[0], ids[1]);
    assert_eq!(fx.users.len().await, 1);
}

#[tokio::test]
async fn test_view_counts_every_fetch() {
    let fx = Fixture::new();
    let author = fx.user("ada").await;
    let category = fx.category("Tech").await;
    let post_id = fx.post(&author, category, "Hello", "World").await;

    let before = fx.post_repo.find_by_id(post_id).await.unwrap().unwrap().view_count;
    fx.posts.view(post_id).await.unwrap();
    let second = fx.posts.view(post_id).await.unwrap();

    assert_eq!(second.post.view_count, before + 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_views_lose_no_updates() {
    let fx = Fixture::new();
    let author = fx.user("ada").await;
    let category = fx.category("Tech").await;
    let post_id = fx.post(&author, category, "Hello", "World").await;

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let posts = fx.posts.clone();
            tokio::spawn(async move { posts.view(post_id).await })
        })
        .collect();
    for result in futures::future::join_all(handles).await {
        result.unwrap().unwrap();
    }

    let post = fx.post_repo.find_by_id(post_id).await.unwrap().unwrap();
    assert_eq!(post.view_count, 10);
}

#[tokio::test]
async fn test_view_of_missing_post_is_not_found() {
    let fx = Fixture::new();

    let result = fx.posts.view(Uuid::new_v4()).await;
    assert!(matches!(
        result,
        Err(DomainError::NotFound { entity_type: "Post", .. })
    ));
}

#[tokio::test]
async fn test_update_keeps_view_count_and_comments() {
    let fx = Fixture::new();
    let author = fx.user("ada").await;
    let category = fx.category("Tech").await;
    let post_id = fx.post(&author, category, "Hello", "World").await;

    fx.posts.view(post_id).await.unwrap();
    fx.posts.add_comment(post_id, &author, "first").await.unwrap();

    let updated = fx
        .posts
        .update(
            post_id,
            PostPatch {
                title: Some("Hello again".to_string()),
                tags: Some(vec![" rust ".to_string(), String::new()]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.post.title, "Hello again");
    assert_eq!(updated.post.tags, vec!["rust".to_string()]);
    assert_eq!(updated.post.view_count, 1);
    assert_eq!(updated.comments.len(), 1);
}

#[tokio::test]
async fn test_comment_deletion_is_owner_only() {
    let fx = Fixture::new();
    let owner = fx.user("ada").await;
    let stranger = fx.user("bob").await;
    let category = fx.category("Tech").await;
    let post_id = fx.post(&owner, category, "Hello", "World").await;

    let comment = fx
        .posts
        .add_comment(post_id, &owner, "  nice post  ")
        .await
        .unwrap();
    assert_eq!(comment.comment.content, "nice post");
    assert_eq!(comment.user.as_ref().map(|u| u.id), Some(owner.id));

    let forbidden = fx
        .posts
        .delete_comment(post_id, comment.comment.id, &stranger)
        .await;
    assert!(matches!(forbidden, Err(DomainError::Forbidden(_))));

    fx.posts
        .delete_comment(post_id, comment.comment.id, &owner)
        .await
        .unwrap();
    let remaining = fx.posts.comments(post_id).await.unwrap();
    assert!(remaining.iter().all(|c| c.comment.id != comment.comment.id));

    let again = fx
        .posts
        .delete_comment(post_id, comment.comment.id, &owner)
        .await;
    assert!(matches!(
        again,
        Err(DomainError::NotFound { entity_type: "Comment", .. })
    ));

    let missing_post = fx
        .posts
        .delete_comment(Uuid::new_v4(), comment.comment.id, &owner)
        .await;
    assert!(matches!(
        missing_post,
        Err(DomainError::NotFound { entity_type: "Post", .. })
    ));
}

#[tokio::test]
async fn test_add_comment_validation_and_missing_post() {
    let fx = Fixture::new();
    let user = fx.user("ada").await;
    let category = fx.category("Tech").await;
    let post_id = fx.post(&user, category, "Hello", "World").await;

    let blank = fx.posts.add_comment(post_id, &user, "   ").await;
    assert!(matches!(blank, Err(DomainError::Validation(_))));

    let missing = fx.posts.add_comment(Uuid::new_v4(), &user, "hi").await;
    assert!(matches!(
        missing,
        Err(DomainError::NotFound { entity_type: "Post", .. })
    ));
}

#[tokio::test]
async fn test_deleting_post_removes_its_comments() {
    let fx = Fixture::new();
    let user = fx.user("ada").await;
    let category = fx.category("Tech").await;
    let post_id = fx.post(&user, category, "Hello", "World").await;
    fx.posts.add_comment(post_id, &user, "hi").await.unwrap();

    fx.posts.delete(post_id).await.unwrap();

    assert!(fx.posts.comments(post_id).await.is_err());
    assert!(matches!(
        fx.posts.delete(post_id).await,
        Err(DomainError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_search_and_category_filter_intersect() {
    let fx = Fixture::new();
    let author = fx.user("ada").await;
    let web = fx.category("Web").await;
    let mobile = fx.category("Mobile").await;

    let react_web = fx.post(&author, web, "Learning React", "components").await;
    let react_mobile = fx
        .post(&author, mobile, "Native apps", "Using REACT native")
        .await;
    fx.post(&author, web, "Vue basics", "templates").await;

    let excerpt_only = fx
        .posts
        .create(
            PostDraft {
                title: "Hooks".to_string(),
                content: "state management".to_string(),
                excerpt: Some("A react deep dive".to_string()),
                category_id: web,
                ..Default::default()
            },
            Some(&author),
        )
        .await
        .unwrap()
        .post
        .id;

    let search = PostQuery::new(None, None, None, Some("react".to_string()));
    let page = fx.posts.list(&search).await.unwrap();
    let mut ids: Vec<Uuid> = page.items.iter().map(|p| p.post.id).collect();
    ids.sort();
    let mut expected = vec![react_web, react_mobile, excerpt_only];
    expected.sort();
    assert_eq!(ids, expected);
    assert_eq!(page.total, 3);

    let both = PostQuery::new(None, None, Some(mobile), Some("react".to_string()));
    let page = fx.posts.list(&both).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].post.id, react_mobile);
    assert_eq!(
        page.items[0].category.as_ref().map(|c| c.slug.as_str()),
        Some("mobile")
    );
}

#[tokio::test]
async fn test_listing_is_newest_first_and_paginated() {
    let fx = Fixture::new();
    let author = fx.user("ada").await;
    let category = fx.category("Tech").await;

    let base = Utc::now();
    let mut ids = Vec::new();
    for i in 0..5 {
        let mut post = Post::new(author.id, category, format!("Post {i}"), "body".to_string());
        post.created_at = base + TimeDelta::minutes(i);
        ids.push(fx.post_repo.insert(post).await.unwrap().id);
    }

    let query = PostQuery::new(Some(2), Some(2), None, None);
    let page = fx.posts.list(&query).await.unwrap();

    assert_eq!(page.total, 5);
    assert_eq!(query.total_pages(page.total), 3);
    let titles: Vec<&str> = page.items.iter().map(|p| p.post.title.as_str()).collect();
    assert_eq!(titles, vec!["Post 2", "Post 1"]);
    assert_eq!(page.items[0].author.as_ref().map(|a| a.id), Some(author.id));
}

#[tokio::test]
async fn test_create_post_attribution() {
    let fx = Fixture::new();
    let author = fx.user("ada").await;
    let other = fx.user("bob").await;
    let category = fx.category("Tech").await;

    let draft = PostDraft {
        title: "Hello".to_string(),
        content: "World".to_string(),
        category_id: category,
        author_id: Some(other.id),
        ..Default::default()
    };

    // Authenticated caller wins over the body.
    let created = fx.posts.create(draft.clone(), Some(&author)).await.unwrap();
    assert_eq!(created.post.author_id, author.id);

    // Anonymous callers fall back to the body.
    let created = fx.posts.create(draft.clone(), None).await.unwrap();
    assert_eq!(created.post.author_id, other.id);

    let anonymous = PostDraft {
        author_id: None,
        ..draft.clone()
    };
    assert!(matches!(
        fx.posts.create(anonymous, None).await,
        Err(DomainError::Validation(_))
    ));

    let ghost = PostDraft {
        author_id: Some(Uuid::new_v4()),
        ..draft.clone()
    };
    assert!(matches!(
        fx.posts.create(ghost, None).await,
        Err(DomainError::Validation(_))
    ));

    let bad_category = PostDraft {
        category_id: Uuid::new_v4(),
        ..draft
    };
    assert!(matches!(
        fx.posts.create(bad_category, Some(&author)).await,
        Err(DomainError::Validation(_))
    ));
}

#[tokio::test]
async fn test_duplicate_category_keeps_the_original() {
    let fx = Fixture::new();

    let first = fx
        .categories
        .create(CategoryDraft {
            name: "Tech".to_string(),
            description: Some("Original".to_string()),
        })
        .await
        .unwrap();

    let second = fx
        .categories
        .create(CategoryDraft {
            name: "Tech".to_string(),
            description: Some("Overwrite attempt".to_string()),
        })
        .await;
    assert!(matches!(second, Err(DomainError::Duplicate(_))));

    let stored = fx.categories.get(first.id).await.unwrap();
    assert_eq!(stored, first);
    assert_eq!(fx.categories.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_category_rename_clash_and_delete() {
    let fx = Fixture::new();
    let tech = fx.category("Tech").await;
    fx.category("Design").await;

    let clash = fx
        .categories
        .update(
            tech,
            CategoryPatch {
                name: Some("Design".to_string()),
                description: None,
            },
        )
        .await;
    assert!(matches!(clash, Err(DomainError::Duplicate(_))));

    let names: Vec<String> = fx
        .categories
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["Design".to_string(), "Tech".to_string()]);

    fx.categories.delete(tech).await.unwrap();
    assert!(matches!(
        fx.categories.get(tech).await,
        Err(DomainError::NotFound { .. })
    ));
}
