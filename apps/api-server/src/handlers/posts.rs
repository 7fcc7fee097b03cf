//! Post handlers.
//!
//! Update and delete are open to any caller; see DESIGN.md.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use quill_core::DomainError;
use quill_core::ports::PostQuery;
use quill_core::services::{PostDraft, PostPatch};
use quill_shared::dto::{CreatePostRequest, PostListQuery, UpdatePostRequest};
use quill_shared::{ApiResponse, Empty};

use super::views;
use crate::middleware::auth::OptionalIdentity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/posts?page&limit&category&search
pub async fn list(
    state: web::Data<AppState>,
    query: web::Query<PostListQuery>,
) -> AppResult<HttpResponse> {
    let query = query.into_inner();
    let category = match query.category.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(
            Uuid::parse_str(raw).map_err(|_| DomainError::validation("Invalid category id"))?,
        ),
    };
    let query = PostQuery::new(query.page, query.limit, category, query.search);

    let page = state.posts.list(&query).await?;
    let total_pages = query.total_pages(page.total);
    let items: Vec<_> = page.items.into_iter().map(views::post).collect();

    Ok(HttpResponse::Ok().json(ApiResponse::page(
        items,
        page.total,
        total_pages,
        query.page,
    )))
}

/// GET /api/posts/{id} - counts as a view.
pub async fn get(state: web::Data<AppState>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let post = state.posts.view(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(views::post(post))))
}

/// POST /api/posts
///
/// Attributed to the bearer of a valid token, else to the body's `author`.
pub async fn create(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let draft = PostDraft {
        title: req.title,
        content: req.content,
        excerpt: req.excerpt,
        category_id: req.category,
        author_id: req.author,
        tags: req.tags.into(),
        is_published: req.is_published,
    };

    let post = state.posts.create(draft, identity.0.as_ref()).await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok(views::post(post))))
}

/// PUT /api/posts/{id}
pub async fn update(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let patch = PostPatch {
        title: req.title,
        content: req.content,
        excerpt: req.excerpt,
        category_id: req.category,
        tags: req.tags.map(Into::into),
        is_published: req.is_published,
    };

    let post = state.posts.update(path.into_inner(), patch).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(views::post(post))))
}

/// DELETE /api/posts/{id}
pub async fn delete(state: web::Data<AppState>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    state.posts.delete(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        Empty {},
        "Post deleted successfully",
    )))
}
