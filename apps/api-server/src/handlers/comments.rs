//! Comment handlers, nested under `/api/posts/{id}/comments`.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use quill_shared::dto::CreateCommentRequest;
use quill_shared::{ApiResponse, Empty};

use super::views;
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/posts/{id}/comments
pub async fn list(state: web::Data<AppState>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let comments: Vec<_> = state
        .posts
        .comments(path.into_inner())
        .await?
        .into_iter()
        .map(views::comment)
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::list(comments)))
}

/// POST /api/posts/{id}/comments - Protected route
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<CreateCommentRequest>,
) -> AppResult<HttpResponse> {
    let comment = state
        .posts
        .add_comment(path.into_inner(), &identity, &body.content)
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok_with_message(
        views::comment(comment),
        "Comment added successfully",
    )))
}

/// DELETE /api/posts/{id}/comments/{comment_id} - owner only
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<(Uuid, Uuid)>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    state
        .posts
        .delete_comment(post_id, comment_id, &identity)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        Empty {},
        "Comment deleted successfully",
    )))
}
