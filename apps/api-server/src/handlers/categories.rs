//! Category handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use quill_core::services::{CategoryDraft, CategoryPatch};
use quill_shared::dto::{CreateCategoryRequest, UpdateCategoryRequest};
use quill_shared::{ApiResponse, Empty};

use super::views;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/categories - sorted by name.
pub async fn list(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let categories: Vec<_> = state
        .categories
        .list()
        .await?
        .into_iter()
        .map(views::category)
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::list(categories)))
}

/// GET /api/categories/{id}
pub async fn get(state: web::Data<AppState>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let category = state.categories.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(views::category(category))))
}

/// POST /api/categories
pub async fn create(
    state: web::Data<AppState>,
    body: web::Json<CreateCategoryRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let category = state
        .categories
        .create(CategoryDraft {
            name: req.name,
            description: req.description,
        })
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok(views::category(category))))
}

/// PUT /api/categories/{id}
pub async fn update(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateCategoryRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let category = state
        .categories
        .update(
            path.into_inner(),
            CategoryPatch {
                name: req.name,
                description: req.description,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(views::category(category))))
}

/// DELETE /api/categories/{id}
///
/// Posts in the category keep their dangling reference.
pub async fn delete(state: web::Data<AppState>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    state.categories.delete(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        Empty {},
        "Category deleted successfully",
    )))
}
