//! Domain records to response DTOs.

use quill_core::domain::{Category, User};
use quill_core::services::{CategorySummary, CommentDetails, PostDetails, UserSummary};
use quill_shared::dto::{
    AuthResponse, CategoryRefResponse, CategoryResponse, CommentResponse, PostResponse,
    UserResponse, UserSummaryResponse,
};

pub fn auth(user: &User, token: String) -> AuthResponse {
    AuthResponse {
        id: user.id,
        name: user.name.clone(),
        email: user.email.clone(),
        role: user.role.to_string(),
        token,
    }
}

pub fn profile(user: &User) -> UserResponse {
    UserResponse {
        id: user.id,
        name: user.name.clone(),
        email: user.email.clone(),
        role: user.role.to_string(),
        avatar: user.avatar.clone(),
        created_at: user.created_at,
    }
}

fn user_summary(user: UserSummary) -> UserSummaryResponse {
    UserSummaryResponse {
        id: user.id,
        name: user.name,
        email: user.email,
    }
}

fn category_ref(category: CategorySummary) -> CategoryRefResponse {
    CategoryRefResponse {
        id: category.id,
        name: category.name,
        slug: category.slug,
    }
}

pub fn category(category: Category) -> CategoryResponse {
    CategoryResponse {
        id: category.id,
        name: category.name,
        slug: category.slug,
        description: category.description,
        created_at: category.created_at,
        updated_at: category.updated_at,
    }
}

pub fn comment(details: CommentDetails) -> CommentResponse {
    CommentResponse {
        id: details.comment.id,
        user: details.user.map(user_summary),
        content: details.comment.content,
        created_at: details.comment.created_at,
    }
}

pub fn post(details: PostDetails) -> PostResponse {
    let PostDetails {
        post,
        author,
        category,
        comments,
    } = details;

    PostResponse {
        id: post.id,
        title: post.title,
        content: post.content,
        excerpt: post.excerpt,
        author: author.map(user_summary),
        category: category.map(category_ref),
        tags: post.tags,
        is_published: post.is_published,
        view_count: post.view_count,
        comments: comments.into_iter().map(comment).collect(),
        created_at: post.created_at,
        updated_at: post.updated_at,
    }
}
