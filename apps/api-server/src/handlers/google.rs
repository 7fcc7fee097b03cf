//! Google sign-in: consent redirect and callback.
//!
//! The callback hands the token to the client in the redirect URL. It can
//! end up in browser history; clients should swap it for `/api/auth/me`
//! at once and drop it from the address bar.

use actix_web::{HttpResponse, http::header, web};

use quill_core::DomainError;
use quill_shared::dto::OAuthCallbackQuery;

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /api/auth/google
pub async fn start(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let provider = state
        .identity_provider
        .as_ref()
        .ok_or_else(|| AppError::NotFound("Google login is not configured".to_string()))?;

    let url = provider.authorization_url().map_err(DomainError::from)?;
    Ok(redirect(&url))
}

/// GET /api/auth/google/callback
///
/// Every failure lands on the client's login page.
pub async fn callback(
    state: web::Data<AppState>,
    query: web::Query<OAuthCallbackQuery>,
) -> HttpResponse {
    let failure = format!("{}/login", state.client_url);

    match complete(&state, query.into_inner()).await {
        Ok(token) => redirect(&format!(
            "{}/auth/google/success?token={}",
            state.client_url, token
        )),
        Err(err) => {
            tracing::warn!(error = %err, "Google login failed");
            redirect(&failure)
        }
    }
}

async fn complete(state: &AppState, query: OAuthCallbackQuery) -> Result<String, DomainError> {
    let provider = state
        .identity_provider
        .as_ref()
        .ok_or_else(|| DomainError::validation("Google login is not configured"))?;

    if let Some(error) = query.error {
        return Err(DomainError::Validation(format!("consent refused: {error}")));
    }
    let (Some(code), Some(oauth_state)) = (query.code, query.state) else {
        return Err(DomainError::validation("missing code or state"));
    };

    let profile = provider.exchange_code(&code, &oauth_state).await?;
    let user = state.federation.resolve_or_create(&profile).await?;
    state.gateway.issue(&user)
}

fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}
