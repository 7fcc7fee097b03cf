//! Authentication extractors backed by the auth gateway.

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};
use futures::future::{FutureExt, LocalBoxFuture};

use quill_core::domain::User;

use crate::middleware::error::AppError;
use crate::state::AppState;

/// Authenticated caller.
///
/// Use this in handlers to require authentication:
/// ```ignore
/// async fn protected_route(identity: Identity) -> impl Responder {
///     format!("Hello, {}!", identity.name)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Identity(pub User);

impl std::ops::Deref for Identity {
    type Target = User;

    fn deref(&self) -> &User {
        &self.0
    }
}

fn authorization(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

impl FromRequest for Identity {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let Some(state) = req.app_data::<web::Data<AppState>>().cloned() else {
            tracing::error!("AppState not found in app data");
            return async { Err(AppError::Internal("missing application state".into())) }
                .boxed_local();
        };
        let header = authorization(req);

        async move {
            let user = state.gateway.authenticate(header.as_deref()).await?;
            Ok(Identity(user))
        }
        .boxed_local()
    }
}

/// Optional identity - `None` unless a valid token for a live account is sent.
///
/// Only authentication failures are absorbed; a failing account lookup
/// still fails the request.
pub struct OptionalIdentity(pub Option<User>);

impl FromRequest for OptionalIdentity {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let identity = Identity::from_request(req, payload);
        async move {
            match identity.await {
                Ok(Identity(user)) => Ok(OptionalIdentity(Some(user))),
                Err(AppError::Unauthorized(_)) => Ok(OptionalIdentity(None)),
                Err(err) => Err(err),
            }
        }
        .boxed_local()
    }
}
