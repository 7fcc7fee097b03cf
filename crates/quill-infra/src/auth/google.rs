//! Google OAuth 2.0 authorization-code client.
//!
//! CSRF protection uses a signed, short-lived `state` value instead of a
//! server-side session, so any instance can finish a login another started.

use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use quill_core::ports::{AuthError, ExternalProfile, IdentityProvider};

const AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";
const SCOPES: &str = "openid email profile";
const STATE_ISSUER: &str = "quill-oauth-state";
const STATE_TTL_MINUTES: i64 = 10;

/// Google client registration.
#[derive(Clone)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    pub callback_url: String,
}

impl std::fmt::Debug for GoogleConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("callback_url", &self.callback_url)
            .finish()
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct StateClaims {
    nonce: String,
    exp: i64,
    iss: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    sub: String,
    email: Option<String>,
    email_verified: Option<bool>,
    name: Option<String>,
    picture: Option<String>,
}

pub struct GoogleOAuthClient {
    config: GoogleConfig,
    http: reqwest::Client,
    state_encoding: EncodingKey,
    state_decoding: DecodingKey,
}

impl GoogleOAuthClient {
    /// `state_secret` signs the CSRF `state`; the JWT secret is a fine choice.
    pub fn new(config: GoogleConfig, state_secret: &str) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
            state_encoding: EncodingKey::from_secret(state_secret.as_bytes()),
            state_decoding: DecodingKey::from_secret(state_secret.as_bytes()),
        }
    }

    fn issue_state(&self) -> Result<String, AuthError> {
        let claims = StateClaims {
            nonce: Uuid::new_v4().simple().to_string(),
            exp: (Utc::now() + TimeDelta::minutes(STATE_TTL_MINUTES)).timestamp(),
            iss: STATE_ISSUER.to_string(),
        };
        encode(&Header::default(), &claims, &self.state_encoding)
            .map_err(|e| AuthError::Provider(e.to_string()))
    }

    fn check_state(&self, state: &str) -> Result<(), AuthError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[STATE_ISSUER]);
        decode::<StateClaims>(state, &self.state_decoding, &validation)
            .map(|_| ())
            .map_err(|e| AuthError::Provider(format!("invalid oauth state: {e}")))
    }

    async fn fetch_access_token(&self, code: &str) -> Result<String, AuthError> {
        let response = self
            .http
            .post(TOKEN_URL)
            .form(&[
                ("code", code),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("redirect_uri", self.config.callback_url.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))?
            .error_for_status()
            .map_err(|e| AuthError::Provider(format!("code exchange failed: {e}")))?;

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))?;
        Ok(token.access_token)
    }

    async fn fetch_user_info(&self, access_token: &str) -> Result<UserInfo, AuthError> {
        self.http
            .get(USERINFO_URL)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))?
            .error_for_status()
            .map_err(|e| AuthError::Provider(format!("userinfo request failed: {e}")))?
            .json()
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))
    }
}

#[async_trait]
impl IdentityProvider for GoogleOAuthClient {
    fn authorization_url(&self) -> Result<String, AuthError> {
        let state = self.issue_state()?;
        let url = Url::parse_with_params(
            AUTHORIZE_URL,
            &[
                ("client_id", self.config.client_id.as_str()),
                ("redirect_uri", self.config.callback_url.as_str()),
                ("response_type", "code"),
                ("scope", SCOPES),
                ("state", state.as_str()),
            ],
        )
        .map_err(|e| AuthError::Provider(e.to_string()))?;
        Ok(url.into())
    }

    async fn exchange_code(&self, code: &str, state: &str) -> Result<ExternalProfile, AuthError> {
        self.check_state(state)?;

        let access_token = self.fetch_access_token(code).await?;
        let info = self.fetch_user_info(&access_token).await?;
        profile_from_user_info(info)
    }
}

fn profile_from_user_info(info: UserInfo) -> Result<ExternalProfile, AuthError> {
    let email = info
        .email
        .filter(|e| !e.trim().is_empty())
        .ok_or_else(|| AuthError::Provider("account has no email address".to_string()))?;
    if info.email_verified == Some(false) {
        return Err(AuthError::Provider("email address is not verified".to_string()));
    }

    Ok(ExternalProfile {
        provider_id: info.sub,
        name: info.name.unwrap_or_default(),
        email,
        avatar: info.picture,
    })
}
