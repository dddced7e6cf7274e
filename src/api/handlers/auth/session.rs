//! Session endpoints for cookie and bearer auth.

use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{AUTHORIZATION, COOKIE, InvalidHeaderValue, SET_COOKIE},
    },
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, instrument};

use super::{
    credentials::CredentialError,
    state::{AuthConfig, AuthState},
    token::{self, SessionKeys},
    types::{ErrorResponse, Identity, LoginRequest, SessionResponse},
};
use crate::api::handlers::error::ServiceError;

pub const SESSION_COOKIE_NAME: &str = "facturo_session";
const LOGIN_FAILED: &str = "incorrect username or password";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no session token")]
    Missing,
    #[error("invalid session token: {0}")]
    Invalid(#[from] token::Error),
}

pub(crate) fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in; session cookie set", body = SessionResponse),
        (status = 400, description = "Malformed request body", body = ErrorResponse),
        (status = 401, description = "Incorrect username or password", body = ErrorResponse),
        (status = 500, description = "Internal error", body = ErrorResponse)
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn login(
    auth_state: Extension<Arc<AuthState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return ServiceError::from(rejection).into_response(),
    };

    let identity = match auth_state
        .verifier()
        .verify(&request.username, request.password.as_deref())
        .await
    {
        Ok(identity) => identity,
        Err(CredentialError::InvalidCredentials) => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse {
                    error: LOGIN_FAILED.to_string(),
                }),
            )
                .into_response();
        }
        Err(err) => {
            return ServiceError::Internal(anyhow::Error::new(err)).into_response();
        }
    };

    let now = unix_now();
    let token = match auth_state.keys().issue(&identity, now) {
        Ok(token) => token,
        Err(err) => {
            error!("Failed to issue session token: {err}");
            return ServiceError::Internal(anyhow::Error::new(err)).into_response();
        }
    };

    let mut headers = HeaderMap::new();
    match session_cookie(auth_state.config(), auth_state.keys(), &token) {
        Ok(cookie) => {
            headers.insert(SET_COOKIE, cookie);
        }
        Err(err) => {
            error!("Failed to build session cookie: {err}");
            return ServiceError::Internal(anyhow::Error::new(err)).into_response();
        }
    }

    info!(user = %identity.username, "User signed in");
    let response = SessionResponse {
        expires_at: now + auth_state.keys().ttl_seconds(),
        user: identity,
    };
    (StatusCode::OK, headers, Json(response)).into_response()
}

#[utoipa::path(
    get,
    path = "/api/auth/session",
    responses(
        (status = 200, description = "Session is active", body = SessionResponse),
        (status = 204, description = "No active session")
    ),
    tag = "auth"
)]
pub async fn session(headers: HeaderMap, auth_state: Extension<Arc<AuthState>>) -> Response {
    let token = extract_bearer_token(&headers).or_else(|| extract_session_token(&headers));
    // Missing or bad tokens are treated as "no session" to avoid leaking auth state.
    let Some(token) = token else {
        return StatusCode::NO_CONTENT.into_response();
    };
    match auth_state.keys().verify(&token, unix_now()) {
        Ok(claims) => {
            let response = SessionResponse {
                expires_at: claims.exp,
                user: Identity::from(claims),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(err) => {
            debug!("Rejected session token: {err}");
            StatusCode::NO_CONTENT.into_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 204, description = "Session cleared")
    ),
    tag = "auth"
)]
pub async fn logout(auth_state: Extension<Arc<AuthState>>) -> Response {
    // Tokens are stateless; signing out means dropping the cookie.
    let mut response_headers = HeaderMap::new();
    if let Ok(cookie) = clear_session_cookie(auth_state.config()) {
        response_headers.insert(SET_COOKIE, cookie);
    }
    (StatusCode::NO_CONTENT, response_headers).into_response()
}

/// Resolve the session carried by the request into an identity.
///
/// Reads the session cookie, falling back to an `Authorization: Bearer` header.
///
/// # Errors
/// Returns [`SessionError::Missing`] when no token is present and
/// [`SessionError::Invalid`] when it fails verification or has expired.
pub fn authenticate(
    headers: &HeaderMap,
    keys: &SessionKeys,
    now_unix_seconds: i64,
) -> Result<Identity, SessionError> {
    let token = extract_session_token(headers)
        .or_else(|| extract_bearer_token(headers))
        .ok_or(SessionError::Missing)?;
    let claims = keys.verify(&token, now_unix_seconds)?;
    Ok(Identity::from(claims))
}

/// Build a `HttpOnly` cookie for the session token.
pub(super) fn session_cookie(
    config: &AuthConfig,
    keys: &SessionKeys,
    token: &str,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let ttl_seconds = keys.ttl_seconds();
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={ttl_seconds}"
    );
    // Only mark cookies secure when the app is served over HTTPS.
    if config.session_cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

fn clear_session_cookie(config: &AuthConfig) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if config.session_cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Value of the named cookie, if the request carries it.
pub(crate) fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|header| header.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|pair| {
            let (key, val) = pair.trim().split_once('=')?;
            (key.trim() == name).then(|| val.trim().to_string())
        })
}

pub(crate) fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    cookie_value(headers, SESSION_COOKIE_NAME).filter(|token| !token.is_empty())
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}
