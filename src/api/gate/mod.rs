//! Request admission for page routes.
//!
//! Every non-API page request goes through [`admission_gate`], which runs three
//! steps in a fixed order:
//!
//! 1. Resolve the locale from the path, the locale cookie, `Accept-Language`,
//!    or the configured default. Paths without a locale prefix are rewritten to
//!    `/{locale}{path}`.
//! 2. Admit public pages (`/login`, `/register`, `/forgot-password`) regardless
//!    of any session.
//! 3. Otherwise require a valid session cookie, redirecting to the
//!    locale-qualified login page when it is missing, invalid or expired.
//!
//! API routes get [`require_session`] instead, which answers `401` rather than
//! redirecting.

pub mod locale;

pub use locale::Locale;

use axum::{
    extract::{Request, State},
    http::{
        HeaderMap, HeaderValue, StatusCode, Uri,
        header::{LOCATION, SET_COOKIE},
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{debug, error};

use crate::api::handlers::{
    auth::{
        AuthState, Identity, SessionKeys,
        session::{extract_session_token, unix_now},
    },
    error::ServiceError,
};
use locale::{LOCALE_COOKIE_NAME, LocaleSource, cookie_locale, resolve, split_locale};

const PUBLIC_PAGES: [&str; 3] = ["/login", "/register", "/forgot-password"];
const LOCALE_COOKIE_MAX_AGE: i64 = 365 * 24 * 60 * 60;

/// Outcome of the gate for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    Admit {
        /// Locale-qualified path the request is routed to.
        path: String,
        /// Signed-in user; `None` only on public pages.
        identity: Option<Identity>,
    },
    Redirect {
        location: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub locale: Locale,
    pub source: LocaleSource,
    pub admission: Admission,
}

/// File extensions served as static assets.
const ASSET_EXTENSIONS: &[&str] = &[
    "css", "js", "mjs", "map", "ico", "png", "jpg", "jpeg", "gif", "svg", "webp", "woff",
    "woff2", "ttf", "txt", "webmanifest",
];

/// Paths the gate never handles: the API, health checks, docs and static assets.
///
/// Locale-prefixed paths are pages and always go through the gate, whatever
/// their last segment looks like.
#[must_use]
pub fn is_bypassed(path: &str) -> bool {
    if path == "/api" || path.starts_with("/api/") || path == "/health" {
        return true;
    }
    if split_locale(path).is_some() {
        return false;
    }
    path.rsplit('/')
        .next()
        .and_then(|last| last.rsplit_once('.'))
        .is_some_and(|(stem, ext)| {
            !stem.is_empty() && ASSET_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())
        })
}

/// Locale-stripped path equals a public page, trailing slash tolerated.
#[must_use]
pub fn is_public(path: &str) -> bool {
    let trimmed = if path.len() > 1 {
        path.trim_end_matches('/')
    } else {
        path
    };
    PUBLIC_PAGES.contains(&trimmed)
}

/// Decide whether a page request is admitted or redirected to login.
#[must_use]
pub fn decide(
    uri: &Uri,
    headers: &HeaderMap,
    keys: &SessionKeys,
    default_locale: Locale,
    now_unix_seconds: i64,
) -> Decision {
    let path = uri.path();
    let (locale, source) = resolve(path, headers, default_locale);

    let (stripped, qualified) = match split_locale(path) {
        Some((_, rest)) => (rest.to_string(), path.to_string()),
        None => {
            let qualified = if path == "/" {
                format!("/{locale}")
            } else {
                format!("/{locale}{path}")
            };
            (path.to_string(), qualified)
        }
    };

    if is_public(&stripped) {
        return Decision {
            locale,
            source,
            admission: Admission::Admit {
                path: qualified,
                identity: None,
            },
        };
    }

    let identity = extract_session_token(headers)
        .ok_or_else(|| "no session cookie".to_string())
        .and_then(|token| {
            keys.verify(&token, now_unix_seconds)
                .map_err(|err| err.to_string())
        });

    let admission = match identity {
        Ok(claims) => Admission::Admit {
            path: qualified,
            identity: Some(Identity::from(claims)),
        },
        Err(reason) => {
            debug!("Redirecting to login: {reason}");
            let callback = match uri.query() {
                Some(query) => format!("{qualified}?{query}"),
                None => qualified,
            };
            let query = url::form_urlencoded::Serializer::new(String::new())
                .append_pair("callbackUrl", &callback)
                .finish();
            Admission::Redirect {
                location: format!("/{locale}/login?{query}"),
            }
        }
    };

    Decision {
        locale,
        source,
        admission,
    }
}

/// Page middleware: locale resolution, public-path check, session check.
pub async fn admission_gate(
    State(auth_state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    if is_bypassed(request.uri().path()) {
        return next.run(request).await;
    }

    let decision = decide(
        request.uri(),
        request.headers(),
        auth_state.keys(),
        auth_state.config().default_locale(),
        unix_now(),
    );
    let cookie_is_current = cookie_locale(request.headers()) == Some(decision.locale);

    match decision.admission {
        Admission::Admit { path, identity } => {
            if path != request.uri().path() {
                match rewrite_uri(request.uri(), &path) {
                    Ok(uri) => *request.uri_mut() = uri,
                    Err(err) => {
                        error!("Failed to rewrite request path {path}: {err}");
                        return ServiceError::bad_request("invalid path").into_response();
                    }
                }
            }
            if let Some(identity) = identity {
                request.extensions_mut().insert(identity);
            }
            request.extensions_mut().insert(decision.locale);

            let mut response = next.run(request).await;
            if !cookie_is_current
                && let Ok(cookie) = locale_cookie(decision.locale)
            {
                response.headers_mut().append(SET_COOKIE, cookie);
            }
            response
        }
        Admission::Redirect { location } => match HeaderValue::from_str(&location) {
            Ok(location) => (StatusCode::TEMPORARY_REDIRECT, [(LOCATION, location)]).into_response(),
            Err(err) => {
                error!("Invalid redirect location: {err}");
                ServiceError::bad_request("invalid path").into_response()
            }
        },
    }
}

/// API middleware: a valid session or `401 {"error": "unauthorized"}`.
pub async fn require_session(
    State(auth_state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    match crate::api::handlers::auth::authenticate(
        request.headers(),
        auth_state.keys(),
        unix_now(),
    ) {
        Ok(identity) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(err) => {
            debug!("Rejected API request: {err}");
            ServiceError::Unauthorized.into_response()
        }
    }
}

fn rewrite_uri(uri: &Uri, path: &str) -> Result<Uri, axum::http::Error> {
    let path_and_query = match uri.query() {
        Some(query) => format!("{path}?{query}"),
        None => path.to_string(),
    };
    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(path_and_query.parse()?);
    Ok(Uri::from_parts(parts)?)
}

fn locale_cookie(locale: Locale) -> Result<HeaderValue, axum::http::header::InvalidHeaderValue> {
    HeaderValue::from_str(&format!(
        "{LOCALE_COOKIE_NAME}={locale}; Path=/; SameSite=Lax; Max-Age={LOCALE_COOKIE_MAX_AGE}"
    ))
}
