//! Page shells served behind the admission gate.
//!
//! The UI bundle is served elsewhere; these routes only answer with a minimal
//! document carrying the resolved locale, the page name and the signed-in user.

use axum::{
    Extension, Router,
    extract::{OriginalUri, Path},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};

use super::{
    gate::Locale,
    handlers::{auth::Identity, error::ServiceError},
};

const HOME_PAGE: &str = "dashboard";

/// First path segment of every page the UI knows about.
pub const PAGES: [&str; 12] = [
    "login",
    "register",
    "forgot-password",
    "dashboard",
    "customers",
    "invoices",
    "products",
    "providers",
    "companies",
    "addresses",
    "categories",
    "roles",
];

pub fn router() -> Router {
    Router::new()
        .route("/{locale}", get(home))
        .route("/{locale}/", get(home))
        .route("/{locale}/{*page}", get(page))
        .fallback(not_found)
}

async fn home(OriginalUri(uri): OriginalUri, Path(locale): Path<String>) -> Response {
    match locale.parse::<Locale>() {
        Ok(locale) => Redirect::temporary(&format!("/{locale}/{HOME_PAGE}")).into_response(),
        Err(()) => missing(uri.path(), Locale::default()),
    }
}

async fn page(
    OriginalUri(uri): OriginalUri,
    Path((locale, page)): Path<(String, String)>,
    identity: Option<Extension<Identity>>,
) -> Response {
    let Ok(locale) = locale.parse::<Locale>() else {
        return missing(uri.path(), Locale::default());
    };
    let identity = identity.map(|Extension(identity)| identity);
    let name = page.trim_end_matches('/');
    let section = name.split('/').next().unwrap_or_default();

    if PAGES.contains(&section) {
        shell(StatusCode::OK, locale, name, identity.as_ref())
    } else {
        shell(StatusCode::NOT_FOUND, locale, "not-found", identity.as_ref())
    }
}

async fn not_found(
    OriginalUri(uri): OriginalUri,
    locale: Option<Extension<Locale>>,
) -> Response {
    let locale = locale.map_or_else(Locale::default, |Extension(locale)| locale);
    missing(uri.path(), locale)
}

/// Unknown API paths answer in JSON, anything else with the not-found shell.
fn missing(path: &str, locale: Locale) -> Response {
    if path == "/api" || path.starts_with("/api/") {
        ServiceError::NotFound.into_response()
    } else {
        shell(StatusCode::NOT_FOUND, locale, "not-found", None)
    }
}

fn shell(status: StatusCode, locale: Locale, page: &str, identity: Option<&Identity>) -> Response {
    let user = identity.map_or_else(String::new, |identity| {
        format!(" data-user=\"{}\"", escape(&identity.username))
    });
    let body = format!(
        "<!doctype html>\n<html lang=\"{locale}\">\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n<body data-page=\"{page}\"{user}><div id=\"app\"></div></body>\n</html>\n",
        title = env!("CARGO_PKG_NAME"),
        page = escape(page),
    );
    (status, Html(body)).into_response()
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}
