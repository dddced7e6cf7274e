//! Supported locales and per-request locale resolution.

use axum::http::{HeaderMap, header::ACCEPT_LANGUAGE};
use std::{fmt, str::FromStr};

use crate::api::handlers::auth::session::cookie_value;

pub const LOCALE_COOKIE_NAME: &str = "facturo_locale";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    En,
    Es,
}

impl Locale {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Es => "es",
        }
    }
}

impl FromStr for Locale {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "en" => Ok(Self::En),
            "es" => Ok(Self::Es),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the resolved locale came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocaleSource {
    Path,
    Cookie,
    AcceptLanguage,
    Default,
}

/// Split a leading locale segment off `path`.
///
/// `/es/invoices` yields `(Es, "/invoices")` and `/es` yields `(Es, "/")`.
#[must_use]
pub fn split_locale(path: &str) -> Option<(Locale, &str)> {
    let rest = path.strip_prefix('/')?;
    let (segment, tail) = match rest.find('/') {
        Some(index) => (&rest[..index], &rest[index..]),
        None => (rest, "/"),
    };
    let locale = segment.parse().ok()?;
    Some((locale, tail))
}

/// First supported language in an `Accept-Language` header, by quality.
#[must_use]
pub fn from_accept_language(value: &str) -> Option<Locale> {
    let mut ranges: Vec<(f32, Locale)> = value
        .split(',')
        .filter_map(|entry| {
            let mut params = entry.trim().split(';');
            let tag = params.next()?.trim();
            let quality = params
                .find_map(|param| param.trim().strip_prefix("q="))
                .map_or(Some(1.0), |q| q.trim().parse::<f32>().ok())?;
            if quality <= 0.0 {
                return None;
            }
            let primary = tag.split('-').next()?.to_ascii_lowercase();
            let locale = primary.parse().ok()?;
            Some((quality, locale))
        })
        .collect();
    // stable: equal weights keep header order
    ranges.sort_by(|a, b| b.0.total_cmp(&a.0));
    ranges.first().map(|(_, locale)| *locale)
}

/// Resolve the request locale: path segment, then cookie, then
/// `Accept-Language`, then `default`.
#[must_use]
pub fn resolve(path: &str, headers: &HeaderMap, default: Locale) -> (Locale, LocaleSource) {
    if let Some((locale, _)) = split_locale(path) {
        return (locale, LocaleSource::Path);
    }
    if let Some(locale) = cookie_locale(headers) {
        return (locale, LocaleSource::Cookie);
    }
    if let Some(locale) = headers
        .get(ACCEPT_LANGUAGE)
        .and_then(|value| value.to_str().ok())
        .and_then(from_accept_language)
    {
        return (locale, LocaleSource::AcceptLanguage);
    }
    (default, LocaleSource::Default)
}

pub(crate) fn cookie_locale(headers: &HeaderMap) -> Option<Locale> {
    cookie_value(headers, LOCALE_COOKIE_NAME).and_then(|value| value.parse().ok())
}
