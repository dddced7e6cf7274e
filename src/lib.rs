//! # Facturo (billing and invoicing administration)
//!
//! `facturo` serves the administrative back office for customers, invoices,
//! inventory, providers and companies. Business records are plain CRUD rows in
//! PostgreSQL; the part with actual rules is the request admission flow.
//!
//! ## Authentication
//!
//! Users sign in with a username and password. Passwords are stored as salted
//! Argon2id PHC strings and verified in constant time. A successful login mints
//! a stateless HS256 session token that travels as an `HttpOnly` cookie; nothing
//! about the session is stored server-side.
//!
//! Unknown usernames and wrong passwords produce the same response (and roughly
//! the same latency) so accounts cannot be enumerated through the login form.
//!
//! ## Admission Gate
//!
//! Every page request passes through the gate before reaching the page tree:
//!
//! 1. **Locale:** taken from the first path segment (`en` or `es`). Paths without
//!    one are rewritten internally using the locale cookie, `Accept-Language`,
//!    or the configured default.
//! 2. **Public pages:** `/login`, `/register` and `/forgot-password` are always
//!    admitted.
//! 3. **Session:** everything else needs a valid, unexpired session token or the
//!    request is redirected to the locale-qualified login page.
//!
//! API routes are not gated by redirects; protected endpoints answer `401` with a
//! JSON error body instead.

pub mod api;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
