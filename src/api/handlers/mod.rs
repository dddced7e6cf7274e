//! API handlers and shared utilities.
//!
//! `auth` covers sign-in, sessions and registration; `resources` holds the
//! CRUD endpoints for the billing records; `error` maps failures onto the
//! `{"error": ...}` JSON body every endpoint uses.

pub mod auth;
pub mod error;
pub mod health;
pub mod resources;

use regex::Regex;

/// Lightweight email sanity check used before persisting data.
pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email))
}
