//! Auth handlers and supporting modules.
//!
//! Users sign in with a username and password. The password is checked against
//! an Argon2id hash held in the user directory and, on success, a signed
//! session token is set as an `HttpOnly` cookie. Sessions are stateless: the
//! token is valid until its `exp` claim passes, and signing out only clears the
//! cookie.
//!
//! Both failure modes of a login (unknown user, wrong password) return the same
//! response and cost the same hash verification.

pub(crate) mod credentials;
pub(crate) mod directory;
pub(crate) mod password;
pub(crate) mod register;
pub(crate) mod session;
mod state;
pub(crate) mod token;
pub(crate) mod types;

pub use credentials::{CredentialError, CredentialVerifier};
pub use directory::{CreateOutcome, NewUser, PgUserDirectory, StoredUser, UserDirectory};
pub use password::PasswordHasher;
pub use session::{SessionError, authenticate};
pub use state::{AuthConfig, AuthState};
pub use token::SessionKeys;
pub use types::{Identity, UserRecord};

#[cfg(test)]
pub(crate) mod tests;
