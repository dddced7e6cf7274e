//! Username/password verification.

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use super::{
    directory::UserDirectory,
    password::{PasswordError, PasswordHasher, verify_password},
    types::Identity,
};

const DUMMY_PASSWORD: &str = "facturo-dummy-password";

#[derive(Debug, Error)]
pub enum CredentialError {
    /// Unknown user, wrong password and missing password all map here.
    #[error("incorrect username or password")]
    InvalidCredentials,
    #[error("user directory unavailable")]
    Directory(#[source] anyhow::Error),
    #[error("password verification task failed")]
    Verification,
}

/// Checks submitted credentials against the user directory.
pub struct CredentialVerifier {
    directory: Arc<dyn UserDirectory>,
    dummy_hash: String,
}

impl CredentialVerifier {
    /// # Errors
    /// Returns an error if the dummy hash used for unknown users cannot be computed.
    pub fn new(
        directory: Arc<dyn UserDirectory>,
        hasher: &PasswordHasher,
    ) -> Result<Self, PasswordError> {
        Ok(Self {
            directory,
            dummy_hash: hasher.hash(DUMMY_PASSWORD)?,
        })
    }

    #[must_use]
    pub fn directory(&self) -> &dyn UserDirectory {
        self.directory.as_ref()
    }

    /// Verify `(username, password)` and return the sanitized identity.
    ///
    /// Unknown users still pay for a full hash verification against a dummy
    /// hash, so both failure modes cost the same.
    ///
    /// # Errors
    /// Returns [`CredentialError::InvalidCredentials`] for any rejection and
    /// [`CredentialError::Directory`] when the lookup itself fails.
    pub async fn verify(
        &self,
        username: &str,
        password: Option<&str>,
    ) -> Result<Identity, CredentialError> {
        let Some(password) = password.filter(|password| !password.is_empty()) else {
            return Err(CredentialError::InvalidCredentials);
        };

        let user = self
            .directory
            .find_by_username(username)
            .await
            .map_err(CredentialError::Directory)?;

        let hash = user
            .as_ref()
            .map_or_else(|| self.dummy_hash.clone(), |user| user.password_hash.clone());
        let password = password.to_string();
        let matches = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|_| CredentialError::Verification)?;

        match (user, matches) {
            (Some(user), Ok(true)) => Ok(Identity {
                id: user.id.to_string(),
                username: user.username,
                role: user.role,
            }),
            (Some(user), Err(err)) => {
                warn!("Stored password hash for {} is unreadable: {err}", user.username);
                Err(CredentialError::InvalidCredentials)
            }
            _ => {
                debug!("Credential check failed");
                Err(CredentialError::InvalidCredentials)
            }
        }
    }
}
