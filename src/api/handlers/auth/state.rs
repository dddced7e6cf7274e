//! Auth state and configuration.

use super::{credentials::CredentialVerifier, password::PasswordHasher, token::SessionKeys};
use crate::api::gate::Locale;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    public_url: String,
    default_locale: Locale,
}

impl AuthConfig {
    #[must_use]
    pub fn new(public_url: String) -> Self {
        Self {
            public_url: public_url.trim_end_matches('/').to_string(),
            default_locale: Locale::default(),
        }
    }

    #[must_use]
    pub fn with_default_locale(mut self, locale: Locale) -> Self {
        self.default_locale = locale;
        self
    }

    #[must_use]
    pub fn public_url(&self) -> &str {
        &self.public_url
    }

    #[must_use]
    pub fn default_locale(&self) -> Locale {
        self.default_locale
    }

    pub(crate) fn session_cookie_secure(&self) -> bool {
        self.public_url.starts_with("https://")
    }
}

pub struct AuthState {
    config: AuthConfig,
    keys: SessionKeys,
    verifier: CredentialVerifier,
    hasher: PasswordHasher,
}

impl AuthState {
    pub fn new(
        config: AuthConfig,
        keys: SessionKeys,
        verifier: CredentialVerifier,
        hasher: PasswordHasher,
    ) -> Self {
        Self {
            config,
            keys,
            verifier,
            hasher,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn keys(&self) -> &SessionKeys {
        &self.keys
    }

    #[must_use]
    pub fn verifier(&self) -> &CredentialVerifier {
        &self.verifier
    }

    pub(crate) fn hasher(&self) -> &PasswordHasher {
        &self.hasher
    }
}
