//! Stateless session tokens (HS256 JWT).
//!
//! The token is the whole session: nothing is stored server-side, so validity is
//! exactly "signature verifies and `exp` is in the future".

use base64ct::{Base64UrlUnpadded, Encoding};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;
use ulid::Ulid;

use super::types::Identity;

pub const TOKEN_VERSION: u8 = 1;
pub const MIN_SECRET_BYTES: usize = 32;
/// One year.
pub const MAX_TTL_SECONDS: i64 = 31_536_000;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionTokenHeader {
    pub alg: String,
    pub typ: String,
}

impl SessionTokenHeader {
    fn hs256() -> Self {
        Self {
            alg: "HS256".to_string(),
            typ: "JWT".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionClaims {
    pub v: u8,
    /// User id.
    pub sub: String,
    /// Username.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid token format")]
    TokenFormat,
    #[error("invalid base64url encoding")]
    Base64,
    #[error("invalid json")]
    Json(#[from] serde_json::Error),
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlg(String),
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("invalid token version")]
    InvalidVersion,
    #[error("session secret must be at least {MIN_SECRET_BYTES} bytes")]
    WeakSecret,
    #[error("session ttl must be between 1 and {MAX_TTL_SECONDS} seconds")]
    InvalidTtl,
    #[error("token expiry out of range")]
    ExpiryOverflow,
    #[error("invalid signing key")]
    InvalidKey,
}

fn b64e_json<T: Serialize>(value: &T) -> Result<String, Error> {
    let json = serde_json::to_vec(value)?;
    Ok(Base64UrlUnpadded::encode_string(&json))
}

fn b64d_json<T: for<'de> Deserialize<'de>>(s: &str) -> Result<T, Error> {
    let bytes = Base64UrlUnpadded::decode_vec(s).map_err(|_| Error::Base64)?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Signing material and lifetime for session tokens.
#[derive(Clone)]
pub struct SessionKeys {
    secret: SecretString,
    ttl_seconds: i64,
}

impl SessionKeys {
    /// # Errors
    /// Returns an error if the secret is shorter than [`MIN_SECRET_BYTES`] or the ttl is
    /// outside `1..=MAX_TTL_SECONDS`.
    pub fn new(secret: &SecretString, ttl_seconds: i64) -> Result<Self, Error> {
        if secret.expose_secret().len() < MIN_SECRET_BYTES {
            return Err(Error::WeakSecret);
        }
        if !(1..=MAX_TTL_SECONDS).contains(&ttl_seconds) {
            return Err(Error::InvalidTtl);
        }
        Ok(Self {
            secret: secret.clone(),
            ttl_seconds,
        })
    }

    #[must_use]
    pub fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    fn mac(&self) -> Result<HmacSha256, Error> {
        <HmacSha256 as Mac>::new_from_slice(self.secret.expose_secret().as_bytes())
            .map_err(|_| Error::InvalidKey)
    }

    /// Mint a token for `identity`, valid from `now_unix_seconds` for the configured ttl.
    ///
    /// # Errors
    /// Returns an error if the expiry overflows or the header or claims cannot be encoded.
    pub fn issue(&self, identity: &Identity, now_unix_seconds: i64) -> Result<String, Error> {
        let exp = now_unix_seconds
            .checked_add(self.ttl_seconds)
            .ok_or(Error::ExpiryOverflow)?;
        let claims = SessionClaims {
            v: TOKEN_VERSION,
            sub: identity.id.clone(),
            name: identity.username.clone(),
            role: identity.role.clone(),
            iat: now_unix_seconds,
            exp,
            jti: Ulid::new().to_string(),
        };
        self.sign(&claims)
    }

    /// Sign arbitrary claims, used by [`Self::issue`].
    ///
    /// # Errors
    /// Returns an error if the header or claims cannot be encoded.
    pub fn sign(&self, claims: &SessionClaims) -> Result<String, Error> {
        let header_b64 = b64e_json(&SessionTokenHeader::hs256())?;
        let claims_b64 = b64e_json(claims)?;
        let signing_input = format!("{header_b64}.{claims_b64}");

        let mut mac = self.mac()?;
        mac.update(signing_input.as_bytes());
        let signature_b64 = Base64UrlUnpadded::encode_string(&mac.finalize().into_bytes());

        Ok(format!("{signing_input}.{signature_b64}"))
    }

    /// Verify a session token and return its claims.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the token is malformed or contains invalid base64/json,
    /// - the algorithm is not HS256 or the signature does not match,
    /// - the claims fail validation (`v`, `exp`).
    pub fn verify(&self, token: &str, now_unix_seconds: i64) -> Result<SessionClaims, Error> {
        let mut parts = token.split('.');
        let header_b64 = parts.next().ok_or(Error::TokenFormat)?;
        let claims_b64 = parts.next().ok_or(Error::TokenFormat)?;
        let sig_b64 = parts.next().ok_or(Error::TokenFormat)?;
        if parts.next().is_some() {
            return Err(Error::TokenFormat);
        }

        let header: SessionTokenHeader = b64d_json(header_b64)?;
        if header.alg != "HS256" {
            return Err(Error::UnsupportedAlg(header.alg));
        }

        let signature = Base64UrlUnpadded::decode_vec(sig_b64).map_err(|_| Error::Base64)?;
        let mut mac = self.mac()?;
        mac.update(header_b64.as_bytes());
        mac.update(b".");
        mac.update(claims_b64.as_bytes());
        // verify_slice compares in constant time
        mac.verify_slice(&signature)
            .map_err(|_| Error::InvalidSignature)?;

        let claims: SessionClaims = b64d_json(claims_b64)?;
        if claims.v != TOKEN_VERSION {
            return Err(Error::InvalidVersion);
        }
        if claims.exp <= now_unix_seconds {
            return Err(Error::Expired);
        }

        Ok(claims)
    }
}

impl From<SessionClaims> for Identity {
    fn from(claims: SessionClaims) -> Self {
        Self {
            id: claims.sub,
            username: claims.name,
            role: claims.role,
        }
    }
}

impl std::fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionKeys")
            .field("secret", &"***")
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}
