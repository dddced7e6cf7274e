//! User registration.

use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use regex::Regex;
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    directory::{CreateOutcome, NewUser},
    state::AuthState,
    types::{ErrorResponse, RegisterRequest, UserRecord},
};
use crate::api::handlers::{error::ServiceError, valid_email};

const MIN_PASSWORD_CHARS: usize = 8;

/// Usernames are 3-32 characters of letters, digits, `_`, `.` or `-`.
pub fn valid_username(username: &str) -> bool {
    Regex::new(r"^[A-Za-z0-9_.-]{3,32}$").is_ok_and(|re| re.is_match(username))
}

pub fn valid_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_CHARS
}

/// Normalized registration input; all checks pass before anything is persisted.
fn validate(request: RegisterRequest) -> Result<RegisterRequest, ServiceError> {
    let username = request.username.trim().to_string();
    let email = request.email.trim().to_lowercase();

    if !valid_username(&username) {
        return Err(ServiceError::bad_request(
            "username must be 3-32 characters of letters, digits, '_', '.' or '-'",
        ));
    }
    if !valid_email(&email) {
        return Err(ServiceError::bad_request("invalid email address"));
    }
    if !valid_password(&request.password) {
        return Err(ServiceError::bad_request(format!(
            "password must be at least {MIN_PASSWORD_CHARS} characters"
        )));
    }

    Ok(RegisterRequest {
        username,
        email,
        ..request
    })
}

#[utoipa::path(
    post,
    path = "/api/users",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created", body = UserRecord),
        (status = 400, description = "Validation failed or user already exists", body = ErrorResponse),
        (status = 500, description = "Internal error", body = ErrorResponse)
    ),
    tag = "users"
)]
#[instrument(skip_all)]
pub async fn register(
    auth_state: Extension<Arc<AuthState>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Response {
    match create(&auth_state, payload).await {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn create(
    auth_state: &AuthState,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<UserRecord, ServiceError> {
    let Json(request) = payload?;
    let request = validate(request)?;

    let hasher = auth_state.hasher().clone();
    let password = request.password;
    let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
        .await
        .map_err(|err| ServiceError::Internal(err.into()))?
        .map_err(|err| ServiceError::Internal(err.into()))?;

    let outcome = auth_state
        .verifier()
        .directory()
        .create_user(NewUser {
            username: request.username,
            email: request.email,
            password_hash,
            role_id: request.role_id,
        })
        .await
        .map_err(ServiceError::Internal)?;

    match outcome {
        CreateOutcome::Created(record) => {
            info!(user = %record.username, "User registered");
            Ok(record)
        }
        CreateOutcome::Conflict => Err(ServiceError::bad_request(
            "username or email already registered",
        )),
        CreateOutcome::UnknownRole => Err(ServiceError::bad_request("unknown role")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(username: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            role_id: None,
        }
    }

    #[test]
    fn username_rules() {
        assert!(valid_username("ana"));
        assert!(valid_username("ana.maria_99-x"));
        assert!(!valid_username("an"));
        assert!(!valid_username(&"a".repeat(33)));
        assert!(!valid_username("ana maria"));
        assert!(!valid_username("ana@home"));
    }

    #[test]
    fn password_rules_count_characters() {
        assert!(valid_password("12345678"));
        assert!(!valid_password("1234567"));
        assert!(valid_password("ñandúñandú"));
    }

    #[test]
    fn validate_trims_and_lowercases() {
        let Ok(normalized) = validate(request("  ana ", " Ana@Example.COM ", "long enough")) else {
            panic!("valid request rejected");
        };
        assert_eq!(normalized.username, "ana");
        assert_eq!(normalized.email, "ana@example.com");
    }

    #[test]
    fn validate_rejects_each_bad_field() {
        assert!(matches!(
            validate(request("a", "ana@example.com", "long enough")),
            Err(ServiceError::BadRequest(_))
        ));
        assert!(matches!(
            validate(request("ana", "not-an-email", "long enough")),
            Err(ServiceError::BadRequest(_))
        ));
        assert!(matches!(
            validate(request("ana", "ana@example.com", "short")),
            Err(ServiceError::BadRequest(_))
        ));
    }
}
