use anyhow::Result;
use axum::{
    body::Body,
    http::{
        Method, Request, StatusCode,
        header::{AUTHORIZATION, CONTENT_TYPE, COOKIE},
    },
};
use serde_json::json;

use crate::api::{
    app,
    gate::Locale,
    tests::{
        TEST_PASSWORD, auth_state, body_json, directory_with_ana, expired_session_cookie, header,
        send, test_app, unreachable_pool, valid_session_cookie,
    },
};

use super::directory::memory::MemoryUserDirectory;

fn post_json(uri: &str, body: &serde_json::Value) -> Result<Request<Body>> {
    Ok(Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))?)
}

#[tokio::test]
async fn login_sets_session_cookie_and_returns_identity() -> Result<()> {
    let response = send(
        test_app()?,
        post_json(
            "/api/auth/login",
            &json!({"username": "ana", "password": TEST_PASSWORD}),
        )?,
    )
    .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = header(&response, "set-cookie").unwrap_or_default();
    assert!(cookie.starts_with("facturo_session="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));
    assert!(cookie.contains("Max-Age=3600"));

    let body = body_json(response).await?;
    assert_eq!(body["user"]["username"], "ana");
    assert_eq!(body["user"]["role"], "admin");
    assert!(body["user"].get("password").is_none());
    assert!(body["user"].get("password_hash").is_none());
    assert!(body["expires_at"].is_i64());
    Ok(())
}

#[tokio::test]
async fn login_failures_are_indistinguishable() -> Result<()> {
    let wrong_password = send(
        test_app()?,
        post_json(
            "/api/auth/login",
            &json!({"username": "ana", "password": "not the password"}),
        )?,
    )
    .await?;
    let unknown_user = send(
        test_app()?,
        post_json(
            "/api/auth/login",
            &json!({"username": "nobody", "password": TEST_PASSWORD}),
        )?,
    )
    .await?;
    let padded_username = send(
        test_app()?,
        post_json(
            "/api/auth/login",
            &json!({"username": " ana ", "password": TEST_PASSWORD}),
        )?,
    )
    .await?;
    let missing_password = send(
        test_app()?,
        post_json("/api/auth/login", &json!({"username": "ana"}))?,
    )
    .await?;

    for response in [wrong_password, unknown_user, padded_username, missing_password] {
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(header(&response, "set-cookie").is_none());
        assert_eq!(
            body_json(response).await?,
            json!({"error": "incorrect username or password"})
        );
    }
    Ok(())
}

#[tokio::test]
async fn login_rejects_malformed_body() -> Result<()> {
    let response = send(
        test_app()?,
        Request::builder()
            .method(Method::POST)
            .uri("/api/auth/login")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from("username=ana"))?,
    )
    .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await?["error"].is_string());
    Ok(())
}

#[tokio::test]
async fn login_directory_failure_is_internal_error() -> Result<()> {
    let router = app(
        auth_state(MemoryUserDirectory::failing(), Locale::En)?,
        unreachable_pool()?,
    );
    let response = send(
        router,
        post_json(
            "/api/auth/login",
            &json!({"username": "ana", "password": TEST_PASSWORD}),
        )?,
    )
    .await?;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    Ok(())
}

#[tokio::test]
async fn session_reports_active_and_missing() -> Result<()> {
    let response = send(
        test_app()?,
        Request::builder()
            .uri("/api/auth/session")
            .header(COOKIE, valid_session_cookie()?)
            .body(Body::empty())?,
    )
    .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await?["user"]["username"], "ana");

    let response = send(
        test_app()?,
        Request::builder()
            .uri("/api/auth/session")
            .body(Body::empty())?,
    )
    .await?;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(
        test_app()?,
        Request::builder()
            .uri("/api/auth/session")
            .header(COOKIE, expired_session_cookie()?)
            .body(Body::empty())?,
    )
    .await?;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    Ok(())
}

#[tokio::test]
async fn session_accepts_bearer_token() -> Result<()> {
    let cookie = valid_session_cookie()?;
    let token = cookie
        .split_once('=')
        .map(|(_, token)| token.to_string())
        .unwrap_or_default();
    let response = send(
        test_app()?,
        Request::builder()
            .uri("/api/auth/session")
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())?,
    )
    .await?;
    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn logout_clears_cookie() -> Result<()> {
    let response = send(
        test_app()?,
        Request::builder()
            .method(Method::POST)
            .uri("/api/auth/logout")
            .header(COOKIE, valid_session_cookie()?)
            .body(Body::empty())?,
    )
    .await?;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let cookie = header(&response, "set-cookie").unwrap_or_default();
    assert!(cookie.starts_with("facturo_session=;"));
    assert!(cookie.contains("Max-Age=0"));
    Ok(())
}

#[tokio::test]
async fn register_then_sign_in() -> Result<()> {
    let router = app(
        auth_state(directory_with_ana()?, Locale::En)?,
        unreachable_pool()?,
    );

    let response = send(
        router.clone(),
        post_json(
            "/api/users",
            &json!({"username": "beto", "email": "Beto@Example.com", "password": "long enough"}),
        )?,
    )
    .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await?;
    assert_eq!(body["username"], "beto");
    assert_eq!(body["email"], "beto@example.com");
    assert!(body.get("password").is_none());
    assert!(body.get("password_hash").is_none());

    let response = send(
        router.clone(),
        post_json(
            "/api/auth/login",
            &json!({"username": "beto", "password": "long enough"}),
        )?,
    )
    .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(
        router,
        post_json(
            "/api/users",
            &json!({"username": "beto", "email": "other@example.com", "password": "long enough"}),
        )?,
    )
    .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await?["error"],
        "username or email already registered"
    );
    Ok(())
}

#[tokio::test]
async fn register_validates_before_persisting() -> Result<()> {
    for body in [
        json!({"username": "b", "email": "b@example.com", "password": "long enough"}),
        json!({"username": "beto", "email": "nope", "password": "long enough"}),
        json!({"username": "beto", "email": "b@example.com", "password": "short"}),
    ] {
        let response = send(test_app()?, post_json("/api/users", &body)?).await?;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(response).await?["error"].is_string());
    }
    Ok(())
}
