//! Liveness endpoint reporting build info and database reachability.

use crate::GIT_COMMIT_HASH;
use axum::{
    body::Body,
    extract::Extension,
    http::{HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use sqlx::{Connection, PgPool};
use tracing::{Instrument, debug, error, info_span};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseStatus {
    Ok,
    Error,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct Health {
    commit: String,
    name: String,
    version: String,
    database: DatabaseStatus,
}

impl Health {
    fn current(database: DatabaseStatus) -> Self {
        Self {
            commit: GIT_COMMIT_HASH.to_string(),
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            database,
        }
    }

    /// `name:version:short_hash`
    fn x_app(&self) -> String {
        let short_hash = self.commit.get(..7).unwrap_or(&self.commit);
        format!("{}:{}:{}", self.name, self.version, short_hash)
    }
}

async fn ping(pool: &PgPool) -> DatabaseStatus {
    let acquire_span = info_span!(
        "db.acquire",
        db.system = "postgresql",
        db.operation = "ACQUIRE"
    );
    let mut conn = match pool.acquire().instrument(acquire_span).await {
        Ok(conn) => conn,
        Err(error) => {
            error!("Failed to acquire database connection: {}", error);
            return DatabaseStatus::Error;
        }
    };

    let ping_span = info_span!("db.ping", db.system = "postgresql", db.operation = "PING");
    match conn.ping().instrument(ping_span).await {
        Ok(()) => DatabaseStatus::Ok,
        Err(error) => {
            error!("Failed to ping database: {}", error);
            DatabaseStatus::Error
        }
    }
}

#[utoipa::path(
    get,
    path= "/health",
    responses (
        (status = 200, description = "Database is reachable", body = Health),
        (status = 503, description = "Database is unreachable", body = Health)
    ),
    tag= "health"
)]
pub async fn health(method: Method, Extension(pool): Extension<PgPool>) -> impl IntoResponse {
    let health = Health::current(ping(&pool).await);

    let mut headers = HeaderMap::new();
    match HeaderValue::from_str(&health.x_app()) {
        Ok(value) => {
            headers.insert("X-App", value);
        }
        Err(err) => error!("Failed to build X-App header: {}", err),
    }

    let status = match health.database {
        DatabaseStatus::Ok => StatusCode::OK,
        DatabaseStatus::Error => StatusCode::SERVICE_UNAVAILABLE,
    };
    debug!("Health check: {:?}", health.database);

    // OPTIONS only reports through the status line and X-App header
    if method == Method::GET {
        (status, headers, Json(health)).into_response()
    } else {
        (status, headers, Body::empty()).into_response()
    }
}
