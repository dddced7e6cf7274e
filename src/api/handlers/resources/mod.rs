//! CRUD endpoints for the billing records.
//!
//! Each record type implements [`Resource`] and gets the same five routes:
//!
//! - `GET /api/{table}` lists all rows, newest first.
//! - `POST /api/{table}` validates and inserts, answering `201`.
//! - `GET /api/{table}/{id}` fetches one row or `404`.
//! - `PUT /api/{table}/{id}` replaces every writable column or `404`.
//! - `DELETE /api/{table}/{id}` deletes and returns the deleted row or `404`.
//!
//! Constraint violations (unique, foreign key, not null, check) surface as `400`.

pub mod addresses;
pub mod catalog;
pub mod invoices;
pub mod parties;
pub mod products;
pub(crate) mod storage;

use axum::{
    Json, Router,
    extract::{
        Extension, Path,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    routing::get,
};
use serde::{Serialize, de::DeserializeOwned};
use sqlx::{
    FromRow, PgPool, Postgres,
    postgres::{PgArguments, PgRow},
    query::QueryAs,
};
use uuid::Uuid;

use super::{error::ServiceError, valid_email};

/// A table exposed through the generic CRUD handlers.
pub trait Resource: Send + Sync + 'static {
    /// Table name, also the route segment.
    const TABLE: &'static str;
    /// Writable columns, in the order [`Resource::bind`] binds them.
    const COLUMNS: &'static [&'static str];

    type Record: for<'r> FromRow<'r, PgRow> + Serialize + Send + Unpin + 'static;
    type Payload: DeserializeOwned + Send + 'static;

    /// Check and normalize a payload before it is written.
    ///
    /// # Errors
    /// Returns [`ServiceError::BadRequest`] describing the first invalid field.
    fn validate(payload: Self::Payload) -> Result<Self::Payload, ServiceError>;

    /// Bind the payload's values in [`Resource::COLUMNS`] order.
    fn bind(
        payload: Self::Payload,
        query: QueryAs<'_, Postgres, Self::Record, PgArguments>,
    ) -> QueryAs<'_, Postgres, Self::Record, PgArguments>;
}

/// Routes for one resource under `/api/{table}`.
pub fn routes<R: Resource>() -> Router {
    Router::new()
        .route(
            &format!("/api/{}", R::TABLE),
            get(list::<R>).post(create::<R>),
        )
        .route(
            &format!("/api/{}/{{id}}", R::TABLE),
            get(show::<R>).put(update::<R>).delete(destroy::<R>),
        )
}

/// Routes for every billing record.
pub fn router() -> Router {
    Router::new()
        .merge(routes::<catalog::Role>())
        .merge(routes::<catalog::Category>())
        .merge(routes::<addresses::Address>())
        .merge(routes::<parties::Company>())
        .merge(routes::<parties::Provider>())
        .merge(routes::<parties::Customer>())
        .merge(routes::<products::Product>())
        .merge(routes::<invoices::Invoice>())
}

fn record_id(id: Result<Path<String>, PathRejection>) -> Result<Uuid, ServiceError> {
    let Path(id) = id.map_err(|_| ServiceError::bad_request("invalid id"))?;
    Uuid::parse_str(&id).map_err(|_| ServiceError::bad_request("invalid id"))
}

async fn list<R: Resource>(
    Extension(pool): Extension<PgPool>,
) -> Result<Json<Vec<R::Record>>, ServiceError> {
    Ok(Json(storage::list::<R>(&pool).await?))
}

async fn show<R: Resource>(
    Extension(pool): Extension<PgPool>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<R::Record>, ServiceError> {
    let id = record_id(id)?;
    storage::fetch::<R>(&pool, id)
        .await?
        .map(Json)
        .ok_or(ServiceError::NotFound)
}

async fn create<R: Resource>(
    Extension(pool): Extension<PgPool>,
    payload: Result<Json<R::Payload>, JsonRejection>,
) -> Result<(StatusCode, Json<R::Record>), ServiceError> {
    let Json(payload) = payload?;
    let payload = R::validate(payload)?;
    let record = storage::insert::<R>(&pool, payload).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn update<R: Resource>(
    Extension(pool): Extension<PgPool>,
    id: Result<Path<String>, PathRejection>,
    payload: Result<Json<R::Payload>, JsonRejection>,
) -> Result<Json<R::Record>, ServiceError> {
    let id = record_id(id)?;
    let Json(payload) = payload?;
    let payload = R::validate(payload)?;
    storage::update::<R>(&pool, id, payload)
        .await?
        .map(Json)
        .ok_or(ServiceError::NotFound)
}

async fn destroy<R: Resource>(
    Extension(pool): Extension<PgPool>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<R::Record>, ServiceError> {
    let id = record_id(id)?;
    storage::delete::<R>(&pool, id)
        .await?
        .map(Json)
        .ok_or(ServiceError::NotFound)
}

/// Trimmed, non-empty text no longer than `max` characters.
pub(crate) fn required_text(field: &str, value: &str, max: usize) -> Result<String, ServiceError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ServiceError::bad_request(format!("{field} is required")));
    }
    if value.chars().count() > max {
        return Err(ServiceError::bad_request(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(value.to_string())
}

/// Trimmed optional text; blank becomes `None`.
pub(crate) fn optional_text(
    field: &str,
    value: Option<String>,
    max: usize,
) -> Result<Option<String>, ServiceError> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => required_text(field, value, max).map(Some),
    }
}

pub(crate) fn optional_email(value: Option<String>) -> Result<Option<String>, ServiceError> {
    let email = optional_text("email", value, 254)?.map(|email| email.to_lowercase());
    match email {
        Some(email) if !valid_email(&email) => Err(ServiceError::bad_request("invalid email address")),
        email => Ok(email),
    }
}

pub(crate) fn non_negative(field: &str, value: i64) -> Result<i64, ServiceError> {
    if value < 0 {
        Err(ServiceError::bad_request(format!("{field} must not be negative")))
    } else {
        Ok(value)
    }
}
