//! Inventory items.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Postgres, postgres::PgArguments, query::QueryAs};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{Resource, non_negative, optional_text, required_text};
use crate::api::handlers::error::ServiceError;

#[derive(ToSchema, Serialize, Deserialize, FromRow, Debug, Clone)]
pub struct ProductRecord {
    pub id: Uuid,
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    /// Unit price in cents.
    pub price_cents: i64,
    pub stock: i32,
    pub category_id: Option<Uuid>,
    pub provider_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(ToSchema, Deserialize, Debug)]
pub struct ProductPayload {
    pub sku: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price_cents: i64,
    #[serde(default)]
    pub stock: i32,
    #[serde(default)]
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub provider_id: Option<Uuid>,
}

pub struct Product;

impl Resource for Product {
    const TABLE: &'static str = "products";
    const COLUMNS: &'static [&'static str] = &[
        "sku",
        "name",
        "description",
        "price_cents",
        "stock",
        "category_id",
        "provider_id",
    ];

    type Record = ProductRecord;
    type Payload = ProductPayload;

    fn validate(payload: Self::Payload) -> Result<Self::Payload, ServiceError> {
        non_negative("stock", i64::from(payload.stock))?;
        Ok(ProductPayload {
            sku: required_text("sku", &payload.sku, 64)?.to_uppercase(),
            name: required_text("name", &payload.name, 200)?,
            description: optional_text("description", payload.description, 2000)?,
            price_cents: non_negative("price_cents", payload.price_cents)?,
            stock: payload.stock,
            category_id: payload.category_id,
            provider_id: payload.provider_id,
        })
    }

    fn bind(
        payload: Self::Payload,
        query: QueryAs<'_, Postgres, Self::Record, PgArguments>,
    ) -> QueryAs<'_, Postgres, Self::Record, PgArguments> {
        query
            .bind(payload.sku)
            .bind(payload.name)
            .bind(payload.description)
            .bind(payload.price_cents)
            .bind(payload.stock)
            .bind(payload.category_id)
            .bind(payload.provider_id)
    }
}
