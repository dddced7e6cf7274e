use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Postgres, postgres::PgArguments, query::QueryAs};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{Resource, optional_text, required_text};
use crate::api::handlers::error::ServiceError;

#[derive(ToSchema, Serialize, Deserialize, FromRow, Debug, Clone)]
pub struct AddressRecord {
    pub id: Uuid,
    pub street: String,
    pub city: String,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(ToSchema, Deserialize, Debug)]
pub struct AddressPayload {
    pub street: String,
    pub city: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    pub country: String,
}

pub struct Address;

impl Resource for Address {
    const TABLE: &'static str = "addresses";
    const COLUMNS: &'static [&'static str] = &["street", "city", "state", "postal_code", "country"];

    type Record = AddressRecord;
    type Payload = AddressPayload;

    fn validate(payload: Self::Payload) -> Result<Self::Payload, ServiceError> {
        Ok(AddressPayload {
            street: required_text("street", &payload.street, 200)?,
            city: required_text("city", &payload.city, 100)?,
            state: optional_text("state", payload.state, 100)?,
            postal_code: optional_text("postal_code", payload.postal_code, 20)?,
            country: required_text("country", &payload.country, 100)?,
        })
    }

    fn bind(
        payload: Self::Payload,
        query: QueryAs<'_, Postgres, Self::Record, PgArguments>,
    ) -> QueryAs<'_, Postgres, Self::Record, PgArguments> {
        query
            .bind(payload.street)
            .bind(payload.city)
            .bind(payload.state)
            .bind(payload.postal_code)
            .bind(payload.country)
    }
}
