//! Roles and product categories: a name plus an optional description.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Postgres, postgres::PgArguments, query::QueryAs};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{Resource, optional_text, required_text};
use crate::api::handlers::error::ServiceError;

#[derive(ToSchema, Serialize, Deserialize, FromRow, Debug, Clone)]
pub struct NamedRecord {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(ToSchema, Deserialize, Debug)]
pub struct NamedPayload {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

fn validate_named(payload: NamedPayload) -> Result<NamedPayload, ServiceError> {
    Ok(NamedPayload {
        name: required_text("name", &payload.name, 100)?,
        description: optional_text("description", payload.description, 1000)?,
    })
}

fn bind_named(
    payload: NamedPayload,
    query: QueryAs<'_, Postgres, NamedRecord, PgArguments>,
) -> QueryAs<'_, Postgres, NamedRecord, PgArguments> {
    query.bind(payload.name).bind(payload.description)
}

pub struct Role;

impl Resource for Role {
    const TABLE: &'static str = "roles";
    const COLUMNS: &'static [&'static str] = &["name", "description"];

    type Record = NamedRecord;
    type Payload = NamedPayload;

    fn validate(payload: Self::Payload) -> Result<Self::Payload, ServiceError> {
        validate_named(payload)
    }

    fn bind(
        payload: Self::Payload,
        query: QueryAs<'_, Postgres, Self::Record, PgArguments>,
    ) -> QueryAs<'_, Postgres, Self::Record, PgArguments> {
        bind_named(payload, query)
    }
}

pub struct Category;

impl Resource for Category {
    const TABLE: &'static str = "categories";
    const COLUMNS: &'static [&'static str] = &["name", "description"];

    type Record = NamedRecord;
    type Payload = NamedPayload;

    fn validate(payload: Self::Payload) -> Result<Self::Payload, ServiceError> {
        validate_named(payload)
    }

    fn bind(
        payload: Self::Payload,
        query: QueryAs<'_, Postgres, Self::Record, PgArguments>,
    ) -> QueryAs<'_, Postgres, Self::Record, PgArguments> {
        bind_named(payload, query)
    }
}
