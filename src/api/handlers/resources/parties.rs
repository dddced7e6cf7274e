//! Companies, providers and customers share one shape: a named party with
//! contact details and an optional address.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Postgres, postgres::PgArguments, query::QueryAs};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{Resource, optional_email, optional_text, required_text};
use crate::api::handlers::error::ServiceError;

const COLUMNS: &[&str] = &[
    "name",
    "tax_id",
    "contact_name",
    "email",
    "phone",
    "address_id",
];

#[derive(ToSchema, Serialize, Deserialize, FromRow, Debug, Clone)]
pub struct PartyRecord {
    pub id: Uuid,
    pub name: String,
    pub tax_id: Option<String>,
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(ToSchema, Deserialize, Debug)]
pub struct PartyPayload {
    pub name: String,
    #[serde(default)]
    pub tax_id: Option<String>,
    #[serde(default)]
    pub contact_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address_id: Option<Uuid>,
}

fn validate_party(payload: PartyPayload) -> Result<PartyPayload, ServiceError> {
    Ok(PartyPayload {
        name: required_text("name", &payload.name, 200)?,
        tax_id: optional_text("tax_id", payload.tax_id, 20)?.map(|id| id.to_uppercase()),
        contact_name: optional_text("contact_name", payload.contact_name, 200)?,
        email: optional_email(payload.email)?,
        phone: optional_text("phone", payload.phone, 30)?,
        address_id: payload.address_id,
    })
}

fn bind_party(
    payload: PartyPayload,
    query: QueryAs<'_, Postgres, PartyRecord, PgArguments>,
) -> QueryAs<'_, Postgres, PartyRecord, PgArguments> {
    query
        .bind(payload.name)
        .bind(payload.tax_id)
        .bind(payload.contact_name)
        .bind(payload.email)
        .bind(payload.phone)
        .bind(payload.address_id)
}

pub struct Company;

impl Resource for Company {
    const TABLE: &'static str = "companies";
    const COLUMNS: &'static [&'static str] = COLUMNS;

    type Record = PartyRecord;
    type Payload = PartyPayload;

    fn validate(payload: Self::Payload) -> Result<Self::Payload, ServiceError> {
        validate_party(payload)
    }

    fn bind(
        payload: Self::Payload,
        query: QueryAs<'_, Postgres, Self::Record, PgArguments>,
    ) -> QueryAs<'_, Postgres, Self::Record, PgArguments> {
        bind_party(payload, query)
    }
}

pub struct Provider;

impl Resource for Provider {
    const TABLE: &'static str = "providers";
    const COLUMNS: &'static [&'static str] = COLUMNS;

    type Record = PartyRecord;
    type Payload = PartyPayload;

    fn validate(payload: Self::Payload) -> Result<Self::Payload, ServiceError> {
        validate_party(payload)
    }

    fn bind(
        payload: Self::Payload,
        query: QueryAs<'_, Postgres, Self::Record, PgArguments>,
    ) -> QueryAs<'_, Postgres, Self::Record, PgArguments> {
        bind_party(payload, query)
    }
}

pub struct Customer;

impl Resource for Customer {
    const TABLE: &'static str = "customers";
    const COLUMNS: &'static [&'static str] = COLUMNS;

    type Record = PartyRecord;
    type Payload = PartyPayload;

    fn validate(payload: Self::Payload) -> Result<Self::Payload, ServiceError> {
        validate_party(payload)
    }

    fn bind(
        payload: Self::Payload,
        query: QueryAs<'_, Postgres, Self::Record, PgArguments>,
    ) -> QueryAs<'_, Postgres, Self::Record, PgArguments> {
        bind_party(payload, query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn party_payload_normalizes_contact_fields() -> Result<()> {
        let payload: PartyPayload = serde_json::from_str(
            r#"{"name":" Acme SA ","tax_id":"aaa010101aaa","email":"Billing@Acme.MX","phone":" "}"#,
        )?;
        let Ok(payload) = Customer::validate(payload) else {
            panic!("valid payload rejected");
        };
        assert_eq!(payload.name, "Acme SA");
        assert_eq!(payload.tax_id.as_deref(), Some("AAA010101AAA"));
        assert_eq!(payload.email.as_deref(), Some("billing@acme.mx"));
        assert_eq!(payload.phone, None);
        assert_eq!(payload.address_id, None);
        Ok(())
    }

    #[test]
    fn party_payload_rejects_bad_email() -> Result<()> {
        let payload: PartyPayload =
            serde_json::from_str(r#"{"name":"Acme","email":"not-an-email"}"#)?;
        assert!(Provider::validate(payload).is_err());
        Ok(())
    }
}
