use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Postgres, postgres::PgArguments, query::QueryAs};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{Resource, non_negative, optional_text, required_text};
use crate::api::handlers::error::ServiceError;

pub const INVOICE_STATUSES: [&str; 4] = ["draft", "issued", "paid", "void"];

#[derive(ToSchema, Serialize, Deserialize, FromRow, Debug, Clone)]
pub struct InvoiceRecord {
    pub id: Uuid,
    pub number: String,
    pub customer_id: Uuid,
    pub company_id: Uuid,
    pub issue_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub status: String,
    /// Invoice total in cents.
    pub total_cents: i64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(ToSchema, Deserialize, Debug)]
pub struct InvoicePayload {
    pub number: String,
    pub customer_id: Uuid,
    pub company_id: Uuid,
    pub issue_date: NaiveDate,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default = "default_status")]
    pub status: String,
    pub total_cents: i64,
    #[serde(default)]
    pub notes: Option<String>,
}

fn default_status() -> String {
    "draft".to_string()
}

pub struct Invoice;

impl Resource for Invoice {
    const TABLE: &'static str = "invoices";
    const COLUMNS: &'static [&'static str] = &[
        "number",
        "customer_id",
        "company_id",
        "issue_date",
        "due_date",
        "status",
        "total_cents",
        "notes",
    ];

    type Record = InvoiceRecord;
    type Payload = InvoicePayload;

    fn validate(payload: Self::Payload) -> Result<Self::Payload, ServiceError> {
        let status = payload.status.trim().to_lowercase();
        if !INVOICE_STATUSES.contains(&status.as_str()) {
            return Err(ServiceError::bad_request(format!(
                "status must be one of {}",
                INVOICE_STATUSES.join(", ")
            )));
        }
        if payload
            .due_date
            .is_some_and(|due_date| due_date < payload.issue_date)
        {
            return Err(ServiceError::bad_request(
                "due_date must not be before issue_date",
            ));
        }
        Ok(InvoicePayload {
            number: required_text("number", &payload.number, 40)?,
            status,
            total_cents: non_negative("total_cents", payload.total_cents)?,
            notes: optional_text("notes", payload.notes, 2000)?,
            ..payload
        })
    }

    fn bind(
        payload: Self::Payload,
        query: QueryAs<'_, Postgres, Self::Record, PgArguments>,
    ) -> QueryAs<'_, Postgres, Self::Record, PgArguments> {
        query
            .bind(payload.number)
            .bind(payload.customer_id)
            .bind(payload.company_id)
            .bind(payload.issue_date)
            .bind(payload.due_date)
            .bind(payload.status)
            .bind(payload.total_cents)
            .bind(payload.notes)
    }
}
