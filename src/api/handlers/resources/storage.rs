//! SQL for the CRUD resources.
//!
//! Every operation is a single statement. Statements are built from the
//! resource's table and column list; values are always bound, never formatted.

use sqlx::PgPool;
use tracing::{Instrument, info_span};
use uuid::Uuid;

use super::Resource;

const META_COLUMNS: &str = "created_at, updated_at";

fn returning(columns: &[&str]) -> String {
    format!("id, {}, {META_COLUMNS}", columns.join(", "))
}

pub(super) fn select_all_sql(table: &str, columns: &[&str]) -> String {
    format!(
        "SELECT {} FROM {table} ORDER BY created_at DESC, id",
        returning(columns)
    )
}

pub(super) fn select_one_sql(table: &str, columns: &[&str]) -> String {
    format!("SELECT {} FROM {table} WHERE id = $1", returning(columns))
}

pub(super) fn insert_sql(table: &str, columns: &[&str]) -> String {
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("${i}")).collect();
    format!(
        "INSERT INTO {table} ({}) VALUES ({}) RETURNING {}",
        columns.join(", "),
        placeholders.join(", "),
        returning(columns)
    )
}

/// Full replacement; the id is the last parameter.
pub(super) fn update_sql(table: &str, columns: &[&str]) -> String {
    let assignments: Vec<String> = columns
        .iter()
        .enumerate()
        .map(|(i, column)| format!("{column} = ${}", i + 1))
        .collect();
    format!(
        "UPDATE {table} SET {}, updated_at = NOW() WHERE id = ${} RETURNING {}",
        assignments.join(", "),
        columns.len() + 1,
        returning(columns)
    )
}

pub(super) fn delete_sql(table: &str, columns: &[&str]) -> String {
    format!(
        "DELETE FROM {table} WHERE id = $1 RETURNING {}",
        returning(columns)
    )
}

fn query_span(operation: &'static str, table: &'static str) -> tracing::Span {
    info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = operation,
        db.sql.table = table
    )
}

pub(super) async fn list<R: Resource>(pool: &PgPool) -> Result<Vec<R::Record>, sqlx::Error> {
    let sql = select_all_sql(R::TABLE, R::COLUMNS);
    sqlx::query_as::<_, R::Record>(&sql)
        .fetch_all(pool)
        .instrument(query_span("SELECT", R::TABLE))
        .await
}

pub(super) async fn fetch<R: Resource>(
    pool: &PgPool,
    id: Uuid,
) -> Result<Option<R::Record>, sqlx::Error> {
    let sql = select_one_sql(R::TABLE, R::COLUMNS);
    sqlx::query_as::<_, R::Record>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .instrument(query_span("SELECT", R::TABLE))
        .await
}

pub(super) async fn insert<R: Resource>(
    pool: &PgPool,
    payload: R::Payload,
) -> Result<R::Record, sqlx::Error> {
    let sql = insert_sql(R::TABLE, R::COLUMNS);
    R::bind(payload, sqlx::query_as::<_, R::Record>(&sql))
        .fetch_one(pool)
        .instrument(query_span("INSERT", R::TABLE))
        .await
}

pub(super) async fn update<R: Resource>(
    pool: &PgPool,
    id: Uuid,
    payload: R::Payload,
) -> Result<Option<R::Record>, sqlx::Error> {
    let sql = update_sql(R::TABLE, R::COLUMNS);
    R::bind(payload, sqlx::query_as::<_, R::Record>(&sql))
        .bind(id)
        .fetch_optional(pool)
        .instrument(query_span("UPDATE", R::TABLE))
        .await
}

pub(super) async fn delete<R: Resource>(
    pool: &PgPool,
    id: Uuid,
) -> Result<Option<R::Record>, sqlx::Error> {
    let sql = delete_sql(R::TABLE, R::COLUMNS);
    sqlx::query_as::<_, R::Record>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .instrument(query_span("DELETE", R::TABLE))
        .await
}
