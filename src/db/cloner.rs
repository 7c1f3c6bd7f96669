use itertools::Itertools;
use log::{info, warn};
use serde::Serialize;
use sqlx::postgres::PgConnectOptions;
use sqlx::{Executor, PgConnection};

use crate::db::binding::{quote_ident, validate_identifier};
use crate::db::provider::{open_connection, release_connection};
use crate::db::provisioner::schema_exists_on;
use crate::db::DbError;

/// Tables a clone created, and the ones the target already had
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CloneReport {
    pub created: Vec<String>,
    pub skipped: Vec<String>,
}

impl CloneReport {
    pub fn is_noop(&self) -> bool {
        self.created.is_empty()
    }
}

/// Copy the table definitions of `source` into `target`.
///
/// Both schemas must already exist. Tables present in `target` are left alone and
/// rows are never copied. Every statement commits on its own, so re-running
/// after an interruption only creates the tables still missing.
pub async fn clone_schema(
    options: &PgConnectOptions,
    source: &str,
    target: &str,
) -> Result<CloneReport, DbError> {
    validate_identifier(source)?;
    validate_identifier(target)?;

    let mut conn = open_connection(options).await?;
    let report = clone_schema_on(&mut conn, source, target).await;
    release_connection(conn).await;

    let report = report?;
    warn!(
        "Schema cloned. Created: [{}], skipped: [{}]",
        report.created.iter().join(", "),
        report.skipped.iter().join(", ")
    );
    Ok(report)
}

async fn clone_schema_on(
    conn: &mut PgConnection,
    source: &str,
    target: &str,
) -> Result<CloneReport, DbError> {
    for schema in [source, target] {
        if !schema_exists_on(conn, schema).await? {
            return Err(DbError::MissingSchema(schema.to_string()));
        }
    }

    warn!("Cloning schema '{}' to '{}'...", source, target);

    let tables = list_tables(conn, source).await?;
    if tables.is_empty() {
        warn!("Source schema '{}' has no tables; nothing to clone", source);
    }
    let existing = list_tables(conn, target).await?;

    let mut report = CloneReport::default();
    for table in tables {
        if existing.contains(&table) {
            info!("{}.{} already exists, skipping", target, table);
            report.skipped.push(table);
            continue;
        }

        warn!("Cloning {}.{} to {}.{}...", source, table, target, table);
        let statement = format!(
            "CREATE TABLE IF NOT EXISTS {}.{} (LIKE {}.{} INCLUDING ALL)",
            quote_ident(target),
            quote_ident(&table),
            quote_ident(source),
            quote_ident(&table),
        );
        (&mut *conn).execute(statement.as_str()).await?;
        report.created.push(table);
    }

    Ok(report)
}

async fn list_tables(conn: &mut PgConnection, schema: &str) -> Result<Vec<String>, DbError> {
    let tables = sqlx::query_scalar::<_, String>(
        r#"
        SELECT table_name::text
        FROM information_schema.tables
        WHERE table_schema = $1 AND table_type = 'BASE TABLE'
        ORDER BY table_name
        "#,
    )
    .bind(schema)
    .fetch_all(conn)
    .await?;

    Ok(tables)
}
