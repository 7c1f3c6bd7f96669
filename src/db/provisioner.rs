use std::sync::Arc;

use log::{error, info, warn};
use sqlx::{Executor, PgConnection};

use crate::db::binding::{quote_ident, validate_database_name, validate_identifier};
use crate::db::cloner::{clone_schema, CloneReport};
use crate::db::migrate::MigrationRunner;
use crate::db::provider::{open_connection, release_connection};
use crate::db::{DatabaseSettings, DbError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// Database, default schemas and migrations were created by this call
    Created,
    AlreadyProvisioned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaStatus {
    Created,
    AlreadyExists,
    /// The create statement ran but the schema is still not visible
    Unverified,
}

/// Creates the database and its schemas.
///
/// Callers serialize provisioning themselves; nothing here guards against two
/// processes provisioning the same database at once.
pub struct SchemaProvisioner {
    settings: DatabaseSettings,
    migrations: Arc<dyn MigrationRunner>,
}

impl SchemaProvisioner {
    pub fn new(settings: DatabaseSettings, migrations: Arc<dyn MigrationRunner>) -> Self {
        Self {
            settings,
            migrations,
        }
    }

    pub fn settings(&self) -> &DatabaseSettings {
        &self.settings
    }

    /// Create the database with its shared and template schemas and migrate it,
    /// unless it already exists.
    ///
    /// A database whose schemas or migrations fail is dropped again, so the
    /// next call starts over instead of reporting it as provisioned.
    pub async fn ensure_database(&self) -> Result<ProvisionOutcome, DbError> {
        let name = &self.settings.database_name;
        validate_database_name(name)?;

        if self.database_exists().await? {
            info!("Database '{}' already exists. Nothing to do.", name);
            return Ok(ProvisionOutcome::AlreadyProvisioned);
        }

        warn!("Creating database: {}...", name);
        let mut conn = open_connection(&self.settings.admin_options).await?;
        let created = conn
            .execute(format!("CREATE DATABASE {}", quote_ident(name)).as_str())
            .await;
        release_connection(conn).await;
        created?;

        if let Err(err) = self.initialize_database().await {
            error!("Provisioning '{}' failed, dropping the partial database: {}", name, err);
            if let Err(drop_err) = self.drop_database().await {
                warn!("Failed to drop partial database '{}': {}", name, drop_err);
            }
            return Err(err);
        }

        if !self.database_exists().await? {
            error!("Database '{}' is still missing after creation", name);
            return Err(DbError::Provisioning(format!(
                "database '{}' does not exist after creation and migration",
                name
            )));
        }

        warn!("Database created.");
        Ok(ProvisionOutcome::Created)
    }

    async fn initialize_database(&self) -> Result<(), DbError> {
        warn!("Creating default schemas...");
        self.create_schema(&self.settings.shared_schema).await?;
        self.create_schema(&self.settings.tenant_schema).await?;
        warn!("Default schemas created.");

        warn!("Running migrations as database was just created...");
        self.migrations.run(&self.settings).await
    }

    pub async fn database_exists(&self) -> Result<bool, DbError> {
        let mut conn = open_connection(&self.settings.admin_options).await?;
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM pg_database WHERE datname = $1)",
        )
        .bind(&self.settings.database_name)
        .fetch_one(&mut conn)
        .await;
        release_connection(conn).await;

        Ok(exists?)
    }

    /// Create an empty schema in the application database if it is missing
    pub async fn create_schema(&self, schema_name: &str) -> Result<SchemaStatus, DbError> {
        validate_identifier(schema_name)?;

        let mut conn = open_connection(&self.settings.connect_options).await?;
        let status = create_schema_on(&mut conn, schema_name).await;
        release_connection(conn).await;

        let status = status?;
        match status {
            SchemaStatus::Created => info!("Schema '{}' created.", schema_name),
            SchemaStatus::AlreadyExists => info!("Schema '{}' already exists.", schema_name),
            SchemaStatus::Unverified => error!("Could not create schema: '{}'.", schema_name),
        }
        Ok(status)
    }

    pub async fn schema_exists(&self, schema_name: &str) -> Result<bool, DbError> {
        let mut conn = open_connection(&self.settings.connect_options).await?;
        let exists = schema_exists_on(&mut conn, schema_name).await;
        release_connection(conn).await;
        exists
    }

    /// Create a tenant schema and clone the template's tables into it
    pub async fn provision_tenant(&self, tenant_schema: &str) -> Result<CloneReport, DbError> {
        if tenant_schema == self.settings.shared_schema {
            return Err(DbError::InvalidIdentifier(tenant_schema.to_string()));
        }

        if self.create_schema(tenant_schema).await? == SchemaStatus::Unverified {
            return Err(DbError::MissingSchema(tenant_schema.to_string()));
        }
        clone_schema(
            &self.settings.connect_options,
            &self.settings.tenant_schema,
            tenant_schema,
        )
        .await
    }

    /// Drop the application database, terminating any sessions still
    /// connected to it. Needs PostgreSQL 13 or later.
    pub async fn drop_database(&self) -> Result<bool, DbError> {
        let name = &self.settings.database_name;
        validate_database_name(name)?;

        if !self.database_exists().await? {
            return Ok(false);
        }

        warn!("Dropping database: {}...", name);
        let mut conn = open_connection(&self.settings.admin_options).await?;
        let dropped = conn
            .execute(
                format!("DROP DATABASE IF EXISTS {} WITH (FORCE)", quote_ident(name)).as_str(),
            )
            .await;
        release_connection(conn).await;
        dropped?;

        Ok(true)
    }
}

pub(crate) async fn schema_exists_on(
    conn: &mut PgConnection,
    schema_name: &str,
) -> Result<bool, DbError> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM pg_namespace WHERE nspname = $1)",
    )
    .bind(schema_name)
    .fetch_one(conn)
    .await?;

    Ok(exists)
}

async fn create_schema_on(
    conn: &mut PgConnection,
    schema_name: &str,
) -> Result<SchemaStatus, DbError> {
    if schema_exists_on(conn, schema_name).await? {
        return Ok(SchemaStatus::AlreadyExists);
    }

    warn!("Creating schema: '{}'...", schema_name);
    (&mut *conn)
        .execute(format!("CREATE SCHEMA IF NOT EXISTS {}", quote_ident(schema_name)).as_str())
        .await?;

    if schema_exists_on(conn, schema_name).await? {
        Ok(SchemaStatus::Created)
    } else {
        Ok(SchemaStatus::Unverified)
    }
}
