use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use async_trait::async_trait;
use log::{info, warn};
use sqlx::error::BoxDynError;
use sqlx::migrate::{Migration, MigrationSource, Migrator};
use sqlx::postgres::PgPoolOptions;
use sqlx::ConnectOptions;
use tokio::process::Command;

use crate::db::binding::quote_ident;
use crate::db::{DatabaseSettings, DbError};

/// Placeholder in migration files for the quoted shared schema name
pub const SHARED_SCHEMA_PLACEHOLDER: &str = "{{shared_schema}}";
/// Placeholder in migration files for the quoted template tenant schema name
pub const TENANT_SCHEMA_PLACEHOLDER: &str = "{{tenant_schema}}";

/// Applies the schema migrations once a database has just been created
#[async_trait]
pub trait MigrationRunner: Send + Sync {
    async fn run(&self, settings: &DatabaseSettings) -> Result<(), DbError>;
}

/// Runs a directory of sqlx migrations, resolved at runtime.
///
/// Schema placeholders in the files are replaced with the configured
/// shared and template schema names before the migrations run.
#[derive(Debug, Clone)]
pub struct SqlxMigrationRunner {
    directory: PathBuf,
}

impl SqlxMigrationRunner {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// Load the migrations with schema names filled in for `settings`
    pub async fn migrator(&self, settings: &DatabaseSettings) -> Result<Migrator, DbError> {
        let source = SchemaBoundMigrations {
            directory: self.directory.clone(),
            shared_schema: settings.shared_schema.clone(),
            tenant_schema: settings.tenant_schema.clone(),
        };
        Ok(Migrator::new(source).await?)
    }
}

#[async_trait]
impl MigrationRunner for SqlxMigrationRunner {
    async fn run(&self, settings: &DatabaseSettings) -> Result<(), DbError> {
        let migrator = self.migrator(settings).await?;
        info!(
            "Applying {} migration(s) from {}",
            migrator.iter().count(),
            self.directory.display()
        );

        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect_with(settings.connect_options.clone())
            .await?;
        let result = migrator.run(&pool).await;
        pool.close().await;

        Ok(result?)
    }
}

#[derive(Debug)]
struct SchemaBoundMigrations {
    directory: PathBuf,
    shared_schema: String,
    tenant_schema: String,
}

impl MigrationSource<'static> for SchemaBoundMigrations {
    fn resolve(
        self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Migration>, BoxDynError>> + Send + 'static>> {
        Box::pin(async move {
            let migrations = self.directory.clone().resolve().await?;
            Ok(migrations
                .iter()
                .map(|m| bind_schema_names(m, &self.shared_schema, &self.tenant_schema))
                .collect())
        })
    }
}

/// Substitute the schema placeholders of one migration. The checksum follows
/// the rendered SQL.
pub fn bind_schema_names(
    migration: &Migration,
    shared_schema: &str,
    tenant_schema: &str,
) -> Migration {
    let sql = migration
        .sql
        .replace(SHARED_SCHEMA_PLACEHOLDER, &quote_ident(shared_schema))
        .replace(TENANT_SCHEMA_PLACEHOLDER, &quote_ident(tenant_schema));

    Migration::new(
        migration.version,
        migration.description.clone(),
        migration.migration_type,
        sql.into(),
    )
}

/// Runs an external migration tool and waits for it to exit.
///
/// The tool gets `DATABASE_URL` for the new database, plus
/// `SHELF_SHARED_SCHEMA` and `SHELF_TENANT_SCHEMA` with the configured names.
#[derive(Debug, Clone)]
pub struct CommandMigrationRunner {
    program: String,
    args: Vec<String>,
}

impl CommandMigrationRunner {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Build from a full command line such as `["sqlx", "migrate", "run"]`
    pub fn from_command_line(command: &[String]) -> Option<Self> {
        let (program, args) = command.split_first()?;
        Some(Self::new(program.clone(), args.to_vec()))
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

#[async_trait]
impl MigrationRunner for CommandMigrationRunner {
    async fn run(&self, settings: &DatabaseSettings) -> Result<(), DbError> {
        info!("Running migrations: {} {}", self.program, self.args.join(" "));

        let status = Command::new(&self.program)
            .args(&self.args)
            .env("DATABASE_URL", settings.connect_options.to_url_lossy().as_str())
            .env("SHELF_SHARED_SCHEMA", &settings.shared_schema)
            .env("SHELF_TENANT_SCHEMA", &settings.tenant_schema)
            .status()
            .await
            .map_err(|e| DbError::Migration(format!("could not start '{}': {}", self.program, e)))?;

        if status.success() {
            Ok(())
        } else {
            warn!("Migration command '{}' exited with {}", self.program, status);
            Err(DbError::Migration(format!(
                "'{}' exited with {}",
                self.program, status
            )))
        }
    }
}

/// For deployments where the schema is migrated by something else
#[derive(Debug, Clone, Default)]
pub struct NoopMigrationRunner;

#[async_trait]
impl MigrationRunner for NoopMigrationRunner {
    async fn run(&self, _settings: &DatabaseSettings) -> Result<(), DbError> {
        info!("Migrations are managed externally; nothing to run");
        Ok(())
    }
}
