pub mod api;
pub mod config;
pub mod db;
pub mod model;
pub mod store;

use std::sync::Arc;

use anyhow::Context;

// Export database layer types
pub use db::{
    resolve_context, CloneReport, DatabaseContext, DatabaseSettings, DbError, MigrationRunner,
    ProvisionOutcome, SchemaAlias, SchemaBinding, SchemaStatus, ScopedSession, UnitOfWork,
};

// Export all model types
pub use model::*;

// Export store types
pub use store::{BookStore, CriticStore, PostgresStore, Store};

/// Pick the migration runner the configuration asks for
pub fn migration_runner(config: &config::AppConfig) -> Arc<dyn MigrationRunner> {
    if let Some(runner) = config
        .migrations
        .command
        .as_deref()
        .and_then(db::CommandMigrationRunner::from_command_line)
    {
        return Arc::new(runner);
    }

    match config.migrations_directory() {
        Some(directory) => Arc::new(db::SqlxMigrationRunner::new(directory)),
        None => Arc::new(db::NoopMigrationRunner),
    }
}

/// Load configuration and build the database context, provisioning on first start
pub async fn bootstrap() -> anyhow::Result<(config::AppConfig, Arc<DatabaseContext>)> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    let config = config::AppConfig::load()?;
    let settings = config.database_settings()?;
    log::info!(
        "Configuration loaded: database={} shared_schema={} tenant_schema={}",
        settings.database_name,
        settings.shared_schema,
        settings.tenant_schema
    );

    let context = DatabaseContext::connect(settings, migration_runner(&config))
        .await
        .context("Failed to provision database")?;

    Ok((config, Arc::new(context)))
}

