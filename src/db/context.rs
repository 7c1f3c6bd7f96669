use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, error, warn};
use sqlx::PgPool;

use crate::db::binding::resolve_context;
use crate::db::cloner::{clone_schema, CloneReport};
use crate::db::migrate::MigrationRunner;
use crate::db::provider::ConnectionProvider;
use crate::db::provisioner::{ProvisionOutcome, SchemaProvisioner};
use crate::db::session::{ScopedSession, UnitOfWork};
use crate::db::{DatabaseSettings, DbError};

/// Everything a request needs to reach the database.
///
/// Build one at startup with [`DatabaseContext::connect`], share it as
/// `Arc<DatabaseContext>` and call [`DatabaseContext::shutdown`] on exit.
pub struct DatabaseContext {
    provider: ConnectionProvider,
    provisioner: SchemaProvisioner,
    maintenance: AtomicBool,
}

impl DatabaseContext {
    /// Provision the database if needed, then hand out the connection pool
    pub async fn connect(
        settings: DatabaseSettings,
        migrations: Arc<dyn MigrationRunner>,
    ) -> Result<Self, DbError> {
        let context = Self::new(settings, migrations);
        context.provisioner.ensure_database().await?;
        Ok(context)
    }

    /// Build the context without touching the server. The pool connects lazily.
    pub fn new(settings: DatabaseSettings, migrations: Arc<dyn MigrationRunner>) -> Self {
        let provider =
            ConnectionProvider::new(settings.connect_options.clone(), settings.max_connections);
        let maintenance = AtomicBool::new(settings.maintenance);

        Self {
            provider,
            provisioner: SchemaProvisioner::new(settings, migrations),
            maintenance,
        }
    }

    pub fn settings(&self) -> &DatabaseSettings {
        self.provisioner.settings()
    }

    pub fn provisioner(&self) -> &SchemaProvisioner {
        &self.provisioner
    }

    pub fn pool(&self) -> &PgPool {
        self.provider.pool()
    }

    pub fn shared_schema(&self) -> &str {
        &self.settings().shared_schema
    }

    pub fn in_maintenance(&self) -> bool {
        self.maintenance.load(Ordering::SeqCst)
    }

    pub fn set_maintenance(&self, enabled: bool) {
        warn!("Maintenance mode {}", if enabled { "enabled" } else { "disabled" });
        self.maintenance.store(enabled, Ordering::SeqCst);
    }

    pub async fn ensure_database(&self) -> Result<ProvisionOutcome, DbError> {
        self.provisioner.ensure_database().await
    }

    pub async fn clone_schema(&self, source: &str, target: &str) -> Result<CloneReport, DbError> {
        clone_schema(&self.settings().connect_options, source, target).await
    }

    pub async fn provision_tenant(&self, tenant_schema: &str) -> Result<CloneReport, DbError> {
        self.provisioner.provision_tenant(tenant_schema).await
    }

    /// Run `unit_of_work` in a transaction bound to `schema_name`.
    ///
    /// Commits when the work returns `Ok` and rolls back when it returns `Err`,
    /// handing the caller's error back untouched. The connection goes back to
    /// the pool either way. While in maintenance this fails with
    /// [`DbError::Unavailable`] before a connection is acquired.
    ///
    /// ```rust,ignore
    /// let count = ctx
    ///     .with_session("tenant_42", |session| {
    ///         Box::pin(async move {
    ///             let table = session.table(SchemaAlias::Tenant, "book");
    ///             let sql = format!("SELECT COUNT(*) FROM {}", table);
    ///             let count: i64 = sqlx::query_scalar(&sql)
    ///                 .fetch_one(session.connection())
    ///                 .await?;
    ///             Ok::<_, DbError>(count)
    ///         })
    ///     })
    ///     .await?;
    /// ```
    pub async fn with_session<T, E, F>(&self, schema_name: &str, unit_of_work: F) -> Result<T, E>
    where
        F: for<'c> FnOnce(&'c mut ScopedSession) -> UnitOfWork<'c, T, E>,
        E: From<DbError>,
    {
        if self.in_maintenance() {
            error!("Request received during maintenance window.");
            return Err(DbError::Unavailable.into());
        }

        let binding = resolve_context(schema_name, self.shared_schema());
        let tx = self.pool().begin().await.map_err(DbError::from)?;
        let mut session = ScopedSession::new(tx, binding);
        debug!("Session opened for schema '{}'", schema_name);

        match unit_of_work(&mut session).await {
            Ok(value) => {
                session.commit().await?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = session.rollback().await {
                    warn!("Rollback failed for schema '{}': {}", schema_name, rollback_err);
                }
                Err(err)
            }
        }
    }

    pub async fn shutdown(&self) {
        self.provider.shutdown().await;
    }
}
