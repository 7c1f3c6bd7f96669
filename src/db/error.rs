use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    /// Session requested while the maintenance flag is set
    #[error("Service is currently under maintenance.")]
    Unavailable,

    /// Database still missing after creation and migration; the process should stop
    #[error("could not provision database: {0}")]
    Provisioning(String),

    #[error("invalid schema or database name: '{0}'")]
    InvalidIdentifier(String),

    #[error("schema '{0}' does not exist")]
    MissingSchema(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("migration failed: {0}")]
    Migration(String),

    #[error(transparent)]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl DbError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, DbError::Unavailable)
    }
}
