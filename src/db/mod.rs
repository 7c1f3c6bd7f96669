pub mod binding;
pub mod cloner;
pub mod context;
pub mod error;
pub mod migrate;
pub mod provider;
pub mod provisioner;
pub mod session;

pub use binding::*;
pub use cloner::*;
pub use context::*;
pub use error::*;
pub use migrate::*;
pub use provider::*;
pub use provisioner::*;
pub use session::*;

use sqlx::postgres::PgConnectOptions;

/// Resolved connection and tenancy settings for one database
#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub database_name: String,
    /// Options for connections to `database_name`
    pub connect_options: PgConnectOptions,
    /// Options for administrative connections used while `database_name` may be absent
    pub admin_options: PgConnectOptions,
    pub max_connections: u32,
    pub shared_schema: String,
    /// Template schema that new tenant schemas are cloned from
    pub tenant_schema: String,
    pub maintenance: bool,
}
