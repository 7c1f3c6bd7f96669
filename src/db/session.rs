use std::future::Future;
use std::pin::Pin;

use sqlx::{PgConnection, Postgres, Transaction};

use crate::db::binding::{SchemaAlias, SchemaBinding};
use crate::db::DbError;

/// Future returned by the work run inside `DatabaseContext::with_session`
pub type UnitOfWork<'c, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'c>>;

/// A pooled connection inside an open transaction, bound to one schema context.
///
/// Only the session manager can end the transaction; work running inside it
/// gets query access and the binding, nothing else.
pub struct ScopedSession {
    tx: Transaction<'static, Postgres>,
    binding: SchemaBinding,
}

impl ScopedSession {
    pub(crate) fn new(tx: Transaction<'static, Postgres>, binding: SchemaBinding) -> Self {
        Self { tx, binding }
    }

    pub fn binding(&self) -> &SchemaBinding {
        &self.binding
    }

    /// Table name qualified according to this session's binding
    pub fn table(&self, alias: SchemaAlias, table: &str) -> String {
        self.binding.table(alias, table)
    }

    /// Executor for queries inside the session's transaction
    pub fn connection(&mut self) -> &mut PgConnection {
        &mut self.tx
    }

    pub(crate) async fn commit(self) -> Result<(), DbError> {
        Ok(self.tx.commit().await?)
    }

    pub(crate) async fn rollback(self) -> Result<(), DbError> {
        Ok(self.tx.rollback().await?)
    }
}

impl std::fmt::Debug for ScopedSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopedSession")
            .field("binding", &self.binding)
            .finish_non_exhaustive()
    }
}
