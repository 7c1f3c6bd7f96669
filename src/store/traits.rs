use uuid::Uuid;

use crate::db::DbError;
use crate::model::{Book, BookUpdate, BulkResult, Critic, DeleteResult, NewBook, NewCritic};

/// Tenant-scoped book operations; `schema` selects the tenant
#[async_trait::async_trait]
pub trait BookStore: Send + Sync {
    async fn list_books(&self, schema: &str) -> Result<Vec<Book>, DbError>;
    async fn count_books(&self, schema: &str) -> Result<i64, DbError>;
    async fn get_book(&self, schema: &str, id: Uuid) -> Result<Option<Book>, DbError>;
    async fn create_book(&self, schema: &str, book: NewBook) -> Result<Book, DbError>;
    /// Insert all books in one transaction
    async fn create_books(&self, schema: &str, books: Vec<NewBook>) -> Result<BulkResult, DbError>;
    /// Apply the fields that are set; `None` leaves the stored value alone
    async fn update_book(&self, schema: &str, id: Uuid, update: BookUpdate) -> Result<Book, DbError>;
    /// Insert, or replace the book with the same identifier
    async fn upsert_book(&self, schema: &str, book: NewBook) -> Result<Book, DbError>;
    async fn upsert_books(&self, schema: &str, books: Vec<NewBook>) -> Result<BulkResult, DbError>;
    async fn delete_book(&self, schema: &str, id: Uuid) -> Result<DeleteResult, DbError>;
}

/// Operations on the shared critic table, identical for every tenant
#[async_trait::async_trait]
pub trait CriticStore: Send + Sync {
    async fn list_critics(&self) -> Result<Vec<Critic>, DbError>;
    async fn get_critic(&self, id: Uuid) -> Result<Option<Critic>, DbError>;
    async fn create_critic(&self, critic: NewCritic) -> Result<Critic, DbError>;
    async fn delete_critic(&self, id: Uuid) -> Result<DeleteResult, DbError>;
}

pub trait Store: BookStore + CriticStore + Send + Sync {}
