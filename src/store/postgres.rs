use std::sync::Arc;

use uuid::Uuid;

use crate::db::{DatabaseContext, DbError, SchemaAlias, ScopedSession};
use crate::model::{
    Book, BookUpdate, BulkResult, Critic, DeleteResult, NewBook, NewCritic, BOOK_TABLE,
    CRITIC_TABLE,
};
use crate::store::traits::{BookStore, CriticStore, Store};

const BOOK_COLUMNS: &str = "id, identifier, name, author, release_year, created_at, updated_at";
const CRITIC_COLUMNS: &str = "id, name, publication, created_at, updated_at";

/// Stores backed by scoped sessions: every call is its own transaction
#[derive(Clone)]
pub struct PostgresStore {
    ctx: Arc<DatabaseContext>,
}

impl PostgresStore {
    pub fn new(ctx: Arc<DatabaseContext>) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &DatabaseContext {
        &self.ctx
    }
}

fn book_table(session: &ScopedSession) -> String {
    session.table(SchemaAlias::Tenant, BOOK_TABLE)
}

fn critic_table(session: &ScopedSession) -> String {
    session.table(SchemaAlias::Shared, CRITIC_TABLE)
}

async fn insert_book(session: &mut ScopedSession, book: &NewBook) -> Result<Book, DbError> {
    let sql = format!(
        "INSERT INTO {} (id, identifier, name, author, release_year) \
         VALUES ($1, $2, $3, $4, $5) RETURNING {}",
        book_table(session),
        BOOK_COLUMNS
    );

    let created = sqlx::query_as::<_, Book>(&sql)
        .bind(Uuid::new_v4())
        .bind(&book.identifier)
        .bind(&book.name)
        .bind(&book.author)
        .bind(book.release_year)
        .fetch_one(session.connection())
        .await?;

    Ok(created)
}

async fn upsert_book_in(session: &mut ScopedSession, book: &NewBook) -> Result<Book, DbError> {
    let sql = format!(
        r#"
        INSERT INTO {} (id, identifier, name, author, release_year)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (identifier) DO UPDATE SET
            name = EXCLUDED.name,
            author = EXCLUDED.author,
            release_year = EXCLUDED.release_year,
            updated_at = NOW()
        RETURNING {}
        "#,
        book_table(session),
        BOOK_COLUMNS
    );

    let stored = sqlx::query_as::<_, Book>(&sql)
        .bind(Uuid::new_v4())
        .bind(&book.identifier)
        .bind(&book.name)
        .bind(&book.author)
        .bind(book.release_year)
        .fetch_one(session.connection())
        .await?;

    Ok(stored)
}

#[async_trait::async_trait]
impl BookStore for PostgresStore {
    async fn list_books(&self, schema: &str) -> Result<Vec<Book>, DbError> {
        self.ctx
            .with_session(schema, |session| {
                Box::pin(async move {
                    let sql = format!(
                        "SELECT {} FROM {} ORDER BY created_at, id",
                        BOOK_COLUMNS,
                        book_table(session)
                    );
                    let books = sqlx::query_as::<_, Book>(&sql)
                        .fetch_all(session.connection())
                        .await?;
                    Ok::<_, DbError>(books)
                })
            })
            .await
    }

    async fn count_books(&self, schema: &str) -> Result<i64, DbError> {
        self.ctx
            .with_session(schema, |session| {
                Box::pin(async move {
                    let sql = format!("SELECT COUNT(*) FROM {}", book_table(session));
                    let count = sqlx::query_scalar::<_, i64>(&sql)
                        .fetch_one(session.connection())
                        .await?;
                    Ok::<_, DbError>(count)
                })
            })
            .await
    }

    async fn get_book(&self, schema: &str, id: Uuid) -> Result<Option<Book>, DbError> {
        self.ctx
            .with_session(schema, move |session| {
                Box::pin(async move {
                    let sql = format!(
                        "SELECT {} FROM {} WHERE id = $1",
                        BOOK_COLUMNS,
                        book_table(session)
                    );
                    let book = sqlx::query_as::<_, Book>(&sql)
                        .bind(id)
                        .fetch_optional(session.connection())
                        .await?;
                    Ok::<_, DbError>(book)
                })
            })
            .await
    }

    async fn create_book(&self, schema: &str, book: NewBook) -> Result<Book, DbError> {
        self.ctx
            .with_session(schema, move |session| {
                Box::pin(async move { insert_book(session, &book).await })
            })
            .await
    }

    async fn create_books(&self, schema: &str, books: Vec<NewBook>) -> Result<BulkResult, DbError> {
        self.ctx
            .with_session(schema, move |session| {
                Box::pin(async move {
                    let mut ids = Vec::with_capacity(books.len());
                    for book in &books {
                        ids.push(insert_book(session, book).await?.id);
                    }
                    Ok::<_, DbError>(BulkResult::created("Book", ids))
                })
            })
            .await
    }

    async fn update_book(&self, schema: &str, id: Uuid, update: BookUpdate) -> Result<Book, DbError> {
        self.ctx
            .with_session(schema, move |session| {
                Box::pin(async move {
                    let sql = format!(
                        r#"
                        UPDATE {} SET
                            identifier = COALESCE($2, identifier),
                            name = COALESCE($3, name),
                            author = COALESCE($4, author),
                            release_year = COALESCE($5, release_year),
                            updated_at = NOW()
                        WHERE id = $1
                        RETURNING {}
                        "#,
                        book_table(session),
                        BOOK_COLUMNS
                    );
                    sqlx::query_as::<_, Book>(&sql)
                        .bind(id)
                        .bind(update.identifier)
                        .bind(update.name)
                        .bind(update.author)
                        .bind(update.release_year)
                        .fetch_optional(session.connection())
                        .await?
                        .ok_or_else(|| DbError::NotFound(format!("Book {}", id)))
                })
            })
            .await
    }

    async fn upsert_book(&self, schema: &str, book: NewBook) -> Result<Book, DbError> {
        self.ctx
            .with_session(schema, move |session| {
                Box::pin(async move { upsert_book_in(session, &book).await })
            })
            .await
    }

    async fn upsert_books(&self, schema: &str, books: Vec<NewBook>) -> Result<BulkResult, DbError> {
        self.ctx
            .with_session(schema, move |session| {
                Box::pin(async move {
                    let mut ids = Vec::with_capacity(books.len());
                    for book in &books {
                        ids.push(upsert_book_in(session, book).await?.id);
                    }
                    Ok::<_, DbError>(BulkResult::upserted("Book", ids))
                })
            })
            .await
    }

    async fn delete_book(&self, schema: &str, id: Uuid) -> Result<DeleteResult, DbError> {
        self.ctx
            .with_session(schema, move |session| {
                Box::pin(async move {
                    let sql = format!("DELETE FROM {} WHERE id = $1", book_table(session));
                    let result = sqlx::query(&sql)
                        .bind(id)
                        .execute(session.connection())
                        .await?;

                    if result.rows_affected() == 0 {
                        return Err(DbError::NotFound(format!("Book {}", id)));
                    }
                    Ok::<_, DbError>(DeleteResult::deleted("Book", result.rows_affected()))
                })
            })
            .await
    }
}

#[async_trait::async_trait]
impl CriticStore for PostgresStore {
    async fn list_critics(&self) -> Result<Vec<Critic>, DbError> {
        self.ctx
            .with_session(self.ctx.shared_schema(), |session| {
                Box::pin(async move {
                    let sql = format!(
                        "SELECT {} FROM {} ORDER BY name, id",
                        CRITIC_COLUMNS,
                        critic_table(session)
                    );
                    let critics = sqlx::query_as::<_, Critic>(&sql)
                        .fetch_all(session.connection())
                        .await?;
                    Ok::<_, DbError>(critics)
                })
            })
            .await
    }

    async fn get_critic(&self, id: Uuid) -> Result<Option<Critic>, DbError> {
        self.ctx
            .with_session(self.ctx.shared_schema(), move |session| {
                Box::pin(async move {
                    let sql = format!(
                        "SELECT {} FROM {} WHERE id = $1",
                        CRITIC_COLUMNS,
                        critic_table(session)
                    );
                    let critic = sqlx::query_as::<_, Critic>(&sql)
                        .bind(id)
                        .fetch_optional(session.connection())
                        .await?;
                    Ok::<_, DbError>(critic)
                })
            })
            .await
    }

    async fn create_critic(&self, critic: NewCritic) -> Result<Critic, DbError> {
        self.ctx
            .with_session(self.ctx.shared_schema(), move |session| {
                Box::pin(async move {
                    let sql = format!(
                        "INSERT INTO {} (id, name, publication) VALUES ($1, $2, $3) RETURNING {}",
                        critic_table(session),
                        CRITIC_COLUMNS
                    );
                    let created = sqlx::query_as::<_, Critic>(&sql)
                        .bind(Uuid::new_v4())
                        .bind(critic.name)
                        .bind(critic.publication)
                        .fetch_one(session.connection())
                        .await?;
                    Ok::<_, DbError>(created)
                })
            })
            .await
    }

    async fn delete_critic(&self, id: Uuid) -> Result<DeleteResult, DbError> {
        self.ctx
            .with_session(self.ctx.shared_schema(), move |session| {
                Box::pin(async move {
                    let sql = format!("DELETE FROM {} WHERE id = $1", critic_table(session));
                    let result = sqlx::query(&sql)
                        .bind(id)
                        .execute(session.connection())
                        .await?;

                    if result.rows_affected() == 0 {
                        return Err(DbError::NotFound(format!("Critic {}", id)));
                    }
                    Ok::<_, DbError>(DeleteResult::deleted("Critic", result.rows_affected()))
                })
            })
            .await
    }
}

impl Store for PostgresStore {}
