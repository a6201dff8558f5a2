//! PostgreSQL backend

use super::{BookStore, Store, UserStore};
use crate::error::{Result, StoreError};
use crate::types::{Book, EnsuredUser, NewBook, User};
use async_trait::async_trait;
use futures_util::TryStreamExt;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use tracing::{debug, warn};

const CREATE_USERS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        id SERIAL PRIMARY KEY,
        email VARCHAR(255) UNIQUE NOT NULL,
        role VARCHAR(50) NOT NULL DEFAULT 'user'
    )
"#;

// Existing users are read without writing a tuple or locking the row. The
// statement snapshot misses a row committed by a concurrent first insert, in
// which case no row comes back and `SELECT_ROLE` re-reads it.
const ENSURE_USER: &str = r#"
    WITH inserted AS (
        INSERT INTO users (email, role) VALUES ($1, $2)
        ON CONFLICT (email) DO NOTHING
        RETURNING role
    )
    SELECT role, TRUE AS inserted FROM inserted
    UNION ALL
    SELECT role, FALSE AS inserted FROM users WHERE email = $1
    LIMIT 1
"#;

const SELECT_ROLE: &str = "SELECT role FROM users WHERE email = $1";

const FORCE_ROLE: &str = r#"
    INSERT INTO users (email, role) VALUES ($1, $2)
    ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
"#;

const UPDATE_ROLE: &str = "UPDATE users SET role = $1 WHERE email = $2";

const SELECT_BOOKS: &str = "SELECT id, title, author FROM books";

const INSERT_BOOK: &str = "INSERT INTO books (title, author) VALUES ($1, $2)";

/// Store backed by a `sqlx` connection pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect eagerly, failing if the database is unreachable
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        Ok(Self { pool })
    }

    /// Build the pool without opening a connection
    pub fn connect_lazy(url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect_lazy(url)?;
        Ok(Self { pool })
    }

    /// Wrap an existing pool
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Decode one `books` row. Accepts both INTEGER and BIGINT identities.
fn decode_book(row: &PgRow) -> Result<Book> {
    let id = match row.try_get::<i64, _>("id") {
        Ok(id) => id,
        Err(_) => row
            .try_get::<i32, _>("id")
            .map(i64::from)
            .map_err(|e| StoreError::Decode(e.to_string()))?,
    };
    let title = row
        .try_get::<String, _>("title")
        .map_err(|e| StoreError::Decode(e.to_string()))?;
    let author = row
        .try_get::<String, _>("author")
        .map_err(|e| StoreError::Decode(e.to_string()))?;

    Ok(Book { id, title, author })
}

#[async_trait]
impl UserStore for PgStore {
    async fn ensure_user(&self, email: &str, default_role: &str) -> Result<EnsuredUser> {
        let row = sqlx::query(ENSURE_USER)
            .bind(email)
            .bind(default_role)
            .fetch_optional(&self.pool)
            .await?;

        let (role, created) = match row {
            Some(row) => (row.try_get::<String, _>("role")?, row.try_get::<bool, _>("inserted")?),
            None => {
                debug!(email, "Lost first-insert race, re-reading role");
                let role = sqlx::query_scalar::<_, String>(SELECT_ROLE)
                    .bind(email)
                    .fetch_one(&self.pool)
                    .await?;
                (role, false)
            }
        };

        Ok(EnsuredUser {
            user: User::new(email, role),
            created,
        })
    }

    async fn update_role(&self, email: &str, role: &str) -> Result<u64> {
        let result = sqlx::query(UPDATE_ROLE)
            .bind(role)
            .bind(email)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(CREATE_USERS_TABLE).execute(&self.pool).await?;
        Ok(())
    }

    async fn force_role(&self, email: &str, role: &str) -> Result<()> {
        sqlx::query(FORCE_ROLE)
            .bind(email)
            .bind(role)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl BookStore for PgStore {
    async fn list_books(&self) -> Result<Vec<Book>> {
        let mut rows = sqlx::query(SELECT_BOOKS).fetch(&self.pool);
        let mut books = Vec::new();
        let mut skipped = 0u64;

        while let Some(row) = rows.try_next().await? {
            match decode_book(&row) {
                Ok(book) => books.push(book),
                Err(e) => {
                    warn!(error = %e, "Skipping undecodable book row");
                    skipped += 1;
                }
            }
        }

        if skipped > 0 {
            metrics::counter!("bookgate_book_rows_skipped_total", skipped);
        }
        debug!(count = books.len(), skipped, "Listed books");

        Ok(books)
    }

    async fn create_book(&self, book: &NewBook) -> Result<()> {
        sqlx::query(INSERT_BOOK)
            .bind(&book.title)
            .bind(&book.author)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> Result<()> {
        if self.pool.is_closed() {
            return Err(StoreError::Unavailable("pool is closed".to_string()));
        }
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
