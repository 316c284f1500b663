//! Postgres-backed post store.
//!
//! ## Sessions
//!
//! Every operation opens its own transaction on the pool, which is the
//! request's session. The transaction is committed before the operation
//! returns. On any error path it is dropped uncommitted, which rolls it back
//! and hands the connection back to the pool.
//!
//! ## Error Mapping
//!
//! | SQLx Error | StoreError |
//! |------------|------------|
//! | Database (any code) | `Database` (message includes the SQLSTATE code) |
//! | PoolClosed / PoolTimedOut | `Database` |
//! | RowNotFound | `Database` (the queries use `fetch_optional`/`fetch_all`) |
//! | Other | `Database` |
//!
//! Missing rows are detected from the query result and reported as `NotFound`.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::instrument;

use postapi_core::{Post, PostDraft, PostId};

use super::r#trait::{PostStore, StoreError};

/// Postgres-backed post store.
///
/// `PgPool` is internally reference counted, so cloning the store is cheap
/// and all clones share one pool.
#[derive(Debug, Clone)]
pub struct PostgresPostStore {
    pool: PgPool,
}

impl PostgresPostStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn session(&self) -> Result<Transaction<'static, Postgres>, StoreError> {
        self.pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin", e))
    }
}

#[derive(Debug)]
struct PostRow {
    id: i32,
    title: String,
    content: String,
    published: bool,
    created_at: DateTime<Utc>,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for PostRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(PostRow {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            content: row.try_get("content")?,
            published: row.try_get("published")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Post {
            id: PostId::new(row.id),
            title: row.title,
            content: row.content,
            published: row.published,
            created_at: row.created_at,
        }
    }
}

#[async_trait::async_trait]
impl PostStore for PostgresPostStore {
    #[instrument(skip(self), err)]
    async fn list(&self) -> Result<Vec<Post>, StoreError> {
        let mut tx = self.session().await?;

        let rows = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, title, content, published, created_at
            FROM posts
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("list_posts", e))?;

        tx.commit().await.map_err(|e| map_sqlx_error("commit", e))?;

        tracing::debug!(post_count = rows.len(), "listed posts");
        Ok(rows.into_iter().map(Post::from).collect())
    }

    #[instrument(skip(self), fields(post_id = %id), err)]
    async fn get(&self, id: PostId) -> Result<Post, StoreError> {
        let mut tx = self.session().await?;

        let row = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, title, content, published, created_at
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id.get())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("get_post", e))?;

        tx.commit().await.map_err(|e| map_sqlx_error("commit", e))?;

        row.map(Post::from).ok_or(StoreError::NotFound(id))
    }

    #[instrument(skip(self, draft), err)]
    async fn create(&self, draft: PostDraft) -> Result<Post, StoreError> {
        let mut tx = self.session().await?;

        let row = sqlx::query_as::<_, PostRow>(
            r#"
            INSERT INTO posts (title, content, published)
            VALUES ($1, $2, $3)
            RETURNING id, title, content, published, created_at
            "#,
        )
        .bind(draft.title.as_str())
        .bind(&draft.content)
        .bind(draft.published)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("create_post", e))?;

        tx.commit().await.map_err(|e| map_sqlx_error("commit", e))?;

        Ok(row.into())
    }

    #[instrument(skip(self, draft), fields(post_id = %id), err)]
    async fn update(&self, id: PostId, draft: PostDraft) -> Result<Post, StoreError> {
        let mut tx = self.session().await?;

        let row = sqlx::query_as::<_, PostRow>(
            r#"
            UPDATE posts
            SET title = $2, content = $3, published = $4
            WHERE id = $1
            RETURNING id, title, content, published, created_at
            "#,
        )
        .bind(id.get())
        .bind(draft.title.as_str())
        .bind(&draft.content)
        .bind(draft.published)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("update_post", e))?;

        // Nothing matched: drop the session without committing.
        let Some(row) = row else {
            return Err(StoreError::NotFound(id));
        };

        tx.commit().await.map_err(|e| map_sqlx_error("commit", e))?;

        Ok(row.into())
    }

    #[instrument(skip(self), fields(post_id = %id), err)]
    async fn delete(&self, id: PostId) -> Result<(), StoreError> {
        let mut tx = self.session().await?;

        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id.get())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("delete_post", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }

        tx.commit().await.map_err(|e| map_sqlx_error("commit", e))?;

        Ok(())
    }
}

/// Map a SQLx error to `StoreError`.
pub(crate) fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let code = db_err.code().map(|c| c.into_owned()).unwrap_or_default();
            StoreError::Database(format!(
                "database error in {} [{}]: {}",
                operation,
                code,
                db_err.message()
            ))
        }
        sqlx::Error::PoolClosed => {
            StoreError::Database(format!("connection pool closed in {}", operation))
        }
        sqlx::Error::PoolTimedOut => {
            StoreError::Database(format!("timed out acquiring a connection in {}", operation))
        }
        sqlx::Error::RowNotFound => {
            StoreError::Database(format!("unexpected row not found in {}", operation))
        }
        other => StoreError::Database(format!("sqlx error in {}: {}", operation, other)),
    }
}

/// These run only when `TEST_DATABASE_URL` points at a scratch Postgres
/// database; otherwise they return early.
#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ensure_schema;

    async fn store_or_skip() -> Option<PostgresPostStore> {
        let url = std::env::var("TEST_DATABASE_URL").ok()?;
        let pool = PgPool::connect(&url).await.expect("connect to TEST_DATABASE_URL");
        ensure_schema(&pool).await.expect("ensure schema");
        Some(PostgresPostStore::new(pool))
    }

    #[tokio::test]
    async fn lifecycle_against_postgres() {
        let Some(store) = store_or_skip().await else {
            return;
        };

        let created = store
            .create(PostDraft::new("A", "B", false).unwrap())
            .await
            .unwrap();
        assert_eq!(store.get(created.id).await.unwrap(), created);

        let updated = store
            .update(created.id, PostDraft::new("C", "D", true).unwrap())
            .await
            .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!((updated.title.as_str(), updated.content.as_str(), updated.published), ("C", "D", true));

        assert!(store.list().await.unwrap().iter().any(|p| p.id == created.id));

        store.delete(created.id).await.unwrap();
        assert_eq!(store.get(created.id).await.unwrap_err(), StoreError::NotFound(created.id));
        assert_eq!(store.delete(created.id).await.unwrap_err(), StoreError::NotFound(created.id));
    }

    #[tokio::test]
    async fn update_missing_row_is_not_found() {
        let Some(store) = store_or_skip().await else {
            return;
        };

        let missing = PostId::new(i32::MAX);
        let err = store
            .update(missing, PostDraft::new("C", "D", true).unwrap())
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::NotFound(missing));
    }

    #[tokio::test]
    async fn ensure_schema_is_idempotent() {
        let Some(store) = store_or_skip().await else {
            return;
        };
        ensure_schema(store.pool()).await.unwrap();
        ensure_schema(store.pool()).await.unwrap();
    }
}
