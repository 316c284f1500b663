//! Database connectivity: startup connection with retry, and schema bootstrap.

use sqlx::postgres::{PgConnection, PgPoolOptions};
use sqlx::{Connection, PgPool};
use thiserror::Error;
use tracing::instrument;

use crate::config::DatabaseConfig;
use crate::post_store::postgres::map_sqlx_error;
use crate::retry::RetryPolicy;

/// DDL for the `posts` table. Safe to run any number of times.
pub const POSTS_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS posts (
    id SERIAL PRIMARY KEY,
    title VARCHAR NOT NULL,
    content VARCHAR NOT NULL,
    published BOOLEAN NOT NULL DEFAULT FALSE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
)
"#;

/// Startup connectivity error.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("database unreachable after {attempts} attempt(s): {last_error}")]
    Unreachable { attempts: u32, last_error: String },

    #[error("failed to ensure schema: {0}")]
    Schema(String),
}

/// Open the connection pool, retrying per `policy` while the database is unreachable.
///
/// Each attempt is a single direct connection, so it fails as soon as the
/// server refuses it and the policy's delay is the real gap between attempts.
/// The pool is built only after one attempt succeeds.
///
/// Only this initial connection is retried; requests served later through the
/// pool never are.
#[instrument(skip(config, policy), fields(host = %config.hostname, port = config.port, database = %config.name))]
pub async fn connect_with_retry(
    config: &DatabaseConfig,
    max_connections: u32,
    policy: &RetryPolicy,
) -> Result<PgPool, ConnectError> {
    let options = config.connect_options();
    let probe_options = &options;

    let probe = policy
        .run("database connection", move |_attempt| PgConnection::connect_with(probe_options))
        .await
        .map_err(|(attempts, e)| ConnectError::Unreachable {
            attempts,
            last_error: e.to_string(),
        })?;

    if let Err(e) = probe.close().await {
        tracing::debug!(error = %e, "closing startup probe connection failed");
    }

    Ok(PgPoolOptions::new()
        .max_connections(max_connections)
        .connect_lazy_with(options))
}

/// Create the `posts` table if it does not already exist.
#[instrument(skip(pool))]
pub async fn ensure_schema(pool: &PgPool) -> Result<(), ConnectError> {
    sqlx::query(POSTS_SCHEMA)
        .execute(pool)
        .await
        .map_err(|e| ConnectError::Schema(map_sqlx_error("ensure_schema", e).to_string()))?;

    tracing::info!("posts schema ensured");
    Ok(())
}
