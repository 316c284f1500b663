use std::sync::Arc;

use anyhow::Context;

use postapi_infra::{
    connect_with_retry, ensure_schema, DatabaseConfig, InMemoryPostStore, PostStore, PostgresPostStore,
    RetryPolicy, ServerConfig, StoreKind,
};

/// Build the post store selected by `server.store`.
///
/// For Postgres this reads the database settings, waits for the database per
/// the startup retry policy, and makes sure the `posts` table exists.
pub async fn build_store(server: &ServerConfig) -> anyhow::Result<Arc<dyn PostStore>> {
    match server.store {
        StoreKind::Memory => {
            tracing::warn!("POSTAPI_STORE=memory; posts are kept in process memory only");
            Ok(Arc::new(InMemoryPostStore::new()))
        }
        StoreKind::Postgres => {
            let database = DatabaseConfig::from_env().context("invalid database configuration")?;
            let policy = RetryPolicy::from_env().context("invalid database retry configuration")?;
            tracing::info!(?database, ?policy, "connecting to postgres");

            let pool = connect_with_retry(&database, server.max_connections, &policy).await?;
            ensure_schema(&pool).await?;

            Ok(Arc::new(PostgresPostStore::new(pool)))
        }
    }
}
