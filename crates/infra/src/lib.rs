//! Infrastructure layer: configuration, database connectivity, and post storage.

pub mod config;
pub mod db;
pub mod post_store;
pub mod retry;

pub use config::{ConfigError, DatabaseConfig, ServerConfig, StoreKind};
pub use db::{ConnectError, connect_with_retry, ensure_schema};
pub use post_store::{InMemoryPostStore, PostStore, PostgresPostStore, StoreError};
pub use retry::{BackoffStrategy, RetryPolicy};
