//! Post storage: the gateway trait and its Postgres and in-memory backends.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryPostStore;
pub use postgres::PostgresPostStore;
pub use r#trait::{PostStore, StoreError};
