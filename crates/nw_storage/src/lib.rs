use std::sync::Arc;

use nw_core::{Error, RawStore, Result};

pub mod backends;

pub use backends::memory::MemoryStore;
pub use backends::postgres::PostgresStore;
pub use backends::sqlite::SqliteStore;

/// Build a store from a backend name and an optional connection URL.
pub async fn create_store(backend: &str, url: Option<&str>) -> Result<Arc<dyn RawStore>> {
    match backend {
        "memory" => Ok(Arc::new(MemoryStore::new())),
        "sqlite" => {
            let url = url.unwrap_or("sqlite://raw_data.db?mode=rwc");
            Ok(Arc::new(SqliteStore::connect(url).await?))
        }
        "postgres" => {
            let url = url.ok_or_else(|| {
                Error::Storage("postgres backend requires a database URL".to_string())
            })?;
            Ok(Arc::new(PostgresStore::connect(url).await?))
        }
        other => Err(Error::Storage(format!("unknown storage backend: {}", other))),
    }
}

pub mod prelude {
    pub use super::backends::memory::MemoryStore;
    pub use super::backends::postgres::PostgresStore;
    pub use super::backends::sqlite::SqliteStore;
    pub use nw_core::{LoadPolicy, LoadReport, RawStore};
}
