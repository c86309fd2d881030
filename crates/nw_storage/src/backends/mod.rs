use nw_core::{Article, Error};

pub mod memory;
pub mod postgres;
pub mod sqlite;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;
pub use sqlite::SqliteStore;

/// Schema of the destination table, shared by every SQL backend. `date` is
/// the primary key and `url` is unique, so re-ingesting the same article
/// fails the row instead of silently duplicating or overwriting it.
pub(crate) const CREATE_RAW_DATA: &str = r#"
    CREATE TABLE IF NOT EXISTS raw_data (
        date VARCHAR(50) PRIMARY KEY,
        title VARCHAR(250) NOT NULL,
        abstract VARCHAR(250) NOT NULL,
        url VARCHAR(250) UNIQUE NOT NULL
    )
"#;

/// Map a driver error on a single insert to the pipeline taxonomy: key and
/// uniqueness conflicts become per-row constraint violations, everything
/// else stays a storage error.
pub(crate) fn classify_insert_error(index: usize, row: &Article, e: sqlx::Error) -> Error {
    match &e {
        sqlx::Error::Database(db) if matches!(
            db.kind(),
            sqlx::error::ErrorKind::UniqueViolation | sqlx::error::ErrorKind::NotNullViolation
        ) =>
        {
            Error::ConstraintViolation {
                index,
                date: row.created_date.clone(),
                url: row.url.clone(),
                reason: db.message().to_string(),
            }
        }
        _ => Error::Storage(format!("insert failed on row {}: {}", index, e)),
    }
}
