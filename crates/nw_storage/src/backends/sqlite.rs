use std::path::Path;

use async_trait::async_trait;
use sqlx::sqlite::SqlitePool;
use sqlx::Row;
use tracing::debug;

use nw_core::{Article, Error, LoadPolicy, LoadReport, RawStore, Result, RowFailure};

use super::{classify_insert_error, CREATE_RAW_DATA};

const INSERT_ROW: &str = "INSERT INTO raw_data (date, title, abstract, url) VALUES (?, ?, ?, ?)";

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(url)
            .await
            .map_err(|e| Error::Storage(format!("failed to connect to sqlite: {}", e)))?;
        Ok(Self { pool })
    }

    /// Open (or create) a database file, creating parent directories first.
    pub async fn connect_path(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::connect(&format!("sqlite://{}?mode=rwc", path.display())).await
    }
}

#[async_trait]
impl RawStore for SqliteStore {
    async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(CREATE_RAW_DATA)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::Schema(e.to_string()))?;
        debug!("raw_data schema ensured");
        Ok(())
    }

    async fn insert_rows(&self, rows: &[Article], policy: LoadPolicy) -> Result<LoadReport> {
        let mut report = LoadReport::default();
        match policy {
            LoadPolicy::FailFast => {
                // One transaction per batch: the first violation rolls back
                // every earlier row of this run.
                let mut tx = self
                    .pool
                    .begin()
                    .await
                    .map_err(|e| Error::Storage(e.to_string()))?;
                for (index, row) in rows.iter().enumerate() {
                    report.attempted += 1;
                    sqlx::query(INSERT_ROW)
                        .bind(&row.created_date)
                        .bind(&row.title)
                        .bind(&row.abstract_text)
                        .bind(&row.url)
                        .execute(&mut *tx)
                        .await
                        .map_err(|e| classify_insert_error(index, row, e))?;
                    report.inserted += 1;
                }
                tx.commit()
                    .await
                    .map_err(|e| Error::Storage(e.to_string()))?;
            }
            LoadPolicy::BestEffort => {
                for (index, row) in rows.iter().enumerate() {
                    report.attempted += 1;
                    let outcome = sqlx::query(INSERT_ROW)
                        .bind(&row.created_date)
                        .bind(&row.title)
                        .bind(&row.abstract_text)
                        .bind(&row.url)
                        .execute(&self.pool)
                        .await;
                    match outcome {
                        Ok(_) => report.inserted += 1,
                        Err(e) => match classify_insert_error(index, row, e) {
                            Error::ConstraintViolation {
                                index,
                                date,
                                url,
                                reason,
                            } => report.failures.push(RowFailure {
                                index,
                                date,
                                url,
                                reason,
                            }),
                            other => return Err(other),
                        },
                    }
                }
            }
        }
        Ok(report)
    }

    async fn fetch_all(&self) -> Result<Vec<Article>> {
        let rows = sqlx::query("SELECT date, title, abstract, url FROM raw_data ORDER BY date")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Error::Storage(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|row| Article {
                created_date: row.get("date"),
                title: row.get("title"),
                abstract_text: row.get("abstract"),
                url: row.get("url"),
            })
            .collect())
    }
}
