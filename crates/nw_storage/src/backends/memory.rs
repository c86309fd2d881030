use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use nw_core::{Article, Error, LoadPolicy, LoadReport, RawStore, Result, RowFailure};

/// In-memory stand-in for the relational store, mirroring the `raw_data`
/// constraints: `date` is the key, `url` is unique. Used by pipeline tests
/// and available from the CLI for dry runs.
#[derive(Default)]
pub struct MemoryStore {
    rows: RwLock<Vec<Article>>,
    provisioned: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times the schema has been ensured on this store.
    pub fn times_provisioned(&self) -> usize {
        self.provisioned.load(Ordering::SeqCst)
    }

    fn conflict(existing: &[Article], row: &Article) -> Option<String> {
        if existing.iter().any(|r| r.created_date == row.created_date) {
            return Some(format!("duplicate date: {}", row.created_date));
        }
        if existing.iter().any(|r| r.url == row.url) {
            return Some(format!("duplicate url: {}", row.url));
        }
        None
    }
}

#[async_trait]
impl RawStore for MemoryStore {
    async fn ensure_schema(&self) -> Result<()> {
        self.provisioned.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn insert_rows(&self, rows: &[Article], policy: LoadPolicy) -> Result<LoadReport> {
        let mut store = self.rows.write().await;
        let mut report = LoadReport::default();

        match policy {
            LoadPolicy::FailFast => {
                // Stage into a copy so a mid-batch violation leaves the
                // store exactly as it was.
                let mut staged = store.clone();
                for (index, row) in rows.iter().enumerate() {
                    report.attempted += 1;
                    if let Some(reason) = Self::conflict(&staged, row) {
                        return Err(Error::ConstraintViolation {
                            index,
                            date: row.created_date.clone(),
                            url: row.url.clone(),
                            reason,
                        });
                    }
                    staged.push(row.clone());
                    report.inserted += 1;
                }
                *store = staged;
            }
            LoadPolicy::BestEffort => {
                for (index, row) in rows.iter().enumerate() {
                    report.attempted += 1;
                    match Self::conflict(&store, row) {
                        Some(reason) => report.failures.push(RowFailure {
                            index,
                            date: row.created_date.clone(),
                            url: row.url.clone(),
                            reason,
                        }),
                        None => {
                            store.push(row.clone());
                            report.inserted += 1;
                        }
                    }
                }
            }
        }

        Ok(report)
    }

    async fn fetch_all(&self) -> Result<Vec<Article>> {
        let mut rows = self.rows.read().await.clone();
        rows.sort_by(|a, b| a.created_date.cmp(&b.created_date));
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(n: u32) -> Article {
        Article {
            title: format!("Title {}", n),
            abstract_text: format!("Abstract {}", n),
            url: format!("https://nytimes.com/{}", n),
            created_date: format!("2023-01-{:02}", n),
        }
    }

    #[tokio::test]
    async fn fail_fast_leaves_store_untouched_on_violation() {
        let store = MemoryStore::new();
        store
            .insert_rows(&[article(1)], LoadPolicy::FailFast)
            .await
            .unwrap();

        let mut dup = article(3);
        dup.created_date = article(1).created_date;
        let err = store
            .insert_rows(&[article(2), dup], LoadPolicy::FailFast)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::ConstraintViolation { index: 1, .. }));
        assert_eq!(store.fetch_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn best_effort_reports_failures_per_row() {
        let store = MemoryStore::new();
        store
            .insert_rows(&[article(1)], LoadPolicy::FailFast)
            .await
            .unwrap();

        let mut dup = article(3);
        dup.url = article(1).url;
        let report = store
            .insert_rows(&[article(2), dup], LoadPolicy::BestEffort)
            .await
            .unwrap();

        assert_eq!(report.inserted, 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].index, 1);
        assert_eq!(store.fetch_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn provisioning_is_counted_and_harmless() {
        let store = MemoryStore::new();
        store.ensure_schema().await.unwrap();
        store.ensure_schema().await.unwrap();
        assert_eq!(store.times_provisioned(), 2);
        assert!(store.fetch_all().await.unwrap().is_empty());
    }
}
