use async_trait::async_trait;
use crate::types::Article;
use crate::Result;

/// Batch behavior when a row violates a table constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum LoadPolicy {
    /// Abort on the first failing row and roll back the whole batch.
    #[default]
    FailFast,
    /// Attempt every row; failures are collected and still fail the run.
    BestEffort,
}

impl std::fmt::Display for LoadPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadPolicy::FailFast => write!(f, "fail-fast"),
            LoadPolicy::BestEffort => write!(f, "best-effort"),
        }
    }
}

/// One rejected row, with enough context to find it in the feed again.
#[derive(Debug, Clone)]
pub struct RowFailure {
    pub index: usize,
    pub date: String,
    pub url: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub attempted: usize,
    pub inserted: usize,
    pub failures: Vec<RowFailure>,
}

#[async_trait]
pub trait RawStore: Send + Sync {
    /// Create the raw_data table if it does not exist. Safe to call on every
    /// run; never touches data.
    async fn ensure_schema(&self) -> Result<()>;

    /// Insert one row per article under the given batch policy. Under
    /// `FailFast` the first constraint violation is returned as an error and
    /// nothing from the batch is kept; under `BestEffort` violations end up
    /// in the report's failure list.
    async fn insert_rows(&self, rows: &[Article], policy: LoadPolicy) -> Result<LoadReport>;

    /// Every persisted row, ordered by date.
    async fn fetch_all(&self) -> Result<Vec<Article>>;
}
