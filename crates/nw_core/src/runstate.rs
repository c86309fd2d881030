use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

use crate::types::Article;
use crate::{Error, Result};

/// Key under which the extractor publishes the filtered row set.
pub const ROW_SET_KEY: &str = "nyt_raw_data";
/// Key under which the extractor publishes the row count.
pub const ROW_COUNT_KEY: &str = "DF_LEN";

/// Run-scoped key/value handoff store between pipeline stages.
///
/// One `RunState` exists per run: created before extraction, dropped after
/// loading, never persisted. Entries are tagged with the run id so logs from
/// overlapping runs can be told apart; overlap prevention itself belongs to
/// the host scheduler.
#[derive(Debug)]
pub struct RunState {
    run_id: Uuid,
    started_at: DateTime<Utc>,
    values: HashMap<String, Value>,
}

impl RunState {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            values: HashMap::new(),
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn put<T: Serialize>(&mut self, key: &str, value: &T) -> Result<()> {
        let value = serde_json::to_value(value)?;
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let value = self
            .values
            .get(key)
            .ok_or_else(|| Error::Handoff(format!("missing handoff key: {}", key)))?;
        serde_json::from_value(value.clone()).map_err(Error::Serialization)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Publish the extracted row set and its count in one step. The count is
    /// read back from the store rather than taken from the caller, so the
    /// producer and the consumer can never disagree about what was written.
    pub fn publish_row_set(&mut self, rows: &[Article]) -> Result<usize> {
        self.put(ROW_SET_KEY, &rows)?;
        let stored: Vec<Article> = self.get(ROW_SET_KEY)?;
        let count = stored.len();
        self.put(ROW_COUNT_KEY, &count)?;
        Ok(count)
    }

    pub fn row_set(&self) -> Result<Vec<Article>> {
        self.get(ROW_SET_KEY)
    }

    pub fn published_count(&self) -> Result<usize> {
        self.get(ROW_COUNT_KEY)
    }
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}
