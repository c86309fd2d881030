use tracing::{info, warn};

use nw_core::{Error, LoadPolicy, LoadReport, RawStore, Result, RunState};

/// Third pipeline stage: read the row set and the published count out of the
/// run state and insert one row per article.
///
/// The published count is an assertion over the row set, not the iteration
/// driver: if the two ever diverge the run fails before a single statement
/// reaches the store.
pub async fn load(store: &dyn RawStore, state: &RunState, policy: LoadPolicy) -> Result<LoadReport> {
    let rows = state.row_set()?;
    let published = state.published_count()?;
    if published != rows.len() {
        return Err(Error::Handoff(format!(
            "published count {} does not match row set length {}",
            published,
            rows.len()
        )));
    }

    if rows.is_empty() {
        info!(run_id = %state.run_id(), "row set is empty, nothing to load");
        return Ok(LoadReport::default());
    }

    let report = store.insert_rows(&rows, policy).await?;
    for failure in &report.failures {
        warn!(
            run_id = %state.run_id(),
            index = failure.index,
            date = %failure.date,
            url = %failure.url,
            reason = %failure.reason,
            "row rejected by the store"
        );
    }
    if !report.failures.is_empty() {
        return Err(Error::Storage(format!(
            "{} of {} rows failed to insert",
            report.failures.len(),
            report.attempted
        )));
    }

    info!(run_id = %state.run_id(), inserted = report.inserted, "load complete");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nw_core::{Article, ROW_COUNT_KEY};
    use nw_storage::MemoryStore;

    fn article(n: u32) -> Article {
        Article {
            title: format!("Title {}", n),
            abstract_text: format!("Abstract {}", n),
            url: format!("https://nytimes.com/{}", n),
            created_date: format!("2023-01-{:02}", n),
        }
    }

    #[tokio::test]
    async fn loads_every_published_row() {
        let store = MemoryStore::new();
        let mut state = RunState::new();
        state
            .publish_row_set(&[article(1), article(2)])
            .unwrap();

        let report = load(&store, &state, LoadPolicy::FailFast).await.unwrap();

        assert_eq!(report.attempted, 2);
        assert_eq!(report.inserted, 2);
        assert_eq!(store.fetch_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn empty_row_set_is_success() {
        let store = MemoryStore::new();
        let mut state = RunState::new();
        state.publish_row_set(&[]).unwrap();

        let report = load(&store, &state, LoadPolicy::FailFast).await.unwrap();

        assert_eq!(report.attempted, 0);
        assert!(store.fetch_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_handoff_keys_fail_the_stage() {
        let store = MemoryStore::new();
        let state = RunState::new();

        let err = load(&store, &state, LoadPolicy::FailFast).await.unwrap_err();
        assert!(matches!(err, Error::Handoff(_)));
        assert!(store.fetch_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn diverged_count_fails_before_any_insert() {
        let store = MemoryStore::new();
        let mut state = RunState::new();
        state.publish_row_set(&[article(1), article(2)]).unwrap();
        // Simulate a stale count left over from another producer.
        state.put(ROW_COUNT_KEY, &7usize).unwrap();

        let err = load(&store, &state, LoadPolicy::FailFast).await.unwrap_err();

        assert!(matches!(err, Error::Handoff(_)));
        assert!(store.fetch_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn best_effort_failures_still_fail_the_stage() {
        let store = MemoryStore::new();
        store
            .insert_rows(&[article(1)], LoadPolicy::FailFast)
            .await
            .unwrap();

        let mut dup = article(2);
        dup.created_date = article(1).created_date;
        let mut state = RunState::new();
        state.publish_row_set(&[dup, article(3)]).unwrap();

        let err = load(&store, &state, LoadPolicy::BestEffort)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Storage(_)));
        // The non-conflicting row was still inserted.
        assert_eq!(store.fetch_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn fail_fast_surfaces_the_violating_row() {
        let store = MemoryStore::new();
        store
            .insert_rows(&[article(1)], LoadPolicy::FailFast)
            .await
            .unwrap();

        let mut dup = article(2);
        dup.url = article(1).url;
        let mut state = RunState::new();
        state.publish_row_set(&[article(3), dup]).unwrap();

        let err = load(&store, &state, LoadPolicy::FailFast).await.unwrap_err();
        assert!(matches!(err, Error::ConstraintViolation { index: 1, .. }));
    }
}
