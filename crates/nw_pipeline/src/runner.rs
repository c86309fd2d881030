use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use nw_core::{LoadPolicy, RawStore, Result, RunState};
use nw_extract::Extractor;

use crate::loader;

/// One scheduled execution: Extractor, then SchemaProvisioner, then
/// BulkLoader, strictly in that order. The first failing stage aborts the
/// run and its error becomes the run outcome, so the host scheduler can
/// decide on retry or alerting.
pub struct Pipeline {
    extractor: Extractor,
    store: Arc<dyn RawStore>,
    policy: LoadPolicy,
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub extracted: usize,
    pub inserted: usize,
}

impl Pipeline {
    pub fn new(extractor: Extractor, store: Arc<dyn RawStore>, policy: LoadPolicy) -> Self {
        Self {
            extractor,
            store,
            policy,
        }
    }

    pub async fn run(&self) -> Result<RunSummary> {
        let mut state = RunState::new();
        let run_id = state.run_id();
        info!(%run_id, "starting pipeline run");

        let extracted = self.extractor.run(&mut state).await?;
        self.store.ensure_schema().await?;
        let report = loader::load(self.store.as_ref(), &state, self.policy).await?;

        info!(%run_id, extracted, inserted = report.inserted, "pipeline run complete");
        Ok(RunSummary {
            run_id,
            started_at: state.started_at(),
            extracted,
            inserted: report.inserted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nw_storage::MemoryStore;
    use serde_json::json;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn feed_item(item_type: &str, abstract_text: &str, n: u32) -> serde_json::Value {
        json!({
            "item_type": item_type,
            "abstract": abstract_text,
            "title": format!("T{}", n),
            "url": format!("https://nytimes.com/{}", n),
            "created_date": format!("2023-01-{:02}", n),
        })
    }

    async fn serve(template: ResponseTemplate) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("api-key", "test-key"))
            .respond_with(template)
            .mount(&server)
            .await;
        server
    }

    fn pipeline(server: &MockServer, store: Arc<MemoryStore>) -> Pipeline {
        let extractor = Extractor::new(format!("{}/business.json", server.uri()), "test-key").unwrap();
        Pipeline::new(extractor, store, LoadPolicy::FailFast)
    }

    #[tokio::test]
    async fn mixed_feed_loads_only_qualifying_articles() {
        let body = json!({"results": [
            feed_item("Article", "A", 1),
            feed_item("Video", "B", 2),
            feed_item("Article", "", 3),
        ]});
        let server = serve(ResponseTemplate::new(200).set_body_json(body)).await;
        let store = Arc::new(MemoryStore::new());

        let summary = pipeline(&server, store.clone()).run().await.unwrap();

        assert_eq!(summary.extracted, 1);
        assert_eq!(summary.inserted, 1);
        let rows = store.fetch_all().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title, "T1");
        assert_eq!(store.times_provisioned(), 1);
    }

    #[tokio::test]
    async fn upstream_500_aborts_before_provisioning_and_loading() {
        let server = serve(ResponseTemplate::new(500)).await;
        let store = Arc::new(MemoryStore::new());

        let err = pipeline(&server, store.clone()).run().await.unwrap_err();

        assert!(matches!(err, nw_core::Error::UpstreamStatus { status: 500 }));
        assert_eq!(store.times_provisioned(), 0);
        assert!(store.fetch_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_feed_is_a_successful_run() {
        let server = serve(ResponseTemplate::new(200).set_body_json(json!({"results": []}))).await;
        let store = Arc::new(MemoryStore::new());

        let summary = pipeline(&server, store.clone()).run().await.unwrap();

        assert_eq!(summary.extracted, 0);
        assert_eq!(summary.inserted, 0);
        // Provisioning still runs; only the load had nothing to do.
        assert_eq!(store.times_provisioned(), 1);
    }

    #[tokio::test]
    async fn repeated_runs_keep_provisioning_idempotent() {
        let body = json!({"results": [feed_item("Article", "A", 1)]});
        let server = serve(ResponseTemplate::new(200).set_body_json(body)).await;
        let store = Arc::new(MemoryStore::new());
        let pipeline = pipeline(&server, store.clone());

        pipeline.run().await.unwrap();
        // Same article again: extraction succeeds, the load hits the
        // primary-key constraint.
        let err = pipeline.run().await.unwrap_err();

        assert!(matches!(err, nw_core::Error::ConstraintViolation { .. }));
        assert_eq!(store.times_provisioned(), 2);
        assert_eq!(store.fetch_all().await.unwrap().len(), 1);
    }
}
