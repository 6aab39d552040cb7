//! Insight store — embeds generated text and persists it in the hosted
//! vector index with the repository record attached as metadata.
//!
//! Records are write-once: nothing here updates or deletes, and duplicate
//! insights accumulate without bound.

use uuid::Uuid;

use crate::embeddings::EmbeddingClient;
use crate::error::InsightsError;
use crate::index::{IndexHandle, VectorRecord};
use crate::repo::RepoRecord;

/// Fixed sentinel returned when the index holds nothing to match against.
pub const NO_INSIGHTS_SENTINEL: &str = "No relevant insights found.";

/// Metadata key under which the insight text itself is stored.
const TEXT_KEY: &str = "text";

/// Adapter pairing the embedding client with one index host.
#[derive(Debug, Clone)]
pub struct InsightStore {
    embeddings: EmbeddingClient,
    index: IndexHandle,
}

impl InsightStore {
    pub fn new(embeddings: EmbeddingClient, index: IndexHandle) -> Self {
        Self { embeddings, index }
    }

    /// Embed `text` and upsert it under a fresh id, with the record's fields
    /// attached verbatim. Returns the generated vector id.
    pub async fn store(&self, text: &str, record: &RepoRecord) -> Result<String, InsightsError> {
        let values = self.embeddings.embed(text).await?;

        let id = Uuid::new_v4().to_string();
        let mut metadata = serde_json::to_value(record)?;
        metadata[TEXT_KEY] = serde_json::Value::String(text.to_string());

        self.index
            .upsert(VectorRecord {
                id: id.clone(),
                values,
                metadata,
            })
            .await?;

        tracing::info!(id = %id, url = %record.url, "Stored insight");
        Ok(id)
    }

    /// Embed `text` and return the stored text of the single nearest
    /// neighbor, or the sentinel when the index is empty.
    ///
    /// k=1 with no score threshold: on a sparse index the top match may be
    /// unrelated to the query.
    pub async fn query(&self, text: &str) -> Result<String, InsightsError> {
        let values = self.embeddings.embed(text).await?;
        let matches = self.index.query(values, 1).await?;

        let result = matches
            .into_iter()
            .next()
            .and_then(|m| m.metadata)
            .and_then(|m| m.get(TEXT_KEY).and_then(|t| t.as_str().map(String::from)))
            .unwrap_or_else(|| NO_INSIGHTS_SENTINEL.to_string());

        Ok(result)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::EMBEDDING_DIMENSIONS;
    use crate::repo::Language;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_record() -> RepoRecord {
        RepoRecord {
            url: "https://github.com/a/b".to_string(),
            description: "A CLI tool".to_string(),
            stars: 42,
            language: Language::Other,
        }
    }

    fn mock_embedding_response() -> serde_json::Value {
        let values: Vec<f32> = (0..1536).map(|i| (i as f32) / 1536.0).collect();
        serde_json::json!({ "data": [{ "embedding": values }] })
    }

    async fn make_store(openai: &MockServer, index: &MockServer) -> InsightStore {
        let embeddings = EmbeddingClient::with_base_url(
            "test-api-key".to_string(),
            "text-embedding-ada-002".to_string(),
            EMBEDDING_DIMENSIONS,
            openai.uri(),
        )
        .unwrap();
        let handle = IndexHandle::with_base_url("test-api-key".to_string(), index.uri()).unwrap();
        InsightStore::new(embeddings, handle)
    }

    #[tokio::test]
    async fn test_store_upserts_text_and_record_metadata() {
        let openai = MockServer::start().await;
        let index = MockServer::start().await;
        let store = make_store(&openai, &index).await;

        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(mock_embedding_response()))
            .expect(1)
            .mount(&openai)
            .await;

        Mock::given(method("POST"))
            .and(path("/vectors/upsert"))
            .and(body_string_contains("Popular project."))
            .and(body_string_contains("https://github.com/a/b"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "upsertedCount": 1 })),
            )
            .expect(1)
            .mount(&index)
            .await;

        let id = store
            .store("Popular project.", &sample_record())
            .await
            .expect("store failed");

        assert!(!id.is_empty());

        // The upserted metadata carries every record field plus the text.
        let requests = index.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        let metadata = &body["vectors"][0]["metadata"];
        assert_eq!(metadata["text"], "Popular project.");
        assert_eq!(metadata["url"], "https://github.com/a/b");
        assert_eq!(metadata["description"], "A CLI tool");
        assert_eq!(metadata["stars"], 42);
        assert_eq!(metadata["language"], "Other");
    }

    #[tokio::test]
    async fn test_query_returns_top_match_text() {
        let openai = MockServer::start().await;
        let index = MockServer::start().await;
        let store = make_store(&openai, &index).await;

        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(mock_embedding_response()))
            .mount(&openai)
            .await;

        Mock::given(method("POST"))
            .and(path("/query"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "matches": [{ "id": "vec-1", "score": 0.91, "metadata": { "text": "Popular project." } }]
            })))
            .mount(&index)
            .await;

        let result = store.query("popular projects").await.expect("query failed");
        assert_eq!(result, "Popular project.");
    }

    #[tokio::test]
    async fn test_query_on_empty_index_returns_sentinel() {
        let openai = MockServer::start().await;
        let index = MockServer::start().await;
        let store = make_store(&openai, &index).await;

        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(mock_embedding_response()))
            .mount(&openai)
            .await;

        Mock::given(method("POST"))
            .and(path("/query"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "matches": [] })),
            )
            .mount(&index)
            .await;

        let result = store.query("anything").await.expect("query failed");
        assert_eq!(result, NO_INSIGHTS_SENTINEL);
    }

    #[tokio::test]
    async fn test_store_then_query_round_trips_single_record() {
        let openai = MockServer::start().await;
        let index = MockServer::start().await;
        let store = make_store(&openai, &index).await;

        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(mock_embedding_response()))
            .expect(2)
            .mount(&openai)
            .await;

        Mock::given(method("POST"))
            .and(path("/vectors/upsert"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "upsertedCount": 1 })),
            )
            .expect(1)
            .mount(&index)
            .await;

        // Single stored record: querying with the stored text returns it as
        // the top (and only) match.
        Mock::given(method("POST"))
            .and(path("/query"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "matches": [{ "id": "vec-1", "score": 1.0, "metadata": { "text": "Popular project." } }]
            })))
            .expect(1)
            .mount(&index)
            .await;

        store
            .store("Popular project.", &sample_record())
            .await
            .expect("store failed");
        let result = store.query("Popular project.").await.expect("query failed");

        assert_eq!(result, "Popular project.");
    }

    #[tokio::test]
    async fn test_store_propagates_embedding_failure_without_upsert() {
        let openai = MockServer::start().await;
        let index = MockServer::start().await;
        let store = make_store(&openai, &index).await;

        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&openai)
            .await;

        Mock::given(method("POST"))
            .and(path("/vectors/upsert"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&index)
            .await;

        let result = store.store("Popular project.", &sample_record()).await;
        assert!(matches!(result, Err(InsightsError::Embedding(_))));
    }
}
