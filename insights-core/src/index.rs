//! Hosted vector index client (Pinecone-style API).
//!
//! Two surfaces:
//! - `IndexClient` — control plane: list / create / describe, plus the
//!   startup provisioner `ensure_index`
//! - `IndexHandle` — data plane against the index host: upsert / query
//!
//! The provisioner polls at a fixed interval with no timeout; a remote that
//! never reports ready blocks startup indefinitely.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

const DEFAULT_CONTROL_URL: &str = "https://api.pinecone.io";

/// Vector index API errors
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("Missing API key")]
    MissingApiKey,
}

// ============================================================================
// Wire types
// ============================================================================

/// Index creation parameters, fixed by configuration.
#[derive(Debug, Clone)]
pub struct IndexSpec {
    pub name: String,
    pub dimension: usize,
    pub metric: String,
    pub cloud: String,
    pub region: String,
}

#[derive(Debug, Serialize)]
struct CreateIndexRequest {
    name: String,
    dimension: usize,
    metric: String,
    spec: CreateIndexSpec,
}

#[derive(Debug, Serialize)]
struct CreateIndexSpec {
    serverless: ServerlessSpec,
}

#[derive(Debug, Serialize)]
struct ServerlessSpec {
    cloud: String,
    region: String,
}

#[derive(Debug, Deserialize)]
struct IndexList {
    indexes: Vec<IndexSummary>,
}

#[derive(Debug, Deserialize)]
struct IndexSummary {
    name: String,
}

/// Control-plane view of one index.
#[derive(Debug, Clone, Deserialize)]
pub struct IndexDescription {
    pub name: String,
    pub host: String,
    pub status: IndexStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IndexStatus {
    pub ready: bool,
}

/// One vector plus its metadata, as stored in the index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorRecord {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct UpsertRequest {
    vectors: Vec<VectorRecord>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest {
    vector: Vec<f32>,
    top_k: u32,
    include_metadata: bool,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<IndexMatch>,
}

/// One nearest-neighbor match returned by a query.
#[derive(Debug, Clone, Deserialize)]
pub struct IndexMatch {
    pub id: String,
    #[serde(default)]
    pub score: f32,
    pub metadata: Option<serde_json::Value>,
}

// ============================================================================
// IndexClient (control plane)
// ============================================================================

/// Control-plane client: index lifecycle and the startup provisioner.
#[derive(Debug, Clone)]
pub struct IndexClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl IndexClient {
    pub fn new(api_key: String) -> Result<Self, IndexError> {
        Self::with_base_url(api_key, DEFAULT_CONTROL_URL.to_string())
    }

    /// Create a client with a custom base URL (for testing / integration)
    pub fn with_base_url(api_key: String, base_url: String) -> Result<Self, IndexError> {
        if api_key.is_empty() {
            return Err(IndexError::MissingApiKey);
        }

        Ok(Self {
            client: Client::new(),
            api_key,
            base_url,
        })
    }

    /// List the names of all indexes in the project.
    pub async fn list_names(&self) -> Result<Vec<String>, IndexError> {
        let url = format!("{}/indexes", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("Api-Key", &self.api_key)
            .send()
            .await?;

        let list: IndexList = Self::check(response).await?.json().await?;
        Ok(list.indexes.into_iter().map(|i| i.name).collect())
    }

    /// Issue a create request for the index described by `spec`.
    pub async fn create(&self, spec: &IndexSpec) -> Result<(), IndexError> {
        let url = format!("{}/indexes", self.base_url);
        let request = CreateIndexRequest {
            name: spec.name.clone(),
            dimension: spec.dimension,
            metric: spec.metric.clone(),
            spec: CreateIndexSpec {
                serverless: ServerlessSpec {
                    cloud: spec.cloud.clone(),
                    region: spec.region.clone(),
                },
            },
        };

        let response = self
            .client
            .post(&url)
            .header("Api-Key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    /// Describe one index by name (host + readiness).
    pub async fn describe(&self, name: &str) -> Result<IndexDescription, IndexError> {
        let url = format!("{}/indexes/{}", self.base_url, name);
        let response = self
            .client
            .get(&url)
            .header("Api-Key", &self.api_key)
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }

    /// Startup provisioner: create the index if absent, then poll describe
    /// at `poll_interval` until the remote reports ready. Returns the
    /// data-plane host. No timeout and no cancellation.
    pub async fn ensure_index(
        &self,
        spec: &IndexSpec,
        poll_interval: Duration,
    ) -> Result<String, IndexError> {
        let names = self.list_names().await?;

        if names.iter().any(|n| n == &spec.name) {
            tracing::info!(index = %spec.name, "Index already exists");
            let description = self.describe(&spec.name).await?;
            return Ok(description.host);
        }

        tracing::info!(
            index = %spec.name,
            dimension = spec.dimension,
            metric = %spec.metric,
            "Creating index"
        );
        self.create(spec).await?;

        loop {
            let description = self.describe(&spec.name).await?;
            if description.status.ready {
                tracing::info!(index = %spec.name, host = %description.host, "Index created successfully");
                return Ok(description.host);
            }
            tracing::debug!(index = %spec.name, "Index not ready yet, polling");
            tokio::time::sleep(poll_interval).await;
        }
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, IndexError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_default();
        tracing::error!(code = status.as_u16(), message = %message, "Vector index API error");
        Err(IndexError::Api {
            code: status.as_u16(),
            message,
        })
    }
}

// ============================================================================
// IndexHandle (data plane)
// ============================================================================

/// Data-plane client bound to one index host.
#[derive(Debug, Clone)]
pub struct IndexHandle {
    client: Client,
    api_key: String,
    base_url: String,
}

impl IndexHandle {
    /// Connect to the host returned by `describe` / `ensure_index`.
    pub fn new(host: &str, api_key: String) -> Result<Self, IndexError> {
        Self::with_base_url(api_key, format!("https://{host}"))
    }

    /// Create a handle with a custom base URL (for testing / integration)
    pub fn with_base_url(api_key: String, base_url: String) -> Result<Self, IndexError> {
        if api_key.is_empty() {
            return Err(IndexError::MissingApiKey);
        }

        Ok(Self {
            client: Client::new(),
            api_key,
            base_url,
        })
    }

    /// Upsert a single vector with its metadata attached verbatim.
    pub async fn upsert(&self, record: VectorRecord) -> Result<(), IndexError> {
        let url = format!("{}/vectors/upsert", self.base_url);
        let request = UpsertRequest {
            vectors: vec![record],
        };

        let response = self
            .client
            .post(&url)
            .header("Api-Key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        IndexClient::check(response).await?;
        Ok(())
    }

    /// Return the `top_k` nearest neighbors with metadata included.
    pub async fn query(&self, vector: Vec<f32>, top_k: u32) -> Result<Vec<IndexMatch>, IndexError> {
        let url = format!("{}/query", self.base_url);
        let request = QueryRequest {
            vector,
            top_k,
            include_metadata: true,
        };

        let response = self
            .client
            .post(&url)
            .header("Api-Key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let query_response: QueryResponse = IndexClient::check(response).await?.json().await?;
        Ok(query_response.matches)
    }
}

// ============================================================================
// TESTS
// ============================================================================
