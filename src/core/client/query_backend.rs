use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::chart::dto::chart_query_request::ChartQueryRequest;
use crate::domain::chart::model::RawAggregationResponse;

/// Time-series search backend. Failures surface as `Err`; retry policy is the
/// backend's business.
#[async_trait]
pub trait QueryBackend: Send + Sync {
    async fn search(&self, request: &ChartQueryRequest) -> Result<RawAggregationResponse>;
}

#[async_trait]
impl<T: QueryBackend + ?Sized> QueryBackend for Arc<T> {
    async fn search(&self, request: &ChartQueryRequest) -> Result<RawAggregationResponse> {
        (**self).search(request).await
    }
}

/// JSON-over-HTTP backend: POSTs the search body, expects a bucket list back.
pub struct HttpQueryBackend {
    client: Client,
    url: String,
    token: Option<String>,
}

impl HttpQueryBackend {
    pub fn new(client: Client, url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            client,
            url: url.into(),
            token,
        }
    }

    pub fn from_url(url: impl Into<String>, token: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| anyhow!("Failed to build HTTP client: {}", e))?;
        Ok(Self::new(client, url, token))
    }
}

#[async_trait]
impl QueryBackend for HttpQueryBackend {
    async fn search(&self, request: &ChartQueryRequest) -> Result<RawAggregationResponse> {
        let request_id = Uuid::new_v4();
        debug!(
            %request_id,
            query_type = %request.query_type,
            start = request.start_date.timestamp_millis(),
            end = request.end_date.timestamp_millis(),
            "Sending chart query"
        );

        let mut builder = self
            .client
            .post(&self.url)
            .header("x-request-id", request_id.to_string())
            .json(request);
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }

        let resp = builder
            .send()
            .await
            .map_err(|e| anyhow!("Query backend unreachable (url={}, request_id={}): {}", self.url, request_id, e))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            warn!(%request_id, %status, "Query backend rejected chart query");
            return Err(anyhow!("Query backend returned {}: {} (request_id={})", status, text, request_id));
        }

        let raw = resp
            .json::<RawAggregationResponse>()
            .await
            .map_err(|e| anyhow!("Invalid query backend response (request_id={}): {}", request_id, e))?;

        debug!(%request_id, buckets = raw.buckets.len(), "Chart query answered");
        Ok(raw)
    }
}
