//! JSON-over-HTTP adapter for a single Typesense node.

use crate::{SearchService, ServiceError};
use async_trait::async_trait;
use core_types::config::ConnectionConfig;
use core_types::{CollectionSchema, Document, SearchParams, SearchResponse};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::instrument;
use url::Url;

pub const API_KEY_HEADER: &str = "X-TYPESENSE-API-KEY";

/// Talks to `/collections` on one node using a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpSearchService {
    client: Client,
    base_url: Url,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl HttpSearchService {
    pub fn new(cfg: &ConnectionConfig) -> Result<Self, ServiceError> {
        let base_url = Url::parse(&cfg.base_url())
            .map_err(|e| ServiceError::Connection(format!("invalid server address: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ServiceError::Connection(format!(
                "invalid server address: {base_url}"
            )));
        }

        let mut key = HeaderValue::from_str(&cfg.api_key)
            .map_err(|_| ServiceError::Connection("API key contains invalid characters".into()))?;
        key.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, key);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(cfg.connection_timeout_seconds))
            .build()
            .map_err(|e| ServiceError::Connection(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, base_url })
    }

    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append percent-encoded path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Checked in `new`: the base URL always has a path.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ServiceError> {
        let response = request
            .send()
            .await
            .map_err(|e| ServiceError::Connection(transport_message(&e)))?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| ServiceError::Connection(format!("invalid response body: {e}")));
        }

        let body = response.text().await.unwrap_or_default();
        Err(error_from_status(status, &body))
    }
}

fn transport_message(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "request timed out".to_string()
    } else if err.is_connect() {
        format!("could not connect to server: {err}")
    } else {
        err.to_string()
    }
}

/// Map a non-2xx answer onto an error kind, preferring the server's own message.
pub(crate) fn error_from_status(status: StatusCode, body: &str) -> ServiceError {
    let message = serde_json::from_str::<ErrorBody>(body).map_or_else(
        |_| {
            status
                .canonical_reason()
                .unwrap_or("unexpected response")
                .to_string()
        },
        |b| b.message,
    );

    match status {
        StatusCode::NOT_FOUND => ServiceError::NotFound(message),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => ServiceError::Query(message),
        other => ServiceError::Connection(format!("{other}: {message}")),
    }
}

#[async_trait]
impl SearchService for HttpSearchService {
    #[instrument(level = "debug", skip(self))]
    async fn list_collections(&self) -> Result<Vec<CollectionSchema>, ServiceError> {
        let url = self.endpoint(&["collections"]);
        self.send(self.client.get(url)).await
    }

    #[instrument(level = "debug", skip(self))]
    async fn fetch_collection_schema(&self, name: &str) -> Result<CollectionSchema, ServiceError> {
        let url = self.endpoint(&["collections", name]);
        self.send(self.client.get(url)).await
    }

    #[instrument(level = "debug", skip(self))]
    async fn delete_collection(&self, name: &str) -> Result<(), ServiceError> {
        let url = self.endpoint(&["collections", name]);
        let _: serde_json::Value = self.send(self.client.delete(url)).await?;
        Ok(())
    }

    #[instrument(level = "debug", skip(self, params), fields(page = params.page))]
    async fn search(
        &self,
        collection: &str,
        params: &SearchParams,
    ) -> Result<SearchResponse, ServiceError> {
        let url = self.endpoint(&["collections", collection, "documents", "search"]);
        self.send(self.client.get(url).query(params)).await
    }

    #[instrument(level = "debug", skip(self))]
    async fn get_document(&self, collection: &str, id: &str) -> Result<Document, ServiceError> {
        let url = self.endpoint(&["collections", collection, "documents", id]);
        self.send(self.client.get(url)).await
    }

    #[instrument(level = "debug", skip(self))]
    async fn delete_document(&self, collection: &str, id: &str) -> Result<(), ServiceError> {
        let url = self.endpoint(&["collections", collection, "documents", id]);
        let _: serde_json::Value = self.send(self.client.delete(url)).await?;
        Ok(())
    }
}
