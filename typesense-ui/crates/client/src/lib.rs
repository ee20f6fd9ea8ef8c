//! Search service boundary for Typesense UI.
//!
//! The browser state machine only talks to a [`SearchService`]. Production
//! code plugs in [`HttpSearchService`]; tests plug in an in-memory fake. A
//! service handle is created on connect and dropped on disconnect, there is
//! no process-wide client.

use async_trait::async_trait;
use core_types::{CollectionSchema, Document, SearchParams, SearchResponse};
use thiserror::Error;

pub mod http;

pub use http::HttpSearchService;

/// Failure categories surfaced by a search service.
///
/// The payload is the human-readable message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// Collection or document does not exist.
    #[error("{0}")]
    NotFound(String),
    /// Server unreachable, rejected the credentials, or answered garbage.
    #[error("{0}")]
    Connection(String),
    /// Malformed filter/sort/query syntax.
    #[error("{0}")]
    Query(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Connection,
    Query,
}

impl ServiceError {
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Connection(_) => ErrorKind::Connection,
            Self::Query(_) => ErrorKind::Query,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::NotFound(m) | Self::Connection(m) | Self::Query(m) => m,
        }
    }
}

/// Operations the admin UI needs from a Typesense server.
#[async_trait]
pub trait SearchService: Send + Sync {
    async fn list_collections(&self) -> Result<Vec<CollectionSchema>, ServiceError>;

    async fn fetch_collection_schema(&self, name: &str) -> Result<CollectionSchema, ServiceError>;

    async fn delete_collection(&self, name: &str) -> Result<(), ServiceError>;

    async fn search(
        &self,
        collection: &str,
        params: &SearchParams,
    ) -> Result<SearchResponse, ServiceError>;

    async fn get_document(&self, collection: &str, id: &str) -> Result<Document, ServiceError>;

    async fn delete_document(&self, collection: &str, id: &str) -> Result<(), ServiceError>;
}
