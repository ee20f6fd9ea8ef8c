//! Connection-scoped state: the service handle, the collection list, and the
//! document browser that works on one selected collection.

use crate::driver::DocumentBrowser;
use client::{HttpSearchService, SearchService, ServiceError};
use core_types::config::ConnectionConfig;
use core_types::{CollectionSchema, Document};
use std::sync::Arc;
use tracing::{info, warn};

/// A live connection. Dropping it (or calling [`Session::disconnect`]) tears
/// down the service handle.
pub struct Session<S: ?Sized> {
    service: Arc<S>,
    collections: Vec<CollectionSchema>,
    browser: DocumentBrowser<S>,
}

impl Session<HttpSearchService> {
    /// Build an HTTP client for `cfg` and verify the server answers.
    pub async fn connect(cfg: &ConnectionConfig) -> Result<Self, ServiceError> {
        let service = HttpSearchService::new(cfg)?;
        info!(url = %service.base_url(), "connecting to Typesense");
        Self::with_service(Arc::new(service)).await
    }
}

impl<S: SearchService + ?Sized> Session<S> {
    /// Listing collections doubles as the connection test.
    pub async fn with_service(service: Arc<S>) -> Result<Self, ServiceError> {
        let collections = service.list_collections().await.inspect_err(|e| {
            warn!(error = %e, "connection test failed");
        })?;
        info!(collections = collections.len(), "connected");
        Ok(Self {
            browser: DocumentBrowser::new(Arc::clone(&service)),
            service,
            collections,
        })
    }

    pub fn collections(&self) -> &[CollectionSchema] {
        &self.collections
    }

    /// Case-insensitive substring match on collection names.
    pub fn filter_collections(&self, needle: &str) -> Vec<&CollectionSchema> {
        let needle = needle.to_lowercase();
        self.collections
            .iter()
            .filter(|c| c.name.to_lowercase().contains(&needle))
            .collect()
    }

    pub async fn refresh_collections(&mut self) -> Result<(), ServiceError> {
        self.collections = self.service.list_collections().await?;
        Ok(())
    }

    pub const fn browser(&self) -> &DocumentBrowser<S> {
        &self.browser
    }

    pub fn browser_mut(&mut self) -> &mut DocumentBrowser<S> {
        &mut self.browser
    }

    pub async fn select_collection(&mut self, name: Option<&str>) {
        self.browser.select_collection(name).await;
    }

    /// Delete a collection, deselecting it first if it is being browsed.
    pub async fn delete_collection(&mut self, name: &str) -> Result<(), ServiceError> {
        self.service.delete_collection(name).await?;
        info!(collection = name, "collection deleted");
        if self.browser.state().selected() == Some(name) {
            self.browser.select_collection(None).await;
        }
        self.refresh_collections().await
    }

    pub async fn get_document(&self, collection: &str, id: &str) -> Result<Document, ServiceError> {
        self.service.get_document(collection, id).await
    }

    /// Delete one document; re-runs the current search when it came from the browsed collection.
    pub async fn delete_document(
        &mut self,
        collection: &str,
        id: &str,
    ) -> Result<(), ServiceError> {
        self.service.delete_document(collection, id).await?;
        info!(collection, id, "document deleted");
        if self.browser.state().selected() == Some(collection) {
            self.browser.refresh().await;
        }
        Ok(())
    }

    pub fn disconnect(self) {
        info!("disconnected");
    }
}
