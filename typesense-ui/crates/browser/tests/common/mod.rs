//! In-memory `SearchService` used by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use client::{SearchService, ServiceError};
use core_types::{CollectionSchema, Document, Field, SearchHit, SearchParams, SearchResponse};
use serde_json::json;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

#[derive(Default)]
pub struct FakeService {
    collections: Mutex<Vec<CollectionSchema>>,
    documents: Mutex<HashMap<String, Vec<Document>>>,
    schema_failures: Mutex<VecDeque<ServiceError>>,
    search_failures: Mutex<VecDeque<ServiceError>>,
    searches: Mutex<Vec<(String, SearchParams)>>,
}

impl FakeService {
    pub fn with_collection(self, schema: CollectionSchema, docs: Vec<Document>) -> Self {
        self.documents
            .lock()
            .unwrap()
            .insert(schema.name.clone(), docs);
        self.collections.lock().unwrap().push(schema);
        self
    }

    pub fn fail_next_schema(&self, err: ServiceError) {
        self.schema_failures.lock().unwrap().push_back(err);
    }

    pub fn fail_next_search(&self, err: ServiceError) {
        self.search_failures.lock().unwrap().push_back(err);
    }

    pub fn searches(&self) -> Vec<(String, SearchParams)> {
        self.searches.lock().unwrap().clone()
    }

    pub fn last_search(&self) -> SearchParams {
        self.searches
            .lock()
            .unwrap()
            .last()
            .map(|(_, p)| p.clone())
            .expect("no search recorded")
    }
}

#[async_trait]
impl SearchService for FakeService {
    async fn list_collections(&self) -> Result<Vec<CollectionSchema>, ServiceError> {
        Ok(self.collections.lock().unwrap().clone())
    }

    async fn fetch_collection_schema(&self, name: &str) -> Result<CollectionSchema, ServiceError> {
        if let Some(err) = self.schema_failures.lock().unwrap().pop_front() {
            return Err(err);
        }
        self.collections
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.name == name)
            .cloned()
            .ok_or_else(|| {
                ServiceError::NotFound(format!("No collection with name `{name}` found."))
            })
    }

    async fn delete_collection(&self, name: &str) -> Result<(), ServiceError> {
        let mut collections = self.collections.lock().unwrap();
        let before = collections.len();
        collections.retain(|c| c.name != name);
        if collections.len() == before {
            return Err(ServiceError::NotFound(format!("No collection with name `{name}` found.")));
        }
        self.documents.lock().unwrap().remove(name);
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        params: &SearchParams,
    ) -> Result<SearchResponse, ServiceError> {
        self.searches
            .lock()
            .unwrap()
            .push((collection.to_string(), params.clone()));
        if let Some(err) = self.search_failures.lock().unwrap().pop_front() {
            return Err(err);
        }

        let docs = self
            .documents
            .lock()
            .unwrap()
            .get(collection)
            .cloned()
            .unwrap_or_default();
        let per_page = params.per_page as usize;
        let start = (params.page.max(1) as usize - 1) * per_page;
        let hits = docs
            .iter()
            .skip(start)
            .take(per_page)
            .cloned()
            .map(SearchHit::new)
            .collect();

        Ok(SearchResponse {
            hits,
            found: docs.len() as u64,
            out_of: docs.len() as u64,
            page: params.page,
            search_time_ms: 1,
        })
    }

    async fn get_document(&self, collection: &str, id: &str) -> Result<Document, ServiceError> {
        self.documents
            .lock()
            .unwrap()
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| d["id"] == id).cloned())
            .ok_or_else(|| ServiceError::NotFound("Could not find a document with id".into()))
    }

    async fn delete_document(&self, collection: &str, id: &str) -> Result<(), ServiceError> {
        let mut documents = self.documents.lock().unwrap();
        let docs = documents
            .get_mut(collection)
            .ok_or_else(|| ServiceError::NotFound("collection not found".into()))?;
        docs.retain(|d| d["id"] != id);
        Ok(())
    }
}

pub fn doc(id: usize) -> Document {
    json!({
        "id": id.to_string(),
        "title": format!("Doc {id}"),
        "count": id,
        "is_active": id % 2 == 0,
    })
    .as_object()
    .cloned()
    .unwrap()
}

pub fn test_collection() -> CollectionSchema {
    let mut schema = CollectionSchema::new(
        "test_collection",
        vec![
            Field::new("title", "string"),
            Field::new("count", "int32"),
            Field::new("is_active", "bool"),
        ],
    );
    schema.num_documents = 60;
    schema.default_sorting_field = Some("count".into());
    schema
}

pub fn plain_collection() -> CollectionSchema {
    CollectionSchema::new(
        "plain",
        vec![Field::new("title", "string"), Field::new("count", "int32")],
    )
}

pub fn service() -> FakeService {
    FakeService::default()
        .with_collection(test_collection(), (1..=60).map(doc).collect())
        .with_collection(plain_collection(), Vec::new())
}
