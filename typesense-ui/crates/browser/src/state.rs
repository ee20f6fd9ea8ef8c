use crate::error::BrowserError;
use client::{SearchService, ServiceError};
use core_types::{CollectionSchema, Document, MATCH_ALL, PER_PAGE, SearchParams, SearchResponse};
use query::{
    FilterValue, Filters, PageWindow, QueryInputs, SortState, build_search_params,
    documents_from_response,
};
use tracing::{debug, warn};

/// Coarse lifecycle of the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No collection selected.
    Idle,
    /// Schema fetch in flight.
    LoadingSchema,
    /// Schema fetch failed; waiting for a new selection.
    LoadFailed,
    /// Schema loaded; searches may be in flight or settled.
    SchemaReady,
}

/// Schema fetch the caller must run and report back via [`BrowserState::complete_load`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub seq: u64,
    pub collection: String,
}

impl LoadTicket {
    pub async fn execute<S>(&self, service: &S) -> Result<CollectionSchema, ServiceError>
    where
        S: SearchService + ?Sized,
    {
        service.fetch_collection_schema(&self.collection).await
    }
}

/// Search the caller must run and report back via [`BrowserState::complete_search`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    pub seq: u64,
    pub collection: String,
    pub params: SearchParams,
}

impl SearchTicket {
    pub async fn execute<S>(&self, service: &S) -> Result<SearchResponse, ServiceError>
    where
        S: SearchService + ?Sized,
    {
        service.search(&self.collection, &self.params).await
    }
}

/// Observable state of the document browser plus its transitions.
///
/// Every mutation of query, filters, sort or page goes through
/// [`Self::rebuild_and_dispatch`], which returns a fresh [`SearchTicket`]
/// whenever a schema is loaded.
#[derive(Debug, Clone)]
pub struct BrowserState {
    selected: Option<String>,
    schema: Option<CollectionSchema>,
    documents: Vec<Document>,
    response: Option<SearchResponse>,
    error: Option<BrowserError>,

    query: String,
    filters: Filters,
    current_page: u32,
    per_page: u32,
    sort: SortState,

    next_seq: u64,
    pending_load: Option<u64>,
    pending_search: Option<u64>,
}

impl Default for BrowserState {
    fn default() -> Self {
        Self::new()
    }
}

impl BrowserState {
    pub fn new() -> Self {
        Self {
            selected: None,
            schema: None,
            documents: Vec::new(),
            response: None,
            error: None,
            query: MATCH_ALL.to_string(),
            filters: Filters::new(),
            current_page: 1,
            per_page: PER_PAGE,
            sort: SortState::default(),
            next_seq: 0,
            pending_load: None,
            pending_search: None,
        }
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub const fn schema(&self) -> Option<&CollectionSchema> {
        self.schema.as_ref()
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub const fn response(&self) -> Option<&SearchResponse> {
        self.response.as_ref()
    }

    pub const fn error(&self) -> Option<&BrowserError> {
        self.error.as_ref()
    }

    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub const fn filters(&self) -> &Filters {
        &self.filters
    }

    pub const fn current_page(&self) -> u32 {
        self.current_page
    }

    pub const fn per_page(&self) -> u32 {
        self.per_page
    }

    pub const fn sort(&self) -> &SortState {
        &self.sort
    }

    pub const fn is_loading(&self) -> bool {
        self.pending_load.is_some() || self.pending_search.is_some()
    }

    pub const fn phase(&self) -> Phase {
        match (&self.selected, &self.schema) {
            (None, _) => Phase::Idle,
            (Some(_), Some(_)) => Phase::SchemaReady,
            (Some(_), None) if self.pending_load.is_some() => Phase::LoadingSchema,
            (Some(_), None) => Phase::LoadFailed,
        }
    }

    /// Pager for the last settled response.
    pub fn page_window(&self) -> Option<PageWindow> {
        self.response
            .as_ref()
            .map(|r| PageWindow::new(r.found, self.current_page, self.per_page))
    }

    /// Select a collection, or deselect with `None`.
    ///
    /// Selecting drops the previous schema and results right away; query,
    /// filters, sort and page are reset only once the new schema arrives.
    pub fn select_collection(&mut self, name: Option<&str>) -> Option<LoadTicket> {
        self.schema = None;
        self.documents.clear();
        self.response = None;
        self.error = None;
        self.pending_search = None;

        let Some(name) = name else {
            debug!(previous = ?self.selected, "collection deselected");
            self.selected = None;
            self.pending_load = None;
            return None;
        };

        self.selected = Some(name.to_string());
        let seq = self.bump_seq();
        self.pending_load = Some(seq);
        debug!(collection = name, seq, "loading collection schema");
        Some(LoadTicket {
            seq,
            collection: name.to_string(),
        })
    }

    /// Apply a schema fetch result. Stale tickets are ignored.
    pub fn complete_load(
        &mut self,
        seq: u64,
        result: Result<CollectionSchema, ServiceError>,
    ) -> Option<SearchTicket> {
        if self.pending_load != Some(seq) {
            debug!(seq, latest = ?self.pending_load, "discarding stale schema load");
            return None;
        }
        self.pending_load = None;

        match result {
            Ok(schema) => {
                debug!(collection = %schema.name, fields = schema.fields.len(), "schema loaded");
                self.filters.clear();
                self.query = MATCH_ALL.to_string();
                self.current_page = 1;
                self.sort = SortState::for_schema(&schema);
                self.schema = Some(schema);
                self.rebuild_and_dispatch()
            }
            Err(source) => {
                let collection = self.selected.clone().unwrap_or_default();
                warn!(%collection, error = %source, "failed to load collection schema");
                self.error = Some(BrowserError::SchemaLoad { collection, source });
                None
            }
        }
    }

    pub fn set_search_query(&mut self, text: impl Into<String>) -> Option<SearchTicket> {
        self.query = text.into();
        self.current_page = 1;
        self.rebuild_and_dispatch()
    }

    /// Set the criterion for one field. Fields the loaded schema lacks are ignored.
    pub fn handle_filter_change(
        &mut self,
        field: &str,
        value: impl Into<FilterValue>,
    ) -> Option<SearchTicket> {
        let schema = self.schema.as_ref()?;
        if !schema.has_field(field) {
            warn!(field, collection = %schema.name, "ignoring filter on unknown field");
            return None;
        }
        self.filters.insert(field.to_string(), value.into());
        self.current_page = 1;
        self.rebuild_and_dispatch()
    }

    pub fn clear_filter(&mut self, field: &str) -> Option<SearchTicket> {
        self.filters.shift_remove(field);
        self.current_page = 1;
        self.rebuild_and_dispatch()
    }

    pub fn toggle_sort(&mut self, field: &str) -> Option<SearchTicket> {
        self.sort.toggle(field);
        self.current_page = 1;
        self.rebuild_and_dispatch()
    }

    /// Jump to a page (clamped to at least 1). Leaves query, filters and sort alone.
    pub fn set_current_page(&mut self, page: u32) -> Option<SearchTicket> {
        self.current_page = page.max(1);
        self.rebuild_and_dispatch()
    }

    pub fn next_page(&mut self) -> Option<SearchTicket> {
        let window = self.page_window()?;
        if !window.has_next() {
            return None;
        }
        self.set_current_page(window.page + 1)
    }

    pub fn prev_page(&mut self) -> Option<SearchTicket> {
        if self.current_page <= 1 {
            return None;
        }
        self.set_current_page(self.current_page - 1)
    }

    /// Re-run the current search unchanged, e.g. to retry after an error.
    pub fn refresh(&mut self) -> Option<SearchTicket> {
        self.rebuild_and_dispatch()
    }

    /// Build the request for the current state and mark it as the one to accept.
    pub fn rebuild_and_dispatch(&mut self) -> Option<SearchTicket> {
        let schema = self.schema.as_ref()?;
        let params = build_search_params(
            schema,
            &QueryInputs {
                query: &self.query,
                filters: &self.filters,
                sort: &self.sort,
                page: self.current_page,
                per_page: self.per_page,
            },
        );
        let collection = schema.name.clone();
        let seq = self.bump_seq();
        self.pending_search = Some(seq);
        debug!(
            %collection,
            seq,
            q = %params.q,
            filter_by = ?params.filter_by,
            sort_by = ?params.sort_by,
            page = params.page,
            "dispatching search"
        );
        Some(SearchTicket {
            seq,
            collection,
            params,
        })
    }

    /// Apply a search result. Returns `false` when the ticket was superseded.
    pub fn complete_search(
        &mut self,
        seq: u64,
        result: Result<SearchResponse, ServiceError>,
    ) -> bool {
        if self.pending_search != Some(seq) {
            debug!(seq, latest = ?self.pending_search, "discarding stale search response");
            return false;
        }
        self.pending_search = None;

        match result {
            Ok(response) => {
                debug!(
                    seq,
                    found = response.found,
                    took_ms = response.search_time_ms,
                    "search completed"
                );
                self.documents = documents_from_response(&response);
                self.response = Some(response);
                self.error = None;
            }
            Err(source) => {
                let collection = self.selected.clone().unwrap_or_default();
                warn!(%collection, error = %source, "search failed");
                self.documents.clear();
                self.response = None;
                self.error = Some(BrowserError::Search { collection, source });
            }
        }
        true
    }

    fn bump_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }
}
