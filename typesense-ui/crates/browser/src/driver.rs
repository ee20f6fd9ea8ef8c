use crate::state::{BrowserState, SearchTicket};
use client::SearchService;
use query::FilterValue;
use std::sync::Arc;

/// Runs [`BrowserState`] transitions against a live service.
///
/// Each action awaits the request it triggers before returning, so the state
/// observed afterwards reflects that action. Callers that want overlapping
/// requests can work with [`BrowserState`] tickets directly.
pub struct DocumentBrowser<S: ?Sized> {
    service: Arc<S>,
    state: BrowserState,
}

impl<S: SearchService + ?Sized> DocumentBrowser<S> {
    pub fn new(service: Arc<S>) -> Self {
        Self {
            service,
            state: BrowserState::new(),
        }
    }

    pub const fn state(&self) -> &BrowserState {
        &self.state
    }

    pub fn service(&self) -> &Arc<S> {
        &self.service
    }

    pub async fn select_collection(&mut self, name: Option<&str>) {
        let Some(load) = self.state.select_collection(name) else {
            return;
        };
        let result = load.execute(self.service.as_ref()).await;
        let search = self.state.complete_load(load.seq, result);
        self.run(search).await;
    }

    pub async fn set_search_query(&mut self, text: impl Into<String>) {
        let ticket = self.state.set_search_query(text);
        self.run(ticket).await;
    }

    pub async fn handle_filter_change(&mut self, field: &str, value: impl Into<FilterValue>) {
        let ticket = self.state.handle_filter_change(field, value);
        self.run(ticket).await;
    }

    pub async fn clear_filter(&mut self, field: &str) {
        let ticket = self.state.clear_filter(field);
        self.run(ticket).await;
    }

    pub async fn toggle_sort(&mut self, field: &str) {
        let ticket = self.state.toggle_sort(field);
        self.run(ticket).await;
    }

    pub async fn set_current_page(&mut self, page: u32) {
        let ticket = self.state.set_current_page(page);
        self.run(ticket).await;
    }

    pub async fn next_page(&mut self) {
        let ticket = self.state.next_page();
        self.run(ticket).await;
    }

    pub async fn prev_page(&mut self) {
        let ticket = self.state.prev_page();
        self.run(ticket).await;
    }

    pub async fn refresh(&mut self) {
        let ticket = self.state.refresh();
        self.run(ticket).await;
    }

    async fn run(&mut self, ticket: Option<SearchTicket>) {
        if let Some(ticket) = ticket {
            let result = ticket.execute(self.service.as_ref()).await;
            self.state.complete_search(ticket.seq, result);
        }
    }
}
