mod common;

use browser::{BrowserState, DocumentBrowser, FilterValue, NumericRange, Phase, SortOrder};
use client::{ErrorKind, ServiceError};
use common::{FakeService, service, test_collection};
use std::sync::Arc;

async fn browsing(name: &str) -> (Arc<FakeService>, DocumentBrowser<FakeService>) {
    let svc = Arc::new(service());
    let mut browser = DocumentBrowser::new(Arc::clone(&svc));
    browser.select_collection(Some(name)).await;
    (svc, browser)
}

#[tokio::test]
async fn selecting_loads_schema_and_first_page() {
    let (svc, browser) = browsing("test_collection").await;
    let state = browser.state();

    assert_eq!(state.phase(), Phase::SchemaReady);
    assert_eq!(state.schema().map(|s| s.name.as_str()), Some("test_collection"));
    assert_eq!(state.documents().len(), 25);
    assert_eq!(state.documents()[0]["id"], "1");
    assert!(state.error().is_none());
    assert!(!state.is_loading());

    let params = svc.last_search();
    assert_eq!(params.q, "*");
    assert_eq!(params.query_by, "title");
    assert_eq!(params.filter_by, None);
    assert_eq!(params.sort_by.as_deref(), Some("count:desc"));
    assert_eq!(params.page, 1);
    assert_eq!(params.per_page, 25);
}

#[tokio::test]
async fn text_and_range_filters_compose_in_entry_order() {
    let (svc, mut browser) = browsing("test_collection").await;

    browser.handle_filter_change("title", "Test").await;
    browser
        .handle_filter_change("count", FilterValue::range(Some(5), Some(10)))
        .await;

    let params = svc.last_search();
    assert_eq!(
        params.filter_by.as_deref(),
        Some("title:=Test && count:[5..10]")
    );
    assert_eq!(params.page, 1);
}

#[tokio::test]
async fn blank_filters_and_unknown_fields_emit_nothing() {
    let (svc, mut browser) = browsing("test_collection").await;
    let searches_before = svc.searches().len();

    browser.handle_filter_change("title", "").await;
    assert_eq!(svc.last_search().filter_by, None);

    browser.handle_filter_change("missing", "x").await;
    assert_eq!(svc.searches().len(), searches_before + 1);
    assert!(!browser.state().filters().contains_key("missing"));

    browser
        .handle_filter_change("count", NumericRange::new(None, None))
        .await;
    assert_eq!(svc.last_search().filter_by, None);
}

#[tokio::test]
async fn bool_filter_and_clear() {
    let (svc, mut browser) = browsing("test_collection").await;

    browser.handle_filter_change("is_active", true).await;
    assert_eq!(svc.last_search().filter_by.as_deref(), Some("is_active:=true"));

    browser.clear_filter("is_active").await;
    assert_eq!(svc.last_search().filter_by, None);
    assert!(browser.state().filters().is_empty());
}

#[tokio::test]
async fn query_and_filter_changes_reset_page() {
    let (svc, mut browser) = browsing("test_collection").await;

    browser.set_current_page(3).await;
    assert_eq!(svc.last_search().page, 3);
    assert_eq!(browser.state().documents()[0]["id"], "51");

    browser.set_search_query("Doc").await;
    assert_eq!(browser.state().current_page(), 1);
    assert_eq!(svc.last_search().q, "Doc");

    browser.set_current_page(2).await;
    browser.handle_filter_change("count", 7_i64).await;
    assert_eq!(browser.state().current_page(), 1);
    assert_eq!(svc.last_search().filter_by.as_deref(), Some("count:=7"));
}

#[tokio::test]
async fn blank_query_searches_everything() {
    let (svc, mut browser) = browsing("test_collection").await;
    browser.set_search_query("   ").await;
    assert_eq!(svc.last_search().q, "*");
}

#[tokio::test]
async fn sort_toggles_between_orders() {
    let (svc, mut browser) = browsing("test_collection").await;
    assert_eq!(browser.state().sort().order, SortOrder::Desc);

    browser.toggle_sort("count").await;
    assert_eq!(svc.last_search().sort_by.as_deref(), Some("count:asc"));

    browser.toggle_sort("title").await;
    assert_eq!(svc.last_search().sort_by.as_deref(), Some("title:desc"));

    browser.toggle_sort("title").await;
    assert_eq!(svc.last_search().sort_by.as_deref(), Some("title:asc"));
}

#[tokio::test]
async fn paging_stops_at_both_ends() {
    let (svc, mut browser) = browsing("test_collection").await;

    browser.prev_page().await;
    assert_eq!(browser.state().current_page(), 1);

    browser.next_page().await;
    browser.next_page().await;
    assert_eq!(browser.state().current_page(), 3);
    let searches = svc.searches().len();

    browser.next_page().await;
    assert_eq!(browser.state().current_page(), 3);
    assert_eq!(svc.searches().len(), searches);

    let window = browser.state().page_window().unwrap();
    assert_eq!(window.total_pages, 3);
    assert!(!window.has_next());
    assert!(window.has_prev());

    browser.prev_page().await;
    assert_eq!(browser.state().current_page(), 2);
}

#[tokio::test]
async fn empty_result_is_not_an_error() {
    let (_svc, browser) = browsing("plain").await;
    let state = browser.state();

    assert!(state.documents().is_empty());
    assert_eq!(state.response().map(|r| r.found), Some(0));
    assert!(state.error().is_none());
    assert_eq!(state.sort().field(), None);
}

#[tokio::test]
async fn schema_failure_records_error_and_skips_search() {
    let svc = Arc::new(service());
    svc.fail_next_schema(ServiceError::Connection("connection refused".into()));
    let mut browser = DocumentBrowser::new(Arc::clone(&svc));

    browser.select_collection(Some("test_collection")).await;
    let state = browser.state();

    assert_eq!(state.phase(), Phase::LoadFailed);
    assert!(state.schema().is_none());
    assert!(state.documents().is_empty());
    assert_eq!(state.current_page(), 1);
    assert_eq!(state.error_message().as_deref(), Some("connection refused"));
    assert!(svc.searches().is_empty());

    browser.select_collection(Some("test_collection")).await;
    assert_eq!(browser.state().phase(), Phase::SchemaReady);
    assert!(browser.state().error().is_none());
}

#[tokio::test]
async fn failed_reselection_keeps_the_current_page() {
    let (svc, mut browser) = browsing("test_collection").await;
    browser.set_current_page(3).await;
    let searches = svc.searches().len();

    svc.fail_next_schema(ServiceError::Connection("connection reset".into()));
    browser.select_collection(Some("plain")).await;
    let state = browser.state();

    assert_eq!(state.phase(), Phase::LoadFailed);
    assert_eq!(state.current_page(), 3);
    assert!(state.schema().is_none());
    assert!(state.documents().is_empty());
    assert_eq!(state.error_message().as_deref(), Some("connection reset"));
    assert_eq!(svc.searches().len(), searches);
}

#[tokio::test]
async fn missing_collection_surfaces_not_found() {
    let (_svc, browser) = browsing("nope").await;
    let err = browser.state().error().unwrap();
    assert_eq!(err.service_error().kind(), ErrorKind::NotFound);
    assert_eq!(err.collection(), "nope");
}

#[tokio::test]
async fn search_failure_keeps_schema_and_refresh_recovers() {
    let (svc, mut browser) = browsing("test_collection").await;

    svc.fail_next_search(ServiceError::Query("Could not find a field named `nope`".into()));
    browser.toggle_sort("nope").await;
    let state = browser.state();
    assert!(state.schema().is_some());
    assert!(state.documents().is_empty());
    assert!(state.response().is_none());
    assert_eq!(
        state.error().unwrap().service_error().kind(),
        ErrorKind::Query
    );

    browser.toggle_sort("count").await;
    assert!(browser.state().error().is_none());
    assert_eq!(browser.state().documents().len(), 25);
}

#[tokio::test]
async fn reselecting_resets_query_state() {
    let (_svc, mut browser) = browsing("test_collection").await;
    browser.set_search_query("Doc 1").await;
    browser.handle_filter_change("count", 3_i64).await;
    browser.toggle_sort("title").await;

    browser.select_collection(Some("plain")).await;
    let state = browser.state();

    assert_eq!(state.selected(), Some("plain"));
    assert_eq!(state.query(), "*");
    assert!(state.filters().is_empty());
    assert_eq!(state.current_page(), 1);
    assert_eq!(state.sort().field(), None);
    assert_eq!(state.sort().order, SortOrder::Desc);
}

#[tokio::test]
async fn deselecting_returns_to_idle() {
    let (svc, mut browser) = browsing("test_collection").await;
    let searches = svc.searches().len();

    browser.select_collection(None).await;
    assert_eq!(browser.state().phase(), Phase::Idle);
    assert!(browser.state().documents().is_empty());

    browser.set_search_query("Doc").await;
    assert_eq!(svc.searches().len(), searches);
}

#[tokio::test]
async fn overlapping_searches_keep_only_the_latest() {
    let svc = service();
    let mut state = BrowserState::new();

    let load = state.select_collection(Some("test_collection")).unwrap();
    let result = load.execute(&svc).await;
    let first = state.complete_load(load.seq, result).unwrap();

    let second = state.set_current_page(2).unwrap();
    let second_result = second.execute(&svc).await;
    let first_result = first.execute(&svc).await;

    assert!(state.complete_search(second.seq, second_result));
    assert!(!state.complete_search(first.seq, first_result));
    assert_eq!(state.documents()[0]["id"], "26");
    assert_eq!(state.current_page(), 2);
}

#[tokio::test]
async fn schema_for_abandoned_selection_is_dropped() {
    let svc = service();
    let mut state = BrowserState::new();

    let stale = state.select_collection(Some("test_collection")).unwrap();
    let current = state.select_collection(Some("plain")).unwrap();

    let stale_result = stale.execute(&svc).await;
    assert!(state.complete_load(stale.seq, stale_result).is_none());
    assert!(state.schema().is_none());
    assert!(state.is_loading());

    let current_result = current.execute(&svc).await;
    let search = state.complete_load(current.seq, current_result).unwrap();
    assert_eq!(search.collection, "plain");
    assert_eq!(state.schema(), Some(&common::plain_collection()));
    assert_ne!(state.schema(), Some(&test_collection()));
}
