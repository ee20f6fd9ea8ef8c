//! Search request builder.
//!
//! Turns browser state (query text, per-field filters, sort, page) plus the
//! collection schema into the [`SearchParams`](core_types::SearchParams) sent
//! to the server, and maps responses back to document rows. Everything here
//! is pure: same inputs, same request. Malformed filter entries are skipped,
//! never reported.

pub mod display;
pub mod filter;
pub mod request;

pub use display::{PageWindow, default_columns, format_cell};
pub use filter::{FilterValue, Filters, NumericRange, build_filter_expression};
pub use request::{
    QueryInputs, SortOrder, SortState, build_search_params, documents_from_response,
    query_by_fields,
};
