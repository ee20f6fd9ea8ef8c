//! Shared data model for Typesense UI.
//!
//! These are plain serde types mirroring what the Typesense server reports
//! for collections and search results. They carry no I/O; the `client` crate
//! moves them over HTTP and the `browser` crate holds them as state.

pub mod config;
pub mod schema;
pub mod search;

pub use search::{Document, SearchHit, SearchParams, SearchResponse};
pub use schema::{CollectionSchema, Field, FieldType};

/// Token that matches every document when used as the query text.
pub const MATCH_ALL: &str = "*";

/// Fixed page size used by the document browser.
pub const PER_PAGE: u32 = 25;
