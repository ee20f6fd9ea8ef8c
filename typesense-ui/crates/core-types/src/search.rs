use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A stored document: an arbitrary JSON object keyed by field name.
pub type Document = Map<String, Value>;

/// Parameters of a document search, as sent to the server.
///
/// Optional expressions are left out of the request entirely when `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParams {
    pub q: String,
    pub query_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    pub page: u32,
    pub per_page: u32,
}

/// One matched document plus whatever match metadata the server attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub document: Document,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub highlights: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_match: Option<u64>,
}

impl SearchHit {
    pub fn new(document: Document) -> Self {
        Self {
            document,
            highlights: Vec::new(),
            text_match: None,
        }
    }
}

/// Result page of a document search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub hits: Vec<SearchHit>,
    pub found: u64,
    #[serde(default)]
    pub out_of: u64,
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default)]
    pub search_time_ms: u64,
}

const fn first_page() -> u32 {
    1
}

impl SearchResponse {
    pub const fn empty() -> Self {
        Self {
            hits: Vec::new(),
            found: 0,
            out_of: 0,
            page: 1,
            search_time_ms: 0,
        }
    }
}
