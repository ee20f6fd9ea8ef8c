//! Request assembly: query-by list, sort expression, pagination.

use crate::filter::{Filters, build_filter_expression};
use core_types::{CollectionSchema, Document, MATCH_ALL, SearchParams, SearchResponse};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Active sort column and direction. No column means server default order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub field: Option<String>,
    pub order: SortOrder,
}

impl SortState {
    /// Sort on the schema's declared default field, descending.
    pub fn for_schema(schema: &CollectionSchema) -> Self {
        Self {
            field: schema.default_sort().map(str::to_string),
            order: SortOrder::Desc,
        }
    }

    pub fn field(&self) -> Option<&str> {
        self.field.as_deref().filter(|f| !f.is_empty())
    }

    /// Clicking the active column flips direction; any other column starts descending.
    pub fn toggle(&mut self, field: &str) {
        if self.field() == Some(field) {
            self.order = self.order.flipped();
        } else {
            self.field = Some(field.to_string());
            self.order = SortOrder::Desc;
        }
    }

    pub fn expression(&self) -> Option<String> {
        self.field().map(|f| format!("{f}:{}", self.order))
    }
}

/// Borrowed view of everything that shapes one search request.
#[derive(Debug, Clone, Copy)]
pub struct QueryInputs<'a> {
    pub query: &'a str,
    pub filters: &'a Filters,
    pub sort: &'a SortState,
    pub page: u32,
    pub per_page: u32,
}

/// Text fields in schema order, else the first field, else the wildcard.
pub fn query_by_fields(schema: &CollectionSchema) -> String {
    let text_fields: Vec<&str> = schema
        .fields
        .iter()
        .filter(|f| f.field_type.is_text())
        .map(|f| f.name.as_str())
        .collect();

    if !text_fields.is_empty() {
        return text_fields.join(",");
    }
    schema
        .fields
        .first()
        .map_or_else(|| MATCH_ALL.to_string(), |f| f.name.clone())
}

pub fn build_search_params(schema: &CollectionSchema, inputs: &QueryInputs<'_>) -> SearchParams {
    let q = if inputs.query.trim().is_empty() {
        MATCH_ALL.to_string()
    } else {
        inputs.query.to_string()
    };

    SearchParams {
        q,
        query_by: query_by_fields(schema),
        filter_by: build_filter_expression(schema, inputs.filters),
        sort_by: inputs.sort.expression(),
        page: inputs.page.max(1),
        per_page: inputs.per_page,
    }
}

/// Document rows in server order.
pub fn documents_from_response(response: &SearchResponse) -> Vec<Document> {
    response.hits.iter().map(|hit| hit.document.clone()).collect()
}
