//! Presentation helpers shared by front-ends.

use core_types::CollectionSchema;
use serde_json::Value;

/// Columns shown before the user picks any.
pub const DEFAULT_VISIBLE_COLUMNS: usize = 6;

/// Pager arithmetic for one result page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: u32,
    pub per_page: u32,
    pub found: u64,
    pub total_pages: u32,
    /// 1-based index of the first row on this page. 0 when the page is empty,
    /// either because nothing matched or because it lies past the last page.
    pub first_row: u64,
    pub last_row: u64,
}

impl PageWindow {
    pub fn new(found: u64, page: u32, per_page: u32) -> Self {
        let page = page.max(1);
        let per = u64::from(per_page.max(1));
        let total_pages = u32::try_from(found.div_ceil(per)).unwrap_or(u32::MAX);
        let start = u64::from(page - 1) * per;
        let (first_row, last_row) = if start >= found {
            (0, 0)
        } else {
            (start + 1, (start + per).min(found))
        };
        Self {
            page,
            per_page,
            found,
            total_pages,
            first_row,
            last_row,
        }
    }

    pub const fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub const fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub const fn is_past_end(&self) -> bool {
        self.found > 0 && self.page > self.total_pages
    }
}

/// Render one document value for a table cell.
pub fn format_cell(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

pub fn default_columns(schema: &CollectionSchema) -> Vec<&str> {
    schema
        .fields
        .iter()
        .take(DEFAULT_VISIBLE_COLUMNS)
        .map(|f| f.name.as_str())
        .collect()
}
