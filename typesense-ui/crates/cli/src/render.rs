//! Plain-text rendering for terminal output. Styling is applied by the caller.

use console::{Alignment, measure_text_width, pad_str};
use core_types::{CollectionSchema, Document};
use query::{PageWindow, format_cell};

/// Widest a table column may grow before cells are truncated.
pub const MAX_COLUMN_WIDTH: usize = 32;

/// Header line followed by one line per document.
pub fn document_table(columns: &[&str], documents: &[Document]) -> Vec<String> {
    let rows: Vec<Vec<String>> = documents
        .iter()
        .map(|doc| {
            columns
                .iter()
                .map(|col| doc.get(*col).map_or_else(|| "-".to_string(), format_cell))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, col)| {
            rows.iter()
                .map(|row| measure_text_width(&row[i]))
                .chain(std::iter::once(measure_text_width(col)))
                .max()
                .unwrap_or(0)
                .min(MAX_COLUMN_WIDTH)
        })
        .collect();

    let mut out = Vec::with_capacity(rows.len() + 1);
    out.push(join_cells(columns.iter().copied(), &widths));
    for row in &rows {
        out.push(join_cells(row.iter().map(String::as_str), &widths));
    }
    out
}

fn join_cells<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    cells
        .zip(widths)
        .map(|(cell, &w)| pad_str(cell, w, Alignment::Left, Some("…")).into_owned())
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

pub fn page_summary(window: &PageWindow, took_ms: u64) -> String {
    if window.found == 0 {
        return format!("No documents found ({took_ms} ms)");
    }
    if window.is_past_end() {
        return format!(
            "Page {} is past the last page ({}) | {} found | {took_ms} ms",
            window.page, window.total_pages, window.found
        );
    }
    format!(
        "Showing {}-{} of {} | page {}/{} | {took_ms} ms",
        window.first_row, window.last_row, window.found, window.page, window.total_pages
    )
}

/// One line per collection: name, counts, and the fields that take a filter.
pub fn collection_lines(collections: &[&CollectionSchema]) -> Vec<String> {
    let width = collections
        .iter()
        .map(|c| measure_text_width(&c.name))
        .max()
        .unwrap_or(0);
    collections
        .iter()
        .map(|c| {
            let line = format!(
                "{}  {:>8} docs  {:>3} fields",
                pad_str(&c.name, width, Alignment::Left, None),
                c.num_documents,
                c.fields.len()
            );
            let filterable: Vec<&str> = c.filterable_fields().map(|f| f.name.as_str()).collect();
            if filterable.is_empty() {
                line
            } else {
                format!("{line}  filterable: {}", filterable.join(", "))
            }
        })
        .collect()
}
