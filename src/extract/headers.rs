// src/extract/headers.rs

use once_cell::sync::Lazy;
use scraper::{ElementRef, Selector};
use tracing::{debug, instrument, trace};

use super::stripped_text;

static THEAD: Lazy<Selector> =
    Lazy::new(|| Selector::parse("thead").expect("thead selector should parse"));
static TR: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").expect("tr selector should parse"));
static TH: Lazy<Selector> = Lazy::new(|| Selector::parse("th").expect("th selector should parse"));
static HEADER_OR_DATA_CELL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("th, td").expect("cell selector should parse"));

/// Recover the column names of one table fragment.
///
/// An empty result means the table carries no usable header row.
#[instrument(level = "debug", skip(table))]
pub fn column_names(table: ElementRef<'_>) -> Vec<String> {
    let raw = raw_header_cells(table);
    debug!(?raw, "raw header cells");
    let names = reconstruct_headers(raw);
    debug!(?names, "final headers");
    names
}

/// Header cell text in document order.
///
/// Prefers the first row of `<thead>` (trimmed text, empty cells skipped);
/// otherwise takes every `th`/`td` of the table's first row verbatim.
pub fn raw_header_cells(table: ElementRef<'_>) -> Vec<String> {
    let from_thead: Vec<String> = table
        .select(&THEAD)
        .next()
        .and_then(|thead| thead.select(&TR).next())
        .map(|row| {
            row.select(&TH)
                .map(stripped_text)
                .filter(|text| !text.is_empty())
                .collect()
        })
        .unwrap_or_default();

    if !from_thead.is_empty() {
        return from_thead;
    }

    table
        .select(&TR)
        .next()
        .map(|row| {
            row.select(&HEADER_OR_DATA_CELL)
                .map(|cell| cell.text().collect::<String>())
                .collect()
        })
        .unwrap_or_default()
}

/// Undo header concatenation: each cell absorbed the text of every cell after
/// it, so cell `i` is cut where the text of cell `i + 1` begins.
///
/// The output always has the same length as the input. If no stripped name is
/// at least two characters long the raw cells are returned unchanged.
pub fn reconstruct_headers(raw: Vec<String>) -> Vec<String> {
    if raw.len() < 2 {
        debug!("single header, nothing to reconstruct");
        return raw;
    }

    let mut stripped: Vec<String> = raw
        .windows(2)
        .map(|pair| strip_absorbed_suffix(&pair[0], &pair[1]).to_owned())
        .collect();
    stripped.extend(raw.last().cloned());

    if stripped.iter().any(|name| name.chars().count() >= 2) {
        debug!(?stripped, "using stripped headers");
        stripped
    } else {
        debug!("stripped headers too short, keeping raw headers");
        raw
    }
}

fn strip_absorbed_suffix<'a>(current: &'a str, next: &str) -> &'a str {
    match current.find(next) {
        Some(0) => {
            trace!(current, next, "nothing left after removal");
            current
        }
        Some(idx) => {
            trace!(current, next, kept = &current[..idx], "stripped");
            &current[..idx]
        }
        None => {
            trace!(current, next, "next header not found");
            current
        }
    }
}
