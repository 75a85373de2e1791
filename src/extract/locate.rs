// src/extract/locate.rs

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

/// Adminer renders query output inside `<div id="content">`.
static RESULT_CONTAINER: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div#content").expect("result container selector should parse"));

static TABLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("table").expect("table selector should parse"));

/// Find the `<table>` fragments inside the result container, in document order.
///
/// Returns `None` when the page has no result container at all, and
/// `Some(vec![])` when the container exists but holds no tables.
pub fn locate_tables(document: &Html) -> Option<Vec<ElementRef<'_>>> {
    let all_tables = document.select(&TABLE).count();
    debug!(total = all_tables, "tables in document");

    let container = document.select(&RESULT_CONTAINER).next()?;
    let tables: Vec<_> = container.select(&TABLE).collect();
    debug!(count = tables.len(), "tables within result container");
    Some(tables)
}
