// src/extract/mod.rs

pub mod headers;
pub mod locate;
pub mod record;
pub mod rows;

pub use record::RowRecord;

use anyhow::Context;
use scraper::{ElementRef, Html};
use std::{fs, path::Path};
use tracing::{debug, instrument};

use crate::outcome::QueryOutcome;

/// Recover result rows from an Adminer response page.
///
/// Pure and stateless: the same page always yields the same outcome.
#[instrument(level = "debug", skip(html), fields(html_len = html.len()))]
pub fn extract_tables(html: &str) -> QueryOutcome {
    let document = Html::parse_document(html);

    let Some(tables) = locate::locate_tables(&document) else {
        debug!("no result container");
        return QueryOutcome::NoResult;
    };

    let per_table = tables
        .into_iter()
        .enumerate()
        .map(|(idx, table)| {
            debug!(table = idx + 1, "processing table");
            let names = headers::column_names(table);
            if names.is_empty() {
                debug!(table = idx + 1, "no headers found, skipping table");
                return Vec::new();
            }
            rows::reconstruct_rows(table, &names)
        });

    QueryOutcome::assemble(per_table)
}

/// Run the extraction on a saved response page.
pub fn extract_file(path: &Path) -> QueryOutcome {
    match fs::read_to_string(path).with_context(|| format!("reading {}", path.display())) {
        Ok(html) => extract_tables(&html),
        Err(e) => QueryOutcome::from_error(&e),
    }
}

/// Text of `el` with every text node trimmed and empty ones dropped.
pub(crate) fn stripped_text(el: ElementRef<'_>) -> String {
    el.text().map(str::trim).filter(|t| !t.is_empty()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    fn init_test_logging() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("info,adminer_scrape::extract=debug")),
            )
            .with_test_writer()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    // Adminer leaves th/td/tr unclosed.
    const SELECT_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en" dir="ltr">
<head><title>SQL command - Adminer</title></head>
<body class="ltr nojs">
<div id="menu"><table><tr><td>sidebar</table></div>
<div id="content">
<p class="breadcrumb"><a href="?mssql=db">MS SQL</a> &raquo; SQL command
<h2>SQL command</h2>
<pre><code class="jush-mssql">SELECT id, name, city FROM customers</code></pre>
<table cellspacing="0" class="nowrap">
<thead><tr><th>id<th>name<th>city</thead>
<tr><td>1<td>Alice<td>Paris
<tr><td>2<td>Bob<td><i>NULL</i>
<tr><td>3<td>Carol<td>Oslo
</table>
<p class="message">3 rows (0.001 s)
</div>
</body>
</html>"#;

    #[test]
    fn test_select_page_to_rows() {
        init_test_logging();
        let QueryOutcome::Rows(rows) = extract_tables(SELECT_PAGE) else {
            panic!("expected rows");
        };
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].get("name"), Some("Alice"));
        assert_eq!(rows[1].get("city"), Some("NULL"));
        assert_eq!(rows[2].get("id"), Some("3"));
    }

    #[test]
    fn test_rendered_json_shape() {
        let page = r#"<div id="content"><table>
            <thead><tr><th>Value</thead>
            <tr><td>a<tr><td>b
            </table></div>"#;
        let rendered = extract_tables(page).render();
        assert_eq!(
            rendered,
            "[\n  {\n    \"Value\": \"a\"\n  },\n  {\n    \"Value\": \"b\"\n  }\n]"
        );
    }

    #[test]
    fn test_missing_container_is_no_result() {
        let page = "<html><body><form><input name=\"token\" value=\"x\"></form></body></html>";
        assert_eq!(extract_tables(page).render(), "No result");
    }

    #[test]
    fn test_container_without_tables_is_no_data() {
        let page = r#"<div id="content"><p class="message">Query executed OK, 1 row affected.</div>"#;
        assert_eq!(extract_tables(page).render(), "No data rows found in tables");
    }

    #[test]
    fn test_tables_without_rows_are_no_data() {
        let page = r#"<div id="content">
            <table></table>
            <table><thead><tr><th>id<th>name</thead></table>
            </div>"#;
        assert_eq!(extract_tables(page).render(), "No data rows found in tables");
    }

    #[test]
    fn test_rows_from_all_tables_in_order() {
        let page = r#"<div id="content">
            <table><thead><tr><th>n</thead><tr><td>first</table>
            <table><thead><tr><th>m</thead><tr><td>second</table>
            </div>"#;
        let QueryOutcome::Rows(rows) = extract_tables(page) else {
            panic!("expected rows");
        };
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("n"), Some("first"));
        assert_eq!(rows[1].get("m"), Some("second"));
    }

    #[test]
    fn test_extract_file() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(SELECT_PAGE.as_bytes()).unwrap();
        assert!(matches!(extract_file(tmp.path()), QueryOutcome::Rows(rows) if rows.len() == 3));

        let missing = extract_file(Path::new("/nonexistent/result.html")).render();
        assert!(missing.starts_with("Error: reading /nonexistent/result.html"));
    }

    #[test]
    fn test_reprocessing_is_byte_identical() {
        assert_eq!(
            extract_tables(SELECT_PAGE).render(),
            extract_tables(SELECT_PAGE).render()
        );
    }
}
