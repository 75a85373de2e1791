// src/extract/rows.rs

use once_cell::sync::Lazy;
use scraper::{ElementRef, Node, Selector};
use tracing::{debug, instrument};

use super::record::RowRecord;

static TD: Lazy<Selector> = Lazy::new(|| Selector::parse("td").expect("td selector should parse"));

/// Elements that end the text of the cell they are nested in. Unclosed cells
/// swallow the cells and rows after them, which must not leak into the value.
const TABLE_STRUCTURE: &[&str] = &["td", "th", "tr", "table", "thead", "tbody", "tfoot"];

/// Rebuild the rows of one table fragment from its flat stream of cell text.
#[instrument(level = "debug", skip(table, headers), fields(columns = headers.len()))]
pub fn reconstruct_rows(table: ElementRef<'_>, headers: &[String]) -> Vec<RowRecord> {
    let cells = cell_text_stream(table, headers);
    let rows = assemble_rows(headers, cells);
    debug!(rows = rows.len(), "rows reconstructed");
    rows
}

/// Cleaned text of every `<td>` in document order, with header artefacts removed.
pub fn cell_text_stream(table: ElementRef<'_>, headers: &[String]) -> Vec<String> {
    let mut td_count = 0usize;
    let stream: Vec<String> = table
        .select(&TD)
        .inspect(|_| td_count += 1)
        .map(|td| collapse_whitespace(&direct_text(td)))
        .filter(|text| !text.is_empty() && !headers.contains(text))
        .collect();
    debug!(td_count, kept = stream.len(), "cell text stream");
    stream
}

/// Text belonging to `cell` itself, stopping at the first nested table element.
///
/// Whitespace is kept as written so word breaks survive `collapse_whitespace`.
fn direct_text(cell: ElementRef<'_>) -> String {
    let mut text = String::new();
    for child in cell.children() {
        match child.value() {
            Node::Text(t) => text.push_str(t),
            Node::Element(el) if TABLE_STRUCTURE.contains(&el.name()) => break,
            Node::Element(_) => {
                if let Some(inline) = ElementRef::wrap(child) {
                    text.extend(inline.text());
                }
            }
            _ => {}
        }
    }
    text
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Regroup a flat, fixed-stride stream into rows.
///
/// Entry `i` goes to column `i % k`; row `j` takes the `j`-th value of each
/// column. Rows stop at the shortest column, so a trailing partial row is
/// dropped.
pub fn assemble_rows(headers: &[String], cells: Vec<String>) -> Vec<RowRecord> {
    let k = headers.len();
    if k == 0 {
        return Vec::new();
    }

    let mut columns: Vec<Vec<String>> = vec![Vec::new(); k];
    for (i, cell) in cells.into_iter().enumerate() {
        columns[i % k].push(cell);
    }

    let depth = columns.iter().map(Vec::len).min().unwrap_or(0);
    let dropped: usize = columns.iter().map(|c| c.len() - depth).sum();
    if dropped > 0 {
        debug!(dropped, "trailing partial row dropped");
    }

    let mut columns: Vec<_> = columns.into_iter().map(Vec::into_iter).collect();
    (0..depth)
        .map(|_| {
            let mut row = RowRecord::with_capacity(k);
            for (header, column) in headers.iter().zip(columns.iter_mut()) {
                if let Some(value) = column.next() {
                    row.insert(header, value);
                }
            }
            row
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn owned(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn row(pairs: &[(&str, &str)]) -> RowRecord {
        pairs.iter().copied().collect()
    }

    fn first_table(doc: &Html) -> ElementRef<'_> {
        let sel = Selector::parse("table").unwrap();
        doc.select(&sel).next().unwrap()
    }

    #[test]
    fn test_single_column_each_entry_is_a_row() {
        let rows = assemble_rows(&owned(&["Value"]), owned(&["a", "b", "c"]));
        assert_eq!(
            rows,
            vec![row(&[("Value", "a")]), row(&[("Value", "b")]), row(&[("Value", "c")])]
        );
    }

    #[test]
    fn test_two_columns_pair_and_drop_unpaired_tail() {
        let rows = assemble_rows(&owned(&["A", "B"]), owned(&["1", "x", "2", "y", "3"]));
        assert_eq!(
            rows,
            vec![row(&[("A", "1"), ("B", "x")]), row(&[("A", "2"), ("B", "y")])]
        );
    }

    #[test]
    fn test_round_robin_stops_at_shortest_column() {
        let stream = owned(&["a1", "b1", "c1", "a2", "b2", "c2", "a3"]);
        let rows = assemble_rows(&owned(&["A", "B", "C"]), stream);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], row(&[("A", "a2"), ("B", "b2"), ("C", "c2")]));
        assert!(rows.iter().all(|r| r.get("A") != Some("a3")));
    }

    #[test]
    fn test_no_columns_or_no_cells_gives_no_rows() {
        assert!(assemble_rows(&[], owned(&["a", "b"])).is_empty());
        assert!(assemble_rows(&owned(&["A", "B", "C"]), Vec::new()).is_empty());
    }

    #[test]
    fn test_stream_skips_header_values_and_empty_cells() {
        let doc = Html::parse_document(
            r#"<table>
            <tr><td>id<td>name
            <tr><td>1<td>  alice   smith
            <tr><td>2<td>   </td>
            </table>"#,
        );
        let headers = owned(&["id", "name"]);
        let stream = cell_text_stream(first_table(&doc), &headers);
        assert_eq!(stream, owned(&["1", "alice smith", "2"]));
    }

    #[test]
    fn test_inline_elements_contribute_text() {
        let doc = Html::parse_document(
            r#"<table><tr><td><i>NULL</i><td><a href="?edit">7</a><td>x <code>y</code></table>"#,
        );
        let stream = cell_text_stream(first_table(&doc), &[]);
        assert_eq!(stream, owned(&["NULL", "7", "x y"]));
    }

    #[test]
    fn test_word_breaks_survive_inline_markup_and_comments() {
        let doc = Html::parse_document(
            "<table><tr><td>a<!-- c -->b<td>x <b>y</b> z<td>\n  two\n  lines \n</table>",
        );
        let stream = cell_text_stream(first_table(&doc), &[]);
        assert_eq!(stream, owned(&["ab", "x y z", "two lines"]));
    }

    #[test]
    fn test_nested_table_does_not_leak_into_outer_cell() {
        let doc = Html::parse_document(
            r#"<table><tr><td>outer<table><tr><td>inner</td></tr></table>tail</td></tr></table>"#,
        );
        let stream = cell_text_stream(first_table(&doc), &[]);
        assert_eq!(stream, owned(&["outer", "inner"]));
    }

    #[test]
    fn test_reconstruct_rows_from_fragment() {
        let doc = Html::parse_document(
            r#"<table>
            <thead><tr><th>id<th>city</thead>
            <tr><td>1<td>Paris
            <tr><td>2<td>Oslo
            </table>"#,
        );
        let rows = reconstruct_rows(first_table(&doc), &owned(&["id", "city"]));
        assert_eq!(
            rows,
            vec![
                row(&[("id", "1"), ("city", "Paris")]),
                row(&[("id", "2"), ("city", "Oslo")])
            ]
        );
    }
}
