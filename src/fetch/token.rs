// src/fetch/token.rs

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::trace;

static TOKEN_INPUT: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"input[name="token"]"#).expect("CSS selector for token input should be valid")
});

/// The CSRF token Adminer embeds in its SQL command form.
pub fn extract_csrf_token(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    let token = doc
        .select(&TOKEN_INPUT)
        .next()
        .and_then(|input| input.value().attr("value"))
        .filter(|value| !value.is_empty())
        .map(str::to_owned);
    trace!(found = token.is_some(), "csrf token lookup");
    token
}
