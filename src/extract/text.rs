use std::sync::LazyLock;

use scraper::{ElementRef, Node, Selector};
use tracing::warn;

/// The per-item text units LinkedIn renders for sighted users.
pub static VISIBLE_SPAN: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"span[aria-hidden="true"]"#).unwrap());

/// Approximates `innerText`: text nodes in order, `<br>` as a line break,
/// whitespace collapsed within each line, blank lines dropped.
pub fn inner_text(el: ElementRef) -> String {
    let mut raw = String::new();
    for node in el.descendants() {
        match node.value() {
            Node::Text(t) => raw.push_str(t),
            Node::Element(e) if e.name() == "br" => raw.push('\n'),
            _ => {}
        }
    }
    raw.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Trimmed inner text, `None` when empty.
pub fn text_of(el: ElementRef) -> Option<String> {
    let text = inner_text(el);
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Visible text fragments of an item, document order, empties dropped.
pub fn fragments(item: ElementRef) -> Vec<String> {
    item.select(&VISIBLE_SPAN).filter_map(text_of).collect()
}

/// Parse a configured selector; a bad entry is skipped, not fatal.
pub fn parse_selector(raw: &str) -> Option<Selector> {
    match Selector::parse(raw) {
        Ok(sel) => Some(sel),
        Err(e) => {
            warn!(selector = raw, error = %e, "Skipping invalid selector");
            None
        }
    }
}
