use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use super::text::inner_text;

static H2: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h2").unwrap());
static LI: LazyLock<Selector> = LazyLock::new(|| Selector::parse("li").unwrap());

/// Where to look for the item list inside a section, most specific first.
static LIST_CHAIN: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    ["ul.pvs-list", "ul", "div.pvs-list__outer-container"]
        .iter()
        .map(|s| Selector::parse(s).unwrap())
        .collect()
});

/// First `h2` whose text contains a keyword, or `div` whose id equals one, in document order.
pub fn find_heading<'a>(doc: &'a Html, keywords: &[&str]) -> Option<ElementRef<'a>> {
    let anchors = keywords
        .iter()
        .map(|kw| format!("div[id=\"{}\"]", kw))
        .collect::<Vec<_>>()
        .join(", ");
    let anchor_sel = Selector::parse(&anchors).ok();

    doc.root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|el| {
            if H2.matches(el) {
                let text = inner_text(*el).to_lowercase();
                return keywords.iter().any(|kw| text.contains(kw));
            }
            anchor_sel.as_ref().is_some_and(|s| s.matches(el))
        })
}

/// Nearest enclosing `<section>`, else the grandparent of the heading.
pub fn section_container(heading: ElementRef) -> Option<ElementRef> {
    heading
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|a| a.value().name() == "section")
        .or_else(|| {
            heading
                .parent()
                .and_then(|p| p.parent())
                .and_then(ElementRef::wrap)
        })
}

/// Locate a section by keyword. `None` when the page has no such heading.
pub fn find_section<'a>(doc: &'a Html, keywords: &[&str]) -> Option<ElementRef<'a>> {
    find_heading(doc, keywords).and_then(section_container)
}

/// The section's item list, resolved through the list fallback chain.
pub fn item_list(section: ElementRef) -> Option<ElementRef> {
    LIST_CHAIN
        .iter()
        .find_map(|sel| section.select(sel).next())
}

/// Direct `<li>` children of the list; every `<li>` in the section when there are none.
pub fn section_items(section: ElementRef) -> Vec<ElementRef> {
    let direct: Vec<ElementRef> = item_list(section)
        .map(|list| {
            list.children()
                .filter_map(ElementRef::wrap)
                .filter(|c| c.value().name() == "li")
                .collect()
        })
        .unwrap_or_default();

    if direct.is_empty() {
        section.select(&LI).collect()
    } else {
        direct
    }
}

/// Find the section, split it into items and run `parse_item` on each, keeping `Some`s.
pub fn extract_section<T, F>(doc: &Html, keywords: &[&str], parse_item: F) -> Vec<T>
where
    F: Fn(ElementRef) -> Option<T>,
{
    let Some(section) = find_section(doc, keywords) else {
        return Vec::new();
    };
    section_items(section).into_iter().filter_map(parse_item).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::text::fragments;

    const PAGE: &str = r#"
        <main>
          <section class="artdeco-card">
            <div id="experience" class="pv-profile-card__anchor"></div>
            <div><div><h2><span aria-hidden="true">Experience</span></h2></div></div>
            <div class="pvs-list__outer-container">
              <ul class="pvs-list">
                <li><span aria-hidden="true">First</span>
                  <ul><li><span aria-hidden="true">Nested role</span></li></ul>
                </li>
                <li><span aria-hidden="true">Second</span></li>
              </ul>
            </div>
          </section>
          <section>
            <h2>Education</h2>
            <div><p><span aria-hidden="true">Loose item</span></p></div>
          </section>
        </main>"#;

    #[test]
    fn finds_section_by_anchor_id() {
        let doc = Html::parse_document(PAGE);
        let heading = find_heading(&doc, &["experience"]).unwrap();
        assert_eq!(heading.value().id(), Some("experience"));
    }

    #[test]
    fn finds_section_by_heading_text_case_insensitive() {
        let doc = Html::parse_document(PAGE);
        let heading = find_heading(&doc, &["education"]).unwrap();
        assert_eq!(heading.value().name(), "h2");
    }

    #[test]
    fn only_direct_items_are_taken() {
        let doc = Html::parse_document(PAGE);
        let items: Vec<_> = extract_section(&doc, &["experience"], |li| fragments(li).into_iter().next());
        assert_eq!(items, vec!["First", "Second"]);
    }

    #[test]
    fn missing_heading_yields_empty() {
        let doc = Html::parse_document(PAGE);
        let items: Vec<String> = extract_section(&doc, &["skills"], |_| Some("x".to_string()));
        assert!(items.is_empty());
    }

    #[test]
    fn falls_back_to_all_items_in_section() {
        let doc = Html::parse_document(
            r#"<section><h2>Skills</h2><div class="pvs-list__outer-container">
                 <div><li>a</li><li>b</li></div></div></section>"#,
        );
        let section = find_section(&doc, &["skills"]).unwrap();
        assert_eq!(section_items(section).len(), 2);
    }

    #[test]
    fn grandparent_when_no_section_element() {
        let doc = Html::parse_document(
            r#"<div class="card"><div class="head"><h2>About</h2></div><p>Body</p></div>"#,
        );
        let section = find_section(&doc, &["about"]).unwrap();
        assert!(section.value().classes().any(|c| c == "card"));
    }
}
