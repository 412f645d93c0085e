//! Optional-returning lookups over a parsed document.
//!
//! Every lookup answers `None` when the structure it walks is missing, so the
//! extractors can chain them with `?`/`and_then` and fall back to an empty
//! string at the end instead of branching on each step.

use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

static LABEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("label").unwrap());

/// Full text content of an element, untrimmed
fn raw_text(el: ElementRef<'_>) -> String {
    el.text().collect()
}

/// Text content of an element with surrounding whitespace removed
pub fn text_of(el: ElementRef<'_>) -> String {
    raw_text(el).trim().to_string()
}

/// First `<label>` whose text is exactly `caption`
pub fn find_label_exact<'a>(doc: &'a Html, caption: &str) -> Option<ElementRef<'a>> {
    doc.select(&LABEL).find(|label| raw_text(*label) == caption)
}

/// First `<label>` whose text contains `needle`
pub fn find_label_containing<'a>(doc: &'a Html, needle: &str) -> Option<ElementRef<'a>> {
    doc.select(&LABEL).find(|label| raw_text(*label).contains(needle))
}

/// Nearest ancestor with the given tag carrying every class in `classes`
pub fn ancestor_with_classes<'a>(
    el: ElementRef<'a>,
    tag: &str,
    classes: &[&str],
) -> Option<ElementRef<'a>> {
    el.ancestors().filter_map(ElementRef::wrap).find(|ancestor| {
        let value = ancestor.value();
        value.name() == tag && {
            let own: Vec<&str> = value.classes().collect();
            classes.iter().all(|class| own.contains(class))
        }
    })
}

/// First descendant element with the given tag, excluding `el` itself
pub fn first_descendant<'a>(el: ElementRef<'a>, tag: &str) -> Option<ElementRef<'a>> {
    el.descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .find(|d| d.value().name() == tag)
}

/// First following sibling element with the given tag
pub fn next_sibling_element<'a>(el: ElementRef<'a>, tag: &str) -> Option<ElementRef<'a>> {
    el.next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|s| s.value().name() == tag)
}

/// Immediate parent, when it is an element
pub fn parent_element<'a>(el: ElementRef<'a>) -> Option<ElementRef<'a>> {
    el.parent().and_then(ElementRef::wrap)
}
