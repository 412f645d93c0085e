use crate::parsers::query::{
    find_label_containing, first_descendant, next_sibling_element, parent_element, text_of,
};
use crate::results::PromoterRecord;
use scraper::Html;

/// Captions tried in order; the first one yielding a value wins.
/// Proprietorships and companies label the same fields differently.
pub const ENTITY_NAME_CAPTIONS: [&str; 2] = ["Propietory Name", "Company Name"];
pub const ADDRESS_CAPTIONS: [&str; 2] = [
    "Current Residence Address",
    "Registered Office Address",
];
pub const TAX_ID_CAPTIONS: [&str; 1] = ["GST No."];

/// Extracts promoter name, address and GST number from the promoter tab.
pub fn extract_promoter_info(markup: &str) -> PromoterRecord {
    let doc = Html::parse_document(markup);

    let record = PromoterRecord {
        entity_name: first_detail(&doc, &ENTITY_NAME_CAPTIONS),
        address: first_detail(&doc, &ADDRESS_CAPTIONS),
        tax_id: first_detail(&doc, &TAX_ID_CAPTIONS),
    };

    ::log::debug!(
        "Promoter info: name={:?} address={:?} gst={:?}",
        record.entity_name,
        record.address,
        record.tax_id
    );
    record
}

fn first_detail(doc: &Html, captions: &[&str]) -> String {
    captions
        .iter()
        .map(|caption| detail(doc, caption))
        .find(|value| !value.is_empty())
        .unwrap_or_default()
}

/// Value for the label containing `needle`: a `<strong>` sibling, or else the
/// first `<strong>` in the label's container
pub(crate) fn detail(doc: &Html, needle: &str) -> String {
    let Some(label) = find_label_containing(doc, needle) else {
        return String::new();
    };

    next_sibling_element(label, "strong")
        .or_else(|| {
            parent_element(label).and_then(|parent| first_descendant(parent, "strong"))
        })
        .map(text_of)
        .unwrap_or_default()
}
