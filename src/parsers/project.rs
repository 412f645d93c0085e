use crate::parsers::query::{ancestor_with_classes, find_label_exact, first_descendant, text_of};
use crate::results::ProjectRecord;
use scraper::Html;

pub const PROJECT_NAME_CAPTION: &str = "Project Name";
pub const REGISTRATION_CAPTION: &str = "RERA Regd. No.";

/// Classes of the block that pairs a caption with its value
const DETAIL_BLOCK_CLASSES: [&str; 2] = ["details-project", "ms-3"];

/// Extracts the project name and RERA registration number from a detail view.
///
/// Each field is the first `<strong>` inside the detail block around its
/// caption label. A field whose label, block or value is missing comes back
/// empty.
pub fn extract_project_info(markup: &str) -> ProjectRecord {
    let doc = Html::parse_document(markup);

    let record = ProjectRecord {
        name: labelled_value(&doc, PROJECT_NAME_CAPTION),
        regulatory_id: labelled_value(&doc, REGISTRATION_CAPTION),
    };

    ::log::debug!(
        "Project info: name={:?} rera={:?}",
        record.name,
        record.regulatory_id
    );
    record
}

fn labelled_value(doc: &Html, caption: &str) -> String {
    find_label_exact(doc, caption)
        .and_then(|label| ancestor_with_classes(label, "div", &DETAIL_BLOCK_CLASSES))
        .and_then(|block| first_descendant(block, "strong"))
        .map(text_of)
        .unwrap_or_default()
}
