//! Document template
//!
//! A template is LaTeX source with `%name%` placeholders for `title`,
//! `authors`, `date`, `abstract`, `bibliography` and `content`. All
//! placeholders are filled in one pass, so text that lands in the document
//! is never scanned for further placeholders.

use regex::{Captures, Regex};
use std::sync::LazyLock;

use crate::metadata::ExtractedMetadata;

/// Article template with `ntheorem` environments and `biblatex`
pub const DEFAULT_TEMPLATE: &str = include_str!("../templates/article.tex");

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%(title|authors|date|abstract|bibliography|content)%").unwrap());

/// Fill a template from metadata and a converted body
pub fn render_document(template: &str, metadata: &ExtractedMetadata, body: &str) -> String {
    let authors = metadata.render_authors();

    PLACEHOLDER
        .replace_all(template, |caps: &Captures| match &caps[1] {
            "title" => metadata.title.as_deref().unwrap_or(""),
            "authors" => authors.as_str(),
            "date" => metadata.date_or_today(),
            "abstract" => metadata.abstract_text.as_deref().unwrap_or(""),
            "bibliography" => metadata.bibliography_path.as_deref().unwrap_or(""),
            _ => body,
        })
        .into_owned()
}
