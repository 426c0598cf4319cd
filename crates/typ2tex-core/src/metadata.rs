//! Document metadata
//!
//! Title, authors, abstract and bibliography path are read from the raw
//! source, independently of the body passes. Each field is optional and a
//! missing or malformed field is simply absent.
//!
//! ```text
//! #show: paper.with(
//!   title: [On Triangles],
//!   authors: (
//!     (name: "Ada", affiliation: "Analytical Engines Ltd."),
//!     (name: "Alan", email: "alan@example.org"),
//!   ),
//!   abstract: abstract,
//!   bibliography: bibliography("refs.bib"),
//! )
//! #let abstract = [We study triangles.]
//! ```

use regex::Regex;
use std::sync::LazyLock;
use typ_markup::balanced;

static TITLE_BLOCK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\btitle\s*:\s*\[").unwrap());
static TITLE_STRING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\btitle\s*:\s*"([^"]+)""#).unwrap());

static AUTHORS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bauthors\s*:\s*\(").unwrap());
static AUTHOR_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(\w+)\s*:\s*"([^"]*)""#).unwrap());
static STRING_LITERAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#""([^"]*)""#).unwrap());

static ABSTRACT_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\babstract\s*:\s*\[").unwrap());
static ABSTRACT_IDENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\babstract\s*:\s*(\w+)").unwrap());

static BIBLIOGRAPHY_ARG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bbibliography\s*:\s*bibliography\(\s*"([^"]+)""#).unwrap()
});
static BIBLIOGRAPHY_CALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"#bibliography\(\s*"([^"]+)""#).unwrap());

/// Author detail fields, rendered below the name in source order
pub const DETAIL_FIELDS: &[&str] = &[
    "organization",
    "affiliation",
    "department",
    "location",
    "email",
];

/// One author block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Author {
    pub name: String,
    /// Affiliation, location, email and similar lines
    pub details: Vec<String>,
}

impl Author {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            details: Vec::new(),
        }
    }

    /// The block's lines, name first
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str())
            .chain(self.details.iter().map(String::as_str))
            .filter(|line| !line.is_empty())
    }

    /// Lines joined by LaTeX line breaks
    pub fn render(&self) -> String {
        self.lines().collect::<Vec<_>>().join("\\\\\n")
    }
}

/// Metadata read from the document header
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedMetadata {
    pub title: Option<String>,
    pub authors: Vec<Author>,
    pub abstract_text: Option<String>,
    pub bibliography_path: Option<String>,
    /// Never read from the source; `\today` when unset
    pub date: Option<String>,
}

impl ExtractedMetadata {
    /// Author blocks joined by `\and`
    pub fn render_authors(&self) -> String {
        self.authors
            .iter()
            .map(Author::render)
            .collect::<Vec<_>>()
            .join("\n\\and\n")
    }

    pub fn date_or_today(&self) -> &str {
        self.date.as_deref().unwrap_or("\\today")
    }
}

/// Read every metadata field from the raw source
pub fn parse_metadata(source: &str) -> ExtractedMetadata {
    ExtractedMetadata {
        title: parse_title(source),
        authors: parse_authors(source),
        abstract_text: parse_abstract(source),
        bibliography_path: parse_bibliography_path(source),
        date: None,
    }
}

pub fn parse_title(source: &str) -> Option<String> {
    if let Some(text) = TITLE_BLOCK
        .find(source)
        .and_then(|m| bracket_content(source, m.end() - 1))
    {
        return non_empty(text);
    }
    TITLE_STRING
        .captures(source)
        .and_then(|caps| non_empty(&caps[1]))
}

/// Authors from `authors: (...)`
///
/// The list may hold one tuple per author, a single tuple, or plain strings.
pub fn parse_authors(source: &str) -> Vec<Author> {
    let Some(m) = AUTHORS.find(source) else {
        return Vec::new();
    };
    let Ok(list) = balanced(source, m.end() - 1) else {
        return Vec::new();
    };

    let tuples = inner_tuples(list.content);
    if !tuples.is_empty() {
        return tuples.into_iter().filter_map(parse_author).collect();
    }
    if let Some(author) = parse_author(list.content) {
        return vec![author];
    }
    STRING_LITERAL
        .captures_iter(list.content)
        .filter_map(|caps| non_empty(&caps[1]))
        .map(Author::new)
        .collect()
}

/// Parse one `(name: "..", affiliation: "..", ..)` tuple body
fn parse_author(tuple: &str) -> Option<Author> {
    let mut author = Author::default();
    for caps in AUTHOR_FIELD.captures_iter(tuple) {
        let value = caps[2].trim();
        match &caps[1] {
            "name" => author.name = value.to_string(),
            field if DETAIL_FIELDS.contains(&field) && !value.is_empty() => {
                author.details.push(value.to_string());
            }
            _ => {}
        }
    }
    (!author.name.is_empty() || !author.details.is_empty()).then_some(author)
}

/// Bodies of the parenthesised groups directly inside `list`
fn inner_tuples(list: &str) -> Vec<&str> {
    let mut tuples = Vec::new();
    let mut pos = 0;
    while let Some(offset) = list[pos..].find('(') {
        let open = pos + offset;
        match balanced(list, open) {
            Ok(span) => {
                tuples.push(span.content);
                pos = span.end;
            }
            Err(_) => break,
        }
    }
    tuples
}

/// Abstract from `abstract: [...]` or `abstract: ident` plus `#let ident = [...]`
pub fn parse_abstract(source: &str) -> Option<String> {
    if let Some(text) = ABSTRACT_BLOCK
        .find(source)
        .and_then(|m| bracket_content(source, m.end() - 1))
    {
        return non_empty(text);
    }

    let ident = ABSTRACT_IDENT.captures(source)?.get(1)?.as_str();
    let definition = Regex::new(&format!(r"#let\s+{}\s*=\s*\[", regex::escape(ident))).ok()?;
    let m = definition.find(source)?;
    bracket_content(source, m.end() - 1).and_then(non_empty)
}

/// Bibliography path from `bibliography: bibliography("..")`, falling back to
/// a standalone `#bibliography("..")` call
pub fn parse_bibliography_path(source: &str) -> Option<String> {
    BIBLIOGRAPHY_ARG
        .captures(source)
        .or_else(|| BIBLIOGRAPHY_CALL.captures(source))
        .and_then(|caps| non_empty(&caps[1]))
}

fn bracket_content(source: &str, open: usize) -> Option<&str> {
    balanced(source, open).ok().map(|span| span.content)
}

fn non_empty(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}
