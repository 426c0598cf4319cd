//! Citations and cross-references
//!
//! Typst writes both bibliography citations and references to labels as
//! `@key`. The two are told apart by looking the key up in the set of entry
//! keys found in the BibTeX file: known keys become `\cite{key}`, anything
//! else becomes `\thref{key}` (an internal reference). Lookups are exact; no
//! case or whitespace normalisation is applied.

use regex::{Captures, Regex};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, warn};

/// Reference key: word characters and `-`, with inner `:` or `.` separators
/// (`@thm:main` is one key, the `.` ending a sentence is not part of it)
///
/// A period followed directly by a word character is a separator, so
/// `@smith2020.Next` with no space reads as the single key `smith2020.Next`.
/// Dotted keys such as `@eq.1` need this.
pub(crate) const REFERENCE_KEY: &str = r"[\w-]+(?:[:.][\w-]+)*";

/// `@key` citation token
pub(crate) static CITATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("@({REFERENCE_KEY})")).unwrap());

/// `@kind{key,` entry head in a BibTeX file
static BIB_ENTRY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@(\w+)\s*\{\s*([^,\s{}]+)\s*,").unwrap());

/// BibTeX entry kinds that do not define a citable key
const NON_KEY_KINDS: &[&str] = &["comment", "preamble", "string"];

/// Keys defined in a bibliography file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CitationKeys {
    keys: HashSet<String>,
}

impl CitationKeys {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extract entry keys from BibTeX source
    pub fn parse(content: &str) -> Self {
        let keys = BIB_ENTRY
            .captures_iter(content)
            .filter(|caps| {
                !NON_KEY_KINDS
                    .iter()
                    .any(|kind| caps[1].eq_ignore_ascii_case(kind))
            })
            .map(|caps| caps[2].to_string())
            .collect();
        Self { keys }
    }

    /// Read and parse a bibliography file
    pub fn from_file(path: &Path) -> io::Result<Self> {
        let content = fs::read_to_string(path)?;
        let keys = Self::parse(&content);
        debug!(path = %path.display(), count = keys.len(), "Loaded citation keys");
        Ok(keys)
    }

    /// Read a bibliography file, degrading to an empty set on failure
    pub fn load_or_empty(path: &Path) -> Self {
        Self::from_file(path).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "Could not read bibliography, citations become references");
            Self::default()
        })
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for CitationKeys {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// The LaTeX for one `@key` token
pub fn citation_macro(key: &str, keys: &CitationKeys) -> String {
    if keys.contains(key) {
        format!("\\cite{{{key}}}")
    } else {
        format!("\\thref{{{key}}}")
    }
}

/// Rewrite every `@key` token against the key set
pub fn resolve_citations(input: &str, keys: &CitationKeys) -> String {
    CITATION
        .replace_all(input, |caps: &Captures| citation_macro(&caps[1], keys))
        .into_owned()
}
