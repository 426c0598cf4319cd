//! `#text(..)[..]` styling calls
//!
//! Italic and bold styles map to `\emph` and `\textbf`. Every other styled
//! call keeps its content and drops the styling. The content must not contain
//! a `]`.

use regex::Regex;
use std::sync::LazyLock;

static ITALIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"#text\s*\(\s*style:\s*"italic"\s*\)\s*\[([^\]]+)\]"#).unwrap()
});

static BOLD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"#text\s*\(\s*(?:style|weight):\s*"bold"\s*\)\s*\[([^\]]+)\]"#).unwrap()
});

static OTHER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#text\s*\([^)]+\)\s*\[([^\]]+)\]").unwrap());

pub fn rewrite_styled_text(input: &str) -> String {
    let output = ITALIC.replace_all(input, r"\emph{$1}");
    let output = BOLD.replace_all(&output, r"\textbf{$1}");
    OTHER.replace_all(&output, "$1").into_owned()
}
