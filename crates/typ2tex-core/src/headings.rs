//! Heading lines
//!
//! A line opening with `=` markers and whitespace is a heading; the number
//! of markers is its depth.

use regex::{Captures, Regex};
use std::sync::LazyLock;

static HEADING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^(=+)[ \t]+(.*)$").unwrap());

/// Sectioning command for a heading depth (1-based)
pub fn sectioning_command(depth: usize) -> &'static str {
    match depth {
        0 | 1 => "section",
        2 => "subsection",
        3 => "subsubsection",
        _ => "paragraph",
    }
}

pub fn rewrite_headings(input: &str) -> String {
    HEADING
        .replace_all(input, |caps: &Captures| {
            let command = sectioning_command(caps[1].len());
            format!("\\{command}{{{}}}", caps[2].trim_end())
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depths() {
        let input = "= One\n== Two\n=== Three\n==== Four\n===== Five";
        assert_eq!(
            rewrite_headings(input),
            "\\section{One}\n\\subsection{Two}\n\\subsubsection{Three}\n\\paragraph{Four}\n\\paragraph{Five}"
        );
    }

    #[test]
    fn test_trailing_label_kept_inside() {
        assert_eq!(
            rewrite_headings("= Introduction <sec:intro>"),
            "\\section{Introduction <sec:intro>}"
        );
    }

    #[test]
    fn test_only_at_line_start() {
        assert_eq!(rewrite_headings("a == b"), "a == b");
        assert_eq!(rewrite_headings("  = indented"), "  = indented");
    }

    #[test]
    fn test_marker_needs_whitespace() {
        assert_eq!(rewrite_headings("=none"), "=none");
        assert_eq!(rewrite_headings("==\n"), "==\n");
    }

    #[test]
    fn test_trailing_whitespace_trimmed() {
        assert_eq!(rewrite_headings("== Methods  \r\nBody"), "\\subsection{Methods}\nBody");
    }
}
