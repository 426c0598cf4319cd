//! Theorem-like environments
//!
//! `#theorem[...]`, `#lemma[...]` and friends become LaTeX environments.
//! The bracket interior is found with the delimiter balancer, so nested
//! content blocks are fine.
//!
//! The first line of the interior is taken as the environment's title:
//!
//! ```text
//! #theorem[Pythagoras          \begin{theorem}{Pythagoras}
//! The square of ...]     =>    The square of ...
//!                              \end{theorem}
//! ```
//!
//! Proofs are never titled. A block whose first line is empty is emitted
//! untitled with its full interior.

use typ_markup::{DelimiterSpan, balanced};

/// Environment names, in matching order
pub const ENVIRONMENTS: &[&str] = &[
    "theorem",
    "proposition",
    "lemma",
    "corollary",
    "proof",
    "definition",
    "example",
    "remark",
];

/// Convert every `#<environment>[...]` block
///
/// A keyword that is not followed by `[`, or whose bracket is never closed,
/// is left as plain text.
pub fn convert_environments(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut pos = 0;

    while let Some(ch) = input[pos..].chars().next() {
        if ch == '#' {
            if let Some((name, span)) = match_environment(input, pos) {
                let interior = convert_environments(span.content);
                output.push_str(&render_environment(name, &interior));
                pos = span.end;
                continue;
            }
        }
        output.push(ch);
        pos += ch.len_utf8();
    }

    output
}

/// Match an environment call starting at the `#` at `pos`
///
/// Only the first keyword that prefixes the input is tried.
fn match_environment(input: &str, pos: usize) -> Option<(&'static str, DelimiterSpan<'_>)> {
    let after_hash = &input[pos + 1..];
    let name = *ENVIRONMENTS
        .iter()
        .find(|name| after_hash.starts_with(**name))?;

    let after_name = &after_hash[name.len()..];
    let open = input.len() - after_name.trim_start().len();
    if !input[open..].starts_with('[') {
        return None;
    }

    balanced(input, open).ok().map(|span| (name, span))
}

/// Render one environment from its (already converted) interior
pub fn render_environment(name: &str, interior: &str) -> String {
    if name == "proof" {
        return format!("\\begin{{{name}}}\n{interior}\n\\end{{{name}}}");
    }

    match split_title(interior) {
        (title, body) if !title.is_empty() && !body.is_empty() => {
            format!("\\begin{{{name}}}{{{title}}}\n{body}\n\\end{{{name}}}")
        }
        (title, _) if !title.is_empty() => {
            format!("\\begin{{{name}}}{{{title}}}\n\\end{{{name}}}")
        }
        _ => format!("\\begin{{{name}}}\n{interior}\n\\end{{{name}}}"),
    }
}

/// Split an interior into its first line (the title) and the rest
///
/// Both parts are trimmed.
pub fn split_title(interior: &str) -> (&str, &str) {
    match interior.split_once('\n') {
        Some((first, rest)) => (first.trim(), rest.trim()),
        None => (interior.trim(), ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_titled_theorem() {
        let input = "#theorem[Pythagoras\nThe square of the hypotenuse...]";
        assert_eq!(
            convert_environments(input),
            "\\begin{theorem}{Pythagoras}\nThe square of the hypotenuse...\n\\end{theorem}"
        );
    }

    #[test]
    fn test_title_only() {
        assert_eq!(
            convert_environments("#lemma[Every group has an identity]"),
            "\\begin{lemma}{Every group has an identity}\n\\end{lemma}"
        );
    }

    #[test]
    fn test_empty_first_line_is_untitled() {
        let input = "#definition[\n  A set is open if...\n]";
        assert_eq!(
            convert_environments(input),
            "\\begin{definition}\n\n  A set is open if...\n\n\\end{definition}"
        );
    }

    #[test]
    fn test_proof_has_no_title() {
        let input = "#proof[Trivial.\nQED]";
        assert_eq!(
            convert_environments(input),
            "\\begin{proof}\nTrivial.\nQED\n\\end{proof}"
        );
    }

    #[test]
    fn test_whitespace_before_bracket() {
        assert_eq!(
            convert_environments("#remark [Note\nBody]"),
            "\\begin{remark}{Note}\nBody\n\\end{remark}"
        );
    }

    #[test]
    fn test_nested_brackets_in_body() {
        let input = "#example[Lists\nsee [a [b]] here] after";
        assert_eq!(
            convert_environments(input),
            "\\begin{example}{Lists}\nsee [a [b]] here\n\\end{example} after"
        );
    }

    #[test]
    fn test_nested_environment() {
        let input = "#proof[\n#lemma[Helper\nbody]\n]";
        assert_eq!(
            convert_environments(input),
            "\\begin{proof}\n\n\\begin{lemma}{Helper}\nbody\n\\end{lemma}\n\n\\end{proof}"
        );
    }

    #[test]
    fn test_keyword_without_bracket_is_text() {
        assert_eq!(convert_environments("#theorems are nice"), "#theorems are nice");
        assert_eq!(convert_environments("a #lemma b"), "a #lemma b");
    }

    #[test]
    fn test_unbalanced_left_verbatim() {
        let input = "#theorem[never closed\nstill open";
        assert_eq!(convert_environments(input), input);
    }

    #[test]
    fn test_unknown_environment_untouched() {
        assert_eq!(convert_environments("#conjecture[X\nY]"), "#conjecture[X\nY]");
    }

    #[test]
    fn test_proposition_before_proof() {
        assert_eq!(
            convert_environments("#proposition[P\nQ]"),
            "\\begin{proposition}{P}\nQ\n\\end{proposition}"
        );
    }

    #[test]
    fn test_split_title() {
        assert_eq!(split_title("  Title  \n body \n"), ("Title", "body"));
        assert_eq!(split_title("only"), ("only", ""));
        assert_eq!(split_title("\nbody"), ("", "body"));
    }
}
