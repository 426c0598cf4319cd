//! Strong and emphasis markup
//!
//! Rewrites `*strong*` / `[_*strong*_]` to `\textbf{}` and `_emph_` /
//! `[_emph_]` to `\emph{}`. The rewrite is driven by the mode-aware
//! [`Scanner`], so a `*` or `_` inside `$...$` math or a `/* ... */` comment
//! is never touched.
//!
//! At each text position the forms are tried in this order:
//!
//! | Form | Output |
//! |------|--------|
//! | `[_*x*_]` | `\textbf{x}` |
//! | `*x*` | `\textbf{x}` |
//! | `[_x_]` | `\emph{x}` |
//! | `_x_` | `\emph{x}` |
//!
//! A form never spans a line break, and is rejected when its content would
//! leave a math or comment region open. The content of a matched form is
//! rewritten in turn, so `*a _b_ c*` gives `\textbf{a \emph{b} c}`. Reference (`@key`) and label
//! (`<name>`) tokens are copied whole so underscores in keys survive.

use regex::Regex;
use std::sync::LazyLock;
use typ_markup::{Mode, Scanner, ends_in_text};

use crate::citations::REFERENCE_KEY;

static EMPHASIS_FORMS: LazyLock<[(Regex, &'static str); 4]> = LazyLock::new(|| {
    [
        (Regex::new(r"^\[_\*([^*\n]+)\*_\]").unwrap(), "textbf"),
        (Regex::new(r"^\*([^*\n]+)\*").unwrap(), "textbf"),
        (Regex::new(r"^\[_([^_\n]+)_\]").unwrap(), "emph"),
        (Regex::new(r"^_([^_\n]+)_").unwrap(), "emph"),
    ]
});

static VERBATIM_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"^(?:@{REFERENCE_KEY}|<[\w:.\-]+>)")).unwrap());

/// Rewrite strong and emphasis markup outside math and comments
pub fn rewrite_emphasis(input: &str) -> String {
    let mut scanner = Scanner::new(input);
    let mut output = String::with_capacity(input.len());

    while !scanner.is_at_end() {
        if scanner.mode() == Mode::Text {
            if let Some((len, replacement)) = match_text_construct(scanner.rest()) {
                output.push_str(&replacement);
                scanner.advance(len);
                continue;
            }
        }
        if let Some(piece) = scanner.next() {
            output.push_str(piece.text);
        }
    }

    output
}

/// Try to match a construct at the start of `rest`
///
/// Returns the matched length and its replacement.
fn match_text_construct(rest: &str) -> Option<(usize, String)> {
    let first = rest.chars().next()?;
    match first {
        '@' | '<' => VERBATIM_TOKEN
            .find(rest)
            .map(|m| (m.end(), m.as_str().to_string())),
        '*' | '_' | '[' => EMPHASIS_FORMS.iter().find_map(|(pattern, macro_name)| {
            let caps = pattern.captures(rest)?;
            let content = caps.get(1)?.as_str();
            if !ends_in_text(content) {
                return None;
            }
            let whole = caps.get(0)?;
            let inner = rewrite_emphasis(content);
            Some((whole.end(), format!("\\{macro_name}{{{inner}}}")))
        }),
        _ => None,
    }
}
