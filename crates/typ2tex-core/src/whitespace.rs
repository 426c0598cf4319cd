//! Blank-line normalisation
//!
//! Runs last, after passes that leave empty lines where directives and
//! comment blocks were removed.

use regex::Regex;
use std::sync::LazyLock;

static BLANK_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*\n\s*\n").unwrap());

/// Collapse whitespace runs holding three or more line breaks to a single
/// blank line
pub fn collapse_blank_lines(input: &str) -> String {
    BLANK_RUN.replace_all(input, "\n\n").into_owned()
}
