//! LaTeX-only and Typst-only comment blocks
//!
//! Authors can mark regions with line comments:
//!
//! ```text
//! // BEGIN NO TEX
//! #outline()            <- dropped from the LaTeX output
//! // END NO TEX
//!
//! // BEGIN TEX
//! /* \newpage */        <- spliced in as raw LaTeX
//! // END TEX
//! ```
//!
//! Excluded regions are removed first, then included regions are replaced by
//! their interior. When the interior is wrapped in `/* ... */` only the
//! wrapped text is kept, so the fragment stays inert in Typst's rendering.
//! An excluded region takes its closing line break with it; an included
//! region keeps it, so the spliced text stays on a line of its own.

use regex::{Captures, Regex};
use std::sync::LazyLock;

static EXCLUDE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)//\s*BEGIN NO TEX\s*.*?//\s*END NO TEX[ \t]*\n?").unwrap());

static INCLUDE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)//\s*BEGIN TEX\s*(.*?)\s*//\s*END TEX[ \t]*").unwrap());

static BLOCK_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*\s*(.*?)\s*\*/").unwrap());

/// Apply both rewrites, exclusion first
pub fn process_comment_blocks(input: &str) -> String {
    let stripped = strip_excluded_blocks(input);
    splice_included_blocks(&stripped)
}

/// Delete `// BEGIN NO TEX` ... `// END NO TEX` regions
pub fn strip_excluded_blocks(input: &str) -> String {
    EXCLUDE_BLOCK.replace_all(input, "").into_owned()
}

/// Replace `// BEGIN TEX` ... `// END TEX` regions by their interior
pub fn splice_included_blocks(input: &str) -> String {
    INCLUDE_BLOCK
        .replace_all(input, |caps: &Captures| included_text(&caps[1]))
        .into_owned()
}

fn included_text(interior: &str) -> String {
    match BLOCK_COMMENT.captures(interior) {
        Some(caps) => caps[1].trim().to_string(),
        None => interior.trim().to_string(),
    }
}
