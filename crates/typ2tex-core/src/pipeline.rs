//! Ordered conversion pipeline
//!
//! The body is rewritten by a fixed sequence of passes, each a pure
//! `&str -> String` function. Order matters: emphasis is scanned before math
//! is replaced, environments are extracted before headings and labels are
//! rewritten, and blank lines are normalised last.

use std::fmt;
use tracing::debug;

use crate::citations::{CitationKeys, resolve_citations};
use crate::comments::process_comment_blocks;
use crate::directives::remove_directives;
use crate::emphasis::rewrite_emphasis;
use crate::environments::convert_environments;
use crate::figures::convert_figures;
use crate::headings::rewrite_headings;
use crate::labels::{reposition_labels, rewrite_labels};
use crate::math::{MathConverter, convert_math};
use crate::metadata::{ExtractedMetadata, parse_metadata};
use crate::styling::rewrite_styled_text;
use crate::template::render_document;
use crate::whitespace::collapse_blank_lines;

/// One rewriting pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pass {
    Directives,
    Emphasis,
    Math,
    CommentBlocks,
    Environments,
    Figures,
    StyledText,
    Headings,
    Citations,
    Labels,
    LabelPlacement,
    BlankLines,
}

impl Pass {
    /// Every pass, in the order the pipeline runs them
    pub const ORDER: [Pass; 12] = [
        Pass::Directives,
        Pass::Emphasis,
        Pass::Math,
        Pass::CommentBlocks,
        Pass::Environments,
        Pass::Figures,
        Pass::StyledText,
        Pass::Headings,
        Pass::Citations,
        Pass::Labels,
        Pass::LabelPlacement,
        Pass::BlankLines,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Pass::Directives => "directives",
            Pass::Emphasis => "emphasis",
            Pass::Math => "math",
            Pass::CommentBlocks => "comment-blocks",
            Pass::Environments => "environments",
            Pass::Figures => "figures",
            Pass::StyledText => "styled-text",
            Pass::Headings => "headings",
            Pass::Citations => "citations",
            Pass::Labels => "labels",
            Pass::LabelPlacement => "label-placement",
            Pass::BlankLines => "blank-lines",
        }
    }

    /// Run this pass alone
    pub fn apply(self, input: &str, options: &ConverterOptions) -> String {
        match self {
            Pass::Directives => remove_directives(input),
            Pass::Emphasis => rewrite_emphasis(input),
            Pass::Math => match &options.math {
                Some(converter) => convert_math(input, converter.as_ref()),
                None => input.to_string(),
            },
            Pass::CommentBlocks => process_comment_blocks(input),
            Pass::Environments => convert_environments(input),
            Pass::Figures => convert_figures(input),
            Pass::StyledText => rewrite_styled_text(input),
            Pass::Headings => rewrite_headings(input),
            Pass::Citations => resolve_citations(input, &options.citation_keys),
            Pass::Labels => rewrite_labels(input),
            Pass::LabelPlacement => reposition_labels(input),
            Pass::BlankLines => collapse_blank_lines(input),
        }
    }
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Options for body conversion
#[derive(Default)]
pub struct ConverterOptions {
    /// Keys of the bibliography; `@key` tokens outside it become references
    pub citation_keys: CitationKeys,
    /// Converter for `$...$` spans
    /// If None, math is kept as written
    pub math: Option<Box<dyn MathConverter>>,
}

impl ConverterOptions {
    pub fn with_citation_keys(mut self, keys: CitationKeys) -> Self {
        self.citation_keys = keys;
        self
    }

    pub fn with_math(mut self, converter: impl MathConverter + 'static) -> Self {
        self.math = Some(Box::new(converter));
        self
    }
}

impl fmt::Debug for ConverterOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConverterOptions")
            .field("citation_keys", &self.citation_keys.len())
            .field("math", &self.math.is_some())
            .finish()
    }
}

/// Run the given passes in sequence
pub fn run_passes(input: &str, passes: &[Pass], options: &ConverterOptions) -> String {
    let mut text = input.to_string();
    for pass in passes {
        text = pass.apply(&text, options);
        debug!(pass = pass.name(), len = text.len(), "Pass complete");
    }
    text
}

/// Convert a document body with default options
///
/// No citation keys are known and math is kept as written.
pub fn convert_body(input: &str) -> String {
    convert_body_with_options(input, &ConverterOptions::default())
}

/// Convert a document body with options
pub fn convert_body_with_options(input: &str, options: &ConverterOptions) -> String {
    run_passes(input, &Pass::ORDER, options)
}

/// A converted document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    pub metadata: ExtractedMetadata,
    pub body: String,
}

impl Conversion {
    /// Fill a template with this conversion
    pub fn render(&self, template: &str) -> String {
        render_document(template, &self.metadata, &self.body)
    }
}

/// Extract metadata and convert the body of a whole document
///
/// The abstract is converted with the same passes as the body.
pub fn convert_document(source: &str, options: &ConverterOptions) -> Conversion {
    let mut metadata = parse_metadata(source);
    metadata.abstract_text = metadata
        .abstract_text
        .map(|text| convert_body_with_options(&text, options).trim().to_string());

    Conversion {
        body: convert_body_with_options(source, options).trim().to_string(),
        metadata,
    }
}
