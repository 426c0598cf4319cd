//! typ2tex-core: Core library for converting Typst documents to LaTeX
//!
//! This crate provides:
//! - Header metadata extraction (title, authors, abstract, bibliography)
//! - The ordered body rewriting pipeline and each of its passes
//! - Math conversion through an external command
//! - Citation key loading from BibTeX files
//! - Document template rendering
//!
//! ```
//! use typ2tex_core::{CitationKeys, ConverterOptions, convert_body_with_options};
//!
//! let keys: CitationKeys = ["knuth84"].into_iter().collect();
//! let options = ConverterOptions::default().with_citation_keys(keys);
//! let latex = convert_body_with_options("= Intro\n*TeX* is @knuth84.", &options);
//! assert_eq!(latex, "\\section{Intro}\n\\textbf{TeX} is \\cite{knuth84}.");
//! ```

pub mod citations;
pub mod comments;
pub mod directives;
pub mod emphasis;
pub mod environments;
pub mod figures;
pub mod headings;
pub mod labels;
pub mod math;
pub mod metadata;
pub mod pipeline;
pub mod styling;
pub mod template;
pub mod whitespace;

pub use citations::{CitationKeys, resolve_citations};
pub use math::{CommandConverter, DelegateError, MathConverter, MathOutcome, convert_math};
pub use metadata::{Author, ExtractedMetadata, parse_metadata};
pub use pipeline::{
    Conversion, ConverterOptions, Pass, convert_body, convert_body_with_options, convert_document,
    run_passes,
};
pub use template::{DEFAULT_TEMPLATE, render_document};
