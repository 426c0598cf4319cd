//! Figure calls
//!
//! `#figure(body, caption: [...])` becomes a floating `figure` block. The
//! argument list is found with the delimiter balancer; the body is passed
//! through untouched and the caption is reduced to its text.

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;
use typ_markup::balanced;

use crate::citations::CITATION;

static FIGURE_CALL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^#figure\s*\(").unwrap());

static STYLED_CAPTION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^#?text\s*\(").unwrap());

/// The two parts of a figure's argument list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FigureParts<'a> {
    pub body: &'a str,
    pub caption: Option<&'a str>,
}

/// Convert every `#figure(...)` call
///
/// A call whose parenthesis is never closed is left in place and scanning
/// resumes right after its `#`.
pub fn convert_figures(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut pos = 0;

    while let Some(ch) = input[pos..].chars().next() {
        if ch == '#' {
            if let Some(m) = FIGURE_CALL.find(&input[pos..]) {
                let open = pos + m.end() - 1;
                match balanced(input, open) {
                    Ok(span) => {
                        output.push_str(&render_figure(split_figure_arguments(span.content)));
                        pos = span.end;
                        continue;
                    }
                    Err(e) => debug!(offset = pos, error = %e, "Leaving figure call verbatim"),
                }
            }
        }
        output.push(ch);
        pos += ch.len_utf8();
    }

    output
}

/// Split a figure's argument list into its body and caption text
pub fn split_figure_arguments(args: &str) -> FigureParts<'_> {
    let Some(at) = find_top_level(args, is_caption_keyword) else {
        return FigureParts {
            body: unwrap_content_block(args.trim()),
            caption: None,
        };
    };

    let body = args[..at].trim_end();
    let body = body.strip_suffix(',').unwrap_or(body);
    let body = unwrap_content_block(body.trim());

    let value = args[at + "caption".len()..]
        .trim_start()
        .trim_start_matches(':')
        .trim_start();
    let caption = caption_text(value);

    FigureParts {
        body,
        caption: (!caption.is_empty()).then_some(caption),
    }
}

/// Extract the text of a caption value
///
/// `[...]` and `text(..)[...]` yield the bracket interior, anything else is
/// taken up to the next top-level `,`.
fn caption_text(value: &str) -> &str {
    if value.starts_with('[') {
        if let Ok(span) = balanced(value, 0) {
            return span.content.trim();
        }
    }

    if let Some(m) = STYLED_CAPTION.find(value) {
        if let Ok(args) = balanced(value, m.end() - 1) {
            let open = value.len() - value[args.end..].trim_start().len();
            if value[open..].starts_with('[') {
                if let Ok(span) = balanced(value, open) {
                    return span.content.trim();
                }
            }
        }
    }

    let end = find_top_level(value, |_, rest| rest.starts_with(',')).unwrap_or(value.len());
    value[..end].trim()
}

/// Rewrite `@key` tokens in a caption to `\cite{key}`
///
/// Unlike body citations no key lookup is made: every caption reference is
/// cited.
pub fn rewrite_caption_citations(caption: &str) -> String {
    CITATION.replace_all(caption, r"\cite{$1}").into_owned()
}

fn render_figure(parts: FigureParts<'_>) -> String {
    let mut lines = vec![r"\begin{figure}[htbp]".to_string(), r"\centering".to_string()];
    if !parts.body.is_empty() {
        lines.push(parts.body.to_string());
    }
    if let Some(caption) = parts.caption {
        lines.push(format!("\\caption{{{}}}", rewrite_caption_citations(caption)));
    }
    lines.push(r"\end{figure}".to_string());
    lines.join("\n")
}

/// Strip one `[...]` wrapper spanning the whole text
fn unwrap_content_block(text: &str) -> &str {
    if text.starts_with('[') {
        if let Ok(span) = balanced(text, 0) {
            if span.end == text.len() {
                return span.content.trim();
            }
        }
    }
    text
}

fn is_caption_keyword(before: &str, rest: &str) -> bool {
    let at_word_start = !before
        .chars()
        .next_back()
        .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '-');
    at_word_start
        && rest
            .strip_prefix("caption")
            .is_some_and(|after| after.trim_start().starts_with(':'))
}

/// Byte offset of the first position outside any `()`, `[]` or `{}` group
/// where `matches(before, rest)` holds
///
/// String literals are not recognised.
fn find_top_level(text: &str, matches: impl Fn(&str, &str) -> bool) -> Option<usize> {
    let mut depth = 0usize;

    for (i, ch) in text.char_indices() {
        if depth == 0 && matches(&text[..i], &text[i..]) {
            return Some(i);
        }
        match ch {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==========================================================================
    // Argument splitting
    // ==========================================================================

    #[test]
    fn test_split_body_and_caption() {
        let parts = split_figure_arguments(r#"[#image("plot.png")], caption: [A plot]"#);
        assert_eq!(parts.body, r#"#image("plot.png")"#);
        assert_eq!(parts.caption, Some("A plot"));
    }

    #[test]
    fn test_split_without_caption() {
        let parts = split_figure_arguments(r#"image("plot.png", width: 80%)"#);
        assert_eq!(parts.body, r#"image("plot.png", width: 80%)"#);
        assert_eq!(parts.caption, None);
    }

    #[test]
    fn test_nested_caption_is_not_top_level() {
        let parts = split_figure_arguments("box(caption: [inner])[x], caption: [outer]");
        assert_eq!(parts.body, "box(caption: [inner])[x]");
        assert_eq!(parts.caption, Some("outer"));
    }

    #[test]
    fn test_styled_caption() {
        let parts = split_figure_arguments("[x], caption: text(size: 9pt)[Small [print]]");
        assert_eq!(parts.caption, Some("Small [print]"));
        let parts = split_figure_arguments(r#"[x], caption: #text(fill: red)[Red]"#);
        assert_eq!(parts.caption, Some("Red"));
    }

    #[test]
    fn test_verbatim_caption_stops_at_separator() {
        let parts = split_figure_arguments("[x], caption: plot-caption, supplement: [Fig.]");
        assert_eq!(parts.caption, Some("plot-caption"));
    }

    #[test]
    fn test_identifier_ending_in_caption_is_not_keyword() {
        let parts = split_figure_arguments("[x], subcaption: [no]");
        assert_eq!(parts.caption, None);
    }

    #[test]
    fn test_empty_caption_dropped() {
        let parts = split_figure_arguments("[x], caption: []");
        assert_eq!(parts.body, "x");
        assert_eq!(parts.caption, None);
    }

    // ==========================================================================
    // Conversion
    // ==========================================================================

    #[test]
    fn test_figure_with_caption() {
        let input = "Before\n#figure([#image(\"a.png\")], caption: [Results])\nAfter";
        assert_eq!(
            convert_figures(input),
            "Before\n\\begin{figure}[htbp]\n\\centering\n#image(\"a.png\")\n\\caption{Results}\n\\end{figure}\nAfter"
        );
    }

    #[test]
    fn test_figure_without_caption() {
        assert_eq!(
            convert_figures("#figure([body])"),
            "\\begin{figure}[htbp]\n\\centering\nbody\n\\end{figure}"
        );
    }

    #[test]
    fn test_caption_citations_always_cited() {
        assert_eq!(
            convert_figures("#figure([x], caption: [From @smith2020 and @fig:a])"),
            "\\begin{figure}[htbp]\n\\centering\nx\n\\caption{From \\cite{smith2020} and \\cite{fig:a}}\n\\end{figure}"
        );
    }

    #[test]
    fn test_unterminated_figure_left_verbatim() {
        let input = "text #figure([unterminated";
        assert_eq!(convert_figures(input), input);
    }

    #[test]
    fn test_scanning_resumes_after_unterminated_figure() {
        assert_eq!(
            convert_figures("#figure( #figure([a])"),
            "#figure( \\begin{figure}[htbp]\n\\centering\na\n\\end{figure}"
        );
    }

    #[test]
    fn test_not_a_figure_call() {
        assert_eq!(convert_figures("#figures and #figure"), "#figures and #figure");
    }

    #[test]
    fn test_whitespace_before_paren() {
        assert_eq!(
            convert_figures("#figure ([b])"),
            "\\begin{figure}[htbp]\n\\centering\nb\n\\end{figure}"
        );
    }

    #[test]
    fn test_rewrite_caption_citations() {
        assert_eq!(rewrite_caption_citations("see @a-b."), "see \\cite{a-b}.");
        assert_eq!(rewrite_caption_citations("none"), "none");
    }
}
