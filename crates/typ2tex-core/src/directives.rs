//! Removal of Typst set-up directives
//!
//! Lines such as `#set text(...)`, `#show: template.with(...)` or `#import`
//! configure Typst's own rendering and have no LaTeX counterpart. They are
//! dropped, including continuation lines of a multi-line call. Other `#`
//! lines (`#theorem[...]`, `#figure(...)`) are left for later passes.
//!
//! The end of a multi-line directive is found by counting `(` and `)` per
//! line. Brackets and string literals are not considered, so a directive
//! whose argument spans lines inside `[...]`, or holds a quoted `)`, can end
//! too early or too late.

/// Directive prefixes whose lines are removed
pub const REMOVABLE_DIRECTIVES: &[&str] = &[
    "#show",
    "#set",
    "#import",
    "#outline",
    "#grid",
    "#pagebreak",
    "#let",
];

/// Remove set-up directives, leaving one empty line per removed block
pub fn remove_directives(input: &str) -> String {
    let lines: Vec<&str> = input.split('\n').collect();
    let mut kept = Vec::with_capacity(lines.len());
    let mut i = 0;

    while i < lines.len() {
        let trimmed = lines[i].trim();
        if !is_removable(trimmed) {
            kept.push(lines[i]);
            i += 1;
            continue;
        }

        let mut balance = paren_balance(trimmed);
        i += 1;
        while balance > 0 && i < lines.len() {
            balance += paren_balance(lines[i]);
            i += 1;
        }
        kept.push("");
    }

    kept.join("\n")
}

/// Whether a trimmed line starts a removable directive
pub fn is_removable(trimmed: &str) -> bool {
    REMOVABLE_DIRECTIVES
        .iter()
        .any(|prefix| trimmed.starts_with(prefix))
}

/// Opening minus closing parentheses on one line
fn paren_balance(line: &str) -> isize {
    line.chars().fold(0, |acc, ch| match ch {
        '(' => acc + 1,
        ')' => acc - 1,
        _ => acc,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_line_directive() {
        assert_eq!(remove_directives("#set page(margin: 1cm)\nText"), "\nText");
    }

    #[test]
    fn test_indented_directive() {
        assert_eq!(
            remove_directives("A\n  #import \"@preview/x:0.1.0\": *\nB"),
            "A\n\nB"
        );
    }

    #[test]
    fn test_multi_line_directive() {
        let input = "#show: ieee.with(\n  title: [A Paper],\n  authors: (\n    (name: \"X\"),\n  ),\n)\nBody";
        assert_eq!(remove_directives(input), "\nBody");
    }

    #[test]
    fn test_structural_directives_kept() {
        let input = "#theorem[x]\n#figure(image(\"a.png\"))\n#bibliography(\"refs.bib\")";
        assert_eq!(remove_directives(input), input);
    }

    #[test]
    fn test_line_count_shrinks_to_one_per_block() {
        let input = "a\n#set text(\n  size: 10pt,\n)\nb";
        let output = remove_directives(input);
        assert_eq!(output, "a\n\nb");
    }

    #[test]
    fn test_unterminated_directive_consumes_rest() {
        assert_eq!(remove_directives("keep\n#set text(\nsize: 10pt"), "keep\n");
    }

    #[test]
    fn test_bracket_argument_only_first_line() {
        // Only parentheses are counted: a multi-line `[...]` argument keeps
        // its continuation lines.
        let input = "#let abs = [\n  Abstract text.\n]\nBody";
        assert_eq!(remove_directives(input), "\n  Abstract text.\n]\nBody");
    }

    #[test]
    fn test_prefix_match() {
        assert!(is_removable("#letter"));
        assert!(is_removable("#pagebreak()"));
        assert!(!is_removable("text #set"));
        assert!(!is_removable("#figure("));
    }
}
