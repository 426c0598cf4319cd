//! Cross-reference labels
//!
//! `<name>` becomes `\label{name}`. A label that trails an environment's
//! `\end{..}` is then moved in front of it so it binds to the block.

use regex::Regex;
use std::sync::LazyLock;

use crate::environments::ENVIRONMENTS;

static LABEL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<([\w:.\-]+)>").unwrap());

static TRAILING_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    let names = ENVIRONMENTS.join("|");
    Regex::new(&format!(r"(\\end\{{(?:{names})\}})\s*(\\label\{{[^}}]+\}})")).unwrap()
});

/// Rewrite `<name>` label tokens to `\label{name}`
pub fn rewrite_labels(input: &str) -> String {
    LABEL.replace_all(input, r"\label{$1}").into_owned()
}

/// Move `\label{..}` from after an environment's end to just before it
pub fn reposition_labels(input: &str) -> String {
    TRAILING_LABEL.replace_all(input, "$2$1").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewrite_labels() {
        assert_eq!(
            rewrite_labels("see <eq:main> and <fig-1.a>"),
            "see \\label{eq:main} and \\label{fig-1.a}"
        );
    }

    #[test]
    fn test_comparisons_untouched() {
        assert_eq!(rewrite_labels("if a < b > c"), "if a < b > c");
        assert_eq!(rewrite_labels("<a b>"), "<a b>");
    }

    #[test]
    fn test_label_moved_inside_environment() {
        let input = "\\begin{theorem}{T}\nbody\n\\end{theorem}\n\\label{thm:x}\nnext";
        assert_eq!(
            reposition_labels(input),
            "\\begin{theorem}{T}\nbody\n\\label{thm:x}\\end{theorem}\nnext"
        );
    }

    #[test]
    fn test_every_environment_repositioned() {
        for name in ENVIRONMENTS {
            let input = format!("\\end{{{name}}} \\label{{l}}");
            assert_eq!(reposition_labels(&input), format!("\\label{{l}}\\end{{{name}}}"));
        }
    }

    #[test]
    fn test_other_environments_untouched() {
        let input = "\\end{figure}\n\\label{fig:x}";
        assert_eq!(reposition_labels(input), input);
    }

    #[test]
    fn test_label_not_adjacent_untouched() {
        let input = "\\end{lemma} text \\label{l}";
        assert_eq!(reposition_labels(input), input);
    }
}
