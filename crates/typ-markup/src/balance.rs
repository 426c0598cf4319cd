//! Balanced delimiter matching
//!
//! Finds the closing partner of an opening `(` or `[`, counting nested
//! occurrences of the same delimiter pair only. The other pair and quoted
//! strings are not special: a `)` inside `"..."` still closes a group.

use thiserror::Error;

/// A delimiter pair that can be balanced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    /// `(` ... `)`
    Paren,
    /// `[` ... `]`
    Bracket,
}

impl Delimiter {
    /// Classify an opening character
    pub fn from_open(ch: char) -> Option<Self> {
        match ch {
            '(' => Some(Delimiter::Paren),
            '[' => Some(Delimiter::Bracket),
            _ => None,
        }
    }

    pub fn open(self) -> char {
        match self {
            Delimiter::Paren => '(',
            Delimiter::Bracket => '[',
        }
    }

    pub fn close(self) -> char {
        match self {
            Delimiter::Paren => ')',
            Delimiter::Bracket => ']',
        }
    }
}

/// The interior of a balanced group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelimiterSpan<'a> {
    /// Text strictly between the opening and closing delimiter
    pub content: &'a str,
    /// Byte offset of the opening delimiter
    pub start: usize,
    /// Byte offset just past the closing delimiter
    pub end: usize,
    pub delimiter: Delimiter,
}

/// Errors from delimiter matching
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BalanceError {
    #[error("Expected an opening delimiter at byte {offset}")]
    NotAnOpening { offset: usize },

    #[error("Unbalanced '{open}' opened at byte {offset}")]
    Unbalanced { open: char, offset: usize },
}

/// Match the group opened at `open_offset`
///
/// The delimiter type is taken from the character at `open_offset`, which
/// must be `(` or `[`. Returns [`BalanceError::Unbalanced`] when the input ends
/// before the nesting count returns to zero; callers keep their text
/// unchanged in that case.
pub fn balanced(input: &str, open_offset: usize) -> Result<DelimiterSpan<'_>, BalanceError> {
    let delimiter = input
        .get(open_offset..)
        .and_then(|rest| rest.chars().next())
        .and_then(Delimiter::from_open)
        .ok_or(BalanceError::NotAnOpening {
            offset: open_offset,
        })?;

    let (open, close) = (delimiter.open(), delimiter.close());
    let content_start = open_offset + open.len_utf8();
    let mut depth = 1usize;

    for (i, ch) in input[content_start..].char_indices() {
        if ch == open {
            depth += 1;
        } else if ch == close {
            depth -= 1;
            if depth == 0 {
                let close_offset = content_start + i;
                return Ok(DelimiterSpan {
                    content: &input[content_start..close_offset],
                    start: open_offset,
                    end: close_offset + close.len_utf8(),
                    delimiter,
                });
            }
        }
    }

    Err(BalanceError::Unbalanced {
        open,
        offset: open_offset,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_bracket() {
        let span = balanced("[abc]", 0).unwrap();
        assert_eq!(span.content, "abc");
        assert_eq!(span.start, 0);
        assert_eq!(span.end, 5);
        assert_eq!(span.delimiter, Delimiter::Bracket);
    }

    #[test]
    fn test_nested_same_type() {
        let input = "x(a (b (c)) d) y";
        let span = balanced(input, 1).unwrap();
        assert_eq!(span.content, "a (b (c)) d");
        assert_eq!(&input[span.end..], " y");
    }

    #[test]
    fn test_other_type_ignored() {
        // A stray `]` does not affect paren counting
        let span = balanced("(a ] [ b)", 0).unwrap();
        assert_eq!(span.content, "a ] [ b");

        let span = balanced("[f(x]", 0).unwrap();
        assert_eq!(span.content, "f(x");
    }

    #[test]
    fn test_quotes_are_not_special() {
        // Accepted limitation: delimiters inside strings still count
        let span = balanced(r#"(image(")"), rest)"#, 0).unwrap();
        assert_eq!(span.content, r#"image(")""#);
        assert_eq!(span.end, 11);
    }

    #[test]
    fn test_empty_group() {
        let span = balanced("[]", 0).unwrap();
        assert_eq!(span.content, "");
        assert_eq!(span.end, 2);
    }

    #[test]
    fn test_unbalanced() {
        assert_eq!(
            balanced("#figure([unterminated", 7),
            Err(BalanceError::Unbalanced {
                open: '(',
                offset: 7
            })
        );
        assert!(balanced("[[a]", 0).is_err());
    }

    #[test]
    fn test_not_an_opening() {
        assert_eq!(
            balanced("abc", 1),
            Err(BalanceError::NotAnOpening { offset: 1 })
        );
        assert_eq!(
            balanced("abc", 10),
            Err(BalanceError::NotAnOpening { offset: 10 })
        );
    }

    #[test]
    fn test_multibyte_content() {
        let input = "[é[ü]ß]!";
        let span = balanced(input, 0).unwrap();
        assert_eq!(span.content, "é[ü]ß");
        assert_eq!(&input[span.end..], "!");
    }

    #[test]
    fn test_rewrap_reproduces_span() {
        let inputs = [
            ("#theorem[Title\nBody [with] nesting] after", 8),
            ("call(a, (b, c), d)", 4),
            ("[[[]]][]", 0),
            ("pre (x) post", 4),
        ];
        for (input, offset) in inputs {
            let span = balanced(input, offset).unwrap();
            let d = span.delimiter;
            let rewrapped = format!("{}{}{}", d.open(), span.content, d.close());
            assert_eq!(rewrapped, &input[span.start..span.end], "input: {input:?}");
        }
    }
}
