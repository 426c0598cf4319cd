//! Mode-aware scanner
//!
//! Walks Typst markup left to right and classifies every position as text,
//! math or comment. The three modes are mutually exclusive: a single `mode`
//! field is the whole state, so math never nests inside a comment or the
//! other way round.
//!
//! Transitions:
//! - `Text -> Comment` on `/*`, `Comment -> Text` on `*/`
//! - `Text -> Math` and `Math -> Text` on an unescaped `$`
//!
//! A backslash escapes the next character in text and math. Comments have
//! no escapes; only `*/` ends them.

/// The region a position belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Text,
    Math,
    Comment,
}

/// What a piece of input is to the scanner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PieceKind {
    /// A single character with no effect on the mode
    Char,
    /// A backslash and the character it escapes
    Escape,
    /// A delimiter entering math or comment mode
    Open,
    /// A delimiter returning to text mode
    Close,
}

/// A contiguous slice of input read in one step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece<'a> {
    pub text: &'a str,
    /// Byte offset of the piece
    pub offset: usize,
    /// Mode in effect when the piece was read
    pub mode: Mode,
    pub kind: PieceKind,
}

/// The interior of a math or comment region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub mode: Mode,
    /// First byte after the opening delimiter
    pub start: usize,
    /// Byte offset of the closing delimiter, or the input length when the
    /// region is never closed
    pub end: usize,
}

/// Scanner over Typst markup
pub struct Scanner<'a> {
    input: &'a str,
    /// Current byte position
    pos: usize,
    mode: Mode,
}

impl<'a> Scanner<'a> {
    /// Create a new scanner starting in text mode
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            mode: Mode::Text,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// The unread remainder of the input
    pub fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Consume `len` bytes as one unit without changing the mode
    ///
    /// Used by callers that recognised a construct at the current position
    /// and rewrite it atomically. `len` must end on a character boundary and
    /// the skipped text must not open or close a region.
    pub fn advance(&mut self, len: usize) -> &'a str {
        let end = (self.pos + len).min(self.input.len());
        let skipped = &self.input[self.pos..end];
        debug_assert!(ends_in_text(skipped) || self.mode != Mode::Text);
        self.pos = end;
        skipped
    }

    /// Read the next piece, updating the mode
    fn next_piece(&mut self) -> Option<Piece<'a>> {
        let rest = self.rest();
        let ch = rest.chars().next()?;
        let offset = self.pos;
        let mode = self.mode;

        let (len, kind) = match (mode, ch) {
            (Mode::Text, '/') if rest.starts_with("/*") => {
                self.mode = Mode::Comment;
                (2, PieceKind::Open)
            }
            (Mode::Comment, '*') if rest.starts_with("*/") => {
                self.mode = Mode::Text;
                (2, PieceKind::Close)
            }
            (Mode::Text, '$') => {
                self.mode = Mode::Math;
                (1, PieceKind::Open)
            }
            (Mode::Math, '$') => {
                self.mode = Mode::Text;
                (1, PieceKind::Close)
            }
            (Mode::Text | Mode::Math, '\\') => {
                let escaped = rest[1..].chars().next().map_or(0, char::len_utf8);
                (1 + escaped, PieceKind::Escape)
            }
            _ => (ch.len_utf8(), PieceKind::Char),
        };

        self.pos += len;
        Some(Piece {
            text: &rest[..len],
            offset,
            mode,
            kind,
        })
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Piece<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_piece()
    }
}

/// Whether scanning `input` from text mode ends back in text mode
///
/// False when the input leaves a `$` or `/*` open. A stray `*/` is plain
/// text and does not count.
pub fn ends_in_text(input: &str) -> bool {
    let mut scanner = Scanner::new(input);
    for _ in scanner.by_ref() {}
    scanner.mode() == Mode::Text
}

/// Collect the interiors of all math and comment regions
pub fn regions(input: &str) -> Vec<Region> {
    let mut regions = Vec::new();
    let mut open: Option<(Mode, usize)> = None;

    for piece in Scanner::new(input) {
        match piece.kind {
            PieceKind::Open => {
                let mode = if piece.text == "$" {
                    Mode::Math
                } else {
                    Mode::Comment
                };
                open = Some((mode, piece.offset + piece.text.len()));
            }
            PieceKind::Close => {
                if let Some((mode, start)) = open.take() {
                    regions.push(Region {
                        mode,
                        start,
                        end: piece.offset,
                    });
                }
            }
            PieceKind::Char | PieceKind::Escape => {}
        }
    }

    if let Some((mode, start)) = open {
        regions.push(Region {
            mode,
            start,
            end: input.len(),
        });
    }

    regions
}
