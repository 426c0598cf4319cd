//! typ-markup: low-level scanning primitives for Typst markup
//!
//! This crate provides:
//! - Balanced delimiter matching for `(...)` and `[...]` groups
//! - A mode-aware scanner that tells text, math and comment regions apart
//!
//! Neither primitive knows anything about the output format; they only
//! answer "where does this group end" and "what region am I in".
//!
//! # Example
//!
//! ```
//! use typ_markup::{balanced, Mode, Scanner};
//!
//! let span = balanced("#theorem[a [b] c] tail", 8).unwrap();
//! assert_eq!(span.content, "a [b] c");
//! assert_eq!(span.end, 17);
//!
//! let modes: Vec<Mode> = Scanner::new("a $x$").map(|piece| piece.mode).collect();
//! assert_eq!(modes, vec![Mode::Text, Mode::Text, Mode::Text, Mode::Math, Mode::Math]);
//! ```

pub mod balance;
pub mod scanner;

// Re-export main types for convenient access
pub use balance::{BalanceError, Delimiter, DelimiterSpan, balanced};
pub use scanner::{Mode, Piece, PieceKind, Region, Scanner, ends_in_text, regions};
