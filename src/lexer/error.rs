
//! Lexer-level errors. Per-line, never `?`-propagated past the line
//! boundary: the driver collects these into an [`crate::errorlist::ErrorList`]
//! and moves on to the next line.

use crate::source::Span;

#[derive(Debug, Clone, thiserror::Error, PartialEq)]
#[non_exhaustive]
pub enum LexerError {
  #[error("unrecognized character {character:?} at {span:?}")]
  UnrecognizedCharacter { character: char, span: Span },
}

impl LexerError {
  /// The bare variant name, used as a `LineResult.type` tag when this
  /// error is the one reported for a line.
  pub fn kind(&self) -> &'static str {
    match self {
      LexerError::UnrecognizedCharacter { .. } => "UnrecognizedCharacter",
    }
  }
}
