
//! Parser-level errors. Collected per line; a `ParserError` never
//! aborts the document — the driver decides whether the line degrades
//! to `PlainText` (nothing expression-shaped was recognized) or to a
//! `hasError` `ExpressionLine` (an expression was attempted and
//! malformed).

use crate::source::SourceLocation;

#[derive(Debug, Clone, thiserror::Error, PartialEq)]
#[non_exhaustive]
pub enum ParserError {
  #[error("unexpected end of line at {location:?}, expected {expected}")]
  UnexpectedEof { expected: String, location: SourceLocation },
  #[error("unexpected token {found:?} at {location:?}, expected {expected}")]
  UnexpectedToken { found: String, expected: String, location: SourceLocation },
  #[error("missing operand for operator at {location:?}")]
  MissingOperand { location: SourceLocation },
  #[error("malformed date/time literal {text:?} at {location:?}")]
  MalformedDateTime { text: String, location: SourceLocation },
  #[error("trailing input {text:?} at {location:?}")]
  TrailingInput { text: String, location: SourceLocation },
}

impl ParserError {
  /// The bare variant name, used as a `LineResult.type` tag when this
  /// error is the one reported for a line.
  pub fn kind(&self) -> &'static str {
    match self {
      ParserError::UnexpectedEof { .. } => "UnexpectedEof",
      ParserError::UnexpectedToken { .. } => "UnexpectedToken",
      ParserError::MissingOperand { .. } => "MissingOperand",
      ParserError::MalformedDateTime { .. } => "MalformedDateTime",
      ParserError::TrailingInput { .. } => "TrailingInput",
    }
  }
}
