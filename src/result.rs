
//! The document-level shape a host gets back from [`crate::driver::calculate`]:
//! one [`LineResult`] per source line, errors grouped by pipeline
//! layer, and the parsed [`Document`] for an overlay to read. Grounded
//! on the external-interface contract (`DocumentResult`/`LineResult`)
//! and on the teacher's habit of keeping its error enums structured
//! internally while reporting rendered messages at the boundary
//! (`command::` request/response structs) rather than serializing the
//! enums themselves.

use serde::Serialize;

use crate::eval::error::RuntimeError;
use crate::lexer::error::LexerError;
use crate::parser::ast::LineNode;
use crate::parser::error::ParserError;

/// One line's outcome. `result` and `details` are `None` exactly when
/// `has_error` is true; `result_type` is either the error's variant
/// name or a description of what kind of value/line this was.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineResult {
  pub line: u32,
  pub result: Option<String>,
  #[serde(rename = "type")]
  pub result_type: String,
  pub has_error: bool,
  /// The `based on: <original> = <converted>` trailer for a
  /// conversion line, kept separate from `result` so a host can choose
  /// whether to display it.
  pub details: Option<String>,
}

/// One reported error, flattened to a line number and a rendered
/// message — a host consumes these as opaque diagnostics, not as
/// structured data to pattern-match on.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
  pub line: u32,
  pub message: String,
}

impl ErrorReport {
  pub(crate) fn lexer(line: u32, error: &LexerError) -> Self {
    Self { line, message: error.to_string() }
  }

  pub(crate) fn parser(line: u32, error: &ParserError) -> Self {
    Self { line, message: error.to_string() }
  }

  pub(crate) fn runtime(line: u32, error: &RuntimeError) -> Self {
    Self { line, message: error.to_string() }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentErrors {
  pub lexer: Vec<ErrorReport>,
  pub parser: Vec<ErrorReport>,
  pub runtime: Vec<ErrorReport>,
}

impl DocumentErrors {
  pub fn is_empty(&self) -> bool {
    self.lexer.is_empty() && self.parser.is_empty() && self.runtime.is_empty()
  }
}

/// The parsed AST for a whole document, in source-line order. Exposed
/// read-only to a host overlay (syntax highlighting, hover info) —
/// the core itself never re-reads this after producing it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document(pub Vec<LineNode>);

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentResult {
  pub results: Vec<LineResult>,
  pub errors: DocumentErrors,
  pub ast: Document,
}
