
//! Parser: turns the token stream for one document line into a typed
//! AST node, never halting the document on a malformed line.

pub mod ast;
pub mod date_parser;
pub mod error;
pub mod expr_parser;

use crate::errorlist::ErrorList;
use crate::lexer::error::LexerError;
use crate::lexer::line_kind::{classify_line_shape, LineShape};
use crate::lexer::{self};
use crate::source::SourceLocation;
use ast::LineNode;
use error::ParserError;

/// The full outcome of attempting to parse one line: the resulting
/// AST node (always present — a line is never simply dropped) plus
/// whatever lexer/parser errors were recorded along the way. A
/// nonempty `parser_error` downgrades `node` to `PlainText` only when
/// the line had no expression-shaped tokens at all; otherwise the
/// driver reports the line as a `hasError` expression line while
/// still carrying the error here for `DocumentResult.errors`.
pub struct LineParseOutcome {
  pub node: LineNode,
  pub lexer_errors: ErrorList<LexerError>,
  pub parser_error: Option<ParserError>,
}

pub fn parse_line(text: &str, line_number: u32) -> LineParseOutcome {
  match classify_line_shape(text) {
    LineShape::Heading { level, text } => LineParseOutcome {
      node: LineNode::Heading { level, text, location: SourceLocation::new(line_number, 0) },
      lexer_errors: ErrorList::new(),
      parser_error: None,
    },
    LineShape::Empty => LineParseOutcome {
      node: LineNode::EmptyLine { location: SourceLocation::new(line_number, 0) },
      lexer_errors: ErrorList::new(),
      parser_error: None,
    },
    LineShape::Candidate(candidate) => parse_candidate_line(&candidate, line_number),
  }
}

fn plain_text(text: &str, line_number: u32) -> LineNode {
  LineNode::PlainText { text: text.to_owned(), location: SourceLocation::new(line_number, 0) }
}

fn parse_candidate_line(text: &str, line_number: u32) -> LineParseOutcome {
  let tokens = match lexer::lex(text) {
    Ok(tokens) => tokens,
    Err(errors) => {
      return LineParseOutcome { node: plain_text(text, line_number), lexer_errors: errors, parser_error: None };
    }
  };
  if tokens.is_empty() {
    return LineParseOutcome { node: plain_text(text, line_number), lexer_errors: ErrorList::new(), parser_error: None };
  }

  let mut parser = expr_parser::Parser::new(&tokens, line_number);
  match parser.parse_line() {
    Ok(node) => LineParseOutcome { node, lexer_errors: ErrorList::new(), parser_error: None },
    Err(err) => LineParseOutcome { node: plain_text(text, line_number), lexer_errors: ErrorList::new(), parser_error: Some(err) },
  }
}
