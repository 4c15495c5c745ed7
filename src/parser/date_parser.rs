
//! Greedy date/time shape recognition, tried before falling back to
//! treating a leading number as a plain numeric `Value`. Operates
//! directly on the token stream (already split on `-`/`:`/digits by
//! the lexer) rather than re-scanning raw text, since every shape this
//! recognizes is already a sequence of `Number`/`Minus`/`Colon`
//! tokens.

use crate::lexer::token::{Token, TokenKind};
use crate::parser::ast::ExprNode;
use crate::source::SourceLocation;

fn number_text(tok: &Token) -> Option<&str> {
  match &tok.kind {
    TokenKind::Number(text) => Some(text),
    _ => None,
  }
}

/// Tries to consume a `YYYY-MM-DD` shape starting at `pos`. Returns
/// the node and the number of tokens consumed.
fn try_date(tokens: &[Token], pos: usize) -> Option<(String, usize)> {
  let year = number_text(tokens.get(pos)?)?;
  if year.len() != 4 {
    return None;
  }
  if !matches!(tokens.get(pos + 1)?.kind, TokenKind::Minus) {
    return None;
  }
  let month = number_text(tokens.get(pos + 2)?)?;
  if !matches!(tokens.get(pos + 3)?.kind, TokenKind::Minus) {
    return None;
  }
  let day = number_text(tokens.get(pos + 4)?)?;
  Some((format!("{year}-{month}-{day}"), 5))
}

/// Tries to consume an `HH:MM` or `HH:MM:SS` shape starting at `pos`.
fn try_time(tokens: &[Token], pos: usize) -> Option<(String, usize)> {
  let hour = number_text(tokens.get(pos)?)?;
  if !matches!(tokens.get(pos + 1)?.kind, TokenKind::Colon) {
    return None;
  }
  let minute = number_text(tokens.get(pos + 2)?)?;
  let mut text = format!("{hour}:{minute}");
  let mut consumed = 3;
  if matches!(tokens.get(pos + 3).map(|t| &t.kind), Some(TokenKind::Colon)) {
    if let Some(second) = tokens.get(pos + 4).and_then(number_text) {
      text.push(':');
      text.push_str(second);
      consumed = 5;
    }
  }
  Some((text, consumed))
}

/// Attempts to recognize a date, time, or combined date-time literal
/// at `pos`. Returns the AST node and how many tokens it consumed.
pub fn try_parse(tokens: &[Token], pos: usize, line: u32) -> Option<(ExprNode, usize)> {
  let location = tokens.get(pos).map(|t| t.span.at_line(line)).unwrap_or(SourceLocation::new(line, 0));

  if let Some((date_text, date_len)) = try_date(tokens, pos) {
    if let Some((time_text, time_len)) = try_time(tokens, pos + date_len) {
      let text = format!("{date_text}T{time_text}");
      return Some((ExprNode::DateTimeLiteral { text, location }, date_len + time_len));
    }
    return Some((ExprNode::DateLiteral { text: date_text, location }, date_len));
  }
  if let Some((time_text, time_len)) = try_time(tokens, pos) {
    return Some((ExprNode::TimeLiteral { text: time_text, location }, time_len));
  }
  None
}
