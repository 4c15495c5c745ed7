
//! Lexer: turns one line of source text into a flat token stream,
//! after `line_kind` has classified the line as a heading, blank, or
//! expression candidate. Errors are per-line: a single unrecognized
//! character stops tokenizing that line and reports one
//! [`error::LexerError`] rather than aborting the document.

pub mod error;
pub mod line_kind;
pub mod token;
pub mod tokenizer;

use crate::errorlist::ErrorList;
use error::LexerError;
use token::{Token, TokenKind};
use tokenizer::TokenizerState;

use once_cell::sync::Lazy;
use regex::Regex;

static NUMBER_RE: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"^(0[xX][0-9a-fA-F_]+|0[oO][0-7_]+|0[bB][01_]+|[0-9][0-9_]*(\.[0-9][0-9_]*)?([eE][+-]?[0-9]+)?)").unwrap()
});

static IDENTIFIER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*").unwrap());

const CURRENCY_SYMBOLS: &[char] = &['$', '€', '£', '¥', '₹', '₩', '₽', '¢'];

fn match_punct(c: char) -> Option<(TokenKind, usize)> {
  Some(match c {
    '+' => (TokenKind::Plus, 1),
    '-' => (TokenKind::Minus, 1),
    '*' => (TokenKind::Star, 1),
    '/' => (TokenKind::Slash, 1),
    '^' => (TokenKind::Caret, 1),
    '(' => (TokenKind::LParen, 1),
    ')' => (TokenKind::RParen, 1),
    ',' => (TokenKind::Comma, 1),
    ':' => (TokenKind::Colon, 1),
    '.' => (TokenKind::Dot, 1),
    '\'' => (TokenKind::Apostrophe, 1),
    '"' => (TokenKind::DoubleQuote, 1),
    '°' => (TokenKind::DegreeSign, 1),
    '%' => (TokenKind::Percent, 1),
    '!' => (TokenKind::Bang, 1),
    '‰' => (TokenKind::Permille, 1),
    _ => return None,
  })
}

pub fn lex(text: &str) -> Result<Vec<Token>, ErrorList<LexerError>> {
  let mut state = TokenizerState::new(text);
  let mut tokens = Vec::new();
  let mut errors = ErrorList::new();

  loop {
    state.consume_spaces();
    if state.is_eof() {
      break;
    }

    // Multi-character comparison operators must be tried before their
    // single-character prefixes.
    if let Some(m) = state.read_literal("==") {
      tokens.push(Token::new(TokenKind::EqEq, m.span()));
      continue;
    }
    if let Some(m) = state.read_literal("!=") {
      tokens.push(Token::new(TokenKind::Ne, m.span()));
      continue;
    }
    if let Some(m) = state.read_literal("<=") {
      tokens.push(Token::new(TokenKind::Le, m.span()));
      continue;
    }
    if let Some(m) = state.read_literal(">=") {
      tokens.push(Token::new(TokenKind::Ge, m.span()));
      continue;
    }
    if let Some(m) = state.read_literal("=") {
      tokens.push(Token::new(TokenKind::Assign, m.span()));
      continue;
    }
    if let Some(m) = state.read_literal("<") {
      tokens.push(Token::new(TokenKind::Lt, m.span()));
      continue;
    }
    if let Some(m) = state.read_literal(">") {
      tokens.push(Token::new(TokenKind::Gt, m.span()));
      continue;
    }
    if let Some(m) = state.read_regex(&NUMBER_RE) {
      tokens.push(Token::new(TokenKind::Number(m.as_str().to_owned()), m.span()));
      continue;
    }
    if let Some(m) = state.read_regex(&IDENTIFIER_RE) {
      tokens.push(Token::new(TokenKind::Identifier(m.as_str().to_owned()), m.span()));
      continue;
    }
    let c = state.peek().expect("not eof");
    if CURRENCY_SYMBOLS.contains(&c) {
      let m = state.advance(c.len_utf8());
      tokens.push(Token::new(TokenKind::CurrencySymbol(m.as_str().to_owned()), m.span()));
      continue;
    }
    if let Some((kind, len)) = match_punct(c) {
      let m = state.advance(len);
      tokens.push(Token::new(kind, m.span()));
      continue;
    }

    let m = state.advance(c.len_utf8());
    errors.push(LexerError::UnrecognizedCharacter { character: c, span: m.span() });
    break;
  }

  if errors.is_empty() {
    Ok(tokens)
  } else {
    Err(errors)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_lex_simple_expression() {
    let tokens = lex("1 + 2 * 3").unwrap();
    let kinds: Vec<_> = tokens.into_iter().map(|t| t.kind).collect();
    assert_eq!(kinds, vec![
      TokenKind::Number("1".to_owned()),
      TokenKind::Plus,
      TokenKind::Number("2".to_owned()),
      TokenKind::Star,
      TokenKind::Number("3".to_owned()),
    ]);
  }

  #[test]
  fn test_lex_assignment() {
    let tokens = lex("x = 10").unwrap();
    let kinds: Vec<_> = tokens.into_iter().map(|t| t.kind).collect();
    assert_eq!(kinds, vec![
      TokenKind::Identifier("x".to_owned()),
      TokenKind::Assign,
      TokenKind::Number("10".to_owned()),
    ]);
  }

  #[test]
  fn test_lex_currency_and_units() {
    let tokens = lex("$5 to EUR").unwrap();
    let kinds: Vec<_> = tokens.into_iter().map(|t| t.kind).collect();
    assert_eq!(kinds, vec![
      TokenKind::CurrencySymbol("$".to_owned()),
      TokenKind::Number("5".to_owned()),
      TokenKind::Identifier("to".to_owned()),
      TokenKind::Identifier("EUR".to_owned()),
    ]);
  }

  #[test]
  fn test_lex_comparison_operators() {
    let tokens = lex("1 <= 2").unwrap();
    let kinds: Vec<_> = tokens.into_iter().map(|t| t.kind).collect();
    assert_eq!(kinds, vec![TokenKind::Number("1".to_owned()), TokenKind::Le, TokenKind::Number("2".to_owned())]);
  }

  #[test]
  fn test_lex_unrecognized_character_errors() {
    let result = lex("1 + @");
    assert!(result.is_err());
  }

  #[test]
  fn test_lex_factorial_and_permille() {
    let tokens = lex("5! 10‰").unwrap();
    let kinds: Vec<_> = tokens.into_iter().map(|t| t.kind).collect();
    assert_eq!(kinds, vec![
      TokenKind::Number("5".to_owned()),
      TokenKind::Bang,
      TokenKind::Number("10".to_owned()),
      TokenKind::Permille,
    ]);
  }

  #[test]
  fn test_lex_feet_inches_marks() {
    let tokens = lex("5' 7\"").unwrap();
    let kinds: Vec<_> = tokens.into_iter().map(|t| t.kind).collect();
    assert_eq!(kinds, vec![
      TokenKind::Number("5".to_owned()),
      TokenKind::Apostrophe,
      TokenKind::Number("7".to_owned()),
      TokenKind::DoubleQuote,
    ]);
  }

  #[test]
  fn test_lex_degree_minute_second_marks() {
    let tokens = lex("10° 30' 15\"").unwrap();
    let kinds: Vec<_> = tokens.into_iter().map(|t| t.kind).collect();
    assert_eq!(kinds, vec![
      TokenKind::Number("10".to_owned()),
      TokenKind::DegreeSign,
      TokenKind::Number("30".to_owned()),
      TokenKind::Apostrophe,
      TokenKind::Number("15".to_owned()),
      TokenKind::DoubleQuote,
    ]);
  }
}
