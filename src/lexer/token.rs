
//! Token kinds produced by [`super::lex`]. Deliberately coarse:
//! keywords (`to`, `in`, `as`, `if`, `then`, `else`, `and`, `or`,
//! `not`, `true`, `false`) are plain identifiers at this layer, and the
//! parser decides from context whether an identifier is reserved —
//! matching the teacher's general preference for a dumb lexer and a
//! context-sensitive parser (see `parsing::basic_expr`).

use crate::source::Span;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
  /// A numeric literal's raw text, not yet parsed into a `Number` (so
  /// the lexer never has to care about radix prefixes or digit
  /// grouping; that's the parser's job).
  Number(String),
  /// `%`, ambiguous between "modulo" and "percent literal suffix"
  /// until the parser looks at adjacency/whitespace.
  Percent,
  Identifier(String),
  /// A currency symbol token, e.g. `$`, `€`, `£` — kept distinct from
  /// `Identifier` because currency symbols are not valid identifier
  /// characters.
  CurrencySymbol(String),
  Plus,
  Minus,
  Star,
  Slash,
  Caret,
  Assign,
  EqEq,
  Ne,
  Lt,
  Le,
  Gt,
  Ge,
  LParen,
  RParen,
  Comma,
  Colon,
  Dot,
  /// `'`, used for arcminutes/feet.
  Apostrophe,
  /// `"`, used for arcseconds/inches.
  DoubleQuote,
  /// `°`, degree sign; also puts a following `'`/`"` pair into
  /// arcminute/arcsecond rather than foot/inch mode.
  DegreeSign,
  /// `!`, postfix factorial (never confused with `!=`, which is read
  /// as a two-character literal before this falls through to punct
  /// matching).
  Bang,
  /// `‰`, postfix permille — the promille sibling of `%`.
  Permille,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
  pub kind: TokenKind,
  pub span: Span,
}

impl Token {
  pub fn new(kind: TokenKind, span: Span) -> Self {
    Self { kind, span }
  }
}

pub const RESERVED_WORDS: &[&str] = &[
  "to", "in", "as", "if", "then", "else", "and", "or", "not", "true", "false",
];

pub fn is_reserved_word(text: &str) -> bool {
  RESERVED_WORDS.contains(&text)
}
