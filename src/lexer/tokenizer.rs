
//! Low-level cursor over a line's text, reused essentially unchanged
//! from the teacher's `parsing::tokenizer::TokenizerState`: regex- and
//! literal-driven reads that track byte position as they go, so every
//! token carries an exact [`Span`] for error reporting.

use crate::source::{SourceOffset, Span};
use crate::util::clamp;

use regex::{Captures, Regex};
use once_cell::sync::Lazy;

#[derive(Debug, Clone)]
pub struct TokenizerState<'a> {
  whole_input: &'a str,
  input: &'a str,
  position: SourceOffset,
}

#[derive(Debug, Clone)]
pub struct TokenizerMatch<'a> {
  matched_str: &'a str,
  start: SourceOffset,
  end: SourceOffset,
}

#[derive(Debug)]
pub struct TokenizerCaptures<'a> {
  captures: Captures<'a>,
  start: SourceOffset,
  end: SourceOffset,
}

impl<'a> TokenizerState<'a> {
  pub fn new(input: &'a str) -> Self {
    Self { whole_input: input, input, position: SourceOffset(0) }
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn len(&self) -> usize {
    self.input.len() + self.position.0
  }

  pub fn remaining_len(&self) -> usize {
    self.input.len()
  }

  pub fn is_eof(&self) -> bool {
    self.input.is_empty()
  }

  pub fn peek(&self) -> Option<char> {
    self.input.chars().next()
  }

  /// Seeks to an absolute position in the string. Out-of-bounds
  /// indices are clamped.
  pub fn seek(&mut self, mut pos: SourceOffset) {
    pos = clamp(pos, SourceOffset(0), SourceOffset(self.len()));
    self.position = pos;
    self.input = &self.whole_input[pos.0..];
  }

  /// Advances by `amount` bytes, never past the end of the input.
  pub fn advance(&mut self, mut amount: usize) -> TokenizerMatch<'_> {
    amount = amount.min(self.input.len());
    let match_pos = self.current_pos();
    let (prefix, suffix) = self.input.split_at(amount);
    self.position.0 += amount;
    self.input = suffix;
    TokenizerMatch { matched_str: prefix, start: match_pos, end: match_pos + amount }
  }

  pub fn current_pos(&self) -> SourceOffset {
    self.position
  }

  pub fn read_literal(&mut self, literal: &str) -> Option<TokenizerMatch<'_>> {
    self.input.starts_with(literal).then(|| self.advance(literal.len()))
  }

  /// The regex MUST be anchored at the start of the input; panics
  /// otherwise.
  pub fn read_regex(&mut self, regex: &Regex) -> Option<TokenizerMatch<'_>> {
    let m = regex.find(self.input)?;
    assert_eq!(m.start(), 0, "regex must be anchored at the start of the input");
    Some(self.advance(m.len()))
  }

  pub fn read_regex_with_captures(&mut self, regex: &Regex) -> Option<TokenizerCaptures<'_>> {
    let c = regex.captures(self.input)?;
    let m = self.advance(c.get(0).unwrap().len());
    Some(TokenizerCaptures { captures: c, start: m.start(), end: m.end() })
  }

  pub fn read_many<T, F>(&mut self, mut function: F) -> Vec<T>
  where F: FnMut(&mut Self) -> Option<T> {
    let mut output = Vec::new();
    while let Some(item) = function(self) {
      output.push(item);
    }
    output
  }

  pub fn read_some<T, F>(&mut self, function: F) -> Option<Vec<T>>
  where F: FnMut(&mut Self) -> Option<T> {
    let output = self.read_many(function);
    (!output.is_empty()).then_some(output)
  }

  pub fn consume_spaces(&mut self) {
    static RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[ \t]*").unwrap());
    self.read_regex(&RE).expect("regex should not fail");
  }
}

impl<'h> TokenizerMatch<'h> {
  pub fn as_str(&self) -> &'h str {
    self.matched_str
  }
  pub fn start(&self) -> SourceOffset {
    self.start
  }
  pub fn end(&self) -> SourceOffset {
    self.end
  }
  pub fn span(&self) -> Span {
    Span::new(self.start, self.end)
  }
  pub fn is_empty(&self) -> bool {
    self.start == self.end
  }
}

impl<'h> TokenizerCaptures<'h> {
  pub fn as_str(&self) -> &'h str {
    self.captures.get(0).unwrap().as_str()
  }
  pub fn get(&self, i: usize) -> Option<&'h str> {
    self.captures.get(i).map(|m| m.as_str())
  }
  #[allow(clippy::len_without_is_empty)]
  pub fn len(&self) -> usize {
    self.captures.len()
  }
  pub fn start(&self) -> SourceOffset {
    self.start
  }
  pub fn end(&self) -> SourceOffset {
    self.end
  }
  pub fn span(&self) -> Span {
    Span::new(self.start, self.end)
  }
}

impl Default for TokenizerState<'static> {
  fn default() -> Self {
    Self { whole_input: "", input: "", position: SourceOffset(0) }
  }
}
