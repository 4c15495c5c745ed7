
/// A position within one line of source text, expressed as a 0-indexed
/// line number and a 0-indexed UTF-8 byte column within that line.
///
/// Mirrors the teacher's `parsing::source::SourceOffset`, extended with
/// a line number since this crate's AST spans a whole document rather
/// than a single expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct SourceLocation {
  pub line: u32,
  pub column: u32,
}

impl SourceLocation {
  pub fn new(line: u32, column: u32) -> Self {
    Self { line, column }
  }
}

/// Thin wrapper around `usize` representing a byte offset within a
/// single line. Used by the lexer/parser before the driver stamps on
/// the enclosing line number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SourceOffset(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
  pub start: SourceOffset,
  pub end: SourceOffset,
}

impl Span {
  pub fn new(start: SourceOffset, end: SourceOffset) -> Self {
    Self { start, end }
  }

  pub fn len(&self) -> usize {
    self.end.0.saturating_sub(self.start.0)
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Resolves this byte-offset span into a document-level
  /// `SourceLocation`, given the line it belongs to.
  pub fn at_line(&self, line: u32) -> SourceLocation {
    SourceLocation::new(line, self.start.0 as u32)
  }
}

impl std::ops::Add<usize> for SourceOffset {
  type Output = SourceOffset;
  fn add(self, rhs: usize) -> SourceOffset {
    SourceOffset(self.0 + rhs)
  }
}

impl From<usize> for SourceOffset {
  fn from(i: usize) -> Self {
    SourceOffset(i)
  }
}

impl From<SourceOffset> for usize {
  fn from(i: SourceOffset) -> Self {
    i.0
  }
}
