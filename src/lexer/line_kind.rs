
//! First-pass per-line shape classification, done before tokenizing
//! the line's contents. Headings and blank lines short-circuit here;
//! everything else is handed to the parser as a candidate expression
//! line, which falls back to plain text on a parse failure (lines
//! never abort the whole document).

use once_cell::sync::Lazy;
use regex::Regex;

#[derive(Debug, Clone, PartialEq)]
pub enum LineShape {
  /// A line of one or more leading `#` characters: `level` is the
  /// number of `#`s, `text` is the trimmed remainder.
  Heading { level: u32, text: String },
  /// Whitespace-only (including a completely empty string).
  Empty,
  /// Anything else: handed to the expression parser, which reports
  /// back whether it actually parsed as an expression/assignment or
  /// must be treated as plain text.
  Candidate(String),
}

static HEADING_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(#+)\s*(.*)$").unwrap());

pub fn classify_line_shape(line: &str) -> LineShape {
  if line.trim().is_empty() {
    return LineShape::Empty;
  }
  if let Some(captures) = HEADING_RE.captures(line) {
    let level = captures[1].len() as u32;
    let text = captures[2].trim().to_owned();
    return LineShape::Heading { level, text };
  }
  LineShape::Candidate(line.to_owned())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_heading_levels() {
    assert_eq!(classify_line_shape("# Title"), LineShape::Heading { level: 1, text: "Title".to_owned() });
    assert_eq!(classify_line_shape("### Subsection"), LineShape::Heading { level: 3, text: "Subsection".to_owned() });
  }

  #[test]
  fn test_empty_line() {
    assert_eq!(classify_line_shape(""), LineShape::Empty);
    assert_eq!(classify_line_shape("   \t  "), LineShape::Empty);
  }

  #[test]
  fn test_candidate_line() {
    assert_eq!(classify_line_shape("x = 10"), LineShape::Candidate("x = 10".to_owned()));
  }
}
