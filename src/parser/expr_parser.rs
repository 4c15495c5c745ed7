
//! Recursive-descent parser with a precedence climber for the
//! expression core, grounded on the shape of the teacher's
//! `parsing::shunting_yard`/`parsing::operator::table` layering: a
//! fixed precedence ladder (low to high) with dedicated productions
//! for conversions, conditionals, and unit/composite values sitting
//! above it, the way the teacher layers `parsing::basic_expr` on top
//! of its shunting-yard core.
//!
//! The parser never consults the unit/currency tables: an identifier
//! that isn't a reserved word and directly follows a number is always
//! structural "units", resolved later by the evaluator (an unknown
//! token simply becomes a user-defined unit, per the data model's
//! origin flag) — this keeps the parser table-free, matching the
//! pipeline's dependency order (parser precedes table-driven
//! resolution).

use super::ast::*;
use super::error::ParserError;
use crate::lexer::token::{is_reserved_word, Token, TokenKind};
use crate::source::SourceLocation;

pub struct Parser<'a> {
  tokens: &'a [Token],
  pos: usize,
  line: u32,
}

impl<'a> Parser<'a> {
  pub fn new(tokens: &'a [Token], line: u32) -> Self {
    Self { tokens, pos: 0, line }
  }

  fn peek(&self) -> Option<&Token> {
    self.tokens.get(self.pos)
  }

  fn peek_kind(&self) -> Option<&TokenKind> {
    self.peek().map(|t| &t.kind)
  }

  fn advance(&mut self) -> Option<&Token> {
    let tok = self.tokens.get(self.pos);
    if tok.is_some() {
      self.pos += 1;
    }
    tok
  }

  fn loc(&self) -> SourceLocation {
    match self.peek() {
      Some(tok) => tok.span.at_line(self.line),
      None => SourceLocation::new(self.line, self.tokens.last().map(|t| t.span.end.0 as u32).unwrap_or(0)),
    }
  }

  fn is_identifier(&self, text: &str) -> bool {
    matches!(self.peek_kind(), Some(TokenKind::Identifier(name)) if name == text)
  }

  fn eat_identifier(&mut self, text: &str) -> bool {
    if self.is_identifier(text) {
      self.advance();
      true
    } else {
      false
    }
  }

  pub fn at_end(&self) -> bool {
    self.pos >= self.tokens.len()
  }

  /// Parses one full line's worth of tokens as either a variable
  /// assignment or a bare expression line.
  pub fn parse_line(&mut self) -> Result<LineNode, ParserError> {
    let location = self.loc();
    if let Some(TokenKind::Identifier(name)) = self.peek_kind().cloned() {
      if !is_reserved_word(&name) && matches!(self.tokens.get(self.pos + 1).map(|t| &t.kind), Some(TokenKind::Assign)) {
        self.advance();
        self.advance();
        let expr = self.parse_conversion()?;
        self.expect_end()?;
        return Ok(LineNode::VariableAssignment { name, expr: Box::new(expr), location });
      }
    }
    let expr = self.parse_conversion()?;
    self.expect_end()?;
    Ok(LineNode::ExpressionLine { expr: Box::new(expr), location })
  }

  fn expect_end(&mut self) -> Result<(), ParserError> {
    if self.at_end() {
      Ok(())
    } else {
      let location = self.loc();
      let text = format!("{:?}", self.peek_kind());
      Err(ParserError::TrailingInput { text, location })
    }
  }

  // conversion (lowest) -> conditional -> logical or -> logical and
  // -> comparison -> additive -> multiplicative -> unary -> power
  // -> postfix -> primary/value

  fn parse_conversion(&mut self) -> Result<ExprNode, ParserError> {
    let location = self.loc();
    let expr = self.parse_conditional()?;
    if self.eat_identifier("to") || self.eat_identifier("as") || self.eat_identifier("in") {
      let target = self.parse_conversion_target()?;
      return Ok(ExprNode::Conversion { expr: Box::new(expr), target, location });
    }
    Ok(expr)
  }

  fn parse_conversion_target(&mut self) -> Result<ConversionTarget, ParserError> {
    let location = self.loc();
    if self.eat_identifier("base") {
      let n = self.expect_integer_text()?;
      return Ok(ConversionTarget::Presentation(PresentationFormat::Base(n)));
    }
    if self.eat_identifier("scientific") {
      return Ok(ConversionTarget::Presentation(PresentationFormat::Scientific));
    }
    if self.eat_identifier("fraction") {
      return Ok(ConversionTarget::Presentation(PresentationFormat::Fraction));
    }
    if self.eat_identifier("percentage") {
      return Ok(ConversionTarget::Presentation(PresentationFormat::Percentage));
    }
    if matches!(self.peek_kind(), Some(TokenKind::Dot)) {
      self.advance();
      return self.parse_property_target(location);
    }
    let units = self.parse_units_node()?.ok_or(ParserError::UnexpectedEof { expected: "conversion target".to_owned(), location })?;
    Ok(ConversionTarget::Units(units))
  }

  fn parse_property_target(&mut self, location: SourceLocation) -> Result<ConversionTarget, ParserError> {
    let name = self.expect_identifier("property name")?;
    let target = match name.as_str() {
      "day" => PropertyTarget::Day,
      "month" => PropertyTarget::Month,
      "year" => PropertyTarget::Year,
      "hour" => PropertyTarget::Hour,
      "minute" => PropertyTarget::Minute,
      "second" => PropertyTarget::Second,
      "weekday" => PropertyTarget::Weekday,
      other => return Err(ParserError::UnexpectedToken { found: other.to_owned(), expected: "property name".to_owned(), location }),
    };
    Ok(ConversionTarget::Property(target))
  }

  fn parse_conditional(&mut self) -> Result<ExprNode, ParserError> {
    let location = self.loc();
    if self.eat_identifier("if") {
      let cond = self.parse_logical_or()?;
      if !self.eat_identifier("then") {
        return Err(ParserError::UnexpectedToken { found: format!("{:?}", self.peek_kind()), expected: "then".to_owned(), location: self.loc() });
      }
      let then_branch = self.parse_logical_or()?;
      if !self.eat_identifier("else") {
        return Err(ParserError::UnexpectedToken { found: format!("{:?}", self.peek_kind()), expected: "else".to_owned(), location: self.loc() });
      }
      let else_branch = self.parse_logical_or()?;
      return Ok(ExprNode::ConditionalExpr { cond: Box::new(cond), then_branch: Box::new(then_branch), else_branch: Box::new(else_branch), location });
    }
    self.parse_logical_or()
  }

  fn parse_logical_or(&mut self) -> Result<ExprNode, ParserError> {
    let mut left = self.parse_logical_and()?;
    while self.eat_identifier("or") {
      let location = left.location();
      let right = self.parse_logical_and()?;
      left = ExprNode::BinaryExpression { op: BinaryOp::Or, left: Box::new(left), right: Box::new(right), location };
    }
    Ok(left)
  }

  fn parse_logical_and(&mut self) -> Result<ExprNode, ParserError> {
    let mut left = self.parse_comparison()?;
    while self.eat_identifier("and") {
      let location = left.location();
      let right = self.parse_comparison()?;
      left = ExprNode::BinaryExpression { op: BinaryOp::And, left: Box::new(left), right: Box::new(right), location };
    }
    Ok(left)
  }

  fn parse_comparison(&mut self) -> Result<ExprNode, ParserError> {
    let left = self.parse_additive()?;
    let op = match self.peek_kind() {
      Some(TokenKind::EqEq) => BinaryOp::Eq,
      Some(TokenKind::Ne) => BinaryOp::Ne,
      Some(TokenKind::Lt) => BinaryOp::Lt,
      Some(TokenKind::Le) => BinaryOp::Le,
      Some(TokenKind::Gt) => BinaryOp::Gt,
      Some(TokenKind::Ge) => BinaryOp::Ge,
      _ => return Ok(left),
    };
    let location = left.location();
    self.advance();
    let right = self.parse_additive()?;
    Ok(ExprNode::BinaryExpression { op, left: Box::new(left), right: Box::new(right), location })
  }

  fn parse_additive(&mut self) -> Result<ExprNode, ParserError> {
    let mut left = self.parse_multiplicative()?;
    loop {
      let op = match self.peek_kind() {
        Some(TokenKind::Plus) => BinaryOp::Add,
        Some(TokenKind::Minus) => BinaryOp::Subtract,
        _ => break,
      };
      let location = left.location();
      self.advance();
      let right = self.parse_multiplicative()?;
      left = ExprNode::BinaryExpression { op, left: Box::new(left), right: Box::new(right), location };
    }
    Ok(left)
  }

  fn parse_multiplicative(&mut self) -> Result<ExprNode, ParserError> {
    let mut left = self.parse_unary()?;
    loop {
      let op = match self.peek_kind() {
        Some(TokenKind::Star) => BinaryOp::Multiply,
        Some(TokenKind::Slash) => BinaryOp::Divide,
        _ => break,
      };
      let location = left.location();
      self.advance();
      let right = self.parse_unary()?;
      left = ExprNode::BinaryExpression { op, left: Box::new(left), right: Box::new(right), location };
    }
    Ok(left)
  }

  fn parse_unary(&mut self) -> Result<ExprNode, ParserError> {
    let location = self.loc();
    if matches!(self.peek_kind(), Some(TokenKind::Minus)) {
      self.advance();
      let operand = self.parse_unary()?;
      return Ok(ExprNode::UnaryExpression { op: UnaryOp::Negate, operand: Box::new(operand), location });
    }
    if self.eat_identifier("not") {
      let operand = self.parse_unary()?;
      return Ok(ExprNode::UnaryExpression { op: UnaryOp::Not, operand: Box::new(operand), location });
    }
    self.parse_power()
  }

  fn parse_power(&mut self) -> Result<ExprNode, ParserError> {
    let base = self.parse_postfix()?;
    if matches!(self.peek_kind(), Some(TokenKind::Caret)) {
      let location = base.location();
      self.advance();
      let exponent = self.parse_unary()?;
      return Ok(ExprNode::BinaryExpression { op: BinaryOp::Power, left: Box::new(base), right: Box::new(exponent), location });
    }
    Ok(base)
  }

  fn parse_postfix(&mut self) -> Result<ExprNode, ParserError> {
    let mut expr = self.parse_composite_value()?;
    loop {
      let location = expr.location();
      match self.peek_kind() {
        Some(TokenKind::Percent) => {
          self.advance();
          expr = ExprNode::PostfixExpression { op: PostfixOp::Percent, operand: Box::new(expr), location };
        }
        Some(TokenKind::Permille) => {
          self.advance();
          expr = ExprNode::PostfixExpression { op: PostfixOp::Permille, operand: Box::new(expr), location };
        }
        Some(TokenKind::Bang) => {
          self.advance();
          expr = ExprNode::PostfixExpression { op: PostfixOp::Factorial, operand: Box::new(expr), location };
        }
        _ => break,
      }
    }
    Ok(expr)
  }

  /// Greedily groups adjacent unit-bearing `Value`s into a
  /// `CompositeValue` (e.g. `5 ft 7 in`). Structural only: the
  /// evaluator is the one that checks every part shares a dimension.
  fn parse_composite_value(&mut self) -> Result<ExprNode, ParserError> {
    let first = self.parse_value_or_primary()?;
    let mut parts = vec![first];
    while matches!(self.peek_kind(), Some(TokenKind::Number(_))) && matches!(parts.last(), Some(ExprNode::Value { units: Some(_), .. })) {
      parts.push(self.parse_value_or_primary()?);
    }
    if starts_with_degree_mark(&parts[0]) {
      relabel_feet_inches_to_arc(&mut parts);
    }
    if parts.len() == 1 {
      Ok(parts.pop().unwrap())
    } else {
      let location = parts[0].location();
      Ok(ExprNode::CompositeValue { parts, location })
    }
  }

  fn parse_value_or_primary(&mut self) -> Result<ExprNode, ParserError> {
    let location = self.loc();
    if let Some((node, consumed)) = super::date_parser::try_parse(self.tokens, self.pos, self.line) {
      self.pos += consumed;
      return Ok(node);
    }
    if matches!(self.peek_kind(), Some(TokenKind::Number(_))) {
      let number = self.parse_number_literal()?;
      let units = self.parse_units_node()?;
      return Ok(ExprNode::Value { number: Box::new(number), units, location });
    }
    self.parse_primary()
  }

  fn parse_number_literal(&mut self) -> Result<ExprNode, ParserError> {
    let location = self.loc();
    let tok = self.advance().expect("caller checked Number token is present");
    let TokenKind::Number(text) = &tok.kind else { unreachable!() };
    let text = text.clone();
    let source_length = tok.span.len() as u32;
    Ok(ExprNode::NumberLiteral { text, location, source_length })
  }

  /// Consumes zero or more unit-shaped terms following a number:
  /// bare identifiers (optionally with `^exponent`), `/identifier`
  /// chains, and currency symbols. Stops at a reserved word, since
  /// `to`/`in`/`as`/`and`/`or`/`then`/`else`/`if`/`not` end a units
  /// sequence by grammar.
  fn parse_units_node(&mut self) -> Result<Option<UnitsNode>, ParserError> {
    let location = self.loc();
    let mut terms = Vec::new();
    loop {
      match self.peek_kind().cloned() {
        Some(TokenKind::Identifier(name)) if !is_reserved_word(&name) => {
          let term_loc = self.loc();
          self.advance();
          let exponent = self.parse_optional_exponent()?;
          terms.push(UnitTermNode { symbol: name, exponent, location: term_loc });
        }
        Some(TokenKind::CurrencySymbol(symbol)) => {
          let term_loc = self.loc();
          self.advance();
          terms.push(UnitTermNode { symbol, exponent: 1, location: term_loc });
        }
        // `°`/`'`/`"` are postfix unit marks rather than identifiers;
        // `parse_composite_value` relabels the `'`/`"` marks to
        // arcminute/arcsecond when they follow a `°`-marked part.
        Some(TokenKind::DegreeSign) if terms.is_empty() => {
          let term_loc = self.loc();
          self.advance();
          terms.push(UnitTermNode { symbol: "deg".to_owned(), exponent: 1, location: term_loc });
          break;
        }
        Some(TokenKind::Apostrophe) if terms.is_empty() => {
          let term_loc = self.loc();
          self.advance();
          terms.push(UnitTermNode { symbol: "ft".to_owned(), exponent: 1, location: term_loc });
          break;
        }
        Some(TokenKind::DoubleQuote) if terms.is_empty() => {
          let term_loc = self.loc();
          self.advance();
          terms.push(UnitTermNode { symbol: "in".to_owned(), exponent: 1, location: term_loc });
          break;
        }
        Some(TokenKind::Slash) => {
          // Only consume as a unit-divisor if followed by an identifier.
          if matches!(self.tokens.get(self.pos + 1).map(|t| &t.kind), Some(TokenKind::Identifier(name)) if !is_reserved_word(name)) {
            self.advance();
            let term_loc = self.loc();
            let TokenKind::Identifier(name) = self.advance().unwrap().kind.clone() else { unreachable!() };
            let exponent = self.parse_optional_exponent()?;
            terms.push(UnitTermNode { symbol: name, exponent: -exponent, location: term_loc });
          } else {
            break;
          }
        }
        _ => break,
      }
    }
    if terms.is_empty() {
      Ok(None)
    } else {
      Ok(Some(UnitsNode { terms, location }))
    }
  }

  fn parse_optional_exponent(&mut self) -> Result<i64, ParserError> {
    if matches!(self.peek_kind(), Some(TokenKind::Caret)) {
      self.advance();
      let location = self.loc();
      let tok = self.advance().ok_or(ParserError::UnexpectedEof { expected: "exponent".to_owned(), location })?;
      if let TokenKind::Number(text) = &tok.kind {
        return text.parse::<i64>().map_err(|_| ParserError::UnexpectedToken { found: text.clone(), expected: "integer exponent".to_owned(), location });
      }
      return Err(ParserError::UnexpectedToken { found: format!("{:?}", tok.kind), expected: "integer exponent".to_owned(), location });
    }
    Ok(1)
  }

  fn parse_primary(&mut self) -> Result<ExprNode, ParserError> {
    let location = self.loc();
    match self.peek_kind().cloned() {
      Some(TokenKind::LParen) => {
        self.advance();
        let expr = self.parse_conversion()?;
        if !matches!(self.peek_kind(), Some(TokenKind::RParen)) {
          return Err(ParserError::UnexpectedToken { found: format!("{:?}", self.peek_kind()), expected: ")".to_owned(), location: self.loc() });
        }
        self.advance();
        Ok(expr)
      }
      Some(TokenKind::CurrencySymbol(symbol)) => {
        self.advance();
        let amount = self.parse_value_or_primary()?;
        Ok(ExprNode::CurrencyLiteral { symbol_or_code: symbol, amount: Box::new(amount), location })
      }
      Some(TokenKind::Identifier(name)) if name == "true" => {
        self.advance();
        Ok(ExprNode::BooleanLiteral { value: true, location })
      }
      Some(TokenKind::Identifier(name)) if name == "false" => {
        self.advance();
        Ok(ExprNode::BooleanLiteral { value: false, location })
      }
      Some(TokenKind::Identifier(name)) if !is_reserved_word(&name) => {
        self.advance();
        if matches!(self.peek_kind(), Some(TokenKind::LParen)) {
          self.advance();
          let mut args = Vec::new();
          if !matches!(self.peek_kind(), Some(TokenKind::RParen)) {
            args.push(self.parse_conversion()?);
            while matches!(self.peek_kind(), Some(TokenKind::Comma)) {
              self.advance();
              args.push(self.parse_conversion()?);
            }
          }
          if !matches!(self.peek_kind(), Some(TokenKind::RParen)) {
            return Err(ParserError::UnexpectedToken { found: format!("{:?}", self.peek_kind()), expected: ")".to_owned(), location: self.loc() });
          }
          self.advance();
          return Ok(ExprNode::FunctionCall { name, args, location });
        }
        if crate::tables::constants::CONSTANTS.get(name.as_str()).is_some() {
          return Ok(ExprNode::Constant { name, location });
        }
        Ok(ExprNode::Variable { name, location })
      }
      _ => Err(ParserError::UnexpectedEof { expected: "expression".to_owned(), location }),
    }
  }

  fn expect_identifier(&mut self, what: &str) -> Result<String, ParserError> {
    let location = self.loc();
    match self.peek_kind().cloned() {
      Some(TokenKind::Identifier(name)) => {
        self.advance();
        Ok(name)
      }
      other => Err(ParserError::UnexpectedToken { found: format!("{other:?}"), expected: what.to_owned(), location }),
    }
  }

  fn expect_integer_text(&mut self) -> Result<u32, ParserError> {
    let location = self.loc();
    match self.peek_kind().cloned() {
      Some(TokenKind::Number(text)) => {
        self.advance();
        text.parse::<u32>().map_err(|_| ParserError::UnexpectedToken { found: text, expected: "integer".to_owned(), location })
      }
      other => Err(ParserError::UnexpectedToken { found: format!("{other:?}"), expected: "integer".to_owned(), location }),
    }
  }
}

fn starts_with_degree_mark(part: &ExprNode) -> bool {
  matches!(part, ExprNode::Value { units: Some(units), .. } if units.terms.first().map(|t| t.symbol == "deg").unwrap_or(false))
}

/// `10° 30' 15"` lexes identically to `30' 15"` on its own (the same
/// `'`/`"` marks feet/inches use), so the first part being a bare `°`
/// degree decides whether later marks mean arcminute/arcsecond.
fn relabel_feet_inches_to_arc(parts: &mut [ExprNode]) {
  for part in parts.iter_mut().skip(1) {
    if let ExprNode::Value { units: Some(units), .. } = part {
      for term in &mut units.terms {
        match term.symbol.as_str() {
          "ft" => term.symbol = "arcmin".to_owned(),
          "in" => term.symbol = "arcsec".to_owned(),
          _ => {}
        }
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::lexer::lex;

  fn parse(text: &str) -> Result<LineNode, ParserError> {
    let tokens = lex(text).unwrap();
    Parser::new(&tokens, 0).parse_line()
  }

  #[test]
  fn test_parse_assignment() {
    let node = parse("x = 10").unwrap();
    assert!(matches!(node, LineNode::VariableAssignment { name, .. } if name == "x"));
  }

  #[test]
  fn test_parse_value_with_units() {
    let node = parse("5 ft").unwrap();
    let LineNode::ExpressionLine { expr, .. } = node else { panic!("expected expression line") };
    assert!(matches!(*expr, ExprNode::Value { units: Some(_), .. }));
  }

  #[test]
  fn test_parse_composite_value() {
    let node = parse("5 ft 7 in").unwrap();
    let LineNode::ExpressionLine { expr, .. } = node else { panic!("expected expression line") };
    assert!(matches!(*expr, ExprNode::CompositeValue { .. }));
  }

  #[test]
  fn test_parse_feet_inches_marks() {
    let node = parse("5' 10\"").unwrap();
    let LineNode::ExpressionLine { expr, .. } = node else { panic!("expected expression line") };
    let ExprNode::CompositeValue { parts, .. } = *expr else { panic!("expected composite") };
    assert_eq!(parts.len(), 2);
    let symbols: Vec<_> = parts.iter().map(|p| match p {
      ExprNode::Value { units, .. } => units.as_ref().unwrap().terms[0].symbol.clone(),
      other => panic!("unexpected part: {other:?}"),
    }).collect();
    assert_eq!(symbols, vec!["ft".to_owned(), "in".to_owned()]);
  }

  #[test]
  fn test_parse_degree_minute_second_relabels_marks_to_arc_units() {
    let node = parse("10\u{00B0} 30' 15\"").unwrap();
    let LineNode::ExpressionLine { expr, .. } = node else { panic!("expected expression line") };
    let ExprNode::CompositeValue { parts, .. } = *expr else { panic!("expected composite") };
    assert_eq!(parts.len(), 3);
    let symbols: Vec<_> = parts.iter().map(|p| match p {
      ExprNode::Value { units, .. } => units.as_ref().unwrap().terms[0].symbol.clone(),
      other => panic!("unexpected part: {other:?}"),
    }).collect();
    assert_eq!(symbols, vec!["deg".to_owned(), "arcmin".to_owned(), "arcsec".to_owned()]);
  }

  #[test]
  fn test_parse_binary_precedence() {
    let node = parse("1 + 2 * 3").unwrap();
    let LineNode::ExpressionLine { expr, .. } = node else { panic!("expected expression line") };
    match *expr {
      ExprNode::BinaryExpression { op: BinaryOp::Add, right, .. } => {
        assert!(matches!(*right, ExprNode::BinaryExpression { op: BinaryOp::Multiply, .. }));
      }
      other => panic!("unexpected shape: {other:?}"),
    }
  }

  #[test]
  fn test_parse_conversion() {
    let node = parse("10 m to ft").unwrap();
    let LineNode::ExpressionLine { expr, .. } = node else { panic!("expected expression line") };
    assert!(matches!(*expr, ExprNode::Conversion { .. }));
  }

  #[test]
  fn test_parse_conditional() {
    let node = parse("if 1 < 2 then 10 else 20").unwrap();
    let LineNode::ExpressionLine { expr, .. } = node else { panic!("expected expression line") };
    assert!(matches!(*expr, ExprNode::ConditionalExpr { .. }));
  }

  #[test]
  fn test_parse_factorial_postfix() {
    let node = parse("5!").unwrap();
    let LineNode::ExpressionLine { expr, .. } = node else { panic!("expected expression line") };
    assert!(matches!(*expr, ExprNode::PostfixExpression { op: PostfixOp::Factorial, .. }));
  }

  #[test]
  fn test_parse_permille_postfix() {
    let node = parse("10‰").unwrap();
    let LineNode::ExpressionLine { expr, .. } = node else { panic!("expected expression line") };
    assert!(matches!(*expr, ExprNode::PostfixExpression { op: PostfixOp::Permille, .. }));
  }

  #[test]
  fn test_parse_function_call() {
    let node = parse("sqrt(4)").unwrap();
    let LineNode::ExpressionLine { expr, .. } = node else { panic!("expected expression line") };
    assert!(matches!(*expr, ExprNode::FunctionCall { .. }));
  }
}
