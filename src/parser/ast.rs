
//! Abstract syntax for one document line. Every node carries a
//! [`SourceLocation`] (and, for nodes that matter to overlay
//! highlighting, a `source_length`) — grounded on the specification's
//! requirement that every AST node expose `{type, location,
//! sourceLength?}` read-only to a host overlay.

use crate::source::SourceLocation;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum LineNode {
  Heading { level: u32, text: String, location: SourceLocation },
  EmptyLine { location: SourceLocation },
  PlainText { text: String, location: SourceLocation },
  VariableAssignment { name: String, expr: Box<ExprNode>, location: SourceLocation },
  ExpressionLine { expr: Box<ExprNode>, location: SourceLocation },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ExprNode {
  NumberLiteral { text: String, location: SourceLocation, source_length: u32 },
  PercentageLiteral { text: String, is_permille: bool, location: SourceLocation },
  BooleanLiteral { value: bool, location: SourceLocation },
  Variable { name: String, location: SourceLocation },
  Constant { name: String, location: SourceLocation },
  FunctionCall { name: String, args: Vec<ExprNode>, location: SourceLocation },
  UnaryExpression { op: UnaryOp, operand: Box<ExprNode>, location: SourceLocation },
  BinaryExpression { op: BinaryOp, left: Box<ExprNode>, right: Box<ExprNode>, location: SourceLocation },
  PostfixExpression { op: PostfixOp, operand: Box<ExprNode>, location: SourceLocation },
  ConditionalExpr { cond: Box<ExprNode>, then_branch: Box<ExprNode>, else_branch: Box<ExprNode>, location: SourceLocation },
  Conversion { expr: Box<ExprNode>, target: ConversionTarget, location: SourceLocation },
  /// A bare numeric magnitude paired with an optional unit
  /// composition, e.g. `5 ft`, `10`, `3.5 kg m/s^2`.
  Value { number: Box<ExprNode>, units: Option<UnitsNode>, location: SourceLocation },
  /// Two or more adjacent same-dimension values, e.g. `5 ft 7 in`.
  CompositeValue { parts: Vec<ExprNode>, location: SourceLocation },
  CurrencyLiteral { symbol_or_code: String, amount: Box<ExprNode>, location: SourceLocation },
  DateLiteral { text: String, location: SourceLocation },
  TimeLiteral { text: String, location: SourceLocation },
  DateTimeLiteral { text: String, location: SourceLocation },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitsNode {
  pub terms: Vec<UnitTermNode>,
  pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitTermNode {
  pub symbol: String,
  pub exponent: i64,
  pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ConversionTarget {
  Units(UnitsNode),
  Presentation(PresentationFormat),
  Property(PropertyTarget),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PresentationFormat {
  Base(u32),
  SignificantFigures(u32),
  Decimals(u32),
  Scientific,
  Fraction,
  Percentage,
  UnixSeconds,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PropertyTarget {
  Day,
  Month,
  Year,
  Hour,
  Minute,
  Second,
  Weekday,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnaryOp {
  Negate,
  Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinaryOp {
  Add,
  Subtract,
  Multiply,
  Divide,
  Power,
  And,
  Or,
  Eq,
  Ne,
  Lt,
  Le,
  Gt,
  Ge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PostfixOp {
  Percent,
  Permille,
  Factorial,
}

impl ExprNode {
  pub fn location(&self) -> SourceLocation {
    match self {
      ExprNode::NumberLiteral { location, .. }
      | ExprNode::PercentageLiteral { location, .. }
      | ExprNode::BooleanLiteral { location, .. }
      | ExprNode::Variable { location, .. }
      | ExprNode::Constant { location, .. }
      | ExprNode::FunctionCall { location, .. }
      | ExprNode::UnaryExpression { location, .. }
      | ExprNode::BinaryExpression { location, .. }
      | ExprNode::PostfixExpression { location, .. }
      | ExprNode::ConditionalExpr { location, .. }
      | ExprNode::Conversion { location, .. }
      | ExprNode::Value { location, .. }
      | ExprNode::CompositeValue { location, .. }
      | ExprNode::CurrencyLiteral { location, .. }
      | ExprNode::DateLiteral { location, .. }
      | ExprNode::TimeLiteral { location, .. }
      | ExprNode::DateTimeLiteral { location, .. } => *location,
    }
  }
}
