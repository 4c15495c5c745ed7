
//! The tree-walking evaluator: turns one line's [`LineNode`] into a
//! [`Value`] (plus, for a presentation conversion, the display hint
//! the formatter needs), threading an [`Environment`] across lines and
//! a [`TableSet`] across the whole document. Grounded on the shape of
//! the teacher's own top-level interpreter loop (`runner::Runner`):
//! one long-lived object owning the mutable pieces evaluation actually
//! needs (there, the undo stack and RNG; here, the per-document PRNG),
//! with everything else — tables, arithmetic, conversion — taken as
//! already-built, shared, read-only collaborators.
//!
//! This module is the seam where the individually-grounded `eval::*`
//! submodules (`arithmetic`, `conversion`, `currency_eval`, `datetime`,
//! `functions`) get dispatched to from the AST; it does not duplicate
//! their logic, only resolves AST shape into the `Value`s and resolved
//! units those modules expect.

use super::arithmetic;
use super::conversion::{self, PresentationOverride};
use super::currency_eval;
use super::datetime;
use super::environment::Environment;
use super::error::RuntimeError;
use super::functions::{self, AngleUnit as FuncAngleUnit, FunctionContext};
use super::number::Number;
use super::random::Prng;
use super::value::Value;

use crate::parser::ast::{BinaryOp, ConversionTarget, ExprNode, LineNode, PostfixOp, UnaryOp, UnitTermNode, UnitsNode};
use crate::settings::{AngleUnit as SettingsAngleUnit, Settings};
use crate::tables::currency::CurrencyResolution;
use crate::tables::unit::{CompositeUnit, Unit, UnitWithPower};
use crate::tables::TableSet;

use std::cmp::Ordering;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use time::{Date, Month, PrimitiveDateTime, Time};

pub struct Evaluator {
  tables: Arc<TableSet>,
  rng: Prng,
}

/// The result of evaluating one line's top-level expression: the
/// value itself, a display hint for an outermost presentation
/// conversion, and a derivation trailer for an outermost currency
/// conversion. `driver::calculate` maps this onto `LineResult`'s
/// `result`/`details` fields.
#[derive(Debug, Clone, PartialEq)]
pub struct LineOutcome {
  pub value: Value,
  pub presentation: Option<PresentationOverride>,
  pub details: Option<String>,
}

impl Evaluator {
  /// Seeds the per-document PRNG from the wall clock; there is no
  /// settings field or AST construct that pins a seed, so each
  /// evaluation of a fresh document gets its own random stream.
  pub fn new(tables: Arc<TableSet>) -> Self {
    let seed = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_nanos() as u64).unwrap_or(1);
    Self { tables, rng: Prng::new(seed) }
  }

  /// The currency table backing this evaluator's document, for a
  /// driver that needs to format a `Value::Currency` result.
  pub fn currencies(&self) -> &crate::tables::currency::CurrencyTable {
    self.tables.currencies()
  }

  /// Evaluates one line, updating `env` per the assignment/`last`
  /// rules in [`Environment`]. Returns `None` for lines with no value
  /// (`Heading`, `EmptyLine`, `PlainText`); `Some` otherwise, paired
  /// with a presentation override when the line's outermost operation
  /// is a `to <presentation format>` conversion.
  pub fn eval_line(&mut self, line: &LineNode, env: &mut Environment, settings: &Settings) -> Result<Option<LineOutcome>, RuntimeError> {
    match line {
      LineNode::Heading { .. } | LineNode::EmptyLine { .. } | LineNode::PlainText { .. } => Ok(None),
      LineNode::VariableAssignment { name, expr, .. } => {
        let result = self.eval_top(expr, env, settings)?;
        env.assign(name.clone(), result.value.clone());
        Ok(Some(result))
      }
      LineNode::ExpressionLine { expr, .. } => {
        let result = self.eval_top(expr, env, settings)?;
        env.record_last(result.value.clone());
        Ok(Some(result))
      }
    }
  }

  /// Evaluates a line's top-level expression, surfacing a presentation
  /// override only when the outermost node is exactly a `to
  /// <presentation format>` conversion — nesting one inside a larger
  /// expression (e.g. as a function argument) still evaluates fine via
  /// [`Self::eval_expr`], it just doesn't carry a display hint out,
  /// since the format only ever describes how to show a line's final
  /// result. Likewise, a `"based on: ..."` derivation trailer is only
  /// ever produced for an outermost `to <currency>` conversion — the
  /// one case with an actual rate worth surfacing — and not for a
  /// currency conversion buried inside a larger expression.
  fn eval_top(&mut self, expr: &ExprNode, env: &Environment, settings: &Settings) -> Result<LineOutcome, RuntimeError> {
    if let ExprNode::Conversion { expr: inner, target, .. } = expr {
      match target {
        ConversionTarget::Presentation(format) => {
          let value = self.eval_expr(inner, env, settings)?;
          let (value, override_) = conversion::apply_presentation(&value, format)?;
          return Ok(LineOutcome { value, presentation: override_, details: None });
        }
        ConversionTarget::Units(units_node) => {
          let source = self.eval_expr(inner, env, settings)?;
          let details = self.currency_conversion_details(&source, units_node);
          let value = self.convert_units_target(source, units_node)?;
          return Ok(LineOutcome { value, presentation: None, details });
        }
        ConversionTarget::Property(_) => {}
      }
    }
    let value = self.eval_expr(expr, env, settings)?;
    Ok(LineOutcome { value, presentation: None, details: None })
  }

  /// When `source` is a `Currency` converting to a single, different
  /// currency code, renders the per-unit exchange rate used (`"based
  /// on: 1 USD = 0.92 EUR"`). `None` for anything else — same code,
  /// an unresolvable target, or a non-currency source — since those
  /// either have no rate to report or will fail (and report) in
  /// [`Self::convert_units_target`] itself.
  fn currency_conversion_details(&self, source: &Value, units_node: &UnitsNode) -> Option<String> {
    let Value::Currency { code: from_code, .. } = source else { return None };
    if units_node.terms.len() != 1 || units_node.terms[0].exponent != 1 {
      return None;
    }
    let to_code = &units_node.terms[0].symbol;
    if from_code == to_code {
      return None;
    }
    let table = self.tables.currencies();
    table.resolve_code(to_code)?;
    let rate = table.convert(&Number::one(), from_code, to_code).ok()?;
    Some(format!("based on: 1 {from_code} = {rate} {to_code}"))
  }

  fn eval_expr(&mut self, expr: &ExprNode, env: &Environment, settings: &Settings) -> Result<Value, RuntimeError> {
    match expr {
      ExprNode::NumberLiteral { text, .. } => parse_number_text(text).map(Value::number),
      ExprNode::PercentageLiteral { text, is_permille, .. } => {
        let value = parse_number_text(text)?;
        Ok(Value::Percentage { value, is_permille: *is_permille })
      }
      ExprNode::BooleanLiteral { value, .. } => Ok(Value::Boolean(*value)),
      ExprNode::Variable { name, .. } => env.get(name).cloned().ok_or_else(|| RuntimeError::UnknownIdentifier { name: name.clone() }),
      ExprNode::Constant { name, .. } => self.tables.constant(name).map(Value::number).ok_or_else(|| RuntimeError::UnknownIdentifier { name: name.clone() }),
      ExprNode::FunctionCall { name, args, .. } => {
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
          values.push(self.eval_expr(arg, env, settings)?);
        }
        let mut ctx = FunctionContext { angle_unit: map_angle_unit(settings.angle_unit), rng: &mut self.rng };
        functions::call(name, &values, &mut ctx)
      }
      ExprNode::UnaryExpression { op, operand, .. } => {
        let value = self.eval_expr(operand, env, settings)?;
        match op {
          UnaryOp::Negate => arithmetic::negate(value),
          UnaryOp::Not => arithmetic::logical_not(value),
        }
      }
      ExprNode::BinaryExpression { op, left, right, .. } => self.eval_binary(*op, left, right, env, settings),
      ExprNode::PostfixExpression { op, operand, .. } => {
        let value = self.eval_expr(operand, env, settings)?;
        match op {
          PostfixOp::Percent => arithmetic::to_percentage(value, false),
          PostfixOp::Permille => arithmetic::to_percentage(value, true),
          PostfixOp::Factorial => arithmetic::factorial(value),
        }
      }
      ExprNode::ConditionalExpr { cond, then_branch, else_branch, .. } => {
        let cond_value = self.eval_expr(cond, env, settings)?;
        if expect_bool(&cond_value)? {
          self.eval_expr(then_branch, env, settings)
        } else {
          self.eval_expr(else_branch, env, settings)
        }
      }
      ExprNode::Conversion { expr, target, .. } => {
        let value = self.eval_expr(expr, env, settings)?;
        self.apply_conversion(value, target)
      }
      ExprNode::Value { number, units, .. } => {
        let number_value = self.eval_expr(number, env, settings)?;
        self.build_value(number_value, units.as_ref())
      }
      ExprNode::CompositeValue { parts, .. } => self.eval_composite_value(parts, env, settings),
      ExprNode::CurrencyLiteral { symbol_or_code, amount, .. } => self.eval_currency_literal(symbol_or_code, amount, env, settings),
      ExprNode::DateLiteral { text, .. } => parse_date_text(text).map(Value::PlainDate),
      ExprNode::TimeLiteral { text, .. } => parse_time_text(text).map(Value::PlainTime),
      ExprNode::DateTimeLiteral { text, .. } => parse_datetime_text(text).map(Value::PlainDateTime),
    }
  }

  fn eval_binary(&mut self, op: BinaryOp, left: &ExprNode, right: &ExprNode, env: &Environment, settings: &Settings) -> Result<Value, RuntimeError> {
    match op {
      BinaryOp::And | BinaryOp::Or => {
        let lv = self.eval_expr(left, env, settings)?;
        let l = expect_bool(&lv)?;
        let rv = self.eval_expr(right, env, settings)?;
        let r = expect_bool(&rv)?;
        Ok(Value::Boolean(if op == BinaryOp::And { l && r } else { l || r }))
      }
      BinaryOp::Add | BinaryOp::Subtract => {
        let lv = self.eval_expr(left, env, settings)?;
        let rv = self.eval_expr(right, env, settings)?;
        self.eval_additive(lv, rv, op == BinaryOp::Subtract)
      }
      BinaryOp::Multiply => {
        let lv = self.eval_expr(left, env, settings)?;
        let rv = self.eval_expr(right, env, settings)?;
        arithmetic::multiply(lv, rv)
      }
      BinaryOp::Divide => {
        let lv = self.eval_expr(left, env, settings)?;
        let rv = self.eval_expr(right, env, settings)?;
        arithmetic::divide(lv, rv)
      }
      BinaryOp::Power => {
        let lv = self.eval_expr(left, env, settings)?;
        let rv = self.eval_expr(right, env, settings)?;
        arithmetic::power(lv, rv)
      }
      BinaryOp::Eq | BinaryOp::Ne => {
        let lv = self.eval_expr(left, env, settings)?;
        let rv = self.eval_expr(right, env, settings)?;
        let equal = self.values_equal(&lv, &rv)?;
        Ok(Value::Boolean(if op == BinaryOp::Eq { equal } else { !equal }))
      }
      BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
        let lv = self.eval_expr(left, env, settings)?;
        let rv = self.eval_expr(right, env, settings)?;
        self.compare(op, lv, rv)
      }
    }
  }

  /// `+`/`-` where either side carries a date or time component
  /// routes to calendar-aware `datetime` arithmetic instead of plain
  /// dimensional addition: a date plus a duration shifts the
  /// calendar, two dates subtract to a duration, and everything else
  /// falls through to ordinary (possibly currency-reconciling)
  /// addition.
  fn eval_additive(&self, lhs: Value, rhs: Value, is_sub: bool) -> Result<Value, RuntimeError> {
    let lhs_is_dt = is_datetime_like(&lhs);
    let rhs_is_dt = is_datetime_like(&rhs);
    if lhs_is_dt && rhs_is_dt {
      if !is_sub {
        return Err(RuntimeError::DomainError { function: "+".to_owned(), reason: "cannot add two date/time values".to_owned() });
      }
      return datetime::subtract_datetimes(&lhs, &rhs);
    }
    if lhs_is_dt {
      let (amount, unit) = duration_operand(&rhs)?;
      let signed = if is_sub { -amount } else { amount };
      return datetime::add_duration(lhs, &signed, &unit);
    }
    if rhs_is_dt {
      if is_sub {
        return Err(RuntimeError::DomainError { function: "-".to_owned(), reason: "cannot subtract a date/time value from a duration".to_owned() });
      }
      let (amount, unit) = duration_operand(&lhs)?;
      return datetime::add_duration(rhs, &amount, &unit);
    }
    currency_eval::reconcile_for_addition(self.tables.currencies(), lhs, rhs, is_sub)
  }

  /// Dimensional equality independent of textual form (per the
  /// composition invariant): same-dimension numbers compare by their
  /// base-unit amount, not their as-written units. A dimension
  /// mismatch is `false`, not an error — unlike ordering, where
  /// comparing incompatible quantities is nonsensical enough to raise.
  fn values_equal(&self, lhs: &Value, rhs: &Value) -> Result<bool, RuntimeError> {
    match (lhs, rhs) {
      (Value::Boolean(a), Value::Boolean(b)) => Ok(a == b),
      (Value::Number { .. }, Value::Number { .. }) => {
        let (lm, lu) = lhs.as_number().expect("matched Number above");
        let (rm, ru) = rhs.as_number().expect("matched Number above");
        if lu.dimension() != ru.dimension() {
          return Ok(false);
        }
        Ok(lu.to_base(lm.clone()) == ru.to_base(rm.clone()))
      }
      (Value::Currency { amount: a, code: ca, .. }, Value::Currency { amount: b, code: cb, .. }) => {
        if ca == cb {
          return Ok(a == b);
        }
        match currency_eval::convert(self.tables.currencies(), a, ca, cb) {
          Ok(converted) => Ok(&converted == b),
          Err(_) => Ok(false),
        }
      }
      (Value::Percentage { value: a, is_permille: pa }, Value::Percentage { value: b, is_permille: pb }) => {
        let b_scaled = if pa == pb { b.clone() } else if *pa { b.clone() * Number::from(10i64) } else { b.clone() / Number::from(10i64) };
        Ok(*a == b_scaled)
      }
      (Value::PlainDate(a), Value::PlainDate(b)) => Ok(a == b),
      (Value::PlainTime(a), Value::PlainTime(b)) => Ok(a == b),
      (Value::PlainDateTime(a), Value::PlainDateTime(b)) => Ok(a == b),
      (Value::Instant(a), Value::Instant(b)) => Ok(a == b),
      (Value::ZonedDateTime { instant: a, .. }, Value::ZonedDateTime { instant: b, .. }) => Ok(a == b),
      _ => Ok(false),
    }
  }

  fn compare(&self, op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value, RuntimeError> {
    let (lm, lu) = lhs.as_number().ok_or_else(|| type_mismatch("Number", &lhs))?;
    let (rm, ru) = rhs.as_number().ok_or_else(|| type_mismatch("Number", &rhs))?;
    if lu.dimension() != ru.dimension() {
      return Err(RuntimeError::DimensionMismatch { left: lu.dimension(), right: ru.dimension() });
    }
    let lb = lu.to_base(lm.clone());
    let rb = ru.to_base(rm.clone());
    let ordering = lb.partial_cmp(&rb).ok_or_else(|| RuntimeError::DomainError { function: "comparison".to_owned(), reason: "values are not comparable".to_owned() })?;
    let result = match op {
      BinaryOp::Lt => ordering == Ordering::Less,
      BinaryOp::Le => ordering != Ordering::Greater,
      BinaryOp::Gt => ordering == Ordering::Greater,
      BinaryOp::Ge => ordering != Ordering::Less,
      _ => unreachable!("caller restricts op to the four ordering operators"),
    };
    Ok(Value::Boolean(result))
  }

  fn apply_conversion(&self, value: Value, target: &ConversionTarget) -> Result<Value, RuntimeError> {
    match target {
      ConversionTarget::Units(units_node) => self.convert_units_target(value, units_node),
      ConversionTarget::Presentation(format) => conversion::apply_presentation(&value, format).map(|(v, _)| v),
      ConversionTarget::Property(property) => conversion::extract_property(&value, property),
    }
  }

  /// `to <units>` dispatches on the source value: there is no distinct
  /// AST shape for a currency or timezone conversion target — `"5 USD
  /// to EUR"` and `"14:00 to Tokyo"` both parse their target exactly
  /// like a unit composition — so a date/time value routes its lone
  /// target term through the timezone table, a `Currency` through the
  /// currency table, and everything else resolves against the
  /// physical unit table.
  fn convert_units_target(&self, value: Value, units_node: &UnitsNode) -> Result<Value, RuntimeError> {
    if is_datetime_like(&value) {
      if units_node.terms.len() != 1 || units_node.terms[0].exponent != 1 {
        return Err(RuntimeError::DomainError { function: "to".to_owned(), reason: "a timezone conversion target must be a single zone name or offset".to_owned() });
      }
      return datetime::convert_timezone(value, &units_node.terms[0].symbol);
    }
    if let Value::Currency { code, .. } = &value {
      if units_node.terms.len() != 1 || units_node.terms[0].exponent != 1 {
        return Err(RuntimeError::DomainError { function: "to".to_owned(), reason: "a currency conversion target must be a single currency code".to_owned() });
      }
      if self.tables.currencies().resolve_code(code).is_none() {
        return Err(currency_eval::reject_ambiguous_conversion(code));
      }
      return currency_eval::convert_to_code(self.tables.currencies(), value, &units_node.terms[0].symbol);
    }
    let target: Vec<UnitWithPower> = units_node.terms.iter().map(|term| self.resolve_unit_term(term)).collect();
    conversion::convert_to_units(value, &target)
  }

  fn eval_composite_value(&mut self, parts: &[ExprNode], env: &Environment, settings: &Settings) -> Result<Value, RuntimeError> {
    let mut out = Vec::with_capacity(parts.len());
    for part in parts {
      let value = self.eval_expr(part, env, settings)?;
      match value {
        Value::Number { magnitude, units } => {
          let elements = units.units();
          if elements.len() != 1 {
            return Err(RuntimeError::DomainError { function: "composite value".to_owned(), reason: "each part of a composite value must carry exactly one unit".to_owned() });
          }
          out.push((magnitude, elements[0].clone()));
        }
        other => return Err(type_mismatch("Number", &other)),
      }
    }
    if let Some(first_dim) = out.first().map(|(_, u)| u.dimension()) {
      for (_, unit) in &out {
        let dim = unit.dimension();
        if dim != first_dim {
          return Err(RuntimeError::DimensionMismatch { left: first_dim, right: dim });
        }
      }
    }
    Ok(Value::Composite { parts: out })
  }

  fn eval_currency_literal(&mut self, symbol_or_code: &str, amount: &ExprNode, env: &Environment, settings: &Settings) -> Result<Value, RuntimeError> {
    let amount_value = self.eval_expr(amount, env, settings)?;
    let (magnitude, units) = amount_value.as_number().ok_or_else(|| type_mismatch("Number", &amount_value))?;
    if !units.is_empty() {
      return Err(RuntimeError::DomainError { function: "currency literal".to_owned(), reason: "a currency amount must be a dimensionless number".to_owned() });
    }
    let magnitude = magnitude.clone();
    match self.tables.currencies().resolve_symbol(symbol_or_code) {
      Some(CurrencyResolution::Known(currency)) => Ok(Value::Currency { amount: magnitude, code: currency.code, per_units: CompositeUnit::unitless() }),
      Some(CurrencyResolution::Ambiguous { symbol }) => Ok(Value::Currency { amount: magnitude, code: symbol, per_units: CompositeUnit::unitless() }),
      None => Err(RuntimeError::UnknownCurrency { code: symbol_or_code.to_owned() }),
    }
  }

  /// Builds a `Value` from a parsed number plus an optional unit
  /// composition. A single bare term that names a known currency code
  /// (`"5 USD"`) takes precedence over physical-unit resolution, since
  /// currencies are not in the unit table at all. A currency code
  /// followed by further factors (`"1 USD/person/day"`) is a per-unit
  /// rate: the trailing factors become the currency's rate denominator
  /// rather than being folded into an ordinary unit composition.
  fn build_value(&self, number_value: Value, units: Option<&UnitsNode>) -> Result<Value, RuntimeError> {
    let (magnitude, _) = number_value.as_number().ok_or_else(|| type_mismatch("Number", &number_value))?;
    let magnitude = magnitude.clone();
    let Some(node) = units else {
      return Ok(Value::Number { magnitude, units: CompositeUnit::unitless() });
    };
    if node.terms.len() == 1 && node.terms[0].exponent == 1 {
      if let Some(currency) = self.tables.currencies().resolve_code(&node.terms[0].symbol) {
        return Ok(Value::Currency { amount: magnitude, code: currency.code.clone(), per_units: CompositeUnit::unitless() });
      }
    }
    if let [first, rest @ ..] = node.terms.as_slice() {
      if first.exponent == 1 && !rest.is_empty() {
        if let Some(currency) = self.tables.currencies().resolve_code(&first.symbol) {
          let per_units = CompositeUnit::new(rest.iter().map(|term| self.resolve_unit_term(term)));
          if !per_units.is_well_formed_affine() {
            return Err(RuntimeError::DomainError { function: "unit composition".to_owned(), reason: "affine units cannot be combined in a currency rate".to_owned() });
          }
          return Ok(Value::Currency { amount: magnitude, code: currency.code.clone(), per_units });
        }
      }
    }
    let elements: Vec<UnitWithPower> = node.terms.iter().map(|term| self.resolve_unit_term(term)).collect();
    let composite = CompositeUnit::new(elements);
    if !composite.is_well_formed_affine() {
      return Err(RuntimeError::DomainError { function: "unit composition".to_owned(), reason: "affine units cannot be combined in a composite unit".to_owned() });
    }
    Ok(Value::Number { magnitude, units: composite })
  }

  /// Resolves one unit term against the table, synthesizing a
  /// prefixed unit (new symbol, scaled factor) when a prefix was
  /// stripped to find it, and falling back to a user-defined,
  /// dimensionless-but-distinct unit when the token isn't recognized
  /// at all — grammar shape alone is enough to accept it, per the data
  /// model's origin flag.
  fn resolve_unit_term(&self, term: &UnitTermNode) -> UnitWithPower {
    match self.tables.resolve_unit_token(&term.symbol) {
      Some((base_unit, _)) if base_unit.symbol == term.symbol => UnitWithPower { unit: base_unit, exponent: term.exponent },
      Some((base_unit, multiplier)) => {
        let scale = base_unit.scale.clone() * multiplier;
        let prefixed = Unit::linear(term.symbol.clone(), term.symbol.clone(), base_unit.dimension.clone(), scale);
        UnitWithPower { unit: Arc::new(prefixed), exponent: term.exponent }
      }
      None => UnitWithPower { unit: Arc::new(Unit::user_defined(term.symbol.clone())), exponent: term.exponent },
    }
  }
}

fn map_angle_unit(unit: SettingsAngleUnit) -> FuncAngleUnit {
  match unit {
    SettingsAngleUnit::Degree => FuncAngleUnit::Degree,
    SettingsAngleUnit::Radian => FuncAngleUnit::Radian,
  }
}

fn expect_bool(value: &Value) -> Result<bool, RuntimeError> {
  value.as_boolean().ok_or_else(|| type_mismatch("Boolean", value))
}

fn type_mismatch(expected: &str, found: &Value) -> RuntimeError {
  RuntimeError::TypeMismatch { expected: expected.to_owned(), found: found.type_name().to_owned() }
}

fn is_datetime_like(value: &Value) -> bool {
  matches!(value, Value::PlainDate(_) | Value::PlainTime(_) | Value::PlainDateTime(_) | Value::ZonedDateTime { .. } | Value::Instant(_))
}

/// Pulls a magnitude and single time unit out of a `Value::Number`,
/// for use as the right-hand side of a date/time addition — a
/// duration is always written as a number with exactly one unit
/// (`3 days`, `2 yr`), never a composite.
fn duration_operand(value: &Value) -> Result<(Number, UnitWithPower), RuntimeError> {
  let (magnitude, units) = value.as_number().ok_or_else(|| type_mismatch("a duration", value))?;
  let unit = units.units().first().cloned().ok_or_else(|| RuntimeError::DomainError { function: "date arithmetic".to_owned(), reason: "a duration must carry a time unit".to_owned() })?;
  Ok((magnitude.clone(), unit))
}

fn malformed(what: &str) -> RuntimeError {
  RuntimeError::DomainError { function: format!("{what} literal"), reason: format!("malformed {what} text") }
}

/// Strips a `0x`/`0o`/`0b` radix prefix (case-insensitive) and
/// underscores before parsing — the lexer's `NUMBER_RE` captures the
/// prefix as part of the token text rather than flagging it
/// separately, so the evaluator is the first place that distinguishes
/// a radix literal from a plain decimal one.
fn parse_number_text(text: &str) -> Result<Number, RuntimeError> {
  let cleaned = text.replace('_', "");
  let (radix, rest) = if let Some(rest) = cleaned.strip_prefix("0x").or_else(|| cleaned.strip_prefix("0X")) {
    (16u32, rest)
  } else if let Some(rest) = cleaned.strip_prefix("0o").or_else(|| cleaned.strip_prefix("0O")) {
    (8, rest)
  } else if let Some(rest) = cleaned.strip_prefix("0b").or_else(|| cleaned.strip_prefix("0B")) {
    (2, rest)
  } else {
    (10, cleaned.as_str())
  };
  let parsed = if radix == 10 { Number::parse_decimal(rest) } else { Number::parse_radix(rest, radix) };
  parsed.map_err(|e| RuntimeError::DomainError { function: "number literal".to_owned(), reason: e.to_string() })
}

/// Parses the fixed `YYYY-MM-DD` shape the parser's date recognizer
/// already validated — no general-purpose format description needed,
/// unlike the settings-driven rendering path in `format::datetime`.
fn parse_date_text(text: &str) -> Result<Date, RuntimeError> {
  let mut parts = text.splitn(3, '-');
  let year: i32 = parts.next().and_then(|s| s.parse().ok()).ok_or_else(|| malformed("date"))?;
  let month: u8 = parts.next().and_then(|s| s.parse().ok()).ok_or_else(|| malformed("date"))?;
  let day: u8 = parts.next().and_then(|s| s.parse().ok()).ok_or_else(|| malformed("date"))?;
  let month = Month::try_from(month).map_err(|_| malformed("date"))?;
  Date::from_calendar_date(year, month, day).map_err(|_| malformed("date"))
}

fn parse_time_text(text: &str) -> Result<Time, RuntimeError> {
  let parts: Vec<&str> = text.split(':').collect();
  let hour: u8 = parts.first().and_then(|s| s.parse().ok()).ok_or_else(|| malformed("time"))?;
  let minute: u8 = parts.get(1).and_then(|s| s.parse().ok()).ok_or_else(|| malformed("time"))?;
  let second: u8 = match parts.get(2) {
    Some(s) => s.parse().map_err(|_| malformed("time"))?,
    None => 0,
  };
  Time::from_hms(hour, minute, second).map_err(|_| malformed("time"))
}

fn parse_datetime_text(text: &str) -> Result<PrimitiveDateTime, RuntimeError> {
  let (date_part, time_part) = text.split_once('T').ok_or_else(|| malformed("datetime"))?;
  let date = parse_date_text(date_part)?;
  let time = parse_time_text(time_part)?;
  Ok(PrimitiveDateTime::new(date, time))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::parser;
  use approx::assert_abs_diff_eq;

  fn tables() -> Arc<TableSet> {
    TableSet::load().unwrap()
  }

  fn eval(text: &str) -> Result<Value, RuntimeError> {
    let mut evaluator = Evaluator::new(tables());
    let mut env = Environment::new();
    let settings = Settings::default();
    let outcome = parser::parse_line(text, 0);
    let result = evaluator.eval_line(&outcome.node, &mut env, &settings)?;
    Ok(result.unwrap().value)
  }

  #[test]
  fn test_simple_arithmetic() {
    let value = eval("1 + 2 * 3").unwrap();
    let (m, _) = value.as_number().unwrap();
    assert_eq!(m, &Number::from(7i64));
  }

  #[test]
  fn test_assignment_and_reference() {
    let mut evaluator = Evaluator::new(tables());
    let mut env = Environment::new();
    let settings = Settings::default();
    let assign_outcome = parser::parse_line("x = 10", 0);
    evaluator.eval_line(&assign_outcome.node, &mut env, &settings).unwrap();

    let ref_outcome = parser::parse_line("x * 2", 1);
    let result = evaluator.eval_line(&ref_outcome.node, &mut env, &settings).unwrap().unwrap().value;
    let (m, _) = result.as_number().unwrap();
    assert_eq!(m, &Number::from(20i64));
  }

  #[test]
  fn test_unknown_identifier_errors() {
    assert!(matches!(eval("nonexistent + 1"), Err(RuntimeError::UnknownIdentifier { .. })));
  }

  #[test]
  fn test_unit_conversion() {
    let value = eval("10 m to ft").unwrap();
    let (m, _) = value.as_number().unwrap();
    assert_abs_diff_eq!(m.to_f64_or_nan(), 10.0 / 0.3048, epsilon = 1e-9);
  }

  #[test]
  fn test_si_prefix_greediness() {
    let pico = eval("1 pg to g").unwrap();
    let (m, _) = pico.as_number().unwrap();
    assert_abs_diff_eq!(m.to_f64_or_nan(), 1e-12, epsilon = 1e-18);

    let peta = eval("1 Pg to g").unwrap();
    let (m, _) = peta.as_number().unwrap();
    assert_abs_diff_eq!(m.to_f64_or_nan(), 1e15, epsilon = 1.0);
  }

  #[test]
  fn test_incompatible_dimensions_on_conversion_errors() {
    assert!(matches!(eval("60 km / 1 h to m s"), Err(RuntimeError::DimensionMismatch { .. })));
  }

  #[test]
  fn test_prefixed_unit_round_trip() {
    let value = eval("5 km").unwrap();
    let (m, units) = value.as_number().unwrap();
    assert_eq!(m, &Number::from(5i64));
    assert_eq!(units.units()[0].unit.symbol, "km");
  }

  #[test]
  fn test_unknown_unit_token_becomes_user_defined() {
    let value = eval("5 frobnicate").unwrap();
    let (m, units) = value.as_number().unwrap();
    assert_eq!(m, &Number::from(5i64));
    assert_eq!(units.units()[0].unit.symbol, "frobnicate");
  }

  #[test]
  fn test_currency_literal_and_addition() {
    let value = eval("$5 + $3").unwrap();
    assert_eq!(value, Value::Currency { amount: Number::from(8i64), code: "USD".to_owned(), per_units: CompositeUnit::unitless() });
  }

  #[test]
  fn test_currency_unit_symbol_form() {
    let value = eval("5 USD").unwrap();
    assert_eq!(value, Value::Currency { amount: Number::from(5i64), code: "USD".to_owned(), per_units: CompositeUnit::unitless() });
  }

  #[test]
  fn test_currency_rate_unit_stays_a_currency() {
    let value = eval("1 USD/person/day").unwrap();
    let Value::Currency { amount, code, per_units } = value else { panic!("expected a rate-bearing Currency") };
    assert_eq!(amount, Number::from(1i64));
    assert_eq!(code, "USD");
    let symbols: Vec<_> = per_units.units().iter().map(|u| (u.unit.symbol.clone(), u.exponent)).collect();
    assert_eq!(symbols, vec![("day".to_owned(), -1), ("person".to_owned(), -1)]);
  }

  #[test]
  fn test_hex_literal() {
    let value = eval("0xFF").unwrap();
    let (m, _) = value.as_number().unwrap();
    assert_eq!(m, &Number::from(255i64));
  }

  #[test]
  fn test_binary_literal() {
    let value = eval("0b1010").unwrap();
    let (m, _) = value.as_number().unwrap();
    assert_eq!(m, &Number::from(10i64));
  }

  #[test]
  fn test_conditional_is_lazy() {
    // The untaken branch divides by zero; laziness keeps this from erroring.
    let value = eval("if true then 1 else (1 / 0)").unwrap();
    let (m, _) = value.as_number().unwrap();
    assert_eq!(m, &Number::from(1i64));
  }

  #[test]
  fn test_factorial_postfix() {
    let value = eval("5!").unwrap();
    let (m, _) = value.as_number().unwrap();
    assert_eq!(m, &Number::from(120i64));
  }

  #[test]
  fn test_percent_postfix_addition() {
    let value = eval("100 + 10%").unwrap();
    let (m, _) = value.as_number().unwrap();
    assert_eq!(m, &Number::from(110i64));
  }

  #[test]
  fn test_composite_value() {
    let value = eval("5 ft 7 in").unwrap();
    match value {
      Value::Composite { parts } => assert_eq!(parts.len(), 2),
      other => panic!("expected composite, got {other:?}"),
    }
  }

  #[test]
  fn test_composite_value_converts_to_single_unit() {
    let value = eval("5 ft 7 in to cm").unwrap();
    let (m, _) = value.as_number().unwrap();
    assert_abs_diff_eq!(m.to_f64_or_nan(), 170.18, epsilon = 0.01);
  }

  #[test]
  fn test_acre_to_product_unit_stays_a_single_scalar() {
    // Unlike `10 m to ft in` (a length split into a Composite), `ft in`
    // as a target for an area source is a product unit: both factors
    // share the source's dimension only when multiplied together.
    let value = eval("10 acre to ft in").unwrap();
    let (_, units) = value.as_number().expect("area-to-area-product stays a scalar Number");
    let symbols: Vec<_> = units.units().iter().map(|u| u.unit.symbol.clone()).collect();
    assert_eq!(symbols, vec!["ft".to_owned(), "in".to_owned()]);
  }

  #[test]
  fn test_feet_inches_marks_form_composite() {
    let value = eval("5' 10\"").unwrap();
    match value {
      Value::Composite { parts } => {
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].1.unit.symbol, "ft");
        assert_eq!(parts[1].1.unit.symbol, "in");
      }
      other => panic!("expected composite, got {other:?}"),
    }
  }

  #[test]
  fn test_rate_unit_division_accumulates_negative_exponent() {
    let value = eval("1 kg / person").unwrap();
    let (m, units) = value.as_number().unwrap();
    assert_eq!(m, &Number::from(1i64));
    let symbols: Vec<_> = units.units().iter().map(|u| (u.unit.symbol.clone(), u.exponent)).collect();
    assert_eq!(symbols, vec![("kg".to_owned(), 1), ("person".to_owned(), -1)]);
  }

  #[test]
  fn test_degree_minute_second_literal_is_angle_composite() {
    let value = eval("10\u{00B0} 30' 15\"").unwrap();
    match value {
      Value::Composite { parts } => {
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].1.unit.symbol, "deg");
        assert_eq!(parts[1].1.unit.symbol, "arcmin");
        assert_eq!(parts[2].1.unit.symbol, "arcsec");
      }
      other => panic!("expected composite, got {other:?}"),
    }
  }

  #[test]
  fn test_date_literal() {
    let value = eval("2024-03-15").unwrap();
    assert_eq!(value, Value::PlainDate(Date::from_calendar_date(2024, Month::March, 15).unwrap()));
  }

  #[test]
  fn test_equality_across_units() {
    let value = eval("1 m == 100 cm").unwrap();
    assert_eq!(value, Value::Boolean(true));
  }

  #[test]
  fn test_equality_across_dimensions_is_false_not_error() {
    let value = eval("1 m == 1 s").unwrap();
    assert_eq!(value, Value::Boolean(false));
  }

  #[test]
  fn test_date_plus_duration_shifts_calendar() {
    let value = eval("2024-01-31 + 1 mo").unwrap();
    assert_eq!(value, Value::PlainDate(Date::from_calendar_date(2024, Month::February, 29).unwrap()));
  }

  #[test]
  fn test_date_minus_date_gives_days() {
    let value = eval("2024-03-01 - 2024-01-01").unwrap();
    let (m, _) = value.as_number().unwrap();
    assert_eq!(m, &Number::from(60i64));
  }

  #[test]
  fn test_timezone_conversion() {
    let value = eval("2024-06-01T12:00 to Tokyo").unwrap();
    match value {
      Value::ZonedDateTime { zone_label, .. } => assert_eq!(zone_label, "Tokyo"),
      other => panic!("expected ZonedDateTime, got {other:?}"),
    }
  }

  #[test]
  fn test_ordering_across_dimensions_errors() {
    assert!(matches!(eval("1 m < 1 s"), Err(RuntimeError::DimensionMismatch { .. })));
  }

  #[test]
  fn test_presentation_override_on_top_level_conversion() {
    let mut evaluator = Evaluator::new(tables());
    let mut env = Environment::new();
    let settings = Settings::default();
    let outcome = parser::parse_line("255 to base 16", 0);
    let LineNode::ExpressionLine { expr, .. } = outcome.node else { panic!("expected expression line") };
    let outcome = evaluator.eval_top(&expr, &env, &settings).unwrap();
    assert_eq!(outcome.presentation, Some(PresentationOverride::Base(16)));
    let _ = &mut env;
  }

  #[test]
  fn test_currency_conversion_details_reports_rate() {
    let mut evaluator = Evaluator::new(tables());
    let mut env = Environment::new();
    let settings = Settings::default();
    let outcome = parser::parse_line("5 USD to EUR", 0);
    let result = evaluator.eval_line(&outcome.node, &mut env, &settings).unwrap().unwrap();
    let details = result.details.expect("currency conversion should report a rate");
    assert!(details.starts_with("based on: 1 USD ="));
    assert!(details.ends_with("EUR"));
  }

  #[test]
  fn test_same_currency_conversion_has_no_details() {
    let value = eval("5 USD to USD").unwrap();
    assert!(matches!(value, Value::Currency { .. }));
  }
}
