
//! Binary and unary arithmetic over [`Value`]. Grounded on the
//! teacher's `expr::arithmetic::ArithExpr`: there, `+`/`*`/etc.
//! simplify immediately when both operands are plain numbers and
//! defer to a symbolic call node otherwise. The analogous split here
//! is dimensional: same-dimension numbers combine directly, anything
//! else is a `RuntimeError` (there is no symbolic fallback — algebraic
//! simplification is out of scope).
//!
//! This module never touches a [`crate::tables::TableSet`]; currency
//! arithmetic on mismatched codes is the evaluator's job (via
//! `currency_eval`) to resolve into a common code *before* calling
//! into here. A currency pair that still differs when it reaches this
//! module is treated as a caller error, not a user-facing one.

use super::error::RuntimeError;
use super::value::Value;
use crate::eval::number::Number;

fn percent_factor(value: &Number, is_permille: bool) -> Number {
  let base = if is_permille { Number::from(1000i64) } else { Number::from(100i64) };
  value.clone() / base
}

fn require_same_dimension(lhs: &Value, rhs: &Value) -> Result<(), RuntimeError> {
  let (_, lu) = lhs.as_number().ok_or_else(|| type_mismatch("Number", lhs))?;
  let (_, ru) = rhs.as_number().ok_or_else(|| type_mismatch("Number", rhs))?;
  if lu.dimension() != ru.dimension() {
    return Err(RuntimeError::DimensionMismatch { left: lu.dimension(), right: ru.dimension() });
  }
  Ok(())
}

fn type_mismatch(expected: &str, found: &Value) -> RuntimeError {
  RuntimeError::TypeMismatch { expected: expected.to_owned(), found: found.type_name().to_owned() }
}

pub fn add(lhs: Value, rhs: Value) -> Result<Value, RuntimeError> {
  additive(lhs, rhs, false)
}

pub fn subtract(lhs: Value, rhs: Value) -> Result<Value, RuntimeError> {
  additive(lhs, rhs, true)
}

fn additive(lhs: Value, rhs: Value, is_sub: bool) -> Result<Value, RuntimeError> {
  match (lhs, rhs) {
    // `X +/- Y%` == `X * (1 +/- Y/100)` whenever X carries (or lacks)
    // units and Y is a bare percentage.
    (Value::Number { magnitude, units }, Value::Percentage { value, is_permille }) => {
      let factor = percent_factor(&value, is_permille);
      let adjusted = if is_sub { Number::one() - factor } else { Number::one() + factor };
      Ok(Value::Number { magnitude: magnitude * adjusted, units })
    }
    (Value::Percentage { value: lv, is_permille }, Value::Percentage { value: rv, is_permille: r_permille }) => {
      // Percentages combine on their own numeric scale; mixed permille
      // is normalized to whichever scale the left operand uses.
      let rv_scaled = if is_permille == r_permille { rv } else if is_permille { rv * Number::from(10i64) } else { rv / Number::from(10i64) };
      let value = if is_sub { lv - rv_scaled } else { lv + rv_scaled };
      Ok(Value::Percentage { value, is_permille })
    }
    (Value::Currency { amount: la, code: lc, per_units: lp }, Value::Currency { amount: ra, code: rc, per_units: rp }) => {
      if lc != rc {
        return Err(RuntimeError::DomainError {
          function: if is_sub { "-".to_owned() } else { "+".to_owned() },
          reason: format!("currency codes {lc} and {rc} must be reconciled before arithmetic"),
        });
      }
      if lp != rp {
        return Err(RuntimeError::DomainError {
          function: if is_sub { "-".to_owned() } else { "+".to_owned() },
          reason: format!("currency rate units {lp} and {rp} do not match"),
        });
      }
      let amount = if is_sub { la - ra } else { la + ra };
      Ok(Value::Currency { amount, code: lc, per_units: lp })
    }
    // `$100 +/- 8%` scales the amount the same way a unit-bearing number does.
    (Value::Currency { amount, code, per_units }, Value::Percentage { value, is_permille }) => {
      let factor = percent_factor(&value, is_permille);
      let adjusted = if is_sub { Number::one() - factor } else { Number::one() + factor };
      Ok(Value::Currency { amount: amount * adjusted, code, per_units })
    }
    (lhs @ Value::Composite { .. }, rhs) | (lhs, rhs @ Value::Composite { .. }) => {
      additive_composite(lhs, rhs, is_sub)
    }
    (lhs, rhs) => {
      require_same_dimension(&lhs, &rhs)?;
      let (lmag, lunits) = lhs.as_number().unwrap();
      let (rmag, runits) = rhs.as_number().unwrap();
      // Subtracting two absolute temperatures is a valid delta (the
      // offsets cancel in base units); adding them is not.
      if !is_sub && has_affine(lunits) && has_affine(runits) {
        return Err(RuntimeError::DomainError {
          function: "+".to_owned(),
          reason: "cannot add two absolute temperatures".to_owned(),
        });
      }
      let rhs_base = runits.to_base(rmag.clone());
      let rhs_in_lhs_units = lunits.from_base(rhs_base);
      let magnitude = if is_sub { lmag.clone() - rhs_in_lhs_units } else { lmag.clone() + rhs_in_lhs_units };
      Ok(Value::Number { magnitude, units: lunits.clone() })
    }
  }
}

fn has_affine(units: &crate::tables::unit::CompositeUnit) -> bool {
  units.units().iter().any(|u| u.unit.is_affine())
}

fn additive_composite(lhs: Value, rhs: Value, is_sub: bool) -> Result<Value, RuntimeError> {
  let (lhs_units, lhs_base) = composite_base(&lhs)?;
  let (rhs_units, rhs_base) = composite_base(&rhs)?;
  let lhs_dim = lhs_units.first().map(|u| u.dimension()).unwrap_or_default();
  let rhs_dim = rhs_units.first().map(|u| u.dimension()).unwrap_or_default();
  if lhs_dim != rhs_dim {
    return Err(RuntimeError::DimensionMismatch { left: lhs_dim, right: rhs_dim });
  }
  // The composite operand (if either side is one) supplies the unit
  // breakdown the result is re-split into; a scalar plus scalar of the
  // same dimension never reaches this function.
  let template = if matches!(lhs, Value::Composite { .. }) { lhs_units } else { rhs_units };
  let base = if is_sub { lhs_base - rhs_base } else { lhs_base + rhs_base };
  Ok(Value::Composite { parts: normalize(base, &template) })
}

pub(crate) fn composite_base(v: &Value) -> Result<(Vec<crate::tables::unit::UnitWithPower>, Number), RuntimeError> {
  match v {
    Value::Composite { parts } => {
      let units: Vec<_> = parts.iter().map(|(_, u)| u.clone()).collect();
      let base = parts.iter().fold(Number::zero(), |acc, (amount, unit)| acc + unit.to_base(amount.clone()));
      Ok((units, base))
    }
    Value::Number { magnitude, units } => {
      let elements = units.units().to_vec();
      let base = units.to_base(magnitude.clone());
      Ok((elements, base))
    }
    other => Err(type_mismatch("Number", other)),
  }
}

/// Splits a base-unit amount across `units` (assumed ordered
/// largest-to-smallest), keeping an integer count in every unit but the
/// last, which absorbs the fractional remainder.
pub(crate) fn normalize(base_amount: Number, units: &[crate::tables::unit::UnitWithPower]) -> Vec<(Number, crate::tables::unit::UnitWithPower)> {
  let mut remaining = base_amount;
  let mut parts = Vec::with_capacity(units.len());
  for (index, unit) in units.iter().enumerate() {
    if index + 1 == units.len() {
      parts.push((unit.from_base(remaining.clone()), unit.clone()));
      break;
    }
    let in_unit = unit.from_base(remaining.clone());
    let whole = in_unit.floor();
    let used_base = unit.to_base(whole.clone());
    remaining = remaining - used_base;
    parts.push((whole, unit.clone()));
  }
  parts
}

pub fn multiply(lhs: Value, rhs: Value) -> Result<Value, RuntimeError> {
  match (lhs, rhs) {
    (Value::Number { magnitude, units }, Value::Percentage { value, is_permille }) | (Value::Percentage { value, is_permille }, Value::Number { magnitude, units }) => {
      Ok(Value::Number { magnitude: magnitude * percent_factor(&value, is_permille), units })
    }
    (Value::Percentage { value: lv, is_permille }, Value::Percentage { value: rv, .. }) => {
      Ok(Value::Percentage { value: lv * rv / Number::from(100i64), is_permille })
    }
    (Value::Number { magnitude: lm, units: lu }, Value::Number { magnitude: rm, units: ru }) => {
      let units = lu.mul(ru);
      if !units.is_well_formed_affine() {
        return Err(RuntimeError::DomainError { function: "*".to_owned(), reason: "affine units cannot be combined by multiplication".to_owned() });
      }
      Ok(Value::Number { magnitude: lm * rm, units })
    }
    (Value::Currency { amount, code, per_units }, Value::Number { magnitude, units }) | (Value::Number { magnitude, units }, Value::Currency { amount, code, per_units }) => {
      if !units.is_empty() {
        return Err(RuntimeError::DomainError { function: "*".to_owned(), reason: "currency can only be scaled by a dimensionless factor".to_owned() });
      }
      Ok(Value::Currency { amount: amount * magnitude, code, per_units })
    }
    (Value::Currency { amount, code, per_units }, Value::Percentage { value, is_permille }) | (Value::Percentage { value, is_permille }, Value::Currency { amount, code, per_units }) => {
      Ok(Value::Currency { amount: amount * percent_factor(&value, is_permille), code, per_units })
    }
    (lhs, rhs) => Err(type_mismatch("Number", if matches!(lhs, Value::Number{..}) { &rhs } else { &lhs })),
  }
}

pub fn divide(lhs: Value, rhs: Value) -> Result<Value, RuntimeError> {
  match (lhs, rhs) {
    (Value::Number { magnitude, units }, Value::Percentage { value, is_permille }) => {
      let factor = percent_factor(&value, is_permille);
      if factor.is_zero() {
        return Err(RuntimeError::DivisionByZero);
      }
      Ok(Value::Number { magnitude: magnitude / factor, units })
    }
    (Value::Number { magnitude: lm, units: lu }, Value::Number { magnitude: rm, units: ru }) => {
      if rm.is_zero() {
        return Err(RuntimeError::DivisionByZero);
      }
      let units = lu.div(ru);
      if !units.is_well_formed_affine() {
        return Err(RuntimeError::DomainError { function: "/".to_owned(), reason: "affine units cannot be combined by division".to_owned() });
      }
      Ok(Value::Number { magnitude: lm / rm, units })
    }
    // Dividing by a dimensionless factor just scales the amount;
    // dividing by a unit-bearing quantity builds (or extends) a
    // per-unit rate (`1 USD / 4 person` => `0.25 USD/person`, and a
    // further `/ day` folds into the same `per_units` composition the
    // way `Number`'s own unit division accumulates exponents).
    (Value::Currency { amount, code, per_units }, Value::Number { magnitude, units }) => {
      if magnitude.is_zero() {
        return Err(RuntimeError::DivisionByZero);
      }
      let per_units = if units.is_empty() { per_units } else { per_units.div(units) };
      if !per_units.is_well_formed_affine() {
        return Err(RuntimeError::DomainError { function: "/".to_owned(), reason: "affine units cannot be combined in a currency rate".to_owned() });
      }
      Ok(Value::Currency { amount: amount / magnitude, code, per_units })
    }
    (Value::Currency { amount: la, code: lc, per_units: lp }, Value::Currency { amount: ra, code: rc, per_units: rp }) => {
      if lc != rc {
        return Err(RuntimeError::DomainError { function: "/".to_owned(), reason: format!("currency codes {lc} and {rc} must be reconciled before arithmetic") });
      }
      if lp != rp {
        return Err(RuntimeError::DomainError { function: "/".to_owned(), reason: format!("currency rate units {lp} and {rp} do not match") });
      }
      if ra.is_zero() {
        return Err(RuntimeError::DivisionByZero);
      }
      Ok(Value::number(la / ra))
    }
    (lhs, rhs) => Err(type_mismatch("Number", if matches!(lhs, Value::Number{..}) { &rhs } else { &lhs })),
  }
}

pub fn power(base: Value, exponent: Value) -> Result<Value, RuntimeError> {
  let (base_mag, base_units) = base.as_number().ok_or_else(|| type_mismatch("Number", &base))?;
  let (exp_mag, exp_units) = exponent.as_number().ok_or_else(|| type_mismatch("Number", &exponent))?;
  if !exp_units.is_empty() {
    return Err(RuntimeError::DomainError { function: "^".to_owned(), reason: "exponent must be dimensionless".to_owned() });
  }
  if !base_units.is_empty() {
    let Some(exp_int) = exp_mag.to_i64() else {
      return Err(RuntimeError::DomainError { function: "^".to_owned(), reason: "exponent on a unit-bearing value must be an integer".to_owned() });
    };
    return Ok(Value::Number { magnitude: base_mag.powi(exp_int), units: base_units.clone().pow(exp_int) });
  }
  match exp_mag.to_i64() {
    Some(exp_int) => Ok(Value::number(base_mag.powi(exp_int))),
    None => {
      let base_f = base_mag.to_f64_or_nan();
      let exp_f = exp_mag.to_f64_or_nan();
      Ok(Value::number(Number::from(base_f.powf(exp_f))))
    }
  }
}

pub fn negate(value: Value) -> Result<Value, RuntimeError> {
  match value {
    Value::Number { magnitude, units } => Ok(Value::Number { magnitude: -magnitude, units }),
    Value::Percentage { value, is_permille } => Ok(Value::Percentage { value: -value, is_permille }),
    Value::Currency { amount, code, per_units } => Ok(Value::Currency { amount: -amount, code, per_units }),
    other => Err(type_mismatch("Number", &other)),
  }
}

pub fn logical_not(value: Value) -> Result<Value, RuntimeError> {
  value.as_boolean().map(|b| Value::Boolean(!b)).ok_or_else(|| type_mismatch("Boolean", &value))
}

pub fn to_percentage(value: Value, is_permille: bool) -> Result<Value, RuntimeError> {
  match value {
    Value::Number { magnitude, units } if units.is_empty() => Ok(Value::Percentage { value: magnitude, is_permille }),
    other => Err(type_mismatch("dimensionless Number", &other)),
  }
}

pub fn factorial(value: Value) -> Result<Value, RuntimeError> {
  let (magnitude, units) = value.as_number().ok_or_else(|| type_mismatch("Number", &value))?;
  if !units.is_empty() {
    return Err(RuntimeError::DomainError { function: "!".to_owned(), reason: "factorial operand must be dimensionless".to_owned() });
  }
  let n = magnitude
    .to_i64()
    .filter(|n| *n >= 0)
    .ok_or_else(|| RuntimeError::DomainError { function: "!".to_owned(), reason: "factorial requires a non-negative integer".to_owned() })?;
  let mut acc = Number::one();
  for i in 2..=n {
    acc = acc * Number::from(i);
  }
  Ok(Value::number(acc))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::tables::dimension::{BaseDimension, Dimension};
  use crate::tables::unit::{CompositeUnit, Unit, UnitWithPower};
  use std::sync::Arc;

  fn meter() -> Arc<Unit> {
    Arc::new(Unit::linear("m", "meter", Dimension::singleton(BaseDimension::Length), Number::one()))
  }

  fn centimeter() -> Arc<Unit> {
    Arc::new(Unit::linear("cm", "centimeter", Dimension::singleton(BaseDimension::Length), Number::ratio(1, 100)))
  }

  fn meters(n: i64) -> Value {
    Value::Number { magnitude: Number::from(n), units: CompositeUnit::from(meter()) }
  }

  #[test]
  fn test_add_same_unit() {
    let result = add(meters(2), meters(3)).unwrap();
    let (m, _) = result.as_number().unwrap();
    assert_eq!(m, &Number::from(5i64));
  }

  #[test]
  fn test_add_converts_units() {
    let cm_value = Value::Number { magnitude: Number::from(50i64), units: CompositeUnit::from(centimeter()) };
    let result = add(meters(1), cm_value).unwrap();
    let (m, _) = result.as_number().unwrap();
    assert_eq!(m, &Number::ratio(3, 2));
  }

  #[test]
  fn test_add_dimension_mismatch() {
    let seconds = Arc::new(Unit::linear("s", "second", Dimension::singleton(BaseDimension::Time), Number::one()));
    let time_value = Value::Number { magnitude: Number::one(), units: CompositeUnit::from(seconds) };
    assert!(matches!(add(meters(1), time_value), Err(RuntimeError::DimensionMismatch { .. })));
  }

  #[test]
  fn test_percent_addition() {
    let hundred = Value::Number { magnitude: Number::from(100i64), units: CompositeUnit::unitless() };
    let ten_percent = Value::Percentage { value: Number::from(10i64), is_permille: false };
    let result = add(hundred, ten_percent).unwrap();
    let (m, _) = result.as_number().unwrap();
    assert_eq!(m, &Number::from(110i64));
  }

  #[test]
  fn test_divide_by_zero() {
    let zero = Value::number(Number::zero());
    assert!(matches!(divide(meters(1), zero), Err(RuntimeError::DivisionByZero)));
  }

  #[test]
  fn test_multiply_combines_units() {
    let result = multiply(meters(2), meters(3)).unwrap();
    let (m, units) = result.as_number().unwrap();
    assert_eq!(m, &Number::from(6i64));
    assert_eq!(units.units()[0].exponent, 2);
  }

  #[test]
  fn test_power_integer_exponent_on_units() {
    let result = power(meters(2), Value::number(Number::from(3i64))).unwrap();
    let (m, units) = result.as_number().unwrap();
    assert_eq!(m, &Number::from(8i64));
    assert_eq!(units.units()[0].exponent, 3);
  }

  #[test]
  fn test_power_non_integer_exponent_on_units_fails() {
    let half = Value::number(Number::ratio(1, 2));
    assert!(power(meters(4), half).is_err());
  }

  #[test]
  fn test_currency_scaled_by_dimensionless_number() {
    let ten_usd = Value::Currency { amount: Number::from(10i64), code: "USD".to_owned(), per_units: CompositeUnit::unitless() };
    let result = multiply(ten_usd, Value::number(Number::from(3i64))).unwrap();
    assert_eq!(result, Value::Currency { amount: Number::from(30i64), code: "USD".to_owned(), per_units: CompositeUnit::unitless() });
  }

  #[test]
  fn test_currency_ratio_is_dimensionless() {
    let a = Value::Currency { amount: Number::from(10i64), code: "USD".to_owned(), per_units: CompositeUnit::unitless() };
    let b = Value::Currency { amount: Number::from(4i64), code: "USD".to_owned(), per_units: CompositeUnit::unitless() };
    let result = divide(a, b).unwrap();
    let (m, units) = result.as_number().unwrap();
    assert_eq!(m, &Number::ratio(5, 2));
    assert!(units.is_empty());
  }

  #[test]
  fn test_currency_divided_by_unit_bearing_number_builds_a_rate() {
    let person = Arc::new(Unit::linear("person", "person", Dimension::one(), Number::one()));
    let ten_usd = Value::Currency { amount: Number::from(10i64), code: "USD".to_owned(), per_units: CompositeUnit::unitless() };
    let four_people = Value::Number { magnitude: Number::from(4i64), units: CompositeUnit::from(person) };
    let result = divide(ten_usd, four_people).unwrap();
    let Value::Currency { amount, code, per_units } = result else { panic!("expected a rate-bearing Currency") };
    assert_eq!(amount, Number::ratio(5, 2));
    assert_eq!(code, "USD");
    assert_eq!(per_units.units()[0].exponent, -1);
  }

  #[test]
  fn test_composite_normalize() {
    let foot = Arc::new(Unit::linear("ft", "foot", Dimension::singleton(BaseDimension::Length), Number::ratio(3048, 10000)));
    let inch = Arc::new(Unit::linear("in", "inch", Dimension::singleton(BaseDimension::Length), Number::ratio(254, 10000)));
    let units = vec![UnitWithPower { unit: foot.clone(), exponent: 1 }, UnitWithPower { unit: inch.clone(), exponent: 1 }];
    let parts = normalize(Number::ratio(3048 + 254 * 7, 10000), &units);
    assert_eq!(parts.len(), 2);
    assert_eq!(parts[0].0, Number::one());
  }
}
