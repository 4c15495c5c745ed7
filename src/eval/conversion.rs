
//! `to`/`as`/`in` conversion targets. Grounded on the teacher's
//! `units::conversion` pass (itself a thin layer over
//! `CompositeUnit::to_base`/`from_base`) — generalized here to the
//! three target shapes this spec recognizes: a reinterpreting unit
//! composition, a largest-to-smallest multi-unit split, and a
//! date/time property or presentation-format request.
//!
//! Like `arithmetic`, this module takes already-resolved units (an
//! `Arc<Unit>` per symbol, looked up against a `TableSet` by the
//! evaluator) rather than looking anything up itself.

use super::arithmetic::{composite_base, normalize};
use super::error::RuntimeError;
use super::value::Value;
use crate::eval::number::Number;
use crate::parser::ast::{PresentationFormat, PropertyTarget};
use crate::tables::unit::{CompositeUnit, UnitWithPower};

/// A pure formatting hint that does not change the underlying value —
/// carried alongside it so the formatter can honor `to 6 sig figs` etc.
/// without conversion needing to know anything about display.
#[derive(Debug, Clone, PartialEq)]
pub enum PresentationOverride {
  Base(u32),
  SignificantFigures(u32),
  Decimals(u32),
  Scientific,
  Fraction,
}

pub fn convert_to_units(value: Value, target: &[UnitWithPower]) -> Result<Value, RuntimeError> {
  if target.is_empty() {
    return Err(RuntimeError::DomainError { function: "to".to_owned(), reason: "conversion target has no units".to_owned() });
  }
  let (source_units, source_base) = composite_base(&value)?;
  let source_dim = source_units.first().map(|u| u.dimension()).unwrap_or_default();

  let is_split = target.len() > 1 && target.iter().all(|u| u.dimension() == source_dim);
  if is_split {
    return Ok(Value::Composite { parts: normalize(source_base, target) });
  }

  let composite = CompositeUnit::new(target.to_vec());
  if composite.dimension() != source_dim {
    return Err(RuntimeError::DimensionMismatch { left: source_dim, right: composite.dimension() });
  }
  if !composite.is_well_formed_affine() {
    return Err(RuntimeError::DomainError { function: "to".to_owned(), reason: "affine units cannot be combined in a conversion target".to_owned() });
  }
  Ok(Value::Number { magnitude: composite.from_base(source_base), units: composite })
}

pub fn apply_presentation(value: &Value, format: &PresentationFormat) -> Result<(Value, Option<PresentationOverride>), RuntimeError> {
  match format {
    PresentationFormat::Base(radix) => {
      let (magnitude, units) = value.as_number().ok_or_else(|| type_mismatch(value))?;
      if magnitude.to_i64().is_none() {
        return Err(RuntimeError::DomainError { function: "to base".to_owned(), reason: "value must be an integer to render in another base".to_owned() });
      }
      if !(2..=36).contains(radix) {
        return Err(RuntimeError::DomainError { function: "to base".to_owned(), reason: format!("base {radix} is out of range 2..=36") });
      }
      Ok((Value::Number { magnitude: magnitude.clone(), units: units.clone() }, Some(PresentationOverride::Base(*radix))))
    }
    PresentationFormat::SignificantFigures(digits) => Ok((value.clone(), Some(PresentationOverride::SignificantFigures(*digits)))),
    PresentationFormat::Decimals(digits) => Ok((value.clone(), Some(PresentationOverride::Decimals(*digits)))),
    PresentationFormat::Scientific => Ok((value.clone(), Some(PresentationOverride::Scientific))),
    PresentationFormat::Fraction => Ok((value.clone(), Some(PresentationOverride::Fraction))),
    PresentationFormat::Percentage => {
      let (magnitude, units) = value.as_number().ok_or_else(|| type_mismatch(value))?;
      if !units.is_empty() {
        return Err(RuntimeError::DomainError { function: "to percentage".to_owned(), reason: "only a dimensionless value can be expressed as a percentage".to_owned() });
      }
      Ok((Value::Percentage { value: magnitude.clone() * Number::from(100i64), is_permille: false }, None))
    }
    PresentationFormat::UnixSeconds => {
      let instant = as_instant(value)?;
      Ok((Value::number(Number::from(instant.unix_timestamp())), None))
    }
  }
}

pub fn extract_property(value: &Value, property: &PropertyTarget) -> Result<Value, RuntimeError> {
  let (date, time) = date_time_parts(value)?;
  let result = match property {
    PropertyTarget::Day => date.ok_or_else(missing_date)?.day() as i64,
    PropertyTarget::Month => date.ok_or_else(missing_date)?.month() as u8 as i64,
    PropertyTarget::Year => date.ok_or_else(missing_date)?.year() as i64,
    PropertyTarget::Hour => time.ok_or_else(missing_time)?.hour() as i64,
    PropertyTarget::Minute => time.ok_or_else(missing_time)?.minute() as i64,
    PropertyTarget::Second => time.ok_or_else(missing_time)?.second() as i64,
    PropertyTarget::Weekday => date.ok_or_else(missing_date)?.weekday().number_from_monday() as i64,
  };
  Ok(Value::number(Number::from(result)))
}

fn missing_date() -> RuntimeError {
  RuntimeError::TypeMismatch { expected: "a value with a date component".to_owned(), found: "Number".to_owned() }
}

fn missing_time() -> RuntimeError {
  RuntimeError::TypeMismatch { expected: "a value with a time component".to_owned(), found: "Number".to_owned() }
}

fn date_time_parts(value: &Value) -> Result<(Option<time::Date>, Option<time::Time>), RuntimeError> {
  match value {
    Value::PlainDate(d) => Ok((Some(*d), None)),
    Value::PlainTime(t) => Ok((None, Some(*t))),
    Value::PlainDateTime(dt) => Ok((Some(dt.date()), Some(dt.time()))),
    Value::ZonedDateTime { instant, .. } => Ok((Some(instant.date()), Some(instant.time()))),
    Value::Instant(instant) => Ok((Some(instant.date()), Some(instant.time()))),
    other => Err(type_mismatch(other)),
  }
}

fn as_instant(value: &Value) -> Result<time::OffsetDateTime, RuntimeError> {
  match value {
    Value::ZonedDateTime { instant, .. } | Value::Instant(instant) => Ok(*instant),
    Value::PlainDateTime(dt) => Ok(dt.assume_utc()),
    Value::PlainDate(d) => Ok(time::PrimitiveDateTime::new(*d, time::Time::MIDNIGHT).assume_utc()),
    other => Err(type_mismatch(other)),
  }
}

fn type_mismatch(value: &Value) -> RuntimeError {
  RuntimeError::TypeMismatch { expected: "Number".to_owned(), found: value.type_name().to_owned() }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::tables::dimension::{BaseDimension, Dimension};
  use crate::tables::unit::Unit;
  use approx::assert_abs_diff_eq;
  use std::sync::Arc;

  fn meter() -> Arc<Unit> {
    Arc::new(Unit::linear("m", "meter", Dimension::singleton(BaseDimension::Length), Number::one()))
  }

  fn foot() -> Arc<Unit> {
    Arc::new(Unit::linear("ft", "foot", Dimension::singleton(BaseDimension::Length), Number::ratio(3048, 10000)))
  }

  fn inch() -> Arc<Unit> {
    Arc::new(Unit::linear("in", "inch", Dimension::singleton(BaseDimension::Length), Number::ratio(254, 10000)))
  }

  #[test]
  fn test_convert_single_unit() {
    let value = Value::Number { magnitude: Number::from(2i64), units: CompositeUnit::from(meter()) };
    let target = vec![UnitWithPower { unit: foot(), exponent: 1 }];
    let converted = convert_to_units(value, &target).unwrap();
    let (m, _) = converted.as_number().unwrap();
    assert_abs_diff_eq!(m.to_f64_or_nan(), 2.0 / 0.3048, epsilon = 1e-9);
  }

  #[test]
  fn test_convert_multi_unit_split() {
    let value = Value::Number { magnitude: Number::from(0.4826f64), units: CompositeUnit::from(meter()) };
    let target = vec![
      UnitWithPower { unit: foot(), exponent: 1 },
      UnitWithPower { unit: inch(), exponent: 1 },
    ];
    let converted = convert_to_units(value, &target).unwrap();
    match converted {
      Value::Composite { parts } => assert_eq!(parts.len(), 2),
      _ => panic!("expected composite"),
    }
  }

  #[test]
  fn test_dimension_mismatch() {
    let seconds = Arc::new(Unit::linear("s", "second", Dimension::singleton(BaseDimension::Time), Number::one()));
    let value = Value::Number { magnitude: Number::one(), units: CompositeUnit::from(meter()) };
    let target = vec![UnitWithPower { unit: seconds, exponent: 1 }];
    assert!(matches!(convert_to_units(value, &target), Err(RuntimeError::DimensionMismatch { .. })));
  }

  #[test]
  fn test_percentage_presentation() {
    let value = Value::number(Number::ratio(1, 4));
    let (converted, override_) = apply_presentation(&value, &PresentationFormat::Percentage).unwrap();
    assert!(override_.is_none());
    match converted {
      Value::Percentage { value, .. } => assert_eq!(value, Number::from(25i64)),
      _ => panic!("expected percentage"),
    }
  }

  #[test]
  fn test_property_extraction() {
    let date = time::Date::from_calendar_date(2024, time::Month::March, 15).unwrap();
    let value = Value::PlainDate(date);
    let day = extract_property(&value, &PropertyTarget::Day).unwrap();
    let (m, _) = day.as_number().unwrap();
    assert_eq!(m, &Number::from(15i64));
  }
}
