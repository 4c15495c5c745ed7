
//! Date/time arithmetic and timezone conversion. Grounded on the
//! teacher's `expr::function::library::datetime` (`datetime_rel`,
//! `datetime_rel_seconds`, `tzconvert`, `simplify_year_month`): the
//! same calendar-vs-exact split (months/years walk the calendar,
//! everything else is an exact instant shift) and the same
//! month-overflow normalization, adapted from the teacher's two
//! separate `datetime_rel`/`datetime_rel_seconds` functions into one
//! `add_duration`/`subtract_datetimes` pair since this evaluator has
//! no notion of a "fractional flag" calculation mode to branch on.

use super::error::RuntimeError;
use super::value::Value;
use crate::eval::number::Number;
use crate::tables::unit::UnitWithPower;

use time::{Date, Duration, Month, OffsetDateTime, PrimitiveDateTime, Time};
use time::util::days_in_month;

/// `date + duration`. `unit` must carry pure time dimension (checked
/// by the caller, which resolves it against a dimension-matched
/// `CompositeUnit` before reaching here). Months and years shift the
/// calendar; every other time unit is an exact instant offset.
pub fn add_duration(value: Value, amount: &Number, unit: &UnitWithPower) -> Result<Value, RuntimeError> {
  match unit.unit.symbol.as_str() {
    "mo" => shift_calendar(value, require_integer(amount, "date addition")?),
    "yr" => shift_calendar(value, require_integer(amount, "date addition")?.checked_mul(12).ok_or_else(out_of_bounds)?),
    _ => {
      let seconds = unit.to_base(amount.clone());
      shift_instant(value, seconds)
    }
  }
}

fn shift_calendar(value: Value, delta_months: i64) -> Result<Value, RuntimeError> {
  let (date, rest) = split_date(value)?;
  let shifted = add_months(date, delta_months)?;
  Ok(rejoin_date(shifted, rest))
}

/// Adds `delta_months` to `date`, clamping the day to the target
/// month's length (e.g. Jan 31 + 1mo = Feb 28/29).
fn add_months(date: Date, delta_months: i64) -> Result<Date, RuntimeError> {
  let year = date.year() as i64;
  let month = i64::from(u8::from(date.month()));
  let total = year.checked_mul(12).and_then(|y| y.checked_add(month - 1)).and_then(|t| t.checked_add(delta_months)).ok_or_else(out_of_bounds)?;
  let new_year = total.div_euclid(12);
  let new_month_index = total.rem_euclid(12);
  let new_year = i32::try_from(new_year).map_err(|_| out_of_bounds())?;
  let month = Month::try_from((new_month_index + 1) as u8).expect("month index is between 0 and 11");
  let day = date.day().min(days_in_month(month, new_year));
  Date::from_calendar_date(new_year, month, day).map_err(|_| out_of_bounds())
}

fn shift_instant(value: Value, seconds: Number) -> Result<Value, RuntimeError> {
  let duration = number_to_duration(seconds)?;
  match value {
    Value::PlainDate(d) => {
      let dt = PrimitiveDateTime::new(d, Time::MIDNIGHT).checked_add(duration).ok_or_else(out_of_bounds)?;
      if dt.time() == Time::MIDNIGHT {
        Ok(Value::PlainDate(dt.date()))
      } else {
        Ok(Value::PlainDateTime(dt))
      }
    }
    Value::PlainTime(t) => {
      let total = t.as_hms_nano().0 as i64 * 3_600 + t.as_hms_nano().1 as i64 * 60 + t.as_hms_nano().2 as i64;
      let shifted = (total + duration.whole_seconds()).rem_euclid(86_400);
      Ok(Value::PlainTime(Time::from_hms(
        (shifted / 3_600) as u8,
        ((shifted / 60) % 60) as u8,
        (shifted % 60) as u8,
      ).expect("shifted seconds reduced modulo a day")))
    }
    Value::PlainDateTime(dt) => Ok(Value::PlainDateTime(dt.checked_add(duration).ok_or_else(out_of_bounds)?)),
    Value::ZonedDateTime { instant, zone_label } => {
      Ok(Value::ZonedDateTime { instant: instant.checked_add(duration).ok_or_else(out_of_bounds)?, zone_label })
    }
    Value::Instant(instant) => Ok(Value::Instant(instant.checked_add(duration).ok_or_else(out_of_bounds)?)),
    other => Err(type_mismatch(&other)),
  }
}

fn number_to_duration(seconds: Number) -> Result<Duration, RuntimeError> {
  if let Some(whole) = seconds.to_i64() {
    return Ok(Duration::seconds(whole));
  }
  let micros = (seconds * Number::from(1_000_000i64)).round().to_i64().ok_or_else(out_of_bounds)?;
  Ok(Duration::microseconds(micros))
}

fn require_integer(amount: &Number, function: &str) -> Result<i64, RuntimeError> {
  amount.to_i64().ok_or_else(|| RuntimeError::DomainError {
    function: function.to_owned(),
    reason: "calendar-unit shifts (months, years) require an integer count".to_owned(),
  })
}

/// Splits a datetime-bearing `Value` into its date and whatever else
/// (time-of-day, zone label) needs to be carried through a calendar
/// shift unchanged.
enum DateRest {
  None,
  Time(Time),
  Zoned { time: Time, zone_label: String },
}

fn split_date(value: Value) -> Result<(Date, DateRest), RuntimeError> {
  match value {
    Value::PlainDate(d) => Ok((d, DateRest::None)),
    Value::PlainDateTime(dt) => Ok((dt.date(), DateRest::Time(dt.time()))),
    Value::ZonedDateTime { instant, zone_label } => Ok((instant.date(), DateRest::Zoned { time: instant.time(), zone_label })),
    Value::Instant(instant) => Ok((instant.date(), DateRest::Time(instant.time()))),
    other => Err(type_mismatch(&other)),
  }
}

fn rejoin_date(date: Date, rest: DateRest) -> Value {
  match rest {
    DateRest::None => Value::PlainDate(date),
    DateRest::Time(time) => Value::PlainDateTime(PrimitiveDateTime::new(date, time)),
    DateRest::Zoned { time, zone_label } => {
      let offset = time::UtcOffset::from_whole_seconds(0).expect("zero offset is always valid");
      let instant = PrimitiveDateTime::new(date, time).assume_offset(offset);
      Value::ZonedDateTime { instant, zone_label }
    }
  }
}

/// `date - date`. Returns the difference as a `Value::Number` in days
/// when both sides have no time-of-day component, otherwise in
/// seconds (exact when the difference is a whole number of seconds).
pub fn subtract_datetimes(lhs: &Value, rhs: &Value) -> Result<Value, RuntimeError> {
  if let (Value::PlainDate(a), Value::PlainDate(b)) = (lhs, rhs) {
    let days = (*a - *b).whole_days();
    return Ok(Value::Number { magnitude: Number::from(days), units: day_unit() });
  }
  let a = as_instant(lhs)?;
  let b = as_instant(rhs)?;
  let diff = a - b;
  let whole_seconds = diff.whole_seconds();
  let subsec_micros = diff.subsec_microseconds();
  let magnitude = if subsec_micros == 0 {
    Number::from(whole_seconds)
  } else {
    Number::from(whole_seconds) + Number::from(i64::from(subsec_micros)) / Number::from(1_000_000i64)
  };
  Ok(Value::Number { magnitude, units: second_unit() })
}

fn day_unit() -> crate::tables::unit::CompositeUnit {
  crate::tables::unit::CompositeUnit::new([UnitWithPower { unit: builtin_unit("day", "day", 86_400), exponent: 1 }])
}

fn second_unit() -> crate::tables::unit::CompositeUnit {
  crate::tables::unit::CompositeUnit::new([UnitWithPower { unit: builtin_unit("s", "second", 1), exponent: 1 }])
}

fn builtin_unit(symbol: &str, display_name: &str, seconds: i64) -> std::sync::Arc<crate::tables::unit::Unit> {
  use crate::tables::dimension::{BaseDimension, Dimension};
  std::sync::Arc::new(crate::tables::unit::Unit::linear(symbol, display_name, Dimension::singleton(BaseDimension::Time), Number::from(seconds)))
}

/// Resolves a named or offset-expression timezone and re-expresses
/// `value`'s instant in that zone. A `PlainDate`/`PlainTime`/
/// `PlainDateTime` is first assumed to be in UTC (no ambient "local
/// zone" concept exists in a headless evaluator), matching the
/// specification's fallback for zone-naive values.
pub fn convert_timezone(value: Value, zone_text: &str) -> Result<Value, RuntimeError> {
  let offset_seconds = crate::tables::timezone::resolve(zone_text).map_err(|_| RuntimeError::TimezoneUnknown { text: zone_text.to_owned() })?;
  let offset = time::UtcOffset::from_whole_seconds(offset_seconds)
    .map_err(|_| RuntimeError::DomainError { function: "tzconvert".to_owned(), reason: format!("offset {offset_seconds} seconds is out of range") })?;
  let instant = as_instant(&value)?;
  let converted = instant.to_offset(offset);
  Ok(Value::ZonedDateTime { instant: converted, zone_label: zone_text.to_owned() })
}

fn as_instant(value: &Value) -> Result<OffsetDateTime, RuntimeError> {
  match value {
    Value::ZonedDateTime { instant, .. } | Value::Instant(instant) => Ok(*instant),
    Value::PlainDateTime(dt) => Ok(dt.assume_utc()),
    Value::PlainDate(d) => Ok(PrimitiveDateTime::new(*d, Time::MIDNIGHT).assume_utc()),
    other => Err(type_mismatch(other)),
  }
}

fn type_mismatch(value: &Value) -> RuntimeError {
  RuntimeError::TypeMismatch { expected: "a value with a date or time component".to_owned(), found: value.type_name().to_owned() }
}

fn out_of_bounds() -> RuntimeError {
  RuntimeError::DomainError { function: "date arithmetic".to_owned(), reason: "result is out of the representable date range".to_owned() }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn date(y: i32, m: Month, d: u8) -> Value {
    Value::PlainDate(Date::from_calendar_date(y, m, d).unwrap())
  }

  fn month_unit() -> UnitWithPower {
    UnitWithPower { unit: builtin_unit_symbol("mo"), exponent: 1 }
  }

  fn day_unit_power() -> UnitWithPower {
    UnitWithPower { unit: builtin_unit_symbol("day"), exponent: 1 }
  }

  fn builtin_unit_symbol(symbol: &str) -> std::sync::Arc<crate::tables::unit::Unit> {
    match symbol {
      "mo" => builtin_unit("mo", "month", 2_629_800),
      "day" => builtin_unit("day", "day", 86_400),
      _ => unreachable!(),
    }
  }

  #[test]
  fn test_add_whole_months_stays_in_month() {
    let result = add_duration(date(2024, Month::January, 15), &Number::from(1i64), &month_unit()).unwrap();
    assert_eq!(result, date(2024, Month::February, 15));
  }

  #[test]
  fn test_add_month_clamps_short_month() {
    let result = add_duration(date(2024, Month::January, 31), &Number::from(1i64), &month_unit()).unwrap();
    assert_eq!(result, date(2024, Month::February, 29)); // 2024 is a leap year
  }

  #[test]
  fn test_add_months_rolls_year_boundary() {
    let result = add_duration(date(2024, Month::December, 10), &Number::from(2i64), &month_unit()).unwrap();
    assert_eq!(result, date(2025, Month::February, 10));
  }

  #[test]
  fn test_add_days_is_exact() {
    let result = add_duration(date(2024, Month::January, 1), &Number::from(10i64), &day_unit_power()).unwrap();
    assert_eq!(result, date(2024, Month::January, 11));
  }

  #[test]
  fn test_subtract_dates_gives_days() {
    let diff = subtract_datetimes(&date(2024, Month::March, 1), &date(2024, Month::January, 1)).unwrap();
    let (magnitude, _) = diff.as_number().unwrap();
    assert_eq!(magnitude, &Number::from(60i64)); // Jan (31) + Feb (29, leap)
  }

  #[test]
  fn test_tzconvert_relabels_and_shifts_instant() {
    let instant = time::PrimitiveDateTime::new(
      Date::from_calendar_date(2024, Month::June, 1).unwrap(),
      time::Time::from_hms(12, 0, 0).unwrap(),
    ).assume_utc();
    let value = Value::Instant(instant);
    let converted = convert_timezone(value, "Tokyo").unwrap();
    match converted {
      Value::ZonedDateTime { instant: converted_instant, zone_label } => {
        assert_eq!(zone_label, "Tokyo");
        assert_eq!(converted_instant.unix_timestamp(), instant.unix_timestamp());
        assert_eq!(converted_instant.hour(), 21);
      }
      _ => panic!("expected ZonedDateTime"),
    }
  }

  #[test]
  fn test_non_integer_month_delta_rejected() {
    let result = add_duration(date(2024, Month::January, 1), &Number::ratio(3, 2), &month_unit());
    assert!(matches!(result, Err(RuntimeError::DomainError { .. })));
  }
}
