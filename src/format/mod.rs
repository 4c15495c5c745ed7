
//! Presentation formatting: renders an evaluated [`Value`](crate::eval::value::Value)
//! into the string a line result reports, honoring [`Settings`] and any
//! [`PresentationOverride`](crate::eval::conversion::PresentationOverride)
//! attached by a conversion target.

pub mod currency;
pub mod datetime;
pub mod number;
pub mod unit;

use crate::eval::conversion::PresentationOverride;
use crate::eval::value::Value;
use crate::settings::Settings;
use crate::tables::currency::CurrencyTable;

#[derive(Debug, Clone, thiserror::Error, PartialEq)]
#[error("failed to render date/time: {0}")]
pub struct FormatError(String);

impl From<time::error::InvalidFormatDescription> for FormatError {
  fn from(e: time::error::InvalidFormatDescription) -> Self {
    FormatError(e.to_string())
  }
}

impl From<time::error::Format> for FormatError {
  fn from(e: time::error::Format) -> Self {
    FormatError(e.to_string())
  }
}

pub fn format_value(value: &Value, settings: &Settings, currency_table: &CurrencyTable, override_: Option<&PresentationOverride>) -> Result<String, FormatError> {
  match value {
    Value::Number { magnitude, units } => {
      let rendered = number::format_number(magnitude, settings, override_);
      let unit_str = unit::format_unit(units, settings);
      if unit_str.is_empty() { Ok(rendered) } else { Ok(format!("{rendered} {unit_str}")) }
    }
    Value::Currency { amount, code, per_units } => Ok(currency::format_currency(amount, code, per_units, currency_table, settings)),
    Value::Boolean(b) => Ok(b.to_string()),
    Value::Composite { parts } => Ok(format_composite(parts, settings)),
    Value::Percentage { value, is_permille } => {
      let rendered = number::format_number(value, settings, override_);
      Ok(format!("{rendered}{}", if *is_permille { "\u{2030}" } else { "%" }))
    }
    Value::PlainDate(_) | Value::PlainTime(_) | Value::PlainDateTime(_) | Value::ZonedDateTime { .. } | Value::Instant(_) => {
      Ok(datetime::format_datetime(value, settings)?)
    }
  }
}

/// Degree/arcminute/arcsecond composites (`10° 30' 15"`) render with
/// prime-mark glyphs glued to the number, never as `"30 arcmin"` —
/// every other composite (`5 ft 10 in`) keeps the space-joined form.
fn arc_glyph(symbol: &str) -> Option<&'static str> {
  match symbol {
    "deg" => Some("\u{00B0}"),
    "arcmin" => Some("\u{2032}"),
    "arcsec" => Some("\u{2033}"),
    _ => None,
  }
}

fn format_composite(parts: &[(crate::eval::number::Number, crate::tables::unit::UnitWithPower)], settings: &Settings) -> String {
  let all_arc = parts.iter().all(|(_, unit)| arc_glyph(&unit.unit.symbol).is_some());
  parts.iter()
    .map(|(magnitude, unit)| {
      let rendered = number::format_number(magnitude, settings, None);
      if all_arc {
        let glyph = arc_glyph(&unit.unit.symbol).expect("checked above");
        format!("{rendered}{glyph}")
      } else {
        let composite = crate::tables::unit::CompositeUnit::new([unit.clone()]);
        let unit_str = unit::format_unit(&composite, settings);
        format!("{rendered} {unit_str}")
      }
    })
    .collect::<Vec<_>>()
    .join(" ")
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::eval::number::Number;

  fn empty_table() -> CurrencyTable {
    CurrencyTable::load(r#"{"currencies":[]}"#, r#"{"base":"USD","rates":{}}"#).unwrap()
  }

  #[test]
  fn test_format_dimensionless_number() {
    let value = Value::number(Number::from(42i64));
    assert_eq!(format_value(&value, &Settings::default(), &empty_table(), None).unwrap(), "42");
  }

  #[test]
  fn test_format_boolean() {
    let value = Value::Boolean(true);
    assert_eq!(format_value(&value, &Settings::default(), &empty_table(), None).unwrap(), "true");
  }

  #[test]
  fn test_format_percentage() {
    let value = Value::Percentage { value: Number::from(25i64), is_permille: false };
    assert_eq!(format_value(&value, &Settings::default(), &empty_table(), None).unwrap(), "25%");
  }

  #[test]
  fn test_format_degree_minute_second_composite() {
    use crate::tables::dimension::{BaseDimension, Dimension};
    use crate::tables::unit::{Unit, UnitWithPower};
    use std::sync::Arc;

    let deg = Arc::new(Unit::linear("deg", "degree", Dimension::singleton(BaseDimension::Angle), Number::one()));
    let arcmin = Arc::new(Unit::linear("arcmin", "arcminute", Dimension::singleton(BaseDimension::Angle), Number::ratio(1, 60)));
    let arcsec = Arc::new(Unit::linear("arcsec", "arcsecond", Dimension::singleton(BaseDimension::Angle), Number::ratio(1, 3600)));
    let value = Value::Composite {
      parts: vec![
        (Number::from(10i64), UnitWithPower { unit: deg, exponent: 1 }),
        (Number::from(30i64), UnitWithPower { unit: arcmin, exponent: 1 }),
        (Number::from(15i64), UnitWithPower { unit: arcsec, exponent: 1 }),
      ],
    };
    assert_eq!(format_value(&value, &Settings::default(), &empty_table(), None).unwrap(), "10\u{00B0} 30\u{2032} 15\u{2033}");
  }

  #[test]
  fn test_format_feet_inches_composite_keeps_space_joined_form() {
    use crate::tables::dimension::{BaseDimension, Dimension};
    use crate::tables::unit::{Unit, UnitWithPower};
    use std::sync::Arc;

    let ft = Arc::new(Unit::linear("ft", "foot", Dimension::singleton(BaseDimension::Length), Number::ratio(3048, 10000)));
    let inch = Arc::new(Unit::linear("in", "inch", Dimension::singleton(BaseDimension::Length), Number::ratio(254, 10000)));
    let value = Value::Composite {
      parts: vec![
        (Number::from(5i64), UnitWithPower { unit: ft, exponent: 1 }),
        (Number::from(10i64), UnitWithPower { unit: inch, exponent: 1 }),
      ],
    };
    assert_eq!(format_value(&value, &Settings::default(), &empty_table(), None).unwrap(), "5 ft 10 in");
  }
}
