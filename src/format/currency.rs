
//! Currency rendering: rounds to the code's minor-unit precision and
//! formats as `<amount> <code>` (e.g. `1.00 USD`).
//!
//! Grounded loosely on currency formatters elsewhere in the pack (fixed
//! decimal places derived from the currency's minor-unit count, then
//! thousand-grouped the same way [`super::number`] groups a plain
//! number) — simplified to amount-then-code since the specification
//! doesn't ask for symbol prefixing the way a locale-aware formatter
//! would.

use crate::eval::number::Number;
use crate::settings::Settings;
use crate::tables::currency::CurrencyTable;
use crate::tables::unit::CompositeUnit;

use super::number::format_number;
use super::unit::format_rate_denominator;

/// Fallback when a code isn't in the loaded table at all (shouldn't
/// happen for a value the evaluator produced, but formatting must
/// never panic on a stray code).
const DEFAULT_MINOR_UNITS: u32 = 2;

/// `per_units` renders as a trailing rate suffix (`1.00 USD/person`);
/// empty for a plain amount.
pub fn format_currency(amount: &Number, code: &str, per_units: &CompositeUnit, table: &CurrencyTable, settings: &Settings) -> String {
  let decimals = table.resolve_code(code).map(|c| c.minor_units).unwrap_or(DEFAULT_MINOR_UNITS);
  let mut fixed_settings = settings.clone();
  fixed_settings.precision = crate::settings::Precision::Fixed(decimals);
  let rendered = format_number(amount, &fixed_settings, None);
  let suffix = format_rate_denominator(per_units, settings);
  format!("{rendered} {code}{suffix}")
}

#[cfg(test)]
mod tests {
  use super::*;

  const CURRENCIES: &str = r#"{
    "currencies": [
      { "code": "USD", "symbol": "$", "name": "US Dollar", "minor_units": 2 },
      { "code": "JPY", "symbol": "¥", "name": "Japanese Yen", "minor_units": 0 },
      { "code": "BHD", "symbol": "BD", "name": "Bahraini Dinar", "minor_units": 3 }
    ]
  }"#;

  const RATES: &str = r#"{ "base": "USD", "rates": { "JPY": 150.0, "BHD": 0.38 } }"#;

  fn table() -> CurrencyTable {
    CurrencyTable::load(CURRENCIES, RATES).unwrap()
  }

  #[test]
  fn test_format_usd_rounds_to_two_decimals() {
    let rendered = format_currency(&Number::from(1i64), "USD", &CompositeUnit::unitless(), &table(), &Settings::default());
    assert_eq!(rendered, "1.00 USD");
  }

  #[test]
  fn test_format_jpy_has_no_decimals() {
    let rendered = format_currency(&Number::from(500i64), "JPY", &CompositeUnit::unitless(), &table(), &Settings::default());
    assert_eq!(rendered, "500 JPY");
  }

  #[test]
  fn test_format_bhd_has_three_decimals() {
    let rendered = format_currency(&Number::ratio(5, 2), "BHD", &CompositeUnit::unitless(), &table(), &Settings::default());
    assert_eq!(rendered, "2.500 BHD");
  }

  #[test]
  fn test_format_unknown_code_falls_back_to_two_decimals() {
    let rendered = format_currency(&Number::from(1i64), "XYZ", &CompositeUnit::unitless(), &table(), &Settings::default());
    assert_eq!(rendered, "1.00 XYZ");
  }

  #[test]
  fn test_format_rate_appends_denominator_suffix() {
    use crate::tables::dimension::Dimension;
    use crate::tables::unit::{Unit, UnitWithPower};
    use std::sync::Arc;

    let person = Arc::new(Unit::linear("person", "person", Dimension::one(), Number::one()));
    let day = Arc::new(Unit::linear("day", "day", Dimension::one(), Number::from(86_400i64)));
    let per_units = CompositeUnit::new([
      UnitWithPower { unit: person, exponent: -1 },
      UnitWithPower { unit: day, exponent: -1 },
    ]);
    let rendered = format_currency(&Number::from(1i64), "USD", &per_units, &table(), &Settings::default());
    assert_eq!(rendered, "1.00 USD/(day person)");
  }
}
