
//! Unit rendering: symbol vs. display-name style, Unicode superscript
//! exponents, and space-joined composite factors.
//!
//! Grounded on `tables::unit::CompositeUnit`'s own `Display` impl
//! (space-joined factors, `^` exponents) and on the teacher's
//! `mode::display::unicode` alias tables, which translate ASCII names
//! to Unicode forms via a small lookup table — the superscript digit
//! map here follows the same "lookup table, not a formula" shape.

use crate::settings::{Settings, UnitDisplayStyle};
use crate::tables::unit::{CompositeUnit, UnitWithPower};

/// Positive-exponent factors are space-joined as a numerator; any
/// negative-exponent factors are joined after a single `/`, without
/// parens for exactly one denominator factor (`kg/person`) and with
/// parens for more than one (`USD/(person day)`), matching a rate
/// reading naturally rather than superscripting every divisor.
pub fn format_unit(unit: &CompositeUnit, settings: &Settings) -> String {
  let (positive, negative): (Vec<&UnitWithPower>, Vec<&UnitWithPower>) = unit.units().iter().partition(|f| f.exponent > 0);
  if negative.is_empty() {
    return positive.into_iter().map(|f| format_factor(f, f.exponent, settings)).collect::<Vec<_>>().join(" ");
  }
  if positive.is_empty() {
    return unit.units().iter().map(|f| format_factor(f, f.exponent, settings)).collect::<Vec<_>>().join(" ");
  }
  let numerator = positive.into_iter().map(|f| format_factor(f, f.exponent, settings)).collect::<Vec<_>>().join(" ");
  let denominator = negative.into_iter().map(|f| format_factor(f, f.exponent.abs(), settings)).collect::<Vec<_>>();
  if denominator.len() == 1 {
    format!("{numerator}/{}", denominator[0])
  } else {
    format!("{numerator}/({})", denominator.join(" "))
  }
}

/// Renders a currency's per-unit rate denominator as a trailing
/// `/person` or `/(day person)` suffix alone, with no numerator side —
/// a currency amount is never itself a factor in the `CompositeUnit`,
/// unlike `format_unit`'s mixed numerator/denominator case.
pub fn format_rate_denominator(per_units: &CompositeUnit, settings: &Settings) -> String {
  if per_units.is_empty() {
    return String::new();
  }
  let factors = per_units.units().iter().map(|f| format_factor(f, f.exponent.abs(), settings)).collect::<Vec<_>>();
  if factors.len() == 1 {
    format!("/{}", factors[0])
  } else {
    format!("/({})", factors.join(" "))
  }
}

fn format_factor(factor: &UnitWithPower, display_exponent: i64, settings: &Settings) -> String {
  let name = match settings.unit_display_style {
    UnitDisplayStyle::Symbol => factor.unit.symbol.clone(),
    UnitDisplayStyle::Name => pluralize(&factor.unit.display_name, display_exponent),
  };
  if display_exponent == 1 {
    name
  } else {
    format!("{name}{}", superscript(display_exponent))
  }
}

fn pluralize(display_name: &str, exponent: i64) -> String {
  if exponent.abs() == 1 {
    display_name.to_owned()
  } else {
    format!("{display_name}s")
  }
}

fn superscript(exponent: i64) -> String {
  let mut out = String::new();
  if exponent < 0 {
    out.push('\u{207B}');
  }
  for digit in exponent.unsigned_abs().to_string().chars() {
    out.push(superscript_digit(digit));
  }
  out
}

fn superscript_digit(digit: char) -> char {
  match digit {
    '0' => '\u{2070}',
    '1' => '\u{00B9}',
    '2' => '\u{00B2}',
    '3' => '\u{00B3}',
    '4' => '\u{2074}',
    '5' => '\u{2075}',
    '6' => '\u{2076}',
    '7' => '\u{2077}',
    '8' => '\u{2078}',
    '9' => '\u{2079}',
    other => other,
  }
}
