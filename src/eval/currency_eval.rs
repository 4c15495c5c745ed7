
//! Cross-currency reconciliation, layered over [`arithmetic`] and
//! [`crate::tables::currency::CurrencyTable`]. `arithmetic::add`/
//! `subtract` only ever see a single currency code; this module is
//! what resolves two differing codes (or an ambiguous shared symbol)
//! into something `arithmetic` can combine directly, and what
//! performs an explicit `to EUR`-style conversion target.
//!
//! Grounded on the same "small lookup-backed layer above the pure
//! arithmetic core" shape as [`super::conversion`], since currency
//! conversion is dimensionally identical to a unit conversion except
//! the factor comes from a live exchange-rate table rather than a
//! fixed scale.

use super::arithmetic;
use super::error::RuntimeError;
use super::value::Value;
use crate::eval::number::Number;
use crate::tables::currency::CurrencyTable;

/// Converts `amount` (denominated in `from_code`) into `to_code`,
/// routing through the table's base currency when neither side is it.
pub fn convert(table: &CurrencyTable, amount: &Number, from_code: &str, to_code: &str) -> Result<Number, RuntimeError> {
  Ok(table.convert(amount, from_code, to_code)?)
}

/// Reconciles two currency operands onto a common code before handing
/// them to [`arithmetic::add`]/[`arithmetic::subtract`]. Converts the
/// right-hand operand into the left-hand operand's code.
pub fn reconcile_for_addition(table: &CurrencyTable, lhs: Value, rhs: Value, is_sub: bool) -> Result<Value, RuntimeError> {
  let (lhs, rhs) = match (lhs, rhs) {
    (Value::Currency { amount: la, code: lc, per_units: lp }, Value::Currency { amount: ra, code: rc, per_units: rp }) if lc != rc => {
      let ra_in_lc = convert(table, &ra, &rc, &lc)?;
      (Value::Currency { amount: la, code: lc.clone(), per_units: lp }, Value::Currency { amount: ra_in_lc, code: lc, per_units: rp })
    }
    pair => pair,
  };
  if is_sub { arithmetic::subtract(lhs, rhs) } else { arithmetic::add(lhs, rhs) }
}

/// Applies an explicit `to <CODE>` conversion target.
pub fn convert_to_code(table: &CurrencyTable, value: Value, target_code: &str) -> Result<Value, RuntimeError> {
  match value {
    Value::Currency { amount, code, per_units } => {
      let converted = convert(table, &amount, &code, target_code)?;
      Ok(Value::Currency { amount: converted, code: target_code.to_owned(), per_units })
    }
    other => Err(RuntimeError::TypeMismatch { expected: "Currency".to_owned(), found: other.type_name().to_owned() }),
  }
}

/// Resolves a same-symbol ambiguous-currency pair. Addition between
/// two uses of the same ambiguous symbol is permitted without ever
/// picking a code (their shared placeholder dimension already makes
/// them compatible in `arithmetic`); converting one to a *different*
/// currency is refused, since there is no rate to quote an ambiguous
/// symbol against.
pub fn reject_ambiguous_conversion(symbol: &str) -> RuntimeError {
  RuntimeError::DomainError {
    function: "to".to_owned(),
    reason: format!("the symbol {symbol:?} is shared by more than one currency; numeric conversion requires an explicit code"),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::tables::unit::CompositeUnit;

  const CURRENCIES: &str = r#"{
    "currencies": [
      { "code": "USD", "symbol": "$", "name": "US Dollar", "minor_units": 2 },
      { "code": "EUR", "symbol": "€", "name": "Euro", "minor_units": 2 }
    ]
  }"#;

  const RATES: &str = r#"{
    "base": "USD",
    "rates": { "EUR": 0.5 }
  }"#;

  fn table() -> CurrencyTable {
    CurrencyTable::load(CURRENCIES, RATES).unwrap()
  }

  #[test]
  fn test_convert_direct_pair() {
    let converted = convert(&table(), &Number::from(10i64), "USD", "EUR").unwrap();
    assert_eq!(converted, Number::from(5i64));
  }

  #[test]
  fn test_convert_inverse_pair() {
    let converted = convert(&table(), &Number::from(5i64), "EUR", "USD").unwrap();
    assert_eq!(converted, Number::from(10i64));
  }

  #[test]
  fn test_reconcile_mismatched_codes_before_addition() {
    let usd = Value::Currency { amount: Number::from(10i64), code: "USD".to_owned(), per_units: CompositeUnit::unitless() };
    let eur = Value::Currency { amount: Number::from(5i64), code: "EUR".to_owned(), per_units: CompositeUnit::unitless() };
    let result = reconcile_for_addition(&table(), usd, eur, false).unwrap();
    assert_eq!(result, Value::Currency { amount: Number::from(20i64), code: "USD".to_owned(), per_units: CompositeUnit::unitless() });
  }

  #[test]
  fn test_same_code_addition_skips_table() {
    let a = Value::Currency { amount: Number::from(10i64), code: "USD".to_owned(), per_units: CompositeUnit::unitless() };
    let b = Value::Currency { amount: Number::from(3i64), code: "USD".to_owned(), per_units: CompositeUnit::unitless() };
    let result = reconcile_for_addition(&table(), a, b, false).unwrap();
    assert_eq!(result, Value::Currency { amount: Number::from(13i64), code: "USD".to_owned(), per_units: CompositeUnit::unitless() });
  }

  #[test]
  fn test_convert_to_code() {
    let usd = Value::Currency { amount: Number::from(20i64), code: "USD".to_owned(), per_units: CompositeUnit::unitless() };
    let result = convert_to_code(&table(), usd, "EUR").unwrap();
    assert_eq!(result, Value::Currency { amount: Number::from(10i64), code: "EUR".to_owned(), per_units: CompositeUnit::unitless() });
  }

  #[test]
  fn test_unknown_rate_errors() {
    let usd = Value::Currency { amount: Number::from(1i64), code: "USD".to_owned(), per_units: CompositeUnit::unitless() };
    assert!(matches!(convert_to_code(&table(), usd, "GBP"), Err(RuntimeError::ExchangeRateUnavailable { .. })));
  }
}
