
//! Currency codes, symbols, and exchange rates. Currencies are not
//! physical units: their dimension is allocated dynamically (one axis
//! per ISO code, grounded on [`super::dimension::DynAxis::currency`]),
//! and conversion between them goes through a snapshot exchange-rate
//! table rather than a fixed scale factor.

use super::dimension::{DynAxis, Dimension};
use crate::eval::number::Number;

use serde::Deserialize;

use std::collections::HashMap;

#[derive(Debug, Clone, Deserialize)]
struct CurrencyRecord {
  code: String,
  symbol: String,
  name: String,
  minor_units: u32,
}

#[derive(Debug, Clone, Deserialize)]
struct CurrenciesFile {
  currencies: Vec<CurrencyRecord>,
}

#[derive(Debug, Clone, Deserialize)]
struct ExchangeRatesFile {
  base: String,
  rates: HashMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Currency {
  pub code: String,
  pub symbol: String,
  pub name: String,
  pub minor_units: u32,
}

impl Currency {
  pub fn dimension(&self) -> Dimension {
    Dimension::dynamic_singleton(DynAxis::currency(&self.code))
  }
}

/// How a textual currency marker (`$`, `USD`, `€`) resolved.
pub enum CurrencyResolution {
  /// An unambiguous ISO code or a symbol used by exactly one currency.
  Known(Currency),
  /// A symbol shared by more than one currency (e.g. `$`): arithmetic
  /// between two uses of the same symbol is well-typed without picking
  /// a code, but conversion to another currency is not possible.
  Ambiguous { symbol: String },
}

pub struct CurrencyTable {
  by_code: HashMap<String, Currency>,
  by_symbol: HashMap<String, Vec<String>>,
  exchange_rates: HashMap<String, f64>,
  rates_base: String,
}

/// An error raised when requesting an exchange rate between currencies
/// this table has no quote for.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("no exchange rate available for {from} to {to}")]
pub struct ExchangeRateUnavailable {
  pub from: String,
  pub to: String,
}

impl CurrencyTable {
  pub fn load(currencies_json: &str, rates_json: &str) -> Result<Self, serde_json::Error> {
    let currencies_file: CurrenciesFile = serde_json::from_str(currencies_json)?;
    let rates_file: ExchangeRatesFile = serde_json::from_str(rates_json)?;

    let mut by_code = HashMap::new();
    let mut by_symbol: HashMap<String, Vec<String>> = HashMap::new();
    for record in currencies_file.currencies {
      by_symbol.entry(record.symbol.clone()).or_default().push(record.code.clone());
      by_code.insert(record.code.clone(), Currency {
        code: record.code,
        symbol: record.symbol,
        name: record.name,
        minor_units: record.minor_units,
      });
    }

    tracing::info!(currencies = by_code.len(), "loaded currency table");

    Ok(Self {
      by_code,
      by_symbol,
      exchange_rates: rates_file.rates,
      rates_base: rates_file.base,
    })
  }

  pub fn resolve_code(&self, code: &str) -> Option<&Currency> {
    self.by_code.get(code)
  }

  /// Resolves a bare symbol (as opposed to an ISO code) to either a
  /// single known currency or, when the symbol names more than one
  /// currency, an [`CurrencyResolution::Ambiguous`] marker.
  pub fn resolve_symbol(&self, symbol: &str) -> Option<CurrencyResolution> {
    let codes = self.by_symbol.get(symbol)?;
    match codes.as_slice() {
      [] => None,
      [single] => self.by_code.get(single).cloned().map(CurrencyResolution::Known),
      _ => Some(CurrencyResolution::Ambiguous { symbol: symbol.to_owned() }),
    }
  }

  /// Converts an amount denominated in `from` into `to`, through the
  /// table's single base currency if neither side is the base.
  pub fn convert(&self, amount: &Number, from: &str, to: &str) -> Result<Number, ExchangeRateUnavailable> {
    if from == to {
      return Ok(amount.clone());
    }
    let unavailable = || ExchangeRateUnavailable { from: from.to_owned(), to: to.to_owned() };

    let in_base = if from == self.rates_base {
      amount.clone()
    } else {
      let rate = self.exchange_rates.get(from).ok_or_else(unavailable)?;
      amount.clone() / Number::from(*rate)
    };

    if to == self.rates_base {
      Ok(in_base)
    } else {
      let rate = self.exchange_rates.get(to).ok_or_else(unavailable)?;
      Ok(in_base * Number::from(*rate))
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use approx::assert_abs_diff_eq;

  const CURRENCIES: &str = r#"{
    "currencies": [
      { "code": "USD", "symbol": "$", "name": "US Dollar", "minor_units": 2 },
      { "code": "CAD", "symbol": "$", "name": "Canadian Dollar", "minor_units": 2 },
      { "code": "EUR", "symbol": "€", "name": "Euro", "minor_units": 2 },
      { "code": "JPY", "symbol": "¥", "name": "Japanese Yen", "minor_units": 0 }
    ]
  }"#;

  const RATES: &str = r#"{
    "base": "USD",
    "rates": { "EUR": 0.92, "JPY": 150.0 }
  }"#;

  #[test]
  fn test_resolve_unambiguous_symbol() {
    let table = CurrencyTable::load(CURRENCIES, RATES).unwrap();
    match table.resolve_symbol("€").unwrap() {
      CurrencyResolution::Known(currency) => assert_eq!(currency.code, "EUR"),
      CurrencyResolution::Ambiguous { .. } => panic!("expected unambiguous"),
    }
  }

  #[test]
  fn test_resolve_ambiguous_symbol() {
    let table = CurrencyTable::load(CURRENCIES, RATES).unwrap();
    match table.resolve_symbol("$").unwrap() {
      CurrencyResolution::Ambiguous { symbol } => assert_eq!(symbol, "$"),
      CurrencyResolution::Known(_) => panic!("expected ambiguous"),
    }
  }

  #[test]
  fn test_convert_through_base() {
    let table = CurrencyTable::load(CURRENCIES, RATES).unwrap();
    let converted = table.convert(&Number::from(10i64), "EUR", "JPY").unwrap();
    assert_abs_diff_eq!(converted.to_f64().unwrap(), 10.0 / 0.92 * 150.0, epsilon = 1e-9);
  }

  #[test]
  fn test_convert_unknown_is_error() {
    let table = CurrencyTable::load(CURRENCIES, RATES).unwrap();
    assert!(table.convert(&Number::from(10i64), "EUR", "GBP").is_err());
  }
}
