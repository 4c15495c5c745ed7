
//! The immutable, shareable bundle of every lookup table the evaluator
//! and formatter need: units, prefixes, constants, currencies,
//! timezones. Built once and handed around as an `Arc`, matching the
//! concurrency shape the teacher gives its own long-lived shared
//! state (`state::AppState`): read-only after construction, `Send +
//! Sync`, cheap to clone.

use super::currency::CurrencyTable;
use super::unit::Unit;
use super::{constants, timezone, units_data};

use std::collections::HashMap;
use std::sync::Arc;

const CURRENCIES_JSON: &str = include_str!("../../data/currencies.json");
const EXCHANGE_RATES_JSON: &str = include_str!("../../data/exchange-rates.json");

pub struct TableSet {
  units: HashMap<&'static str, Arc<Unit>>,
  currencies: CurrencyTable,
}

impl TableSet {
  /// Builds the full table set from the bundled data files. This is
  /// the one place heap allocation for the "static" lookup data
  /// happens; callers construct it once per process (or once per test)
  /// and share it via `Arc`.
  pub fn load() -> Result<Arc<Self>, serde_json::Error> {
    let units = units_data::build_unit_table();
    tracing::info!(unit_count = units.len(), "loaded builtin unit table");
    let currencies = CurrencyTable::load(CURRENCIES_JSON, EXCHANGE_RATES_JSON)?;
    Ok(Arc::new(Self { units, currencies }))
  }

  pub fn unit(&self, symbol: &str) -> Option<&Arc<Unit>> {
    self.units.get(symbol)
  }

  pub fn is_known_unit_symbol(&self, symbol: &str) -> bool {
    self.units.contains_key(symbol)
  }

  pub fn currencies(&self) -> &CurrencyTable {
    &self.currencies
  }

  pub fn constant(&self, name: &str) -> Option<crate::eval::number::Number> {
    constants::lookup(name)
  }

  pub fn resolve_timezone(&self, text: &str) -> Result<i32, timezone::TimezoneUnknown> {
    timezone::resolve(text)
  }

  /// Looks up a unit symbol, first trying it as-is and then stripping
  /// an SI or binary prefix greedily, matching scenario 1 of the
  /// testable properties (`Pg` is peta-gram, `pg` is pico-gram).
  /// Returns the base unit together with the exact multiplier the
  /// prefix contributes (`1` when there was no prefix).
  pub fn resolve_unit_token(&self, token: &str) -> Option<(Arc<Unit>, crate::eval::number::Number)> {
    use crate::eval::number::Number;
    use num::pow::Pow;
    use num::{BigInt, BigRational};

    if let Some(unit) = self.unit(token) {
      return Some((Arc::clone(unit), Number::one()));
    }
    let known = |symbol: &str| self.is_known_unit_symbol(symbol) && units_data::si_prefixable(symbol);
    if let Some((exponent, rest)) = super::prefix::strip_si_prefix(token, &known) {
      if let Some(unit) = self.unit(rest) {
        let multiplier = if exponent >= 0 {
          Number::from(BigRational::from_integer(BigInt::from(10).pow(exponent as u32)))
        } else {
          Number::from(BigRational::new(BigInt::from(1), BigInt::from(10).pow((-exponent) as u32)))
        };
        return Some((Arc::clone(unit), multiplier));
      }
    }
    let known_binary = |symbol: &str| self.is_known_unit_symbol(symbol) && units_data::binary_prefixable(symbol);
    if let Some((exponent, rest)) = super::prefix::strip_binary_prefix(token, &known_binary) {
      if let Some(unit) = self.unit(rest) {
        let multiplier = Number::from(BigInt::from(1024).pow(exponent as u32));
        return Some((Arc::clone(unit), multiplier));
      }
    }
    None
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use approx::assert_abs_diff_eq;

  #[test]
  fn test_load_succeeds() {
    let tables = TableSet::load().unwrap();
    assert!(tables.unit("m").is_some());
  }

  #[test]
  fn test_resolve_prefixed_unit() {
    let tables = TableSet::load().unwrap();
    let (unit, multiplier) = tables.resolve_unit_token("km").unwrap();
    assert_eq!(unit.symbol, "m");
    assert_eq!(multiplier.to_f64().unwrap(), 1_000.0);
  }

  #[test]
  fn test_resolve_peta_vs_pico_gram() {
    let tables = TableSet::load().unwrap();
    let (_, peta) = tables.resolve_unit_token("Pg").unwrap();
    let (_, pico) = tables.resolve_unit_token("pg").unwrap();
    assert_eq!(peta.to_f64().unwrap(), 1e15);
    assert_abs_diff_eq!(pico.to_f64().unwrap(), 1e-12, epsilon = 1e-24);
  }
}
