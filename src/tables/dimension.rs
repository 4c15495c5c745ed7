
//! Dimension vectors: the sole compatibility test for arithmetic and
//! conversion, independent of textual unit form.
//!
//! The nine fixed physical/pragmatic axes are stored inline (grounded
//! on the teacher's `units::dimension::Dimension`, a plain `[i64; 7]`
//! array); currency codes, ambiguous currency symbols, and unknown
//! user-typed units each get their own axis, allocated deterministically
//! by hashing their canonical text, and are stored as a sparse,
//! sorted tail so that two documents which never mention currencies at
//! all pay nothing for the extension.

use std::fmt::{self, Display, Formatter};

pub const NDIMS: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseDimension {
  Length,
  Mass,
  Time,
  Current,
  Temperature,
  AmountOfSubstance,
  LuminousIntensity,
  Information,
  Angle,
}

impl BaseDimension {
  pub const ALL: [BaseDimension; NDIMS] = [
    BaseDimension::Length,
    BaseDimension::Mass,
    BaseDimension::Time,
    BaseDimension::Current,
    BaseDimension::Temperature,
    BaseDimension::AmountOfSubstance,
    BaseDimension::LuminousIntensity,
    BaseDimension::Information,
    BaseDimension::Angle,
  ];

  fn index(self) -> usize {
    match self {
      BaseDimension::Length => 0,
      BaseDimension::Mass => 1,
      BaseDimension::Time => 2,
      BaseDimension::Current => 3,
      BaseDimension::Temperature => 4,
      BaseDimension::AmountOfSubstance => 5,
      BaseDimension::LuminousIntensity => 6,
      BaseDimension::Information => 7,
      BaseDimension::Angle => 8,
    }
  }
}

impl Display for BaseDimension {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    let name = match self {
      BaseDimension::Length => "length",
      BaseDimension::Mass => "mass",
      BaseDimension::Time => "time",
      BaseDimension::Current => "current",
      BaseDimension::Temperature => "temperature",
      BaseDimension::AmountOfSubstance => "amount",
      BaseDimension::LuminousIntensity => "intensity",
      BaseDimension::Information => "information",
      BaseDimension::Angle => "angle",
    };
    write!(f, "{name}")
  }
}

/// An axis allocated at runtime for a currency code, an ambiguous
/// currency symbol, or an unrecognized (user-defined) unit token. The
/// id is a stable FNV-1a hash of a namespaced key, so the same textual
/// unit always produces the same axis without any shared registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DynAxis(pub u32);

impl DynAxis {
  pub fn currency(code: &str) -> Self {
    Self(fnv1a(&format!("currency:{code}")))
  }

  /// A pseudo-dimension for a currency symbol (e.g. `$`) that maps to
  /// more than one currency code. Keyed by the symbol's codepoints, as
  /// described in the spec's glossary, so `$100 + $100` is well-typed
  /// without ever resolving which currency `$` means.
  pub fn ambiguous_symbol(symbol: &str) -> Self {
    let codepoints: String = symbol.chars().map(|c| format!("{:04x}", c as u32)).collect();
    Self(fnv1a(&format!("currency_symbol_{codepoints}")))
  }

  pub fn user_defined(token: &str) -> Self {
    Self(fnv1a(&format!("user_unit:{token}")))
  }
}

fn fnv1a(s: &str) -> u32 {
  const OFFSET_BASIS: u32 = 0x811c9dc5;
  const PRIME: u32 = 0x0100_0193;
  let mut hash = OFFSET_BASIS;
  for byte in s.bytes() {
    hash ^= u32::from(byte);
    hash = hash.wrapping_mul(PRIME);
  }
  hash
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dimension {
  fixed: [i64; NDIMS],
  // Invariant: sorted by axis id, no zero-exponent entries.
  dynamic: Vec<(DynAxis, i64)>,
}

impl Dimension {
  pub fn one() -> Self {
    Self::default()
  }

  pub fn is_one(&self) -> bool {
    self.fixed.iter().all(|x| *x == 0) && self.dynamic.is_empty()
  }

  pub fn singleton(base: BaseDimension) -> Self {
    let mut fixed = [0; NDIMS];
    fixed[base.index()] = 1;
    Self { fixed, dynamic: Vec::new() }
  }

  pub fn dynamic_singleton(axis: DynAxis) -> Self {
    Self { fixed: [0; NDIMS], dynamic: vec![(axis, 1)] }
  }

  pub fn get(&self, base: BaseDimension) -> i64 {
    self.fixed[base.index()]
  }

  pub fn get_dynamic(&self, axis: DynAxis) -> i64 {
    self.dynamic.iter().find(|(a, _)| *a == axis).map(|(_, e)| *e).unwrap_or(0)
  }

  pub fn components(&self) -> impl Iterator<Item = (BaseDimension, i64)> + '_ {
    BaseDimension::ALL.iter().copied().zip(self.fixed.iter().copied()).filter(|(_, x)| *x != 0)
  }

  pub fn pow(&self, power: i64) -> Self {
    let fixed = self.fixed.map(|x| x * power);
    let dynamic = self.dynamic.iter().map(|(a, e)| (*a, e * power)).collect();
    Self { fixed, dynamic }
  }

  fn combine(self, other: Self, sign: i64) -> Self {
    let fixed = crate::util::zip_with(self.fixed, other.fixed, |a, b| a + sign * b);
    let mut dynamic = self.dynamic;
    for (axis, exponent) in other.dynamic {
      match dynamic.iter_mut().find(|(a, _)| *a == axis) {
        Some((_, e)) => *e += sign * exponent,
        None => dynamic.push((axis, sign * exponent)),
      }
    }
    dynamic.retain(|(_, e)| *e != 0);
    dynamic.sort_by_key(|(a, _)| *a);
    Self { fixed, dynamic }
  }

  pub fn mul(self, other: Self) -> Self {
    self.combine(other, 1)
  }

  pub fn div(self, other: Self) -> Self {
    self.combine(other, -1)
  }

  /// Minimum of `self` and `other` per-axis (used to isolate the
  /// "positive-power part" of a composite unit).
  pub fn min(&self, other: &Self) -> Self {
    let fixed = crate::util::zip_with(self.fixed, other.fixed, |a, b| a.min(b));
    let mut dynamic: Vec<(DynAxis, i64)> = Vec::new();
    for (axis, e) in &self.dynamic {
      dynamic.push((*axis, (*e).min(other.get_dynamic(*axis))));
    }
    for (axis, e) in &other.dynamic {
      if !dynamic.iter().any(|(a, _)| a == axis) {
        dynamic.push((*axis, self.get_dynamic(*axis).min(*e)));
      }
    }
    dynamic.retain(|(_, e)| *e != 0);
    dynamic.sort_by_key(|(a, _)| *a);
    Self { fixed, dynamic }
  }

  pub fn max(&self, other: &Self) -> Self {
    let fixed = crate::util::zip_with(self.fixed, other.fixed, |a, b| a.max(b));
    let mut dynamic: Vec<(DynAxis, i64)> = Vec::new();
    for (axis, e) in &self.dynamic {
      dynamic.push((*axis, (*e).max(other.get_dynamic(*axis))));
    }
    for (axis, e) in &other.dynamic {
      if !dynamic.iter().any(|(a, _)| a == axis) {
        dynamic.push((*axis, self.get_dynamic(*axis).max(*e)));
      }
    }
    dynamic.retain(|(_, e)| *e != 0);
    dynamic.sort_by_key(|(a, _)| *a);
    Self { fixed, dynamic }
  }
}

impl From<BaseDimension> for Dimension {
  fn from(base: BaseDimension) -> Self {
    Dimension::singleton(base)
  }
}

impl Display for Dimension {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    let mut numerator = Vec::new();
    let mut denominator = Vec::new();
    for dim in BaseDimension::ALL {
      match self.get(dim) {
        0 => {}
        1 => numerator.push(dim.to_string()),
        -1 => denominator.push(dim.to_string()),
        power if power > 0 => numerator.push(format!("{dim}^{power}")),
        power if power < 0 => denominator.push(format!("{dim}^{}", -power)),
        _ => unreachable!(),
      }
    }
    for (axis, exponent) in &self.dynamic {
      let text = format!("axis#{}", axis.0);
      match *exponent {
        1 => numerator.push(text),
        e if e > 0 => numerator.push(format!("{text}^{e}")),
        e => denominator.push(format!("{text}^{}", -e)),
      }
    }
    if numerator.is_empty() {
      write!(f, "1")?;
    } else {
      write!(f, "{}", numerator.join(" "))?;
    }
    if !denominator.is_empty() {
      write!(f, " / {}", denominator.join(" "))?;
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_singleton() {
    let d = Dimension::singleton(BaseDimension::Time);
    assert_eq!(d.get(BaseDimension::Time), 1);
    assert_eq!(d.get(BaseDimension::Length), 0);
  }

  #[test]
  fn test_mul_div() {
    let length = Dimension::singleton(BaseDimension::Length);
    let time = Dimension::singleton(BaseDimension::Time);
    let speed = length.clone().div(time.clone());
    assert_eq!(speed.get(BaseDimension::Length), 1);
    assert_eq!(speed.get(BaseDimension::Time), -1);
    let back = speed.mul(time);
    assert_eq!(back, length);
  }

  #[test]
  fn test_pow() {
    let area = Dimension::singleton(BaseDimension::Length).pow(2);
    assert_eq!(area.get(BaseDimension::Length), 2);
  }

  #[test]
  fn test_dynamic_axes_distinct_currencies() {
    let usd = Dimension::dynamic_singleton(DynAxis::currency("USD"));
    let eur = Dimension::dynamic_singleton(DynAxis::currency("EUR"));
    assert_ne!(usd, eur);
    assert_eq!(usd, Dimension::dynamic_singleton(DynAxis::currency("USD")));
  }

  #[test]
  fn test_ambiguous_symbol_stable() {
    let a = DynAxis::ambiguous_symbol("$");
    let b = DynAxis::ambiguous_symbol("$");
    assert_eq!(a, b);
    let c = DynAxis::ambiguous_symbol("£");
    assert_ne!(a, c);
  }

  #[test]
  fn test_user_defined_units_distinct() {
    let widgets = Dimension::dynamic_singleton(DynAxis::user_defined("widget"));
    let gadgets = Dimension::dynamic_singleton(DynAxis::user_defined("gadget"));
    assert_ne!(widgets, gadgets);
  }

  #[test]
  fn test_is_one() {
    assert!(Dimension::one().is_one());
    assert!(!Dimension::singleton(BaseDimension::Mass).is_one());
  }
}
