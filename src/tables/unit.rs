
//! Units and unit compositions, specialized to [`Number`](crate::eval::number::Number)
//! rather than generic over a scalar type — the teacher's
//! `units::unit::Unit<T>`/`units::composite::CompositeUnit<T>` are
//! generic because the teacher supports several numeric towers
//! (complex, quaternion, matrix); this spec has exactly one.

use super::dimension::Dimension;
use crate::eval::number::Number;

use itertools::Itertools;

use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitOrigin {
  Builtin,
  UserDefined,
}

/// A named quantity in some [`Dimension`]. Conversion to the
/// dimension's base unit is `base = raw * scale + offset`; `offset` is
/// nonzero only for affine (temperature-style) units.
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
  pub symbol: String,
  pub display_name: String,
  pub dimension: Dimension,
  pub scale: Number,
  pub offset: Number,
  pub origin: UnitOrigin,
}

impl Unit {
  pub fn linear(symbol: impl Into<String>, display_name: impl Into<String>, dimension: Dimension, scale: Number) -> Self {
    Self {
      symbol: symbol.into(),
      display_name: display_name.into(),
      dimension,
      scale,
      offset: Number::zero(),
      origin: UnitOrigin::Builtin,
    }
  }

  pub fn affine(symbol: impl Into<String>, display_name: impl Into<String>, dimension: Dimension, scale: Number, offset: Number) -> Self {
    Self {
      symbol: symbol.into(),
      display_name: display_name.into(),
      dimension,
      scale,
      offset,
      origin: UnitOrigin::Builtin,
    }
  }

  pub fn user_defined(token: impl Into<String>) -> Self {
    let token = token.into();
    Self {
      symbol: token.clone(),
      display_name: token.clone(),
      dimension: Dimension::dynamic_singleton(super::dimension::DynAxis::user_defined(&token)),
      scale: Number::one(),
      offset: Number::zero(),
      origin: UnitOrigin::UserDefined,
    }
  }

  pub fn is_affine(&self) -> bool {
    !self.offset.is_zero()
  }

  pub fn to_base(&self, amount: Number) -> Number {
    amount * self.scale.clone() + self.offset.clone()
  }

  pub fn from_base(&self, amount: Number) -> Number {
    (amount - self.offset.clone()) / self.scale.clone()
  }
}

impl Display for Unit {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    write!(f, "{}", self.symbol)
  }
}

/// A named unit raised to an integer power. Units are reference
/// counted since the same [`Unit`] definition is shared by every
/// composition built from the table.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitWithPower {
  pub unit: Arc<Unit>,
  pub exponent: i64,
}

impl UnitWithPower {
  pub fn dimension(&self) -> Dimension {
    self.unit.dimension.pow(self.exponent)
  }

  /// Applies this factor (to the given power) going from this unit
  /// toward the base. Affine units may only appear with exponent `±1`
  /// in any composition that actually uses their offset; callers
  /// enforce this at parse time (composite unit grammar), so here we
  /// apply the offset only when `exponent == 1` or `-1`.
  pub fn to_base(&self, amount: Number) -> Number {
    if self.exponent == 1 {
      return self.unit.to_base(amount);
    }
    if self.exponent == -1 {
      return self.unit.from_base(amount);
    }
    let scale_pow = self.unit.scale.powi(self.exponent);
    amount * scale_pow
  }

  pub fn from_base(&self, amount: Number) -> Number {
    if self.exponent == 1 {
      return self.unit.from_base(amount);
    }
    if self.exponent == -1 {
      return self.unit.to_base(amount);
    }
    let scale_pow = self.unit.scale.powi(-self.exponent);
    amount * scale_pow
  }
}

impl Display for UnitWithPower {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    if self.exponent == 1 {
      write!(f, "{}", self.unit)
    } else {
      write!(f, "{}^{}", self.unit, self.exponent)
    }
  }
}

/// A composite unit is a formal product and quotient of named units,
/// stored sorted by symbol with like units merged — grounded on the
/// teacher's `units::composite::CompositeUnit`.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeUnit {
  elements: Vec<UnitWithPower>,
}

impl CompositeUnit {
  pub fn new(inputs: impl IntoIterator<Item = UnitWithPower>) -> Self {
    let mut grouped: Vec<UnitWithPower> = Vec::new();
    for input in inputs {
      match grouped.iter_mut().find(|u| u.unit.symbol == input.unit.symbol) {
        Some(existing) => existing.exponent += input.exponent,
        None => grouped.push(input),
      }
    }
    grouped.retain(|u| u.exponent != 0);
    grouped.sort_by(|a, b| a.unit.symbol.cmp(&b.unit.symbol));
    Self { elements: grouped }
  }

  pub fn unitless() -> Self {
    Self::new([])
  }

  pub fn is_empty(&self) -> bool {
    self.elements.is_empty()
  }

  pub fn units(&self) -> &[UnitWithPower] {
    &self.elements
  }

  pub fn into_inner(self) -> Vec<UnitWithPower> {
    self.elements
  }

  pub fn recip(mut self) -> Self {
    for elem in &mut self.elements {
      elem.exponent = -elem.exponent;
    }
    self
  }

  pub fn to_base(&self, mut amount: Number) -> Number {
    for elem in &self.elements {
      amount = elem.to_base(amount);
    }
    amount
  }

  pub fn from_base(&self, mut amount: Number) -> Number {
    for elem in &self.elements {
      amount = elem.from_base(amount);
    }
    amount
  }

  pub fn dimension(&self) -> Dimension {
    self.elements.iter().map(UnitWithPower::dimension).fold(Dimension::one(), Dimension::mul)
  }

  pub fn mul(self, other: Self) -> Self {
    let mut elements = self.elements;
    elements.extend(other.elements);
    Self::new(elements)
  }

  pub fn div(self, other: Self) -> Self {
    self.mul(other.recip())
  }

  pub fn pow(self, exponent: i64) -> Self {
    Self::new(self.elements.into_iter().map(|u| UnitWithPower { unit: u.unit, exponent: u.exponent * exponent }))
  }

  /// True if every element is a linear (non-affine) unit, or there is
  /// exactly one affine unit at power `±1` and nothing else — the only
  /// shapes in which an affine unit composition is meaningful.
  pub fn is_well_formed_affine(&self) -> bool {
    let affine_count = self.elements.iter().filter(|u| u.unit.is_affine()).count();
    match affine_count {
      0 => true,
      1 => self.elements.len() == 1 && self.elements[0].exponent.abs() == 1,
      _ => false,
    }
  }
}

impl From<Unit> for CompositeUnit {
  fn from(unit: Unit) -> Self {
    CompositeUnit::new([UnitWithPower { unit: Arc::new(unit), exponent: 1 }])
  }
}

impl From<Arc<Unit>> for CompositeUnit {
  fn from(unit: Arc<Unit>) -> Self {
    CompositeUnit::new([UnitWithPower { unit, exponent: 1 }])
  }
}

impl Display for CompositeUnit {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    if self.elements.is_empty() {
      write!(f, "1")
    } else {
      write!(f, "{}", self.elements.iter().map(|u| u.to_string()).join(" "))
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::tables::dimension::BaseDimension;

  fn meters() -> Arc<Unit> {
    Arc::new(Unit::linear("m", "meter", Dimension::singleton(BaseDimension::Length), Number::one()))
  }

  fn seconds() -> Arc<Unit> {
    Arc::new(Unit::linear("s", "second", Dimension::singleton(BaseDimension::Time), Number::one()))
  }

  #[test]
  fn test_composite_merges_like_units() {
    let unit = CompositeUnit::new([
      UnitWithPower { unit: meters(), exponent: 2 },
      UnitWithPower { unit: meters(), exponent: 1 },
    ]);
    assert_eq!(unit.units(), &[UnitWithPower { unit: meters(), exponent: 3 }]);
  }

  #[test]
  fn test_composite_dimension() {
    let unit = CompositeUnit::new([
      UnitWithPower { unit: meters(), exponent: 1 },
      UnitWithPower { unit: seconds(), exponent: -1 },
    ]);
    assert_eq!(unit.dimension(), Dimension::singleton(BaseDimension::Length).div(Dimension::singleton(BaseDimension::Time)));
  }

  #[test]
  fn test_recip() {
    let unit = CompositeUnit::from(meters()).recip();
    assert_eq!(unit.units()[0].exponent, -1);
  }

  #[test]
  fn test_display() {
    let unit = CompositeUnit::new([
      UnitWithPower { unit: meters(), exponent: 1 },
      UnitWithPower { unit: seconds(), exponent: -1 },
    ]);
    assert_eq!(unit.to_string(), "m s^-1");
  }
}
