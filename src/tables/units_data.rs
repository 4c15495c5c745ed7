
//! Bundled builtin unit table. Values are grounded on the teacher's
//! `units::parsing::default_parser::default_units_table`, which lists
//! exactly this kind of unit/dimension/factor triple; we reproduce the
//! same constants (feet, inches, acres, ...) and extend with
//! information units and an explicit affine temperature pair, since
//! the teacher represents temperature as a separate "tagged" type that
//! this spec folds back into the ordinary unit table via `Unit::affine`.

use super::dimension::{BaseDimension, Dimension};
use super::unit::{Unit, UnitOrigin};
use crate::eval::number::Number;

use num::BigRational;

use std::collections::HashMap;
use std::sync::Arc;

/// A unit definition with an exact rational scale factor, expressed as
/// `numer/denom`, const-constructible so it can live in a `phf::Map`.
#[derive(Clone, Copy)]
pub struct ExactUnitSpec {
  pub symbol: &'static str,
  pub display_name: &'static str,
  pub dim: [i64; 9],
  pub numer: i64,
  pub denom: i64,
}

/// A unit definition whose scale is irrational (e.g. degrees, which
/// convert to radians via a factor of `pi/180`) and is therefore
/// stored as an `f64` rather than an exact ratio.
#[derive(Clone, Copy)]
pub struct InexactUnitSpec {
  pub symbol: &'static str,
  pub display_name: &'static str,
  pub dim: [i64; 9],
  pub scale: f64,
}

const fn dim(length: i64, mass: i64, time: i64, current: i64, temperature: i64, amount: i64, luminous: i64, information: i64, angle: i64) -> [i64; 9] {
  [length, mass, time, current, temperature, amount, luminous, information, angle]
}

const LENGTH: [i64; 9] = dim(1, 0, 0, 0, 0, 0, 0, 0, 0);
const MASS: [i64; 9] = dim(0, 1, 0, 0, 0, 0, 0, 0, 0);
const TIME: [i64; 9] = dim(0, 0, 1, 0, 0, 0, 0, 0, 0);
const CURRENT: [i64; 9] = dim(0, 0, 0, 1, 0, 0, 0, 0, 0);
const TEMPERATURE: [i64; 9] = dim(0, 0, 0, 0, 1, 0, 0, 0, 0);
const AMOUNT: [i64; 9] = dim(0, 0, 0, 0, 0, 1, 0, 0, 0);
const LUMINOUS: [i64; 9] = dim(0, 0, 0, 0, 0, 0, 1, 0, 0);
const INFORMATION: [i64; 9] = dim(0, 0, 0, 0, 0, 0, 0, 1, 0);
const ANGLE: [i64; 9] = dim(0, 0, 0, 0, 0, 0, 0, 0, 1);
const AREA: [i64; 9] = dim(2, 0, 0, 0, 0, 0, 0, 0, 0);
const VOLUME: [i64; 9] = dim(3, 0, 0, 0, 0, 0, 0, 0, 0);
const FORCE: [i64; 9] = dim(1, 1, -2, 0, 0, 0, 0, 0, 0);
const ENERGY: [i64; 9] = dim(2, 1, -2, 0, 0, 0, 0, 0, 0);
const SPEED: [i64; 9] = dim(1, 0, -1, 0, 0, 0, 0, 0, 0);
const NONE: [i64; 9] = dim(0, 0, 0, 0, 0, 0, 0, 0, 0);

/// Exact-scale units: base units of each physical dimension plus
/// every derived unit whose conversion factor is a plain fraction.
pub static EXACT_UNITS: &[ExactUnitSpec] = &[
  // Length, base = meter
  ExactUnitSpec { symbol: "m", display_name: "meter", dim: LENGTH, numer: 1, denom: 1 },
  ExactUnitSpec { symbol: "in", display_name: "inch", dim: LENGTH, numer: 254, denom: 10_000 },
  ExactUnitSpec { symbol: "ft", display_name: "foot", dim: LENGTH, numer: 3_048, denom: 10_000 },
  ExactUnitSpec { symbol: "yd", display_name: "yard", dim: LENGTH, numer: 9_144, denom: 10_000 },
  ExactUnitSpec { symbol: "mi", display_name: "mile", dim: LENGTH, numer: 1_609_344, denom: 1_000 },
  ExactUnitSpec { symbol: "nmi", display_name: "nautical mile", dim: LENGTH, numer: 1_852, denom: 1 },
  ExactUnitSpec { symbol: "fath", display_name: "fathom", dim: LENGTH, numer: 18_288, denom: 10_000 },
  ExactUnitSpec { symbol: "fur", display_name: "furlong", dim: LENGTH, numer: 201_168, denom: 1_000 },
  ExactUnitSpec { symbol: "mil", display_name: "mil", dim: LENGTH, numer: 254, denom: 10_000_000 },
  ExactUnitSpec { symbol: "au", display_name: "astronomical unit", dim: LENGTH, numer: 149_597_870_700, denom: 1 },
  ExactUnitSpec { symbol: "pc", display_name: "parsec", dim: LENGTH, numer: 30_856_775_814_913_673, denom: 1 },
  // Time, base = second
  ExactUnitSpec { symbol: "s", display_name: "second", dim: TIME, numer: 1, denom: 1 },
  ExactUnitSpec { symbol: "sec", display_name: "second", dim: TIME, numer: 1, denom: 1 },
  ExactUnitSpec { symbol: "min", display_name: "minute", dim: TIME, numer: 60, denom: 1 },
  ExactUnitSpec { symbol: "hr", display_name: "hour", dim: TIME, numer: 3_600, denom: 1 },
  ExactUnitSpec { symbol: "day", display_name: "day", dim: TIME, numer: 86_400, denom: 1 },
  ExactUnitSpec { symbol: "wk", display_name: "week", dim: TIME, numer: 604_800, denom: 1 },
  ExactUnitSpec { symbol: "mo", display_name: "month", dim: TIME, numer: 2_629_800, denom: 1 },
  ExactUnitSpec { symbol: "yr", display_name: "year", dim: TIME, numer: 31_557_600, denom: 1 },
  // Mass, base = gram (matches the teacher's convention: grams rather
  // than kilograms, so that `k` composes as an ordinary SI prefix).
  ExactUnitSpec { symbol: "g", display_name: "gram", dim: MASS, numer: 1, denom: 1 },
  ExactUnitSpec { symbol: "lb", display_name: "pound", dim: MASS, numer: 45_359_237, denom: 100_000 },
  ExactUnitSpec { symbol: "oz", display_name: "ounce", dim: MASS, numer: 45_359_237, denom: 1_600_000 },
  ExactUnitSpec { symbol: "ton", display_name: "ton", dim: MASS, numer: 45_359_237, denom: 50 },
  ExactUnitSpec { symbol: "t", display_name: "tonne", dim: MASS, numer: 1_000_000, denom: 1 },
  // Electrical current, luminous intensity, amount of substance
  ExactUnitSpec { symbol: "A", display_name: "ampere", dim: CURRENT, numer: 1, denom: 1 },
  ExactUnitSpec { symbol: "cd", display_name: "candela", dim: LUMINOUS, numer: 1, denom: 1 },
  ExactUnitSpec { symbol: "mol", display_name: "mole", dim: AMOUNT, numer: 1, denom: 1 },
  // Temperature deltas (linear; absolute temperatures are affine, see
  // AFFINE_UNITS below)
  ExactUnitSpec { symbol: "K", display_name: "kelvin", dim: TEMPERATURE, numer: 1, denom: 1 },
  ExactUnitSpec { symbol: "dC", display_name: "degree Celsius delta", dim: TEMPERATURE, numer: 1, denom: 1 },
  ExactUnitSpec { symbol: "dF", display_name: "degree Fahrenheit delta", dim: TEMPERATURE, numer: 5, denom: 9 },
  // Information
  ExactUnitSpec { symbol: "b", display_name: "bit", dim: INFORMATION, numer: 1, denom: 1 },
  ExactUnitSpec { symbol: "B", display_name: "byte", dim: INFORMATION, numer: 8, denom: 1 },
  // Angle (exact: radian is base; turn and gradian are exact fractions
  // of a full turn, expressed here via the exact tau/360/400 ratios
  // against radian defined below in IRRATIONAL_UNITS since radian
  // itself is exact but turn/gradian require pi)
  ExactUnitSpec { symbol: "rad", display_name: "radian", dim: ANGLE, numer: 1, denom: 1 },
  // Area
  ExactUnitSpec { symbol: "hect", display_name: "hectare", dim: AREA, numer: 10_000, denom: 1 },
  ExactUnitSpec { symbol: "a", display_name: "are", dim: AREA, numer: 100, denom: 1 },
  ExactUnitSpec { symbol: "acre", display_name: "acre", dim: AREA, numer: 316_160_658, denom: 78_125 },
  // Volume
  ExactUnitSpec { symbol: "L", display_name: "liter", dim: VOLUME, numer: 1, denom: 1_000 },
  ExactUnitSpec { symbol: "gal", display_name: "gallon", dim: VOLUME, numer: 3_785_411_784, denom: 1_000_000_000_000 },
  // Force / energy / speed
  ExactUnitSpec { symbol: "N", display_name: "newton", dim: FORCE, numer: 1_000, denom: 1 },
  ExactUnitSpec { symbol: "J", display_name: "joule", dim: ENERGY, numer: 1_000, denom: 1 },
  ExactUnitSpec { symbol: "c", display_name: "speed of light", dim: SPEED, numer: 299_792_458, denom: 1 },
  // Dimensionless percentage-style helper units used internally by the
  // evaluator's percent handling (not user-facing symbols).
  ExactUnitSpec { symbol: "person", display_name: "person", dim: NONE, numer: 1, denom: 1 },
];

/// Irrational-scale units (their conversion factor involves pi).
pub static INEXACT_UNITS: &[InexactUnitSpec] = &[
  InexactUnitSpec { symbol: "deg", display_name: "degree", dim: ANGLE, scale: std::f64::consts::PI / 180.0 },
  InexactUnitSpec { symbol: "grad", display_name: "gradian", dim: ANGLE, scale: std::f64::consts::PI / 200.0 },
  InexactUnitSpec { symbol: "turn", display_name: "turn", dim: ANGLE, scale: std::f64::consts::TAU },
  InexactUnitSpec { symbol: "arcmin", display_name: "arcminute", dim: ANGLE, scale: std::f64::consts::PI / 180.0 / 60.0 },
  InexactUnitSpec { symbol: "arcsec", display_name: "arcsecond", dim: ANGLE, scale: std::f64::consts::PI / 180.0 / 3_600.0 },
];

/// Affine (offset + scale) units: absolute temperature scales. `base`
/// is kelvin: `K = raw * scale + offset`.
pub struct AffineUnitSpec {
  pub symbol: &'static str,
  pub display_name: &'static str,
  pub scale_numer: i64,
  pub scale_denom: i64,
  pub offset_numer: i64,
  pub offset_denom: i64,
}

pub static AFFINE_UNITS: &[AffineUnitSpec] = &[
  AffineUnitSpec { symbol: "degC", display_name: "degree Celsius", scale_numer: 1, scale_denom: 1, offset_numer: 27_315, offset_denom: 100 },
  AffineUnitSpec { symbol: "degF", display_name: "degree Fahrenheit", scale_numer: 5, scale_denom: 9, offset_numer: 45_967, offset_denom: 180 },
];

fn exact_dim(d: [i64; 9]) -> Dimension {
  let mut dimension = Dimension::one();
  for (i, base) in BaseDimension::ALL.iter().enumerate() {
    if d[i] != 0 {
      dimension = dimension.mul(Dimension::singleton(*base).pow(d[i]));
    }
  }
  dimension
}

fn build_exact(spec: &ExactUnitSpec) -> Arc<Unit> {
  let scale = Number::from(BigRational::new(spec.numer.into(), spec.denom.into()));
  Arc::new(Unit::linear(spec.symbol, spec.display_name, exact_dim(spec.dim), scale))
}

fn build_inexact(spec: &InexactUnitSpec) -> Arc<Unit> {
  Arc::new(Unit::linear(spec.symbol, spec.display_name, exact_dim(spec.dim), Number::Float(spec.scale)))
}

fn build_affine(spec: &AffineUnitSpec) -> Arc<Unit> {
  let scale = Number::from(BigRational::new(spec.scale_numer.into(), spec.scale_denom.into()));
  let offset = Number::from(BigRational::new(spec.offset_numer.into(), spec.offset_denom.into()));
  Arc::new(Unit::affine(spec.symbol, spec.display_name, exact_dim(TEMPERATURE), scale, offset))
}

/// Builds the full builtin unit table, keyed by canonical (un-prefixed)
/// symbol.
pub fn build_unit_table() -> HashMap<&'static str, Arc<Unit>> {
  let mut table = HashMap::with_capacity(EXACT_UNITS.len() + INEXACT_UNITS.len() + AFFINE_UNITS.len());
  for spec in EXACT_UNITS {
    table.insert(spec.symbol, build_exact(spec));
  }
  for spec in INEXACT_UNITS {
    table.insert(spec.symbol, build_inexact(spec));
  }
  for spec in AFFINE_UNITS {
    table.insert(spec.symbol, build_affine(spec));
  }
  table
}

/// Which builtin symbols permit an SI prefix. Angle, temperature, and
/// a handful of named composites do not.
pub fn si_prefixable(symbol: &str) -> bool {
  matches!(symbol, "m" | "g" | "s" | "A" | "cd" | "mol" | "N" | "J" | "L")
}

pub fn binary_prefixable(symbol: &str) -> bool {
  matches!(symbol, "b" | "B")
}

#[cfg(test)]
mod tests {
  use super::*;
  use approx::assert_abs_diff_eq;

  #[test]
  fn test_build_table_contains_base_units() {
    let table = build_unit_table();
    assert!(table.contains_key("m"));
    assert!(table.contains_key("ft"));
    assert!(table.contains_key("degC"));
  }

  #[test]
  fn test_affine_degc_offset_is_273_15() {
    let table = build_unit_table();
    let deg_c = &table["degC"];
    assert!(deg_c.is_affine());
    let zero_c_in_kelvin = deg_c.to_base(Number::zero());
    assert_eq!(zero_c_in_kelvin.to_f64().unwrap(), 273.15);
  }

  #[test]
  fn test_foot_to_meter_scale() {
    let table = build_unit_table();
    let ft = &table["ft"];
    let one_meter_in_base = ft.to_base(Number::one());
    assert_abs_diff_eq!(one_meter_in_base.to_f64().unwrap(), 0.3048, epsilon = 1e-12);
  }
}
