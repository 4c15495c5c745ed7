
//! General-purpose real number type, grounded on the teacher's
//! `expr::number::real::Number`: it automatically switches between an
//! exact arbitrary-precision representation (integer or rational) and
//! an IEEE 754 float whenever an operation can't stay exact (taking a
//! square root, applying a transcendental function, dividing an
//! irrational conversion factor). Complex/quaternion representations
//! are dropped — out of scope for this spec.

use num::{BigInt, BigRational, Zero, One, FromPrimitive, Signed};
use num::pow::Pow;
use num::traits::ToPrimitive;

use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};
use std::ops::{Add, Sub, Mul, Div, Neg};

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub enum Number {
  Integer(BigInt),
  Ratio(BigRational),
  Float(f64),
}

impl Number {
  pub fn zero() -> Self {
    Number::Integer(BigInt::zero())
  }

  pub fn one() -> Self {
    Number::Integer(BigInt::one())
  }

  pub fn is_zero(&self) -> bool {
    match self {
      Number::Integer(i) => i.is_zero(),
      Number::Ratio(r) => r.is_zero(),
      Number::Float(f) => *f == 0.0,
    }
  }

  pub fn ratio(numer: impl Into<BigInt>, denom: impl Into<BigInt>) -> Self {
    Self::from(BigRational::new(numer.into(), denom.into()))
  }

  /// Collapses a `Ratio` whose denominator is 1 down to an `Integer`.
  /// Never demotes a `Float`, even if its value happens to be integral.
  fn simplify(self) -> Self {
    if let Number::Ratio(r) = &self {
      if r.denom().is_one() {
        return Number::Integer(r.numer().clone());
      }
    }
    self
  }

  pub fn is_exact(&self) -> bool {
    !matches!(self, Number::Float(_))
  }

  pub fn to_f64(&self) -> Option<f64> {
    match self {
      Number::Integer(i) => i.to_f64(),
      Number::Ratio(r) => r.to_f64(),
      Number::Float(f) => Some(*f),
    }
  }

  pub fn to_f64_or_nan(&self) -> f64 {
    self.to_f64().unwrap_or(f64::NAN)
  }

  pub fn to_inexact(&self) -> Self {
    Number::Float(self.to_f64_or_nan())
  }

  pub fn to_i64(&self) -> Option<i64> {
    match self {
      Number::Integer(i) => i.to_i64(),
      Number::Ratio(r) if r.denom().is_one() => r.numer().to_i64(),
      Number::Ratio(_) => None,
      Number::Float(f) if f.fract() == 0.0 => Some(*f as i64),
      Number::Float(_) => None,
    }
  }

  pub fn is_negative(&self) -> bool {
    match self {
      Number::Integer(i) => i.is_negative(),
      Number::Ratio(r) => r.is_negative(),
      Number::Float(f) => *f < 0.0,
    }
  }

  pub fn abs(&self) -> Self {
    match self {
      Number::Integer(i) => Number::Integer(i.abs()),
      Number::Ratio(r) => Number::Ratio(r.abs()),
      Number::Float(f) => Number::Float(f.abs()),
    }
  }

  pub fn signum(&self) -> Self {
    match self {
      Number::Integer(i) => Number::Integer(i.signum()),
      Number::Ratio(r) => Number::Integer(r.numer().signum()),
      Number::Float(f) => Number::Float(f.signum() * if *f == 0.0 { 0.0 } else { 1.0 }),
    }
  }

  pub fn floor(&self) -> Self {
    match self {
      Number::Integer(_) => self.clone(),
      Number::Ratio(r) => Number::Integer(r.floor().to_integer()),
      Number::Float(f) => Number::Float(f.floor()),
    }
  }

  pub fn ceil(&self) -> Self {
    match self {
      Number::Integer(_) => self.clone(),
      Number::Ratio(r) => Number::Integer(r.ceil().to_integer()),
      Number::Float(f) => Number::Float(f.ceil()),
    }
  }

  pub fn trunc(&self) -> Self {
    match self {
      Number::Integer(_) => self.clone(),
      Number::Ratio(r) => Number::Integer(r.trunc().to_integer()),
      Number::Float(f) => Number::Float(f.trunc()),
    }
  }

  pub fn round(&self) -> Self {
    match self {
      Number::Integer(_) => self.clone(),
      Number::Ratio(r) => Number::Integer(r.round().to_integer()),
      Number::Float(f) => Number::Float(f.round()),
    }
  }

  pub fn frac(&self) -> Self {
    self.clone() - self.trunc()
  }

  /// Raises `self` to an integer power. `0^0` is treated as `1`.
  pub fn powi(&self, exp: i64) -> Self {
    match exp.cmp(&0) {
      Ordering::Equal => Number::one(),
      Ordering::Less => self.recip().powi(-exp),
      Ordering::Greater => {
        match self {
          Number::Integer(n) => Number::Integer(n.pow(exp as u32)),
          Number::Ratio(r) => Number::Ratio(r.pow(exp as i32)),
          Number::Float(f) => Number::Float(f.powi(exp as i32)),
        }
      }
    }
  }

  pub fn recip(&self) -> Self {
    Number::one() / self
  }

  pub fn sqrt(&self) -> Option<Self> {
    let f = self.to_f64()?;
    if f < 0.0 { None } else { Some(Number::Float(f.sqrt())) }
  }
}

impl From<BigInt> for Number {
  fn from(i: BigInt) -> Self {
    Number::Integer(i)
  }
}

impl From<BigRational> for Number {
  fn from(r: BigRational) -> Self {
    Number::Ratio(r).simplify()
  }
}

impl From<i64> for Number {
  fn from(i: i64) -> Self {
    Number::Integer(BigInt::from(i))
  }
}

impl From<i32> for Number {
  fn from(i: i32) -> Self {
    Number::Integer(BigInt::from(i))
  }
}

impl From<f64> for Number {
  fn from(f: f64) -> Self {
    Number::Float(f)
  }
}

enum NumberPair {
  Integers(BigInt, BigInt),
  Ratios(BigRational, BigRational),
  Floats(f64, f64),
}

impl NumberPair {
  fn promote(a: Number, b: Number) -> Self {
    use Number::*;
    match (a, b) {
      (Integer(a), Integer(b)) => NumberPair::Integers(a, b),
      (Float(a), b) => NumberPair::Floats(a, b.to_f64_or_nan()),
      (a, Float(b)) => NumberPair::Floats(a.to_f64_or_nan(), b),
      (a, b) => {
        fn to_ratio(n: Number) -> BigRational {
          match n {
            Integer(i) => BigRational::from_integer(i),
            Ratio(r) => r,
            Float(_) => unreachable!("handled above"),
          }
        }
        NumberPair::Ratios(to_ratio(a), to_ratio(b))
      }
    }
  }
}

impl Add for Number {
  type Output = Number;
  fn add(self, other: Number) -> Number {
    match NumberPair::promote(self, other) {
      NumberPair::Integers(a, b) => Number::Integer(a + b),
      NumberPair::Ratios(a, b) => Number::from(a + b),
      NumberPair::Floats(a, b) => Number::Float(a + b),
    }
  }
}

impl Sub for Number {
  type Output = Number;
  fn sub(self, other: Number) -> Number {
    match NumberPair::promote(self, other) {
      NumberPair::Integers(a, b) => Number::Integer(a - b),
      NumberPair::Ratios(a, b) => Number::from(a - b),
      NumberPair::Floats(a, b) => Number::Float(a - b),
    }
  }
}

impl Mul for Number {
  type Output = Number;
  fn mul(self, other: Number) -> Number {
    match NumberPair::promote(self, other) {
      NumberPair::Integers(a, b) => Number::Integer(a * b),
      NumberPair::Ratios(a, b) => Number::from(a * b),
      NumberPair::Floats(a, b) => Number::Float(a * b),
    }
  }
}

impl Div for Number {
  type Output = Number;
  fn div(self, other: Number) -> Number {
    match NumberPair::promote(self, other) {
      NumberPair::Integers(a, b) => Number::from(BigRational::new(a, b)),
      NumberPair::Ratios(a, b) => Number::from(a / b),
      NumberPair::Floats(a, b) => Number::Float(a / b),
    }
  }
}

impl<'a> Mul<&'a Number> for Number {
  type Output = Number;
  fn mul(self, other: &'a Number) -> Number {
    self * other.clone()
  }
}

impl<'a> Div<&'a Number> for Number {
  type Output = Number;
  fn div(self, other: &'a Number) -> Number {
    self / other.clone()
  }
}

impl Neg for Number {
  type Output = Number;
  fn neg(self) -> Number {
    match self {
      Number::Integer(i) => Number::Integer(-i),
      Number::Ratio(r) => Number::Ratio(-r),
      Number::Float(f) => Number::Float(-f),
    }
  }
}

impl PartialOrd for Number {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    match NumberPair::promote(self.clone(), other.clone()) {
      NumberPair::Integers(a, b) => Some(a.cmp(&b)),
      NumberPair::Ratios(a, b) => Some(a.cmp(&b)),
      NumberPair::Floats(a, b) => a.partial_cmp(&b),
    }
  }
}

impl Display for Number {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    match self {
      Number::Integer(i) => write!(f, "{i}"),
      Number::Ratio(r) => write!(f, "{}/{}", r.numer(), r.denom()),
      Number::Float(x) => write!(f, "{x}"),
    }
  }
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("invalid numeric literal: {text}")]
pub struct ParseNumberError {
  pub text: String,
}

impl Number {
  /// Parses a plain decimal literal (already stripped of digit-group
  /// separators by the lexer) into an exact `Number`.
  pub fn parse_decimal(text: &str) -> Result<Number, ParseNumberError> {
    if let Ok(i) = text.parse::<i128>() {
      return Ok(Number::Integer(BigInt::from(i)));
    }
    if let Some((int_part, frac_part)) = text.split_once('.') {
      let digits = format!("{int_part}{frac_part}");
      let Ok(numer) = digits.parse::<BigInt>() else {
        return Err(ParseNumberError { text: text.to_owned() });
      };
      let denom = BigInt::from(10u32).pow(frac_part.len() as u32);
      return Ok(Number::from(BigRational::new(numer, denom)));
    }
    text.parse::<BigInt>()
      .map(Number::Integer)
      .map_err(|_| ParseNumberError { text: text.to_owned() })
  }

  pub fn parse_radix(text: &str, radix: u32) -> Result<Number, ParseNumberError> {
    BigInt::parse_bytes(text.as_bytes(), radix)
      .map(Number::Integer)
      .ok_or_else(|| ParseNumberError { text: text.to_owned() })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_decimal_integer() {
    assert_eq!(Number::parse_decimal("42").unwrap(), Number::Integer(BigInt::from(42)));
  }

  #[test]
  fn test_parse_decimal_fraction() {
    let n = Number::parse_decimal("1.5").unwrap();
    assert_eq!(n, Number::ratio(3, 2));
  }

  #[test]
  fn test_arithmetic_stays_exact() {
    let a = Number::parse_decimal("1.5").unwrap();
    let b = Number::from(2i64);
    let sum = a * b;
    assert!(sum.is_exact());
    assert_eq!(sum, Number::from(3i64));
  }

  #[test]
  fn test_float_poisons_result() {
    let a = Number::from(2i64);
    let b = Number::Float(1.5);
    assert!(!(a * b).is_exact());
  }

  #[test]
  fn test_powi_negative() {
    let two = Number::from(2i64);
    assert_eq!(two.powi(-1), Number::ratio(1, 2));
  }

  #[test]
  fn test_parse_radix_hex() {
    let n = Number::parse_radix("ff", 16).unwrap();
    assert_eq!(n, Number::from(255i64));
  }
}
