
//! The closed function registry. Grounded on the teacher's
//! `expr::function::table::FunctionTable` + `expr::function::builder`
//! pattern (name-keyed table, arity/domain validated before the
//! numeric kernel runs) but simplified to this spec's fixed,
//! non-extensible set — there is no algebraic simplifier here, so a
//! function either evaluates to a `Value` or raises a `RuntimeError`.

use super::error::RuntimeError;
use super::random::Prng;
use super::value::Value;
use crate::eval::number::Number;
use crate::tables::unit::CompositeUnit;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AngleUnit {
  Degree,
  Radian,
}

pub struct FunctionContext<'a> {
  pub angle_unit: AngleUnit,
  pub rng: &'a mut Prng,
}

type Kernel = for<'a, 'b> fn(&'a [Value], &mut FunctionContext<'b>) -> Result<Value, RuntimeError>;

static FUNCTIONS: phf::Map<&'static str, Kernel> = phf::phf_map! {
  "sin" => sin,
  "cos" => cos,
  "tan" => tan,
  "sinh" => sinh,
  "cosh" => cosh,
  "tanh" => tanh,
  "asin" => asin,
  "arcsin" => asin,
  "acos" => acos,
  "arccos" => acos,
  "atan" => atan,
  "arctan" => atan,
  "asinh" => asinh,
  "arsinh" => asinh,
  "acosh" => acosh,
  "arcosh" => acosh,
  "atanh" => atanh,
  "artanh" => atanh,
  "sqrt" => sqrt,
  "cbrt" => cbrt,
  "ln" => ln,
  "log10" => log10,
  "exp" => exp,
  "log" => log,
  "round" => round,
  "floor" => floor,
  "ceil" => ceil,
  "trunc" => trunc,
  "abs" => abs,
  "sign" => sign,
  "frac" => frac,
  "random" => random,
  "perm" => perm,
  "comb" => comb,
};

pub fn call(name: &str, args: &[Value], ctx: &mut FunctionContext<'_>) -> Result<Value, RuntimeError> {
  match FUNCTIONS.get(name) {
    Some(kernel) => kernel(args, ctx),
    None => Err(RuntimeError::DomainError { function: name.to_owned(), reason: "no such function".to_owned() }),
  }
}

fn domain_error(function: &str, reason: impl Into<String>) -> RuntimeError {
  RuntimeError::DomainError { function: function.to_owned(), reason: reason.into() }
}

fn one_number(function: &str, args: &[Value]) -> Result<(Number, CompositeUnit), RuntimeError> {
  match args {
    [value] => value
      .as_number()
      .map(|(m, u)| (m.clone(), u.clone()))
      .ok_or_else(|| RuntimeError::TypeMismatch { expected: "Number".to_owned(), found: value.type_name().to_owned() }),
    _ => Err(domain_error(function, format!("expected 1 argument, got {}", args.len()))),
  }
}

fn two_numbers(function: &str, args: &[Value]) -> Result<(Number, Number), RuntimeError> {
  match args {
    [a, b] => {
      let (am, au) = a.as_number().ok_or_else(|| RuntimeError::TypeMismatch { expected: "Number".to_owned(), found: a.type_name().to_owned() })?;
      let (bm, bu) = b.as_number().ok_or_else(|| RuntimeError::TypeMismatch { expected: "Number".to_owned(), found: b.type_name().to_owned() })?;
      if !au.is_empty() || !bu.is_empty() {
        return Err(domain_error(function, "arguments must be dimensionless"));
      }
      Ok((am.clone(), bm.clone()))
    }
    _ => Err(domain_error(function, format!("expected 2 arguments, got {}", args.len()))),
  }
}

fn dimensionless_f64(function: &str, args: &[Value]) -> Result<f64, RuntimeError> {
  let (magnitude, units) = one_number(function, args)?;
  if !units.is_empty() {
    return Err(domain_error(function, "argument must be dimensionless"));
  }
  Ok(magnitude.to_f64_or_nan())
}

/// Converts a trig-function argument to radians: an explicit angle
/// unit is honored via its own scale (radian is the angle dimension's
/// base unit); a bare dimensionless number is interpreted per
/// `ctx.angle_unit`.
fn to_radians(function: &str, args: &[Value], ctx: &FunctionContext<'_>) -> Result<f64, RuntimeError> {
  let (magnitude, units) = one_number(function, args)?;
  if units.is_empty() {
    let raw = magnitude.to_f64_or_nan();
    return Ok(match ctx.angle_unit {
      AngleUnit::Degree => raw.to_radians(),
      AngleUnit::Radian => raw,
    });
  }
  Ok(units.to_base(magnitude).to_f64_or_nan())
}

/// Wraps a radian result as a dimensionless `Value` expressed in
/// `ctx.angle_unit` — the common convention for inverse-trig output on
/// a line-oriented calculator.
fn angle_result(radians: f64, ctx: &FunctionContext<'_>) -> Value {
  let scaled = match ctx.angle_unit {
    AngleUnit::Degree => radians.to_degrees(),
    AngleUnit::Radian => radians,
  };
  Value::number(Number::from(scaled))
}

fn sin(args: &[Value], ctx: &mut FunctionContext<'_>) -> Result<Value, RuntimeError> {
  Ok(Value::number(Number::from(to_radians("sin", args, ctx)?.sin())))
}

fn cos(args: &[Value], ctx: &mut FunctionContext<'_>) -> Result<Value, RuntimeError> {
  Ok(Value::number(Number::from(to_radians("cos", args, ctx)?.cos())))
}

fn tan(args: &[Value], ctx: &mut FunctionContext<'_>) -> Result<Value, RuntimeError> {
  Ok(Value::number(Number::from(to_radians("tan", args, ctx)?.tan())))
}

fn sinh(args: &[Value], _ctx: &mut FunctionContext<'_>) -> Result<Value, RuntimeError> {
  Ok(Value::number(Number::from(dimensionless_f64("sinh", args)?.sinh())))
}

fn cosh(args: &[Value], _ctx: &mut FunctionContext<'_>) -> Result<Value, RuntimeError> {
  Ok(Value::number(Number::from(dimensionless_f64("cosh", args)?.cosh())))
}

fn tanh(args: &[Value], _ctx: &mut FunctionContext<'_>) -> Result<Value, RuntimeError> {
  Ok(Value::number(Number::from(dimensionless_f64("tanh", args)?.tanh())))
}

fn asin(args: &[Value], ctx: &mut FunctionContext<'_>) -> Result<Value, RuntimeError> {
  let x = dimensionless_f64("asin", args)?;
  if !(-1.0..=1.0).contains(&x) {
    return Err(domain_error("asin", "argument must be in [-1, 1]"));
  }
  Ok(angle_result(x.asin(), ctx))
}

fn acos(args: &[Value], ctx: &mut FunctionContext<'_>) -> Result<Value, RuntimeError> {
  let x = dimensionless_f64("acos", args)?;
  if !(-1.0..=1.0).contains(&x) {
    return Err(domain_error("acos", "argument must be in [-1, 1]"));
  }
  Ok(angle_result(x.acos(), ctx))
}

fn atan(args: &[Value], ctx: &mut FunctionContext<'_>) -> Result<Value, RuntimeError> {
  let x = dimensionless_f64("atan", args)?;
  Ok(angle_result(x.atan(), ctx))
}

fn asinh(args: &[Value], _ctx: &mut FunctionContext<'_>) -> Result<Value, RuntimeError> {
  Ok(Value::number(Number::from(dimensionless_f64("asinh", args)?.asinh())))
}

fn acosh(args: &[Value], _ctx: &mut FunctionContext<'_>) -> Result<Value, RuntimeError> {
  let x = dimensionless_f64("acosh", args)?;
  if x < 1.0 {
    return Err(domain_error("acosh", "argument must be >= 1"));
  }
  Ok(Value::number(Number::from(x.acosh())))
}

fn atanh(args: &[Value], _ctx: &mut FunctionContext<'_>) -> Result<Value, RuntimeError> {
  let x = dimensionless_f64("atanh", args)?;
  if !(-1.0..1.0).contains(&x) {
    return Err(domain_error("atanh", "argument must be in (-1, 1)"));
  }
  Ok(Value::number(Number::from(x.atanh())))
}

fn sqrt(args: &[Value], _ctx: &mut FunctionContext<'_>) -> Result<Value, RuntimeError> {
  let (magnitude, units) = one_number("sqrt", args)?;
  if magnitude.is_negative() {
    return Err(domain_error("sqrt", "argument must be non-negative"));
  }
  match magnitude.sqrt() {
    Some(root) => Ok(Value::Number { magnitude: root, units }),
    None => Err(domain_error("sqrt", "argument must be non-negative")),
  }
}

fn cbrt(args: &[Value], _ctx: &mut FunctionContext<'_>) -> Result<Value, RuntimeError> {
  let x = dimensionless_f64("cbrt", args)?;
  Ok(Value::number(Number::from(x.cbrt())))
}

fn ln(args: &[Value], _ctx: &mut FunctionContext<'_>) -> Result<Value, RuntimeError> {
  let x = dimensionless_f64("ln", args)?;
  if x <= 0.0 {
    return Err(domain_error("ln", "argument must be positive"));
  }
  Ok(Value::number(Number::from(x.ln())))
}

fn log10(args: &[Value], _ctx: &mut FunctionContext<'_>) -> Result<Value, RuntimeError> {
  let x = dimensionless_f64("log10", args)?;
  if x <= 0.0 {
    return Err(domain_error("log10", "argument must be positive"));
  }
  Ok(Value::number(Number::from(x.log10())))
}

fn exp(args: &[Value], _ctx: &mut FunctionContext<'_>) -> Result<Value, RuntimeError> {
  let x = dimensionless_f64("exp", args)?;
  Ok(Value::number(Number::from(x.exp())))
}

fn log(args: &[Value], _ctx: &mut FunctionContext<'_>) -> Result<Value, RuntimeError> {
  match args.len() {
    1 => {
      let x = dimensionless_f64("log", args)?;
      if x <= 0.0 {
        return Err(domain_error("log", "argument must be positive"));
      }
      Ok(Value::number(Number::from(x.ln())))
    }
    2 => {
      let (x, base) = two_numbers("log", args)?;
      let (x, base) = (x.to_f64_or_nan(), base.to_f64_or_nan());
      if x <= 0.0 {
        return Err(domain_error("log", "argument must be positive"));
      }
      if base <= 0.0 || base == 1.0 {
        return Err(domain_error("log", "base must be positive and not equal to 1"));
      }
      Ok(Value::number(Number::from(x.ln() / base.ln())))
    }
    n => Err(domain_error("log", format!("expected 1 or 2 arguments, got {n}"))),
  }
}

fn rounding_nearest(function: &str, args: &[Value]) -> Result<(Number, CompositeUnit, Number), RuntimeError> {
  match args.len() {
    1 => {
      let (m, u) = one_number(function, args)?;
      Ok((m, u, Number::one()))
    }
    2 => {
      let (m, u) = args[0].as_number().map(|(m, u)| (m.clone(), u.clone())).ok_or_else(|| RuntimeError::TypeMismatch { expected: "Number".to_owned(), found: args[0].type_name().to_owned() })?;
      let (nearest, nearest_units) = args[1].as_number().ok_or_else(|| RuntimeError::TypeMismatch { expected: "Number".to_owned(), found: args[1].type_name().to_owned() })?;
      if !nearest_units.is_empty() {
        return Err(domain_error(function, "`nearest` must be dimensionless"));
      }
      Ok((m, u, nearest.clone()))
    }
    n => Err(domain_error(function, format!("expected 1 or 2 arguments, got {n}"))),
  }
}

fn round_to_nearest(m: Number, nearest: Number, round_fn: fn(&Number) -> Number) -> Number {
  if nearest.is_zero() || nearest == Number::one() {
    return round_fn(&m);
  }
  round_fn(&(m / nearest.clone())) * nearest
}

fn round(args: &[Value], _ctx: &mut FunctionContext<'_>) -> Result<Value, RuntimeError> {
  let (m, u, nearest) = rounding_nearest("round", args)?;
  Ok(Value::Number { magnitude: round_to_nearest(m, nearest, Number::round), units: u })
}

fn floor(args: &[Value], _ctx: &mut FunctionContext<'_>) -> Result<Value, RuntimeError> {
  let (m, u, nearest) = rounding_nearest("floor", args)?;
  Ok(Value::Number { magnitude: round_to_nearest(m, nearest, Number::floor), units: u })
}

fn ceil(args: &[Value], _ctx: &mut FunctionContext<'_>) -> Result<Value, RuntimeError> {
  let (m, u, nearest) = rounding_nearest("ceil", args)?;
  Ok(Value::Number { magnitude: round_to_nearest(m, nearest, Number::ceil), units: u })
}

fn trunc(args: &[Value], _ctx: &mut FunctionContext<'_>) -> Result<Value, RuntimeError> {
  let (m, u, nearest) = rounding_nearest("trunc", args)?;
  Ok(Value::Number { magnitude: round_to_nearest(m, nearest, Number::trunc), units: u })
}

fn abs(args: &[Value], _ctx: &mut FunctionContext<'_>) -> Result<Value, RuntimeError> {
  let (m, u) = one_number("abs", args)?;
  Ok(Value::Number { magnitude: m.abs(), units: u })
}

fn sign(args: &[Value], _ctx: &mut FunctionContext<'_>) -> Result<Value, RuntimeError> {
  let (m, _) = one_number("sign", args)?;
  Ok(Value::number(m.signum()))
}

fn frac(args: &[Value], _ctx: &mut FunctionContext<'_>) -> Result<Value, RuntimeError> {
  let (m, u) = one_number("frac", args)?;
  Ok(Value::Number { magnitude: m.frac(), units: u })
}

fn random(args: &[Value], ctx: &mut FunctionContext<'_>) -> Result<Value, RuntimeError> {
  match args.len() {
    0 => Ok(Value::number(Number::from(ctx.rng.next_f64()))),
    1 => {
      let n = require_nonneg_int("random", &args[0])?;
      Ok(Value::number(Number::from(ctx.rng.next_range(0, n))))
    }
    2 => {
      let lo = require_int("random", &args[0])?;
      let hi = require_int("random", &args[1])?;
      Ok(Value::number(Number::from(ctx.rng.next_range(lo, hi))))
    }
    3 => {
      let lo = require_int("random", &args[0])?;
      let hi = require_int("random", &args[1])?;
      let step = require_int("random", &args[2])?;
      Ok(Value::number(Number::from(ctx.rng.next_stepped(lo, hi, step))))
    }
    n => Err(domain_error("random", format!("expected 0-3 arguments, got {n}"))),
  }
}

fn require_int(function: &str, value: &Value) -> Result<i64, RuntimeError> {
  let (m, u) = value.as_number().ok_or_else(|| RuntimeError::TypeMismatch { expected: "Number".to_owned(), found: value.type_name().to_owned() })?;
  if !u.is_empty() {
    return Err(domain_error(function, "argument must be dimensionless"));
  }
  m.to_i64().ok_or_else(|| domain_error(function, "argument must be an integer"))
}

fn require_nonneg_int(function: &str, value: &Value) -> Result<i64, RuntimeError> {
  let n = require_int(function, value)?;
  if n < 0 {
    return Err(domain_error(function, "argument must be non-negative"));
  }
  Ok(n)
}

fn perm(args: &[Value], _ctx: &mut FunctionContext<'_>) -> Result<Value, RuntimeError> {
  let (n, k) = combinatoric_args("perm", args)?;
  let mut result = num::BigInt::from(1);
  let mut i = n;
  while i > n - k {
    result *= i;
    i -= 1;
  }
  Ok(Value::number(Number::from(result)))
}

fn comb(args: &[Value], _ctx: &mut FunctionContext<'_>) -> Result<Value, RuntimeError> {
  let (n, k) = combinatoric_args("comb", args)?;
  let mut numerator = num::BigInt::from(1);
  let mut i = n;
  while i > n - k {
    numerator *= i;
    i -= 1;
  }
  let mut denominator = num::BigInt::from(1);
  let mut j = k;
  while j > 0 {
    denominator *= j;
    j -= 1;
  }
  Ok(Value::number(Number::from(num::BigRational::new(numerator, denominator))))
}

fn combinatoric_args(function: &str, args: &[Value]) -> Result<(i64, i64), RuntimeError> {
  let (n_raw, k_raw) = two_numbers(function, args)?;
  let n = n_raw.to_i64().ok_or_else(|| domain_error(function, "n must be a non-negative integer"))?;
  let k = k_raw.to_i64().ok_or_else(|| domain_error(function, "k must be a non-negative integer"))?;
  if n < 0 || k < 0 {
    return Err(domain_error(function, "n and k must be non-negative"));
  }
  if k > n {
    return Err(domain_error(function, "k must not exceed n"));
  }
  Ok((n, k))
}

#[cfg(test)]
mod tests {
  use super::*;
  use approx::assert_abs_diff_eq;

  fn ctx(rng: &mut Prng) -> FunctionContext<'_> {
    FunctionContext { angle_unit: AngleUnit::Radian, rng }
  }

  #[test]
  fn test_sin_radian() {
    let mut rng = Prng::new(1);
    let result = sin(&[Value::number(Number::zero())], &mut ctx(&mut rng)).unwrap();
    let (m, _) = result.as_number().unwrap();
    assert_abs_diff_eq!(m.to_f64_or_nan(), 0.0, epsilon = 1e-12);
  }

  #[test]
  fn test_asin_out_of_domain() {
    let mut rng = Prng::new(1);
    let result = asin(&[Value::number(Number::from(2i64))], &mut ctx(&mut rng));
    assert!(matches!(result, Err(RuntimeError::DomainError { .. })));
  }

  #[test]
  fn test_sqrt_exact() {
    let mut rng = Prng::new(1);
    let result = sqrt(&[Value::number(Number::from(4i64))], &mut ctx(&mut rng)).unwrap();
    let (m, _) = result.as_number().unwrap();
    assert_eq!(m.to_f64_or_nan(), 2.0);
  }

  #[test]
  fn test_ln_domain_error() {
    let mut rng = Prng::new(1);
    let result = ln(&[Value::number(Number::zero())], &mut ctx(&mut rng));
    assert!(matches!(result, Err(RuntimeError::DomainError { .. })));
  }

  #[test]
  fn test_log_two_arg() {
    let mut rng = Prng::new(1);
    let result = log(&[Value::number(Number::from(8i64)), Value::number(Number::from(2i64))], &mut ctx(&mut rng)).unwrap();
    let (m, _) = result.as_number().unwrap();
    assert_abs_diff_eq!(m.to_f64_or_nan(), 3.0, epsilon = 1e-9);
  }

  #[test]
  fn test_round_nearest() {
    let mut rng = Prng::new(1);
    let result = round(&[Value::number(Number::from(23i64)), Value::number(Number::from(5i64))], &mut ctx(&mut rng)).unwrap();
    let (m, _) = result.as_number().unwrap();
    assert_eq!(m.to_f64_or_nan(), 25.0);
  }

  #[test]
  fn test_perm() {
    let mut rng = Prng::new(1);
    let result = perm(&[Value::number(Number::from(5i64)), Value::number(Number::from(2i64))], &mut ctx(&mut rng)).unwrap();
    let (m, _) = result.as_number().unwrap();
    assert_eq!(m.to_i64().unwrap(), 20);
  }

  #[test]
  fn test_comb() {
    let mut rng = Prng::new(1);
    let result = comb(&[Value::number(Number::from(5i64)), Value::number(Number::from(2i64))], &mut ctx(&mut rng)).unwrap();
    let (m, _) = result.as_number().unwrap();
    assert_eq!(m.to_i64().unwrap(), 10);
  }

  #[test]
  fn test_comb_rejects_k_greater_than_n() {
    let mut rng = Prng::new(1);
    let result = comb(&[Value::number(Number::from(2i64)), Value::number(Number::from(5i64))], &mut ctx(&mut rng));
    assert!(result.is_err());
  }

  #[test]
  fn test_random_zero_arg_range() {
    let mut rng = Prng::new(5);
    let result = random(&[], &mut ctx(&mut rng)).unwrap();
    let (m, _) = result.as_number().unwrap();
    let f = m.to_f64_or_nan();
    assert!((0.0..1.0).contains(&f));
  }

  #[test]
  fn test_random_two_arg_range() {
    let mut rng = Prng::new(5);
    let result = random(&[Value::number(Number::from(10i64)), Value::number(Number::from(20i64))], &mut ctx(&mut rng)).unwrap();
    let (m, _) = result.as_number().unwrap();
    let n = m.to_i64().unwrap();
    assert!((10..20).contains(&n));
  }
}
