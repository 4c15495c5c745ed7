
//! Runtime (evaluation-time) errors. Per §7 of the design: each
//! subtype carries enough information to explain itself without a
//! source location (the driver attaches the line), and a
//! `RuntimeError` halts only the line that raised it.

use crate::tables::dimension::Dimension;

#[derive(Debug, Clone, thiserror::Error, PartialEq)]
#[non_exhaustive]
pub enum RuntimeError {
  #[error("unknown identifier {name:?}")]
  UnknownIdentifier { name: String },
  #[error("unknown unit {symbol:?}")]
  UnknownUnit { symbol: String },
  #[error("unknown currency {code:?}")]
  UnknownCurrency { code: String },
  #[error("dimension mismatch: {left} vs {right}")]
  DimensionMismatch { left: Dimension, right: Dimension },
  #[error("domain error in {function}: {reason}")]
  DomainError { function: String, reason: String },
  #[error("division by zero")]
  DivisionByZero,
  #[error("no exchange rate available for {from} to {to}")]
  ExchangeRateUnavailable { from: String, to: String },
  #[error("unknown timezone {text:?}")]
  TimezoneUnknown { text: String },
  #[error("type mismatch: expected {expected}, found {found}")]
  TypeMismatch { expected: String, found: String },
}

impl From<crate::tables::currency::ExchangeRateUnavailable> for RuntimeError {
  fn from(e: crate::tables::currency::ExchangeRateUnavailable) -> Self {
    RuntimeError::ExchangeRateUnavailable { from: e.from, to: e.to }
  }
}

impl RuntimeError {
  /// The bare variant name, used as a `LineResult.type` tag when this
  /// error is the one reported for a line.
  pub fn kind(&self) -> &'static str {
    match self {
      RuntimeError::UnknownIdentifier { .. } => "UnknownIdentifier",
      RuntimeError::UnknownUnit { .. } => "UnknownUnit",
      RuntimeError::UnknownCurrency { .. } => "UnknownCurrency",
      RuntimeError::DimensionMismatch { .. } => "DimensionMismatch",
      RuntimeError::DomainError { .. } => "DomainError",
      RuntimeError::DivisionByZero => "DivisionByZero",
      RuntimeError::ExchangeRateUnavailable { .. } => "ExchangeRateUnavailable",
      RuntimeError::TimezoneUnknown { .. } => "TimezoneUnknown",
      RuntimeError::TypeMismatch { .. } => "TypeMismatch",
    }
  }
}
