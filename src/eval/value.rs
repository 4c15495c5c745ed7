
//! The runtime value type: a tagged sum over everything an expression
//! can evaluate to. Grounded on the data model's `Value` variants;
//! date/time variants use the `time` crate directly rather than a
//! hand-rolled calendar, matching the teacher's own dependency on
//! `time` in `expr::function::library::datetime` and
//! `mode::display::language::basic::datetime`.

use crate::tables::unit::CompositeUnit;
use crate::eval::number::Number;

use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
  Number { magnitude: Number, units: CompositeUnit },
  /// `per_units` is non-empty for a per-unit rate (`1 USD/person/day`):
  /// the currency stays a `Currency`, never folding into a physical
  /// `UnitComposition`, with the denominator carried alongside it.
  Currency { amount: Number, code: String, per_units: CompositeUnit },
  Boolean(bool),
  /// Two or more same-dimension parts, ordered largest to smallest
  /// (e.g. `5 ft 7 in`).
  Composite { parts: Vec<(Number, crate::tables::unit::UnitWithPower)> },
  Percentage { value: Number, is_permille: bool },
  PlainDate(Date),
  PlainTime(Time),
  PlainDateTime(PrimitiveDateTime),
  /// An instant plus the UTC offset (in whole seconds) it was last
  /// displayed in; arithmetic operates on the underlying instant.
  ZonedDateTime { instant: OffsetDateTime, zone_label: String },
  Instant(OffsetDateTime),
}

impl Value {
  pub fn number(magnitude: Number) -> Self {
    Value::Number { magnitude, units: CompositeUnit::unitless() }
  }

  pub fn type_name(&self) -> &'static str {
    match self {
      Value::Number { .. } => "Number",
      Value::Currency { .. } => "Currency",
      Value::Boolean(_) => "Boolean",
      Value::Composite { .. } => "Composite",
      Value::Percentage { .. } => "Percentage",
      Value::PlainDate(_) => "PlainDate",
      Value::PlainTime(_) => "PlainTime",
      Value::PlainDateTime(_) => "PlainDateTime",
      Value::ZonedDateTime { .. } => "ZonedDateTime",
      Value::Instant(_) => "Instant",
    }
  }

  pub fn as_boolean(&self) -> Option<bool> {
    match self {
      Value::Boolean(b) => Some(*b),
      _ => None,
    }
  }

  pub fn as_number(&self) -> Option<(&Number, &CompositeUnit)> {
    match self {
      Value::Number { magnitude, units } => Some((magnitude, units)),
      _ => None,
    }
  }
}
