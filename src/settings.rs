
//! Settings accepted from the presentation host. Every field is a
//! closed enumeration (or a cosmetic pass-through the core never
//! inspects) so a malformed settings payload fails to deserialize
//! rather than silently misbehaving downstream.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
  pub theme: String,
  pub font_size: u32,
  pub font_family: String,
  pub line_wrapping: bool,
  pub precision: Precision,
  pub angle_unit: AngleUnit,
  pub decimal_separator: DecimalSeparator,
  pub digit_grouping_separator: DigitGroupingSeparator,
  pub digit_grouping_size: DigitGroupingSize,
  pub date_format: DateFormat,
  pub time_format: TimeFormat,
  pub date_time_format: DateTimeFormat,
  pub unit_display_style: UnitDisplayStyle,
  pub imperial_units: ImperialUnits,
  pub debug_mode: bool,
}

impl Default for Settings {
  fn default() -> Self {
    Settings {
      theme: "light".to_owned(),
      font_size: 14,
      font_family: "monospace".to_owned(),
      line_wrapping: true,
      precision: Precision::Auto,
      angle_unit: AngleUnit::Radian,
      decimal_separator: DecimalSeparator::Period,
      digit_grouping_separator: DigitGroupingSeparator::None,
      digit_grouping_size: DigitGroupingSize::Off,
      date_format: DateFormat::YmdDdd,
      time_format: TimeFormat::H23,
      date_time_format: DateTimeFormat::DateThenTime,
      unit_display_style: UnitDisplayStyle::Symbol,
      imperial_units: ImperialUnits::Us,
      debug_mode: false,
    }
  }
}

/// `-1` means "auto" (shortest round-trip, capped at 12 significant
/// digits); every other value is a fixed number of decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Precision {
  Auto,
  Fixed(u32),
}

impl Default for Precision {
  fn default() -> Self {
    Precision::Auto
  }
}

impl Precision {
  pub fn from_raw(value: i32) -> Option<Self> {
    match value {
      -1 => Some(Precision::Auto),
      0 | 2 | 4 | 6 | 8 | 10 => Some(Precision::Fixed(value as u32)),
      _ => None,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AngleUnit {
  Degree,
  Radian,
}

impl Default for AngleUnit {
  fn default() -> Self {
    AngleUnit::Radian
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecimalSeparator {
  #[serde(rename = ".")]
  Period,
  #[serde(rename = ",")]
  Comma,
}

impl Default for DecimalSeparator {
  fn default() -> Self {
    DecimalSeparator::Period
  }
}

impl DecimalSeparator {
  pub fn as_char(self) -> char {
    match self {
      DecimalSeparator::Period => '.',
      DecimalSeparator::Comma => ',',
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DigitGroupingSeparator {
  #[serde(rename = "")]
  None,
  #[serde(rename = " ")]
  Space,
  #[serde(rename = ",")]
  Comma,
  #[serde(rename = ".")]
  Period,
  #[serde(rename = "\u{2032}")]
  Prime,
}

impl Default for DigitGroupingSeparator {
  fn default() -> Self {
    DigitGroupingSeparator::None
  }
}

impl DigitGroupingSeparator {
  pub fn as_str(self) -> &'static str {
    match self {
      DigitGroupingSeparator::None => "",
      DigitGroupingSeparator::Space => " ",
      DigitGroupingSeparator::Comma => ",",
      DigitGroupingSeparator::Period => ".",
      DigitGroupingSeparator::Prime => "\u{2032}",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DigitGroupingSize {
  Three,
  /// South Asian lakh/crore grouping: the ones-group is 3 digits, every
  /// group above it is 2.
  TwoThree,
  Four,
  Off,
}

impl Default for DigitGroupingSize {
  fn default() -> Self {
    DigitGroupingSize::Off
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DateFormat {
  /// `YYYY-MM-DD DDD`
  YmdDdd,
  /// `YYYY MMM DD DDD`
  YMmmDDdd,
  /// `DDD DD MMM YYYY`
  DddDMmmY,
  /// `DDD MMM DD YYYY`
  DddMmmDY,
}

impl Default for DateFormat {
  fn default() -> Self {
    DateFormat::YmdDdd
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimeFormat {
  H23,
  H12,
}

impl Default for TimeFormat {
  fn default() -> Self {
    TimeFormat::H23
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateTimeFormat {
  DateThenTime,
  TimeThenDate,
}

impl Default for DateTimeFormat {
  fn default() -> Self {
    DateTimeFormat::DateThenTime
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UnitDisplayStyle {
  Symbol,
  Name,
}

impl Default for UnitDisplayStyle {
  fn default() -> Self {
    UnitDisplayStyle::Symbol
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ImperialUnits {
  Us,
  Uk,
}

impl Default for ImperialUnits {
  fn default() -> Self {
    ImperialUnits::Us
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_default_settings_round_trip() {
    let settings = Settings::default();
    let json = serde_json::to_string(&settings).unwrap();
    let parsed: Settings = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, settings);
  }

  #[test]
  fn test_precision_from_raw_rejects_unlisted_values() {
    assert_eq!(Precision::from_raw(-1), Some(Precision::Auto));
    assert_eq!(Precision::from_raw(6), Some(Precision::Fixed(6)));
    assert_eq!(Precision::from_raw(3), None);
  }

  #[test]
  fn test_decimal_separator_rename() {
    let comma = serde_json::to_string(&DecimalSeparator::Comma).unwrap();
    assert_eq!(comma, "\",\"");
  }
}
