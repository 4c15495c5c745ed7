
//! Date/time rendering: pattern tokens selected by [`Settings`],
//! `UTC±H`/`UTC±H:MM` zone normalization.
//!
//! Grounded on the teacher's `mode::display::language::basic::datetime::write_datetime`:
//! the same `time::format_description` machinery and the same
//! component-presence dispatch (show seconds only when nonzero, show
//! subseconds only when nonzero), minus the teacher's `html_escape`
//! step, which belongs to its HTML presentation host and has no
//! counterpart here. Since the date/time pattern itself is settings-
//! selected rather than fixed, descriptions are built at runtime with
//! `time::format_description::parse` instead of the teacher's
//! compile-time `format_description!` macro.

use super::FormatError;
use crate::eval::value::Value;
use crate::settings::{DateFormat, DateTimeFormat, Settings, TimeFormat};

use time::{Date, OffsetDateTime, Time, UtcOffset};

pub fn format_datetime(value: &Value, settings: &Settings) -> Result<String, FormatError> {
  match value {
    Value::PlainDate(date) => format_date(*date, settings),
    Value::PlainTime(time) => format_time(*time, settings),
    Value::PlainDateTime(dt) => combine(&format_date(dt.date(), settings)?, &format_time(dt.time(), settings)?, settings),
    Value::ZonedDateTime { instant, zone_label } => format_zoned(*instant, zone_label, settings),
    Value::Instant(instant) => format_zoned(*instant, "UTC", settings),
    other => Err(FormatError(format!("{} is not a date/time value", other.type_name()))),
  }
}

fn format_date(date: Date, settings: &Settings) -> Result<String, FormatError> {
  let description = time::format_description::parse(date_pattern(settings.date_format))?;
  Ok(date.format(&description)?)
}

fn format_time(time: Time, settings: &Settings) -> Result<String, FormatError> {
  let description = time::format_description::parse(&time_pattern(settings.time_format, time))?;
  Ok(time.format(&description)?)
}

fn format_zoned(instant: OffsetDateTime, zone_label: &str, settings: &Settings) -> Result<String, FormatError> {
  let date_str = format_date(instant.date(), settings)?;
  let time_str = format_time(instant.time(), settings)?;
  let combined = combine(&date_str, &time_str, settings)?;
  Ok(format!("{combined} {}", normalize_zone(instant.offset(), zone_label)))
}

fn combine(date_str: &str, time_str: &str, settings: &Settings) -> Result<String, FormatError> {
  Ok(match settings.date_time_format {
    DateTimeFormat::DateThenTime => format!("{date_str} {time_str}"),
    DateTimeFormat::TimeThenDate => format!("{time_str} {date_str}"),
  })
}

fn date_pattern(format: DateFormat) -> &'static str {
  match format {
    DateFormat::YmdDdd => "[year]-[month]-[day] [weekday repr:short]",
    DateFormat::YMmmDDdd => "[year] [month repr:short] [day] [weekday repr:short]",
    DateFormat::DddDMmmY => "[weekday repr:short] [day] [month repr:short] [year]",
    DateFormat::DddMmmDY => "[weekday repr:short] [month repr:short] [day] [year]",
  }
}

fn time_pattern(format: TimeFormat, time: Time) -> String {
  let show_seconds = time.second() != 0 || time.nanosecond() != 0;
  let show_subsec = time.nanosecond() != 0;
  match format {
    TimeFormat::H23 => {
      if show_subsec {
        "[hour]:[minute]:[second].[subsecond digits:3]".to_owned()
      } else if show_seconds {
        "[hour]:[minute]:[second]".to_owned()
      } else {
        "[hour]:[minute]".to_owned()
      }
    }
    TimeFormat::H12 => {
      if show_subsec {
        "[hour repr:12 padding:none]:[minute]:[second].[subsecond digits:3][period case:lower]".to_owned()
      } else if show_seconds {
        "[hour repr:12 padding:none]:[minute]:[second][period case:lower]".to_owned()
      } else {
        "[hour repr:12 padding:none]:[minute][period case:lower]".to_owned()
      }
    }
  }
}

/// Normalizes a UTC offset to `UTC±H` when it's a whole number of
/// hours, `UTC±H:MM` otherwise. The zone label is kept alongside (not
/// displayed) for conversion bookkeeping elsewhere; here we render the
/// raw offset, matching the specification's zone-rendering rule.
fn normalize_zone(offset: UtcOffset, _zone_label: &str) -> String {
  let total_minutes = offset.whole_seconds() as i64 / 60;
  let sign = if total_minutes < 0 { "-" } else { "+" };
  let hours = total_minutes.abs() / 60;
  let minutes = total_minutes.abs() % 60;
  if minutes == 0 {
    format!("UTC{sign}{hours}")
  } else {
    format!("UTC{sign}{hours}:{minutes:02}")
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use time::macros::{date, time};

  #[test]
  fn test_format_plain_date_default_pattern() {
    let value = Value::PlainDate(date!(2024 - 03 - 15));
    let rendered = format_datetime(&value, &Settings::default()).unwrap();
    assert_eq!(rendered, "2024-03-15 Fri");
  }

  #[test]
  fn test_format_plain_time_omits_zero_seconds() {
    let value = Value::PlainTime(time!(13:05:00));
    let rendered = format_datetime(&value, &Settings::default()).unwrap();
    assert_eq!(rendered, "13:05");
  }

  #[test]
  fn test_format_plain_time_shows_nonzero_seconds() {
    let value = Value::PlainTime(time!(13:05:30));
    let rendered = format_datetime(&value, &Settings::default()).unwrap();
    assert_eq!(rendered, "13:05:30");
  }

  #[test]
  fn test_format_h12_pattern() {
    let mut settings = Settings::default();
    settings.time_format = TimeFormat::H12;
    let value = Value::PlainTime(time!(13:05:00));
    let rendered = format_datetime(&value, &settings).unwrap();
    assert_eq!(rendered, "1:05pm");
  }

  #[test]
  fn test_zone_normalizes_whole_hour_offset() {
    let instant = date!(2024 - 06 - 01).with_time(time!(9:00:00)).assume_offset(UtcOffset::from_hms(9, 0, 0).unwrap());
    let value = Value::ZonedDateTime { instant, zone_label: "Asia/Tokyo".to_owned() };
    let rendered = format_datetime(&value, &Settings::default()).unwrap();
    assert!(rendered.ends_with("UTC+9"), "got {rendered}");
  }

  #[test]
  fn test_zone_normalizes_fractional_hour_offset() {
    let instant = date!(2024 - 06 - 01).with_time(time!(9:00:00)).assume_offset(UtcOffset::from_hms(5, 30, 0).unwrap());
    let value = Value::ZonedDateTime { instant, zone_label: "Asia/Kolkata".to_owned() };
    let rendered = format_datetime(&value, &Settings::default()).unwrap();
    assert!(rendered.ends_with("UTC+5:30"), "got {rendered}");
  }

  #[test]
  fn test_date_then_time_order_setting() {
    let mut settings = Settings::default();
    settings.date_time_format = DateTimeFormat::TimeThenDate;
    let value = Value::PlainDateTime(date!(2024 - 03 - 15).with_time(time!(13:05:00)));
    let rendered = format_datetime(&value, &settings).unwrap();
    assert_eq!(rendered, "13:05 2024-03-15 Fri");
  }
}
