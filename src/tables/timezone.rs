
//! Timezone resolution: explicit UTC offsets (`UTC+5`, `+05:30`, `Z`)
//! parse directly; a curated table of city and IANA-style names maps
//! onto a fixed offset. There is no `chrono-tz`/`tz` dependency here,
//! deliberately — this spec asks only for a closed, curated set of
//! well-known zones, not full historical/DST-aware tz-database
//! resolution, so a `phf::Map` of current standard-time offsets is a
//! truthful enough model and avoids pulling in the tz database.

#[derive(Debug, Clone, Copy, thiserror::Error, PartialEq, Eq)]
#[error("unknown timezone")]
pub struct TimezoneUnknown;

/// A small set of named zones, expressed as whole-second offsets from
/// UTC. Deliberately excludes DST transitions: a zone like
/// `America/New_York` resolves to its standard-time offset only.
static NAMED_ZONES: phf::Map<&'static str, i32> = phf::phf_map! {
  "UTC" => 0,
  "GMT" => 0,
  "London" => 0,
  "Europe/London" => 0,
  "Paris" => 3_600,
  "Europe/Paris" => 3_600,
  "Berlin" => 3_600,
  "Europe/Berlin" => 3_600,
  "Tokyo" => 32_400,
  "Asia/Tokyo" => 32_400,
  "Shanghai" => 28_800,
  "Asia/Shanghai" => 28_800,
  "Kolkata" => 19_800,
  "Asia/Kolkata" => 19_800,
  "Sydney" => 36_000,
  "Australia/Sydney" => 36_000,
  "New_York" => -18_000,
  "America/New_York" => -18_000,
  "Los_Angeles" => -28_800,
  "America/Los_Angeles" => -28_800,
  "Chicago" => -21_600,
  "America/Chicago" => -21_600,
  "Denver" => -25_200,
  "America/Denver" => -25_200,
  "Sao_Paulo" => -10_800,
  "America/Sao_Paulo" => -10_800,
};

/// Parses an explicit offset expression: `UTC`, `Z`, `UTC+5`,
/// `UTC-3:30`, `+05:00`, `-0330`.
pub fn parse_utc_offset(text: &str) -> Option<i32> {
  let text = text.trim();
  if text.eq_ignore_ascii_case("utc") || text == "Z" {
    return Some(0);
  }
  let rest = text.strip_prefix("UTC").or_else(|| text.strip_prefix("utc")).unwrap_or(text);
  if rest.is_empty() {
    return Some(0);
  }
  let (sign, digits) = match rest.strip_prefix('+') {
    Some(d) => (1, d),
    None => match rest.strip_prefix('-') {
      Some(d) => (-1, d),
      None => return None,
    },
  };
  let (hours_str, minutes_str) = if let Some((h, m)) = digits.split_once(':') {
    (h, m)
  } else if digits.len() > 2 {
    digits.split_at(digits.len() - 2)
  } else {
    (digits, "0")
  };
  let hours: i32 = hours_str.parse().ok()?;
  let minutes: i32 = minutes_str.parse().ok()?;
  Some(sign * (hours * 3_600 + minutes * 60))
}

/// Resolves a textual zone reference (offset expression or curated
/// name) to a whole-second UTC offset.
pub fn resolve(text: &str) -> Result<i32, TimezoneUnknown> {
  if let Some(offset) = parse_utc_offset(text) {
    return Ok(offset);
  }
  NAMED_ZONES.get(text).copied().ok_or(TimezoneUnknown)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_utc_plus_five() {
    assert_eq!(resolve("UTC+5").unwrap(), 5 * 3_600);
  }

  #[test]
  fn test_utc_minus_three_thirty() {
    assert_eq!(resolve("UTC-3:30").unwrap(), -(3 * 3_600 + 30 * 60));
  }

  #[test]
  fn test_named_city() {
    assert_eq!(resolve("Tokyo").unwrap(), 9 * 3_600);
  }

  #[test]
  fn test_iana_style_name() {
    assert_eq!(resolve("America/New_York").unwrap(), -5 * 3_600);
  }

  #[test]
  fn test_unknown_zone_errors() {
    assert!(resolve("Mars/Olympus_Mons").is_err());
  }
}
