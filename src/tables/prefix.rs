
//! SI and binary prefixes, matched greedy-longest against the start of
//! a unit token. Grounded on the shape of the teacher's
//! `units::parsing::prefix::PrefixParser`, which likewise layers
//! prefix-stripping on top of a base unit table rather than enumerating
//! every prefixed unit combination.

/// SI prefixes, longest symbol first so that e.g. `da` (deca) is tried
/// before a bare `d` (deci) would otherwise shadow it. Exponents are
/// powers of ten applied to the unit's base-10 scale.
pub const SI_PREFIXES: &[(&str, i32)] = &[
  ("Y", 24), ("Z", 21), ("E", 18), ("P", 15), ("T", 12), ("G", 9),
  ("M", 6), ("k", 3), ("h", 2), ("da", 1),
  ("d", -1), ("c", -2), ("m", -3), ("u", -6), ("μ", -6), ("n", -9),
  ("p", -12), ("f", -15), ("a", -18), ("z", -21), ("y", -24),
];

/// Binary (IEC) prefixes, applicable only to information units (`b`,
/// `B`). Exponents are powers of 1024.
pub const BINARY_PREFIXES: &[(&str, i32)] = &[
  ("Ki", 1), ("Mi", 2), ("Gi", 3), ("Ti", 4), ("Pi", 5), ("Ei", 6),
];

/// Attempts to strip a greedy-longest-matching SI prefix from the
/// front of `token`, returning `(prefix_exponent, remaining_symbol)`.
/// Matching is case-sensitive: `Pg` parses as peta-gram, `pg` as
/// pico-gram, matching the spec's greediness requirement.
pub fn strip_si_prefix<'a>(token: &'a str, known_symbols: &dyn Fn(&str) -> bool) -> Option<(i32, &'a str)> {
  let mut candidates: Vec<&(&str, i32)> = SI_PREFIXES.iter()
    .filter(|(p, _)| token.starts_with(p) && token.len() > p.len())
    .collect();
  // Longest prefix first: `da` before `d`.
  candidates.sort_by_key(|(p, _)| std::cmp::Reverse(p.len()));
  for (prefix, exponent) in candidates {
    let rest = &token[prefix.len()..];
    if known_symbols(rest) {
      return Some((*exponent, rest));
    }
  }
  None
}

pub fn strip_binary_prefix<'a>(token: &'a str, known_symbols: &dyn Fn(&str) -> bool) -> Option<(i32, &'a str)> {
  for (prefix, exponent) in BINARY_PREFIXES {
    if let Some(rest) = token.strip_prefix(prefix) {
      if known_symbols(rest) {
        return Some((*exponent, rest));
      }
    }
  }
  None
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_peta_gram_not_pico_gram() {
    let is_gram = |s: &str| s == "g";
    let (exp, rest) = strip_si_prefix("Pg", &is_gram).unwrap();
    assert_eq!(exp, 15);
    assert_eq!(rest, "g");

    let (exp, rest) = strip_si_prefix("pg", &is_gram).unwrap();
    assert_eq!(exp, -12);
    assert_eq!(rest, "g");
  }

  #[test]
  fn test_deca_before_deci() {
    let is_m = |s: &str| s == "m";
    let (exp, rest) = strip_si_prefix("dam", &is_m).unwrap();
    assert_eq!(exp, 1);
    assert_eq!(rest, "m");
  }

  #[test]
  fn test_binary_prefix() {
    let is_b = |s: &str| s == "B";
    let (exp, rest) = strip_binary_prefix("KiB", &is_b).unwrap();
    assert_eq!(exp, 1);
    assert_eq!(rest, "B");
  }

  #[test]
  fn test_no_match_returns_none() {
    let is_g = |s: &str| s == "g";
    assert!(strip_si_prefix("xyz", &is_g).is_none());
  }
}
