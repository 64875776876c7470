//! Identifier hashing for content-addressed artifacts.
//!
//! Every generated name (atomic classes, variables, themes, keyframes, ...)
//! is derived from a 32-bit MurmurHash2 of a canonical input string, rendered
//! in lowercase base 36. The arithmetic mirrors the historical JavaScript
//! implementation exactly, so names are stable across builds and across
//! reimplementations:
//!
//! ```
//! use atomcss_lib::util::hash::hash;
//!
//! assert_eq!(hash("<>displayflexnull"), "78zum5");
//! ```
//!
//! Inputs are hashed as UTF-8 bytes.

use crate::consts::{HASH_SEED, NULL_MODIFIER};

const MURMUR_M: u32 = 0x5bd1_e995;

/// Multiply by the MurmurHash2 constant using the 16x16-bit split.
///
/// The low and high halves are multiplied separately and recombined, which
/// keeps every intermediate inside the range the reference implementation
/// could represent exactly.
fn mul_m(value: u32) -> u32 {
  let low = (value & 0xffff).wrapping_mul(MURMUR_M);
  let high = ((value >> 16).wrapping_mul(MURMUR_M) & 0xffff) << 16;
  low.wrapping_add(high)
}

/// 32-bit MurmurHash2 over raw bytes.
pub fn murmurhash2(bytes: &[u8], seed: u32) -> u32 {
  let mut remaining = bytes.len();
  let mut h = seed ^ (bytes.len() as u32);
  let mut chunks = bytes.chunks_exact(4);

  for chunk in chunks.by_ref() {
    let mut k = u32::from(chunk[0]) | (u32::from(chunk[1]) << 8) | (u32::from(chunk[2]) << 16) | (u32::from(chunk[3]) << 24);
    k = mul_m(k);
    k ^= k >> 24;
    k = mul_m(k);
    h = mul_m(h) ^ k;
    remaining -= 4;
  }

  let tail = chunks.remainder();
  if remaining >= 3 {
    h ^= u32::from(tail[2]) << 16;
  }
  if remaining >= 2 {
    h ^= u32::from(tail[1]) << 8;
  }
  if remaining >= 1 {
    h ^= u32::from(tail[0]);
    h = mul_m(h);
  }

  h ^= h >> 13;
  h = mul_m(h);
  h ^= h >> 15;
  h
}

/// Encode an integer in lowercase base 36.
pub fn to_base36(mut value: u32) -> String {
  const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

  if value == 0 {
    return "0".to_string();
  }

  let mut out = Vec::new();
  while value > 0 {
    out.push(DIGITS[(value % 36) as usize]);
    value /= 36;
  }
  out.reverse();
  String::from_utf8(out).unwrap_or_default()
}

/// Decode a lowercase base-36 string. Returns `None` on invalid digits or overflow.
pub fn from_base36(encoded: &str) -> Option<u32> {
  if encoded.is_empty() {
    return None;
  }
  encoded.chars().try_fold(0u32, |acc, c| {
    let digit = c.to_digit(36)?;
    if c.is_ascii_uppercase() {
      return None;
    }
    acc.checked_mul(36)?.checked_add(digit)
  })
}

/// Hash a string into its base-36 identifier fragment.
pub fn hash(input: &str) -> String {
  to_base36(murmurhash2(input.as_bytes(), HASH_SEED))
}

/// Sort a pseudo chain.
///
/// Pseudo-elements (`::x`) stay where they are and split the chain into runs;
/// each run of pseudo-classes is sorted alphabetically, with `default` first.
pub fn sort_pseudos(pseudos: &[String]) -> Vec<String> {
  if pseudos.len() < 2 {
    return pseudos.to_vec();
  }

  let mut sorted = Vec::with_capacity(pseudos.len());
  let mut run: Vec<String> = Vec::new();

  let flush = |run: &mut Vec<String>, sorted: &mut Vec<String>| {
    run.sort_by(|a, b| match (a.as_str(), b.as_str()) {
      ("default", "default") => std::cmp::Ordering::Equal,
      ("default", _) => std::cmp::Ordering::Less,
      (_, "default") => std::cmp::Ordering::Greater,
      _ => a.cmp(b),
    });
    sorted.append(run);
  };

  for pseudo in pseudos {
    if pseudo.starts_with("::") {
      flush(&mut run, &mut sorted);
      sorted.push(pseudo.clone());
    } else {
      run.push(pseudo.clone());
    }
  }
  flush(&mut run, &mut sorted);
  sorted
}

/// Sort at-rules lexicographically.
pub fn sort_at_rules(at_rules: &[String]) -> Vec<String> {
  let mut sorted = at_rules.to_vec();
  sorted.sort();
  sorted
}

/// The modifier part of a class hash input.
///
/// Inputs must already be sorted. Returns `"null"` when both chains are empty.
pub fn modifier_string(sorted_pseudos: &[String], sorted_at_rules: &[String]) -> String {
  let joined = format!("{}{}", sorted_pseudos.concat(), sorted_at_rules.concat());
  if joined.is_empty() {
    NULL_MODIFIER.to_string()
  } else {
    joined
  }
}

/// Content-addressed atomic class name.
///
/// Pseudos and at-rules may be passed in any order; they are sorted here so
/// equivalent condition chains always produce the same name.
pub fn class_name(prefix: &str, property: &str, value: &str, pseudos: &[String], at_rules: &[String]) -> String {
  let modifiers = modifier_string(&sort_pseudos(pseudos), &sort_at_rules(at_rules));
  format!("{prefix}{}", hash(&format!("<>{property}{value}{modifiers}")))
}

/// Artifact kinds that receive a hashed name. Each kind hashes under its own
/// prefix so the same logical name never collides across kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
  Var,
  Theme,
  Keyframes,
  PositionTry,
  ViewTransition,
  Marker,
}

impl NameKind {
  fn tag(self) -> &'static str {
    match self {
      NameKind::Var => "var",
      NameKind::Theme => "theme",
      NameKind::Keyframes => "keyframes",
      NameKind::PositionTry => "position-try",
      NameKind::ViewTransition => "view-transition",
      NameKind::Marker => "marker",
    }
  }

  /// Whether the rendered name must be a dashed ident (`--name`).
  fn is_dashed(self) -> bool {
    matches!(self, NameKind::Var | NameKind::PositionTry)
  }
}

/// Hashed name for a non-class artifact.
///
/// `path` is the dot-joined distinguishing path, e.g. `scope.namespace.name`.
/// `content` is appended when the name should also change with the artifact's
/// canonical content (keyframes).
pub fn artifact_name(prefix: &str, kind: NameKind, path: &str, content: Option<&str>) -> String {
  let input = match content {
    Some(content) => format!("{}:{path}:{content}", kind.tag()),
    None => format!("{}:{path}", kind.tag()),
  };
  let dashes = if kind.is_dashed() { "--" } else { "" };
  format!("{dashes}{prefix}{}", hash(&input))
}

#[cfg(test)]
mod tests {
  use super::*;
  use proptest::prelude::*;

  fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
  }

  #[test]
  fn known_vectors() {
    assert_eq!(murmurhash2(b"", 1), 1540447798);
    assert_eq!(murmurhash2(b"a", 1), 626045324);
    assert_eq!(murmurhash2(b"abc", 1), 1621425345);
    assert_eq!(murmurhash2(b"hello world", 1), 2213174766);
    assert_eq!(hash("<>displayflexnull"), "78zum5");
    assert_eq!(hash("<>colorred:hover"), "1dgwipm");
  }

  #[test]
  fn unicode_input_hashes_utf8_bytes() {
    assert_eq!(murmurhash2("héllo ✓".as_bytes(), 1), 61465726);
    assert_eq!(hash("héllo ✓"), "10lf9a");
  }

  #[test]
  fn base36_round_trip_matches_raw_hash() {
    for input in ["", "abc", "<>colorred:hover:focus", "héllo ✓"] {
      let raw = murmurhash2(input.as_bytes(), HASH_SEED);
      assert_eq!(from_base36(&hash(input)), Some(raw));
    }
    assert_eq!(from_base36("zvce6s"), Some(2168962516));
  }

  #[test]
  fn base36_rejects_garbage() {
    assert_eq!(from_base36(""), None);
    assert_eq!(from_base36("ABC"), None);
    assert_eq!(from_base36("a-b"), None);
    assert_eq!(from_base36("zzzzzzzzz"), None);
  }

  #[test]
  fn class_name_uses_null_modifier() {
    assert_eq!(class_name("x", "display", "flex", &[], &[]), "x78zum5");
  }

  #[test]
  fn class_name_ignores_condition_order() {
    let a = class_name("x", "color", "red", &strings(&[":hover", ":focus"]), &[]);
    let b = class_name("x", "color", "red", &strings(&[":focus", ":hover"]), &[]);
    assert_eq!(a, b);
    assert_eq!(a, format!("x{}", hash("<>colorred:focus:hover")));
  }

  #[test]
  fn sort_pseudos_keeps_elements_fixed() {
    let sorted = sort_pseudos(&strings(&[":hover", ":active", "::before", ":focus", "default"]));
    assert_eq!(sorted, strings(&[":active", ":hover", "::before", "default", ":focus"]));
  }

  #[test]
  fn sort_at_rules_is_lexicographic() {
    let sorted = sort_at_rules(&strings(&["@supports (x: y)", "@media print", "@container (a)"]));
    assert_eq!(sorted, strings(&["@container (a)", "@media print", "@supports (x: y)"]));
  }

  #[test]
  fn artifact_kinds_never_collide() {
    let var = artifact_name("x", NameKind::Var, "app.colors.primary", None);
    let theme = artifact_name("x", NameKind::Theme, "app.colors.primary", None);
    assert!(var.starts_with("--x"));
    assert_ne!(var.trim_start_matches("--"), theme);
  }

  proptest! {
    #[test]
    fn class_names_are_deterministic(property in "[a-z-]{1,20}", value in ".{0,30}") {
      let first = class_name("x", &property, &value, &[], &[]);
      let second = class_name("x", &property, &value, &[], &[]);
      prop_assert_eq!(first, second);
    }

    #[test]
    fn base36_round_trips(value in any::<u32>()) {
      prop_assert_eq!(from_base36(&to_base36(value)), Some(value));
    }
  }
}
