//! Canonical CSS text for a single value.
//!
//! Equal styles must hash to equal class names, so every value goes through
//! the same pipeline before it reaches the namer:
//!
//! 1. numbers get a unit from the property class (`px`, `ms`, none, or `rem`
//!    for `font-size` when a root size is configured);
//! 2. whitespace is trimmed and collapsed, and dropped around commas and
//!    inside function parentheses;
//! 3. numeric tokens are rewritten: `500ms` → `.5s`, `0.5` → `.5`, and
//!    `0px` → `0` at paren depth 0 for length units;
//! 4. an empty `''` literal becomes `""`.
//!
//! Quoted strings pass through untouched at every step.

use crate::data::properties::{
  CONTENT_FUNCTIONS, CONTENT_KEYWORDS, LENGTH_UNITS, PROPERTY_LISTS, QUOTED_CONTENT, is_time, is_unitless,
};
use crate::value::{Scalar, dash_case};

const DECIMALS: f64 = 10_000.0;

/// Value normalizer configured for one compilation context.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Normalizer {
  /// Root font size in px; enables `font-size` px → rem conversion.
  pub root_font_size: Option<f64>,
}

impl Normalizer {
  pub fn new(root_font_size: Option<f64>) -> Self {
    Self { root_font_size }
  }

  /// Normalize a scalar for `property`.
  pub fn normalize(&self, property: &str, value: &Scalar) -> String {
    match value {
      Scalar::Int(i) => self.integer(property, *i),
      Scalar::Float(f) => self.number(property, *f),
      Scalar::Str(s) | Scalar::Ident(s) => normalize_str(property, s),
    }
  }

  fn integer(&self, property: &str, value: i64) -> String {
    if self.rem_root(property).is_some() {
      return self.number(property, value as f64);
    }
    normalize_str(property, &format!("{value}{}", unit_for(property)))
  }

  fn number(&self, property: &str, value: f64) -> String {
    if let Some(root) = self.rem_root(property) {
      return normalize_str(property, &format!("{}rem", format_number(value / root)));
    }
    normalize_str(property, &format!("{}{}", format_number(value), unit_for(property)))
  }

  fn rem_root(&self, property: &str) -> Option<f64> {
    self.root_font_size.filter(|r| property == "font-size" && *r > 0.0)
  }
}

fn unit_for(property: &str) -> &'static str {
  if is_unitless(property) {
    ""
  } else if is_time(property) {
    "ms"
  } else {
    "px"
  }
}

/// Round to four decimals and print without a trailing `.0`.
pub fn format_number(value: f64) -> String {
  let rounded = (value * DECIMALS).round() / DECIMALS;
  // avoid printing `-0`
  let rounded = if rounded == 0.0 { 0.0 } else { rounded };
  format!("{rounded}")
}

/// Normalize a string value for `property`.
pub fn normalize_str(property: &str, raw: &str) -> String {
  let trimmed = raw.trim();
  if QUOTED_CONTENT.contains(&property) && needs_quotes(trimmed) {
    return format!("\"{}\"", trimmed.replace('"', "\\\""));
  }
  let normalized = pipeline(trimmed);
  if PROPERTY_LISTS.contains(&property) {
    return normalized
      .split(',')
      .map(|token| if token.starts_with("--") { token.to_string() } else { dash_case(token) })
      .collect::<Vec<_>>()
      .join(",");
  }
  normalized
}

fn needs_quotes(value: &str) -> bool {
  if CONTENT_KEYWORDS.contains(&value) {
    return false;
  }
  if CONTENT_FUNCTIONS.iter().any(|f| value.contains(f)) {
    return false;
  }
  let quoted = value.len() >= 2
    && ((value.starts_with('"') && value.ends_with('"')) || (value.starts_with('\'') && value.ends_with('\'')));
  !quoted
}

#[derive(Debug, PartialEq)]
enum Segment<'a> {
  Text(&'a str),
  Quoted(&'a str),
}

/// Split into unquoted text and quoted literals (quotes included).
fn segments(input: &str) -> Vec<Segment<'_>> {
  let bytes = input.as_bytes();
  let mut out = Vec::new();
  let mut start = 0;
  let mut i = 0;
  while i < bytes.len() {
    let quote = bytes[i];
    if quote == b'"' || quote == b'\'' {
      if start < i {
        out.push(Segment::Text(&input[start..i]));
      }
      let open = i;
      i += 1;
      while i < bytes.len() && bytes[i] != quote {
        if bytes[i] == b'\\' {
          i += 1;
        }
        i += 1;
      }
      let end = (i + 1).min(bytes.len());
      out.push(Segment::Quoted(&input[open..end]));
      i = end;
      start = end;
    } else {
      i += 1;
    }
  }
  if start < bytes.len() {
    out.push(Segment::Text(&input[start..]));
  }
  out
}

/// Collapse whitespace and drop it around `,`, after `(` and before `)`.
fn tidy_spaces(text: &str, out: &mut String) {
  for ch in text.chars() {
    if ch.is_whitespace() {
      if !out.is_empty() && !out.ends_with([' ', ',', '(']) {
        out.push(' ');
      }
      continue;
    }
    if matches!(ch, ',' | ')') && out.ends_with(' ') {
      out.pop();
    }
    out.push(ch);
  }
}

fn is_delimiter(ch: char) -> bool {
  ch.is_whitespace() || matches!(ch, ',' | '(' | ')' | '/')
}

/// Rewrite one numeric token; anything else is returned unchanged.
fn rewrite_number(token: &str, depth: usize) -> String {
  let (sign, rest) = match token.strip_prefix(['-', '+']) {
    Some(rest) => (&token[..1], rest),
    None => ("", token),
  };
  let digits_end = rest
    .find(|c: char| !(c.is_ascii_digit() || c == '.'))
    .unwrap_or(rest.len());
  let (number, unit) = rest.split_at(digits_end);
  let parsed = match number.parse::<f64>() {
    Ok(v) if number.chars().any(|c| c.is_ascii_digit()) && number.matches('.').count() <= 1 => v,
    _ => return token.to_string(),
  };
  if !unit.is_empty() && unit != "%" && !unit.chars().all(|c| c.is_ascii_alphabetic()) {
    return token.to_string();
  }

  if unit.eq_ignore_ascii_case("ms") && parsed >= 10.0 {
    let formatted = format_number(parsed / 1000.0);
    return format!("{sign}{}s", strip_leading_zero(&formatted));
  }
  if parsed == 0.0 && depth == 0 && LENGTH_UNITS.contains(&unit.to_ascii_lowercase().as_str()) {
    return "0".to_string();
  }
  format!("{sign}{}{unit}", strip_leading_zero(number))
}

fn strip_leading_zero(number: &str) -> &str {
  match number.strip_prefix('0') {
    Some(rest) if rest.starts_with('.') => rest,
    _ => number,
  }
}

/// Apply numeric rewrites to unquoted text, tracking paren depth.
fn rewrite_numbers(text: &str, depth: &mut usize, out: &mut String) {
  let mut token = String::new();
  let flush = |token: &mut String, depth: usize, out: &mut String| {
    if !token.is_empty() {
      out.push_str(&rewrite_number(token, depth));
      token.clear();
    }
  };
  for ch in text.chars() {
    if is_delimiter(ch) {
      flush(&mut token, *depth, out);
      match ch {
        '(' => *depth += 1,
        ')' => *depth = depth.saturating_sub(1),
        _ => {}
      }
      out.push(ch);
    } else {
      token.push(ch);
    }
  }
  flush(&mut token, *depth, out);
}

fn pipeline(input: &str) -> String {
  let mut tidy = String::with_capacity(input.len());
  for part in segments(input) {
    match part {
      Segment::Text(text) => tidy_spaces(text, &mut tidy),
      Segment::Quoted(quoted) => tidy.push_str(quoted),
    }
  }

  let mut depth = 0;
  let mut out = String::with_capacity(tidy.len());
  for part in segments(&tidy) {
    match part {
      Segment::Text(text) => rewrite_numbers(text, &mut depth, &mut out),
      Segment::Quoted("''") => out.push_str("\"\""),
      Segment::Quoted(quoted) => out.push_str(quoted),
    }
  }
  out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn norm(property: &str, value: &str) -> String {
    normalize_str(property, value)
  }

  #[test]
  fn numbers_take_units_from_property_class() {
    let n = Normalizer::default();
    assert_eq!(n.normalize("width", &Scalar::Int(10)), "10px");
    assert_eq!(n.normalize("opacity", &Scalar::Float(0.5)), ".5");
    assert_eq!(n.normalize("z-index", &Scalar::Int(3)), "3");
    assert_eq!(n.normalize("--gap", &Scalar::Int(4)), "4");
    assert_eq!(n.normalize("transition-duration", &Scalar::Int(500)), ".5s");
    assert_eq!(n.normalize("transition-duration", &Scalar::Int(5)), "5ms");
    assert_eq!(n.normalize("margin", &Scalar::Int(0)), "0");
  }

  #[test]
  fn large_integers_keep_every_digit() {
    let n = Normalizer::default();
    assert_eq!(n.normalize("z-index", &Scalar::Int(9_007_199_254_740_993)), "9007199254740993");
    assert_eq!(n.normalize("width", &Scalar::Int(-9_007_199_254_740_993)), "-9007199254740993px");
  }

  #[test]
  fn floats_round_to_four_decimals() {
    let n = Normalizer::default();
    assert_eq!(n.normalize("width", &Scalar::Float(1.234_567)), "1.2346px");
    assert_eq!(n.normalize("width", &Scalar::Float(-0.5)), "-.5px");
  }

  #[test]
  fn font_size_uses_rem_with_root_size() {
    let n = Normalizer::new(Some(16.0));
    assert_eq!(n.normalize("font-size", &Scalar::Int(16)), "1rem");
    assert_eq!(n.normalize("font-size", &Scalar::Int(24)), "1.5rem");
    assert_eq!(n.normalize("width", &Scalar::Int(16)), "16px");
    assert_eq!(Normalizer::default().normalize("font-size", &Scalar::Int(16)), "16px");
  }

  #[test]
  fn whitespace_is_collapsed_and_trimmed() {
    assert_eq!(norm("margin", "  1px    2px "), "1px 2px");
    assert_eq!(norm("font-family", "a , b,  c"), "a,b,c");
    assert_eq!(norm("transform", "translate( 10px , 20px )"), "translate(10px,20px)");
  }

  #[test]
  fn timings_and_leading_zeros() {
    assert_eq!(norm("transition-duration", "500ms"), ".5s");
    assert_eq!(norm("transition-duration", "1500ms"), "1.5s");
    assert_eq!(norm("transition-duration", "10ms"), ".01s");
    assert_eq!(norm("animation-delay", "-2500ms"), "-2.5s");
    assert_eq!(norm("transition-duration", "9ms"), "9ms");
    assert_eq!(norm("opacity", "0.25"), ".25");
    assert_eq!(norm("transition", "opacity 250ms ease"), "opacity .25s ease");
  }

  #[test]
  fn zero_lengths_lose_units_only_at_top_level() {
    assert_eq!(norm("margin", "0px"), "0");
    assert_eq!(norm("margin", "0px 0rem 10px 0em"), "0 0 10px 0");
    assert_eq!(norm("width", "calc(0px + 10px)"), "calc(0px + 10px)");
    assert_eq!(norm("flex-basis", "0%"), "0%");
    assert_eq!(norm("grid-template-columns", "0fr 1fr"), "0fr 1fr");
  }

  #[test]
  fn quoted_strings_are_never_rewritten() {
    assert_eq!(norm("font-family", "'Open   Sans' , serif"), "'Open   Sans',serif");
    assert_eq!(norm("grid-template-areas", "\"0px  a\""), "\"0px  a\"");
    assert_eq!(norm("quotes", "''"), "\"\"");
  }

  #[test]
  fn content_is_quoted_unless_already_valid() {
    assert_eq!(norm("content", "hello"), "\"hello\"");
    assert_eq!(norm("content", "''"), "\"\"");
    assert_eq!(norm("content", "'x'"), "'x'");
    assert_eq!(norm("content", "none"), "none");
    assert_eq!(norm("content", "attr(data-label)"), "attr(data-label)");
    assert_eq!(norm("content", "counter(item) \". \""), "counter(item) \". \"");
    assert_eq!(norm("hyphenate-character", "-"), "\"-\"");
  }

  #[test]
  fn property_lists_are_hyphenated() {
    assert_eq!(norm("transition-property", "backgroundColor, opacity"), "background-color,opacity");
    assert_eq!(norm("will-change", "border_color,--my_var"), "border-color,--my_var");
  }
}
