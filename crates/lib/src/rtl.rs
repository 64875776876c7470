//! Logical properties and values mapped to physical LTR/RTL pairs.

use serde::{Deserialize, Serialize};

use crate::consts::RTL_KEYFRAMES_SUFFIX;
use crate::data::logical::{POSITION_FLIPPED, VALUE_FLIPPED, physical_property, physical_value};

/// Declarations applied under `html[dir="rtl"]` instead of the LTR ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RtlOverride {
  pub property: String,
  /// One value, or the composed fallback declarations in emission order.
  pub values: Vec<String>,
  /// Also set the LTR property to `initial` so both directions do not apply.
  #[serde(default, skip_serializing_if = "std::ops::Not::not")]
  pub reset_ltr: bool,
}

/// A declaration resolved for both directions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directional {
  pub property: String,
  pub values: Vec<String>,
  pub rtl: Option<RtlOverride>,
}

fn flip_keyword(value: &str, pick_rtl: bool) -> String {
  match physical_value(value) {
    Some((ltr, rtl)) => (if pick_rtl { rtl } else { ltr }).to_string(),
    None => value.to_string(),
  }
}

/// Flip each position word while keeping separators.
fn flip_positions(value: &str, pick_rtl: bool) -> String {
  let mut out = String::with_capacity(value.len());
  let mut word = String::new();
  for ch in value.chars() {
    if ch.is_whitespace() || ch == ',' {
      out.push_str(&flip_keyword(&word, pick_rtl));
      word.clear();
      out.push(ch);
    } else {
      word.push(ch);
    }
  }
  out.push_str(&flip_keyword(&word, pick_rtl));
  out
}

fn direction_value(property: &str, value: &str, pick_rtl: bool) -> String {
  if VALUE_FLIPPED.contains(&property) {
    flip_keyword(value, pick_rtl)
  } else if POSITION_FLIPPED.contains(&property) {
    flip_positions(value, pick_rtl)
  } else {
    value.to_string()
  }
}

/// Resolve `property: values` into physical LTR declarations plus an
/// optional RTL override. No override is produced when both directions
/// come out identical.
pub fn transform(property: &str, values: &[String]) -> Directional {
  let (ltr_property, rtl_property) = match physical_property(property) {
    Some((ltr, rtl)) => (ltr.to_string(), rtl.to_string()),
    None => (property.to_string(), property.to_string()),
  };
  let ltr_values: Vec<String> = values.iter().map(|v| direction_value(property, v, false)).collect();
  let rtl_values: Vec<String> = values.iter().map(|v| direction_value(property, v, true)).collect();

  let rtl = (rtl_property != ltr_property || rtl_values != ltr_values).then(|| RtlOverride {
    reset_ltr: rtl_property != ltr_property,
    property: rtl_property,
    values: rtl_values,
  });
  Directional {
    property: ltr_property,
    values: ltr_values,
    rtl,
  }
}

/// Rename keyframe references that have an RTL variant.
///
/// Applies to `animation-name` and `animation`; returns `None` when no token
/// names RTL-aware keyframes.
pub fn animation_rtl(property: &str, value: &str, has_rtl_variant: impl Fn(&str) -> bool) -> Option<String> {
  if property != "animation-name" && property != "animation" {
    return None;
  }
  let mut changed = false;
  let mut out = String::with_capacity(value.len() + RTL_KEYFRAMES_SUFFIX.len());
  let mut word = String::new();
  let mut flush = |word: &mut String, out: &mut String| {
    if !word.is_empty() && has_rtl_variant(word) {
      changed = true;
      out.push_str(word);
      out.push_str(RTL_KEYFRAMES_SUFFIX);
    } else {
      out.push_str(word);
    }
    word.clear();
  };
  for ch in value.chars() {
    if ch.is_whitespace() || ch == ',' {
      flush(&mut word, &mut out);
      out.push(ch);
    } else {
      word.push(ch);
    }
  }
  flush(&mut word, &mut out);
  changed.then_some(out)
}
