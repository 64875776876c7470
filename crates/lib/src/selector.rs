//! Selector text for atomic rules.

use crate::consts::RTL_SCOPE;
use crate::data::pseudo::THUMB_EXPANSIONS;
use crate::priority::needs_bump;

const THUMB: &str = "::thumb";

/// Specificity bump appended when cascade layers are disabled.
pub const NO_LAYER_BUMP: &str = ":not(#\\#)";

/// Build the selector list for a class with its pseudo chain.
///
/// `::thumb` expands into one selector per vendor pseudo-element.
pub fn build_selector(class_name: &str, pseudos: &[String], at_rules: &[String], layers: bool) -> String {
  let mut base = format!(".{class_name}");
  if needs_bump(pseudos, at_rules) {
    if layers {
      base.push_str(&format!(".{class_name}"));
    } else {
      base.push_str(NO_LAYER_BUMP);
    }
  }

  let mut selectors = vec![base];
  for pseudo in pseudos {
    if pseudo == THUMB {
      selectors = selectors
        .iter()
        .flat_map(|s| THUMB_EXPANSIONS.iter().map(move |t| format!("{s}{t}")))
        .collect();
    } else {
      for selector in &mut selectors {
        selector.push_str(pseudo);
      }
    }
  }
  selectors.join(",")
}

/// Scope every selector in a list under `html[dir="rtl"]`.
pub fn rtl_selector(selector: &str) -> String {
  let mut parts = Vec::new();
  let mut depth = 0usize;
  let mut start = 0;
  for (i, ch) in selector.char_indices() {
    match ch {
      '(' => depth += 1,
      ')' => depth = depth.saturating_sub(1),
      ',' if depth == 0 => {
        parts.push(&selector[start..i]);
        start = i + 1;
      }
      _ => {}
    }
  }
  parts.push(&selector[start..]);
  parts
    .iter()
    .map(|s| format!("{RTL_SCOPE} {s}"))
    .collect::<Vec<_>>()
    .join(",")
}

/// Wrap a rule in its at-rules, outermost first.
pub fn wrap_at_rules(at_rules: &[String], rule: String) -> String {
  at_rules
    .iter()
    .rev()
    .fold(rule, |inner, at_rule| format!("{at_rule}{{{inner}}}"))
}
