//! Conditional value flattening.
//!
//! A conditional value is an ordered tree of condition keys. Flattening walks
//! it depth first and yields one `(path, leaf)` per terminal value, where the
//! path is the concatenation of every non-`default` key on the way down.

use crate::value::{CondValue, ConditionalMap, Leaf};

/// A flattened conditional entry. `None` is the unconditioned default.
pub type FlatEntry = (Option<String>, Leaf);

/// Flatten a conditional map, applying last-media-query-wins at each level.
pub fn flatten(map: &ConditionalMap) -> Vec<FlatEntry> {
  let mut out = Vec::new();
  walk(map, None, &mut out);
  out
}

fn walk(map: &ConditionalMap, prefix: Option<&str>, out: &mut Vec<FlatEntry>) {
  for (key, value) in last_media_query_wins(&map.0) {
    let path = if key == "default" {
      prefix.map(str::to_string)
    } else {
      Some(format!("{}{key}", prefix.unwrap_or_default()))
    };
    match value {
      CondValue::Null => {}
      CondValue::Leaf(leaf) => out.push((path, leaf.clone())),
      CondValue::Nested(inner) => walk(inner, path.as_deref(), out),
    }
  }
}

const MEDIA: &str = "@media ";

/// Query text of a simple `@media` key: parenthesised features only.
fn simple_media_query(key: &str) -> Option<&str> {
  let query = key.strip_prefix(MEDIA)?.trim();
  (query.starts_with('(') && !query.contains(',')).then_some(query)
}

fn negate(query: &str) -> String {
  if query.contains(" and ") || query.contains(" or ") {
    format!("(not ({query}))")
  } else {
    format!("(not {query})")
  }
}

/// Rewrite sibling `@media` keys so later queries shadow earlier ones.
///
/// Each simple query becomes `q_i and (not q_j)` for every later simple
/// query `q_j`. Queries naming a media type or holding a comma list are
/// left as written.
pub fn last_media_query_wins(entries: &[(String, CondValue)]) -> Vec<(String, &CondValue)> {
  let queries: Vec<Option<&str>> = entries.iter().map(|(key, _)| simple_media_query(key)).collect();
  entries
    .iter()
    .enumerate()
    .map(|(i, (key, value))| {
      let Some(query) = queries[i] else {
        return (key.clone(), value);
      };
      let later: Vec<String> = queries[i + 1..].iter().flatten().map(|q| negate(q)).collect();
      if later.is_empty() {
        return (key.clone(), value);
      }
      (format!("{MEDIA}{query} and {}", later.join(" and ")), value)
    })
    .collect()
}

/// Split a condition path into its pseudo chain and at-rule chain.
///
/// Boundaries are `:` and `@` at parenthesis depth 0; `::` starts a single
/// pseudo-element. Order within each chain is preserved.
pub fn split_condition_path(path: &str) -> (Vec<String>, Vec<String>) {
  let mut pieces: Vec<&str> = Vec::new();
  let bytes = path.as_bytes();
  let mut depth = 0usize;
  let mut start = 0;
  let mut i = 0;
  while i < bytes.len() {
    match bytes[i] {
      b'(' | b'[' => depth += 1,
      b')' | b']' => depth = depth.saturating_sub(1),
      b':' | b'@' if depth == 0 && i > start => {
        pieces.push(&path[start..i]);
        start = i;
        if bytes[i] == b':' && bytes.get(i + 1) == Some(&b':') {
          i += 1;
        }
      }
      b':' if depth == 0 && bytes.get(i + 1) == Some(&b':') => i += 1,
      _ => {}
    }
    i += 1;
  }
  if start < bytes.len() {
    pieces.push(&path[start..]);
  }

  let mut pseudos = Vec::new();
  let mut at_rules = Vec::new();
  for piece in pieces {
    let piece = piece.trim();
    if piece.starts_with('@') {
      at_rules.push(piece.to_string());
    } else if !piece.is_empty() {
      pseudos.push(piece.to_string());
    }
  }
  (pseudos, at_rules)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::value::Scalar;

  fn leaf(s: &str) -> CondValue {
    CondValue::Leaf(Leaf::Value(Scalar::Str(s.to_string())))
  }

  fn map(entries: Vec<(&str, CondValue)>) -> ConditionalMap {
    ConditionalMap(entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
  }

  fn paths(entries: &[FlatEntry]) -> Vec<Option<&str>> {
    entries.iter().map(|(p, _)| p.as_deref()).collect()
  }

  #[test]
  fn nested_paths_concatenate() {
    let tree = map(vec![
      ("default", leaf("red")),
      (":hover", CondValue::Nested(map(vec![("default", leaf("blue")), ("@media (min-width: 800px)", leaf("green"))]))),
    ]);
    let flat = flatten(&tree);
    assert_eq!(
      paths(&flat),
      vec![None, Some(":hover"), Some(":hover@media (min-width: 800px)")]
    );
  }

  #[test]
  fn nested_pseudo_classes_flatten_in_order() {
    let tree = map(vec![
      ("default", leaf("black")),
      (":hover", CondValue::Nested(map(vec![("default", leaf("red")), (":focus", leaf("blue"))]))),
    ]);
    let flat = flatten(&tree);
    let expected = |s: &str| Leaf::Value(Scalar::Str(s.to_string()));
    assert_eq!(
      flat,
      vec![
        (None, expected("black")),
        (Some(":hover".to_string()), expected("red")),
        (Some(":hover:focus".to_string()), expected("blue")),
      ]
    );
  }

  #[test]
  fn null_leaves_are_dropped() {
    let tree = map(vec![("default", leaf("red")), (":hover", CondValue::Null)]);
    assert_eq!(flatten(&tree).len(), 1);
  }

  #[test]
  fn later_media_queries_shadow_earlier_ones() {
    let tree = map(vec![
      ("default", leaf("a")),
      ("@media (min-width: 400px)", leaf("b")),
      ("@media (min-width: 800px)", leaf("c")),
    ]);
    let flat = flatten(&tree);
    assert_eq!(
      paths(&flat),
      vec![
        None,
        Some("@media (min-width: 400px) and (not (min-width: 800px))"),
        Some("@media (min-width: 800px)"),
      ]
    );
  }

  #[test]
  fn media_types_and_lists_are_untouched() {
    let tree = map(vec![
      ("@media print", leaf("a")),
      ("@media (min-width: 400px), (hover: hover)", leaf("b")),
      ("@media (min-width: 800px)", leaf("c")),
    ]);
    let flat = flatten(&tree);
    assert_eq!(
      paths(&flat),
      vec![
        Some("@media print"),
        Some("@media (min-width: 400px), (hover: hover)"),
        Some("@media (min-width: 800px)"),
      ]
    );
  }

  #[test]
  fn split_separates_pseudos_and_at_rules() {
    let (pseudos, at_rules) = split_condition_path("@media (min-width: 800px):hover");
    assert_eq!(pseudos, vec![":hover"]);
    assert_eq!(at_rules, vec!["@media (min-width: 800px)"]);

    let (pseudos, at_rules) = split_condition_path(":hover::before:focus@supports (display: grid)");
    assert_eq!(pseudos, vec![":hover", "::before", ":focus"]);
    assert_eq!(at_rules, vec!["@supports (display: grid)"]);

    let (pseudos, _) = split_condition_path(":where(.m:hover *)");
    assert_eq!(pseudos, vec![":where(.m:hover *)"]);
  }
}
