use super::{Expanded, ShorthandStrategy};
use crate::data::shorthands::{Distribution, distribution};
use crate::error::Result;
use crate::value::{FallbackList, Leaf, Scalar};

/// Expand box, corner and axis-pair shorthands into their longhands.
///
/// Values that do not fit the shorthand's layout (too many parts, or
/// fallback entries with more than one part) pass through as written.
#[derive(Debug, Clone, Copy, Default)]
pub struct Flatten;

/// Split on whitespace outside parentheses and quotes.
pub(crate) fn split_top_level(value: &str) -> Vec<&str> {
  let mut parts = Vec::new();
  let mut depth = 0usize;
  let mut quote: Option<char> = None;
  let mut start: Option<usize> = None;
  for (i, ch) in value.char_indices() {
    match (quote, ch) {
      (Some(q), c) if c == q => quote = None,
      (Some(_), _) => {}
      (None, '"' | '\'') => quote = Some(ch),
      (None, '(') => depth += 1,
      (None, ')') => depth = depth.saturating_sub(1),
      (None, c) if c.is_whitespace() && depth == 0 => {
        if let Some(s) = start.take() {
          parts.push(&value[s..i]);
        }
        continue;
      }
      _ => {}
    }
    start.get_or_insert(i);
  }
  if let Some(s) = start {
    parts.push(&value[s..]);
  }
  parts
}

/// Apply 1/2/3/4-value box rules: top, right, bottom, left.
fn box_values<T: Clone>(parts: &[T]) -> Option<[T; 4]> {
  Some(match parts {
    [a] => [a.clone(), a.clone(), a.clone(), a.clone()],
    [a, b] => [a.clone(), b.clone(), a.clone(), b.clone()],
    [a, b, c] => [a.clone(), b.clone(), c.clone(), b.clone()],
    [a, b, c, d] => [a.clone(), b.clone(), c.clone(), d.clone()],
    _ => return None,
  })
}

fn distribute_str(layout: Distribution, value: &str) -> Option<Vec<(&'static str, String)>> {
  match layout {
    Distribution::Box(names) => {
      let values = box_values(&split_top_level(value))?;
      Some(names.iter().zip(values).map(|(n, v)| (*n, v.to_string())).collect())
    }
    Distribution::Corners(names) => {
      let (horizontal, vertical) = match value.split_once('/') {
        Some((h, v)) if !value.contains('(') => (h.trim(), Some(v.trim())),
        _ => (value, None),
      };
      let h = box_values(&split_top_level(horizontal))?;
      let v = match vertical {
        Some(v) => Some(box_values(&split_top_level(v))?),
        None => None,
      };
      Some(
        names
          .iter()
          .enumerate()
          .map(|(i, n)| {
            let corner = match &v {
              Some(v) if v[i] != h[i] => format!("{} {}", h[i], v[i]),
              _ => h[i].to_string(),
            };
            (*n, corner)
          })
          .collect(),
      )
    }
    Distribution::Pair(names) => match split_top_level(value).as_slice() {
      [a] => Some(vec![(names[0], a.to_string()), (names[1], a.to_string())]),
      [a, b] => Some(vec![(names[0], a.to_string()), (names[1], b.to_string())]),
      _ => None,
    },
  }
}

fn longhand_names(layout: Distribution) -> Vec<&'static str> {
  match layout {
    Distribution::Box(names) | Distribution::Corners(names) => names.to_vec(),
    Distribution::Pair(names) => names.to_vec(),
  }
}

fn is_single_part(scalar: &Scalar) -> bool {
  match scalar {
    Scalar::Str(s) | Scalar::Ident(s) => split_top_level(s).len() <= 1 && !s.contains('/'),
    Scalar::Int(_) | Scalar::Float(_) => true,
  }
}

impl ShorthandStrategy for Flatten {
  fn name(&self) -> &'static str {
    "flatten"
  }

  fn expand(&self, property: &str, value: &Leaf) -> Result<Vec<Expanded>> {
    let passthrough = || Ok(vec![Expanded::value(property, value.clone())]);
    let Some(layout) = distribution(property) else {
      return passthrough();
    };

    match value {
      Leaf::Value(Scalar::Str(s)) | Leaf::Value(Scalar::Ident(s)) => match distribute_str(layout, s) {
        Some(parts) => Ok(
          parts
            .into_iter()
            .map(|(name, part)| Expanded::value(name, Leaf::Value(Scalar::Str(part))))
            .collect(),
        ),
        None => passthrough(),
      },
      Leaf::Value(number) => Ok(
        longhand_names(layout)
          .into_iter()
          .map(|name| Expanded::value(name, Leaf::Value(number.clone())))
          .collect(),
      ),
      Leaf::Fallbacks(FallbackList { values, .. }) if values.iter().all(is_single_part) => Ok(
        longhand_names(layout)
          .into_iter()
          .map(|name| Expanded::value(name, value.clone()))
          .collect(),
      ),
      Leaf::Fallbacks(_) => passthrough(),
    }
  }
}
