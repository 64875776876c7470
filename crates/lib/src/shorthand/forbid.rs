use std::collections::BTreeSet;

use super::{Expanded, ShorthandStrategy};
use crate::data::shorthands::{Distribution, SHORTHANDS_OF_LONGHANDS, SHORTHANDS_OF_SHORTHANDS, distribution, implied_longhands};
use crate::error::{Result, StyleError};
use crate::value::Leaf;

/// Reject disallowed shorthands, pass everything else through.
#[derive(Debug, Clone)]
pub struct ForbidShorthands {
  disallowed: BTreeSet<String>,
}

impl ForbidShorthands {
  pub fn new(disallowed: impl IntoIterator<Item = String>) -> Self {
    Self {
      disallowed: disallowed.into_iter().collect(),
    }
  }

  pub fn is_disallowed(&self, property: &str) -> bool {
    self.disallowed.contains(property)
  }
}

impl Default for ForbidShorthands {
  /// Disallows every known shorthand.
  fn default() -> Self {
    Self::new(
      SHORTHANDS_OF_SHORTHANDS
        .iter()
        .chain(SHORTHANDS_OF_LONGHANDS)
        .map(|s| s.to_string()),
    )
  }
}

fn alternatives(property: &str) -> String {
  let longhands: Vec<String> = match distribution(property) {
    Some(Distribution::Box(sides) | Distribution::Corners(sides)) => sides.iter().map(|s| s.to_string()).collect(),
    Some(Distribution::Pair(pair)) => pair.iter().map(|s| s.to_string()).collect(),
    None => implied_longhands(property),
  };
  if longhands.is_empty() {
    return "its longhand properties".to_string();
  }
  longhands.iter().map(|l| format!("`{l}`")).collect::<Vec<_>>().join(", ")
}

impl ShorthandStrategy for ForbidShorthands {
  fn name(&self) -> &'static str {
    "forbid"
  }

  fn expand(&self, property: &str, value: &Leaf) -> Result<Vec<Expanded>> {
    if self.is_disallowed(property) {
      return Err(StyleError::DisallowedProperty {
        property: property.to_string(),
        alternatives: alternatives(property),
      });
    }
    Ok(vec![Expanded::value(property, value.clone())])
  }
}
