use super::{Expanded, ShorthandStrategy};
use crate::data::shorthands::implied_longhands;
use crate::error::Result;
use crate::value::Leaf;

/// Keep the shorthand and reset every longhand it implies.
///
/// The resets carry no CSS. They exist so that merging a later class that
/// sets `margin` drops an earlier class's `margin-top`.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepWithResets;

impl ShorthandStrategy for KeepWithResets {
  fn name(&self) -> &'static str {
    "keep-with-resets"
  }

  fn expand(&self, property: &str, value: &Leaf) -> Result<Vec<Expanded>> {
    let mut out = vec![Expanded::value(property, value.clone())];
    out.extend(implied_longhands(property).into_iter().map(Expanded::reset));
    Ok(out)
  }
}
