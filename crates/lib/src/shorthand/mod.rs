//! Shorthand expansion strategies.
//!
//! A strategy decides what a shorthand declaration turns into before
//! normalization. It is chosen once per [`Context`](crate::context::Context)
//! and never changes mid-compilation, so every class in a build agrees on
//! how `margin` and friends behave.

mod flatten;
mod forbid;
mod keep;

use std::fmt::Debug;
use std::sync::Arc;

pub use flatten::Flatten;
pub use forbid::ForbidShorthands;
pub use keep::KeepWithResets;

use crate::config::ShorthandMode;
use crate::conditional::FlatEntry;
use crate::error::Result;
use crate::value::Leaf;

/// One declaration produced by a strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct Expanded {
  pub property: String,
  /// `None` is a reset: no CSS, but the property is claimed by the class.
  pub value: Option<Leaf>,
}

impl Expanded {
  pub fn value(property: impl Into<String>, leaf: Leaf) -> Self {
    Self {
      property: property.into(),
      value: Some(leaf),
    }
  }

  pub fn reset(property: impl Into<String>) -> Self {
    Self {
      property: property.into(),
      value: None,
    }
  }
}

/// Expands one `(property, value)` pair into the declarations to emit.
pub trait ShorthandStrategy: Debug + Send + Sync {
  /// Short name used in logs.
  fn name(&self) -> &'static str;

  /// Expand `property: value`. Non-shorthands come back unchanged.
  fn expand(&self, property: &str, value: &Leaf) -> Result<Vec<Expanded>>;
}

/// Build the strategy for a configured mode.
pub fn strategy_for(mode: ShorthandMode, disallowed: &[String]) -> Arc<dyn ShorthandStrategy> {
  match mode {
    ShorthandMode::KeepWithResets => Arc::new(KeepWithResets),
    ShorthandMode::Flatten => Arc::new(Flatten),
    ShorthandMode::Forbid if disallowed.is_empty() => Arc::new(ForbidShorthands::default()),
    ShorthandMode::Forbid => Arc::new(ForbidShorthands::new(disallowed.iter().cloned())),
  }
}

/// Conditional entries regrouped under one output property.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpandedGroup {
  pub property: String,
  pub entries: Vec<(Option<String>, Option<Leaf>)>,
}

/// Expand every flattened entry and regroup per output property.
///
/// Groups appear in the order their property was first produced, and each
/// group keeps its entries in the original condition order.
pub fn expand_entries(
  strategy: &dyn ShorthandStrategy,
  property: &str,
  entries: &[FlatEntry],
) -> Result<Vec<ExpandedGroup>> {
  let mut groups: Vec<ExpandedGroup> = Vec::new();
  for (path, leaf) in entries {
    for expanded in strategy.expand(property, leaf)? {
      let entry = (path.clone(), expanded.value);
      match groups.iter_mut().find(|g| g.property == expanded.property) {
        Some(group) => group.entries.push(entry),
        None => groups.push(ExpandedGroup {
          property: expanded.property,
          entries: vec![entry],
        }),
      }
    }
  }
  Ok(groups)
}
