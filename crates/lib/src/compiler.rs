//! Shared compile settings.
//!
//! A [`Compiler`] bundles everything one definition needs: naming prefix,
//! normalizer, shorthand strategy, validation levels, and a manifest snapshot
//! for resolving references. Artifact builders are `impl Compiler` blocks in
//! [`crate::class`] and [`crate::define`].

use crate::conditional::{FlatEntry, flatten, split_condition_path};
use crate::error::{Result, StyleError};
use crate::fallback::compose;
use crate::manifest::{Manifest, ScopedValue};
use crate::normalize::Normalizer;
use crate::shorthand::ShorthandStrategy;
use crate::validate::ValidationConfig;
use crate::value::{Declaration, Leaf, RawValue, classify, leaf};

pub struct Compiler<'a> {
  pub prefix: &'a str,
  pub normalizer: Normalizer,
  pub strategy: &'a dyn ShorthandStrategy,
  pub validation: &'a ValidationConfig,
  pub manifest: &'a Manifest,
}

impl Compiler<'_> {
  /// Normalized declaration values for a leaf, in emission order.
  pub fn leaf_values(&self, property: &str, value: &Leaf) -> Result<Vec<String>> {
    match value {
      Leaf::Value(scalar) => Ok(vec![self.normalizer.normalize(property, scalar)]),
      Leaf::Fallbacks(list) => {
        let normalized: Vec<String> = list
          .values
          .iter()
          .map(|scalar| self.normalizer.normalize(property, scalar))
          .collect();
        compose(property, list.policy, &normalized)
      }
    }
  }

  /// A leaf that must compose to exactly one declaration.
  fn one_value(&self, property: &str, value: &Leaf) -> Result<String> {
    let mut values = self.leaf_values(property, value)?;
    match values.len() {
      1 => Ok(values.remove(0)),
      _ => Err(StyleError::invalid(property, "expected a single value, not a fallback list")),
    }
  }

  /// A raw value that must reduce to exactly one declaration.
  pub fn single_value(&self, property: &str, raw: &RawValue) -> Result<String> {
    let classified = leaf(property, raw, self.manifest)?;
    self.one_value(property, &classified)
  }

  /// Values keyed by at-rule chain, for artifacts that cannot carry pseudo
  /// conditions (variables, themes, view transitions).
  pub fn scoped_values(&self, property: &str, raw: &RawValue) -> Result<Vec<ScopedValue>> {
    let entries: Vec<FlatEntry> = match classify(property, raw, self.manifest)? {
      Declaration::Literal(scalar) => vec![(None, Leaf::Value(scalar))],
      Declaration::Fallbacks(list) => vec![(None, Leaf::Fallbacks(list))],
      Declaration::Conditional(map) => flatten(&map),
      Declaration::PseudoElementBlock(_) => {
        return Err(StyleError::invalid(property, "pseudo-element blocks are only allowed in classes"));
      }
    };
    entries
      .into_iter()
      .map(|(path, value)| {
        let (pseudos, at_rules) = path.as_deref().map(split_condition_path).unwrap_or_default();
        if !pseudos.is_empty() {
          return Err(StyleError::invalid(
            property,
            format!("`{}` is not an at-rule; only `default` and `@…` conditions apply here", pseudos.concat()),
          ));
        }
        Ok(ScopedValue {
          at_rules,
          value: self.one_value(property, &value)?,
        })
      })
      .collect()
  }
}
