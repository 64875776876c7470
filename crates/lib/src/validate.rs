//! Property name checks.
//!
//! Each check has a configurable [`Level`]: `error` fails the definition,
//! `warn` logs and continues, `ignore` skips the check.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::data::properties::{KNOWN, UNPREFIXED_SUPPORTED, is_deprecated, is_known, strip_vendor_prefix};
use crate::error::{Result, StyleError};

/// A problem found with a property name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationIssue {
  #[error("unknown CSS property{}", .suggestion.as_ref().map(|s| format!(" (did you mean `{s}`?)")).unwrap_or_default())]
  UnknownProperty { suggestion: Option<String> },

  #[error("vendor prefix is unnecessary, `{unprefixed}` is supported everywhere")]
  RedundantVendorPrefix { unprefixed: String },

  #[error("property is deprecated")]
  Deprecated,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
  Error,
  #[default]
  Warn,
  Ignore,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
  pub unknown_property: Level,
  pub vendor_prefix: Level,
  pub deprecated: Level,
}

/// Closest known property within two edits.
fn suggest(property: &str) -> Option<String> {
  KNOWN
    .iter()
    .map(|known| (strsim::levenshtein(property, known), known))
    .filter(|(distance, _)| *distance <= 2)
    .min_by_key(|(distance, _)| *distance)
    .map(|(_, known)| known.to_string())
}

impl ValidationConfig {
  /// Configured level for an issue.
  pub fn level(&self, issue: &ValidationIssue) -> Level {
    match issue {
      ValidationIssue::UnknownProperty { .. } => self.unknown_property,
      ValidationIssue::RedundantVendorPrefix { .. } => self.vendor_prefix,
      ValidationIssue::Deprecated => self.deprecated,
    }
  }
}

/// Every issue with a property name, regardless of level.
pub fn issues(property: &str) -> Vec<ValidationIssue> {
  let mut out = Vec::new();
  if property.starts_with("--") {
    return out;
  }
  match strip_vendor_prefix(property) {
    Some((_, unprefixed)) if UNPREFIXED_SUPPORTED.contains(&unprefixed) => {
      out.push(ValidationIssue::RedundantVendorPrefix {
        unprefixed: unprefixed.to_string(),
      });
    }
    Some(_) => {}
    None if !is_known(property) => out.push(ValidationIssue::UnknownProperty {
      suggestion: suggest(property),
    }),
    None => {}
  }
  if is_deprecated(property) {
    out.push(ValidationIssue::Deprecated);
  }
  out
}

/// Check a property name, logging or failing per the configured levels.
pub fn validate_property(property: &str, config: &ValidationConfig) -> Result<()> {
  for issue in issues(property) {
    match config.level(&issue) {
      Level::Ignore => {}
      Level::Warn => warn!(property, issue = %issue, "style validation"),
      Level::Error => {
        return Err(StyleError::Validation {
          property: property.to_string(),
          issue,
        });
      }
    }
  }
  Ok(())
}
