//! Error types for atomcss-lib.

use thiserror::Error;

use crate::manifest::{ArtifactKind, ManifestError};
use crate::validate::ValidationIssue;

/// Errors raised while defining, looking up, or persisting style artifacts.
#[derive(Debug, Error)]
pub enum StyleError {
  /// A null, boolean, or otherwise unsupported value was used as a CSS value.
  #[error("invalid value for `{property}`: {reason}")]
  InvalidValue { property: String, reason: String },

  /// A referenced artifact does not exist in the manifest.
  #[error("unknown {kind} `{name}` in scope `{scope}` (has that scope been compiled yet?)")]
  UnknownReference {
    kind: ArtifactKind,
    scope: String,
    name: String,
  },

  /// A shorthand property was used while the forbid strategy disallows it.
  #[error("shorthand property `{property}` is not allowed, use {alternatives} instead")]
  DisallowedProperty { property: String, alternatives: String },

  /// A validation check configured as an error failed.
  #[error("`{property}`: {issue}")]
  Validation { property: String, issue: ValidationIssue },

  /// Reading, writing, or locking the manifest failed.
  #[error(transparent)]
  Manifest(#[from] ManifestError),
}

impl StyleError {
  pub(crate) fn invalid(property: &str, reason: impl Into<String>) -> Self {
    StyleError::InvalidValue {
      property: property.to_string(),
      reason: reason.into(),
    }
  }
}

/// Result type for style operations.
pub type Result<T> = std::result::Result<T, StyleError>;
