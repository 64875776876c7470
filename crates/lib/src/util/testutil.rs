//! Test helpers shared across modules.

use crate::compiler::Compiler;
use crate::manifest::Manifest;
use crate::normalize::Normalizer;
use crate::shorthand::KeepWithResets;
use crate::validate::{Level, ValidationConfig};
use crate::value::{Declarations, RawValue};

/// Validation with every check at its default `warn` level.
pub static WARN_ALL: ValidationConfig = ValidationConfig {
  unknown_property: Level::Warn,
  vendor_prefix: Level::Warn,
  deprecated: Level::Warn,
};

/// Owned declarations from borrowed pairs.
pub fn decls(items: &[(&str, RawValue)]) -> Declarations {
  items.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

/// A compiler with default settings over `manifest`.
pub fn compiler(manifest: &Manifest) -> Compiler<'_> {
  Compiler {
    prefix: "x",
    normalizer: Normalizer::default(),
    strategy: &KeepWithResets,
    validation: &WARN_ALL,
    manifest,
  }
}
