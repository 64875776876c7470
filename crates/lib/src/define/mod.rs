//! Builders for every artifact other than classes.
//!
//! Each builder turns caller input into the record stored in the manifest.
//! Builders never touch the manifest themselves; [`crate::context::Context`]
//! runs them against a snapshot and commits the result.

mod keyframes;
mod position_try;
mod var;
mod view_transition;

pub use keyframes::{canonical_frames, frame_order};
pub use var::VarSpec;

use crate::compiler::Compiler;
use crate::error::Result;
use crate::util::hash::{NameKind, artifact_name};
use crate::value::RawValue;

impl Compiler<'_> {
  /// Normalize a constant. Constants hold plain values only.
  pub fn constant(&self, namespace: &str, name: &str, raw: &RawValue) -> Result<String> {
    // constants have no property of their own; treat them like custom properties
    self.single_value(&format!("--{namespace}-{name}"), raw)
  }

  /// Class name for a marker used by contextual selectors.
  pub fn marker(&self, scope: &str, name: &str) -> String {
    artifact_name(self.prefix, NameKind::Marker, &format!("{scope}.{name}"), None)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::manifest::Manifest;
  use crate::util::testutil::compiler;

  #[test]
  fn constants_keep_numbers_unitless() {
    let manifest = Manifest::new();
    let c = compiler(&manifest);
    assert_eq!(c.constant("sizes", "sm", &RawValue::Int(4)).unwrap(), "4");
    assert_eq!(c.constant("sizes", "md", &RawValue::from(" 0.5rem ")).unwrap(), ".5rem");
    assert!(c.constant("sizes", "lg", &RawValue::Bool(true)).is_err());
  }

  #[test]
  fn markers_are_plain_class_names() {
    let manifest = Manifest::new();
    let c = compiler(&manifest);
    let marker = c.marker("app", "card");
    assert!(marker.starts_with('x'));
    assert!(!marker.starts_with("--"));
    assert_ne!(marker, c.marker("app", "row"));
  }
}
