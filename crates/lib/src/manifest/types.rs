//! Manifest types.
//!
//! The manifest is the durable record of every artifact compiled so far. Each
//! collection is keyed by the artifact's symbolic key:
//!
//! - `"<scope>.<name>"` for constants, keyframes, position-try rules, view
//!   transitions, classes and markers
//! - `"<scope>.<namespace>.<name>"` for variables and themes
//!
//! [`BTreeMap`] keeps serialization order deterministic, so an unchanged
//! manifest serializes to identical bytes.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::MANIFEST_VERSION;
use crate::error::{Result, StyleError};
use crate::rtl::RtlOverride;
use crate::value::{Reference, ReferenceResolver};

/// The kinds of artifact the manifest stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
  Var,
  Const,
  Keyframes,
  PositionTry,
  ViewTransition,
  Class,
  Theme,
  Marker,
}

impl fmt::Display for ArtifactKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      ArtifactKind::Var => "variable",
      ArtifactKind::Const => "constant",
      ArtifactKind::Keyframes => "keyframes",
      ArtifactKind::PositionTry => "position-try",
      ArtifactKind::ViewTransition => "view transition",
      ArtifactKind::Class => "class",
      ArtifactKind::Theme => "theme",
      ArtifactKind::Marker => "marker",
    };
    f.write_str(name)
  }
}

/// A `property: value` pair in output order.
pub type DeclarationPair = (String, String);

/// Syntax registration emitted as an `@property` rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertySyntax {
  pub syntax: String,
  pub inherits: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub initial_value: Option<String>,
}

/// A value under an at-rule chain; an empty chain is the `:root` default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopedValue {
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub at_rules: Vec<String>,
  pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VarDef {
  /// Custom property name, `--x…`.
  pub name: String,
  pub values: Vec<ScopedValue>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub syntax: Option<PropertySyntax>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
  /// `from`, `to`, `50%` or a comma list of those.
  pub selector: String,
  pub declarations: Vec<DeclarationPair>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyframesDef {
  pub name: String,
  pub frames: Vec<Frame>,
  /// Frames rendered as `<name>-rtl`, present only when they differ.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub rtl_frames: Option<Vec<Frame>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionTryDef {
  /// Dashed ident, `--x…`.
  pub name: String,
  pub declarations: Vec<DeclarationPair>,
}

/// The view-transition pseudo-element a rule targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransitionPart {
  Group,
  ImagePair,
  Old,
  New,
}

impl TransitionPart {
  pub const ALL: [TransitionPart; 4] = [
    TransitionPart::Group,
    TransitionPart::ImagePair,
    TransitionPart::Old,
    TransitionPart::New,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      TransitionPart::Group => "group",
      TransitionPart::ImagePair => "image-pair",
      TransitionPart::Old => "old",
      TransitionPart::New => "new",
    }
  }

  pub fn parse(name: &str) -> Option<Self> {
    Self::ALL
      .into_iter()
      .find(|part| part.as_str() == name.replace('_', "-"))
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRule {
  pub part: TransitionPart,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub at_rules: Vec<String>,
  pub declarations: Vec<DeclarationPair>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewTransitionDef {
  /// The view-transition class name.
  pub name: String,
  pub rules: Vec<TransitionRule>,
}

/// One compiled atomic rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtomicRule {
  pub class_name: String,
  /// Physical LTR property.
  pub property: String,
  /// Single value, or the fallback list joined for display.
  pub value: String,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub pseudos: Vec<String>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub at_rules: Vec<String>,
  /// Composed fallback declarations in emission order.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub fallbacks: Option<Vec<String>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub rtl: Option<RtlOverride>,
  pub priority: u32,
}

impl AtomicRule {
  /// Declaration values in emission order.
  pub fn values(&self) -> Vec<&str> {
    match &self.fallbacks {
      Some(values) => values.iter().map(String::as_str).collect(),
      None => vec![self.value.as_str()],
    }
  }
}

/// The class (or reset) a class definition assigns for one property key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Atom {
  /// Property key, `::before_color` style for pseudo-element blocks.
  pub key: String,
  /// Space-separated class names; `None` is a reset.
  pub classes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDef {
  pub atoms: Vec<Atom>,
  pub rules: Vec<AtomicRule>,
}

impl ClassDef {
  /// The `class` attribute value for this definition alone.
  pub fn class_string(&self) -> String {
    self
      .atoms
      .iter()
      .filter_map(|atom| atom.classes.as_deref())
      .collect::<Vec<_>>()
      .join(" ")
  }
}

/// Variable overrides applied under a theme class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeBlock {
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub at_rules: Vec<String>,
  /// `(custom property, value)` pairs.
  pub declarations: Vec<DeclarationPair>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeDef {
  pub class_name: String,
  pub blocks: Vec<ThemeBlock>,
}

/// The persisted set of compiled artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
  pub version: u32,
  #[serde(default)]
  pub vars: BTreeMap<String, VarDef>,
  #[serde(default)]
  pub consts: BTreeMap<String, String>,
  #[serde(default)]
  pub keyframes: BTreeMap<String, KeyframesDef>,
  #[serde(default)]
  pub position_tries: BTreeMap<String, PositionTryDef>,
  #[serde(default)]
  pub view_transitions: BTreeMap<String, ViewTransitionDef>,
  #[serde(default)]
  pub classes: BTreeMap<String, ClassDef>,
  #[serde(default)]
  pub themes: BTreeMap<String, ThemeDef>,
  /// Marker class names.
  #[serde(default)]
  pub markers: BTreeMap<String, String>,
}

impl Default for Manifest {
  fn default() -> Self {
    Self {
      version: MANIFEST_VERSION,
      vars: BTreeMap::new(),
      consts: BTreeMap::new(),
      keyframes: BTreeMap::new(),
      position_tries: BTreeMap::new(),
      view_transitions: BTreeMap::new(),
      classes: BTreeMap::new(),
      themes: BTreeMap::new(),
      markers: BTreeMap::new(),
    }
  }
}

/// Insert or overwrite; returns whether anything changed.
fn put<T: PartialEq>(map: &mut BTreeMap<String, T>, key: &str, value: T) -> bool {
  if map.get(key) == Some(&value) {
    return false;
  }
  map.insert(key.to_string(), value);
  true
}

/// Per-collection counts for status output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ManifestStats {
  pub vars: usize,
  pub consts: usize,
  pub keyframes: usize,
  pub position_tries: usize,
  pub view_transitions: usize,
  pub classes: usize,
  pub rules: usize,
  pub themes: usize,
  pub markers: usize,
}

/// Symbolic key for a scoped artifact.
pub fn artifact_key(scope: &str, name: &str) -> String {
  format!("{scope}.{name}")
}

impl Manifest {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_empty(&self) -> bool {
    self.vars.is_empty()
      && self.consts.is_empty()
      && self.keyframes.is_empty()
      && self.position_tries.is_empty()
      && self.view_transitions.is_empty()
      && self.classes.is_empty()
      && self.themes.is_empty()
      && self.markers.is_empty()
  }

  pub fn put_var(&mut self, key: &str, def: VarDef) -> bool {
    put(&mut self.vars, key, def)
  }

  pub fn put_const(&mut self, key: &str, value: String) -> bool {
    put(&mut self.consts, key, value)
  }

  pub fn put_keyframes(&mut self, key: &str, def: KeyframesDef) -> bool {
    put(&mut self.keyframes, key, def)
  }

  pub fn put_position_try(&mut self, key: &str, def: PositionTryDef) -> bool {
    put(&mut self.position_tries, key, def)
  }

  pub fn put_view_transition(&mut self, key: &str, def: ViewTransitionDef) -> bool {
    put(&mut self.view_transitions, key, def)
  }

  pub fn put_class(&mut self, key: &str, def: ClassDef) -> bool {
    put(&mut self.classes, key, def)
  }

  pub fn put_theme(&mut self, key: &str, def: ThemeDef) -> bool {
    put(&mut self.themes, key, def)
  }

  pub fn put_marker(&mut self, key: &str, class_name: String) -> bool {
    put(&mut self.markers, key, class_name)
  }

  /// Copy every artifact from `other`, overwriting on conflict.
  pub fn merge_from(&mut self, other: &Manifest) -> bool {
    let mut changed = false;
    for (k, v) in &other.vars {
      changed |= self.put_var(k, v.clone());
    }
    for (k, v) in &other.consts {
      changed |= self.put_const(k, v.clone());
    }
    for (k, v) in &other.keyframes {
      changed |= self.put_keyframes(k, v.clone());
    }
    for (k, v) in &other.position_tries {
      changed |= self.put_position_try(k, v.clone());
    }
    for (k, v) in &other.view_transitions {
      changed |= self.put_view_transition(k, v.clone());
    }
    for (k, v) in &other.classes {
      changed |= self.put_class(k, v.clone());
    }
    for (k, v) in &other.themes {
      changed |= self.put_theme(k, v.clone());
    }
    for (k, v) in &other.markers {
      changed |= self.put_marker(k, v.clone());
    }
    changed
  }

  /// Whether keyframes with this generated name have an RTL variant.
  pub fn keyframes_has_rtl(&self, name: &str) -> bool {
    self
      .keyframes
      .values()
      .any(|def| def.name == name && def.rtl_frames.is_some())
  }

  /// Resolve a symbolic key to the text other styles use to refer to it.
  ///
  /// Classes resolve to their class string, variables to `var(--…)`.
  pub fn lookup(&self, kind: ArtifactKind, key: &str) -> Option<String> {
    match kind {
      ArtifactKind::Var => self.vars.get(key).map(|v| format!("var({})", v.name)),
      ArtifactKind::Const => self.consts.get(key).cloned(),
      ArtifactKind::Keyframes => self.keyframes.get(key).map(|k| k.name.clone()),
      ArtifactKind::PositionTry => self.position_tries.get(key).map(|p| p.name.clone()),
      ArtifactKind::ViewTransition => self.view_transitions.get(key).map(|v| v.name.clone()),
      ArtifactKind::Class => self.classes.get(key).map(ClassDef::class_string),
      ArtifactKind::Theme => self.themes.get(key).map(|t| t.class_name.clone()),
      ArtifactKind::Marker => self.markers.get(key).cloned(),
    }
  }

  pub fn stats(&self) -> ManifestStats {
    ManifestStats {
      vars: self.vars.len(),
      consts: self.consts.len(),
      keyframes: self.keyframes.len(),
      position_tries: self.position_tries.len(),
      view_transitions: self.view_transitions.len(),
      classes: self.classes.len(),
      rules: self.classes.values().map(|c| c.rules.len()).sum(),
      themes: self.themes.len(),
      markers: self.markers.len(),
    }
  }
}

impl ReferenceResolver for Manifest {
  fn resolve(&self, reference: &Reference) -> Result<String> {
    self
      .lookup(reference.kind, &artifact_key(&reference.scope, &reference.name))
      .ok_or_else(|| StyleError::UnknownReference {
        kind: reference.kind,
        scope: reference.scope.clone(),
        name: reference.name.clone(),
      })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn var(name: &str, value: &str) -> VarDef {
    VarDef {
      name: name.to_string(),
      values: vec![ScopedValue {
        at_rules: vec![],
        value: value.to_string(),
      }],
      syntax: None,
    }
  }

  #[test]
  fn identical_put_is_not_a_change() {
    let mut manifest = Manifest::new();
    assert!(manifest.put_var("app.colors.primary", var("--x1", "red")));
    assert!(!manifest.put_var("app.colors.primary", var("--x1", "red")));
    assert!(manifest.put_var("app.colors.primary", var("--x1", "blue")));
  }

  #[test]
  fn references_resolve_by_kind() {
    let mut manifest = Manifest::new();
    manifest.put_var("app.colors.primary", var("--x1", "red"));
    manifest.put_const("app.sizes.sm", "4px".to_string());

    let resolved = manifest.resolve(&Reference::var("app", "colors", "primary")).unwrap();
    assert_eq!(resolved, "var(--x1)");
    let resolved = manifest.resolve(&Reference::constant("app", "sizes", "sm")).unwrap();
    assert_eq!(resolved, "4px");
  }

  #[test]
  fn missing_reference_names_scope_and_name() {
    let err = Manifest::new()
      .resolve(&Reference::keyframes("app", "spin"))
      .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("app"), "{message}");
    assert!(message.contains("spin"), "{message}");
    assert!(message.contains("keyframes"), "{message}");
  }

  #[test]
  fn serialization_is_deterministic() {
    let mut a = Manifest::new();
    a.put_const("b.x", "1".to_string());
    a.put_const("a.x", "2".to_string());
    let mut b = Manifest::new();
    b.put_const("a.x", "2".to_string());
    b.put_const("b.x", "1".to_string());
    assert_eq!(serde_json::to_string(&a).unwrap(), serde_json::to_string(&b).unwrap());
  }

  #[test]
  fn merge_reports_changes() {
    let mut base = Manifest::new();
    let mut fork = Manifest::new();
    fork.put_marker("app.card", "x9".to_string());
    assert!(base.merge_from(&fork));
    assert!(!base.merge_from(&fork));
  }
}
