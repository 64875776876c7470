//! Compilation context.
//!
//! A [`Context`] owns the configuration, the shorthand strategy chosen for
//! the build, and the manifest backend. Every `define_*` call compiles
//! against a snapshot of the manifest and commits the result in one locked
//! update, so redefining an artifact with identical content never writes.

use std::sync::Arc;

use tracing::debug;

use crate::class::merge_classes;
use crate::compiler::Compiler;
use crate::config::Config;
use crate::define::VarSpec;
use crate::emit::render;
use crate::error::{Result, StyleError};
use crate::manifest::{ArtifactKind, ClassDef, IsolatedManifest, Manifest, ManifestBackend, ManifestStore, artifact_key};
use crate::normalize::Normalizer;
use crate::shorthand::{ShorthandStrategy, strategy_for};
use crate::value::Declarations;

#[derive(Debug)]
pub struct Context {
  config: Config,
  strategy: Arc<dyn ShorthandStrategy>,
  backend: Box<dyn ManifestBackend>,
}

impl Context {
  /// Context backed by the manifest file named in `config`.
  pub fn new(config: Config) -> Self {
    let store = ManifestStore::new(config.manifest_path.clone(), config.lock);
    Self::with_backend(config, Box::new(store))
  }

  /// Context backed by a private in-memory manifest.
  pub fn in_memory(config: Config) -> Self {
    Self::with_backend(config, Box::new(IsolatedManifest::default()))
  }

  pub fn with_backend(config: Config, backend: Box<dyn ManifestBackend>) -> Self {
    let strategy = strategy_for(config.shorthands, &config.disallowed_shorthands);
    debug!(strategy = strategy.name(), "created context");
    Self {
      config,
      strategy,
      backend,
    }
  }

  pub fn config(&self) -> &Config {
    &self.config
  }

  pub fn strategy(&self) -> &dyn ShorthandStrategy {
    self.strategy.as_ref()
  }

  /// The last committed manifest.
  pub fn manifest(&self) -> Result<Manifest> {
    Ok(self.backend.read()?)
  }

  /// Manifest writes performed through this context's backend.
  pub fn writes(&self) -> u64 {
    self.backend.writes()
  }

  fn compile<T>(&self, f: impl FnOnce(&Compiler) -> Result<T>) -> Result<T> {
    let snapshot = self.backend.read()?;
    let compiler = Compiler {
      prefix: &self.config.class_prefix,
      normalizer: Normalizer::new(self.config.root_font_size),
      strategy: self.strategy.as_ref(),
      validation: &self.config.validation,
      manifest: &snapshot,
    };
    f(&compiler)
  }

  fn commit(&self, kind: ArtifactKind, key: &str, mut put: impl FnMut(&mut Manifest) -> bool) -> Result<bool> {
    let mut changed = false;
    let wrote = self.backend.update(&mut |manifest| changed = put(manifest))?;
    debug!(%kind, key, changed, wrote, "defined artifact");
    Ok(wrote)
  }

  /// Compile and store class `scope.name`; returns its class string.
  pub fn define_class(&self, scope: &str, name: &str, declarations: &Declarations) -> Result<String> {
    let key = artifact_key(scope, name);
    let def = self.compile(|c| c.compile_class(declarations))?;
    let classes = def.class_string();
    self.commit(ArtifactKind::Class, &key, |m| m.put_class(&key, def.clone()))?;
    Ok(classes)
  }

  /// Store variable `scope.namespace.name`; returns its `var(--…)` reference.
  pub fn define_var(&self, scope: &str, namespace: &str, name: &str, spec: &VarSpec) -> Result<String> {
    let key = artifact_key(scope, &format!("{namespace}.{name}"));
    let def = self.compile(|c| c.var(scope, namespace, name, spec))?;
    let reference = format!("var({})", def.name);
    self.commit(ArtifactKind::Var, &key, |m| m.put_var(&key, def.clone()))?;
    Ok(reference)
  }

  /// Store several variables of one namespace in a single update.
  pub fn define_vars(&self, scope: &str, namespace: &str, vars: &[(String, VarSpec)]) -> Result<Vec<String>> {
    let defs = self.compile(|c| {
      vars
        .iter()
        .map(|(name, spec)| {
          let key = artifact_key(scope, &format!("{namespace}.{name}"));
          c.var(scope, namespace, name, spec).map(|def| (key, def))
        })
        .collect::<Result<Vec<_>>>()
    })?;
    let references = defs.iter().map(|(_, def)| format!("var({})", def.name)).collect();
    let label = artifact_key(scope, namespace);
    self.commit(ArtifactKind::Var, &label, |m| {
      defs
        .iter()
        .fold(false, |changed, (key, def)| m.put_var(key, def.clone()) | changed)
    })?;
    Ok(references)
  }

  /// Store constants `scope.namespace.*`; returns their values in order.
  pub fn define_consts(&self, scope: &str, namespace: &str, consts: &Declarations) -> Result<Vec<String>> {
    let values = self.compile(|c| {
      consts
        .iter()
        .map(|(name, raw)| {
          let key = artifact_key(scope, &format!("{namespace}.{name}"));
          c.constant(namespace, name, raw).map(|value| (key, value))
        })
        .collect::<Result<Vec<_>>>()
    })?;
    let label = artifact_key(scope, namespace);
    self.commit(ArtifactKind::Const, &label, |m| {
      values
        .iter()
        .fold(false, |changed, (key, value)| m.put_const(key, value.clone()) | changed)
    })?;
    Ok(values.into_iter().map(|(_, value)| value).collect())
  }

  /// Store keyframes; returns the generated animation name.
  pub fn define_keyframes(&self, scope: &str, name: &str, frames: &[(String, Declarations)]) -> Result<String> {
    let key = artifact_key(scope, name);
    let def = self.compile(|c| c.keyframes(scope, name, frames))?;
    let css_name = def.name.clone();
    self.commit(ArtifactKind::Keyframes, &key, |m| m.put_keyframes(&key, def.clone()))?;
    Ok(css_name)
  }

  /// Store a theme; returns the theme class name.
  pub fn define_theme(&self, scope: &str, namespace: &str, name: &str, overrides: &Declarations) -> Result<String> {
    let key = artifact_key(scope, &format!("{namespace}.{name}"));
    let def = self.compile(|c| c.theme(scope, namespace, name, overrides))?;
    let class_name = def.class_name.clone();
    self.commit(ArtifactKind::Theme, &key, |m| m.put_theme(&key, def.clone()))?;
    Ok(class_name)
  }

  /// Store a position-try rule; returns its dashed name.
  pub fn define_position_try(&self, scope: &str, name: &str, declarations: &Declarations) -> Result<String> {
    let key = artifact_key(scope, name);
    let def = self.compile(|c| c.position_try(scope, name, declarations))?;
    let css_name = def.name.clone();
    self.commit(ArtifactKind::PositionTry, &key, |m| m.put_position_try(&key, def.clone()))?;
    Ok(css_name)
  }

  /// Store a view transition; returns its view-transition class.
  pub fn define_view_transition(&self, scope: &str, name: &str, parts: &[(String, Declarations)]) -> Result<String> {
    let key = artifact_key(scope, name);
    let def = self.compile(|c| c.view_transition(scope, name, parts))?;
    let css_name = def.name.clone();
    self.commit(ArtifactKind::ViewTransition, &key, |m| m.put_view_transition(&key, def.clone()))?;
    Ok(css_name)
  }

  /// Store a marker; returns its class name.
  pub fn define_marker(&self, scope: &str, name: &str) -> Result<String> {
    let key = artifact_key(scope, name);
    let class_name = self.compile(|c| Ok(c.marker(scope, name)))?;
    self.commit(ArtifactKind::Marker, &key, |m| m.put_marker(&key, class_name.clone()))?;
    Ok(class_name)
  }

  /// Resolve a symbolic key, failing when it has not been defined.
  pub fn lookup(&self, kind: ArtifactKind, scope: &str, name: &str) -> Result<String> {
    self
      .manifest()?
      .lookup(kind, &artifact_key(scope, name))
      .ok_or_else(|| StyleError::UnknownReference {
        kind,
        scope: scope.to_string(),
        name: name.to_string(),
      })
  }

  /// `var(--…)` for variable `namespace.name`.
  pub fn lookup_var(&self, scope: &str, namespace: &str, name: &str) -> Result<String> {
    self.lookup(ArtifactKind::Var, scope, &format!("{namespace}.{name}"))
  }

  pub fn lookup_class(&self, scope: &str, name: &str) -> Result<String> {
    self.lookup(ArtifactKind::Class, scope, name)
  }

  pub fn lookup_keyframes(&self, scope: &str, name: &str) -> Result<String> {
    self.lookup(ArtifactKind::Keyframes, scope, name)
  }

  pub fn lookup_theme(&self, scope: &str, namespace: &str, name: &str) -> Result<String> {
    self.lookup(ArtifactKind::Theme, scope, &format!("{namespace}.{name}"))
  }

  pub fn lookup_marker(&self, scope: &str, name: &str) -> Result<String> {
    self.lookup(ArtifactKind::Marker, scope, name)
  }

  /// The stored definition of class `scope.name`.
  pub fn class_def(&self, scope: &str, name: &str) -> Result<ClassDef> {
    self
      .manifest()?
      .classes
      .remove(&artifact_key(scope, name))
      .ok_or_else(|| StyleError::UnknownReference {
        kind: ArtifactKind::Class,
        scope: scope.to_string(),
        name: name.to_string(),
      })
  }

  /// Merge stored classes `(scope, name)` in order; later atoms win.
  pub fn merge(&self, classes: &[(&str, &str)]) -> Result<String> {
    let manifest = self.manifest()?;
    let defs = classes
      .iter()
      .map(|(scope, name)| {
        manifest
          .classes
          .get(&artifact_key(scope, name))
          .ok_or_else(|| StyleError::UnknownReference {
            kind: ArtifactKind::Class,
            scope: scope.to_string(),
            name: name.to_string(),
          })
      })
      .collect::<Result<Vec<_>>>()?;
    Ok(merge_classes(&defs))
  }

  /// Render the committed manifest as CSS.
  pub fn render(&self) -> Result<String> {
    Ok(render(&self.manifest()?, &self.config))
  }

  /// An isolated copy of this context. Definitions made through the fork
  /// stay in memory until [`Context::absorb`] commits them.
  pub fn fork(&self) -> Result<Context> {
    let snapshot = self.manifest()?;
    Ok(Context {
      config: self.config.clone(),
      strategy: Arc::clone(&self.strategy),
      backend: Box::new(IsolatedManifest::new(snapshot)),
    })
  }

  /// Commit everything a fork defined; returns whether a write happened.
  pub fn absorb(&self, fork: Context) -> Result<bool> {
    let defined = fork.manifest()?;
    let mut changed = false;
    let wrote = self.backend.update(&mut |m| changed = m.merge_from(&defined))?;
    debug!(changed, wrote, "absorbed fork");
    Ok(wrote)
  }

  /// Replace the manifest with an empty one.
  pub fn clear(&self) -> Result<bool> {
    Ok(self.backend.update(&mut |m| *m = Manifest::new())?)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::util::testutil::decls;
  use crate::validate::Level;

  fn context() -> Context {
    let mut config = Config::default();
    config.validation.unknown_property = Level::Error;
    Context::in_memory(config)
  }

  #[test]
  fn identical_redefinition_does_not_write() {
    let ctx = context();
    let a = ctx.define_class("app", "row", &decls(&[("display", "flex".into())])).unwrap();
    let b = ctx.define_class("app", "row", &decls(&[("display", "flex".into())])).unwrap();
    assert_eq!(a, b);
    assert_eq!(a, "x78zum5");
    assert_eq!(ctx.writes(), 1);
  }

  #[test]
  fn changed_definition_overwrites() {
    let ctx = context();
    ctx.define_class("app", "row", &decls(&[("display", "flex".into())])).unwrap();
    ctx.define_class("app", "row", &decls(&[("display", "grid".into())])).unwrap();
    assert_eq!(ctx.writes(), 2);
    assert_ne!(ctx.lookup_class("app", "row").unwrap(), "x78zum5");
  }

  #[test]
  fn failed_definition_leaves_manifest_alone() {
    let ctx = context();
    let err = ctx.define_class("app", "bad", &decls(&[("colr", "red".into())])).unwrap_err();
    assert!(matches!(err, StyleError::Validation { .. }));
    assert!(ctx.manifest().unwrap().is_empty());
  }

  #[test]
  fn classes_resolve_references_to_vars() {
    let ctx = context();
    let reference = ctx.define_var("app", "colors", "primary", &VarSpec::plain("red")).unwrap();
    let classes = ctx
      .define_class(
        "app",
        "title",
        &decls(&[("color", crate::value::Reference::var("app", "colors", "primary").into())]),
      )
      .unwrap();
    let manifest = ctx.manifest().unwrap();
    let rule = &manifest.classes["app.title"].rules[0];
    assert_eq!(rule.value, reference);
    assert_eq!(rule.class_name, classes);
  }

  #[test]
  fn missing_reference_fails_loudly() {
    let ctx = context();
    let err = ctx.lookup_var("app", "colors", "primary").unwrap_err();
    assert!(err.to_string().contains("colors.primary"), "{err}");
    let err = ctx
      .define_class(
        "app",
        "title",
        &decls(&[("color", crate::value::Reference::var("app", "colors", "primary").into())]),
      )
      .unwrap_err();
    assert!(matches!(err, StyleError::UnknownReference { .. }));
  }

  #[test]
  fn fork_is_isolated_until_absorbed() {
    let ctx = context();
    let fork = ctx.fork().unwrap();
    fork.define_marker("app", "card").unwrap();
    assert!(ctx.lookup_marker("app", "card").is_err());
    assert!(ctx.absorb(fork).unwrap());
    assert!(ctx.lookup_marker("app", "card").is_ok());
  }

  #[test]
  fn merge_uses_stored_classes() {
    let ctx = context();
    ctx.define_class("app", "a", &decls(&[("color", "red".into())])).unwrap();
    let blue = ctx.define_class("app", "b", &decls(&[("color", "blue".into())])).unwrap();
    assert_eq!(ctx.merge(&[("app", "a"), ("app", "b")]).unwrap(), blue);
    assert!(ctx.merge(&[("app", "missing")]).is_err());
  }
}
