//! Variables and themes.

use serde::Deserialize;

use crate::compiler::Compiler;
use crate::error::{Result, StyleError};
use crate::manifest::{ArtifactKind, PropertySyntax, ThemeBlock, ThemeDef, VarDef, artifact_key};
use crate::util::hash::{NameKind, artifact_name};
use crate::value::{Declarations, RawValue};

/// A variable's value plus optional `@property` registration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VarSpec {
  pub value: RawValue,
  /// CSS syntax string such as `<color>`; registers the variable.
  #[serde(default)]
  pub syntax: Option<String>,
  #[serde(default = "inherits_default")]
  pub inherits: bool,
}

fn inherits_default() -> bool {
  true
}

impl VarSpec {
  pub fn plain(value: impl Into<RawValue>) -> Self {
    Self {
      value: value.into(),
      syntax: None,
      inherits: true,
    }
  }

  pub fn typed(syntax: impl Into<String>, value: impl Into<RawValue>) -> Self {
    Self {
      value: value.into(),
      syntax: Some(syntax.into()),
      inherits: true,
    }
  }

  pub fn inherits(mut self, inherits: bool) -> Self {
    self.inherits = inherits;
    self
  }
}

impl Compiler<'_> {
  /// Compile variable `namespace.name` defined in `scope`.
  pub fn var(&self, scope: &str, namespace: &str, name: &str, spec: &VarSpec) -> Result<VarDef> {
    let path = format!("{scope}.{namespace}.{name}");
    let css_name = artifact_name(self.prefix, NameKind::Var, &path, None);
    let values = self.scoped_values(&css_name, &spec.value)?;

    let syntax = spec.syntax.as_ref().map(|syntax| PropertySyntax {
      syntax: syntax.trim().trim_matches('"').to_string(),
      inherits: spec.inherits,
      initial_value: values
        .iter()
        .find(|v| v.at_rules.is_empty())
        .map(|v| v.value.clone()),
    });

    Ok(VarDef {
      name: css_name,
      values,
      syntax,
    })
  }

  /// Compile a theme overriding variables of `namespace` in `scope`.
  ///
  /// Every overridden variable must already be in the manifest.
  pub fn theme(&self, scope: &str, namespace: &str, name: &str, overrides: &Declarations) -> Result<ThemeDef> {
    let mut blocks: Vec<ThemeBlock> = Vec::new();
    for (var, raw) in overrides {
      let var_name = format!("{namespace}.{var}");
      let def = self
        .manifest
        .vars
        .get(&artifact_key(scope, &var_name))
        .ok_or_else(|| StyleError::UnknownReference {
          kind: ArtifactKind::Var,
          scope: scope.to_string(),
          name: var_name.clone(),
        })?;

      for scoped in self.scoped_values(&def.name, raw)? {
        let declaration = (def.name.clone(), scoped.value);
        match blocks.iter_mut().find(|b| b.at_rules == scoped.at_rules) {
          Some(block) => block.declarations.push(declaration),
          None => blocks.push(ThemeBlock {
            at_rules: scoped.at_rules,
            declarations: vec![declaration],
          }),
        }
      }
    }
    blocks.sort_by_key(|b| b.at_rules.len());

    Ok(ThemeDef {
      class_name: artifact_name(self.prefix, NameKind::Theme, &format!("{scope}.{namespace}.{name}"), None),
      blocks,
    })
  }
}
