//! Explicit build-time registration.
//!
//! A build plan is a JSON list of artifact definitions applied to a
//! [`Context`] in order. Object key order is preserved, so declaration order
//! and condition order survive the round trip through the file:
//!
//! ```json
//! [
//!   {"kind": "var", "scope": "app", "namespace": "colors", "name": "ink", "value": "black"},
//!   {"kind": "class", "scope": "app", "name": "title", "declarations": {
//!     "color": {"$ref": {"kind": "var", "scope": "app", "name": "colors.ink"}},
//!     "font_size": {"default": 16, "@media (min-width: 800px)": 20}
//!   }}
//! ]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};
use thiserror::Error;
use tracing::{debug, info};

use crate::context::Context;
use crate::define::VarSpec;
use crate::error::StyleError;
use crate::manifest::{ArtifactKind, artifact_key};
use crate::value::{Declarations, RawValue};

#[derive(Debug, Error)]
pub enum RegistrationError {
  #[error("failed to read build plan {}: {source}", .path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("invalid build plan: {0}")]
  Parse(#[source] serde_json::Error),

  #[error("failed to define {kind} `{key}`: {source}")]
  Define {
    kind: ArtifactKind,
    key: String,
    #[source]
    source: StyleError,
  },
}

/// An ordered JSON object as declarations.
fn ordered<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Declarations, D::Error> {
  match RawValue::deserialize(deserializer)? {
    RawValue::Map(entries) => Ok(entries),
    _ => Err(serde::de::Error::custom("expected an object of declarations")),
  }
}

/// An ordered JSON object whose values are declaration objects.
fn nested<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<(String, Declarations)>, D::Error> {
  let RawValue::Map(entries) = RawValue::deserialize(deserializer)? else {
    return Err(serde::de::Error::custom("expected an object of declaration blocks"));
  };
  entries
    .into_iter()
    .map(|(key, value)| match value {
      RawValue::Map(declarations) => Ok((key, declarations)),
      _ => Err(serde::de::Error::custom(format!("`{key}` must map to an object of declarations"))),
    })
    .collect()
}

/// One artifact definition.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Registration {
  Class {
    scope: String,
    name: String,
    #[serde(deserialize_with = "ordered")]
    declarations: Declarations,
  },
  Var {
    scope: String,
    namespace: String,
    name: String,
    #[serde(flatten)]
    spec: VarSpec,
  },
  Consts {
    scope: String,
    namespace: String,
    #[serde(deserialize_with = "ordered")]
    values: Declarations,
  },
  Keyframes {
    scope: String,
    name: String,
    #[serde(deserialize_with = "nested")]
    frames: Vec<(String, Declarations)>,
  },
  PositionTry {
    scope: String,
    name: String,
    #[serde(deserialize_with = "ordered")]
    declarations: Declarations,
  },
  ViewTransition {
    scope: String,
    name: String,
    #[serde(deserialize_with = "nested")]
    parts: Vec<(String, Declarations)>,
  },
  Theme {
    scope: String,
    namespace: String,
    name: String,
    #[serde(deserialize_with = "ordered")]
    overrides: Declarations,
  },
  Marker {
    scope: String,
    name: String,
  },
}

impl Registration {
  pub fn kind(&self) -> ArtifactKind {
    match self {
      Registration::Class { .. } => ArtifactKind::Class,
      Registration::Var { .. } => ArtifactKind::Var,
      Registration::Consts { .. } => ArtifactKind::Const,
      Registration::Keyframes { .. } => ArtifactKind::Keyframes,
      Registration::PositionTry { .. } => ArtifactKind::PositionTry,
      Registration::ViewTransition { .. } => ArtifactKind::ViewTransition,
      Registration::Theme { .. } => ArtifactKind::Theme,
      Registration::Marker { .. } => ArtifactKind::Marker,
    }
  }

  /// Symbolic manifest key; constants report their namespace.
  pub fn key(&self) -> String {
    match self {
      Registration::Class { scope, name, .. }
      | Registration::Keyframes { scope, name, .. }
      | Registration::PositionTry { scope, name, .. }
      | Registration::ViewTransition { scope, name, .. }
      | Registration::Marker { scope, name } => artifact_key(scope, name),
      Registration::Var {
        scope, namespace, name, ..
      }
      | Registration::Theme {
        scope, namespace, name, ..
      } => artifact_key(scope, &format!("{namespace}.{name}")),
      Registration::Consts { scope, namespace, .. } => artifact_key(scope, namespace),
    }
  }

  /// Define this artifact; returns the text callers use to refer to it.
  pub fn apply(&self, ctx: &Context) -> Result<String, StyleError> {
    match self {
      Registration::Class {
        scope,
        name,
        declarations,
      } => ctx.define_class(scope, name, declarations),
      Registration::Var {
        scope,
        namespace,
        name,
        spec,
      } => ctx.define_var(scope, namespace, name, spec),
      Registration::Consts {
        scope,
        namespace,
        values,
      } => ctx.define_consts(scope, namespace, values).map(|values| values.join(" ")),
      Registration::Keyframes { scope, name, frames } => ctx.define_keyframes(scope, name, frames),
      Registration::PositionTry {
        scope,
        name,
        declarations,
      } => ctx.define_position_try(scope, name, declarations),
      Registration::ViewTransition { scope, name, parts } => ctx.define_view_transition(scope, name, parts),
      Registration::Theme {
        scope,
        namespace,
        name,
        overrides,
      } => ctx.define_theme(scope, namespace, name, overrides),
      Registration::Marker { scope, name } => ctx.define_marker(scope, name),
    }
  }
}

/// What applying a plan produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
  /// `(kind, key, output)` per registration, in plan order.
  pub defined: Vec<(ArtifactKind, String, String)>,
  /// Manifest writes performed while applying.
  pub writes: u64,
}

/// An ordered list of registrations.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct BuildPlan {
  pub registrations: Vec<Registration>,
}

impl BuildPlan {
  pub fn from_json(json: &str) -> Result<Self, RegistrationError> {
    serde_json::from_str(json).map_err(RegistrationError::Parse)
  }

  pub fn load(path: &Path) -> Result<Self, RegistrationError> {
    let content = fs::read_to_string(path).map_err(|source| RegistrationError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    Self::from_json(&content)
  }

  /// Apply every registration in order, stopping at the first failure.
  pub fn apply(&self, ctx: &Context) -> Result<BuildReport, RegistrationError> {
    let writes_before = ctx.writes();
    let mut report = BuildReport::default();
    for registration in &self.registrations {
      let kind = registration.kind();
      let key = registration.key();
      let output = registration
        .apply(ctx)
        .map_err(|source| RegistrationError::Define {
          kind,
          key: key.clone(),
          source,
        })?;
      debug!(%kind, key = %key, output = %output, "registered");
      report.defined.push((kind, key, output));
    }
    report.writes = ctx.writes() - writes_before;
    info!(defined = report.defined.len(), writes = report.writes, "applied build plan");
    Ok(report)
  }
}
