//! Declaration values and their classification.
//!
//! Callers hand the compiler [`RawValue`]s: loosely shaped data as it comes
//! out of a registration file or builder code. Before anything else happens,
//! [`classify`] turns each raw value into a [`Declaration`], a tagged variant
//! that makes the literal / fallback / conditional / pseudo-element-block
//! distinction explicit:
//!
//! - a map with a `default` key, or whose keys are all conditions (`:…`,
//!   `@…`), is **conditional**;
//! - a map under a `::pseudo-element` property whose keys are CSS properties
//!   is a **pseudo-element block**;
//! - any other map is rejected.
//!
//! References to other artifacts are resolved during classification through
//! a [`ReferenceResolver`], so later stages only ever see strings and numbers.

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use crate::error::{Result, StyleError};
use crate::fallback::FallbackPolicy;
use crate::manifest::ArtifactKind;

/// A reference to a previously defined artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
  pub kind: ArtifactKind,
  pub scope: String,
  /// Name within the scope; namespaced kinds use `namespace.name`.
  pub name: String,
}

impl Reference {
  pub fn new(kind: ArtifactKind, scope: impl Into<String>, name: impl Into<String>) -> Self {
    Self {
      kind,
      scope: scope.into(),
      name: name.into(),
    }
  }

  /// Reference a variable `namespace.name` in `scope`.
  pub fn var(scope: impl Into<String>, namespace: &str, name: &str) -> Self {
    Self::new(ArtifactKind::Var, scope, format!("{namespace}.{name}"))
  }

  /// Reference a constant `namespace.name` in `scope`.
  pub fn constant(scope: impl Into<String>, namespace: &str, name: &str) -> Self {
    Self::new(ArtifactKind::Const, scope, format!("{namespace}.{name}"))
  }

  pub fn keyframes(scope: impl Into<String>, name: impl Into<String>) -> Self {
    Self::new(ArtifactKind::Keyframes, scope, name)
  }

  pub fn position_try(scope: impl Into<String>, name: impl Into<String>) -> Self {
    Self::new(ArtifactKind::PositionTry, scope, name)
  }

  pub fn view_transition(scope: impl Into<String>, name: impl Into<String>) -> Self {
    Self::new(ArtifactKind::ViewTransition, scope, name)
  }

  pub fn marker(scope: impl Into<String>, name: impl Into<String>) -> Self {
    Self::new(ArtifactKind::Marker, scope, name)
  }
}

/// Resolves references to the CSS text they stand for.
pub trait ReferenceResolver {
  fn resolve(&self, reference: &Reference) -> Result<String>;
}

/// Unclassified declaration value.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
  Null,
  Bool(bool),
  Int(i64),
  Float(f64),
  Str(String),
  /// A bare identifier, e.g. a keyword written as a symbol.
  Ident(String),
  /// Browser-support fallbacks, most preferred first.
  List(Vec<RawValue>),
  /// Fallbacks composed with the first-that-works policy.
  FirstThatWorks(Vec<RawValue>),
  /// Ordered map: a conditional value or a pseudo-element block.
  Map(Vec<(String, RawValue)>),
  Ref(Reference),
}

impl RawValue {
  /// Build an ordered map value.
  pub fn map<K, V, I>(entries: I) -> Self
  where
    K: Into<String>,
    V: Into<RawValue>,
    I: IntoIterator<Item = (K, V)>,
  {
    RawValue::Map(entries.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
  }

  pub fn list<V: Into<RawValue>, I: IntoIterator<Item = V>>(values: I) -> Self {
    RawValue::List(values.into_iter().map(Into::into).collect())
  }

  pub fn first_that_works<V: Into<RawValue>, I: IntoIterator<Item = V>>(values: I) -> Self {
    RawValue::FirstThatWorks(values.into_iter().map(Into::into).collect())
  }

  pub fn ident(name: impl Into<String>) -> Self {
    RawValue::Ident(name.into())
  }

  fn type_name(&self) -> &'static str {
    match self {
      RawValue::Null => "null",
      RawValue::Bool(_) => "boolean",
      RawValue::Int(_) => "integer",
      RawValue::Float(_) => "float",
      RawValue::Str(_) => "string",
      RawValue::Ident(_) => "identifier",
      RawValue::List(_) | RawValue::FirstThatWorks(_) => "list",
      RawValue::Map(_) => "map",
      RawValue::Ref(_) => "reference",
    }
  }
}

impl From<&str> for RawValue {
  fn from(value: &str) -> Self {
    RawValue::Str(value.to_string())
  }
}

impl From<String> for RawValue {
  fn from(value: String) -> Self {
    RawValue::Str(value)
  }
}

impl From<i64> for RawValue {
  fn from(value: i64) -> Self {
    RawValue::Int(value)
  }
}

impl From<i32> for RawValue {
  fn from(value: i32) -> Self {
    RawValue::Int(i64::from(value))
  }
}

impl From<f64> for RawValue {
  fn from(value: f64) -> Self {
    RawValue::Float(value)
  }
}

impl From<bool> for RawValue {
  fn from(value: bool) -> Self {
    RawValue::Bool(value)
  }
}

impl From<Reference> for RawValue {
  fn from(value: Reference) -> Self {
    RawValue::Ref(value)
  }
}

impl<V: Into<RawValue>> From<Option<V>> for RawValue {
  fn from(value: Option<V>) -> Self {
    value.map_or(RawValue::Null, Into::into)
  }
}

/// Key marking a reference object in JSON input.
pub const JSON_REF_KEY: &str = "$ref";
/// Key marking a first-that-works list in JSON input.
pub const JSON_FIRST_THAT_WORKS_KEY: &str = "$first_that_works";

impl TryFrom<Json> for RawValue {
  type Error = String;

  fn try_from(value: Json) -> std::result::Result<Self, Self::Error> {
    Ok(match value {
      Json::Null => RawValue::Null,
      Json::Bool(b) => RawValue::Bool(b),
      Json::Number(n) => match n.as_i64() {
        Some(i) => RawValue::Int(i),
        None => RawValue::Float(n.as_f64().ok_or_else(|| format!("unsupported number {n}"))?),
      },
      Json::String(s) => RawValue::Str(s),
      Json::Array(items) => RawValue::List(items.into_iter().map(RawValue::try_from).collect::<std::result::Result<_, _>>()?),
      Json::Object(mut map) => {
        if map.len() == 1 {
          if let Some(reference) = map.remove(JSON_REF_KEY) {
            let reference: Reference = serde_json::from_value(reference).map_err(|e| e.to_string())?;
            return Ok(RawValue::Ref(reference));
          }
          if let Some(Json::Array(items)) = map.remove(JSON_FIRST_THAT_WORKS_KEY) {
            return Ok(RawValue::FirstThatWorks(
              items.into_iter().map(RawValue::try_from).collect::<std::result::Result<_, _>>()?,
            ));
          }
        }
        RawValue::Map(
          map
            .into_iter()
            .map(|(k, v)| RawValue::try_from(v).map(|v| (k, v)))
            .collect::<std::result::Result<_, _>>()?,
        )
      }
    })
  }
}

impl<'de> Deserialize<'de> for RawValue {
  fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
    let json = Json::deserialize(deserializer)?;
    RawValue::try_from(json).map_err(serde::de::Error::custom)
  }
}

/// An ordered list of `(property, value)` declarations.
pub type Declarations = Vec<(String, RawValue)>;

/// A terminal CSS value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
  Str(String),
  Int(i64),
  Float(f64),
  Ident(String),
}

/// An ordered fallback list.
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackList {
  pub policy: FallbackPolicy,
  pub values: Vec<Scalar>,
}

/// A value at the end of a condition path.
#[derive(Debug, Clone, PartialEq)]
pub enum Leaf {
  Value(Scalar),
  Fallbacks(FallbackList),
}

/// A value inside a conditional map.
#[derive(Debug, Clone, PartialEq)]
pub enum CondValue {
  /// No value for this combination.
  Null,
  Leaf(Leaf),
  Nested(ConditionalMap),
}

/// Ordered condition → value entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConditionalMap(pub Vec<(String, CondValue)>);

/// A classified declaration value.
#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
  Literal(Scalar),
  Fallbacks(FallbackList),
  Conditional(ConditionalMap),
  /// Declarations scoped to a pseudo-element, keyed by property.
  PseudoElementBlock(Vec<(String, Declaration)>),
}

/// Whether a map key is a condition rather than a property name.
pub fn is_condition_key(key: &str) -> bool {
  key == "default" || key.starts_with(':') || key.starts_with('@')
}

/// Whether a map's keys make it a conditional value.
pub fn is_conditional<'a>(mut keys: impl Iterator<Item = &'a str> + Clone) -> bool {
  keys.clone().any(|k| k == "default") || keys.all(is_condition_key)
}

/// Convert a property key to CSS dash case.
///
/// `background_color` and `backgroundColor` both become `background-color`.
/// Custom properties and pseudo-element keys are returned unchanged.
pub fn dash_case(key: &str) -> String {
  if key.starts_with("--") || key.starts_with(':') || key.starts_with('@') {
    return key.to_string();
  }
  let mut out = String::with_capacity(key.len() + 4);
  for (i, ch) in key.chars().enumerate() {
    match ch {
      '_' => out.push('-'),
      c if c.is_ascii_uppercase() => {
        if i > 0 {
          out.push('-');
        }
        out.push(c.to_ascii_lowercase());
      }
      c => out.push(c),
    }
  }
  out
}

pub(crate) fn scalar(property: &str, raw: &RawValue, resolver: &dyn ReferenceResolver) -> Result<Scalar> {
  match raw {
    RawValue::Str(s) => Ok(Scalar::Str(s.clone())),
    RawValue::Int(i) => Ok(Scalar::Int(*i)),
    RawValue::Float(f) if f.is_finite() => Ok(Scalar::Float(*f)),
    RawValue::Float(_) => Err(StyleError::invalid(property, "non-finite number")),
    RawValue::Ident(s) => Ok(Scalar::Ident(s.clone())),
    RawValue::Ref(reference) => resolver.resolve(reference).map(Scalar::Str),
    other => Err(StyleError::invalid(
      property,
      format!("{} is not a valid CSS value", other.type_name()),
    )),
  }
}

fn fallbacks(
  property: &str,
  policy: FallbackPolicy,
  items: &[RawValue],
  resolver: &dyn ReferenceResolver,
) -> Result<FallbackList> {
  if items.is_empty() {
    return Err(StyleError::invalid(property, "empty fallback list"));
  }
  let values = items
    .iter()
    .map(|item| match item {
      RawValue::List(_) | RawValue::FirstThatWorks(_) | RawValue::Map(_) | RawValue::Null | RawValue::Bool(_) => Err(
        StyleError::invalid(property, format!("fallback lists may not contain a {}", item.type_name())),
      ),
      other => scalar(property, other, resolver),
    })
    .collect::<Result<Vec<_>>>()?;
  Ok(FallbackList { policy, values })
}

pub(crate) fn leaf(property: &str, raw: &RawValue, resolver: &dyn ReferenceResolver) -> Result<Leaf> {
  match raw {
    RawValue::List(items) => fallbacks(property, FallbackPolicy::Plain, items, resolver).map(Leaf::Fallbacks),
    RawValue::FirstThatWorks(items) => {
      fallbacks(property, FallbackPolicy::FirstThatWorks, items, resolver).map(Leaf::Fallbacks)
    }
    other => scalar(property, other, resolver).map(Leaf::Value),
  }
}

fn conditional(
  property: &str,
  entries: &[(String, RawValue)],
  resolver: &dyn ReferenceResolver,
) -> Result<ConditionalMap> {
  let mut out = Vec::with_capacity(entries.len());
  for (key, value) in entries {
    if !is_condition_key(key) {
      return Err(StyleError::invalid(
        property,
        format!("`{key}` is not a condition; conditional maps only take `default`, `:…` or `@…` keys"),
      ));
    }
    let value = match value {
      RawValue::Null => CondValue::Null,
      RawValue::Map(inner) => {
        if inner.is_empty() || !is_conditional(inner.iter().map(|(k, _)| k.as_str())) {
          return Err(StyleError::invalid(property, format!("value under `{key}` is not a conditional map")));
        }
        CondValue::Nested(conditional(property, inner, resolver)?)
      }
      other => CondValue::Leaf(leaf(property, other, resolver)?),
    };
    out.push((key.clone(), value));
  }
  Ok(ConditionalMap(out))
}

/// Classify a raw value for `property` (already dash-cased).
pub fn classify(property: &str, raw: &RawValue, resolver: &dyn ReferenceResolver) -> Result<Declaration> {
  if property.starts_with("::") {
    let RawValue::Map(entries) = raw else {
      return Err(StyleError::invalid(property, "pseudo-element keys take a map of declarations"));
    };
    if entries.is_empty() || is_conditional(entries.iter().map(|(k, _)| k.as_str())) {
      return Err(StyleError::invalid(property, "pseudo-element blocks must contain CSS properties"));
    }
    let mut block = Vec::with_capacity(entries.len());
    for (key, value) in entries {
      let inner = dash_case(key);
      if inner.starts_with("::") {
        return Err(StyleError::invalid(property, "pseudo-element blocks cannot nest"));
      }
      block.push((inner.clone(), classify(&inner, value, resolver)?));
    }
    return Ok(Declaration::PseudoElementBlock(block));
  }

  match raw {
    RawValue::Map(entries) => {
      if entries.is_empty() {
        return Err(StyleError::invalid(property, "empty conditional map"));
      }
      if !is_conditional(entries.iter().map(|(k, _)| k.as_str())) {
        return Err(StyleError::invalid(
          property,
          "map mixes property names with conditions and is not under a pseudo-element",
        ));
      }
      conditional(property, entries, resolver).map(Declaration::Conditional)
    }
    other => match leaf(property, other, resolver)? {
      Leaf::Value(s) => Ok(Declaration::Literal(s)),
      Leaf::Fallbacks(f) => Ok(Declaration::Fallbacks(f)),
    },
  }
}
