//! `@position-try` fallback options for anchor positioning.

use crate::compiler::Compiler;
use crate::error::{Result, StyleError};
use crate::manifest::PositionTryDef;
use crate::util::hash::{NameKind, artifact_name};
use crate::validate::validate_property;
use crate::value::{Declarations, dash_case};

/// Properties a position-try rule may set, besides `inset-*` and `margin-*`.
const ALLOWED: &[&str] = &[
  "position-anchor",
  "position-area",
  "top",
  "right",
  "bottom",
  "left",
  "width",
  "height",
  "min-width",
  "min-height",
  "max-width",
  "max-height",
  "block-size",
  "inline-size",
  "min-block-size",
  "min-inline-size",
  "max-block-size",
  "max-inline-size",
  "align-self",
  "justify-self",
  "place-self",
];

pub fn is_allowed(property: &str) -> bool {
  ALLOWED.contains(&property) || property.starts_with("inset") || property.starts_with("margin")
}

impl Compiler<'_> {
  pub fn position_try(&self, scope: &str, name: &str, declarations: &Declarations) -> Result<PositionTryDef> {
    let mut pairs = Vec::with_capacity(declarations.len());
    for (key, raw) in declarations {
      let property = dash_case(key);
      if !is_allowed(&property) {
        return Err(StyleError::invalid(
          &property,
          "not allowed in @position-try; use inset, margin, sizing, self-alignment or position-area properties",
        ));
      }
      validate_property(&property, self.validation)?;
      let value = self.single_value(&property, raw)?;
      pairs.push((property, value));
    }
    Ok(PositionTryDef {
      name: artifact_name(self.prefix, NameKind::PositionTry, &format!("{scope}.{name}"), None),
      declarations: pairs,
    })
  }
}
