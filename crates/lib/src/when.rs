//! Contextual conditions built from marker classes.
//!
//! Each helper returns a condition key usable anywhere a pseudo-class is, so
//! a class can react to the state of a marked ancestor, descendant or sibling.
//! The selector is wrapped in `:where(…)` so it adds no specificity.

use crate::error::{Result, StyleError};

fn marked(pseudo: &str, marker: &str) -> Result<String> {
  if !pseudo.starts_with(':') || pseudo.starts_with("::") {
    return Err(StyleError::invalid(
      "when",
      format!("`{pseudo}` is not a pseudo-class"),
    ));
  }
  Ok(format!(".{marker}{pseudo}"))
}

/// Applies while an ancestor carrying `marker` matches `pseudo`.
pub fn ancestor(pseudo: &str, marker: &str) -> Result<String> {
  Ok(format!(":where({} *)", marked(pseudo, marker)?))
}

/// Applies while a descendant carrying `marker` matches `pseudo`.
pub fn descendant(pseudo: &str, marker: &str) -> Result<String> {
  Ok(format!(":where(:has({}))", marked(pseudo, marker)?))
}

/// Applies while an earlier sibling carrying `marker` matches `pseudo`.
pub fn sibling_before(pseudo: &str, marker: &str) -> Result<String> {
  Ok(format!(":where({} ~ *)", marked(pseudo, marker)?))
}

/// Applies while a later sibling carrying `marker` matches `pseudo`.
pub fn sibling_after(pseudo: &str, marker: &str) -> Result<String> {
  Ok(format!(":where(:has(~ {}))", marked(pseudo, marker)?))
}

pub fn any_sibling(pseudo: &str, marker: &str) -> Result<String> {
  let target = marked(pseudo, marker)?;
  Ok(format!(":where({target} ~ *, :has(~ {target}))"))
}
