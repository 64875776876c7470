//! Fallback composition.
//!
//! A fallback list is written most-preferred first. Browsers apply the last
//! declaration they understand, so the composed declarations come out in the
//! opposite order. Runs of `var(...)` references collapse into one nested
//! chain (`var(--a,var(--b,red))`) since a browser that understands the
//! first variable understands them all.

use crate::error::{Result, StyleError};

/// How a fallback list is composed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FallbackPolicy {
  /// Browser-support fallbacks, preferred first.
  #[default]
  Plain,
  /// Leading variables nest the value after them as their fallback.
  FirstThatWorks,
}

/// Whether a normalized value is a single `var(...)` reference.
pub fn is_var(value: &str) -> bool {
  value.starts_with("var(") && value.ends_with(')')
}

/// Nest `vars` into one chain, innermost fallback last.
fn nest(vars: &[String], fallback: Option<&str>) -> String {
  let mut inner = fallback.map(str::to_string);
  for var in vars.iter().rev() {
    inner = Some(match inner {
      Some(inner) => format!("{},{inner})", &var[..var.len() - 1]),
      None => var.clone(),
    });
  }
  inner.unwrap_or_default()
}

/// The contiguous `var(...)` run, as `start..end`.
fn var_run(property: &str, values: &[String]) -> Result<Option<(usize, usize)>> {
  let Some(start) = values.iter().position(|v| is_var(v)) else {
    return Ok(None);
  };
  let end = values[start..]
    .iter()
    .position(|v| !is_var(v))
    .map_or(values.len(), |offset| start + offset);
  if values[end..].iter().any(|v| is_var(v)) {
    return Err(StyleError::invalid(
      property,
      "variable references in a fallback list must be contiguous",
    ));
  }
  Ok(Some((start, end)))
}

/// Compose normalized values into declarations in emission order.
///
/// The last element is the one that wins in browsers that support it.
pub fn compose(property: &str, policy: FallbackPolicy, values: &[String]) -> Result<Vec<String>> {
  match policy {
    FallbackPolicy::Plain => compose_plain(property, values),
    FallbackPolicy::FirstThatWorks => Ok(compose_first_that_works(values)),
  }
}

fn compose_plain(property: &str, values: &[String]) -> Result<Vec<String>> {
  let Some((start, end)) = var_run(property, values)? else {
    return Ok(values.iter().rev().cloned().collect());
  };
  let run = &values[start..end];
  let mut preferred: Vec<String> = if start == 0 {
    vec![nest(run, None)]
  } else {
    values[..start].iter().map(|literal| nest(run, Some(literal))).collect()
  };
  preferred.extend(values[end..].iter().cloned());
  preferred.reverse();
  Ok(preferred)
}

fn compose_first_that_works(values: &[String]) -> Vec<String> {
  let Some(first_var) = values.iter().position(|v| is_var(v)) else {
    return values.iter().rev().cloned().collect();
  };
  let leading = &values[..first_var];
  let rest = &values[first_var..];
  let chain_len = rest.iter().position(|v| !is_var(v)).map_or(rest.len(), |i| i + 1);
  let (chain, tail) = rest.split_at(chain_len);

  let (vars, fallback) = match chain.split_last() {
    Some((last, vars)) if !is_var(last) => (vars, Some(last.as_str())),
    _ => (chain, None),
  };

  let mut out: Vec<String> = tail.iter().rev().cloned().collect();
  out.push(nest(vars, fallback));
  out.extend(leading.iter().rev().cloned());
  out
}

#[cfg(test)]
mod tests {
  use super::*;

  fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
  }

  #[test]
  fn plain_lists_reverse() {
    let out = compose("position", FallbackPolicy::Plain, &strings(&["sticky", "-webkit-sticky"])).unwrap();
    assert_eq!(out, strings(&["-webkit-sticky", "sticky"]));
  }

  #[test]
  fn plain_var_run_nests_with_preceding_literal() {
    let out = compose(
      "color",
      FallbackPolicy::Plain,
      &strings(&["red", "var(--a)", "var(--b)", "blue"]),
    )
    .unwrap();
    assert_eq!(out, strings(&["blue", "var(--a,var(--b,red))"]));
  }

  #[test]
  fn plain_var_run_without_literal() {
    let out = compose("color", FallbackPolicy::Plain, &strings(&["var(--a)", "var(--b)"])).unwrap();
    assert_eq!(out, strings(&["var(--a,var(--b))"]));
  }

  #[test]
  fn plain_non_contiguous_vars_are_rejected() {
    let err = compose(
      "color",
      FallbackPolicy::Plain,
      &strings(&["var(--a)", "red", "var(--b)"]),
    )
    .unwrap_err();
    assert!(matches!(err, StyleError::InvalidValue { .. }));
  }

  #[test]
  fn first_that_works_nests_following_literal() {
    let out = compose(
      "color",
      FallbackPolicy::FirstThatWorks,
      &strings(&["var(--a)", "red", "blue"]),
    )
    .unwrap();
    assert_eq!(out, strings(&["blue", "var(--a,red)"]));
  }

  #[test]
  fn first_that_works_leading_literal_is_emitted_last() {
    let out = compose(
      "position",
      FallbackPolicy::FirstThatWorks,
      &strings(&["sticky", "var(--pos)", "fixed"]),
    )
    .unwrap();
    assert_eq!(out, strings(&["var(--pos,fixed)", "sticky"]));
  }

  #[test]
  fn first_that_works_without_vars_reverses() {
    let out = compose("display", FallbackPolicy::FirstThatWorks, &strings(&["grid", "flex"])).unwrap();
    assert_eq!(out, strings(&["flex", "grid"]));
  }
}
