//! Cascade priority of atomic rules.
//!
//! Rules are emitted in ascending priority so that, for equal specificity,
//! longhands beat shorthands and conditional rules beat unconditioned ones.

use crate::data::pseudo::{AT_RULE_PRIORITIES, DEFAULT_PSEUDO_CLASS_PRIORITY, PSEUDO_CLASS_PRIORITIES, PSEUDO_ELEMENT_PRIORITY};
use crate::data::shorthands::{LOGICAL_LONGHANDS, SHORTHANDS_OF_LONGHANDS, SHORTHANDS_OF_SHORTHANDS};

pub const CUSTOM_PROPERTY_PRIORITY: u32 = 1;
pub const SHORTHAND_OF_SHORTHANDS_PRIORITY: u32 = 1000;
pub const SHORTHAND_OF_LONGHANDS_PRIORITY: u32 = 2000;
pub const LOGICAL_LONGHAND_PRIORITY: u32 = 3000;
pub const PHYSICAL_LONGHAND_PRIORITY: u32 = 4000;

/// Base tier for a property.
pub fn property_priority(property: &str) -> u32 {
  if property.starts_with("--") {
    CUSTOM_PROPERTY_PRIORITY
  } else if SHORTHANDS_OF_SHORTHANDS.contains(&property) {
    SHORTHAND_OF_SHORTHANDS_PRIORITY
  } else if SHORTHANDS_OF_LONGHANDS.contains(&property) {
    SHORTHAND_OF_LONGHANDS_PRIORITY
  } else if LOGICAL_LONGHANDS.contains(&property) {
    LOGICAL_LONGHAND_PRIORITY
  } else {
    PHYSICAL_LONGHAND_PRIORITY
  }
}

pub fn is_pseudo_element(pseudo: &str) -> bool {
  pseudo.starts_with("::")
}

/// Weight of one pseudo-class or pseudo-element.
pub fn pseudo_priority(pseudo: &str) -> u32 {
  if is_pseudo_element(pseudo) {
    return PSEUDO_ELEMENT_PRIORITY;
  }
  let name = pseudo.split_once('(').map_or(pseudo, |(name, _)| name);
  PSEUDO_CLASS_PRIORITIES
    .iter()
    .find(|(candidate, _)| *candidate == name)
    .map_or(DEFAULT_PSEUDO_CLASS_PRIORITY, |(_, weight)| *weight)
}

/// Weight of one at-rule; unknown at-rules weigh nothing.
pub fn at_rule_priority(at_rule: &str) -> u32 {
  AT_RULE_PRIORITIES
    .iter()
    .find(|(prefix, _)| at_rule.starts_with(prefix))
    .map_or(0, |(_, weight)| *weight)
}

/// Full priority of a rule.
pub fn priority(property: &str, pseudos: &[String], at_rules: &[String]) -> u32 {
  property_priority(property)
    + pseudos.iter().map(|p| pseudo_priority(p)).sum::<u32>()
    + at_rules.iter().map(|a| at_rule_priority(a)).sum::<u32>()
}

/// Whether the selector needs a specificity bump.
pub fn needs_bump(pseudos: &[String], at_rules: &[String]) -> bool {
  !at_rules.is_empty() || pseudos.iter().any(|p| !is_pseudo_element(p))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn chain(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
  }

  #[test]
  fn tiers() {
    assert_eq!(property_priority("--x"), 1);
    assert_eq!(property_priority("margin"), 1000);
    assert_eq!(property_priority("border-color"), 2000);
    assert_eq!(property_priority("margin-inline-start"), 3000);
    assert_eq!(property_priority("color"), 4000);
  }

  #[test]
  fn interaction_states_are_ordered() {
    assert!(pseudo_priority(":hover") < pseudo_priority(":focus"));
    assert!(pseudo_priority(":focus") < pseudo_priority(":active"));
    assert_eq!(pseudo_priority(":made-up"), 40);
    assert_eq!(pseudo_priority(":nth-child(2n)"), 60);
  }

  #[test]
  fn priorities_sum() {
    assert_eq!(priority("color", &chain(&[":hover"]), &[]), 4130);
    assert_eq!(priority("color", &chain(&["::before", ":hover"]), &[]), 9130);
    assert_eq!(priority("color", &[], &chain(&["@media (min-width: 1px)"])), 4200);
    assert_eq!(priority("color", &[], &chain(&["@container (min-width: 1px)", "@supports (x: y)"])), 4330);
  }

  #[test]
  fn bump_only_for_conditions() {
    assert!(!needs_bump(&[], &[]));
    assert!(!needs_bump(&chain(&["::before"]), &[]));
    assert!(needs_bump(&chain(&[":hover"]), &[]));
    assert!(needs_bump(&[], &chain(&["@media print"])));
  }
}
