//! Atomic class compilation and merging.
//!
//! A class definition is an ordered list of declarations. Each one is
//! classified, flattened, expanded, normalized, made direction-aware, and
//! finally hashed into one [`AtomicRule`] per `(property, value, conditions)`
//! combination. The resulting [`ClassDef`] also records one [`Atom`] per
//! property key so that classes can be merged with later-wins semantics.

use crate::conditional::{FlatEntry, flatten, split_condition_path};
use crate::compiler::Compiler;
use crate::error::Result;
use crate::manifest::{Atom, AtomicRule, ClassDef};
use crate::priority::priority;
use crate::rtl::{RtlOverride, animation_rtl, transform};
use crate::shorthand::expand_entries;
use crate::util::hash::{class_name, sort_at_rules, sort_pseudos};
use crate::validate::validate_property;
use crate::value::{Declaration, Declarations, Leaf, classify, dash_case};

/// Atoms and their rules, keyed by property key in declaration order.
#[derive(Default)]
struct AtomSet {
  entries: Vec<(Atom, Vec<AtomicRule>)>,
}

impl AtomSet {
  /// Later declarations of the same key replace earlier ones.
  fn insert(&mut self, atom: Atom, rules: Vec<AtomicRule>) {
    self.entries.retain(|(existing, _)| existing.key != atom.key);
    self.entries.push((atom, rules));
  }

  fn into_class(self) -> ClassDef {
    let mut class = ClassDef::default();
    for (atom, rules) in self.entries {
      for rule in rules {
        if !class.rules.iter().any(|r| r.class_name == rule.class_name) {
          class.rules.push(rule);
        }
      }
      class.atoms.push(atom);
    }
    class
  }
}

impl Compiler<'_> {
  /// Compile a class from its declarations.
  pub fn compile_class(&self, declarations: &Declarations) -> Result<ClassDef> {
    let mut atoms = AtomSet::default();
    for (key, raw) in declarations {
      let property = dash_case(key);
      match classify(&property, raw, self.manifest)? {
        Declaration::PseudoElementBlock(block) => {
          for (inner, declaration) in block {
            self.compile_declaration(&inner, declaration, Some(&property), &mut atoms)?;
          }
        }
        declaration => self.compile_declaration(&property, declaration, None, &mut atoms)?,
      }
    }
    Ok(atoms.into_class())
  }

  fn compile_declaration(
    &self,
    property: &str,
    declaration: Declaration,
    pseudo_element: Option<&str>,
    atoms: &mut AtomSet,
  ) -> Result<()> {
    validate_property(property, self.validation)?;

    let entries: Vec<FlatEntry> = match declaration {
      Declaration::Literal(scalar) => vec![(None, Leaf::Value(scalar))],
      Declaration::Fallbacks(list) => vec![(None, Leaf::Fallbacks(list))],
      Declaration::Conditional(map) => flatten(&map),
      // classification never nests blocks
      Declaration::PseudoElementBlock(_) => Vec::new(),
    };

    for group in expand_entries(self.strategy, property, &entries)? {
      let key = match pseudo_element {
        Some(element) => format!("{element}_{}", group.property),
        None => group.property.clone(),
      };
      let mut rules = Vec::new();
      for (path, value) in &group.entries {
        let Some(value) = value else { continue };
        let (mut pseudos, at_rules) = path.as_deref().map(split_condition_path).unwrap_or_default();
        if let Some(element) = pseudo_element {
          pseudos.insert(0, element.to_string());
        }
        let rule = self.atomic_rule(&group.property, value, &pseudos, &at_rules)?;
        if !rules.iter().any(|r: &AtomicRule| r.class_name == rule.class_name) {
          rules.push(rule);
        }
      }
      let classes = (!rules.is_empty()).then(|| {
        rules
          .iter()
          .map(|r| r.class_name.as_str())
          .collect::<Vec<_>>()
          .join(" ")
      });
      atoms.insert(Atom { key, classes }, rules);
    }
    Ok(())
  }

  fn atomic_rule(&self, property: &str, value: &Leaf, pseudos: &[String], at_rules: &[String]) -> Result<AtomicRule> {
    let values = self.leaf_values(property, value)?;
    let joined = values.join(", ");
    let pseudos = sort_pseudos(pseudos);
    let at_rules = sort_at_rules(at_rules);

    let directional = transform(property, &values);
    let rtl = directional.rtl.or_else(|| {
      let renamed = animation_rtl(property, &joined, |name| self.manifest.keyframes_has_rtl(name))?;
      Some(RtlOverride {
        property: directional.property.clone(),
        values: vec![renamed],
        reset_ltr: false,
      })
    });

    Ok(AtomicRule {
      class_name: class_name(self.prefix, property, &joined, &pseudos, &at_rules),
      priority: priority(property, &pseudos, &at_rules),
      property: directional.property,
      value: directional.values.join(", "),
      fallbacks: (directional.values.len() > 1).then_some(directional.values),
      pseudos,
      at_rules,
      rtl,
    })
  }
}

/// Merge classes into one `class` attribute value; later atoms win.
///
/// A reset in a later class removes an earlier class's rules for that key.
pub fn merge_classes(classes: &[&ClassDef]) -> String {
  let mut merged: Vec<(&str, Option<&str>)> = Vec::new();
  for class in classes {
    for atom in &class.atoms {
      merged.retain(|(key, _)| *key != atom.key);
      merged.push((atom.key.as_str(), atom.classes.as_deref()));
    }
  }
  let mut seen: Vec<&str> = Vec::new();
  for (_, classes) in merged {
    for name in classes.into_iter().flat_map(str::split_whitespace) {
      if !seen.contains(&name) {
        seen.push(name);
      }
    }
  }
  seen.join(" ")
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::manifest::Manifest;
  use crate::normalize::Normalizer;
  use crate::shorthand::{Flatten, KeepWithResets, ShorthandStrategy};
  use crate::validate::{Level, ValidationConfig};
  use crate::value::RawValue;

  const QUIET: ValidationConfig = ValidationConfig {
    unknown_property: Level::Ignore,
    vendor_prefix: Level::Ignore,
    deprecated: Level::Ignore,
  };

  fn compile_with(strategy: &dyn ShorthandStrategy, manifest: &Manifest, declarations: Declarations) -> ClassDef {
    let compiler = Compiler {
      prefix: "x",
      normalizer: Normalizer::default(),
      strategy,
      validation: &QUIET,
      manifest,
    };
    compiler.compile_class(&declarations).unwrap()
  }

  fn compile(declarations: Declarations) -> ClassDef {
    compile_with(&KeepWithResets, &Manifest::new(), declarations)
  }

  fn decl(property: &str, value: impl Into<RawValue>) -> (String, RawValue) {
    (property.to_string(), value.into())
  }

  #[test]
  fn display_flex_matches_reference_hash() {
    let class = compile(vec![decl("display", "flex")]);
    assert_eq!(class.class_string(), "x78zum5");
    let rule = &class.rules[0];
    assert_eq!(rule.property, "display");
    assert_eq!(rule.value, "flex");
    assert_eq!(rule.priority, 4000);
    assert!(rule.rtl.is_none());
  }

  #[test]
  fn hover_condition_changes_name_and_priority() {
    let class = compile(vec![decl("color", RawValue::map([("default", "red"), (":hover", "blue")]))]);
    assert_eq!(class.rules.len(), 2);
    assert_eq!(class.rules[1].pseudos, vec![":hover"]);
    assert_eq!(class.rules[1].priority, 4130);
    assert_eq!(class.atoms.len(), 1);
    assert_eq!(class.atoms[0].classes.as_deref().map(|c| c.split(' ').count()), Some(2));
  }

  #[test]
  fn snake_case_keys_are_dash_cased() {
    let class = compile(vec![decl("background_color", "red")]);
    assert_eq!(class.rules[0].property, "background-color");
    assert_eq!(class.atoms[0].key, "background-color");
  }

  #[test]
  fn logical_property_gets_rtl_override() {
    let class = compile(vec![decl("margin_inline_start", RawValue::Int(10))]);
    let rule = &class.rules[0];
    assert_eq!(rule.property, "margin-left");
    assert_eq!(rule.value, "10px");
    let rtl = rule.rtl.as_ref().unwrap();
    assert_eq!(rtl.property, "margin-right");
    assert!(rtl.reset_ltr);
  }

  #[test]
  fn shorthand_keeps_resets_in_atoms() {
    let class = compile(vec![decl("margin", RawValue::Int(0))]);
    assert_eq!(class.rules.len(), 1);
    assert!(class.atoms.iter().any(|a| a.key == "margin-top" && a.classes.is_none()));
  }

  #[test]
  fn later_longhand_overrides_reset() {
    let class = compile(vec![decl("margin", RawValue::Int(0)), decl("margin_top", RawValue::Int(4))]);
    let top = class.atoms.iter().find(|a| a.key == "margin-top").unwrap();
    assert!(top.classes.is_some());
    assert_eq!(class.rules.len(), 2);
  }

  #[test]
  fn flatten_strategy_emits_longhands() {
    let class = compile_with(&Flatten, &Manifest::new(), vec![decl("padding", "1px 2px")]);
    let props: Vec<_> = class.rules.iter().map(|r| r.property.as_str()).collect();
    assert_eq!(props, vec!["padding-top", "padding-right", "padding-bottom", "padding-left"]);
  }

  #[test]
  fn fallbacks_render_in_reverse() {
    let class = compile(vec![decl("position", RawValue::list(["sticky", "-webkit-sticky"]))]);
    let rule = &class.rules[0];
    assert_eq!(rule.fallbacks, Some(vec!["-webkit-sticky".to_string(), "sticky".to_string()]));
  }

  #[test]
  fn pseudo_element_block_prefixes_chain() {
    let class = compile(vec![decl(
      "::before",
      RawValue::map([("content", RawValue::from("''")), ("color", RawValue::from("red"))]),
    )]);
    assert_eq!(class.atoms[0].key, "::before_content");
    assert_eq!(class.rules[0].pseudos, vec!["::before"]);
    assert_eq!(class.rules[0].value, "\"\"");
    assert_eq!(class.rules[0].priority, 9000);
  }

  #[test]
  fn merge_later_wins_and_resets_clear() {
    let a = compile(vec![decl("margin_top", RawValue::Int(4)), decl("color", "red")]);
    let b = compile(vec![decl("margin", RawValue::Int(0))]);
    let c = compile(vec![decl("color", "blue")]);

    let merged = merge_classes(&[&a, &b, &c]);
    let names: Vec<&str> = merged.split(' ').collect();
    assert!(!names.contains(&a.atoms[0].classes.as_deref().unwrap()));
    assert!(names.contains(&b.class_string().as_str()));
    assert!(names.contains(&c.class_string().as_str()));
    assert_eq!(names.len(), 2);
  }
}
