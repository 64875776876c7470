//! Stylesheet rendering.
//!
//! [`render`] turns a whole manifest into CSS text. Output depends only on
//! the manifest and the layer mode, so rendering the same manifest twice
//! produces identical bytes and [`write_if_changed`] can skip the write.
//!
//! Sections, in order:
//!
//! 1. `@property` registrations for typed variables
//! 2. `:root` variable blocks, grouped by at-rule chain
//! 3. `@keyframes` (plus `-rtl` variants)
//! 4. `@position-try`
//! 5. view-transition pseudo-element rules
//! 6. atomic rules, ascending by priority, optionally in cascade layers
//! 7. RTL overrides
//! 8. theme blocks

mod write;

use std::collections::BTreeMap;

pub use write::{EmitError, WriteOutcome, write_if_changed};

use crate::config::{Config, LayerMode};
use crate::consts::RTL_KEYFRAMES_SUFFIX;
use crate::manifest::{AtomicRule, DeclarationPair, Frame, Manifest};
use crate::selector::{build_selector, rtl_selector, wrap_at_rules};

/// Header line of the RTL section.
pub const RTL_HEADER: &str = "/* RTL Overrides */";

fn body<'a>(pairs: impl IntoIterator<Item = &'a DeclarationPair>) -> String {
  pairs
    .into_iter()
    .map(|(property, value)| format!("{property}:{value}"))
    .collect::<Vec<_>>()
    .join(";")
}

fn property_rules(manifest: &Manifest) -> Vec<String> {
  manifest
    .vars
    .values()
    .filter_map(|var| {
      let syntax = var.syntax.as_ref()?;
      let mut descriptors = format!("syntax:\"{}\";inherits:{}", syntax.syntax, syntax.inherits);
      if let Some(initial) = &syntax.initial_value {
        descriptors.push_str(&format!(";initial-value:{initial}"));
      }
      Some(format!("@property {}{{{descriptors}}}", var.name))
    })
    .collect()
}

fn root_vars(manifest: &Manifest) -> Vec<String> {
  let mut groups: BTreeMap<&[String], Vec<DeclarationPair>> = BTreeMap::new();
  for var in manifest.vars.values() {
    for scoped in &var.values {
      groups
        .entry(scoped.at_rules.as_slice())
        .or_default()
        .push((var.name.clone(), scoped.value.clone()));
    }
  }
  let mut groups: Vec<_> = groups.into_iter().collect();
  groups.sort_by_key(|(at_rules, _)| at_rules.len());
  groups
    .into_iter()
    .map(|(at_rules, declarations)| wrap_at_rules(at_rules, format!(":root{{{}}}", body(&declarations))))
    .collect()
}

fn frames_css(frames: &[Frame]) -> String {
  frames
    .iter()
    .map(|frame| format!("{}{{{}}}", frame.selector, body(&frame.declarations)))
    .collect()
}

fn keyframes(manifest: &Manifest) -> Vec<String> {
  let mut out = Vec::new();
  for def in manifest.keyframes.values() {
    out.push(format!("@keyframes {}{{{}}}", def.name, frames_css(&def.frames)));
    if let Some(rtl) = &def.rtl_frames {
      out.push(format!(
        "@keyframes {}{RTL_KEYFRAMES_SUFFIX}{{{}}}",
        def.name,
        frames_css(rtl)
      ));
    }
  }
  out
}

fn position_tries(manifest: &Manifest) -> Vec<String> {
  manifest
    .position_tries
    .values()
    .map(|def| format!("@position-try {}{{{}}}", def.name, body(&def.declarations)))
    .collect()
}

fn view_transitions(manifest: &Manifest) -> Vec<String> {
  manifest
    .view_transitions
    .values()
    .flat_map(|def| {
      def.rules.iter().map(move |rule| {
        let selector = format!("::view-transition-{}(*.{})", rule.part.as_str(), def.name);
        wrap_at_rules(&rule.at_rules, format!("{selector}{{{}}}", body(&rule.declarations)))
      })
    })
    .collect()
}

/// Every distinct atomic rule, in emission order.
fn sorted_rules(manifest: &Manifest) -> Vec<&AtomicRule> {
  let mut unique: BTreeMap<&str, &AtomicRule> = BTreeMap::new();
  for class in manifest.classes.values() {
    for rule in &class.rules {
      unique.entry(rule.class_name.as_str()).or_insert(rule);
    }
  }
  let mut rules: Vec<&AtomicRule> = unique.into_values().collect();
  rules.sort_by(|a, b| {
    (a.priority, &a.property, &a.class_name).cmp(&(b.priority, &b.property, &b.class_name))
  });
  rules
}

fn rule_css(rule: &AtomicRule, layers: bool) -> String {
  let selector = build_selector(&rule.class_name, &rule.pseudos, &rule.at_rules, layers);
  let declarations = rule
    .values()
    .iter()
    .map(|value| format!("{}:{value}", rule.property))
    .collect::<Vec<_>>()
    .join(";");
  wrap_at_rules(&rule.at_rules, format!("{selector}{{{declarations}}}"))
}

fn rtl_css(rule: &AtomicRule, layers: bool) -> Option<String> {
  let rtl = rule.rtl.as_ref()?;
  let selector = rtl_selector(&build_selector(&rule.class_name, &rule.pseudos, &rule.at_rules, layers));
  let mut declarations = Vec::with_capacity(rtl.values.len() + 1);
  if rtl.reset_ltr {
    declarations.push(format!("{}:initial", rule.property));
  }
  declarations.extend(rtl.values.iter().map(|value| format!("{}:{value}", rtl.property)));
  Some(wrap_at_rules(
    &rule.at_rules,
    format!("{selector}{{{}}}", declarations.join(";")),
  ))
}

/// Wrap rendered rules in the cascade layers of `mode`.
///
/// `layer_of` maps each priority to its 1-based layer index so that normal
/// rules and RTL overrides share layer names.
fn layered(rendered: Vec<(u32, String)>, mode: LayerMode, layer_of: &BTreeMap<u32, usize>) -> Vec<String> {
  match mode {
    LayerMode::None => rendered.into_iter().map(|(_, css)| css).collect(),
    LayerMode::Single if rendered.is_empty() => Vec::new(),
    LayerMode::Single => {
      let inner: Vec<String> = rendered.into_iter().map(|(_, css)| css).collect();
      vec![format!("@layer atoms{{\n{}\n}}", inner.join("\n"))]
    }
    LayerMode::PerPriority => {
      let mut blocks: Vec<(usize, Vec<String>)> = Vec::new();
      for (priority, css) in rendered {
        let layer = layer_of.get(&priority).copied().unwrap_or_default();
        match blocks.last_mut() {
          Some((current, lines)) if *current == layer => lines.push(css),
          _ => blocks.push((layer, vec![css])),
        }
      }
      blocks
        .into_iter()
        .map(|(layer, lines)| format!("@layer priority{layer}{{\n{}\n}}", lines.join("\n")))
        .collect()
    }
  }
}

fn atomic_rules(manifest: &Manifest, mode: LayerMode) -> Vec<String> {
  let rules = sorted_rules(manifest);
  let layers = mode.uses_layers();
  let layer_of: BTreeMap<u32, usize> = rules
    .iter()
    .map(|rule| rule.priority)
    .collect::<std::collections::BTreeSet<_>>()
    .into_iter()
    .enumerate()
    .map(|(i, priority)| (priority, i + 1))
    .collect();

  let mut out = Vec::new();
  if mode == LayerMode::PerPriority && !layer_of.is_empty() {
    let names: Vec<String> = layer_of.values().map(|i| format!("priority{i}")).collect();
    out.push(format!("@layer {};", names.join(",")));
  }

  let normal = rules.iter().map(|rule| (rule.priority, rule_css(rule, layers))).collect();
  out.extend(layered(normal, mode, &layer_of));

  let overrides: Vec<(u32, String)> = rules
    .iter()
    .filter_map(|rule| rtl_css(rule, layers).map(|css| (rule.priority, css)))
    .collect();
  if !overrides.is_empty() {
    out.push(RTL_HEADER.to_string());
    out.extend(layered(overrides, mode, &layer_of));
  }
  out
}

fn themes(manifest: &Manifest) -> Vec<String> {
  manifest
    .themes
    .values()
    .flat_map(|theme| {
      let class = &theme.class_name;
      theme.blocks.iter().map(move |block| {
        wrap_at_rules(
          &block.at_rules,
          format!(".{class},.{class}:root{{{}}}", body(&block.declarations)),
        )
      })
    })
    .collect()
}

/// Render the whole manifest as one stylesheet.
pub fn render(manifest: &Manifest, config: &Config) -> String {
  let sections = [
    property_rules(manifest),
    root_vars(manifest),
    keyframes(manifest),
    position_tries(manifest),
    view_transitions(manifest),
    atomic_rules(manifest, config.layers),
    themes(manifest),
  ];
  let lines: Vec<String> = sections.into_iter().flatten().collect();
  if lines.is_empty() {
    return String::new();
  }
  let mut css = lines.join("\n");
  css.push('\n');
  css
}
