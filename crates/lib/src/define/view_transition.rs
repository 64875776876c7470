//! View-transition classes.
//!
//! A definition maps transition parts (`group`, `image_pair`, `old`, `new`)
//! to declarations. Values may be conditioned on at-rules, which is the usual
//! way to honour `prefers-reduced-motion`.

use crate::compiler::Compiler;
use crate::error::{Result, StyleError};
use crate::manifest::{TransitionPart, TransitionRule, ViewTransitionDef};
use crate::util::hash::{NameKind, artifact_name};
use crate::validate::validate_property;
use crate::value::{Declarations, dash_case};

impl Compiler<'_> {
  pub fn view_transition(
    &self,
    scope: &str,
    name: &str,
    parts: &[(String, Declarations)],
  ) -> Result<ViewTransitionDef> {
    let mut rules: Vec<TransitionRule> = Vec::new();
    for (part_name, declarations) in parts {
      let part = TransitionPart::parse(part_name).ok_or_else(|| {
        StyleError::invalid(
          "view-transition",
          format!("unknown part `{part_name}`; expected group, image_pair, old or new"),
        )
      })?;
      for (key, raw) in declarations {
        let property = dash_case(key);
        validate_property(&property, self.validation)?;
        for scoped in self.scoped_values(&property, raw)? {
          let declaration = (property.clone(), scoped.value);
          match rules
            .iter_mut()
            .find(|r| r.part == part && r.at_rules == scoped.at_rules)
          {
            Some(rule) => rule.declarations.push(declaration),
            None => rules.push(TransitionRule {
              part,
              at_rules: scoped.at_rules,
              declarations: vec![declaration],
            }),
          }
        }
      }
    }
    rules.sort_by(|a, b| a.part.cmp(&b.part).then(a.at_rules.len().cmp(&b.at_rules.len())));

    Ok(ViewTransitionDef {
      name: artifact_name(self.prefix, NameKind::ViewTransition, &format!("{scope}.{name}"), None),
      rules,
    })
  }
}
