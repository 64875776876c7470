//! Keyframe animations.
//!
//! Keyframes are content addressed: the generated name hashes the defining
//! path together with a canonical rendering of the frames, so editing a frame
//! yields a new animation name.

use crate::compiler::Compiler;
use crate::error::{Result, StyleError};
use crate::manifest::{DeclarationPair, Frame, KeyframesDef};
use crate::rtl::transform;
use crate::util::hash::{NameKind, artifact_name};
use crate::validate::validate_property;
use crate::value::{Declarations, dash_case};

const KEYFRAMES: &str = "@keyframes";

/// Position of a frame selector: `from` is 0, `to` is 100, `N%` is N.
///
/// For a comma list the first selector decides.
pub fn frame_order(selector: &str) -> Option<f64> {
  let first = selector.split(',').next()?.trim();
  match first {
    "from" => Some(0.0),
    "to" => Some(100.0),
    other => other.strip_suffix('%')?.trim().parse().ok(),
  }
}

/// `frame{prop:value;…}` for every frame, in order.
pub fn canonical_frames(frames: &[Frame]) -> String {
  frames
    .iter()
    .map(|frame| {
      let body: String = frame
        .declarations
        .iter()
        .map(|(property, value)| format!("{property}:{value};"))
        .collect();
      format!("{}{{{body}}}", frame.selector)
    })
    .collect()
}

fn tidy_selector(selector: &str) -> String {
  selector
    .split(',')
    .map(str::trim)
    .collect::<Vec<_>>()
    .join(",")
}

impl Compiler<'_> {
  /// Compile keyframes `name` in `scope` from `(selector, declarations)` frames.
  pub fn keyframes(&self, scope: &str, name: &str, frames: &[(String, Declarations)]) -> Result<KeyframesDef> {
    let mut ordered = Vec::with_capacity(frames.len());
    for (selector, declarations) in frames {
      let selector = tidy_selector(selector);
      let order = frame_order(&selector).ok_or_else(|| {
        StyleError::invalid(
          KEYFRAMES,
          format!("`{selector}` is not a frame selector; expected `from`, `to` or a percentage"),
        )
      })?;
      ordered.push((order, selector, declarations));
    }
    ordered.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut ltr = Vec::with_capacity(ordered.len());
    let mut rtl = Vec::with_capacity(ordered.len());
    for (_, selector, declarations) in ordered {
      let mut ltr_declarations: Vec<DeclarationPair> = Vec::new();
      let mut rtl_declarations: Vec<DeclarationPair> = Vec::new();
      for (key, raw) in declarations {
        let property = dash_case(key);
        validate_property(&property, self.validation)?;
        let value = self.single_value(&property, raw)?;
        let directional = transform(&property, &[value]);
        let ltr_value = directional.values.concat();
        match directional.rtl {
          Some(rtl) => rtl_declarations.push((rtl.property, rtl.values.concat())),
          None => rtl_declarations.push((directional.property.clone(), ltr_value.clone())),
        }
        ltr_declarations.push((directional.property, ltr_value));
      }
      ltr_declarations.sort_by(|a, b| a.0.cmp(&b.0));
      rtl_declarations.sort_by(|a, b| a.0.cmp(&b.0));
      ltr.push(Frame {
        selector: selector.clone(),
        declarations: ltr_declarations,
      });
      rtl.push(Frame {
        selector,
        declarations: rtl_declarations,
      });
    }

    let canonical = canonical_frames(&ltr);
    let name = artifact_name(self.prefix, NameKind::Keyframes, &format!("{scope}.{name}"), Some(&canonical));
    Ok(KeyframesDef {
      name,
      rtl_frames: (rtl != ltr).then_some(rtl),
      frames: ltr,
    })
  }
}
