//! Shorthand families and cascade tiers.

/// Shorthands whose constituents include other shorthands.
pub const SHORTHANDS_OF_SHORTHANDS: &[&str] = &[
  "all",
  "background",
  "border",
  "border-block",
  "border-inline",
  "font",
  "grid",
  "grid-area",
  "inset",
  "margin",
  "mask",
  "padding",
  "scroll-margin",
  "scroll-padding",
];

/// Shorthands whose constituents are all longhands.
pub const SHORTHANDS_OF_LONGHANDS: &[&str] = &[
  "animation",
  "animation-range",
  "background-position",
  "border-block-color",
  "border-block-end",
  "border-block-start",
  "border-block-style",
  "border-block-width",
  "border-bottom",
  "border-color",
  "border-image",
  "border-inline-color",
  "border-inline-end",
  "border-inline-start",
  "border-inline-style",
  "border-inline-width",
  "border-left",
  "border-radius",
  "border-right",
  "border-style",
  "border-top",
  "border-width",
  "column-rule",
  "columns",
  "contain-intrinsic-size",
  "container",
  "flex",
  "flex-flow",
  "font-variant",
  "gap",
  "grid-column",
  "grid-row",
  "grid-template",
  "inset-block",
  "inset-inline",
  "list-style",
  "margin-block",
  "margin-inline",
  "mask-border",
  "offset",
  "outline",
  "overflow",
  "overscroll-behavior",
  "padding-block",
  "padding-inline",
  "place-content",
  "place-items",
  "place-self",
  "scroll-margin-block",
  "scroll-margin-inline",
  "scroll-padding-block",
  "scroll-padding-inline",
  "scroll-timeline",
  "text-decoration",
  "text-emphasis",
  "text-wrap",
  "transition",
  "view-timeline",
];

/// Longhands defined relative to writing mode or direction.
pub const LOGICAL_LONGHANDS: &[&str] = &[
  "block-size",
  "border-block-end-color",
  "border-block-end-style",
  "border-block-end-width",
  "border-block-start-color",
  "border-block-start-style",
  "border-block-start-width",
  "border-end-end-radius",
  "border-end-start-radius",
  "border-inline-end-color",
  "border-inline-end-style",
  "border-inline-end-width",
  "border-inline-start-color",
  "border-inline-start-style",
  "border-inline-start-width",
  "border-start-end-radius",
  "border-start-start-radius",
  "contain-intrinsic-block-size",
  "contain-intrinsic-inline-size",
  "inline-size",
  "inset-block-end",
  "inset-block-start",
  "inset-inline-end",
  "inset-inline-start",
  "margin-block-end",
  "margin-block-start",
  "margin-inline-end",
  "margin-inline-start",
  "max-block-size",
  "max-inline-size",
  "min-block-size",
  "min-inline-size",
  "overflow-block",
  "overflow-inline",
  "overscroll-behavior-block",
  "overscroll-behavior-inline",
  "padding-block-end",
  "padding-block-start",
  "padding-inline-end",
  "padding-inline-start",
  "scroll-margin-block-end",
  "scroll-margin-block-start",
  "scroll-margin-inline-end",
  "scroll-margin-inline-start",
  "scroll-padding-block-end",
  "scroll-padding-block-start",
  "scroll-padding-inline-end",
  "scroll-padding-inline-start",
];

/// How a shorthand distributes its space-separated values when flattened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Distribution {
  /// top, right, bottom, left with the 1/2/3/4-value rules.
  Box([&'static str; 4]),
  /// top-left, top-right, bottom-right, bottom-left, with an optional `/` split.
  Corners([&'static str; 4]),
  /// Two constituents; one value applies to both.
  Pair([&'static str; 2]),
}

/// Flattening layout for a shorthand, if it has one.
pub fn distribution(property: &str) -> Option<Distribution> {
  use Distribution::*;

  let layout = match property {
    "margin" => Box(["margin-top", "margin-right", "margin-bottom", "margin-left"]),
    "padding" => Box(["padding-top", "padding-right", "padding-bottom", "padding-left"]),
    "inset" => Box(["top", "right", "bottom", "left"]),
    "border-width" => Box([
      "border-top-width",
      "border-right-width",
      "border-bottom-width",
      "border-left-width",
    ]),
    "border-style" => Box([
      "border-top-style",
      "border-right-style",
      "border-bottom-style",
      "border-left-style",
    ]),
    "border-color" => Box([
      "border-top-color",
      "border-right-color",
      "border-bottom-color",
      "border-left-color",
    ]),
    "scroll-margin" => Box([
      "scroll-margin-top",
      "scroll-margin-right",
      "scroll-margin-bottom",
      "scroll-margin-left",
    ]),
    "scroll-padding" => Box([
      "scroll-padding-top",
      "scroll-padding-right",
      "scroll-padding-bottom",
      "scroll-padding-left",
    ]),
    "border-radius" => Corners([
      "border-top-left-radius",
      "border-top-right-radius",
      "border-bottom-right-radius",
      "border-bottom-left-radius",
    ]),
    "margin-block" => Pair(["margin-block-start", "margin-block-end"]),
    "margin-inline" => Pair(["margin-inline-start", "margin-inline-end"]),
    "padding-block" => Pair(["padding-block-start", "padding-block-end"]),
    "padding-inline" => Pair(["padding-inline-start", "padding-inline-end"]),
    "inset-block" => Pair(["inset-block-start", "inset-block-end"]),
    "inset-inline" => Pair(["inset-inline-start", "inset-inline-end"]),
    "scroll-margin-block" => Pair(["scroll-margin-block-start", "scroll-margin-block-end"]),
    "scroll-margin-inline" => Pair(["scroll-margin-inline-start", "scroll-margin-inline-end"]),
    "scroll-padding-block" => Pair(["scroll-padding-block-start", "scroll-padding-block-end"]),
    "scroll-padding-inline" => Pair(["scroll-padding-inline-start", "scroll-padding-inline-end"]),
    "gap" => Pair(["row-gap", "column-gap"]),
    "overflow" => Pair(["overflow-x", "overflow-y"]),
    "overscroll-behavior" => Pair(["overscroll-behavior-x", "overscroll-behavior-y"]),
    "place-content" => Pair(["align-content", "justify-content"]),
    "place-items" => Pair(["align-items", "justify-items"]),
    "place-self" => Pair(["align-self", "justify-self"]),
    _ => return None,
  };
  Some(layout)
}

const SIDES: [&str; 4] = ["top", "right", "bottom", "left"];
const LOGICAL_SIDES: [&str; 4] = ["block-start", "block-end", "inline-start", "inline-end"];

fn sided(base: &str, suffix: &str, include_axes: bool) -> Vec<String> {
  let mut out: Vec<String> = SIDES.iter().map(|side| format!("{base}-{side}{suffix}")).collect();
  if include_axes {
    out.push(format!("{base}-block{suffix}"));
    out.push(format!("{base}-inline{suffix}"));
  }
  out.extend(LOGICAL_SIDES.iter().map(|side| format!("{base}-{side}{suffix}")));
  out
}

fn list(items: &[&str]) -> Vec<String> {
  items.iter().map(|s| s.to_string()).collect()
}

/// Every longhand (or nested shorthand) a shorthand overrides.
///
/// Returns an empty list for properties that are not shorthands.
pub fn implied_longhands(property: &str) -> Vec<String> {
  match property {
    "margin" | "padding" | "scroll-margin" | "scroll-padding" => sided(property, "", true),
    "inset" => {
      let mut out = list(&["top", "right", "bottom", "left", "inset-block", "inset-inline"]);
      out.extend(LOGICAL_SIDES.iter().map(|side| format!("inset-{side}")));
      out
    }
    "margin-block" | "padding-block" | "inset-block" | "scroll-margin-block" | "scroll-padding-block" => {
      vec![format!("{property}-start"), format!("{property}-end")]
    }
    "margin-inline" | "padding-inline" | "scroll-margin-inline" | "scroll-padding-inline" => {
      let base = property.trim_end_matches("-inline");
      vec![
        format!("{property}-start"),
        format!("{property}-end"),
        format!("{base}-left"),
        format!("{base}-right"),
      ]
    }
    "inset-inline" => list(&["inset-inline-start", "inset-inline-end", "left", "right"]),
    "border" => {
      let mut out = list(&["border-width", "border-style", "border-color"]);
      out.extend(sided("border", "", true));
      for suffix in ["-width", "-style", "-color"] {
        out.extend(sided("border", suffix, false));
      }
      out
    }
    "border-width" | "border-style" | "border-color" => {
      let suffix = property.trim_start_matches("border");
      sided("border", suffix, true)
    }
    "border-top" | "border-right" | "border-bottom" | "border-left" | "border-block-start" | "border-block-end"
    | "border-inline-start" | "border-inline-end" => {
      vec![format!("{property}-width"), format!("{property}-style"), format!("{property}-color")]
    }
    "border-block" | "border-inline" => {
      let mut out = vec![format!("{property}-width"), format!("{property}-style"), format!("{property}-color")];
      for end in ["start", "end"] {
        for suffix in ["", "-width", "-style", "-color"] {
          out.push(format!("{property}-{end}{suffix}"));
        }
      }
      out
    }
    "border-radius" => list(&[
      "border-top-left-radius",
      "border-top-right-radius",
      "border-bottom-right-radius",
      "border-bottom-left-radius",
      "border-start-start-radius",
      "border-start-end-radius",
      "border-end-start-radius",
      "border-end-end-radius",
    ]),
    "background" => list(&[
      "background-attachment",
      "background-clip",
      "background-color",
      "background-image",
      "background-origin",
      "background-position",
      "background-position-x",
      "background-position-y",
      "background-repeat",
      "background-size",
    ]),
    "background-position" => list(&["background-position-x", "background-position-y"]),
    "font" => list(&[
      "font-family",
      "font-size",
      "font-stretch",
      "font-style",
      "font-variant",
      "font-weight",
      "line-height",
    ]),
    "flex" => list(&["flex-grow", "flex-shrink", "flex-basis"]),
    "flex-flow" => list(&["flex-direction", "flex-wrap"]),
    "gap" => list(&["row-gap", "column-gap"]),
    "overflow" => list(&["overflow-x", "overflow-y"]),
    "overscroll-behavior" => list(&["overscroll-behavior-x", "overscroll-behavior-y"]),
    "grid-area" => list(&[
      "grid-row",
      "grid-row-start",
      "grid-row-end",
      "grid-column",
      "grid-column-start",
      "grid-column-end",
    ]),
    "grid-row" | "grid-column" => vec![format!("{property}-start"), format!("{property}-end")],
    "grid-template" => list(&["grid-template-areas", "grid-template-columns", "grid-template-rows"]),
    "place-content" => list(&["align-content", "justify-content"]),
    "place-items" => list(&["align-items", "justify-items"]),
    "place-self" => list(&["align-self", "justify-self"]),
    "outline" => list(&["outline-color", "outline-style", "outline-width"]),
    "list-style" => list(&["list-style-image", "list-style-position", "list-style-type"]),
    "text-decoration" => list(&[
      "text-decoration-color",
      "text-decoration-line",
      "text-decoration-style",
      "text-decoration-thickness",
    ]),
    "columns" => list(&["column-count", "column-width"]),
    "column-rule" => list(&["column-rule-color", "column-rule-style", "column-rule-width"]),
    "transition" => list(&[
      "transition-behavior",
      "transition-delay",
      "transition-duration",
      "transition-property",
      "transition-timing-function",
    ]),
    "animation" => list(&[
      "animation-delay",
      "animation-direction",
      "animation-duration",
      "animation-fill-mode",
      "animation-iteration-count",
      "animation-name",
      "animation-play-state",
      "animation-timing-function",
    ]),
    _ => Vec::new(),
  }
}

/// Whether a property is a shorthand at all.
pub fn is_shorthand(property: &str) -> bool {
  SHORTHANDS_OF_SHORTHANDS.contains(&property) || SHORTHANDS_OF_LONGHANDS.contains(&property)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn margin_implies_physical_and_logical_sides() {
    let longhands = implied_longhands("margin");
    assert!(longhands.contains(&"margin-top".to_string()));
    assert!(longhands.contains(&"margin-inline-start".to_string()));
    assert!(longhands.contains(&"margin-block".to_string()));
    assert!(!longhands.contains(&"margin".to_string()));
  }

  #[test]
  fn border_color_implies_each_side() {
    let longhands = implied_longhands("border-color");
    assert!(longhands.contains(&"border-left-color".to_string()));
    assert!(longhands.contains(&"border-inline-end-color".to_string()));
  }

  #[test]
  fn longhands_have_no_implied_properties() {
    assert!(implied_longhands("margin-top").is_empty());
    assert!(implied_longhands("display").is_empty());
  }

  #[test]
  fn margin_inline_resets_physical_sides() {
    assert_eq!(
      implied_longhands("margin-inline"),
      vec!["margin-inline-start", "margin-inline-end", "margin-left", "margin-right"]
    );
  }
}
