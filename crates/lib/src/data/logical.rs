//! Logical-to-physical property and value maps.

/// `(logical, ltr, rtl)` property triples for the inline axis.
pub const LOGICAL_PROPERTIES: &[(&str, &str, &str)] = &[
  ("border-end-end-radius", "border-bottom-right-radius", "border-bottom-left-radius"),
  ("border-end-start-radius", "border-bottom-left-radius", "border-bottom-right-radius"),
  ("border-inline-end", "border-right", "border-left"),
  ("border-inline-end-color", "border-right-color", "border-left-color"),
  ("border-inline-end-style", "border-right-style", "border-left-style"),
  ("border-inline-end-width", "border-right-width", "border-left-width"),
  ("border-inline-start", "border-left", "border-right"),
  ("border-inline-start-color", "border-left-color", "border-right-color"),
  ("border-inline-start-style", "border-left-style", "border-right-style"),
  ("border-inline-start-width", "border-left-width", "border-right-width"),
  ("border-start-end-radius", "border-top-right-radius", "border-top-left-radius"),
  ("border-start-start-radius", "border-top-left-radius", "border-top-right-radius"),
  ("inset-inline-end", "right", "left"),
  ("inset-inline-start", "left", "right"),
  ("margin-inline-end", "margin-right", "margin-left"),
  ("margin-inline-start", "margin-left", "margin-right"),
  ("padding-inline-end", "padding-right", "padding-left"),
  ("padding-inline-start", "padding-left", "padding-right"),
  ("scroll-margin-inline-end", "scroll-margin-right", "scroll-margin-left"),
  ("scroll-margin-inline-start", "scroll-margin-left", "scroll-margin-right"),
  ("scroll-padding-inline-end", "scroll-padding-right", "scroll-padding-left"),
  ("scroll-padding-inline-start", "scroll-padding-left", "scroll-padding-right"),
];

/// `(logical, ltr, rtl)` keyword triples.
pub const LOGICAL_VALUES: &[(&str, &str, &str)] = &[
  ("end", "right", "left"),
  ("inline-end", "right", "left"),
  ("inline-start", "left", "right"),
  ("start", "left", "right"),
];

/// Properties whose values (not just names) may be logical keywords.
pub const VALUE_FLIPPED: &[&str] = &["clear", "float"];

/// Properties whose position words flip per token.
pub const POSITION_FLIPPED: &[&str] = &["background-position", "background-position-x"];

/// Physical `(ltr, rtl)` names for a logical property.
pub fn physical_property(property: &str) -> Option<(&'static str, &'static str)> {
  LOGICAL_PROPERTIES
    .iter()
    .find(|(logical, _, _)| *logical == property)
    .map(|(_, ltr, rtl)| (*ltr, *rtl))
}

/// Physical `(ltr, rtl)` keywords for a logical value keyword.
pub fn physical_value(value: &str) -> Option<(&'static str, &'static str)> {
  LOGICAL_VALUES
    .iter()
    .find(|(logical, _, _)| *logical == value)
    .map(|(_, ltr, rtl)| (*ltr, *rtl))
}
