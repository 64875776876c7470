//! Static CSS lookup tables.
//!
//! These are data, not algorithms: property classes, shorthand families,
//! logical mappings, and cascade weights consulted by the compiler stages.

pub mod logical;
pub mod properties;
pub mod pseudo;
pub mod shorthands;
