//! atomcss-lib: atomic CSS compiler core
//!
//! This crate turns declarative style definitions into content-addressed CSS:
//! - `Context`: define/lookup API over a shared manifest
//! - `class`: the declaration → atomic rule pipeline and class merging
//! - `define`: variables, constants, keyframes, themes, position-try rules,
//!   view transitions and markers
//! - `manifest`: the versioned artifact store with cross-process locking
//! - `emit`: rendering the manifest into one stylesheet

pub mod class;
pub mod compiler;
pub mod conditional;
pub mod config;
pub mod consts;
pub mod context;
pub mod data;
pub mod define;
pub mod emit;
pub mod error;
pub mod fallback;
pub mod manifest;
pub mod normalize;
pub mod priority;
pub mod registration;
pub mod rtl;
pub mod selector;
pub mod shorthand;
pub mod util;
pub mod validate;
pub mod value;
pub mod when;

pub use config::Config;
pub use context::Context;
pub use error::{Result, StyleError};
