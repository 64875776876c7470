//! Shared utilities: the namer and test helpers.

pub mod hash;

#[cfg(test)]
pub mod testutil;
