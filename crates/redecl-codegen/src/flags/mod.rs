//! Flag reconstruction
//!
//! Converts flat runtime bitmasks into the minimal annotation arguments a
//! human would have written, given the ancestor's bitmask.

pub mod builder;
pub mod rules;

pub use builder::{FlagFormatter, META_KEY};
pub use rules::{evaluate, Emit, FlagInput, FlagRule, RuleEntry};
