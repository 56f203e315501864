//! Run-scoped generator state
//!
//! [`RunContext`] is created at dump start and threaded by reference through
//! every component. It holds the only state shared across objects: output
//! names, per-module references, recorded type usage and diagnostics.

use std::collections::{BTreeMap, BTreeSet};

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::warn;

use redecl_reflect::ObjectId;

use crate::names::NameRegistry;

/// A recoverable problem; output was still produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub object: String,
    pub member: Option<String>,
    pub message: String,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.member {
            Some(member) => write!(f, "{}::{}: {}", self.object, member, self.message),
            None => write!(f, "{}: {}", self.object, self.message),
        }
    }
}

/// Per-module set of other modules referenced by its files
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleDependencySet {
    modules: BTreeMap<String, BTreeSet<String>>,
}

impl ModuleDependencySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure `module` has an entry, even with no references
    pub fn ensure(&mut self, module: &str) {
        self.modules.entry(module.to_string()).or_default();
    }

    /// Record that `module` references `other`
    pub fn record(&mut self, module: &str, other: &str) {
        let entry = self.modules.entry(module.to_string()).or_default();
        if !other.is_empty() && other != module {
            entry.insert(other.to_string());
        }
    }

    pub fn get(&self, module: &str) -> Option<&BTreeSet<String>> {
        self.modules.get(module)
    }

    pub fn modules(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Every module reachable from `module`, excluding `module` itself
    pub fn transitive(&self, module: &str) -> BTreeSet<String> {
        let mut seen = BTreeSet::new();
        let mut stack: Vec<&str> = vec![module];
        while let Some(current) = stack.pop() {
            if let Some(direct) = self.modules.get(current) {
                for dep in direct {
                    if dep != module && seen.insert(dep.clone()) {
                        stack.push(dep);
                    }
                }
            }
        }
        seen
    }
}

/// Type usage observed while mapping fields, consulted by later annotations
#[derive(Debug, Clone, Default)]
pub struct TypeUsage {
    /// Enums referenced by a scripting-visible field
    pub blueprint_visible_enums: FxHashSet<ObjectId>,
    /// Aggregates used as a field type anywhere
    pub blueprint_visible_structs: FxHashSet<ObjectId>,
    /// Underlying integer type of scoped enums
    pub enum_underlying_types: FxHashMap<ObjectId, String>,
    /// Aggregates used as map keys; their files get a hash stub
    pub hashed_key_structs: BTreeSet<ObjectId>,
}

/// State shared by every object of one dump
#[derive(Debug, Default)]
pub struct RunContext {
    pub names: NameRegistry,
    pub modules: ModuleDependencySet,
    pub usage: TypeUsage,
    pub diagnostics: Vec<Diagnostic>,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record and log a recoverable problem
    pub fn diagnose(&mut self, object: &str, member: Option<&str>, message: impl Into<String>) {
        let diagnostic = Diagnostic {
            object: object.to_string(),
            member: member.map(str::to_string),
            message: message.into(),
        };
        warn!(object = %diagnostic.object, member = ?diagnostic.member, "{}", diagnostic.message);
        self.diagnostics.push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_skips_self_and_empty() {
        let mut deps = ModuleDependencySet::new();
        deps.record("Game", "Game");
        deps.record("Game", "");
        deps.record("Game", "UMG");
        assert_eq!(deps.get("Game").unwrap().len(), 1);
    }

    #[test]
    fn test_transitive_handles_cycles() {
        let mut deps = ModuleDependencySet::new();
        deps.record("Game", "Combat");
        deps.record("Combat", "Inventory");
        deps.record("Inventory", "Game");
        let all = deps.transitive("Game");
        let expected: BTreeSet<String> = ["Combat", "Inventory"].iter().map(|s| s.to_string()).collect();
        assert_eq!(all, expected);
    }

    #[test]
    fn test_diagnostic_display() {
        let mut run = RunContext::new();
        run.diagnose("UWeapon", Some("Mode"), "unknown enum value 7");
        assert_eq!(run.diagnostics[0].to_string(), "UWeapon::Mode: unknown enum value 7");
    }
}
