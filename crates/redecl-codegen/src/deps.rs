//! Per-file type dependencies

use std::collections::BTreeMap;

use redecl_reflect::ObjectId;

/// How much of a referenced type a file needs to see
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum DependencyLevel {
    #[default]
    None,
    /// Name-only visibility (`class UFoo;`)
    ForwardDeclaration,
    /// Complete definition (`#include "Foo.h"`)
    FullInclusion,
}

/// Dependencies of one output file; levels only ever increase
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencySet {
    levels: BTreeMap<ObjectId, DependencyLevel>,
}

impl DependencySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `level` for `object`, keeping the stronger of old and new
    pub fn register(&mut self, object: ObjectId, level: DependencyLevel) {
        let entry = self.levels.entry(object).or_default();
        if level > *entry {
            *entry = level;
        }
    }

    pub fn level(&self, object: ObjectId) -> DependencyLevel {
        self.levels.get(&object).copied().unwrap_or_default()
    }

    /// All dependencies in object order
    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, DependencyLevel)> + '_ {
        self.levels.iter().map(|(id, level)| (*id, *level))
    }

    pub fn with_level(&self, level: DependencyLevel) -> impl Iterator<Item = ObjectId> + '_ {
        self.iter().filter(move |(_, l)| *l == level).map(|(id, _)| id)
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_then_full_promotes() {
        let mut deps = DependencySet::new();
        deps.register(ObjectId(3), DependencyLevel::ForwardDeclaration);
        deps.register(ObjectId(3), DependencyLevel::FullInclusion);
        assert_eq!(deps.level(ObjectId(3)), DependencyLevel::FullInclusion);
    }

    #[test]
    fn test_full_then_forward_never_demotes() {
        let mut deps = DependencySet::new();
        deps.register(ObjectId(3), DependencyLevel::FullInclusion);
        deps.register(ObjectId(3), DependencyLevel::ForwardDeclaration);
        assert_eq!(deps.level(ObjectId(3)), DependencyLevel::FullInclusion);
    }

    #[test]
    fn test_with_level_filters() {
        let mut deps = DependencySet::new();
        deps.register(ObjectId(1), DependencyLevel::ForwardDeclaration);
        deps.register(ObjectId(2), DependencyLevel::FullInclusion);
        let forward: Vec<_> = deps.with_level(DependencyLevel::ForwardDeclaration).collect();
        assert_eq!(forward, vec![ObjectId(1)]);
        assert_eq!(deps.level(ObjectId(9)), DependencyLevel::None);
    }
}
