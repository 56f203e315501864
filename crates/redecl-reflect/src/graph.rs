//! Reflection graph access
//!
//! [`ReflectionGraph`] is the read-only seam between a reflection runtime and
//! the generator. [`Snapshot`] is the in-memory implementation used by the
//! CLI (loaded from JSON) and by tests.

use std::path::Path;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::descriptor::{ObjectId, ObjectKind, ReflectedObject};
use crate::error::{ReflectError, ReflectResult};

/// Package prefix of natively compiled script modules
pub const SCRIPT_PACKAGE_PREFIX: &str = "/Script/";

/// Read-only view over all reflected objects
pub trait ReflectionGraph {
    /// Look up an object by id
    fn object(&self, id: ObjectId) -> Option<&ReflectedObject>;

    /// All object ids in enumeration order
    fn object_ids(&self) -> Box<dyn Iterator<Item = ObjectId> + '_>;

    /// Find an object by package path and name
    fn find(&self, package: &str, name: &str) -> Option<ObjectId>;

    /// Like [`object`](Self::object) but fails on dangling ids
    fn get(&self, id: ObjectId) -> ReflectResult<&ReflectedObject> {
        self.object(id).ok_or(ReflectError::UnknownObject(id))
    }

    /// Walk outers up to the object sitting directly in its package
    fn top_level(&self, id: ObjectId) -> ObjectId {
        let mut visited = vec![id];
        let mut current = id;
        while let Some(outer) = self.object(current).and_then(|o| o.outer) {
            if visited.contains(&outer) {
                break;
            }
            visited.push(outer);
            current = outer;
        }
        current
    }

    /// Module name for the object's package, empty for non-script packages
    fn module_name(&self, id: ObjectId) -> String {
        self.object(id)
            .and_then(|o| o.package.strip_prefix(SCRIPT_PACKAGE_PREFIX))
            .unwrap_or_default()
            .to_string()
    }

    /// The object itself followed by its super types, nearest first
    fn super_chain(&self, id: ObjectId) -> Vec<ObjectId> {
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(cur) = current {
            if chain.contains(&cur) {
                break;
            }
            chain.push(cur);
            current = self.object(cur).and_then(ReflectedObject::super_id);
        }
        chain
    }

    /// Whether `id` is, or derives from, the object named `name` in `package`
    fn is_child_of(&self, id: ObjectId, package: &str, name: &str) -> bool {
        self.super_chain(id).into_iter().any(|cur| {
            self.object(cur)
                .map(|o| o.name == name && o.package == package)
                .unwrap_or(false)
        })
    }
}

/// Serializable, in-memory reflection graph
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    objects: Vec<ReflectedObject>,

    #[serde(skip)]
    index: FxHashMap<(String, String), ObjectId>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an object and return its id
    pub fn push(&mut self, object: ReflectedObject) -> ObjectId {
        let id = ObjectId(self.objects.len() as u32);
        self.index
            .entry((object.package.clone(), object.name.clone()))
            .or_insert(id);
        self.objects.push(object);
        id
    }

    /// Mutable access for builders that need to patch an object after insertion
    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut ReflectedObject> {
        self.objects.get_mut(id.index())
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Parse a snapshot from JSON text and validate its references
    pub fn from_json_str(text: &str) -> ReflectResult<Self> {
        let mut snapshot: Snapshot = serde_json::from_str(text)?;
        snapshot.rebuild_index();
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Load a snapshot file
    pub fn load(path: &Path) -> ReflectResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json_string(&self) -> ReflectResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save(&self, path: &Path) -> ReflectResult<()> {
        std::fs::write(path, self.to_json_string()?)?;
        Ok(())
    }

    fn rebuild_index(&mut self) {
        self.index.clear();
        for (i, object) in self.objects.iter().enumerate() {
            self.index
                .entry((object.package.clone(), object.name.clone()))
                .or_insert(ObjectId(i as u32));
        }
    }

    /// Check that every object id referenced by the graph exists and that
    /// no object is nested inside itself
    pub fn validate(&self) -> ReflectResult<()> {
        let count = self.objects.len();
        let check = |owner: &ReflectedObject, id: Option<ObjectId>, what: &str| -> ReflectResult<()> {
            match id {
                Some(id) if id.index() >= count => Err(ReflectError::InvalidSnapshot(format!(
                    "{} of '{}' references missing object {}",
                    what, owner.name, id
                ))),
                _ => Ok(()),
            }
        };

        for object in &self.objects {
            check(object, object.outer, "outer")?;
            match &object.kind {
                ObjectKind::Class(c) | ObjectKind::Interface(c) => {
                    check(object, c.super_class, "super class")?;
                    check(object, c.within, "within class")?;
                    for id in c.interfaces.iter().chain(&c.functions) {
                        check(object, Some(*id), "member")?;
                    }
                }
                ObjectKind::Struct(s) => check(object, s.super_struct, "super struct")?,
                ObjectKind::Instance { class } => check(object, *class, "class")?,
                ObjectKind::Enum(_) | ObjectKind::Function(_) => {}
            }
        }
        self.check_outer_cycles()
    }

    fn check_outer_cycles(&self) -> ReflectResult<()> {
        // 0 = unvisited, 1 = on the current path, 2 = known to terminate
        let mut state = vec![0u8; self.objects.len()];
        for start in 0..self.objects.len() {
            let mut path = Vec::new();
            let mut current = Some(start);
            while let Some(index) = current {
                match state[index] {
                    2 => break,
                    1 => {
                        return Err(ReflectError::InvalidSnapshot(format!(
                            "outer chain of '{}' loops back to '{}'",
                            self.objects[start].name, self.objects[index].name
                        )))
                    }
                    _ => {}
                }
                state[index] = 1;
                path.push(index);
                current = self.objects[index].outer.map(ObjectId::index);
            }
            for index in path {
                state[index] = 2;
            }
        }
        Ok(())
    }
}

impl ReflectionGraph for Snapshot {
    fn object(&self, id: ObjectId) -> Option<&ReflectedObject> {
        self.objects.get(id.index())
    }

    fn object_ids(&self) -> Box<dyn Iterator<Item = ObjectId> + '_> {
        Box::new((0..self.objects.len() as u32).map(ObjectId))
    }

    fn find(&self, package: &str, name: &str) -> Option<ObjectId> {
        self.index
            .get(&(package.to_string(), name.to_string()))
            .copied()
    }
}
