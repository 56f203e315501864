//! Native type names and output file names
//!
//! Native names add the prefix the host's header tool expects (`U`, `A`,
//! `I`, `F`). Output base names are claimed through [`NameRegistry`] so
//! that no two objects in one dump share a file name.

use rustc_hash::{FxHashMap, FxHashSet};

use redecl_reflect::{EnumForm, ObjectId, ObjectKind, ReflectionGraph};

use crate::error::{CodegenError, CodegenResult};

pub const DELEGATE_SIGNATURE_SUFFIX: &str = "__DelegateSignature";

pub const CORE_UOBJECT_PACKAGE: &str = "/Script/CoreUObject";
pub const ENGINE_PACKAGE: &str = "/Script/Engine";

/// Run-wide registry of granted output base names
#[derive(Debug, Default)]
pub struct NameRegistry {
    granted: FxHashSet<String>,
    counters: FxHashMap<String, u32>,
    assigned: FxHashMap<ObjectId, String>,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim a fresh name for `object`.
    ///
    /// The first claim of `base` is granted as-is; later claims get a numeric
    /// suffix and are remembered for [`existing`](Self::existing).
    pub fn claim(&mut self, base: &str, object: ObjectId) -> String {
        if self.granted.insert(base.to_string()) {
            self.counters.entry(base.to_string()).or_insert(0);
            return base.to_string();
        }

        let counter = self.counters.entry(base.to_string()).or_insert(0);
        loop {
            *counter += 1;
            let candidate = format!("{}{}", base, counter);
            if self.granted.insert(candidate.clone()) {
                self.assigned.insert(object, candidate.clone());
                return candidate;
            }
        }
    }

    /// The name previously granted to `object`, or `base` if it never
    /// needed a suffix (or has not been claimed yet)
    pub fn existing(&self, base: &str, object: ObjectId) -> String {
        self.assigned
            .get(&object)
            .cloned()
            .unwrap_or_else(|| base.to_string())
    }
}

/// `U`/`A`/`I` + name for classes and interfaces
pub fn native_class_name(graph: &dyn ReflectionGraph, id: ObjectId, interface_sibling: bool) -> String {
    let name = graph.object(id).map(|o| o.name.as_str()).unwrap_or("Object");
    let prefix = if interface_sibling {
        "I"
    } else if graph.is_child_of(id, ENGINE_PACKAGE, "Actor") {
        "A"
    } else {
        "U"
    };
    format!("{}{}", prefix, name)
}

/// `F` + name for aggregates
pub fn native_struct_name(graph: &dyn ReflectionGraph, id: ObjectId) -> String {
    let name = graph.object(id).map(|o| o.name.as_str()).unwrap_or_default();
    format!("F{}", name)
}

/// Enum name; namespaced enums gain `::Type` when used as a type
pub fn native_enum_name(graph: &dyn ReflectionGraph, id: ObjectId, as_type: bool) -> String {
    let Some(object) = graph.object(id) else {
        return String::new();
    };
    match object.as_enum() {
        Some(e) if as_type && e.form == EnumForm::Namespaced => format!("{}::Type", object.name),
        _ => object.name.clone(),
    }
}

/// Delegate name without the signature suffix
pub fn strip_delegate_suffix(name: &str) -> &str {
    name.strip_suffix(DELEGATE_SIGNATURE_SUFFIX).unwrap_or(name)
}

/// `F` + delegate name
pub fn native_delegate_name(graph: &dyn ReflectionGraph, id: ObjectId) -> String {
    let name = graph.object(id).map(|o| o.name.as_str()).unwrap_or_default();
    format!("F{}", strip_delegate_suffix(name))
}

/// Entry name with any `EnumName::` qualification removed
pub fn sanitize_enum_entry(name: &str) -> &str {
    match name.find("::") {
        Some(pos) => &name[pos + 2..],
        None => name,
    }
}

/// `<MODULE>_API`
pub fn api_macro(module: &str) -> String {
    format!("{}_API", module.to_uppercase())
}

/// Unsuffixed file base name of an object, and the object owning that file.
///
/// Nested delegate signatures live in their outer's file.
pub fn header_base_name(graph: &dyn ReflectionGraph, id: ObjectId) -> CodegenResult<(String, ObjectId)> {
    let mut visited = Vec::new();
    let mut id = id;
    loop {
        let object = graph.get(id)?;
        visited.push(id);
        return match &object.kind {
            ObjectKind::Class(_) | ObjectKind::Interface(_) | ObjectKind::Struct(_) | ObjectKind::Enum(_) => {
                Ok((object.name.clone(), id))
            }
            ObjectKind::Function(_)
                if object.type_descriptor().is_some() || object.name.ends_with(DELEGATE_SIGNATURE_SUFFIX) =>
            {
                match object.outer {
                    Some(outer) if !visited.contains(&outer) => {
                        id = outer;
                        continue;
                    }
                    _ => Ok((format!("{}Delegate", strip_delegate_suffix(&object.name)), id)),
                }
            }
            ObjectKind::Function(_) => Err(CodegenError::UnsupportedObject {
                object: object.name.clone(),
                kind: "function".to_string(),
            }),
            ObjectKind::Instance { .. } => Err(CodegenError::UnsupportedObject {
                object: object.name.clone(),
                kind: "instance".to_string(),
            }),
        };
    }
}

/// Capitalize the first character
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
