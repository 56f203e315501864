//! Declaration synthesis
//!
//! [`Synthesizer`] turns one eligible object into its declaration file and,
//! for classes and aggregates, a definition file with the synthesized
//! constructor and method stubs. Each declaration form lives in its own
//! submodule; annotation strings are built in [`annotations`].

mod annotations;
mod class;
mod delegate;
mod enums;
mod function;
mod interface;
mod structs;

use rustc_hash::FxHashSet;
use tracing::debug;

use redecl_reflect::{
    FunctionFlags, ObjectId, ObjectKind, PropertyFlags, ReflectedObject, ReflectionGraph, TypeDescriptor,
};

use crate::access::AccessLevel;
use crate::config::GeneratorConfig;
use crate::context::RunContext;
use crate::defaults::DefaultSerializer;
use crate::error::{CodegenError, CodegenResult};
use crate::file::{FileRole, SourceFile};
use crate::names::DELEGATE_SIGNATURE_SUFFIX;
use crate::types::{MapContext, TypeMapper};

/// Files produced for one object
#[derive(Debug, Clone)]
pub struct ObjectFiles {
    pub declaration: SourceFile,
    /// Present for classes and aggregates
    pub definition: Option<SourceFile>,
}

/// Whether `object` is a delegate signature, flagged or merely named as one
pub fn is_delegate_signature(object: &ReflectedObject) -> bool {
    match &object.kind {
        ObjectKind::Function(method) => {
            method.flags.contains(FunctionFlags::DELEGATE) || object.name.ends_with(DELEGATE_SIGNATURE_SUFFIX)
        }
        _ => false,
    }
}

/// Names a method parameter must not take, compared case-insensitively
#[derive(Debug, Default, Clone)]
pub struct ReservedNames {
    names: FxHashSet<String>,
}

impl ReservedNames {
    /// Fields along the whole super chain, plus the type's own methods
    /// when `with_methods` is set
    pub fn for_type(graph: &dyn ReflectionGraph, id: ObjectId, with_methods: bool) -> Self {
        let mut names = FxHashSet::default();
        for ancestor in graph.super_chain(id) {
            if let Some(object) = graph.object(ancestor) {
                names.extend(object.fields().iter().map(|f| f.name.to_lowercase()));
            }
        }
        if with_methods {
            if let Some(class) = graph.object(id).and_then(ReflectedObject::as_class) {
                for function in &class.functions {
                    if let Some(object) = graph.object(*function) {
                        names.insert(object.name.to_lowercase());
                    }
                }
            }
        }
        Self { names }
    }

    pub fn insert(&mut self, name: &str) {
        self.names.insert(name.to_lowercase());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(&name.to_lowercase())
    }
}

/// Emits declarations and definitions for eligible objects
pub struct Synthesizer<'a> {
    graph: &'a dyn ReflectionGraph,
    config: &'a GeneratorConfig,
    mapper: TypeMapper<'a>,
    defaults: DefaultSerializer<'a>,
}

impl<'a> Synthesizer<'a> {
    pub fn new(graph: &'a dyn ReflectionGraph, config: &'a GeneratorConfig) -> Self {
        Self {
            graph,
            config,
            mapper: TypeMapper::new(graph),
            defaults: DefaultSerializer::new(graph),
        }
    }

    /// Generate the files of `id`, written as `base_name` in `module`
    pub fn synthesize(
        &self,
        id: ObjectId,
        module: &str,
        base_name: &str,
        run: &mut RunContext,
    ) -> CodegenResult<ObjectFiles> {
        let object = self.graph.get(id)?;
        debug!(object = %object.name, module, file = base_name, "synthesizing");

        let mut declaration = SourceFile::new(id, module, base_name, FileRole::Declaration);
        let mut definition = SourceFile::new(id, module, base_name, FileRole::Definition);

        let has_definition = match object.type_descriptor() {
            Some(TypeDescriptor::ClassLike(class)) => {
                self.declare_class(id, class, &mut declaration, run)?;
                self.define_class(id, class, &mut definition, run)?;
                true
            }
            Some(TypeDescriptor::InterfaceLike(class)) => {
                self.declare_interface(id, class, &mut declaration, run)?;
                false
            }
            Some(TypeDescriptor::ValueAggregate(aggregate)) => {
                self.declare_struct(id, aggregate, &mut declaration, run)?;
                self.define_struct(id, aggregate, &mut definition, run)?;
                true
            }
            Some(TypeDescriptor::Enumeration(enumeration)) => {
                self.declare_enum(id, enumeration, &mut declaration, run)?;
                false
            }
            Some(TypeDescriptor::DelegateSignature(_)) if object.outer.is_none() => {
                self.declare_delegate(id, true, &mut declaration, run)?;
                false
            }
            Some(TypeDescriptor::DelegateSignature(_)) => {
                return Err(CodegenError::UnsupportedObject {
                    object: object.name.clone(),
                    kind: "nested delegate signature".to_string(),
                });
            }
            None if is_delegate_signature(object) => {
                return Err(CodegenError::MissingDelegateFlag {
                    object: object.name.clone(),
                });
            }
            None => {
                let kind = match object.kind {
                    ObjectKind::Function(_) => "function",
                    _ => "instance",
                };
                return Err(CodegenError::UnsupportedObject {
                    object: object.name.clone(),
                    kind: kind.to_string(),
                });
            }
        };

        let definition = if has_definition {
            definition.complete_forward_declarations(&declaration);
            Some(definition)
        } else {
            None
        };
        Ok(ObjectFiles {
            declaration,
            definition,
        })
    }

    // ── Shared member helpers ───────────────────────────────────────

    /// Access level of a field, public with a diagnostic when unspecified
    fn field_access(&self, owner: &str, field: &redecl_reflect::FieldDescriptor, run: &mut RunContext) -> AccessLevel {
        AccessLevel::of_field(field.flags).unwrap_or_else(|| {
            run.diagnose(owner, Some(&field.name), "no access specifier, assuming public");
            AccessLevel::Public
        })
    }

    /// Access level of a method, public with a diagnostic when unspecified
    fn function_access(&self, owner: &str, function: &ReflectedObject, flags: FunctionFlags, run: &mut RunContext) -> AccessLevel {
        AccessLevel::of_function(flags).unwrap_or_else(|| {
            run.diagnose(owner, Some(&function.name), "no access specifier, assuming public");
            AccessLevel::Public
        })
    }

    /// `UPROPERTY(...)` plus the member line
    fn declare_field(
        &self,
        owner: &str,
        field: &redecl_reflect::FieldDescriptor,
        file: &mut SourceFile,
        run: &mut RunContext,
    ) -> CodegenResult<()> {
        let annotations = self.field_annotations(field)?;

        let mut packed = false;
        let type_text = {
            let mut ctx = MapContext::new(owner, &mut run.usage)
                .with_file(file)
                .member(&mut packed);
            self.mapper.map(field, &mut ctx)?
        };

        let suffix = if field.array_dim != 1 {
            format!("[{}]", field.array_dim)
        } else if packed {
            ": 1".to_string()
        } else {
            String::new()
        };

        file.append_line(&format!("UPROPERTY({})", annotations));
        file.append_line(&format!("{} {}{};", type_text, field.name, suffix));
        file.blank_line();
        Ok(())
    }

    /// Nested delegate signatures among `functions`, declared in order
    fn declare_nested_delegates(&self, functions: &[ObjectId], file: &mut SourceFile, run: &mut RunContext) -> CodegenResult<()> {
        let mut count = 0;
        for function in functions {
            if is_delegate_signature(self.graph.get(*function)?) {
                self.declare_delegate(*function, false, file, run)?;
                count += 1;
            }
        }
        if count > 0 {
            file.blank_line();
        }
        Ok(())
    }

    /// Whether any field of the list is replicated
    fn has_replicated_fields(fields: &[redecl_reflect::FieldDescriptor]) -> bool {
        fields.iter().any(|f| f.flags.contains(PropertyFlags::NET))
    }
}
