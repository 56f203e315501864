//! Field type mapping
//!
//! Maps a field or parameter descriptor to its declaration syntax and
//! registers whatever the syntax depends on with the file being written.

use redecl_reflect::{
    ClassRefKind, FieldDescriptor, FieldKind, ObjectId, ObjectRefKind, PropertyFlags, ReflectionGraph,
};

use crate::context::TypeUsage;
use crate::deps::DependencyLevel;
use crate::error::{CodegenError, CodegenResult};
use crate::file::SourceFile;
use crate::names::{
    native_class_name, native_delegate_name, native_enum_name, native_struct_name, CORE_UOBJECT_PACKAGE,
};

/// Include needed by `TSubclassOf`
pub const SUBCLASS_OF_INCLUDE: &str = "Templates/SubclassOf.h";

/// Aggregates the scripting layer cannot take as field or parameter types
const NON_EXPOSABLE_STRUCTS: &[&str] = &[
    "FloatInterval",
    "SplineCurves",
    "Int32Interval",
    "BoneReference",
    "OverlapResult",
    "RichCurve",
];

/// Where a mapped type occurs and what it may register
pub struct MapContext<'a> {
    /// Name of the enclosing declaration, for error messages
    pub owner: &'a str,
    /// File receiving dependency registrations
    pub file: Option<&'a mut SourceFile>,
    pub usage: &'a mut TypeUsage,
    /// Direct member declaration rather than a nested or parameter type
    pub top_level: bool,
    /// Set when a boolean must be declared as a one-bit field
    pub bitfield: Option<&'a mut bool>,
}

impl<'a> MapContext<'a> {
    pub fn new(owner: &'a str, usage: &'a mut TypeUsage) -> Self {
        Self {
            owner,
            file: None,
            usage,
            top_level: false,
            bitfield: None,
        }
    }

    pub fn with_file(mut self, file: &'a mut SourceFile) -> Self {
        self.file = Some(file);
        self
    }

    /// Mark as a top-level member declaration reporting bit-packed booleans
    pub fn member(mut self, bitfield: &'a mut bool) -> Self {
        self.top_level = true;
        self.bitfield = Some(bitfield);
        self
    }

    /// Context for element, key and value types
    fn inner(&mut self) -> MapContext<'_> {
        MapContext {
            owner: self.owner,
            file: self.file.as_deref_mut(),
            usage: &mut *self.usage,
            top_level: false,
            bitfield: None,
        }
    }

    fn depend(&mut self, object: ObjectId, level: DependencyLevel) {
        if let Some(file) = self.file.as_deref_mut() {
            file.add_dependency(object, level);
        }
    }

    fn include(&mut self, path: &str) {
        if let Some(file) = self.file.as_deref_mut() {
            file.add_extra_include(path);
        }
    }
}

/// Whether `id` is the root object class
pub fn is_root_object(graph: &dyn ReflectionGraph, id: ObjectId) -> bool {
    graph
        .object(id)
        .map(|o| o.name == "Object" && o.package == CORE_UOBJECT_PACKAGE)
        .unwrap_or(false)
}

/// Whether `id` is the root interface class
pub fn is_root_interface(graph: &dyn ReflectionGraph, id: ObjectId) -> bool {
    graph
        .object(id)
        .map(|o| o.name == "Interface" && o.package == CORE_UOBJECT_PACKAGE)
        .unwrap_or(false)
}

/// Field to declaration-syntax mapper
pub struct TypeMapper<'g> {
    graph: &'g dyn ReflectionGraph,
}

impl<'g> TypeMapper<'g> {
    pub fn new(graph: &'g dyn ReflectionGraph) -> Self {
        Self { graph }
    }

    pub fn map(&self, field: &FieldDescriptor, ctx: &mut MapContext<'_>) -> CodegenResult<String> {
        let graph = self.graph;
        let visible = field.flags.contains(PropertyFlags::BLUEPRINT_VISIBLE);

        let text = match &field.kind {
            FieldKind::Int8 => "int8".to_string(),
            FieldKind::Int16 => "int16".to_string(),
            FieldKind::Int32 => "int32".to_string(),
            FieldKind::Int64 => "int64".to_string(),
            FieldKind::UInt16 => "uint16".to_string(),
            FieldKind::UInt32 => "uint32".to_string(),
            FieldKind::UInt64 => "uint64".to_string(),
            FieldKind::Float => "float".to_string(),
            FieldKind::Double => "double".to_string(),

            FieldKind::Byte { enum_type: None } => "uint8".to_string(),
            FieldKind::Byte {
                enum_type: Some(enum_id),
            } => {
                ctx.depend(*enum_id, DependencyLevel::FullInclusion);
                if visible {
                    ctx.usage.blueprint_visible_enums.insert(*enum_id);
                }
                // Legacy enums are wrapped to byte width
                format!("TEnumAsByte<{}>", native_enum_name(graph, *enum_id, true))
            }

            FieldKind::Enum {
                enum_type,
                underlying,
            } => {
                let enum_id = enum_type.ok_or_else(|| CodegenError::NullEnumType {
                    object: ctx.owner.to_string(),
                    member: field.name.clone(),
                })?;
                ctx.depend(enum_id, DependencyLevel::FullInclusion);
                if visible {
                    ctx.usage.blueprint_visible_enums.insert(enum_id);
                }
                let underlying_type = self.map(underlying, &mut ctx.inner())?;
                ctx.usage.enum_underlying_types.insert(enum_id, underlying_type);
                native_enum_name(graph, enum_id, true)
            }

            FieldKind::Bool { field_mask, .. } => {
                let packed = ctx.top_level && *field_mask != 0xFF;
                match ctx.bitfield.as_deref_mut() {
                    Some(bitfield) if packed => {
                        *bitfield = true;
                        "uint8".to_string()
                    }
                    _ => "bool".to_string(),
                }
            }

            FieldKind::Object { reference, class } => {
                let class_name = match class {
                    Some(id) => {
                        ctx.depend(*id, DependencyLevel::ForwardDeclaration);
                        native_class_name(graph, *id, false)
                    }
                    None => "UObject".to_string(),
                };
                match reference {
                    ObjectRefKind::Raw => format!("{}*", class_name),
                    ObjectRefKind::Ptr => format!("TObjectPtr<{}>", class_name),
                    ObjectRefKind::Weak => format!("TWeakObjectPtr<{}>", class_name),
                    ObjectRefKind::Lazy => format!("TLazyObjectPtr<{}>", class_name),
                    ObjectRefKind::Soft => format!("TSoftObjectPtr<{}>", class_name),
                }
            }

            FieldKind::Class {
                reference,
                meta_class,
            } => match (reference, meta_class) {
                (ClassRefKind::Ptr, _) => "TObjectPtr<UClass>".to_string(),
                (ClassRefKind::Raw, Some(id)) if !is_root_object(graph, *id) => {
                    ctx.depend(*id, DependencyLevel::ForwardDeclaration);
                    ctx.include(SUBCLASS_OF_INCLUDE);
                    format!("TSubclassOf<{}>", native_class_name(graph, *id, false))
                }
                (ClassRefKind::Raw, _) => "UClass*".to_string(),
                (ClassRefKind::Soft, Some(id)) => {
                    ctx.depend(*id, DependencyLevel::ForwardDeclaration);
                    format!("TSoftClassPtr<{}>", native_class_name(graph, *id, false))
                }
                (ClassRefKind::Soft, None) => "TSoftClassPtr<UObject>".to_string(),
            },

            FieldKind::Interface { interface } => match interface {
                Some(id) if !is_root_interface(graph, *id) => {
                    ctx.depend(*id, DependencyLevel::ForwardDeclaration);
                    format!("TScriptInterface<{}>", native_class_name(graph, *id, true))
                }
                _ => "FScriptInterface".to_string(),
            },

            FieldKind::Struct { struct_type } => {
                let struct_id = struct_type.ok_or_else(|| CodegenError::NullStructType {
                    object: ctx.owner.to_string(),
                    member: field.name.clone(),
                })?;
                ctx.depend(struct_id, DependencyLevel::FullInclusion);
                ctx.usage.blueprint_visible_structs.insert(struct_id);
                native_struct_name(graph, struct_id)
            }

            FieldKind::Delegate { signature, .. } => {
                let signature = signature.ok_or_else(|| CodegenError::UnsupportedFieldKind {
                    object: ctx.owner.to_string(),
                    member: field.name.clone(),
                    kind: "delegate without signature".to_string(),
                })?;
                ctx.depend(signature, DependencyLevel::FullInclusion);
                native_delegate_name(graph, signature)
            }

            FieldKind::FieldPath { field_class } => format!("TFieldPath<F{}>", field_class),

            FieldKind::Name => "FName".to_string(),
            FieldKind::Str => "FString".to_string(),
            FieldKind::Text => "FText".to_string(),

            FieldKind::Array { inner } => {
                format!("TArray<{}>", self.map(inner, &mut ctx.inner())?)
            }
            FieldKind::Set { element } => {
                format!("TSet<{}>", self.map(element, &mut ctx.inner())?)
            }
            FieldKind::Map { key, value } => {
                // Only member maps need a hash for their struct key
                if let (true, FieldKind::Struct { struct_type: Some(id) }) = (ctx.top_level, &key.kind) {
                    ctx.usage.hashed_key_structs.insert(*id);
                }
                let key_type = self.map(key, &mut ctx.inner())?;
                let value_type = self.map(value, &mut ctx.inner())?;
                format!("TMap<{}, {}>", key_type, value_type)
            }

            FieldKind::Unsupported { class_name } => {
                return Err(CodegenError::UnsupportedFieldKind {
                    object: ctx.owner.to_string(),
                    member: field.name.clone(),
                    kind: class_name.clone(),
                });
            }
        };
        Ok(text)
    }

    /// Whether the scripting layer accepts this type, used by the
    /// "make everything scriptable" switches
    pub fn is_blueprint_exposable(&self, field: &FieldDescriptor) -> bool {
        match &field.kind {
            FieldKind::Int8
            | FieldKind::Int16
            | FieldKind::Int64
            | FieldKind::UInt16
            | FieldKind::UInt32
            | FieldKind::UInt64
            | FieldKind::Double => false,
            FieldKind::Object {
                reference: ObjectRefKind::Weak,
                ..
            } => false,
            FieldKind::Array { inner } => self.is_blueprint_exposable(inner),
            FieldKind::Set { element } => self.is_blueprint_exposable(element),
            FieldKind::Map { key, value } => {
                self.is_blueprint_exposable(key) && self.is_blueprint_exposable(value)
            }
            FieldKind::Struct {
                struct_type: Some(id),
            } => self
                .graph
                .object(*id)
                .map(|o| !NON_EXPOSABLE_STRUCTS.contains(&o.name.as_str()))
                .unwrap_or(true),
            FieldKind::Enum { underlying, .. } => matches!(underlying.kind, FieldKind::Byte { .. }),
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use redecl_reflect::{ClassDescriptor, ObjectKind, ReflectedObject, Snapshot, StructDescriptor};

    fn graph() -> (Snapshot, ObjectId, ObjectId, ObjectId) {
        let mut g = Snapshot::new();
        let object = g.push(ReflectedObject::new(
            "Object",
            CORE_UOBJECT_PACKAGE,
            ObjectKind::Class(ClassDescriptor::default()),
        ));
        let actor = g.push(ReflectedObject::new(
            "Actor",
            "/Script/Engine",
            ObjectKind::Class(ClassDescriptor {
                super_class: Some(object),
                ..Default::default()
            }),
        ));
        let vector = g.push(ReflectedObject::new(
            "Vector",
            "/Script/CoreUObject",
            ObjectKind::Struct(StructDescriptor::default()),
        ));
        (g, object, actor, vector)
    }

    fn map(g: &Snapshot, field: &FieldDescriptor, file: &mut SourceFile) -> String {
        let mut usage = TypeUsage::default();
        let mut ctx = MapContext::new("Test", &mut usage).with_file(file);
        TypeMapper::new(g).map(field, &mut ctx).unwrap()
    }

    fn file() -> SourceFile {
        SourceFile::new(ObjectId(99), "Game", "Test", crate::file::FileRole::Declaration)
    }

    #[test]
    fn test_object_reference_is_forward_declared() {
        let (g, _, actor, _) = graph();
        let mut f = file();
        let field = FieldDescriptor::new("Owner", FieldKind::object(Some(actor)));
        assert_eq!(map(&g, &field, &mut f), "AActor*");
        assert_eq!(f.dependencies().level(actor), DependencyLevel::ForwardDeclaration);
    }

    #[test]
    fn test_subclass_of_adds_include() {
        let (g, object, actor, _) = graph();
        let mut f = file();
        let field = FieldDescriptor::new(
            "SpawnClass",
            FieldKind::Class {
                reference: ClassRefKind::Raw,
                meta_class: Some(actor),
            },
        );
        assert_eq!(map(&g, &field, &mut f), "TSubclassOf<AActor>");

        let plain = FieldDescriptor::new(
            "AnyClass",
            FieldKind::Class {
                reference: ClassRefKind::Raw,
                meta_class: Some(object),
            },
        );
        assert_eq!(map(&g, &plain, &mut f), "UClass*");
    }

    #[test]
    fn test_struct_is_full_inclusion() {
        let (g, _, _, vector) = graph();
        let mut f = file();
        let field = FieldDescriptor::new("Location", FieldKind::Struct { struct_type: Some(vector) });
        assert_eq!(map(&g, &field, &mut f), "FVector");
        assert_eq!(f.dependencies().level(vector), DependencyLevel::FullInclusion);
    }

    #[test]
    fn test_null_struct_is_fatal() {
        let (g, ..) = graph();
        let mut usage = TypeUsage::default();
        let mut ctx = MapContext::new("UThing", &mut usage);
        let field = FieldDescriptor::new("Broken", FieldKind::Struct { struct_type: None });
        let err = TypeMapper::new(&g).map(&field, &mut ctx).unwrap_err();
        assert!(matches!(err, CodegenError::NullStructType { ref member, .. } if member == "Broken"));
    }

    #[test]
    fn test_member_map_with_struct_key_records_hash_stub() {
        let (g, _, _, vector) = graph();
        let mut usage = TypeUsage::default();
        let mut packed = false;
        let mut ctx = MapContext::new("UThing", &mut usage).member(&mut packed);
        let field = FieldDescriptor::new(
            "Lookup",
            FieldKind::map_of(FieldKind::Struct { struct_type: Some(vector) }, FieldKind::Int32),
        );
        let text = TypeMapper::new(&g).map(&field, &mut ctx).unwrap();
        assert_eq!(text, "TMap<FVector, int32>");
        assert!(usage.hashed_key_structs.contains(&vector));
    }

    #[test]
    fn test_parameter_and_nested_maps_record_no_hash_stub() {
        let (g, _, _, vector) = graph();
        let lookup = FieldKind::map_of(FieldKind::Struct { struct_type: Some(vector) }, FieldKind::Int32);
        let mut usage = TypeUsage::default();

        let param = FieldDescriptor::param("Lookup", lookup.clone(), PropertyFlags::NONE);
        let mut ctx = MapContext::new("UThing", &mut usage);
        TypeMapper::new(&g).map(&param, &mut ctx).unwrap();

        let mut packed = false;
        let nested = FieldDescriptor::new("Lookups", FieldKind::array_of(lookup));
        let mut ctx = MapContext::new("UThing", &mut usage).member(&mut packed);
        let text = TypeMapper::new(&g).map(&nested, &mut ctx).unwrap();

        assert_eq!(text, "TArray<TMap<FVector, int32>>");
        assert!(usage.hashed_key_structs.is_empty());
    }

    #[test]
    fn test_packed_bool_only_at_top_level() {
        let (g, ..) = graph();
        let mut usage = TypeUsage::default();
        let mut packed = false;
        let field = FieldDescriptor::new("bFlag", FieldKind::bitfield(0, 0x04));
        let mut ctx = MapContext::new("UThing", &mut usage).member(&mut packed);
        assert_eq!(TypeMapper::new(&g).map(&field, &mut ctx).unwrap(), "uint8");
        assert!(packed);

        let mut usage = TypeUsage::default();
        let mut ctx = MapContext::new("UThing", &mut usage);
        assert_eq!(TypeMapper::new(&g).map(&field, &mut ctx).unwrap(), "bool");
    }

    #[test]
    fn test_unsupported_kind_is_fatal() {
        let (g, ..) = graph();
        let mut usage = TypeUsage::default();
        let mut ctx = MapContext::new("UThing", &mut usage);
        let field = FieldDescriptor::new(
            "Mystery",
            FieldKind::Unsupported {
                class_name: "OptionalProperty".into(),
            },
        );
        let err = TypeMapper::new(&g).map(&field, &mut ctx).unwrap_err();
        assert!(matches!(err, CodegenError::UnsupportedFieldKind { .. }));
    }

    #[test]
    fn test_exposability() {
        let (g, ..) = graph();
        let mapper = TypeMapper::new(&g);
        assert!(mapper.is_blueprint_exposable(&FieldDescriptor::new("A", FieldKind::Int32)));
        assert!(!mapper.is_blueprint_exposable(&FieldDescriptor::new("B", FieldKind::UInt32)));
        assert!(!mapper.is_blueprint_exposable(&FieldDescriptor::new(
            "C",
            FieldKind::array_of(FieldKind::Int16)
        )));
    }
}
