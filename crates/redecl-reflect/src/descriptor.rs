//! Reflected object and member descriptors
//!
//! Descriptors mirror the host object system's reflection records: every
//! object has a name, an owning package, an optional outer object and a
//! kind-specific payload. Members (fields, parameters) are stored inline;
//! methods and delegate signatures are standalone objects whose outer is
//! the declaring type.

use serde::{Deserialize, Serialize};

use crate::flags::{ClassFlags, EnumFlags, FunctionFlags, ObjectFlags, PropertyFlags, StructFlags};
use crate::instance::InstanceData;

/// Index of an object inside its reflection graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub u32);

impl ObjectId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One object in the reflection graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReflectedObject {
    /// Object name without any native prefix (e.g. `Actor`, `Vector`)
    pub name: String,

    /// Path of the outermost package (e.g. `/Script/Engine`)
    pub package: String,

    /// Owning object; `None` when the package itself is the outer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outer: Option<ObjectId>,

    /// Lifecycle flags of the object itself
    #[serde(default)]
    pub object_flags: ObjectFlags,

    /// Kind-specific payload
    pub kind: ObjectKind,
}

/// Kind-specific payload of a reflected object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ObjectKind {
    Class(ClassDescriptor),
    /// Abstract contract; its native sibling is named with the `I` prefix
    Interface(ClassDescriptor),
    Struct(StructDescriptor),
    Enum(EnumDescriptor),
    /// Method or delegate signature
    Function(MethodDescriptor),
    /// Plain object instance (default sub-objects, archetypes)
    Instance { class: Option<ObjectId> },
}

/// Borrowed view of a reflected type, one variant per declaration form
#[derive(Debug, Clone, Copy)]
pub enum TypeDescriptor<'a> {
    ClassLike(&'a ClassDescriptor),
    InterfaceLike(&'a ClassDescriptor),
    ValueAggregate(&'a StructDescriptor),
    Enumeration(&'a EnumDescriptor),
    DelegateSignature(&'a MethodDescriptor),
}

impl ReflectedObject {
    pub fn new(name: impl Into<String>, package: impl Into<String>, kind: ObjectKind) -> Self {
        Self {
            name: name.into(),
            package: package.into(),
            outer: None,
            object_flags: ObjectFlags::NONE,
            kind,
        }
    }

    /// Set the outer object
    pub fn with_outer(mut self, outer: ObjectId) -> Self {
        self.outer = Some(outer);
        self
    }

    /// Set lifecycle flags
    pub fn with_object_flags(mut self, flags: ObjectFlags) -> Self {
        self.object_flags = flags;
        self
    }

    /// The declaration form of this object, if it declares a type.
    ///
    /// Methods only count as types when flagged as delegate signatures.
    pub fn type_descriptor(&self) -> Option<TypeDescriptor<'_>> {
        match &self.kind {
            ObjectKind::Class(c) => Some(TypeDescriptor::ClassLike(c)),
            ObjectKind::Interface(c) => Some(TypeDescriptor::InterfaceLike(c)),
            ObjectKind::Struct(s) => Some(TypeDescriptor::ValueAggregate(s)),
            ObjectKind::Enum(e) => Some(TypeDescriptor::Enumeration(e)),
            ObjectKind::Function(m) if m.flags.contains(FunctionFlags::DELEGATE) => {
                Some(TypeDescriptor::DelegateSignature(m))
            }
            ObjectKind::Function(_) | ObjectKind::Instance { .. } => None,
        }
    }

    /// Class or interface payload
    pub fn as_class(&self) -> Option<&ClassDescriptor> {
        match &self.kind {
            ObjectKind::Class(c) | ObjectKind::Interface(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&StructDescriptor> {
        match &self.kind {
            ObjectKind::Struct(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&EnumDescriptor> {
        match &self.kind {
            ObjectKind::Enum(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&MethodDescriptor> {
        match &self.kind {
            ObjectKind::Function(m) => Some(m),
            _ => None,
        }
    }

    pub fn is_class(&self) -> bool {
        matches!(self.kind, ObjectKind::Class(_))
    }

    pub fn is_interface(&self) -> bool {
        matches!(self.kind, ObjectKind::Interface(_))
    }

    /// Super type for classes, interfaces and aggregates
    pub fn super_id(&self) -> Option<ObjectId> {
        match &self.kind {
            ObjectKind::Class(c) | ObjectKind::Interface(c) => c.super_class,
            ObjectKind::Struct(s) => s.super_struct,
            _ => None,
        }
    }

    /// Fields declared directly on this type (not inherited ones)
    pub fn fields(&self) -> &[FieldDescriptor] {
        match &self.kind {
            ObjectKind::Class(c) | ObjectKind::Interface(c) => &c.fields,
            ObjectKind::Struct(s) => &s.fields,
            _ => &[],
        }
    }
}

/// Class-like and interface-like payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassDescriptor {
    pub flags: ClassFlags,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub super_class: Option<ObjectId>,

    /// Required outer class for instances
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub within: Option<ObjectId>,

    /// Config file category (`Engine`, `Game`, ...)
    #[serde(default)]
    pub config_name: String,

    /// Implemented interfaces, in declaration order
    #[serde(default)]
    pub interfaces: Vec<ObjectId>,

    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,

    /// Methods and nested delegate signatures, in declaration order
    #[serde(default)]
    pub functions: Vec<ObjectId>,

    /// Memory of the class default object
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_object: Option<InstanceData>,
}

/// Value-aggregate payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructDescriptor {
    pub flags: StructFlags,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub super_struct: Option<ObjectId>,

    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,

    /// Size of one instance in bytes
    #[serde(default)]
    pub size: usize,

    /// Memory of a default-constructed instance
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_instance: Option<InstanceData>,
}

/// Syntactic form of an enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnumForm {
    /// `enum EFoo { ... }`
    #[default]
    Regular,
    /// `namespace EFoo { enum Type { ... } }`
    Namespaced,
    /// `enum class EFoo : uint8 { ... }`
    EnumClass,
}

/// One enumeration entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumEntry {
    /// Entry name, possibly qualified as `EFoo::Bar`
    pub name: String,
    pub value: i64,
}

/// Enumeration payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnumDescriptor {
    #[serde(default)]
    pub form: EnumForm,

    #[serde(default)]
    pub flags: EnumFlags,

    #[serde(default)]
    pub entries: Vec<EnumEntry>,
}

impl EnumDescriptor {
    pub fn new(form: EnumForm, entries: impl IntoIterator<Item = (impl Into<String>, i64)>) -> Self {
        Self {
            form,
            flags: EnumFlags::NONE,
            entries: entries
                .into_iter()
                .map(|(name, value)| EnumEntry {
                    name: name.into(),
                    value,
                })
                .collect(),
        }
    }

    /// Entry name for a stored value
    pub fn name_for_value(&self, value: i64) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.value == value)
            .map(|entry| entry.name.as_str())
    }
}

/// Method or delegate-signature payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MethodDescriptor {
    pub flags: FunctionFlags,

    /// Parameters in declaration order, including the return slot
    #[serde(default)]
    pub params: Vec<FieldDescriptor>,

    /// Multicast delegate stored sparsely on its owner
    #[serde(default)]
    pub sparse: bool,
}

impl MethodDescriptor {
    /// The slot flagged as return value
    pub fn return_param(&self) -> Option<&FieldDescriptor> {
        self.params
            .iter()
            .find(|p| p.flags.contains(PropertyFlags::RETURN_PARM))
    }

    /// Parameters excluding the return slot
    pub fn parameters(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.params.iter().filter(|p| {
            p.flags.contains(PropertyFlags::PARM) && !p.flags.contains(PropertyFlags::RETURN_PARM)
        })
    }
}

/// A typed member slot (field or parameter)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,

    #[serde(default)]
    pub flags: PropertyFlags,

    /// Fixed array dimension, 1 for scalars
    #[serde(default = "default_array_dim")]
    pub array_dim: u32,

    /// Byte offset inside the owning instance
    #[serde(default)]
    pub offset: usize,

    /// Notification function for replicated fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rep_notify: Option<String>,

    #[serde(rename = "type")]
    pub kind: FieldKind,
}

fn default_array_dim() -> u32 {
    1
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            flags: PropertyFlags::NONE,
            array_dim: 1,
            offset: 0,
            rep_notify: None,
            kind,
        }
    }

    pub fn with_flags(mut self, flags: PropertyFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn at(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_array_dim(mut self, dim: u32) -> Self {
        self.array_dim = dim;
        self
    }

    pub fn with_rep_notify(mut self, function: impl Into<String>) -> Self {
        self.rep_notify = Some(function.into());
        self
    }

    /// Parameter slot with `PARM` set in addition to `flags`
    pub fn param(name: impl Into<String>, kind: FieldKind, flags: PropertyFlags) -> Self {
        Self::new(name, kind).with_flags(flags | PropertyFlags::PARM)
    }

    /// Return slot
    pub fn return_value(kind: FieldKind) -> Self {
        Self::new("ReturnValue", kind)
            .with_flags(PropertyFlags::PARM | PropertyFlags::OUT_PARM | PropertyFlags::RETURN_PARM)
    }
}

/// Flavor of an object reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectRefKind {
    /// `UFoo*`
    #[default]
    Raw,
    /// `TObjectPtr<UFoo>`
    Ptr,
    Weak,
    Lazy,
    Soft,
}

/// Flavor of a class reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassRefKind {
    /// `UClass*` or `TSubclassOf<UFoo>`
    #[default]
    Raw,
    /// `TObjectPtr<UClass>`
    Ptr,
    /// `TSoftClassPtr<UFoo>`
    Soft,
}

/// Closed set of field kinds understood by the generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    Int8,
    Int16,
    Int32,
    Int64,
    #[serde(rename = "uint16")]
    UInt16,
    #[serde(rename = "uint32")]
    UInt32,
    #[serde(rename = "uint64")]
    UInt64,
    Float,
    Double,
    /// Byte, optionally backed by a legacy enum
    Byte {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        enum_type: Option<ObjectId>,
    },
    /// Scoped enum with an explicit underlying numeric field
    Enum {
        enum_type: Option<ObjectId>,
        underlying: Box<FieldDescriptor>,
    },
    /// Boolean, possibly sharing its storage byte with other booleans
    Bool {
        #[serde(default)]
        byte_offset: usize,
        #[serde(default = "full_byte_mask")]
        field_mask: u8,
    },
    Object {
        #[serde(default)]
        reference: ObjectRefKind,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        class: Option<ObjectId>,
    },
    Class {
        #[serde(default)]
        reference: ClassRefKind,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        meta_class: Option<ObjectId>,
    },
    Interface {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        interface: Option<ObjectId>,
    },
    Struct {
        struct_type: Option<ObjectId>,
    },
    Delegate {
        signature: Option<ObjectId>,
        #[serde(default)]
        multicast: bool,
    },
    /// Path to a reflected field of the given field class (`FProperty`, ...)
    FieldPath {
        field_class: String,
    },
    Name,
    Str,
    Text,
    Array {
        inner: Box<FieldDescriptor>,
    },
    Set {
        element: Box<FieldDescriptor>,
    },
    Map {
        key: Box<FieldDescriptor>,
        value: Box<FieldDescriptor>,
    },
    /// A field class the snapshot producer could not classify
    Unsupported {
        class_name: String,
    },
}

fn full_byte_mask() -> u8 {
    0xFF
}

impl FieldKind {
    /// `Bool` occupying a whole byte
    pub fn plain_bool() -> Self {
        FieldKind::Bool {
            byte_offset: 0,
            field_mask: 0xFF,
        }
    }

    /// `Bool` packed into one bit of its storage byte
    pub fn bitfield(byte_offset: usize, field_mask: u8) -> Self {
        FieldKind::Bool {
            byte_offset,
            field_mask,
        }
    }

    pub fn object(class: Option<ObjectId>) -> Self {
        FieldKind::Object {
            reference: ObjectRefKind::Raw,
            class,
        }
    }

    pub fn array_of(inner: FieldKind) -> Self {
        FieldKind::Array {
            inner: Box::new(FieldDescriptor::new("Inner", inner)),
        }
    }

    pub fn set_of(element: FieldKind) -> Self {
        FieldKind::Set {
            element: Box::new(FieldDescriptor::new("Element", element)),
        }
    }

    pub fn map_of(key: FieldKind, value: FieldKind) -> Self {
        FieldKind::Map {
            key: Box::new(FieldDescriptor::new("Key", key)),
            value: Box::new(FieldDescriptor::new("Value", value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delegate_function_is_type() {
        let sig = MethodDescriptor {
            flags: FunctionFlags::DELEGATE | FunctionFlags::MULTICAST_DELEGATE,
            ..Default::default()
        };
        let obj = ReflectedObject::new("OnHit__DelegateSignature", "/Script/Game", ObjectKind::Function(sig));
        assert!(matches!(obj.type_descriptor(), Some(TypeDescriptor::DelegateSignature(_))));

        let plain = ReflectedObject::new("Jump", "/Script/Game", ObjectKind::Function(MethodDescriptor::default()));
        assert!(plain.type_descriptor().is_none());
    }

    #[test]
    fn test_parameters_skip_return_slot() {
        let method = MethodDescriptor {
            flags: FunctionFlags::NATIVE,
            params: vec![
                FieldDescriptor::param("Amount", FieldKind::Float, PropertyFlags::NONE),
                FieldDescriptor::return_value(FieldKind::plain_bool()),
            ],
            sparse: false,
        };
        let names: Vec<_> = method.parameters().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Amount"]);
        assert_eq!(method.return_param().map(|p| p.name.as_str()), Some("ReturnValue"));
    }

    #[test]
    fn test_field_kind_json_shape() {
        let field = FieldDescriptor::new("Tags", FieldKind::array_of(FieldKind::Name));
        let json = serde_json::to_value(&field).unwrap();
        assert_eq!(json["type"]["kind"], "array");
        assert_eq!(json["type"]["inner"]["type"]["kind"], "name");
        assert_eq!(json["array_dim"], 1);
    }

    #[test]
    fn test_bool_mask_defaults_to_full_byte() {
        let kind: FieldKind = serde_json::from_str(r#"{"kind":"bool"}"#).unwrap();
        assert_eq!(kind, FieldKind::plain_bool());
    }

    #[test]
    fn test_enum_name_for_value() {
        let e = EnumDescriptor::new(EnumForm::EnumClass, [("EMode::Off", 0), ("EMode::On", 1)]);
        assert_eq!(e.name_for_value(1), Some("EMode::On"));
        assert_eq!(e.name_for_value(7), None);
    }
}
