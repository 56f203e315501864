//! Reflection graph model
//!
//! Read-only descriptors of reflected classes, interfaces, aggregates,
//! enumerations and delegate signatures, as consumed by the declaration
//! generator in `redecl-codegen`.

pub mod descriptor;
pub mod error;
pub mod flags;
pub mod graph;
pub mod instance;

pub use descriptor::{
    ClassDescriptor, ClassRefKind, EnumDescriptor, EnumEntry, EnumForm, FieldDescriptor, FieldKind,
    MethodDescriptor, ObjectId, ObjectKind, ObjectRefKind, ReflectedObject, StructDescriptor,
    TypeDescriptor,
};
pub use error::{ReflectError, ReflectResult};
pub use flags::{
    merge_inherited, own_bits, ClassFlags, EnumFlags, FlagSet, FunctionFlags, ObjectFlags,
    PropertyFlags, StructFlags,
};
pub use graph::{ReflectionGraph, Snapshot, SCRIPT_PACKAGE_PREFIX};
pub use instance::{InstanceData, ManagedSlot, ManagedValue};
