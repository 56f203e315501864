//! Default values
//!
//! Turns the bytes of a default instance into initializer statements for a
//! synthesized constructor, and produces the zero value of a type for
//! default-returning stub bodies.

use std::fmt::Write;

use redecl_reflect::{
    ClassFlags, ClassRefKind, EnumForm, FieldDescriptor, FieldKind, InstanceData, ObjectFlags, ObjectId,
    ObjectKind, ObjectRefKind, ReflectionGraph,
};

use crate::context::RunContext;
use crate::deps::DependencyLevel;
use crate::error::{CodegenError, CodegenResult};
use crate::file::SourceFile;
use crate::names::{native_class_name, native_enum_name, native_struct_name, sanitize_enum_entry};
use crate::types::{MapContext, TypeMapper};

/// Receiver prefix of constructor assignments
pub const THIS_SCOPE: &str = "this->";

/// Wrap `text` in a `TEXT("...")` literal.
///
/// Characters outside printable ASCII become UTF-16 `\xXXXX` escapes. When
/// an escape is followed by a hex digit the literal is closed and reopened
/// so the digit cannot extend the escape.
pub fn string_literal(text: &str) -> String {
    let mut out = String::from("TEXT(\"");
    let mut after_hex = false;

    for ch in text.chars() {
        let escaped = match ch {
            '\n' => Some("\\n"),
            '\r' => Some("\\r"),
            '\t' => Some("\\t"),
            '\\' => Some("\\\\"),
            '"' => Some("\\\""),
            _ => None,
        };
        if let Some(escaped) = escaped {
            out.push_str(escaped);
            after_hex = false;
            continue;
        }

        let code = ch as u32;
        if code < 0x20 || code >= 0x7F {
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                let _ = write!(out, "\\x{:04X}", unit);
            }
            after_hex = true;
        } else {
            if after_hex && ch.is_ascii_hexdigit() {
                out.push_str("\")TEXT(\"");
            }
            after_hex = false;
            out.push(ch);
        }
    }

    out.push_str("\")");
    out
}

/// Symbolic name of `value` in `enum_id`, qualified unless the enum is a
/// plain unscoped enum
pub fn enum_value_name(graph: &dyn ReflectionGraph, enum_id: ObjectId, value: i64) -> Option<String> {
    let object = graph.object(enum_id)?;
    let descriptor = object.as_enum()?;
    let entry = sanitize_enum_entry(descriptor.name_for_value(value)?);
    match descriptor.form {
        EnumForm::Regular => Some(entry.to_string()),
        EnumForm::Namespaced | EnumForm::EnumClass => Some(format!("{}::{}", object.name, entry)),
    }
}

/// Byte width of an integer kind backing an enum
fn integer_width(kind: &FieldKind) -> usize {
    match kind {
        FieldKind::Int8 | FieldKind::Byte { .. } => 1,
        FieldKind::Int16 | FieldKind::UInt16 => 2,
        FieldKind::Int64 | FieldKind::UInt64 => 8,
        _ => 4,
    }
}

/// Default value reader
pub struct DefaultSerializer<'g> {
    graph: &'g dyn ReflectionGraph,
    mapper: TypeMapper<'g>,
}

impl<'g> DefaultSerializer<'g> {
    pub fn new(graph: &'g dyn ReflectionGraph) -> Self {
        Self {
            graph,
            mapper: TypeMapper::new(graph),
        }
    }

    /// Enum literal for `value`, falling back to a cast with a diagnostic
    fn enum_literal(&self, enum_id: ObjectId, value: i64, owner: &str, member: &str, run: &mut RunContext) -> String {
        match enum_value_name(self.graph, enum_id, value) {
            Some(name) => name,
            None => {
                let enum_name = native_enum_name(self.graph, enum_id, false);
                run.diagnose(
                    owner,
                    Some(member),
                    format!("value {} has no name in enum '{}', casting instead", value, enum_name),
                );
                format!("({}){}", enum_name, value)
            }
        }
    }

    fn first_enum_value(&self, enum_id: ObjectId) -> i64 {
        self.graph
            .object(enum_id)
            .and_then(|o| o.as_enum())
            .and_then(|e| e.entries.first())
            .map(|entry| entry.value)
            .unwrap_or(0)
    }

    /// Zero value of the field's type, e.g. for `return ...;` in stub bodies
    pub fn zero_value(
        &self,
        field: &FieldDescriptor,
        owner: &str,
        file: &mut SourceFile,
        run: &mut RunContext,
    ) -> CodegenResult<String> {
        let value = match &field.kind {
            FieldKind::Byte { enum_type: None } => "0".to_string(),
            FieldKind::Byte {
                enum_type: Some(enum_id),
            }
            | FieldKind::Enum {
                enum_type: Some(enum_id),
                ..
            } => {
                let first = self.first_enum_value(*enum_id);
                self.enum_literal(*enum_id, first, owner, &field.name, run)
            }
            FieldKind::Enum { enum_type: None, .. } => {
                return Err(CodegenError::NullEnumType {
                    object: owner.to_string(),
                    member: field.name.clone(),
                });
            }
            FieldKind::Bool { .. } => "false".to_string(),
            FieldKind::Int8
            | FieldKind::Int16
            | FieldKind::Int32
            | FieldKind::Int64
            | FieldKind::UInt16
            | FieldKind::UInt32
            | FieldKind::UInt64 => "0".to_string(),
            FieldKind::Float => "0.0f".to_string(),
            FieldKind::Double => "0.0".to_string(),
            FieldKind::Object { .. } | FieldKind::Class { .. } | FieldKind::Interface { .. } => "NULL".to_string(),
            FieldKind::Struct { struct_type: None } => {
                return Err(CodegenError::NullStructType {
                    object: owner.to_string(),
                    member: field.name.clone(),
                });
            }
            FieldKind::Struct {
                struct_type: Some(id),
            } => format!("{}{{}}", native_struct_name(self.graph, *id)),
            FieldKind::FieldPath { .. } => "FFieldPath()".to_string(),
            FieldKind::Delegate { .. } | FieldKind::Array { .. } | FieldKind::Set { .. } | FieldKind::Map { .. } => {
                let mut ctx = MapContext::new(owner, &mut run.usage).with_file(file);
                format!("{}()", self.mapper.map(field, &mut ctx)?)
            }
            FieldKind::Name => "NAME_None".to_string(),
            FieldKind::Str => "TEXT(\"\")".to_string(),
            FieldKind::Text => "FText::GetEmpty()".to_string(),
            FieldKind::Unsupported { class_name } => {
                return Err(CodegenError::UnsupportedFieldKind {
                    object: owner.to_string(),
                    member: field.name.clone(),
                    kind: class_name.clone(),
                });
            }
        };
        Ok(value)
    }

    /// Append the constructor statements restoring `field` from `instance`
    pub fn write_field_value(
        &self,
        field: &FieldDescriptor,
        instance: &InstanceData,
        owner: &str,
        file: &mut SourceFile,
        run: &mut RunContext,
    ) -> CodegenResult<()> {
        let offset = field.offset;
        let value = match &field.kind {
            FieldKind::Byte { enum_type } => {
                let raw = instance.read_u8(offset)?;
                match enum_type {
                    Some(enum_id) => self.enum_literal(*enum_id, i64::from(raw), owner, &field.name, run),
                    None => raw.to_string(),
                }
            }
            FieldKind::Enum {
                enum_type,
                underlying,
            } => {
                let enum_id = enum_type.ok_or_else(|| CodegenError::NullEnumType {
                    object: owner.to_string(),
                    member: field.name.clone(),
                })?;
                file.add_dependency(enum_id, DependencyLevel::FullInclusion);
                let raw = instance.read_signed(offset, integer_width(&underlying.kind))?;
                self.enum_literal(enum_id, raw, owner, &field.name, run)
            }
            FieldKind::Bool {
                byte_offset,
                field_mask,
            } => {
                let byte = instance.read_u8(offset + byte_offset)?;
                ((byte & field_mask) != 0).to_string()
            }
            FieldKind::Int8 => instance.read_signed(offset, 1)?.to_string(),
            FieldKind::Int16 => instance.read_signed(offset, 2)?.to_string(),
            FieldKind::Int32 => instance.read_signed(offset, 4)?.to_string(),
            FieldKind::Int64 => instance.read_signed(offset, 8)?.to_string(),
            FieldKind::UInt16 => instance.read_unsigned(offset, 2)?.to_string(),
            FieldKind::UInt32 => instance.read_unsigned(offset, 4)?.to_string(),
            FieldKind::UInt64 => instance.read_unsigned(offset, 8)?.to_string(),
            FieldKind::Float => {
                let value = instance.read_f32(offset)?;
                if !value.is_finite() {
                    run.diagnose(owner, Some(&field.name), format!("non-finite default {} skipped", value));
                    return Ok(());
                }
                format!("{:.2}f", value)
            }
            FieldKind::Double => {
                let value = instance.read_f64(offset)?;
                if !value.is_finite() {
                    run.diagnose(owner, Some(&field.name), format!("non-finite default {} skipped", value));
                    return Ok(());
                }
                format!("{:.2}", value)
            }
            FieldKind::Name => {
                let name = instance.string_at(offset);
                if name.is_empty() || name == "None" {
                    return Ok(());
                }
                string_literal(name)
            }
            FieldKind::Str => {
                let text = instance.string_at(offset);
                if text.is_empty() {
                    return Ok(());
                }
                string_literal(text)
            }
            FieldKind::Text => {
                let text = instance.string_at(offset);
                if text.is_empty() {
                    return Ok(());
                }
                format!("FText::FromString({})", string_literal(text))
            }
            FieldKind::Object {
                reference: ObjectRefKind::Raw | ObjectRefKind::Ptr,
                ..
            } => match self.object_value(instance.object_at(offset), owner, &field.name, file, run) {
                Some(value) => value,
                None => return Ok(()),
            },
            FieldKind::Class {
                reference: ClassRefKind::Raw | ClassRefKind::Ptr,
                ..
            } => match self.class_value(instance.object_at(offset), owner, &field.name, file, run) {
                Some(value) => value,
                None => return Ok(()),
            },
            FieldKind::Array { .. } => {
                let count = instance.count_at(offset);
                if count > 0 {
                    file.append_line(&format!("{}{}.AddDefaulted({});", THIS_SCOPE, field.name, count));
                }
                return Ok(());
            }
            FieldKind::Set { .. } | FieldKind::Map { .. } => {
                let count = instance.count_at(offset);
                if count > 0 {
                    file.append_line(&format!("{}{}.Reserve({});", THIS_SCOPE, field.name, count));
                }
                return Ok(());
            }
            // Element-wise reconstruction is not attempted for these
            FieldKind::Object { .. }
            | FieldKind::Class { .. }
            | FieldKind::Interface { .. }
            | FieldKind::Struct { .. }
            | FieldKind::Delegate { .. }
            | FieldKind::FieldPath { .. } => return Ok(()),
            FieldKind::Unsupported { class_name } => {
                return Err(CodegenError::UnsupportedFieldKind {
                    object: owner.to_string(),
                    member: field.name.clone(),
                    kind: class_name.clone(),
                });
            }
        };

        write_assignment(file, field, &value);
        Ok(())
    }

    /// Initializer of an object reference, or `None` when it cannot be
    /// expressed
    fn object_value(
        &self,
        target: Option<ObjectId>,
        owner: &str,
        member: &str,
        file: &mut SourceFile,
        run: &mut RunContext,
    ) -> Option<String> {
        let Some(target) = target else {
            return Some("NULL".to_string());
        };
        let Some(object) = self.graph.object(target) else {
            run.diagnose(owner, Some(member), format!("default references unknown object {}", target));
            return None;
        };

        if object.object_flags.contains(ObjectFlags::DEFAULT_SUB_OBJECT) {
            if let ObjectKind::Instance { class: Some(class) } = object.kind {
                file.add_dependency(class, DependencyLevel::FullInclusion);
                return Some(format!(
                    "CreateDefaultSubobject<{}>(TEXT(\"{}\"))",
                    native_class_name(self.graph, class, false),
                    object.name
                ));
            }
        }
        if object.is_class() {
            file.add_dependency(target, DependencyLevel::FullInclusion);
            return Some(format!("{}::StaticClass()", native_class_name(self.graph, target, false)));
        }

        run.diagnose(
            owner,
            Some(member),
            format!("unhandled default object reference '{}{}'", object.package, object.name),
        );
        None
    }

    fn class_value(
        &self,
        target: Option<ObjectId>,
        owner: &str,
        member: &str,
        file: &mut SourceFile,
        run: &mut RunContext,
    ) -> Option<String> {
        let Some(target) = target else {
            return Some("NULL".to_string());
        };
        let native = self
            .graph
            .object(target)
            .and_then(|o| o.as_class())
            .map(|c| c.flags.contains(ClassFlags::NATIVE))
            .unwrap_or(false);
        if !native {
            run.diagnose(owner, Some(member), format!("default references non-native class {}", target));
            return None;
        }
        file.add_dependency(target, DependencyLevel::FullInclusion);
        Some(format!("{}::StaticClass()", native_class_name(self.graph, target, false)))
    }
}

/// `this->X = v;`, or one assignment per element of a fixed array
fn write_assignment(file: &mut SourceFile, field: &FieldDescriptor, value: &str) {
    if field.array_dim == 1 {
        file.append_line(&format!("{}{} = {};", THIS_SCOPE, field.name, value));
    } else {
        for index in 0..field.array_dim {
            file.append_line(&format!("{}{}[{}] = {};", THIS_SCOPE, field.name, index, value));
        }
    }
}
