//! Aggregate declarations and their constructor definitions

use std::borrow::Cow;

use redecl_reflect::{FieldKind, InstanceData, ObjectId, StructDescriptor, StructFlags};

use super::Synthesizer;
use crate::access::{AccessCursor, AccessLevel};
use crate::context::RunContext;
use crate::deps::DependencyLevel;
use crate::error::CodegenResult;
use crate::file::SourceFile;
use crate::names::{api_macro, native_struct_name};

const MAX_SCALAR_WIDTH: usize = 8;

impl Synthesizer<'_> {
    pub(super) fn declare_struct(
        &self,
        id: ObjectId,
        aggregate: &StructDescriptor,
        file: &mut SourceFile,
        run: &mut RunContext,
    ) -> CodegenResult<()> {
        let owner = self.graph.get(id)?.name.clone();
        let native_name = native_struct_name(self.graph, id);
        let annotations = self.struct_annotations(id, aggregate, &run.usage)?;

        let api = format!("{} ", api_macro(file.module()));
        let exported = aggregate.flags.contains(StructFlags::REQUIRED_API);

        let parent = match aggregate.super_struct {
            Some(super_struct) => {
                file.add_dependency(super_struct, DependencyLevel::FullInclusion);
                format!(" : public {}", native_struct_name(self.graph, super_struct))
            }
            None => String::new(),
        };

        file.append_line(&format!("USTRUCT({})", annotations));
        file.append_line(&format!(
            "struct {}{}{} {{",
            if exported { api.as_str() } else { "" },
            native_name,
            parent
        ));
        file.begin_indent();
        file.append_line("GENERATED_BODY()");

        let mut cursor = AccessCursor::new();
        cursor.enter(AccessLevel::Public, file);

        for field in &aggregate.fields {
            let access = self.field_access(&owner, field, run);
            cursor.enter(access, file);
            self.declare_field(&owner, field, file, run)?;
        }

        cursor.enter(AccessLevel::Public, file);
        file.append_line(&format!(
            "{}{}();",
            if exported { "" } else { api.as_str() },
            native_name
        ));

        file.end_indent();
        file.append_line("};");
        Ok(())
    }

    /// Constructor restoring the default instance, or a zeroed one
    pub(super) fn define_struct(
        &self,
        id: ObjectId,
        aggregate: &StructDescriptor,
        file: &mut SourceFile,
        run: &mut RunContext,
    ) -> CodegenResult<()> {
        let owner = self.graph.get(id)?.name.clone();
        let native_name = native_struct_name(self.graph, id);

        let instance = match &aggregate.default_instance {
            Some(instance) => Cow::Borrowed(instance),
            None => Cow::Owned(InstanceData::zeroed(aggregate.size.max(field_extent(aggregate)))),
        };

        file.append_line(&format!("{}::{}() {{", native_name, native_name));
        file.begin_indent();
        for field in &aggregate.fields {
            self.defaults.write_field_value(field, &instance, &owner, file, run)?;
        }
        file.end_indent();
        file.append_line("}");
        Ok(())
    }
}

/// Bytes a zeroed instance needs so every scalar read stays in bounds
fn field_extent(aggregate: &StructDescriptor) -> usize {
    aggregate
        .fields
        .iter()
        .map(|f| {
            let extra = match f.kind {
                FieldKind::Bool { byte_offset, .. } => byte_offset,
                _ => 0,
            };
            f.offset + extra + MAX_SCALAR_WIDTH * f.array_dim.max(1) as usize
        })
        .max()
        .unwrap_or(0)
}
