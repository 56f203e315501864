//! Interface declarations
//!
//! An interface is declared twice: the reflected `U` class and its `I`
//! contract sibling that implementing classes derive from.

use redecl_reflect::{ClassDescriptor, ClassFlags, ObjectId};

use super::function::FunctionMode;
use super::{ReservedNames, Synthesizer};
use crate::access::{AccessCursor, AccessLevel};
use crate::context::RunContext;
use crate::deps::DependencyLevel;
use crate::error::CodegenResult;
use crate::file::SourceFile;
use crate::names::{api_macro, native_class_name};

impl Synthesizer<'_> {
    pub(super) fn declare_interface(
        &self,
        id: ObjectId,
        class: &ClassDescriptor,
        file: &mut SourceFile,
        run: &mut RunContext,
    ) -> CodegenResult<()> {
        let owner = self.graph.get(id)?.name.clone();
        let annotations = self.interface_annotations(id, class)?;

        let api = if class.flags.contains(ClassFlags::REQUIRED_API) {
            format!("{} ", api_macro(file.module()))
        } else {
            String::new()
        };

        let (parent_class, parent_contract) = match class.super_class {
            Some(super_class) => {
                file.add_dependency(super_class, DependencyLevel::FullInclusion);
                (
                    native_class_name(self.graph, super_class, false),
                    native_class_name(self.graph, super_class, true),
                )
            }
            None => ("UInterface".to_string(), "IInterface".to_string()),
        };

        file.append_line(&format!("UINTERFACE({})", annotations));
        file.append_line(&format!(
            "class {}{} : public {} {{",
            api,
            native_class_name(self.graph, id, false),
            parent_class
        ));
        file.begin_indent();
        file.append_line("GENERATED_BODY()");
        file.end_indent();
        file.append_line("};");
        file.blank_line();

        file.append_line(&format!(
            "class {}{} : public {} {{",
            api,
            native_class_name(self.graph, id, true),
            parent_contract
        ));
        file.begin_indent();
        file.append_line("GENERATED_BODY()");

        let mut cursor = AccessCursor::new();
        cursor.enter(AccessLevel::Public, file);

        self.declare_nested_delegates(&class.functions, file, run)?;

        let reserved = ReservedNames::for_type(self.graph, id, false);
        for (function, object) in self.methods(&class.functions) {
            let flags = object.as_function().map(|m| m.flags).unwrap_or_default();
            let access = self.function_access(&owner, object, flags, run);
            cursor.enter(access, file);
            self.declare_function(&owner, function, FunctionMode::InterfaceMember, &reserved, file, run)?;
        }

        file.end_indent();
        file.append_line("};");
        Ok(())
    }
}
