//! Class declarations and their constructor definitions

use rustc_hash::FxHashSet;

use redecl_reflect::{ClassDescriptor, ClassFlags, FunctionFlags, ObjectId, PropertyFlags, ReflectedObject};

use super::function::FunctionMode;
use super::{is_delegate_signature, ReservedNames, Synthesizer};
use crate::access::{AccessCursor, AccessLevel};
use crate::context::RunContext;
use crate::deps::DependencyLevel;
use crate::error::CodegenResult;
use crate::file::SourceFile;
use crate::names::{api_macro, native_class_name};

/// Root every class derives from when it has no parent
const ROOT_BASE_CLASS: &str = "UObjectBaseUtility";

const REPLICATION_INCLUDE: &str = "Net/UnrealNetwork.h";

/// Parents whose only constructor takes an object initializer
const OBJECT_INITIALIZER_PARENTS: &[&str] = &[
    "UUserWidget",
    "UMovieSceneTrack",
    "APlayerStart",
    "URichTextBlock",
    "URichTextBlockImageDecorator",
    "URichTextBlockDecorator",
];

impl Synthesizer<'_> {
    /// Non-delegate methods of a class or interface, in declaration order
    pub(super) fn methods<'c>(&'c self, functions: &'c [ObjectId]) -> impl Iterator<Item = (ObjectId, &'c ReflectedObject)> + 'c {
        functions.iter().filter_map(move |id| {
            self.graph
                .object(*id)
                .filter(|object| !is_delegate_signature(object))
                .map(|object| (*id, object))
        })
    }

    pub(super) fn declare_class(
        &self,
        id: ObjectId,
        class: &ClassDescriptor,
        file: &mut SourceFile,
        run: &mut RunContext,
    ) -> CodegenResult<()> {
        let owner = self.graph.get(id)?.name.clone();
        let native_name = native_class_name(self.graph, id, false);
        let annotations = self.class_annotations(id, class)?;

        let api = if class.flags.contains(ClassFlags::REQUIRED_API) {
            format!("{} ", api_macro(file.module()))
        } else {
            String::new()
        };

        let parent = match class.super_class {
            Some(super_class) => {
                file.add_dependency(super_class, DependencyLevel::FullInclusion);
                native_class_name(self.graph, super_class, false)
            }
            None => ROOT_BASE_CLASS.to_string(),
        };

        let mut interface_list = String::new();
        for interface in &class.interfaces {
            file.add_dependency(*interface, DependencyLevel::FullInclusion);
            interface_list.push_str(&format!(", public {}", native_class_name(self.graph, *interface, true)));
        }

        file.append_line(&format!("UCLASS({})", annotations));
        file.append_line(&format!("class {}{} : public {}{} {{", api, native_name, parent, interface_list));
        file.begin_indent();
        file.append_line("GENERATED_BODY()");

        let mut cursor = AccessCursor::new();
        cursor.enter(AccessLevel::Public, file);

        self.declare_nested_delegates(&class.functions, file, run)?;

        for field in &class.fields {
            let access = self.field_access(&owner, field, run);
            cursor.enter(access, file);
            self.declare_field(&owner, field, file, run)?;
        }

        cursor.enter(AccessLevel::Public, file);
        file.append_line(&format!("{}();", native_name));
        if Self::has_replicated_fields(&class.fields) {
            file.append_line(
                "virtual void GetLifetimeReplicatedProps(TArray<FLifetimeProperty>& OutLifetimeProps) const override;",
            );
            file.blank_line();
        }

        let reserved = ReservedNames::for_type(self.graph, id, true);
        let mut implemented = FxHashSet::default();
        for (function, object) in self.methods(&class.functions) {
            let flags = object.as_function().map(|m| m.flags).unwrap_or_default();
            let access = self.function_access(&owner, object, flags, run);
            cursor.enter(access, file);
            self.declare_function(&owner, function, FunctionMode::Member, &reserved, file, run)?;
            implemented.insert(object.name.as_str());
        }

        if !class.interfaces.is_empty() {
            file.blank_line();
            file.append_line("// Fix for true pure virtual functions not being implemented");
        }
        for interface in &class.interfaces {
            let Some(contract) = self.graph.object(*interface).and_then(ReflectedObject::as_class) else {
                continue;
            };
            for (function, object) in self.methods(&contract.functions) {
                let flags = object.as_function().map(|m| m.flags).unwrap_or_default();
                if flags.contains(FunctionFlags::BLUEPRINT_EVENT) || implemented.contains(object.name.as_str()) {
                    continue;
                }
                let access = self.function_access(&owner, object, flags, run);
                cursor.enter(access, file);
                self.declare_function(&owner, function, FunctionMode::Override, &reserved, file, run)?;
            }
        }

        file.end_indent();
        file.append_line("};");
        Ok(())
    }

    /// Method stubs, replication registration and the default-restoring constructor
    pub(super) fn define_class(
        &self,
        id: ObjectId,
        class: &ClassDescriptor,
        file: &mut SourceFile,
        run: &mut RunContext,
    ) -> CodegenResult<()> {
        let owner = self.graph.get(id)?.name.clone();
        let native_name = native_class_name(self.graph, id, false);
        let reserved = ReservedNames::for_type(self.graph, id, true);

        for (function, _) in self.methods(&class.functions) {
            if self.define_function(id, function, &reserved, file, run)? {
                file.blank_line();
            }
        }

        if Self::has_replicated_fields(&class.fields) {
            file.add_extra_include(REPLICATION_INCLUDE);
            file.append_line(&format!(
                "void {}::GetLifetimeReplicatedProps(TArray<FLifetimeProperty>& OutLifetimeProps) const {{",
                native_name
            ));
            file.begin_indent();
            file.append_line("Super::GetLifetimeReplicatedProps(OutLifetimeProps);");
            file.blank_line();
            for field in class.fields.iter().filter(|f| f.flags.contains(PropertyFlags::NET)) {
                file.append_line(&format!("DOREPLIFETIME({}, {});", native_name, field.name));
            }
            file.end_indent();
            file.append_line("}");
            file.blank_line();
        }

        let parent = class
            .super_class
            .map(|s| native_class_name(self.graph, s, false))
            .unwrap_or_else(|| ROOT_BASE_CLASS.to_string());
        let chain = if OBJECT_INITIALIZER_PARENTS.contains(&parent.as_str()) {
            format!(" : {}(FObjectInitializer::Get())", parent)
        } else {
            String::new()
        };

        file.append_line(&format!("{}::{}(){} {{", native_name, native_name, chain));
        file.begin_indent();
        match &class.default_object {
            Some(defaults) => {
                for field in &class.fields {
                    self.defaults.write_field_value(field, defaults, &owner, file, run)?;
                }
            }
            None => file.append_line("// Null default object."),
        }
        file.end_indent();
        file.append_line("}");
        Ok(())
    }
}
