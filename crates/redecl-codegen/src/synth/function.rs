//! Method declarations, parameter lists and stub definitions

use redecl_reflect::{FieldDescriptor, FieldKind, FunctionFlags, MethodDescriptor, ObjectId, PropertyFlags, ReflectedObject};

use super::{ReservedNames, Synthesizer};
use crate::context::RunContext;
use crate::error::{CodegenError, CodegenResult};
use crate::file::{FileRole, SourceFile};
use crate::names::{capitalize, native_class_name};
use crate::types::MapContext;

/// How a method is being declared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum FunctionMode {
    /// Ordinary member of a class
    Member,
    /// Member of an interface contract; non-event methods become pure virtual
    InterfaceMember,
    /// Interface method a class must override to stay instantiable
    Override,
}

impl Synthesizer<'_> {
    fn method_of<'o>(&self, object: &'o ReflectedObject) -> CodegenResult<&'o MethodDescriptor> {
        object.as_function().ok_or_else(|| CodegenError::UnsupportedObject {
            object: object.name.clone(),
            kind: "non-function member".to_string(),
        })
    }

    /// Comma-separated parameter list.
    ///
    /// Declaration files carry `UPARAM(...)`; delegate lists put a comma
    /// between each type and its name.
    pub(super) fn parameter_list(
        &self,
        owner: &str,
        method: &MethodDescriptor,
        reserved: &ReservedNames,
        delegate: bool,
        file: &mut SourceFile,
        run: &mut RunContext,
    ) -> CodegenResult<String> {
        let declaration = file.role() == FileRole::Declaration;
        let mut params = Vec::new();

        for param in method.parameters() {
            let mut text = String::new();
            if declaration {
                let annotations = self.parameter_annotations(param)?;
                if !annotations.is_empty() {
                    text.push_str(&format!("UPARAM({}) ", annotations));
                }
            }

            let by_ref = param
                .flags
                .intersects(PropertyFlags::REFERENCE_PARM | PropertyFlags::OUT_PARM);
            let forced_const_ref = !by_ref && matches!(param.kind, FieldKind::Str);
            if param.flags.contains(PropertyFlags::CONST_PARM) || forced_const_ref {
                text.push_str("const ");
            }

            {
                let mut ctx = MapContext::new(owner, &mut run.usage).with_file(file);
                text.push_str(&self.mapper.map(param, &mut ctx)?);
            }
            if by_ref || forced_const_ref {
                text.push('&');
            }
            if delegate {
                text.push(',');
            }
            text.push(' ');
            text.push_str(&parameter_name(param, reserved));
            params.push(text);
        }
        Ok(params.join(", "))
    }

    fn return_type(&self, owner: &str, method: &MethodDescriptor, file: &mut SourceFile, run: &mut RunContext) -> CodegenResult<String> {
        match method.return_param() {
            Some(ret) => {
                let mut ctx = MapContext::new(owner, &mut run.usage).with_file(file);
                self.mapper.map(ret, &mut ctx)
            }
            None => Ok("void".to_string()),
        }
    }

    /// `UFUNCTION(...)` plus the method declaration
    pub(super) fn declare_function(
        &self,
        owner: &str,
        function: ObjectId,
        mode: FunctionMode,
        reserved: &ReservedNames,
        file: &mut SourceFile,
        run: &mut RunContext,
    ) -> CodegenResult<()> {
        let object = self.graph.get(function)?;
        let method = self.method_of(object)?;
        let flags = method.flags;

        let mut pure_virtual = mode == FunctionMode::Override;
        let modifier = if flags.contains(FunctionFlags::STATIC) {
            "static "
        } else if !flags.contains(FunctionFlags::BLUEPRINT_EVENT) && mode == FunctionMode::InterfaceMember {
            pure_virtual = true;
            "virtual "
        } else {
            ""
        };

        let return_type = self.return_type(owner, method, file, run)?;

        let mut postfix = String::new();
        if flags.contains(FunctionFlags::CONST) {
            postfix.push_str(" const");
        }
        if pure_virtual {
            let return_statement = match method.return_param() {
                Some(ret) => format!(" return {};", self.defaults.zero_value(ret, owner, file, run)?),
                None => String::new(),
            };
            if mode == FunctionMode::Override {
                postfix.push_str(" override");
            }
            postfix.push_str(&format!(" PURE_VIRTUAL({},{})", object.name, return_statement));
        }

        let params = self.parameter_list(owner, method, reserved, false, file, run)?;
        let annotations = self.function_annotations(object, method, pure_virtual)?;

        file.append_line(&format!("UFUNCTION({})", annotations));
        file.append_line(&format!(
            "{}{} {}({}){};",
            modifier, return_type, object.name, params, postfix
        ));
        file.blank_line();
        Ok(())
    }

    /// Stub bodies for a class method; returns whether anything was written
    pub(super) fn define_function(
        &self,
        class: ObjectId,
        function: ObjectId,
        reserved: &ReservedNames,
        file: &mut SourceFile,
        run: &mut RunContext,
    ) -> CodegenResult<bool> {
        let owner = self.graph.get(class)?.name.clone();
        let class_name = native_class_name(self.graph, class, false);
        let object = self.graph.get(function)?;
        let method = self.method_of(object)?;
        let flags = method.flags;

        let (implementation, validation) = if flags.contains(FunctionFlags::NET) {
            let validation = flags
                .contains(FunctionFlags::NET_VALIDATE)
                .then(|| format!("{}::{}_Validate", class_name, object.name));
            (Some(format!("{}::{}_Implementation", class_name, object.name)), validation)
        } else if flags.contains(FunctionFlags::BLUEPRINT_EVENT) {
            let implementation = flags
                .contains(FunctionFlags::NATIVE)
                .then(|| format!("{}::{}_Implementation", class_name, object.name));
            (implementation, None)
        } else {
            (Some(format!("{}::{}", class_name, object.name)), None)
        };

        if implementation.is_none() && validation.is_none() {
            return Ok(false);
        }
        let params = self.parameter_list(&owner, method, reserved, false, file, run)?;

        if let Some(implementation) = implementation {
            let return_type = self.return_type(&owner, method, file, run)?;
            let constness = if flags.contains(FunctionFlags::CONST) { " const" } else { "" };
            file.append_line(&format!("{} {}({}){} {{", return_type, implementation, params, constness));
            file.begin_indent();
            if let Some(ret) = method.return_param() {
                let value = self.defaults.zero_value(ret, &owner, file, run)?;
                file.append_line(&format!("return {};", value));
            }
            file.end_indent();
            file.append_line("}");
        }

        if let Some(validation) = validation {
            file.append_line(&format!("bool {}({}) {{", validation, params));
            file.begin_indent();
            file.append_line("return true;");
            file.end_indent();
            file.append_line("}");
        }
        Ok(true)
    }
}

/// Parameter name, renamed when it would shadow a member
fn parameter_name(param: &FieldDescriptor, reserved: &ReservedNames) -> String {
    if reserved.contains(&param.name) {
        format!("New{}", capitalize(&param.name))
    } else {
        param.name.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shadowing_parameter_is_renamed() {
        let mut reserved = ReservedNames::default();
        reserved.insert("health");
        let param = FieldDescriptor::param("Health", FieldKind::Float, PropertyFlags::NONE);
        assert_eq!(parameter_name(&param, &reserved), "NewHealth");

        let free = FieldDescriptor::param("amount", FieldKind::Float, PropertyFlags::NONE);
        assert_eq!(parameter_name(&free, &reserved), "amount");
    }
}
