//! Delegate type declarations

use redecl_reflect::{FunctionFlags, ObjectId};

use super::{ReservedNames, Synthesizer};
use crate::context::RunContext;
use crate::error::{CodegenError, CodegenResult};
use crate::file::SourceFile;
use crate::names::native_delegate_name;
use crate::types::MapContext;

const MAX_DELEGATE_PARAMS: usize = 9;

/// Macro suffix for the parameter count
fn parameter_count_suffix(count: usize) -> &'static str {
    match count {
        0 => "",
        1 => "_OneParam",
        2 => "_TwoParams",
        3 => "_ThreeParams",
        4 => "_FourParams",
        5 => "_FiveParams",
        6 => "_SixParams",
        7 => "_SevenParams",
        8 => "_EightParams",
        _ => "_NineParams",
    }
}

impl Synthesizer<'_> {
    /// One `DECLARE_DYNAMIC..._DELEGATE...(...)` line.
    ///
    /// Only delegates declared directly in a package carry `UDELEGATE(...)`.
    pub(super) fn declare_delegate(
        &self,
        id: ObjectId,
        top_level: bool,
        file: &mut SourceFile,
        run: &mut RunContext,
    ) -> CodegenResult<()> {
        let object = self.graph.get(id)?;
        let method = object
            .as_function()
            .filter(|m| m.flags.contains(FunctionFlags::DELEGATE))
            .ok_or_else(|| CodegenError::MissingDelegateFlag {
                object: object.name.clone(),
            })?;

        let count = method.parameters().count();
        if count > MAX_DELEGATE_PARAMS {
            return Err(CodegenError::TooManyDelegateParameters {
                object: object.name.clone(),
                count,
            });
        }

        let type_name = native_delegate_name(self.graph, id);
        let annotation = if top_level {
            format!("UDELEGATE({}) ", self.function_annotations(object, method, false)?)
        } else {
            String::new()
        };

        let mut params = self.parameter_list(&type_name, method, &ReservedNames::default(), true, file, run)?;
        if count > 0 {
            params.insert_str(0, ", ");
        }

        let return_declaration = match method.return_param() {
            Some(ret) => {
                let mut ctx = MapContext::new(&type_name, &mut run.usage).with_file(file);
                format!("{}, ", self.mapper.map(ret, &mut ctx)?)
            }
            None => String::new(),
        };

        let flags = method.flags;
        file.append_line(&format!(
            "{}DECLARE_DYNAMIC{}{}_DELEGATE{}{}{}({}{}{});",
            annotation,
            if flags.contains(FunctionFlags::MULTICAST_DELEGATE) { "_MULTICAST" } else { "" },
            if method.sparse { "_SPARSE" } else { "" },
            if method.return_param().is_some() { "_RetVal" } else { "" },
            parameter_count_suffix(count),
            if flags.contains(FunctionFlags::CONST) { "_Const" } else { "" },
            return_declaration,
            type_name,
            params,
        ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_count_suffix() {
        assert_eq!(parameter_count_suffix(0), "");
        assert_eq!(parameter_count_suffix(2), "_TwoParams");
        assert_eq!(parameter_count_suffix(9), "_NineParams");
    }
}
