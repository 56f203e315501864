//! Module build descriptors
//!
//! Every module that received files gets a `<Module>.Build.cs` listing its
//! dependencies and a registration source file.

use std::collections::BTreeSet;
use std::fmt::Write;
use std::path::PathBuf;

use crate::context::ModuleDependencySet;
use crate::file::OutputFile;

const INDENT: &str = "    ";

/// `<Module>/<Module>.Build.cs`
pub fn build_rules_file(module: &str, forced: &[String], modules: &ModuleDependencySet, modern_rules: bool) -> OutputFile {
    let mut dependencies: BTreeSet<String> = forced.iter().cloned().collect();
    dependencies.extend(modules.transitive(module));
    dependencies.remove(module);

    let mut out = String::new();
    out.push_str("using UnrealBuildTool;\n\n");
    let _ = writeln!(out, "public class {} : ModuleRules {{", module);
    let _ = writeln!(out, "{}public {}(ReadOnlyTargetRules Target) : base(Target) {{", INDENT, module);
    let body = INDENT.repeat(2);
    let _ = writeln!(out, "{}PCHUsage = PCHUsageMode.UseExplicitOrSharedPCHs;", body);
    if modern_rules {
        let _ = writeln!(out, "{}bLegacyPublicIncludePaths = false;", body);
        let _ = writeln!(out, "{}ShadowVariableWarningLevel = WarningLevel.Warning;", body);
    }
    out.push('\n');
    let _ = writeln!(out, "{}PublicDependencyModuleNames.AddRange(new string[] {{", body);
    for dependency in &dependencies {
        let _ = writeln!(out, "{}{}\"{}\",", body, INDENT, dependency);
    }
    let _ = writeln!(out, "{}}});", body);
    let _ = writeln!(out, "{}}}", INDENT);
    out.push_str("}\n");

    OutputFile {
        path: PathBuf::from(module).join(format!("{}.Build.cs", module)),
        contents: out,
    }
}

/// `<Module>/Private/<Module>Module.cpp`
pub fn module_source_file(module: &str, primary: Option<&str>) -> OutputFile {
    let mut out = String::new();
    out.push_str("#include \"Modules/ModuleManager.h\"\n\n");
    if primary == Some(module) {
        let _ = writeln!(
            out,
            "IMPLEMENT_PRIMARY_GAME_MODULE(FDefaultGameModuleImpl, {}, {});",
            module, module
        );
    } else {
        let _ = writeln!(out, "IMPLEMENT_MODULE(FDefaultGameModuleImpl, {});", module);
    }

    OutputFile {
        path: PathBuf::from(module)
            .join("Private")
            .join(format!("{}Module.cpp", module)),
        contents: out,
    }
}
