//! Output file buffers
//!
//! A [`SourceFile`] collects body lines plus the dependencies registered
//! while the body was generated. Includes and forward declarations are
//! rendered only at the end of the dump, once every output name is known.

use std::collections::BTreeSet;
use std::fmt::Write;
use std::path::PathBuf;

use redecl_reflect::{ObjectId, ObjectKind, ReflectionGraph};

use crate::deps::{DependencyLevel, DependencySet};
use crate::error::{CodegenError, CodegenResult};
use crate::names::{header_base_name, native_class_name, native_struct_name, NameRegistry};

const INDENT: &str = "    ";

/// Which half of an object's output this file is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileRole {
    /// `<Module>/Public/<Name>.h`
    Declaration,
    /// `<Module>/Private/<Name>.cpp`
    Definition,
}

/// Text buffer of one output file
#[derive(Debug, Clone)]
pub struct SourceFile {
    object: ObjectId,
    module: String,
    base_name: String,
    role: FileRole,
    body: String,
    indent: usize,
    extra_includes: BTreeSet<String>,
    dependencies: DependencySet,
}

/// A fully rendered file, relative to the output root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    pub path: PathBuf,
    pub contents: String,
}

/// Shared state consulted while rendering includes
pub struct RenderEnv<'a> {
    pub graph: &'a dyn ReflectionGraph,
    pub names: &'a NameRegistry,
    /// Receives every other module this file references
    pub referenced_modules: &'a mut BTreeSet<String>,
}

impl SourceFile {
    pub fn new(object: ObjectId, module: impl Into<String>, base_name: impl Into<String>, role: FileRole) -> Self {
        Self {
            object,
            module: module.into(),
            base_name: base_name.into(),
            role,
            body: String::new(),
            indent: 0,
            extra_includes: BTreeSet::new(),
            dependencies: DependencySet::new(),
        }
    }

    pub fn object(&self) -> ObjectId {
        self.object
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    pub fn role(&self) -> FileRole {
        self.role
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn dependencies(&self) -> &DependencySet {
        &self.dependencies
    }

    pub fn has_content(&self) -> bool {
        !self.body.is_empty()
    }

    /// Path relative to the output root
    pub fn relative_path(&self) -> PathBuf {
        match self.role {
            FileRole::Declaration => PathBuf::from(&self.module)
                .join("Public")
                .join(format!("{}.h", self.base_name)),
            FileRole::Definition => PathBuf::from(&self.module)
                .join("Private")
                .join(format!("{}.cpp", self.base_name)),
        }
    }

    // ── Body ────────────────────────────────────────────────────────

    pub fn append_line(&mut self, line: &str) {
        for _ in 0..self.indent {
            self.body.push_str(INDENT);
        }
        self.body.push_str(line);
        self.body.push('\n');
    }

    pub fn append_line_no_indent(&mut self, line: &str) {
        self.body.push_str(line);
        self.body.push('\n');
    }

    pub fn blank_line(&mut self) {
        self.body.push('\n');
    }

    pub fn begin_indent(&mut self) {
        self.indent += 1;
    }

    pub fn end_indent(&mut self) {
        debug_assert!(self.indent > 0, "unbalanced indent in {}", self.base_name);
        self.indent = self.indent.saturating_sub(1);
    }

    // ── Dependencies ────────────────────────────────────────────────

    pub fn add_extra_include(&mut self, path: impl Into<String>) {
        self.extra_includes.insert(path.into());
    }

    pub fn add_dependency(&mut self, object: ObjectId, level: DependencyLevel) {
        self.dependencies.register(object, level);
    }

    /// Promote every forward declaration of `declaration` to a full inclusion
    pub fn complete_forward_declarations(&mut self, declaration: &SourceFile) {
        for id in declaration
            .dependencies
            .with_level(DependencyLevel::ForwardDeclaration)
        {
            self.dependencies.register(id, DependencyLevel::FullInclusion);
        }
    }

    // ── Rendering ───────────────────────────────────────────────────

    /// Render the complete file.
    ///
    /// `declaration` is the matching declaration file of a definition file;
    /// includes it already promises are not repeated.
    pub fn render(&self, env: &mut RenderEnv<'_>, declaration: Option<&SourceFile>) -> CodegenResult<String> {
        let mut out = String::new();
        self.render_includes(&mut out, env, declaration)?;
        out.push('\n');

        let forward = self.render_forward_declarations(env)?;
        if !forward.is_empty() {
            out.push_str(&forward);
            out.push('\n');
        }

        if !self.body.is_empty() {
            out.push_str(&self.body);
            out.push('\n');
        }
        Ok(out)
    }

    fn render_includes(&self, out: &mut String, env: &mut RenderEnv<'_>, declaration: Option<&SourceFile>) -> CodegenResult<()> {
        match (self.role, declaration) {
            (FileRole::Declaration, _) => {
                out.push_str("#pragma once\n");
                out.push_str("#include \"CoreMinimal.h\"\n");
            }
            (FileRole::Definition, Some(header)) => {
                let _ = writeln!(out, "#include \"{}.h\"", header.base_name);
            }
            (FileRole::Definition, None) => out.push_str("#include \"CoreMinimal.h\"\n"),
        }

        for include in &self.extra_includes {
            let _ = writeln!(out, "#include \"{}\"", include);
        }

        for id in self.dependencies.with_level(DependencyLevel::FullInclusion) {
            let (base, owner) = header_base_name(env.graph, id)?;
            let header_name = env.names.existing(&base, owner);
            if header_name == self.base_name {
                continue;
            }
            if let Some(header) = declaration {
                if header.dependencies.level(id) == DependencyLevel::FullInclusion {
                    continue;
                }
            }

            let module = env.graph.module_name(id);
            if module.is_empty() {
                continue;
            }
            if module == self.module {
                let _ = writeln!(out, "#include \"{}.h\"", header_name);
            } else {
                let top = env.graph.top_level(id);
                let object_name = env.graph.get(top)?.name.clone();
                let _ = writeln!(
                    out,
                    "//CROSS-MODULE INCLUDE V2: -ModuleName={} -ObjectName={} -FallbackName={}",
                    module, object_name, header_name
                );
                env.referenced_modules.insert(module);
            }
        }

        if self.role == FileRole::Declaration {
            let _ = writeln!(out, "#include \"{}.generated.h\"", self.base_name);
        }
        Ok(())
    }

    fn render_forward_declarations(&self, env: &mut RenderEnv<'_>) -> CodegenResult<String> {
        let mut out = String::new();
        for id in self
            .dependencies
            .with_level(DependencyLevel::ForwardDeclaration)
        {
            let module = env.graph.module_name(id);
            if !module.is_empty() && module != self.module {
                env.referenced_modules.insert(module);
            }

            let object = env.graph.get(id)?;
            match &object.kind {
                ObjectKind::Class(_) => {
                    let _ = writeln!(out, "class {};", native_class_name(env.graph, id, false));
                }
                ObjectKind::Interface(_) => {
                    let _ = writeln!(out, "class {};", native_class_name(env.graph, id, false));
                    let _ = writeln!(out, "class {};", native_class_name(env.graph, id, true));
                }
                ObjectKind::Struct(_) => {
                    let _ = writeln!(out, "struct {};", native_struct_name(env.graph, id));
                }
                ObjectKind::Enum(_) | ObjectKind::Function(_) | ObjectKind::Instance { .. } => {
                    return Err(CodegenError::UnsupportedPreDeclaration {
                        object: object.name.clone(),
                    });
                }
            }
        }
        Ok(out)
    }
}
