//! Dump driver
//!
//! Gathers eligible objects, synthesizes their files in a fixed category
//! order, then renders everything once all output names and type usage are
//! known. Nothing touches the filesystem until [`DumpOutput::write_to`].

use std::collections::BTreeSet;
use std::path::Path;

use rustc_hash::FxHashSet;
use tracing::{debug, info};

use redecl_reflect::{ClassFlags, ObjectId, ObjectKind, ReflectedObject, ReflectionGraph, StructFlags};

use crate::config::GeneratorConfig;
use crate::context::{Diagnostic, ModuleDependencySet, RunContext};
use crate::error::{CodegenError, CodegenResult};
use crate::file::{OutputFile, RenderEnv, SourceFile};
use crate::manifest::{build_rules_file, module_source_file};
use crate::names::{header_base_name, native_class_name, native_struct_name};
use crate::synth::{is_delegate_signature, ObjectFiles, Synthesizer};

/// Eligible objects by category, each in graph enumeration order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GatheredObjects {
    pub delegates: Vec<ObjectId>,
    pub classes: Vec<ObjectId>,
    pub structs: Vec<ObjectId>,
    pub enums: Vec<ObjectId>,
}

impl GatheredObjects {
    /// Processing order: delegates, classes and interfaces, structs, enums
    pub fn in_processing_order(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.delegates
            .iter()
            .chain(&self.classes)
            .chain(&self.structs)
            .chain(&self.enums)
            .copied()
    }

    pub fn len(&self) -> usize {
        self.delegates.len() + self.classes.len() + self.structs.len() + self.enums.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An eligible object and the file it will be written to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedObject {
    pub id: ObjectId,
    pub module: String,
    pub base_name: String,
}

/// Everything one dump produced
#[derive(Debug, Default)]
pub struct DumpOutput {
    pub files: Vec<OutputFile>,
    pub modules: ModuleDependencySet,
    pub diagnostics: Vec<Diagnostic>,
}

impl DumpOutput {
    /// Write every file below `root`, removing `root` first when `clean`
    pub fn write_to(&self, root: &Path, clean: bool) -> CodegenResult<usize> {
        let io_error = |path: &Path, source: std::io::Error| CodegenError::Io {
            path: path.display().to_string(),
            source,
        };

        if clean && root.exists() {
            info!(root = %root.display(), "removing previous output");
            std::fs::remove_dir_all(root).map_err(|e| io_error(root, e))?;
        }

        for file in &self.files {
            let path = root.join(&file.path);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
            }
            std::fs::write(&path, &file.contents).map_err(|e| io_error(&path, e))?;
        }
        info!(files = self.files.len(), root = %root.display(), "output written");
        Ok(self.files.len())
    }

    /// Rendered file at `path` relative to the output root
    pub fn file(&self, path: impl AsRef<Path>) -> Option<&OutputFile> {
        let path = path.as_ref();
        self.files.iter().find(|f| f.path == path)
    }
}

/// Runs a full dump over one reflection graph
pub struct Dumper<'a> {
    graph: &'a dyn ReflectionGraph,
    config: &'a GeneratorConfig,
    ignored: FxHashSet<String>,
    synthesizer: Synthesizer<'a>,
}

impl<'a> Dumper<'a> {
    pub fn new(graph: &'a dyn ReflectionGraph, config: &'a GeneratorConfig) -> Self {
        Self {
            graph,
            config,
            ignored: config.ignored_modules(),
            synthesizer: Synthesizer::new(graph, config),
        }
    }

    /// Module that would receive `id`, `None` for non-script or ignored packages
    pub fn module_for(&self, id: ObjectId) -> Option<String> {
        let module = self.graph.module_name(id);
        if module.is_empty() || self.ignored.contains(&module) {
            None
        } else {
            Some(module)
        }
    }

    /// Collect every eligible object
    pub fn gather(&self) -> GatheredObjects {
        let mut gathered = GatheredObjects::default();
        for id in self.graph.object_ids() {
            let Some(object) = self.graph.object(id) else {
                continue;
            };
            if self.module_for(id).is_none() {
                continue;
            }
            match &object.kind {
                ObjectKind::Class(class) | ObjectKind::Interface(class) if class.flags.contains(ClassFlags::NATIVE) => {
                    gathered.classes.push(id);
                }
                ObjectKind::Struct(aggregate) if aggregate.flags.contains(StructFlags::NATIVE) => {
                    gathered.structs.push(id);
                }
                ObjectKind::Enum(_) => gathered.enums.push(id),
                ObjectKind::Function(_) if object.outer.is_none() && is_delegate_signature(object) => {
                    gathered.delegates.push(id);
                }
                _ => {}
            }
        }
        info!(
            delegates = gathered.delegates.len(),
            classes = gathered.classes.len(),
            structs = gathered.structs.len(),
            enums = gathered.enums.len(),
            "gathered native objects"
        );
        gathered
    }

    /// Claim output names for every eligible object, in processing order
    pub fn plan(&self, run: &mut RunContext) -> CodegenResult<Vec<PlannedObject>> {
        let gathered = self.gather();
        let mut planned = Vec::with_capacity(gathered.len());
        for id in gathered.in_processing_order() {
            let Some(module) = self.module_for(id) else {
                continue;
            };
            let (base, owner) = header_base_name(self.graph, id)?;
            let base_name = run.names.claim(&base, owner);
            planned.push(PlannedObject { id, module, base_name });
        }
        Ok(planned)
    }

    /// Synthesize and render every file of the dump
    pub fn generate(&self) -> CodegenResult<DumpOutput> {
        let mut run = RunContext::new();
        let planned = self.plan(&mut run)?;

        let mut generated = Vec::with_capacity(planned.len());
        for entry in &planned {
            let files = self
                .synthesizer
                .synthesize(entry.id, &entry.module, &entry.base_name, &mut run)?;
            run.modules.ensure(&entry.module);
            generated.push(files);
        }
        self.finalize(generated, run)
    }

    fn finalize(&self, generated: Vec<ObjectFiles>, mut run: RunContext) -> CodegenResult<DumpOutput> {
        let mut files = Vec::new();

        for ObjectFiles {
            mut declaration,
            definition,
        } in generated
        {
            if !declaration.has_content() {
                continue;
            }
            if run.usage.hashed_key_structs.contains(&declaration.object()) {
                self.append_hash_stub(&mut declaration)?;
            }

            let mut referenced = BTreeSet::new();
            {
                let mut env = RenderEnv {
                    graph: self.graph,
                    names: &run.names,
                    referenced_modules: &mut referenced,
                };
                files.push(OutputFile {
                    path: declaration.relative_path(),
                    contents: declaration.render(&mut env, None)?,
                });
                if let Some(definition) = definition.filter(SourceFile::has_content) {
                    files.push(OutputFile {
                        path: definition.relative_path(),
                        contents: definition.render(&mut env, Some(&declaration))?,
                    });
                }
            }
            for module in &referenced {
                run.modules.record(declaration.module(), module);
            }
            debug!(file = declaration.base_name(), references = referenced.len(), "rendered");
        }

        if self.config.output.emit_build_files {
            let modules: Vec<String> = run.modules.modules().map(str::to_string).collect();
            info!(modules = modules.len(), "writing module build files");
            for module in &modules {
                files.push(build_rules_file(
                    module,
                    &self.config.modules.forced_dependencies,
                    &run.modules,
                    self.config.output.modern_build_rules,
                ));
                files.push(module_source_file(module, self.config.modules.primary.as_deref()));
            }
        }

        Ok(DumpOutput {
            files,
            modules: run.modules,
            diagnostics: run.diagnostics,
        })
    }

    /// `GetTypeHash` stub for a type used as a map key
    fn append_hash_stub(&self, declaration: &mut SourceFile) -> CodegenResult<()> {
        let id = declaration.object();
        let native_name = match self.graph.get(id)? {
            ReflectedObject {
                kind: ObjectKind::Struct(_),
                ..
            } => native_struct_name(self.graph, id),
            ReflectedObject {
                kind: ObjectKind::Class(_) | ObjectKind::Interface(_),
                ..
            } => native_class_name(self.graph, id, false),
            _ => return Ok(()),
        };
        declaration.append_line(&format!(
            "FORCEINLINE uint32 GetTypeHash(const {}) {{ return 0; }}",
            native_name
        ));
        Ok(())
    }
}
