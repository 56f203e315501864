//! Redecl Codegen - Reflection Graph to Native Declarations
//!
//! This crate reconstructs annotated declaration headers, constructor
//! definitions and module build descriptors from a reflection graph.

pub mod access;
pub mod config;
pub mod context;
pub mod defaults;
pub mod deps;
pub mod dump;
pub mod error;
pub mod file;
pub mod flags;
pub mod manifest;
pub mod names;
pub mod synth;
pub mod types;

pub use config::{ConfigError, GeneratorConfig};
pub use context::{Diagnostic, ModuleDependencySet, RunContext};
pub use dump::{DumpOutput, Dumper, GatheredObjects, PlannedObject};
pub use error::{CodegenError, CodegenResult};
pub use file::OutputFile;
pub use synth::{ObjectFiles, Synthesizer};

use redecl_reflect::ReflectionGraph;

/// Run a complete dump of `graph` and return the rendered files
pub fn generate(graph: &dyn ReflectionGraph, config: &GeneratorConfig) -> CodegenResult<DumpOutput> {
    Dumper::new(graph, config).generate()
}
