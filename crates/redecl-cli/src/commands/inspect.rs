//! `redecl inspect`: list what a dump would produce without writing it.

use std::collections::BTreeMap;
use std::path::Path;

use redecl_codegen::{Dumper, RunContext};
use redecl_reflect::{ObjectKind, ReflectionGraph};
use termcolor::Color;

use super::{load_config, load_snapshot};
use crate::output::StyledOutput;

fn kind_label(kind: &ObjectKind) -> &'static str {
    match kind {
        ObjectKind::Class(_) => "class",
        ObjectKind::Interface(_) => "interface",
        ObjectKind::Struct(_) => "struct",
        ObjectKind::Enum(_) => "enum",
        ObjectKind::Function(_) => "delegate",
        ObjectKind::Instance { .. } => "instance",
    }
}

pub fn execute(out: &mut StyledOutput, snapshot: &Path, config: Option<&Path>) -> anyhow::Result<()> {
    let graph = load_snapshot(snapshot)?;
    let config = load_config(config)?;

    let dumper = Dumper::new(&graph, &config);
    let mut run = RunContext::new();
    let planned = dumper.plan(&mut run)?;

    let mut by_module: BTreeMap<&str, Vec<_>> = BTreeMap::new();
    for entry in &planned {
        by_module.entry(entry.module.as_str()).or_default().push(entry);
    }

    for (module, entries) in &by_module {
        out.bold(module);
        out.plain(&format!(" ({} objects)", entries.len()));
        out.newline();
        for entry in entries {
            let object = graph.get(entry.id)?;
            out.plain("  ");
            out.write_styled(&format!("{:<9}", kind_label(&object.kind)), Some(Color::Cyan), false);
            out.plain(&format!(" {:<32} {}.h", object.name, entry.base_name));
            out.newline();
        }
    }
    if by_module.is_empty() {
        out.write_styled("no eligible objects", Some(Color::Yellow), true);
        out.newline();
    }
    out.flush();
    Ok(())
}
