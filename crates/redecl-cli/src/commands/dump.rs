//! `redecl dump`: generate and write every file of a dump.

use std::path::PathBuf;

use anyhow::Context;
use termcolor::Color;

use super::{load_config, load_snapshot};
use crate::output::StyledOutput;

pub struct DumpOptions {
    pub snapshot: PathBuf,
    pub output: PathBuf,
    pub config: Option<PathBuf>,
    pub no_build_files: bool,
}

pub fn execute(out: &mut StyledOutput, options: DumpOptions) -> anyhow::Result<()> {
    let graph = load_snapshot(&options.snapshot)?;
    let mut config = load_config(options.config.as_deref())?;
    if options.no_build_files {
        config.output.emit_build_files = false;
    }

    let dump = redecl_codegen::generate(&graph, &config)
        .with_context(|| format!("dump of {} failed", options.snapshot.display()))?;
    let written = dump
        .write_to(&options.output, config.output.clean)
        .context("failed to write output")?;

    out.success("Generated ");
    out.bold(&written.to_string());
    out.plain(" files for ");
    out.bold(&dump.modules.len().to_string());
    out.plain(" modules in ");
    out.write_styled(&options.output.display().to_string(), Some(Color::Cyan), false);
    out.newline();

    for module in dump.modules.modules() {
        out.plain("  ");
        out.bold(module);
        let references: Vec<&str> = dump
            .modules
            .get(module)
            .map(|set| set.iter().map(String::as_str).collect())
            .unwrap_or_default();
        if !references.is_empty() {
            out.plain(&format!(" -> {}", references.join(", ")));
        }
        out.newline();
    }

    if !dump.diagnostics.is_empty() {
        out.write_styled(&format!("{} diagnostics", dump.diagnostics.len()), Some(Color::Yellow), true);
        out.newline();
        for diagnostic in &dump.diagnostics {
            out.plain(&format!("  {}", diagnostic));
            out.newline();
        }
    }
    out.flush();
    Ok(())
}
