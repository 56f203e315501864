//! Subcommand implementations

pub mod dump;
pub mod inspect;

use std::path::Path;

use anyhow::Context;
use redecl_codegen::GeneratorConfig;
use redecl_reflect::Snapshot;
use tracing::info;

/// Load and validate a snapshot file
pub fn load_snapshot(path: &Path) -> anyhow::Result<Snapshot> {
    let snapshot = Snapshot::load(path).with_context(|| format!("failed to load snapshot {}", path.display()))?;
    snapshot
        .validate()
        .with_context(|| format!("snapshot {} is malformed", path.display()))?;
    info!(objects = snapshot.len(), path = %path.display(), "snapshot loaded");
    Ok(snapshot)
}

/// Configuration from `path`, or the defaults
pub fn load_config(path: Option<&Path>) -> anyhow::Result<GeneratorConfig> {
    match path {
        Some(path) => {
            GeneratorConfig::from_file(path).with_context(|| format!("failed to read config {}", path.display()))
        }
        None => Ok(GeneratorConfig::default()),
    }
}
