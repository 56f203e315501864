//! Annotation argument builder
//!
//! Collects switches (`Blueprintable`), parameters (`Config=Game`) and a
//! nested meta bucket, then renders them as the argument list of a
//! `UCLASS(...)`-style annotation.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{CodegenError, CodegenResult};

/// Key reserved for the nested meta bucket
pub const META_KEY: &str = "meta";

/// Builder for one annotation argument list
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FlagFormatter {
    switches: BTreeSet<String>,
    parameters: BTreeMap<String, BTreeSet<String>>,
    meta: Option<Box<FlagFormatter>>,
}

impl FlagFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a bare switch; duplicates collapse
    pub fn add_switch(&mut self, name: impl Into<String>) {
        self.switches.insert(name.into());
    }

    /// Add a `key=value` parameter; repeated keys collect every value
    pub fn add_parameter(&mut self, key: &str, value: impl Into<String>) -> CodegenResult<()> {
        if key.eq_ignore_ascii_case(META_KEY) {
            return Err(CodegenError::ReservedFlagKey {
                key: key.to_string(),
            });
        }
        self.parameters
            .entry(key.to_string())
            .or_default()
            .insert(value.into());
        Ok(())
    }

    /// The nested meta bucket, created on first use
    pub fn meta(&mut self) -> &mut FlagFormatter {
        self.meta.get_or_insert_with(Box::default)
    }

    pub fn is_empty(&self) -> bool {
        self.switches.is_empty()
            && self.parameters.is_empty()
            && self.meta.as_ref().map_or(true, |m| m.is_empty())
    }

    /// Render as `Switch, Key=Value, Key=(A, B), meta=(...)`
    pub fn build(&self) -> String {
        let mut parts: Vec<String> = self.switches.iter().cloned().collect();

        for (key, values) in &self.parameters {
            if values.len() == 1 {
                if let Some(value) = values.iter().next() {
                    parts.push(format!("{}={}", key, value));
                }
            } else {
                let joined: Vec<&str> = values.iter().map(String::as_str).collect();
                parts.push(format!("{}=({})", key, joined.join(", ")));
            }
        }

        if let Some(meta) = &self.meta {
            if !meta.is_empty() {
                parts.push(format!("{}=({})", META_KEY, meta.build()));
            }
        }

        parts.join(", ")
    }
}
