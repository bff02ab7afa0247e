// SPDX-License-Identifier: MIT OR Apache-2.0
//! Compilation output: shader text plus resource/uniform side tables.

use crate::error::CompileWarning;
use serde::Serialize;
use shaderweave_graph::{Parameter, Setting, Value, ValueType};
use std::collections::BTreeMap;

/// One exposed uniform reported to the output consumer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UniformEntry {
    /// Shader symbol name (e.g. `u_Albedo`)
    pub name: String,
    /// Declared value type
    pub value_type: ValueType,
    /// Default value the consumer should upload initially
    pub value: Value,
}

/// One GPU binding slot reported to the output consumer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BindingEntry {
    /// Binding index; assigned by lexicographic key order over the merged
    /// stage tables, never by insertion order
    pub index: usize,
    /// Shader symbol name
    pub name: String,
    /// Resource type (texture or sampler)
    pub value_type: ValueType,
}

/// Default resource values keyed identically to `binding_map`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceTable {
    /// Default sampler presets by binding key
    pub sampler: BTreeMap<String, String>,
    /// Default texture assets by binding key
    pub texture: BTreeMap<String, String>,
}

/// Result of one `compile*` call.
///
/// Binding indices and uniform keys are valid only paired with the shader
/// text from the same call; tables must never be mixed across compile
/// generations.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilationResult {
    /// Vertex stage source
    pub vert_code: String,
    /// Fragment stage source
    pub frag_code: String,
    /// Exposed uniforms by context key
    pub uniform_map: BTreeMap<String, UniformEntry>,
    /// GPU binding slots by resource key
    pub binding_map: BTreeMap<String, BindingEntry>,
    /// Default resource values
    pub resource: ResourceTable,
    /// Parameter table snapshot
    pub parameters: Vec<Parameter>,
    /// Pipeline settings snapshot
    pub setting: Setting,
    /// Non-fatal problems encountered during this call
    pub warnings: Vec<CompileWarning>,
}
