// SPDX-License-Identifier: MIT OR Apache-2.0
//! Subgraph resolution.
//!
//! Subgraph assets are fetched through an async [`SubGraphProvider`] in a
//! prefetch pass before evaluation, so the evaluator itself stays
//! synchronous. Prefetch walks subgraph references transitively and
//! rejects cyclic inclusion.

use crate::error::SubGraphError;
use futures::future::BoxFuture;
use shaderweave_graph::{Graph, MaterialTemplate, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Node kind that inlines another graph by asset reference.
pub const SUBGRAPH_KIND: &str = "subgraph";
/// Declared input slot inside a subgraph.
pub const SUBGRAPH_INPUT_KIND: &str = "subgraph-input";
/// The single output node inside a subgraph.
pub const SUBGRAPH_OUTPUT_KIND: &str = "subgraph-output";

/// Source of subgraph documents, keyed by opaque asset reference.
pub trait SubGraphProvider: Send + Sync {
    /// List every asset reference this provider can serve. Editors use
    /// this to populate subgraph pickers; compilation never calls it.
    fn list(&self) -> BoxFuture<'_, Vec<String>>;

    /// Fetch the graph stored under `asset`, or `None` if unknown.
    fn fetch(&self, asset: &str) -> BoxFuture<'_, Option<Graph>>;
}

/// Provider over a fixed in-memory map. Used by previews and tests.
#[derive(Debug, Default)]
pub struct MapProvider {
    graphs: HashMap<String, Graph>,
}

impl MapProvider {
    /// Empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `graph` under `asset`.
    pub fn insert(&mut self, asset: impl Into<String>, graph: Graph) {
        self.graphs.insert(asset.into(), graph);
    }
}

impl SubGraphProvider for MapProvider {
    fn list(&self) -> BoxFuture<'_, Vec<String>> {
        let mut assets: Vec<String> = self.graphs.keys().cloned().collect();
        assets.sort();
        Box::pin(async move { assets })
    }

    fn fetch(&self, asset: &str) -> BoxFuture<'_, Option<Graph>> {
        let hit = self.graphs.get(asset).cloned();
        Box::pin(async move { hit })
    }
}

/// Snapshot of every subgraph a compile call can reach, fully fetched.
#[derive(Debug, Clone, Default)]
pub struct ResolvedSubGraphs {
    graphs: HashMap<String, Arc<Graph>>,
}

impl ResolvedSubGraphs {
    /// Empty set, for graphs without subgraph nodes.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Look up a resolved graph by asset reference.
    pub fn get(&self, asset: &str) -> Option<&Graph> {
        self.graphs.get(asset).map(Arc::as_ref)
    }

    /// Whether anything was resolved.
    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }
}

/// Collect the asset references of every subgraph node in `graph`.
fn referenced_assets(graph: &Graph) -> Vec<String> {
    let mut assets = Vec::new();
    for node in graph.nodes() {
        if node.kind != SUBGRAPH_KIND {
            continue;
        }
        if let Some(Value::String(asset)) = node.input("asset").map(|p| &p.value) {
            if !asset.is_empty() && !assets.contains(asset) {
                assets.push(asset.clone());
            }
        }
    }
    assets
}

/// Fetch every subgraph reachable from `graph`, transitively.
///
/// `provider` may be `None` only when the graph references no subgraphs.
/// The inclusion stack rejects an asset that is reached again while its
/// own references are still being expanded.
pub async fn prefetch(
    graph: &Graph,
    provider: Option<&dyn SubGraphProvider>,
) -> Result<ResolvedSubGraphs, SubGraphError> {
    let roots = referenced_assets(graph);
    if roots.is_empty() {
        return Ok(ResolvedSubGraphs::empty());
    }
    let provider = provider.ok_or(SubGraphError::NoProvider)?;

    let mut resolved = ResolvedSubGraphs::empty();
    let mut stack = Vec::new();
    for asset in roots {
        fetch_into(&mut resolved, &mut stack, provider, &asset).await?;
    }
    Ok(resolved)
}

/// Iterative expansion of one root asset with an explicit inclusion stack.
async fn fetch_into(
    resolved: &mut ResolvedSubGraphs,
    stack: &mut Vec<String>,
    provider: &dyn SubGraphProvider,
    root: &str,
) -> Result<(), SubGraphError> {
    // (asset, depth) work list; popping back to a shallower depth unwinds
    // the inclusion stack.
    let mut work = vec![(root.to_string(), 0usize)];
    while let Some((asset, depth)) = work.pop() {
        stack.truncate(depth);
        if stack.iter().any(|held| held == &asset) {
            return Err(SubGraphError::CyclicInclusion(asset));
        }
        if resolved.graphs.contains_key(&asset) {
            continue;
        }

        debug!(%asset, depth, "fetching subgraph");
        let fetched = provider
            .fetch(&asset)
            .await
            .ok_or_else(|| SubGraphError::MissingAsset(asset.clone()))?;
        if fetched.setting.template != MaterialTemplate::SubGraph {
            return Err(SubGraphError::NotASubGraph(asset));
        }
        let output_count = fetched
            .nodes()
            .filter(|n| n.kind == SUBGRAPH_OUTPUT_KIND)
            .count();
        if output_count != 1 {
            return Err(SubGraphError::MalformedSubGraph(asset));
        }

        let nested = referenced_assets(&fetched);
        resolved.graphs.insert(asset.clone(), Arc::new(fetched));
        stack.push(asset);
        for nested_asset in nested {
            work.push((nested_asset, depth + 1));
        }
    }
    stack.clear();
    Ok(())
}

/// Map an asset reference onto a GLSL-safe identifier fragment.
pub(crate) fn sanitize_identifier(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            out.push(ch);
        } else {
            out.push('_');
        }
    }
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}
