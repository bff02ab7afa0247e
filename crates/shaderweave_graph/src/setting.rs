// SPDX-License-Identifier: MIT OR Apache-2.0
//! Material settings attached to a graph.

use serde::{Deserialize, Serialize};

/// Stage template the compiled shader is wrapped in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum MaterialTemplate {
    /// Full PBR surface
    #[default]
    Lit,
    /// Flat shading, no lighting
    Unlit,
    /// Nested graph meant to be inlined into a host material
    SubGraph,
}

/// Face culling mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CullMode {
    /// Cull back faces
    #[default]
    Back,
    /// Cull front faces
    Front,
    /// Draw both faces
    None,
}

/// Pipeline-facing settings record carried through compilation unchanged.
///
/// The compiler reads `template`, `alpha_clip` and `clear_coat` to pick the
/// stage template and required block set; the remaining flags are passed
/// through in the [`CompilationResult`](crate) for the material controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Setting {
    /// Stage template selection
    pub template: MaterialTemplate,
    /// Alpha blending enabled
    pub blend: bool,
    /// Face culling mode
    pub cull: CullMode,
    /// Depth test enabled
    pub depth_test: bool,
    /// Depth write enabled
    pub depth_write: bool,
    /// Alpha clipping enabled (adds an AlphaClipThreshold block requirement)
    pub alpha_clip: bool,
    /// Clear-coat layer enabled (adds CoatMask/CoatSmoothness requirements)
    pub clear_coat: bool,
}

impl Default for Setting {
    fn default() -> Self {
        Self {
            template: MaterialTemplate::default(),
            blend: false,
            cull: CullMode::default(),
            depth_test: true,
            depth_write: true,
            alpha_clip: false,
            clear_coat: false,
        }
    }
}

impl Setting {
    /// Settings for an unlit material.
    pub fn unlit() -> Self {
        Self {
            template: MaterialTemplate::Unlit,
            ..Self::default()
        }
    }

    /// Settings for a subgraph asset.
    pub fn sub_graph() -> Self {
        Self {
            template: MaterialTemplate::SubGraph,
            ..Self::default()
        }
    }
}
