// SPDX-License-Identifier: MIT OR Apache-2.0
//! GLSL stage templates.
//!
//! The compiler owns the shader skeletons; graph evaluation only fills in
//! the declaration sections, the instruction body, and the block slice
//! expressions. Entry points are `sw_vert` and `sw_frag`, called from
//! `main`, so a host can recognize generated shaders by symbol.

/// Declaration and body sections spliced into one stage skeleton.
#[derive(Debug, Default)]
pub(crate) struct StageSections {
    /// Varying declarations as `type name;` lines; the stage qualifier
    /// is prepended by the skeleton
    pub varyings: String,
    /// Uniform and texture binding declarations, one per line
    pub uniforms: String,
    /// Deduplicated helper function text
    pub defines: String,
    /// Indented single-assignment instruction lines
    pub body: String,
}

/// Block slice expressions of the fragment stage.
#[derive(Debug)]
pub(crate) struct FragmentBlocks {
    pub base_color: String,
    pub alpha: String,
    /// Lit-only surface inputs; `None` for the unlit template
    pub lit: Option<LitBlocks>,
    /// Alpha clip threshold expression, when clipping is enabled
    pub alpha_clip: Option<String>,
}

/// Surface inputs specific to the lit template.
#[derive(Debug)]
pub(crate) struct LitBlocks {
    pub normal: String,
    pub metallic: String,
    pub roughness: String,
    pub emissive: String,
    /// Coat mask and smoothness, when the clear-coat layer is enabled
    pub coat: Option<(String, String)>,
}

pub(crate) fn vertex_source(
    sections: &StageSections,
    position_offset: &str,
    normal_offset: &str,
) -> String {
    format!(
        "#version 450\n\
         \n\
         layout(location = 0) in vec3 a_position;\n\
         layout(location = 1) in vec3 a_normal;\n\
         layout(location = 2) in vec2 a_uv;\n\
         layout(location = 3) in vec4 a_color;\n\
         \n\
         uniform mat4 sw_matWorld;\n\
         uniform mat4 sw_matViewProj;\n\
         uniform float sw_time;\n\
         \n\
         out vec2 sw_uv;\n\
         out vec3 sw_worldPos;\n\
         out vec3 sw_worldNormal;\n\
         out vec4 sw_vertexColor;\n\
         {varyings}\
         {uniforms}\
         {defines}\
         void sw_vert() {{\n\
         \x20 sw_uv = a_uv;\n\
         \x20 sw_vertexColor = a_color;\n\
         \x20 sw_worldPos = (sw_matWorld * vec4(a_position, 1.0)).xyz;\n\
         \x20 sw_worldNormal = mat3(sw_matWorld) * a_normal;\n\
         {body}\
         \x20 vec3 sw_PositionOffset = {position_offset};\n\
         \x20 vec3 sw_NormalOffset = {normal_offset};\n\
         \x20 vec4 worldPos = sw_matWorld * vec4(a_position + sw_PositionOffset, 1.0);\n\
         \x20 sw_worldPos = worldPos.xyz;\n\
         \x20 sw_worldNormal = normalize(mat3(sw_matWorld) * (a_normal + sw_NormalOffset));\n\
         \x20 gl_Position = sw_matViewProj * worldPos;\n\
         }}\n\
         \n\
         void main() {{ sw_vert(); }}\n",
        varyings = varying_block(&sections.varyings),
        uniforms = section(&sections.uniforms),
        defines = section(&sections.defines),
        body = sections.body,
    )
}

pub(crate) fn fragment_source(sections: &StageSections, blocks: &FragmentBlocks) -> String {
    let mut body = sections.body.clone();
    body.push_str(&format!("  vec3 sw_BaseColor = {};\n", blocks.base_color));
    body.push_str(&format!("  float sw_Alpha = {};\n", blocks.alpha));
    if let Some(threshold) = &blocks.alpha_clip {
        body.push_str(&format!("  float sw_AlphaClipThreshold = {threshold};\n"));
        body.push_str("  if (sw_Alpha < sw_AlphaClipThreshold) discard;\n");
    }
    match &blocks.lit {
        None => body.push_str("  sw_fragColor = vec4(sw_BaseColor, sw_Alpha);\n"),
        Some(lit) => {
            body.push_str(&format!("  vec3 sw_Normal = normalize({});\n", lit.normal));
            body.push_str(&format!("  float sw_Metallic = {};\n", lit.metallic));
            body.push_str(&format!("  float sw_Roughness = {};\n", lit.roughness));
            body.push_str(&format!("  vec3 sw_Emissive = {};\n", lit.emissive));
            body.push_str(
                "  vec3 sw_viewDir = normalize(sw_cameraPos - sw_worldPos);\n\
                 \x20 vec3 sw_halfDir = normalize(sw_lightDir + sw_viewDir);\n\
                 \x20 float sw_ndl = max(dot(sw_Normal, sw_lightDir), 0.0);\n\
                 \x20 float sw_ndh = max(dot(sw_Normal, sw_halfDir), 0.0);\n\
                 \x20 vec3 sw_diffuse = sw_BaseColor * (1.0 - sw_Metallic) * sw_ndl;\n\
                 \x20 float sw_gloss = exp2(10.0 * (1.0 - sw_Roughness) + 1.0);\n\
                 \x20 vec3 sw_specTint = mix(vec3(0.04), sw_BaseColor, sw_Metallic);\n\
                 \x20 vec3 sw_specular = sw_specTint * pow(sw_ndh, sw_gloss) * sw_ndl;\n",
            );
            if let Some((mask, smoothness)) = &lit.coat {
                body.push_str(&format!("  float sw_CoatMask = {mask};\n"));
                body.push_str(&format!("  float sw_CoatSmoothness = {smoothness};\n"));
                body.push_str(
                    "  float sw_coatGloss = exp2(10.0 * sw_CoatSmoothness + 1.0);\n\
                     \x20 sw_specular += vec3(sw_CoatMask * pow(sw_ndh, sw_coatGloss) * sw_ndl);\n",
                );
            }
            body.push_str(
                "  vec3 sw_lit = (sw_diffuse + sw_specular) * sw_lightColor + sw_Emissive;\n\
                 \x20 sw_fragColor = vec4(sw_lit, sw_Alpha);\n",
            );
        }
    }

    let lighting_uniforms = if blocks.lit.is_some() {
        "uniform vec3 sw_lightDir;\nuniform vec3 sw_lightColor;\nuniform vec3 sw_cameraPos;\n"
    } else {
        ""
    };
    fragment_skeleton(sections, lighting_uniforms, &body)
}

/// Minimal fragment shader writing one vec4 expression, for previews.
pub(crate) fn preview_fragment_source(sections: &StageSections, color: &str) -> String {
    let mut body = sections.body.clone();
    body.push_str(&format!("  sw_fragColor = {color};\n"));
    fragment_skeleton(sections, "", &body)
}

/// Fixed vertex shader for previews: full-screen geometry, no offsets.
pub(crate) fn preview_vertex_source(sections: &StageSections) -> String {
    vertex_source(sections, "vec3(0.0)", "vec3(0.0)")
}

fn fragment_skeleton(sections: &StageSections, extra_uniforms: &str, body: &str) -> String {
    format!(
        "#version 450\n\
         \n\
         in vec2 sw_uv;\n\
         in vec3 sw_worldPos;\n\
         in vec3 sw_worldNormal;\n\
         in vec4 sw_vertexColor;\n\
         {varyings}\
         \n\
         uniform float sw_time;\n\
         {extra_uniforms}\
         {uniforms}\
         {defines}\
         layout(location = 0) out vec4 sw_fragColor;\n\
         \n\
         void sw_frag() {{\n\
         {body}\
         }}\n\
         \n\
         void main() {{ sw_frag(); }}\n",
        varyings = fragment_varying_block(&sections.varyings),
        uniforms = section(&sections.uniforms),
        defines = section(&sections.defines),
    )
}

fn section(text: &str) -> String {
    if text.is_empty() {
        String::new()
    } else {
        format!("\n{text}\n")
    }
}

fn varying_block(decls: &str) -> String {
    if decls.is_empty() {
        String::new()
    } else {
        decls
            .lines()
            .map(|line| format!("out {line}\n"))
            .collect()
    }
}

fn fragment_varying_block(decls: &str) -> String {
    if decls.is_empty() {
        String::new()
    } else {
        decls.lines().map(|line| format!("in {line}\n")).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_skeleton_has_entry_points() {
        let source = vertex_source(&StageSections::default(), "vec3(0.0)", "vec3(0.0)");
        assert!(source.contains("void sw_vert()"));
        assert!(source.contains("void main() { sw_vert(); }"));
        assert!(source.contains("gl_Position"));
    }

    #[test]
    fn test_unlit_fragment_combines_color_and_alpha() {
        let blocks = FragmentBlocks {
            base_color: "vec3(1.0, 0.0, 0.0)".to_string(),
            alpha: "0.5".to_string(),
            lit: None,
            alpha_clip: None,
        };
        let source = fragment_source(&StageSections::default(), &blocks);
        assert!(source.contains("sw_fragColor = vec4(sw_BaseColor, sw_Alpha);"));
        assert!(!source.contains("discard"));
        assert!(!source.contains("sw_lightDir"));
    }

    #[test]
    fn test_alpha_clip_emits_discard() {
        let blocks = FragmentBlocks {
            base_color: "vec3(1.0)".to_string(),
            alpha: "0.5".to_string(),
            lit: None,
            alpha_clip: Some("0.25".to_string()),
        };
        let source = fragment_source(&StageSections::default(), &blocks);
        assert!(source.contains("if (sw_Alpha < sw_AlphaClipThreshold) discard;"));
    }

    #[test]
    fn test_lit_fragment_declares_light_uniforms() {
        let blocks = FragmentBlocks {
            base_color: "vec3(1.0)".to_string(),
            alpha: "1.0".to_string(),
            lit: Some(LitBlocks {
                normal: "sw_worldNormal".to_string(),
                metallic: "0.0".to_string(),
                roughness: "0.5".to_string(),
                emissive: "vec3(0.0)".to_string(),
                coat: None,
            }),
            alpha_clip: None,
        };
        let source = fragment_source(&StageSections::default(), &blocks);
        assert!(source.contains("uniform vec3 sw_lightDir;"));
        assert!(source.contains("sw_specular"));
        assert!(!source.contains("sw_CoatMask"));
    }
}
