//! WGSL interface reflection.
//!
//! Parses the module with naga's WGSL front end and reads off what the
//! manager's location queries need: the `@location(n)` inputs of the vertex
//! entry point (directly or through struct parameters), and the members of
//! the uniform block bound at `@group(0) @binding(0)` with the byte offsets
//! naga laid them out at, `@size`/`@align` and array strides included.

use std::collections::HashMap;

use naga::{AddressSpace, Binding, ShaderStage, TypeInner};

use crate::gpu::RendererError;

/// Interface facts extracted from a WGSL module.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShaderReflection {
    pub vertex_entry: Option<String>,
    pub fragment_entry: Option<String>,
    /// Vertex input name to `@location`.
    pub attributes: HashMap<String, u32>,
    /// Uniform block member name to byte offset.
    pub uniforms: HashMap<String, u32>,
    /// Size of the uniform block in bytes, rounded up to 16.
    pub uniform_block_size: u64,
}

impl ShaderReflection {
    pub fn parse(source: &str) -> Result<Self, RendererError> {
        let module = naga::front::wgsl::parse_str(source)
            .map_err(|e| RendererError::ShaderError(e.emit_to_string(source)))?;

        let mut reflection = ShaderReflection {
            fragment_entry: module
                .entry_points
                .iter()
                .find(|ep| ep.stage == ShaderStage::Fragment)
                .map(|ep| ep.name.clone()),
            ..Default::default()
        };

        if let Some(vertex) = module
            .entry_points
            .iter()
            .find(|ep| ep.stage == ShaderStage::Vertex)
        {
            reflection.vertex_entry = Some(vertex.name.clone());
            for argument in &vertex.function.arguments {
                match (&argument.binding, &argument.name) {
                    (Some(Binding::Location { location, .. }), Some(name)) => {
                        reflection.attributes.insert(name.clone(), *location);
                    }
                    (None, _) => {
                        if let TypeInner::Struct { members, .. } = &module.types[argument.ty].inner {
                            reflection.attributes.extend(members.iter().filter_map(|m| {
                                match (&m.binding, &m.name) {
                                    (Some(Binding::Location { location, .. }), Some(name)) => {
                                        Some((name.clone(), *location))
                                    }
                                    _ => None,
                                }
                            }));
                        }
                    }
                    _ => {}
                }
            }
        }

        let block = module.global_variables.iter().find(|(_, var)| {
            var.space == AddressSpace::Uniform
                && var
                    .binding
                    .as_ref()
                    .is_some_and(|b| b.group == 0 && b.binding == 0)
        });
        if let Some((_, var)) = block {
            if let TypeInner::Struct { members, span } = &module.types[var.ty].inner {
                reflection.uniforms = members
                    .iter()
                    .filter_map(|m| Some((m.name.clone()?, m.offset)))
                    .collect();
                reflection.uniform_block_size = u64::from(*span).next_multiple_of(16);
            }
        }

        Ok(reflection)
    }
}
#[cfg(test)]
mod tests {
    use super::*;

    const PARTICLE_WGSL: &str = r#"
struct Uniforms {
    modelview_matrix: mat4x4<f32>,
    projection_matrix: mat4x4<f32>,
};

@group(0) @binding(0) var<uniform> uniforms: Uniforms;
@group(0) @binding(1) var tex: texture_2d<f32>;

struct QuadInput {
    @location(0) position: vec3<f32>,
    @location(1) texcoord: vec2<f32>,
};

struct InstanceInput {
    @location(2) transform_col0: vec4<f32>,
    @location(3) transform_col1: vec4<f32>,
    @location(4) transform_col2: vec4<f32>,
    @location(5) transform_col3: vec4<f32>,
    @location(6) color: vec4<f32>,
    @location(7) instance_index: u32,
};

struct VertexOutput {
    @builtin(position) clip: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_main(quad: QuadInput, instance: InstanceInput) -> VertexOutput {
    var out: VertexOutput;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(1.0);
}
"#;

    #[test]
    fn reads_struct_vertex_inputs() {
        let r = ShaderReflection::parse(PARTICLE_WGSL).unwrap();
        assert_eq!(r.attributes.get("position"), Some(&0));
        assert_eq!(r.attributes.get("texcoord"), Some(&1));
        assert_eq!(r.attributes.get("transform_col0"), Some(&2));
        assert_eq!(r.attributes.get("color"), Some(&6));
        assert_eq!(r.attributes.get("instance_index"), Some(&7));
        assert_eq!(r.attributes.len(), 8);
    }

    #[test]
    fn vertex_outputs_are_not_inputs() {
        let r = ShaderReflection::parse(PARTICLE_WGSL).unwrap();
        assert!(!r.attributes.contains_key("uv"));
        assert!(!r.attributes.contains_key("clip"));
    }

    #[test]
    fn reads_uniform_offsets() {
        let r = ShaderReflection::parse(PARTICLE_WGSL).unwrap();
        assert_eq!(r.uniforms.get("modelview_matrix"), Some(&0));
        assert_eq!(r.uniforms.get("projection_matrix"), Some(&64));
        assert_eq!(r.uniform_block_size, 128);
    }

    #[test]
    fn reads_entry_points() {
        let r = ShaderReflection::parse(PARTICLE_WGSL).unwrap();
        assert_eq!(r.vertex_entry.as_deref(), Some("vs_main"));
        assert_eq!(r.fragment_entry.as_deref(), Some("fs_main"));
    }

    #[test]
    fn reads_direct_location_parameters() {
        let src = r#"
@vertex
fn main_vs(@location(3) pos: vec3f, @location(5) @interpolate(flat) id: u32) -> @builtin(position) vec4f {
    return vec4f(pos, 1.0);
}
"#;
        let r = ShaderReflection::parse(src).unwrap();
        assert_eq!(r.vertex_entry.as_deref(), Some("main_vs"));
        assert_eq!(r.attributes.get("pos"), Some(&3));
        assert_eq!(r.attributes.get("id"), Some(&5));
    }

    #[test]
    fn commented_out_inputs_are_ignored() {
        let src = r#"
struct In {
    @location(0) position: vec3<f32>,
    // @location(1) texcoord: vec2<f32>,
    /* @location(2) color: vec4<f32>, */
};
@vertex fn vs(v: In) -> @builtin(position) vec4<f32> { return vec4<f32>(v.position, 1.0); }
"#;
        let r = ShaderReflection::parse(src).unwrap();
        assert_eq!(r.attributes.len(), 1);
        assert!(r.attributes.contains_key("position"));
    }

    #[test]
    fn uniform_layout_follows_alignment_rules() {
        let src = r#"
struct U {
    scale: f32,
    offset: vec3<f32>,
    tint: vec4f,
    mvp: mat4x4f,
    count: u32,
};
@group(0) @binding(0) var<uniform> u: U;
"#;
        let r = ShaderReflection::parse(src).unwrap();
        assert_eq!(r.uniforms["scale"], 0);
        assert_eq!(r.uniforms["offset"], 16);
        assert_eq!(r.uniforms["tint"], 32);
        assert_eq!(r.uniforms["mvp"], 48);
        assert_eq!(r.uniforms["count"], 112);
        assert_eq!(r.uniform_block_size, 128);
    }

    #[test]
    fn explicit_member_size_moves_later_members() {
        let src = r#"
struct U {
    @size(128) modelview_matrix: mat4x4<f32>,
    projection_matrix: mat4x4<f32>,
};
@group(0) @binding(0) var<uniform> u: U;
"#;
        let r = ShaderReflection::parse(src).unwrap();
        assert_eq!(r.uniforms.get("modelview_matrix"), Some(&0));
        assert_eq!(r.uniforms.get("projection_matrix"), Some(&128));
        assert_eq!(r.uniform_block_size, 192);
    }

    #[test]
    fn explicit_member_align_is_honored() {
        let src = r#"
struct U {
    scale: f32,
    @align(64) mvp: mat4x4<f32>,
};
@group(0) @binding(0) var<uniform> u: U;
"#;
        let r = ShaderReflection::parse(src).unwrap();
        assert_eq!(r.uniforms["scale"], 0);
        assert_eq!(r.uniforms["mvp"], 64);
        assert_eq!(r.uniform_block_size, 128);
    }

    #[test]
    fn array_members_are_laid_out_by_stride() {
        let src = r#"
struct U {
    tints: array<vec4<f32>, 2>,
    modelview_matrix: mat4x4<f32>,
    projection_matrix: mat4x4<f32>,
};
@group(0) @binding(0) var<uniform> u: U;
"#;
        let r = ShaderReflection::parse(src).unwrap();
        assert_eq!(r.uniforms.len(), 3);
        assert_eq!(r.uniforms["tints"], 0);
        assert_eq!(r.uniforms["modelview_matrix"], 32);
        assert_eq!(r.uniforms["projection_matrix"], 96);
        assert_eq!(r.uniform_block_size, 160);
    }

    #[test]
    fn nested_struct_members_are_laid_out() {
        let src = r#"
struct Light { dir: vec3<f32>, power: f32, };
struct U {
    light: Light,
    mvp: mat4x4<f32>,
};
@group(0) @binding(0) var<uniform> u: U;
"#;
        let r = ShaderReflection::parse(src).unwrap();
        assert_eq!(r.uniforms["light"], 0);
        assert_eq!(r.uniforms["mvp"], 16);
    }

    #[test]
    fn invalid_source_is_a_shader_error() {
        let err = ShaderReflection::parse("fn broken( {").unwrap_err();
        assert!(matches!(err, RendererError::ShaderError(_)));
        assert!(err.to_string().contains("shader error"), "{err}");
    }

    #[test]
    fn other_bindings_are_not_the_uniform_block() {
        let src = r#"
struct U { mvp: mat4x4<f32>, };
@group(1) @binding(0) var<uniform> u: U;
"#;
        let r = ShaderReflection::parse(src).unwrap();
        assert!(r.uniforms.is_empty());
        assert_eq!(r.uniform_block_size, 0);
    }

    #[test]
    fn empty_source_reflects_nothing() {
        let r = ShaderReflection::parse("").unwrap();
        assert_eq!(r, ShaderReflection::default());
    }
}
