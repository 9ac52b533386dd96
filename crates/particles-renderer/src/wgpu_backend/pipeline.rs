//! Render pipeline construction for a resolved particle program.

use particles_config::schema::BlendMode;

use crate::instance::{COLOR_OFFSET, INDEX_OFFSET, INSTANCE_RECORD_SIZE};
use crate::interface::ShaderLocations;
use crate::quad::{QuadVertex, TEXCOORD_OFFSET};

/// Bytes between transform columns in an instance record.
const COLUMN_STRIDE: u64 = 16;

/// Blend state for the color target.
pub fn blend_state(mode: BlendMode) -> wgpu::BlendState {
    match mode {
        BlendMode::Alpha => wgpu::BlendState::ALPHA_BLENDING,
        BlendMode::Premultiplied => wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING,
        BlendMode::Additive => wgpu::BlendState {
            color: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::SrcAlpha,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
            alpha: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::One,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
        },
        BlendMode::Opaque => wgpu::BlendState::REPLACE,
    }
}

/// Per-vertex attributes of the base quad.
pub fn quad_attributes(locations: &ShaderLocations) -> Vec<wgpu::VertexAttribute> {
    vec![
        wgpu::VertexAttribute {
            offset: 0,
            shader_location: locations.position,
            format: wgpu::VertexFormat::Float32x3,
        },
        wgpu::VertexAttribute {
            offset: TEXCOORD_OFFSET,
            shader_location: locations.texcoord,
            format: wgpu::VertexFormat::Float32x2,
        },
    ]
}

/// Per-instance attributes read from an instance record. Color is left
/// out when the program has no color input.
pub fn instance_attributes(locations: &ShaderLocations) -> Vec<wgpu::VertexAttribute> {
    let mut attributes: Vec<wgpu::VertexAttribute> = locations
        .transform_columns()
        .into_iter()
        .zip(0u64..)
        .map(|(shader_location, column)| wgpu::VertexAttribute {
            offset: column * COLUMN_STRIDE,
            shader_location,
            format: wgpu::VertexFormat::Float32x4,
        })
        .collect();

    if let Some(color) = locations.color {
        attributes.push(wgpu::VertexAttribute {
            offset: COLOR_OFFSET,
            shader_location: color,
            format: wgpu::VertexFormat::Float32x4,
        });
    }
    attributes.push(wgpu::VertexAttribute {
        offset: INDEX_OFFSET,
        shader_location: locations.instance_index,
        format: wgpu::VertexFormat::Uint32,
    });
    attributes
}

/// Uniform block, texture and sampler at bindings 0, 1 and 2 of group 0.
pub fn bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("particle bind group layout"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    })
}

/// Everything [`create_pipeline`] needs besides the device.
pub struct PipelineDesc<'a> {
    pub label: &'a str,
    pub module: &'a wgpu::ShaderModule,
    pub vertex_entry: Option<&'a str>,
    pub fragment_entry: Option<&'a str>,
    pub layout: &'a wgpu::PipelineLayout,
    pub format: wgpu::TextureFormat,
    pub blend: BlendMode,
    pub locations: &'a ShaderLocations,
}

/// Instanced quad pipeline: slot 0 steps per vertex, slot 1 per instance.
/// No depth test; particles composite in draw order.
pub fn create_pipeline(device: &wgpu::Device, desc: &PipelineDesc<'_>) -> wgpu::RenderPipeline {
    let quad = quad_attributes(desc.locations);
    let instance = instance_attributes(desc.locations);

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(desc.label),
        layout: Some(desc.layout),
        vertex: wgpu::VertexState {
            module: desc.module,
            entry_point: desc.vertex_entry,
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            buffers: &[
                wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<QuadVertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &quad,
                },
                wgpu::VertexBufferLayout {
                    array_stride: INSTANCE_RECORD_SIZE,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &instance,
                },
            ],
        },
        fragment: Some(wgpu::FragmentState {
            module: desc.module,
            entry_point: desc.fragment_entry,
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: desc.format,
                blend: Some(blend_state(desc.blend)),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locations(color: Option<u32>) -> ShaderLocations {
        ShaderLocations {
            modelview_matrix: 0,
            projection_matrix: 64,
            color,
            position: 0,
            texcoord: 1,
            instance_index: 7,
            instance_transform: 2,
        }
    }

    #[test]
    fn blend_modes() {
        assert_eq!(blend_state(BlendMode::Alpha), wgpu::BlendState::ALPHA_BLENDING);
        assert_eq!(blend_state(BlendMode::Opaque), wgpu::BlendState::REPLACE);
        assert_eq!(
            blend_state(BlendMode::Premultiplied),
            wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING
        );
        let additive = blend_state(BlendMode::Additive);
        assert_eq!(additive.color.dst_factor, wgpu::BlendFactor::One);
        assert_eq!(additive.color.src_factor, wgpu::BlendFactor::SrcAlpha);
    }

    #[test]
    fn quad_attributes_match_vertex_layout() {
        let attrs = quad_attributes(&locations(None));
        assert_eq!(attrs[0].offset, 0);
        assert_eq!(attrs[0].shader_location, 0);
        assert_eq!(attrs[1].offset, 12);
        assert_eq!(attrs[1].shader_location, 1);
        assert_eq!(attrs[1].format, wgpu::VertexFormat::Float32x2);
    }

    #[test]
    fn instance_attributes_cover_the_record() {
        let attrs = instance_attributes(&locations(Some(6)));
        let summary: Vec<(u64, u32)> = attrs.iter().map(|a| (a.offset, a.shader_location)).collect();
        assert_eq!(
            summary,
            [(0, 2), (16, 3), (32, 4), (48, 5), (64, 6), (80, 7)]
        );
        assert_eq!(attrs[5].format, wgpu::VertexFormat::Uint32);
        let last = attrs[5].offset + attrs[5].format.size();
        assert!(last <= INSTANCE_RECORD_SIZE);
    }

    #[test]
    fn color_attribute_is_optional() {
        let attrs = instance_attributes(&locations(None));
        assert_eq!(attrs.len(), 5);
        assert!(attrs.iter().all(|a| a.offset != COLOR_OFFSET));
    }
}
