//! [`GpuBackend`] over wgpu.
//!
//! Programs are WGSL modules linked with [`WgpuBackend::link_program`];
//! their locations come from [`reflect::ShaderReflection`]. The host owns
//! the frame: it hands the backend a target view with
//! [`WgpuBackend::begin_frame`], lets the manager draw, then calls
//! [`WgpuBackend::end_frame`] before presenting.

mod pipeline;
pub mod reflect;
mod types;

use std::collections::HashMap;
use std::sync::Arc;

use particles_config::schema::BlendMode;
use tracing::{debug, warn};
use wgpu::util::DeviceExt;

use crate::backend::{GpuBackend, Location};
use crate::gpu::RendererError;
use crate::interface::ShaderLocations;
use crate::matrix::Mat4;
use crate::quad::{QUAD_INDICES, QUAD_VERTICES};

pub use pipeline::blend_state;
pub use types::{WgpuBuffer, WgpuProgram, WgpuTexture};

use reflect::ShaderReflection;
use types::{ProgramInner, TextureInner, TextureKeyed};

/// Pipeline, uniform storage and bind group of a prepared program.
struct PreparedProgram {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_data: Vec<u8>,
    bind_group: TextureKeyed<wgpu::BindGroup>,
}

struct FrameTarget {
    view: wgpu::TextureView,
    clear: Option<wgpu::Color>,
}

/// Renders particle draws into a host-supplied color target.
pub struct WgpuBackend {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    format: wgpu::TextureFormat,
    blend: BlendMode,
    bind_group_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    quad_vertices: wgpu::Buffer,
    quad_indices: wgpu::Buffer,
    prepared: HashMap<u64, PreparedProgram>,
    bound_program: Option<WgpuProgram>,
    bound_texture: Option<WgpuTexture>,
    frame: Option<FrameTarget>,
    next_id: u64,
}

impl WgpuBackend {
    pub fn new(
        device: Arc<wgpu::Device>,
        queue: Arc<wgpu::Queue>,
        format: wgpu::TextureFormat,
        blend: BlendMode,
    ) -> Self {
        let bind_group_layout = pipeline::bind_group_layout(&device);
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("particle pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let quad_vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("particle quad vertices"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let quad_indices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("particle quad indices"),
            contents: bytemuck::cast_slice(&QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            device,
            queue,
            format,
            blend,
            bind_group_layout,
            pipeline_layout,
            quad_vertices,
            quad_indices,
            prepared: HashMap::new(),
            bound_program: None,
            bound_texture: None,
            frame: None,
            next_id: 0,
        }
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Compile `source` and reflect its interface.
    ///
    /// Never fails outright: compile and reflection errors are kept on the
    /// program as [`RendererError::ShaderError`] and reported by
    /// `link_status`, so the manager can reject it.
    pub fn link_program(&mut self, label: &str, source: &str) -> WgpuProgram {
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(label),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            });
        let compile_error = pollster::block_on(self.device.pop_error_scope());

        let (reflection, link_error) = match (compile_error, ShaderReflection::parse(source)) {
            (Some(e), _) => (
                ShaderReflection::default(),
                Some(RendererError::ShaderError(e.to_string())),
            ),
            (None, Err(e)) => (ShaderReflection::default(), Some(e)),
            (None, Ok(reflection)) => {
                let error = entry_point_error(&reflection);
                (reflection, error)
            }
        };
        if let Some(error) = &link_error {
            warn!(label, "shader failed to link: {error}");
        } else {
            debug!(
                label,
                attributes = reflection.attributes.len(),
                uniforms = reflection.uniforms.len(),
                "shader linked"
            );
        }

        WgpuProgram {
            inner: Arc::new(ProgramInner {
                id: self.next_id(),
                label: label.to_string(),
                module,
                link_error,
                reflection,
            }),
        }
    }

    /// Upload tightly packed RGBA8 pixels as a sampled texture.
    pub fn create_texture_rgba8(
        &mut self,
        label: &str,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> Result<WgpuTexture, RendererError> {
        if width == 0 || height == 0 {
            return Err(RendererError::TextureError(format!(
                "{label}: empty texture ({width}x{height})"
            )));
        }
        let max = self.device.limits().max_texture_dimension_2d;
        if width > max || height > max {
            return Err(RendererError::TextureError(format!(
                "{label}: {width}x{height} exceeds the device limit of {max}"
            )));
        }
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(RendererError::TextureError(format!(
                "{label}: expected {expected} bytes of RGBA8, got {}",
                pixels.len()
            )));
        }

        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = self.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(label),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        debug!(label, width, height, "texture uploaded");
        Ok(WgpuTexture {
            inner: Arc::new(TextureInner {
                id: self.next_id(),
                texture,
                view,
                sampler,
            }),
        })
    }

    /// Set the color target for the following draws.
    pub fn begin_frame(&mut self, view: wgpu::TextureView) {
        if self.frame.is_some() {
            warn!("begin_frame called twice; previous frame target dropped");
        }
        self.frame = Some(FrameTarget { view, clear: None });
    }

    /// Clear the target before the next draw of this frame.
    pub fn clear_frame(&mut self, color: wgpu::Color) {
        if let Some(frame) = &mut self.frame {
            frame.clear = Some(color);
        }
    }

    /// Finish the frame. A pending clear with no draw is submitted here.
    pub fn end_frame(&mut self) {
        let Some(frame) = self.frame.take() else {
            return;
        };
        if let Some(color) = frame.clear {
            let mut encoder = self
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("particle clear encoder"),
                });
            {
                let _pass = begin_pass(&mut encoder, &frame.view, wgpu::LoadOp::Clear(color));
            }
            self.queue.submit(std::iter::once(encoder.finish()));
        }
    }
}

fn entry_point_error(reflection: &ShaderReflection) -> Option<RendererError> {
    let missing = if reflection.vertex_entry.is_none() {
        "no @vertex entry point"
    } else if reflection.fragment_entry.is_none() {
        "no @fragment entry point"
    } else {
        return None;
    };
    Some(RendererError::ShaderError(missing.into()))
}

fn create_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    uniform_buffer: &wgpu::Buffer,
    texture: &WgpuTexture,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("particle bind group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(&texture.inner.view),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::Sampler(&texture.inner.sampler),
            },
        ],
    })
}

fn begin_pass<'e>(
    encoder: &'e mut wgpu::CommandEncoder,
    view: &wgpu::TextureView,
    load: wgpu::LoadOp<wgpu::Color>,
) -> wgpu::RenderPass<'e> {
    encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("particle pass"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view,
            resolve_target: None,
            ops: wgpu::Operations {
                load,
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
    })
}

impl GpuBackend for WgpuBackend {
    type Program = WgpuProgram;
    type Texture = WgpuTexture;
    type Buffer = WgpuBuffer;

    fn link_status(&self, program: &WgpuProgram) -> Result<(), String> {
        match &program.inner.link_error {
            None => Ok(()),
            Some(error) => Err(error.to_string()),
        }
    }

    fn uniform_location(&self, program: &WgpuProgram, name: &str) -> Option<Location> {
        program.reflection().uniforms.get(name).copied()
    }

    fn attribute_location(&self, program: &WgpuProgram, name: &str) -> Option<Location> {
        program.reflection().attributes.get(name).copied()
    }

    fn prepare_program(
        &mut self,
        program: &WgpuProgram,
        locations: &ShaderLocations,
    ) -> Result<(), String> {
        let reflection = program.reflection();

        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let pipeline = pipeline::create_pipeline(
            &self.device,
            &pipeline::PipelineDesc {
                label: program.label(),
                module: &program.inner.module,
                vertex_entry: reflection.vertex_entry.as_deref(),
                fragment_entry: reflection.fragment_entry.as_deref(),
                layout: &self.pipeline_layout,
                format: self.format,
                blend: self.blend,
                locations,
            },
        );
        if let Some(error) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(format!("pipeline creation failed: {error}"));
        }

        let uniform_size = reflection.uniform_block_size.max(16);
        let uniform_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("particle uniforms"),
            size: uniform_size,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        self.prepared.insert(
            program.id(),
            PreparedProgram {
                pipeline,
                uniform_buffer,
                uniform_data: vec![0; uniform_size as usize],
                bind_group: TextureKeyed::default(),
            },
        );
        debug!(program = program.label(), blend = ?self.blend, "pipeline prepared");
        Ok(())
    }

    fn release_program(&mut self, program: WgpuProgram) {
        if let Some(prepared) = self.prepared.remove(&program.id()) {
            prepared.uniform_buffer.destroy();
        }
        if self.bound_program.as_ref().map(WgpuProgram::id) == Some(program.id()) {
            self.bound_program = None;
        }
    }

    fn release_texture(&mut self, texture: WgpuTexture) {
        if self.bound_texture.as_ref().map(WgpuTexture::id) == Some(texture.id()) {
            self.bound_texture = None;
        }
        for prepared in self.prepared.values_mut() {
            prepared.bind_group.invalidate(texture.id());
        }
        texture.inner.texture.destroy();
    }

    fn create_instance_buffer(&mut self, size: u64) -> Result<WgpuBuffer, String> {
        let max = self.device.limits().max_buffer_size;
        if size > max {
            return Err(format!(
                "instance buffer of {size} bytes exceeds the device limit of {max} bytes"
            ));
        }

        self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("particle instances"),
            size,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        if let Some(error) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(error.to_string());
        }
        Ok(WgpuBuffer { buffer, size })
    }

    fn release_buffer(&mut self, buffer: WgpuBuffer) {
        buffer.buffer.destroy();
    }

    fn bind_program(&mut self, program: &WgpuProgram) {
        self.bound_program = Some(program.share());
    }

    fn bind_texture(&mut self, unit: u32, texture: &WgpuTexture) {
        if unit != 0 {
            warn!(unit, "only texture unit 0 is supported; binding to unit 0");
        }
        self.bound_texture = Some(texture.share());
    }

    fn set_uniform_matrix(&mut self, location: Location, matrix: &Mat4) {
        let Some(prepared) = self
            .bound_program
            .as_ref()
            .and_then(|p| self.prepared.get_mut(&p.id()))
        else {
            warn!("uniform set with no prepared program bound");
            return;
        };
        let start = location as usize;
        let bytes: &[u8] = bytemuck::cast_slice(matrix);
        match prepared.uniform_data.get_mut(start..start + bytes.len()) {
            Some(slot) => slot.copy_from_slice(bytes),
            None => warn!(location, "matrix uniform outside the uniform block"),
        }
    }

    fn upload_instances(&mut self, buffer: &WgpuBuffer, bytes: &[u8]) -> Result<(), String> {
        if bytes.len() as u64 > buffer.size {
            return Err(format!(
                "upload of {} bytes overflows a {} byte instance buffer",
                bytes.len(),
                buffer.size
            ));
        }
        self.queue.write_buffer(&buffer.buffer, 0, bytes);
        Ok(())
    }

    fn draw_quad_instanced(
        &mut self,
        buffer: &WgpuBuffer,
        instance_count: u32,
    ) -> Result<(), String> {
        let program = self.bound_program.as_ref().ok_or("no program bound")?;
        let texture = self.bound_texture.as_ref().ok_or("no texture bound")?;
        let prepared = self
            .prepared
            .get_mut(&program.id())
            .ok_or_else(|| format!("program {} was not prepared", program.label()))?;
        let Some(frame) = &self.frame else {
            return Err("no frame target; call begin_frame first".into());
        };

        self.queue
            .write_buffer(&prepared.uniform_buffer, 0, &prepared.uniform_data);
        let (device, layout) = (&self.device, &self.bind_group_layout);
        let uniform_buffer = &prepared.uniform_buffer;
        let bind_group = prepared.bind_group.get_or_insert_with(texture.id(), || {
            create_bind_group(device, layout, uniform_buffer, texture)
        });

        let load = match frame.clear {
            Some(color) => wgpu::LoadOp::Clear(color),
            None => wgpu::LoadOp::Load,
        };
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("particle encoder"),
            });
        {
            let mut pass = begin_pass(&mut encoder, &frame.view, load);
            pass.set_pipeline(&prepared.pipeline);
            pass.set_bind_group(0, bind_group, &[]);
            pass.set_vertex_buffer(0, self.quad_vertices.slice(..));
            pass.set_vertex_buffer(1, buffer.buffer.slice(..));
            pass.set_index_buffer(self.quad_indices.slice(..), wgpu::IndexFormat::Uint16);
            pass.draw_indexed(0..QUAD_INDICES.len() as u32, 0, 0..instance_count);
        }
        self.queue.submit(std::iter::once(encoder.finish()));

        if let Some(frame) = &mut self.frame {
            frame.clear = None;
        }
        Ok(())
    }
}
