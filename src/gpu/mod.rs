//! wgpu renderer for the point field.
//!
//! [`GpuState`] owns the surface, one instanced point-sprite pipeline,
//! and the vertex buffer of the installed field. Installing a new field
//! destroys the previous buffer first.

#[cfg(feature = "egui")]
mod egui_integration;
mod shader;
mod slot;

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use log::{debug, info, warn};
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::camera::CameraPose;
use crate::context::FieldSink;
use crate::error::GpuError;
use crate::galaxy::{PointField, PointVertex};
use crate::textures::SpriteTexture;
use crate::visuals::{BlendMode, PointMaterial};

#[cfg(feature = "egui")]
pub use egui_integration::{EguiFrameOutput, EguiIntegration};
pub use shader::SHADER_SOURCE;
pub use slot::{BufferSlot, Release};

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.0,
    g: 0.0,
    b: 0.0,
    a: 1.0,
};

const VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    view: [[f32; 4]; 4],
    proj: [[f32; 4]; 4],
    point_size: f32,
    size_attenuation: f32,
    _padding: [f32; 2],
}

pub struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    shader: wgpu::ShaderModule,
    pipeline_layout: wgpu::PipelineLayout,
    pipeline: wgpu::RenderPipeline,
    pipeline_blend: BlendMode,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    sprite_bind_group: wgpu::BindGroup,
    points: BufferSlot<wgpu::Buffer>,
    material: PointMaterial,
    #[cfg(feature = "egui")]
    egui: EguiIntegration,
}

impl GpuState {
    pub async fn new(
        window: Arc<Window>,
        sprite: &SpriteTexture,
        material: PointMaterial,
    ) -> Result<Self, GpuError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;

        let adapter_info = adapter.get_info();
        info!("Using GPU adapter {} ({:?})", adapter_info.name, adapter_info.backend);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(GpuError::NoAdapter)?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Uniform Buffer"),
            size: std::mem::size_of::<Uniforms>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Uniform Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Uniform Bind Group"),
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let (sprite_bind_group_layout, sprite_bind_group) =
            create_sprite_bindings(&device, &queue, sprite);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Point Shader"),
            source: wgpu::ShaderSource::Wgsl(SHADER_SOURCE.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Point Pipeline Layout"),
            bind_group_layouts: &[&uniform_bind_group_layout, &sprite_bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = create_point_pipeline(
            &device,
            &pipeline_layout,
            &shader,
            config.format,
            material.blend_mode,
        );

        #[cfg(feature = "egui")]
        let egui = EguiIntegration::new(&device, config.format, &window);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            shader,
            pipeline_layout,
            pipeline,
            pipeline_blend: material.blend_mode,
            uniform_buffer,
            uniform_bind_group,
            sprite_bind_group,
            points: BufferSlot::new(),
            material,
            #[cfg(feature = "egui")]
            egui,
        })
    }

    #[cfg(feature = "egui")]
    pub fn egui(&self) -> &EguiIntegration {
        &self.egui
    }

    #[cfg(feature = "egui")]
    pub fn egui_mut(&mut self) -> &mut EguiIntegration {
        &mut self.egui
    }

    /// Number of points currently uploaded.
    pub fn installed_points(&self) -> u32 {
        self.points.count()
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Reconfigure the surface at its current size.
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    fn update_uniforms(&mut self, pose: &CameraPose) {
        let aspect = self.config.width as f32 / self.config.height.max(1) as f32;
        let uniforms = Uniforms {
            view: pose.view_matrix().to_cols_array_2d(),
            proj: CameraPose::projection(aspect).to_cols_array_2d(),
            point_size: self.material.size,
            size_attenuation: if self.material.size_attenuation { 1.0 } else { 0.0 },
            _padding: [0.0; 2],
        };
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
    }

    /// Draw the installed field (and the panel, when given) from `pose`.
    pub fn render(
        &mut self,
        pose: &CameraPose,
        #[cfg(feature = "egui")] ui: Option<&EguiFrameOutput>,
    ) -> Result<(), wgpu::SurfaceError> {
        self.update_uniforms(pose);

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        #[allow(unused_mut)]
        let mut extra_commands: Vec<wgpu::CommandBuffer> = Vec::new();

        #[cfg(feature = "egui")]
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: ui.map_or(1.0, |u| u.pixels_per_point),
        };
        #[cfg(feature = "egui")]
        if let Some(ui) = ui {
            extra_commands = self.egui.prepare(
                &self.device,
                &self.queue,
                &mut encoder,
                ui,
                &screen_descriptor,
            );
        }

        {
            let mut render_pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Render Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                })
                .forget_lifetime();

            if let Some((buffer, count)) = self.points.drawable() {
                render_pass.set_pipeline(&self.pipeline);
                render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
                render_pass.set_bind_group(1, &self.sprite_bind_group, &[]);
                render_pass.set_vertex_buffer(0, buffer.slice(..));
                render_pass.draw(0..6, 0..count);
            }

            #[cfg(feature = "egui")]
            if let Some(ui) = ui {
                self.egui.paint(&mut render_pass, ui, &screen_descriptor);
            }
        }

        self.queue
            .submit(extra_commands.into_iter().chain(std::iter::once(encoder.finish())));
        output.present();

        #[cfg(feature = "egui")]
        if let Some(ui) = ui {
            self.egui.cleanup(ui);
        }

        Ok(())
    }
}

impl FieldSink for GpuState {
    fn install_field(&mut self, field: &PointField, material: &PointMaterial) {
        let mut vertices = field.vertices();
        let fitting = points_within_limit(vertices.len(), self.device.limits().max_buffer_size);
        if fitting < vertices.len() {
            warn!(
                "{} points exceed the GPU buffer limit, drawing the first {}",
                vertices.len(),
                fitting
            );
            vertices.truncate(fitting);
        }

        let device = &self.device;
        self.points.refill(vertices.len() as u32, || {
            if vertices.is_empty() {
                // Zero-sized vertex buffers can't be sliced; keep one dummy slot.
                device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some("Point Buffer"),
                    size: std::mem::size_of::<PointVertex>() as wgpu::BufferAddress,
                    usage: wgpu::BufferUsages::VERTEX,
                    mapped_at_creation: false,
                })
            } else {
                device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Point Buffer"),
                    contents: bytemuck::cast_slice(&vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                })
            }
        });

        if material.blend_mode != self.pipeline_blend {
            self.pipeline = create_point_pipeline(
                &self.device,
                &self.pipeline_layout,
                &self.shader,
                self.config.format,
                material.blend_mode,
            );
            self.pipeline_blend = material.blend_mode;
        }
        self.material = *material;

        debug!(
            "Installed {} points ({} KiB)",
            vertices.len(),
            std::mem::size_of_val(vertices.as_slice()) / 1024
        );
    }
}

/// How many of `len` points fit in one vertex buffer of at most
/// `max_buffer_size` bytes.
fn points_within_limit(len: usize, max_buffer_size: u64) -> usize {
    let stride = std::mem::size_of::<PointVertex>() as u64;
    let max_points = usize::try_from(max_buffer_size / stride).unwrap_or(usize::MAX);
    len.min(max_points)
}

fn create_point_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    blend_mode: BlendMode,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Point Pipeline"),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<PointVertex>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &VERTEX_ATTRIBUTES,
            }],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(blend_mode.to_wgpu_blend_state()),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
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
        // Points never write depth
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

fn create_sprite_bindings(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    sprite: &SpriteTexture,
) -> (wgpu::BindGroupLayout, wgpu::BindGroup) {
    let size = wgpu::Extent3d {
        width: sprite.width,
        height: sprite.height,
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Sprite Texture"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &sprite.data,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(sprite.bytes_per_row()),
            rows_per_image: Some(sprite.height),
        },
        size,
    );
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("Sprite Sampler"),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        ..Default::default()
    });

    let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Sprite Bind Group Layout"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Sprite Bind Group"),
        layout: &layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&sampler),
            },
        ],
    });
    (layout, bind_group)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniforms_are_16_byte_aligned() {
        assert_eq!(std::mem::size_of::<Uniforms>() % 16, 0);
        assert_eq!(std::mem::size_of::<Uniforms>(), 144);
    }

    #[test]
    fn test_points_within_default_buffer_limit() {
        let limit = wgpu::Limits::default().max_buffer_size;
        let stride = std::mem::size_of::<PointVertex>() as u64;
        let max_points = (limit / stride) as usize;

        assert_eq!(points_within_limit(100_000, limit), 100_000);
        assert_eq!(points_within_limit(0, limit), 0);
        assert_eq!(points_within_limit(max_points, limit), max_points);
        assert_eq!(points_within_limit(20_000_000, limit), max_points);
        assert!(max_points as u64 * stride <= limit);
    }

    #[test]
    fn test_vertex_attributes_match_layout() {
        assert_eq!(VERTEX_ATTRIBUTES[0].offset, 0);
        assert_eq!(VERTEX_ATTRIBUTES[1].offset, 12);
        assert_eq!(VERTEX_ATTRIBUTES[1].shader_location, 1);
    }
}
