use wgpu::*;

use crate::config::SandboxConfig;
use crate::controller::Sandbox;
use crate::model::world::block::hex_to_linear_rgba;
use crate::view::gpu_init::GpuContext;
use crate::view::mesh::{Mesh, MeshBuffer, Vertex};

pub const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float;

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightingUniform {
    pub sun_dir: [f32; 3],
    pub sun_intensity: f32,
    pub ambient: f32,
    pub _pad1: f32,
    pub _pad2: f32,
    pub _pad3: f32,
}

impl LightingUniform {
    /// Fixed ambient term plus one directional light aimed at the origin.
    pub fn from_config(config: &SandboxConfig) -> Self {
        let sun_dir = config.sun_position.normalize_or_zero();
        Self {
            sun_dir: sun_dir.to_array(),
            sun_intensity: config.sun_intensity,
            ambient: config.ambient_intensity,
            _pad1: 0.0,
            _pad2: 0.0,
            _pad3: 0.0,
        }
    }
}

/// egui output tessellated for one frame.
pub struct UiFrame {
    pub primitives: Vec<egui::ClippedPrimitive>,
    pub textures_delta: egui::TexturesDelta,
    pub pixels_per_point: f32,
}

pub struct CameraResources {
    pub camera_buffer: Buffer,
    pub lighting_buffer: Buffer,
    pub bind_group_layout: BindGroupLayout,
    pub camera_bind_group: BindGroup,
}

pub fn create_depth_texture(device: &Device, width: u32, height: u32) -> (Texture, TextureView) {
    let depth_texture = device.create_texture(&TextureDescriptor {
        label: Some("depth_texture"),
        size: Extent3d { width: width.max(1), height: height.max(1), depth_or_array_layers: 1 },
        mip_level_count: 1,
        sample_count: 1,
        dimension: TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let depth_view = depth_texture.create_view(&TextureViewDescriptor::default());
    (depth_texture, depth_view)
}

pub fn create_camera_resources(device: &Device) -> CameraResources {
    let camera_buffer = device.create_buffer(&BufferDescriptor {
        label: Some("camera_buffer"),
        size: std::mem::size_of::<CameraUniform>() as BufferAddress,
        usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let lighting_buffer = device.create_buffer(&BufferDescriptor {
        label: Some("lighting_buffer"),
        size: std::mem::size_of::<LightingUniform>() as BufferAddress,
        usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let uniform_entry = |binding: u32, visibility: ShaderStages| BindGroupLayoutEntry {
        binding,
        visibility,
        ty: BindingType::Buffer {
            ty: BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    };

    let bind_group_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
        label: Some("camera_bind_group_layout"),
        entries: &[
            uniform_entry(0, ShaderStages::VERTEX),
            uniform_entry(1, ShaderStages::FRAGMENT),
        ],
    });

    let camera_bind_group = device.create_bind_group(&BindGroupDescriptor {
        label: Some("camera_bind_group"),
        layout: &bind_group_layout,
        entries: &[
            BindGroupEntry { binding: 0, resource: camera_buffer.as_entire_binding() },
            BindGroupEntry { binding: 1, resource: lighting_buffer.as_entire_binding() },
        ],
    });

    CameraResources { camera_buffer, lighting_buffer, bind_group_layout, camera_bind_group }
}

pub fn create_block_pipeline(
    device: &Device,
    format: TextureFormat,
    bind_group_layout: &BindGroupLayout,
) -> RenderPipeline {
    let shader = device.create_shader_module(ShaderModuleDescriptor {
        label: Some("block_shader"),
        source: ShaderSource::Wgsl(include_str!("shaders/block.wgsl").into()),
    });

    let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
        label: Some("block_pipeline_layout"),
        bind_group_layouts: &[bind_group_layout],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&RenderPipelineDescriptor {
        label: Some("block_pipeline"),
        layout: Some(&pipeline_layout),
        vertex: VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[Vertex::layout()],
            compilation_options: Default::default(),
        },
        fragment: Some(FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(ColorTargetState { format, blend: Some(BlendState::REPLACE), write_mask: ColorWrites::ALL })],
            compilation_options: Default::default(),
        }),
        primitive: PrimitiveState {
            topology: PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: FrontFace::Ccw,
            cull_mode: Some(Face::Back),
            polygon_mode: PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: CompareFunction::Less,
            stencil: StencilState::default(),
            bias: DepthBiasState::default(),
        }),
        multisample: MultisampleState { count: 1, mask: !0, alpha_to_coverage_enabled: false },
        multiview: None,
        cache: None,
    })
}

///////////////////////////////////////////////////////////////////////////////

/// Everything needed to draw the sandbox: world mesh, uniforms, depth and the egui overlay.
pub struct RenderState {
    pub width: u32,
    pub height: u32,
    clear_color: Color,

    pipeline: RenderPipeline,
    camera: CameraResources,
    depth_view: TextureView,

    world_mesh: Option<MeshBuffer>,
    /// `World::revision` the current mesh was built from.
    mesh_revision: Option<u64>,

    egui_renderer: egui_wgpu::Renderer,
}

impl RenderState {
    pub fn new(gpu: &GpuContext, config: &SandboxConfig) -> Self {
        let device = gpu.device.as_ref();
        let (width, height) = (gpu.config.width, gpu.config.height);

        let camera = create_camera_resources(device);
        gpu.queue.write_buffer(&camera.lighting_buffer, 0, bytemuck::bytes_of(&LightingUniform::from_config(config)));

        let pipeline = create_block_pipeline(device, gpu.format, &camera.bind_group_layout);
        let (_, depth_view) = create_depth_texture(device, width, height);

        let [r, g, b, a] = hex_to_linear_rgba(config.sky_color);
        let egui_renderer = egui_wgpu::Renderer::new(device, gpu.format, egui_wgpu::RendererOptions::default());

        Self {
            width,
            height,
            clear_color: Color { r: r as f64, g: g as f64, b: b as f64, a: a as f64 },
            pipeline,
            camera,
            depth_view,
            world_mesh: None,
            mesh_revision: None,
            egui_renderer,
        }
    }

    /// Recreate the depth texture to match a new surface size.
    pub fn resize(&mut self, device: &Device, width: u32, height: u32) {
        if width == 0 || height == 0 || (width, height) == (self.width, self.height) {
            return;
        }
        self.width = width;
        self.height = height;
        let (_, depth_view) = create_depth_texture(device, width, height);
        self.depth_view = depth_view;
    }

    /// Upload the camera matrix and rebuild the world mesh if blocks changed.
    pub fn sync(&mut self, device: &Device, queue: &Queue, sandbox: &Sandbox) {
        let uniform = CameraUniform { view_proj: sandbox.camera.view_proj().to_cols_array_2d() };
        queue.write_buffer(&self.camera.camera_buffer, 0, bytemuck::bytes_of(&uniform));

        let revision = sandbox.world.revision();
        if self.mesh_revision != Some(revision) {
            let mesh = Mesh::from_world(&sandbox.world);
            self.world_mesh = (!mesh.is_empty()).then(|| mesh.upload(device));
            self.mesh_revision = Some(revision);
            tracing::debug!("rebuilt world mesh: {} blocks, revision {}", sandbox.world.len(), revision);
        }
    }

    pub fn draw_frame(&mut self, gpu: &GpuContext, ui: Option<UiFrame>) -> Result<(), SurfaceError> {
        let device = gpu.device.as_ref();
        let queue = gpu.queue.as_ref();

        let frame = match gpu.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(SurfaceError::Lost | SurfaceError::Outdated) => {
                gpu.reconfigure();
                gpu.surface.get_current_texture()?
            }
            Err(e) => return Err(e),
        };

        let view = frame.texture.create_view(&TextureViewDescriptor::default());
        let mut encoder = device.create_command_encoder(&CommandEncoderDescriptor {
            label: Some("encoder"),
        });

        {
            let mut rp = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("world_pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(self.clear_color),
                        store: StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(Operations {
                        load: LoadOp::Clear(1.0),
                        store: StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if let Some(mesh) = &self.world_mesh {
                rp.set_pipeline(&self.pipeline);
                rp.set_bind_group(0, &self.camera.camera_bind_group, &[]);
                rp.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                rp.set_index_buffer(mesh.index_buffer.slice(..), IndexFormat::Uint32);
                rp.draw_indexed(0..mesh.index_count, 0, 0..1);
            }
        }

        let mut ui_commands = Vec::new();
        if let Some(ui) = ui {
            let screen_descriptor = egui_wgpu::ScreenDescriptor {
                size_in_pixels: [self.width, self.height],
                pixels_per_point: ui.pixels_per_point,
            };

            for (id, image_delta) in &ui.textures_delta.set {
                self.egui_renderer.update_texture(device, queue, *id, image_delta);
            }
            ui_commands = self.egui_renderer.update_buffers(
                device,
                queue,
                &mut encoder,
                &ui.primitives,
                &screen_descriptor,
            );

            {
                let egui_pass = encoder.begin_render_pass(&RenderPassDescriptor {
                    label: Some("egui_render_pass"),
                    color_attachments: &[Some(RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: Operations {
                            load: LoadOp::Load,
                            store: StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                });

                self.egui_renderer
                    .render(&mut egui_pass.forget_lifetime(), &ui.primitives, &screen_descriptor);
            }

            for id in &ui.textures_delta.free {
                self.egui_renderer.free_texture(id);
            }
        }

        queue.submit(ui_commands.into_iter().chain(std::iter::once(encoder.finish())));
        frame.present();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_sizes_match_shader() {
        assert_eq!(std::mem::size_of::<CameraUniform>(), 64);
        assert_eq!(std::mem::size_of::<LightingUniform>(), 32);
    }

    #[test]
    fn test_sun_points_from_configured_position() {
        let lighting = LightingUniform::from_config(&SandboxConfig::default());
        let len = lighting.sun_dir.iter().map(|c| c * c).sum::<f32>().sqrt();
        assert!((len - 1.0).abs() < 1e-5);
        assert!(lighting.sun_dir[1] > lighting.sun_dir[0]);
        assert_eq!(lighting.ambient, 0.6);
    }
}
