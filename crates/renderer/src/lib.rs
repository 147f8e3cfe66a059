//! Renderer: wgpu init + depth + textured OBJ meshes under a fly camera.
//! wgpu = 26.x, winit = 0.30.x

pub mod gpu_mesh;
pub mod texture;

use std::num::NonZeroU64;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use asset::Mesh;
use bytemuck::{Pod, Zeroable};
use corelib::{Mat4, camera::FlyCamera, scene::Scene};
use wgpu::{
    BindGroup, BindGroupLayout, BindGroupLayoutDescriptor, BindGroupLayoutEntry, BindingType,
    BlendState, Buffer, BufferBindingType, BufferDescriptor, BufferUsages, ColorTargetState,
    ColorWrites, CommandEncoderDescriptor, DepthBiasState, DepthStencilState, Device,
    DeviceDescriptor, Extent3d, Features, FragmentState, Instance, InstanceDescriptor, Limits,
    LoadOp, Operations, PipelineLayoutDescriptor, PowerPreference, PresentMode, Queue,
    RenderPassColorAttachment, RenderPassDescriptor, RenderPipeline, RenderPipelineDescriptor,
    Sampler, ShaderModuleDescriptor, ShaderSource, ShaderStages, StoreOp, Surface,
    SurfaceConfiguration, SurfaceError, TextureDescriptor, TextureDimension, TextureFormat,
    TextureUsages, TextureView, TextureViewDescriptor, VertexState,
};
use winit::{dpi::PhysicalSize, window::Window};

use gpu_mesh::{GpuMesh, GpuVertex};
use texture::{TextureRegistry, TextureUploader};

/// Per-object UBO slot, addressed with a dynamic offset.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct ObjectUniform {
    mvp: [[f32; 4]; 4],
    model: [[f32; 4]; 4],
}

const OBJECT_UNIFORM_SIZE: u64 = std::mem::size_of::<ObjectUniform>() as u64;
const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float;
const INITIAL_OBJECT_CAPACITY: u64 = 16;

pub struct GpuState {
    // Surface
    surface: Surface<'static>,
    surface_config: SurfaceConfiguration,

    // Device/queue
    device: Device,
    queue: Queue,

    // Pipeline
    pipeline: RenderPipeline,
    object_bgl: BindGroupLayout,
    material_bgl: BindGroupLayout,
    sampler: Sampler,

    // Per-object uniforms
    object_buf: Buffer,
    object_bg: BindGroup,
    object_stride: u64,
    object_capacity: u64,

    // Resources
    meshes: Vec<GpuMesh>,
    textures: TextureRegistry,

    // Depth
    depth_view: TextureView,

    // Size cache
    width: u32,
    height: u32,
}

impl GpuState {
    /// Create GPU state bound to an Arc<Window>. `shader_src` is WGSL text
    /// loaded by the caller.
    pub async fn new(
        window: Arc<Window>,
        backends: wgpu::Backends,
        shader_src: &str,
    ) -> Result<Self> {
        let PhysicalSize { width, height } = window.inner_size();
        let width = width.max(1);
        let height = height.max(1);

        // Instance & surface
        let instance = Instance::new(&InstanceDescriptor {
            backends,
            ..Default::default()
        });
        let surface: Surface<'static> = instance
            .create_surface(window.clone())
            .context("create_surface failed")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| anyhow!("No suitable GPU adapter: {e}"))?;
        log::info!("GPU adapter: {:?}", adapter.get_info());

        let (device, queue) = adapter
            .request_device(&DeviceDescriptor {
                label: Some("psxview Device"),
                required_features: Features::empty(),
                required_limits: Limits::downlevel_webgl2_defaults()
                    .using_resolution(adapter.limits()),
                memory_hints: Default::default(),
                trace: Default::default(),
            })
            .await
            .context("request_device failed")?;

        // Surface format (prefer sRGB)
        let caps = surface.get_capabilities(&adapter);
        let surface_format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| anyhow!("Surface reports no supported formats"))?;

        let surface_config = SurfaceConfiguration {
            usage: TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: PresentMode::AutoVsync,
            alpha_mode: caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let depth_view = create_depth_view(&device, &surface_config);

        // ==== Shaders ====
        let shader = device.create_shader_module(ShaderModuleDescriptor {
            label: Some("Mesh WGSL"),
            source: ShaderSource::Wgsl(shader_src.into()),
        });

        // ==== Bind group layouts ====
        let object_bgl = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("Object BGL"),
            entries: &[BindGroupLayoutEntry {
                binding: 0,
                visibility: ShaderStages::VERTEX,
                ty: BindingType::Buffer {
                    ty: BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(OBJECT_UNIFORM_SIZE),
                },
                count: None,
            }],
        });
        let material_bgl = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("Material BGL"),
            entries: &[
                BindGroupLayoutEntry {
                    binding: 0,
                    visibility: ShaderStages::FRAGMENT,
                    ty: BindingType::Buffer {
                        ty: BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                BindGroupLayoutEntry {
                    binding: 1,
                    visibility: ShaderStages::FRAGMENT,
                    ty: BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    },
                    count: None,
                },
                BindGroupLayoutEntry {
                    binding: 2,
                    visibility: ShaderStages::FRAGMENT,
                    ty: BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Diffuse sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        // ==== Pipeline ====
        let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("Mesh PipelineLayout"),
            bind_group_layouts: &[&object_bgl, &material_bgl],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some("Mesh Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[GpuVertex::LAYOUT],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(ColorTargetState {
                    format: surface_format,
                    blend: Some(BlendState::ALPHA_BLENDING),
                    write_mask: ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            // OBJ winding is not guaranteed; draw both sides.
            primitive: wgpu::PrimitiveState {
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let object_stride = align_to(
            OBJECT_UNIFORM_SIZE,
            device.limits().min_uniform_buffer_offset_alignment as u64,
        );
        let (object_buf, object_bg) =
            create_object_buffer(&device, &object_bgl, object_stride, INITIAL_OBJECT_CAPACITY);

        let textures = TextureRegistry::new(&device, &queue);

        log::info!(
            "GPU ready: {}x{}, surface format {:?}",
            width,
            height,
            surface_format
        );

        Ok(Self {
            surface,
            surface_config,
            device,
            queue,
            pipeline,
            object_bgl,
            material_bgl,
            sampler,
            object_buf,
            object_bg,
            object_stride,
            object_capacity: INITIAL_OBJECT_CAPACITY,
            meshes: Vec::new(),
            textures,
            depth_view,
            width,
            height,
        })
    }

    /// Texture allocator for `asset::load_model`.
    pub fn texture_uploader(&mut self) -> TextureUploader<'_> {
        TextureUploader {
            device: &self.device,
            queue: &self.queue,
            registry: &mut self.textures,
        }
    }

    /// Upload a parsed mesh; returns the slot scene objects refer to.
    pub fn add_mesh(&mut self, mesh: &Mesh) -> Result<usize> {
        let view = self.textures.view(mesh.diffuse_tex);
        let gpu = GpuMesh::upload(&self.device, &self.material_bgl, mesh, view, &self.sampler)?;
        self.meshes.push(gpu);
        Ok(self.meshes.len() - 1)
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Resize: reconfigure surface & recreate depth view.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
        self.surface_config.width = self.width;
        self.surface_config.height = self.height;
        self.surface.configure(&self.device, &self.surface_config);
        self.depth_view = create_depth_view(&self.device, &self.surface_config);
    }

    /// Render one frame: upload per-object MVPs, clear, draw visible objects.
    pub fn render(&mut self, camera: &FlyCamera, scene: &Scene) -> Result<(), SurfaceError> {
        let view_proj = camera.proj_view(self.aspect());
        let draws: Vec<(usize, Mat4)> = scene
            .visible()
            .filter(|(_, obj, _)| obj.mesh < self.meshes.len())
            .map(|(_, obj, model)| (obj.mesh, model))
            .collect();
        self.write_object_uniforms(view_proj, &draws);

        // --- frame & pass
        let frame = self.surface.get_current_texture()?;
        let view = frame.texture.create_view(&Default::default());

        let mut encoder = self
            .device
            .create_command_encoder(&CommandEncoderDescriptor {
                label: Some("MainEncoder"),
            });

        {
            let mut rpass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("MainPass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(wgpu::Color {
                            r: 0.1,
                            g: 0.1,
                            b: 0.1,
                            a: 1.0,
                        }),
                        store: StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(Operations {
                        load: LoadOp::Clear(1.0),
                        store: StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            rpass.set_pipeline(&self.pipeline);
            for (i, (mesh_slot, _)) in draws.iter().enumerate() {
                let mesh = &self.meshes[*mesh_slot];
                let offset = (i as u64 * self.object_stride) as u32;
                rpass.set_bind_group(0, &self.object_bg, &[offset]);
                rpass.set_bind_group(1, &mesh.material_bg, &[]);
                rpass.set_vertex_buffer(0, mesh.vertex_buf.slice(..));
                rpass.set_index_buffer(mesh.index_buf.slice(..), wgpu::IndexFormat::Uint32);
                rpass.draw_indexed(0..mesh.index_count, 0, 0..1);
            }
        }

        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }

    pub fn is_surface_lost(err: &SurfaceError) -> bool {
        matches!(err, SurfaceError::Lost | SurfaceError::Outdated)
    }

    pub fn recreate_surface(&mut self) {
        self.resize(self.width, self.height);
    }

    fn write_object_uniforms(&mut self, view_proj: Mat4, draws: &[(usize, Mat4)]) {
        if draws.is_empty() {
            return;
        }
        let needed = draws.len() as u64;
        if needed > self.object_capacity {
            let capacity = needed.next_power_of_two();
            let (buf, bg) =
                create_object_buffer(&self.device, &self.object_bgl, self.object_stride, capacity);
            self.object_buf = buf;
            self.object_bg = bg;
            self.object_capacity = capacity;
            log::debug!("Object UBO grown to {} slots", capacity);
        }

        let stride = self.object_stride as usize;
        let mut bytes = vec![0u8; draws.len() * stride];
        for (i, (_, model)) in draws.iter().enumerate() {
            let slot = ObjectUniform {
                mvp: (view_proj * *model).to_cols_array_2d(),
                model: model.to_cols_array_2d(),
            };
            let start = i * stride;
            bytes[start..start + OBJECT_UNIFORM_SIZE as usize]
                .copy_from_slice(bytemuck::bytes_of(&slot));
        }
        self.queue.write_buffer(&self.object_buf, 0, &bytes);
    }
}

fn align_to(size: u64, alignment: u64) -> u64 {
    let alignment = alignment.max(1);
    size.div_ceil(alignment) * alignment
}

fn create_object_buffer(
    device: &Device,
    layout: &BindGroupLayout,
    stride: u64,
    capacity: u64,
) -> (Buffer, BindGroup) {
    let buf = device.create_buffer(&BufferDescriptor {
        label: Some("Object UBO"),
        size: stride * capacity,
        usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Object BG"),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: &buf,
                offset: 0,
                size: NonZeroU64::new(OBJECT_UNIFORM_SIZE),
            }),
        }],
    });
    (buf, bg)
}

/// Create a depth texture view matching the surface config.
fn create_depth_view(device: &Device, sc: &SurfaceConfiguration) -> TextureView {
    let tex = device.create_texture(&TextureDescriptor {
        label: Some("DepthTex"),
        size: Extent3d {
            width: sc.width.max(1),
            height: sc.height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    tex.create_view(&TextureViewDescriptor::default())
}
