//! wgpu backend: surface, scene pipelines and the environment texture.

use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use log::{debug, info};
use std::sync::Arc;
use wgpu::util::DeviceExt;
use winit::window::Window;

use super::environment::EnvironmentMap;
use super::passes::{PassKind, PassResolutions, ViewportSize};
use super::post::{PostProcessor, PresentSource, DEPTH_FORMAT, HDR_FORMAT};
use super::{FrameRenderer, FrameSnapshot, RenderError};
use crate::params::SceneParams;
use crate::scene::{icosahedron, Mesh, SceneState, UniformRegistry, Vertex};

/// Sphere shader uniforms (matches `SphereUniforms` in sphere.wgsl)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct SphereGpuUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    pub camera_position: [f32; 4],
    pub input_data: [f32; 4],
    pub output_data: [f32; 4],
    pub base_color: [f32; 4],
    pub emissive: [f32; 4],
    pub params: [f32; 4],
}

impl SphereGpuUniforms {
    pub fn from_frame(scene: &SceneState, uniforms: &UniformRegistry) -> Self {
        let material = &scene.params.sphere;
        let [r, g, b] = material.base_color;
        let [er, eg, eb] = material.emissive_color;
        let model = Mat4::from_scale_rotation_translation(
            glam::Vec3::splat(scene.sphere.scale),
            glam::Quat::IDENTITY,
            scene.sphere.position,
        );

        Self {
            view_proj: scene.camera.view_proj().to_cols_array_2d(),
            model: model.to_cols_array_2d(),
            camera_position: scene.camera.position.extend(1.0).to_array(),
            input_data: uniforms.sphere.input_data.to_array(),
            output_data: uniforms.sphere.output_data.to_array(),
            base_color: [r, g, b, material.metalness],
            emissive: [er, eg, eb, material.emissive_intensity],
            params: [
                uniforms.sphere.time,
                material.roughness,
                if scene.sphere.environment_bound { 1.0 } else { 0.0 },
                0.0,
            ],
        }
    }
}

/// Backdrop shader uniforms (matches `BackdropUniforms` in backdrop.wgsl)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct BackdropGpuUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub params: [f32; 4],
}

impl BackdropGpuUniforms {
    pub fn from_frame(scene: &SceneState, uniforms: &UniformRegistry) -> Self {
        let backdrop = &uniforms.backdrop;
        Self {
            view_proj: scene.camera.view_proj().to_cols_array_2d(),
            params: [
                backdrop.resolution.x,
                backdrop.resolution.y,
                backdrop.rand,
                0.0,
            ],
        }
    }
}

const VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 3] = [
    wgpu::VertexAttribute {
        offset: 0,
        shader_location: 0,
        format: wgpu::VertexFormat::Float32x3,
    },
    wgpu::VertexAttribute {
        offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
        shader_location: 1,
        format: wgpu::VertexFormat::Float32x3,
    },
    wgpu::VertexAttribute {
        offset: std::mem::size_of::<[f32; 6]>() as wgpu::BufferAddress,
        shader_location: 2,
        format: wgpu::VertexFormat::Float32x2,
    },
];

struct MeshBuffers {
    vertex: wgpu::Buffer,
    index: wgpu::Buffer,
    index_count: u32,
}

impl MeshBuffers {
    fn new(device: &wgpu::Device, label: &str, mesh: &Mesh) -> Self {
        let vertex = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex,
            index,
            index_count: mesh.indices.len() as u32,
        }
    }

    fn draw<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>) {
        pass.set_vertex_buffer(0, self.vertex.slice(..));
        pass.set_index_buffer(self.index.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }

    fn destroy(&self) {
        self.vertex.destroy();
        self.index.destroy();
    }
}

/// Everything released on dispose
struct SceneResources {
    sphere_mesh: MeshBuffers,
    backdrop_mesh: MeshBuffers,
    sphere_pipeline: wgpu::RenderPipeline,
    backdrop_pipeline: wgpu::RenderPipeline,
    sphere_uniform_buffer: wgpu::Buffer,
    sphere_bind_group: wgpu::BindGroup,
    backdrop_uniform_buffer: wgpu::Buffer,
    backdrop_bind_group: wgpu::BindGroup,
    environment_layout: wgpu::BindGroupLayout,
    environment_sampler: wgpu::Sampler,
    environment_texture: wgpu::Texture,
    environment_bind_group: wgpu::BindGroup,
    post: PostProcessor,
}

impl SceneResources {
    fn destroy(&self) {
        self.sphere_mesh.destroy();
        self.backdrop_mesh.destroy();
        self.sphere_uniform_buffer.destroy();
        self.backdrop_uniform_buffer.destroy();
        self.environment_texture.destroy();
        self.post.destroy();
    }
}

/// Renderer drawing into a winit window through wgpu
pub struct GpuRenderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    clear_color: wgpu::Color,
    resources: Option<SceneResources>,
}

impl GpuRenderer {
    /// Create the device and every scene resource for `window`
    pub async fn new(
        window: Arc<Window>,
        viewport: ViewportSize,
        params: &SceneParams,
    ) -> Result<Self, RenderError> {
        let (width, height) = viewport.physical();

        // Create wgpu instance
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        // Create surface (window must have 'static lifetime via Arc)
        let surface = instance
            .create_surface(window)
            .map_err(|e| RenderError::Surface(e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RenderError::NoAdapter)?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Main Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await
            .map_err(|e| RenderError::Device(e.to_string()))?;

        // Configure surface
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| RenderError::Surface("surface reports no formats".to_string()))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        info!(
            "GPU ready: {} ({:?}), surface {}x{} {:?}",
            adapter.get_info().name,
            adapter.get_info().backend,
            width,
            height,
            surface_format
        );

        let resolutions = PassResolutions::for_viewport(viewport);
        let resources = SceneResources::new(&device, &queue, surface_format, &resolutions, params);

        let [r, g, b] = params.background;
        Ok(Self {
            surface,
            device,
            queue,
            config,
            clear_color: wgpu::Color {
                r: r as f64,
                g: g as f64,
                b: b as f64,
                a: 1.0,
            },
            resources: Some(resources),
        })
    }

    fn encode_base(
        &self,
        resources: &SceneResources,
        encoder: &mut wgpu::CommandEncoder,
        sphere_visible: bool,
    ) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Base Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: resources.post.scene_view(),
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_color),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: resources.post.depth_view(),
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        // Backdrop shell first, seen from inside
        render_pass.set_pipeline(&resources.backdrop_pipeline);
        render_pass.set_bind_group(0, &resources.backdrop_bind_group, &[]);
        resources.backdrop_mesh.draw(&mut render_pass);

        if sphere_visible {
            render_pass.set_pipeline(&resources.sphere_pipeline);
            render_pass.set_bind_group(0, &resources.sphere_bind_group, &[]);
            render_pass.set_bind_group(1, &resources.environment_bind_group, &[]);
            resources.sphere_mesh.draw(&mut render_pass);
        }
    }
}

impl FrameRenderer for GpuRenderer {
    fn resize(&mut self, resolutions: &PassResolutions) {
        let Some(resources) = self.resources.as_mut() else {
            return;
        };
        let (width, height) = resolutions.drawing;
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        resources.post.resize(&self.device, resolutions);
        debug!("Surface reconfigured to {}x{}", width, height);
    }

    fn bind_environment(&mut self, map: &EnvironmentMap) -> Result<(), RenderError> {
        let max = self.device.limits().max_texture_dimension_2d;
        let Some(resources) = self.resources.as_mut() else {
            return Err(RenderError::Disposed);
        };
        if map.width > max || map.height > max {
            return Err(RenderError::EnvironmentTooLarge {
                width: map.width,
                height: map.height,
                max,
            });
        }

        let texture = create_environment_texture(&self.device, &self.queue, map);
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        resources.environment_bind_group = environment_bind_group(
            &self.device,
            &resources.environment_layout,
            &view,
            &resources.environment_sampler,
        );
        std::mem::replace(&mut resources.environment_texture, texture).destroy();

        info!("Environment map bound ({}x{})", map.width, map.height);
        Ok(())
    }

    fn render(&mut self, frame: &FrameSnapshot<'_>) -> Result<(), RenderError> {
        let Some(resources) = self.resources.as_ref() else {
            return Err(RenderError::Disposed);
        };

        self.queue.write_buffer(
            &resources.sphere_uniform_buffer,
            0,
            bytemuck::bytes_of(&SphereGpuUniforms::from_frame(frame.scene, frame.uniforms)),
        );
        self.queue.write_buffer(
            &resources.backdrop_uniform_buffer,
            0,
            bytemuck::bytes_of(&BackdropGpuUniforms::from_frame(frame.scene, frame.uniforms)),
        );

        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(e @ (wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                self.surface.configure(&self.device, &self.config);
                return Err(e.into());
            }
            Err(e) => return Err(e.into()),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        let mut source = PresentSource::Scene;
        for pass in frame.passes {
            match pass {
                PassKind::Base => {
                    self.encode_base(resources, &mut encoder, frame.scene.sphere.visible)
                }
                PassKind::Bloom => resources.post.encode_bloom(&mut encoder),
                PassKind::Fxaa => {
                    resources.post.encode_fxaa(&mut encoder);
                    source = PresentSource::Antialiased;
                }
            }
        }
        resources.post.encode_present(&mut encoder, &view, source);

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    fn dispose(&mut self) {
        if let Some(resources) = self.resources.take() {
            resources.destroy();
            info!("GPU resources released");
        }
    }
}

impl SceneResources {
    fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        resolutions: &PassResolutions,
        params: &SceneParams,
    ) -> Self {
        let sphere_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Sphere Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/sphere.wgsl").into()),
        });
        let backdrop_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Backdrop Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/backdrop.wgsl").into()),
        });

        let sphere_mesh = MeshBuffers::new(
            device,
            "Sphere Mesh",
            &icosahedron(params.sphere.radius, params.sphere.detail),
        );
        let backdrop_mesh = MeshBuffers::new(
            device,
            "Backdrop Mesh",
            &icosahedron(params.backdrop.radius, params.backdrop.detail),
        );

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Scene Uniform Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let sphere_uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Sphere Uniform Buffer"),
            contents: bytemuck::bytes_of(&SphereGpuUniforms::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let sphere_bind_group = uniform_bind_group(
            device,
            "Sphere Bind Group",
            &uniform_layout,
            &sphere_uniform_buffer,
        );

        let backdrop_uniform_buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Backdrop Uniform Buffer"),
                contents: bytemuck::bytes_of(&BackdropGpuUniforms::zeroed()),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        let backdrop_bind_group = uniform_bind_group(
            device,
            "Backdrop Bind Group",
            &uniform_layout,
            &backdrop_uniform_buffer,
        );

        // Rgba32Float is not filterable without an extra feature
        let environment_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Environment Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: false },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::NonFiltering),
                    count: None,
                },
            ],
        });
        let environment_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Environment Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        // 1x1 black placeholder until the real map arrives
        let placeholder = EnvironmentMap {
            width: 1,
            height: 1,
            texels: vec![[0.0, 0.0, 0.0, 1.0]],
        };
        let environment_texture = create_environment_texture(device, queue, &placeholder);
        let environment_view =
            environment_texture.create_view(&wgpu::TextureViewDescriptor::default());
        let environment_bind_group = environment_bind_group(
            device,
            &environment_layout,
            &environment_view,
            &environment_sampler,
        );

        let depth_stencil = || wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        };

        let sphere_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Sphere Pipeline Layout"),
            bind_group_layouts: &[&uniform_layout, &environment_layout],
            push_constant_ranges: &[],
        });
        // The shader rebuilds positions from uv, so winding is not reliable
        let sphere_pipeline = scene_pipeline(
            device,
            "Sphere Pipeline",
            &sphere_pipeline_layout,
            &sphere_shader,
            None,
            depth_stencil(),
        );

        let backdrop_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Backdrop Pipeline Layout"),
                bind_group_layouts: &[&uniform_layout],
                push_constant_ranges: &[],
            });
        let backdrop_pipeline = scene_pipeline(
            device,
            "Backdrop Pipeline",
            &backdrop_pipeline_layout,
            &backdrop_shader,
            Some(wgpu::Face::Front),
            depth_stencil(),
        );

        let post = PostProcessor::new(device, surface_format, resolutions, params.bloom.clone());

        Self {
            sphere_mesh,
            backdrop_mesh,
            sphere_pipeline,
            backdrop_pipeline,
            sphere_uniform_buffer,
            sphere_bind_group,
            backdrop_uniform_buffer,
            backdrop_bind_group,
            environment_layout,
            environment_sampler,
            environment_texture,
            environment_bind_group,
            post,
        }
    }
}

fn uniform_bind_group(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::BindGroupLayout,
    buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }],
    })
}

fn environment_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    view: &wgpu::TextureView,
    sampler: &wgpu::Sampler,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Environment Bind Group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}

fn create_environment_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    map: &EnvironmentMap,
) -> wgpu::Texture {
    let size = wgpu::Extent3d {
        width: map.width,
        height: map.height,
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Environment Texture"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba32Float,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    queue.write_texture(
        wgpu::ImageCopyTexture {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        map.bytes(),
        wgpu::ImageDataLayout {
            offset: 0,
            bytes_per_row: Some(map.width * std::mem::size_of::<[f32; 4]>() as u32),
            rows_per_image: Some(map.height),
        },
        size,
    );

    texture
}

fn scene_pipeline(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    cull_mode: Option<wgpu::Face>,
    depth_stencil: wgpu::DepthStencilState,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &VERTEX_ATTRIBUTES,
            }],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: HDR_FORMAT,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(depth_stencil),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::build_scene;

    #[test]
    fn test_uniform_sizes_match_wgsl_layout() {
        assert_eq!(std::mem::size_of::<SphereGpuUniforms>(), 224);
        assert_eq!(std::mem::size_of::<BackdropGpuUniforms>(), 80);
        assert_eq!(std::mem::size_of::<Vertex>(), 32);
    }

    #[test]
    fn test_sphere_uniforms_carry_material_and_flags() {
        let (mut scene, mut uniforms) = build_scene(SceneParams::default());
        uniforms.sphere.time = 0.25;
        scene.sphere.scale = 1.1;
        scene.reveal_sphere(true);

        let gpu = SphereGpuUniforms::from_frame(&scene, &uniforms);
        assert_eq!(gpu.params[0], 0.25);
        assert_eq!(gpu.params[1], 0.1);
        assert_eq!(gpu.params[2], 1.0);
        assert_eq!(gpu.base_color[3], 0.5);
        assert_eq!(gpu.emissive[3], 1.5);
        assert!((gpu.model[0][0] - 1.1).abs() < 1e-6);
    }

    #[test]
    fn test_backdrop_uniforms_pack_resolution_and_seed() {
        let (scene, mut uniforms) = build_scene(SceneParams::default());
        uniforms.backdrop.resolution = glam::Vec2::new(640.0, 480.0);
        uniforms.backdrop.rand = 42.0;

        let gpu = BackdropGpuUniforms::from_frame(&scene, &uniforms);
        assert_eq!(gpu.params, [640.0, 480.0, 42.0, 0.0]);
    }
}
