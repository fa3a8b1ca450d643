//! Post-processing on the HDR scene target: bloom, optional FXAA, present.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use super::passes::{PassResolutions, BLOOM_FACTORS, BLOOM_KERNEL_RADII, BLOOM_MIP_COUNT};
use crate::params::BloomParams;

/// Format of the scene and intermediate colour targets
pub const HDR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Luminosity high-pass edge softness
const HIGH_PASS_SMOOTH_WIDTH: f32 = 0.01;

const FULLSCREEN_WGSL: &str = include_str!("shaders/fullscreen.wgsl");

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct LuminosityUniforms {
    threshold: f32,
    smooth_width: f32,
    _padding: [f32; 2],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct BlurUniforms {
    direction: [f32; 2],
    inv_size: [f32; 2],
    kernel_radius: f32,
    sigma: f32,
    _padding: [f32; 2],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct CompositeUniforms {
    factors: [f32; 4],
    last_factor: f32,
    strength: f32,
    radius: f32,
    _padding: f32,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct FxaaUniforms {
    texel: [f32; 2],
    _padding: [f32; 2],
}

/// Which image the present pass copies to the surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentSource {
    Scene,
    Antialiased,
}

/// Texture plus its default view
pub struct RenderTarget {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl RenderTarget {
    fn new(
        device: &wgpu::Device,
        label: &str,
        (width, height): (u32, u32),
        format: wgpu::TextureFormat,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }
}

/// Layouts and pipelines that survive a resize
struct PostPipelines {
    sampler: wgpu::Sampler,
    single_layout: wgpu::BindGroupLayout,
    composite_layout: wgpu::BindGroupLayout,
    luminosity: wgpu::RenderPipeline,
    blur: wgpu::RenderPipeline,
    composite: wgpu::RenderPipeline,
    fxaa: wgpu::RenderPipeline,
    present: wgpu::RenderPipeline,
}

/// Size-dependent targets and the bind groups reading them
struct PostTargets {
    scene: RenderTarget,
    depth: RenderTarget,
    bright: RenderTarget,
    horizontal: Vec<RenderTarget>,
    vertical: Vec<RenderTarget>,
    antialiased: RenderTarget,
    buffers: Vec<wgpu::Buffer>,
    luminosity_group: wgpu::BindGroup,
    blur_groups: Vec<(wgpu::BindGroup, wgpu::BindGroup)>,
    composite_group: wgpu::BindGroup,
    fxaa_group: wgpu::BindGroup,
    present_scene_group: wgpu::BindGroup,
    present_antialiased_group: wgpu::BindGroup,
}

/// Bloom mip chain, FXAA and the final copy onto the swapchain
pub struct PostProcessor {
    pipelines: PostPipelines,
    targets: PostTargets,
    bloom: BloomParams,
}

impl PostProcessor {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        resolutions: &PassResolutions,
        bloom: BloomParams,
    ) -> Self {
        let pipelines = PostPipelines::new(device, surface_format);
        let targets = PostTargets::new(device, &pipelines, resolutions, &bloom);
        Self {
            pipelines,
            targets,
            bloom,
        }
    }

    /// Rebuild every size-dependent target
    pub fn resize(&mut self, device: &wgpu::Device, resolutions: &PassResolutions) {
        let next = PostTargets::new(device, &self.pipelines, resolutions, &self.bloom);
        std::mem::replace(&mut self.targets, next).destroy();
    }

    pub fn scene_view(&self) -> &wgpu::TextureView {
        &self.targets.scene.view
    }

    pub fn depth_view(&self) -> &wgpu::TextureView {
        &self.targets.depth.view
    }

    /// High pass, blur each level, add the levels back onto the scene
    pub fn encode_bloom(&self, encoder: &mut wgpu::CommandEncoder) {
        let p = &self.pipelines;
        let t = &self.targets;

        draw_fullscreen(
            encoder,
            "Bloom High Pass",
            &t.bright.view,
            wgpu::LoadOp::Clear(wgpu::Color::BLACK),
            &p.luminosity,
            &t.luminosity_group,
        );

        for (level, (h_group, v_group)) in t.blur_groups.iter().enumerate() {
            draw_fullscreen(
                encoder,
                "Bloom Blur Horizontal",
                &t.horizontal[level].view,
                wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                &p.blur,
                h_group,
            );
            draw_fullscreen(
                encoder,
                "Bloom Blur Vertical",
                &t.vertical[level].view,
                wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                &p.blur,
                v_group,
            );
        }

        draw_fullscreen(
            encoder,
            "Bloom Composite",
            &t.scene.view,
            wgpu::LoadOp::Load,
            &p.composite,
            &t.composite_group,
        );
    }

    pub fn encode_fxaa(&self, encoder: &mut wgpu::CommandEncoder) {
        draw_fullscreen(
            encoder,
            "FXAA Pass",
            &self.targets.antialiased.view,
            wgpu::LoadOp::Clear(wgpu::Color::BLACK),
            &self.pipelines.fxaa,
            &self.targets.fxaa_group,
        );
    }

    pub fn encode_present(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        surface_view: &wgpu::TextureView,
        source: PresentSource,
    ) {
        let group = match source {
            PresentSource::Scene => &self.targets.present_scene_group,
            PresentSource::Antialiased => &self.targets.present_antialiased_group,
        };
        draw_fullscreen(
            encoder,
            "Present Pass",
            surface_view,
            wgpu::LoadOp::Clear(wgpu::Color::BLACK),
            &self.pipelines.present,
            group,
        );
    }

    pub fn destroy(&self) {
        self.targets.destroy();
    }
}

impl PostPipelines {
    fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat) -> Self {
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Post Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let single_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Post Single Input Layout"),
            entries: &[texture_entry(0), sampler_entry(1), uniform_entry(2)],
        });

        let composite_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Bloom Composite Layout"),
            entries: &[
                texture_entry(0),
                texture_entry(1),
                texture_entry(2),
                texture_entry(3),
                texture_entry(4),
                sampler_entry(5),
                uniform_entry(6),
            ],
        });

        let additive = wgpu::BlendState {
            color: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::One,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
            alpha: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::Zero,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
        };

        let luminosity = fullscreen_pipeline(
            device,
            "Bloom High Pass Pipeline",
            include_str!("shaders/luminosity.wgsl"),
            &single_layout,
            HDR_FORMAT,
            None,
        );
        let blur = fullscreen_pipeline(
            device,
            "Bloom Blur Pipeline",
            include_str!("shaders/blur.wgsl"),
            &single_layout,
            HDR_FORMAT,
            None,
        );
        let composite = fullscreen_pipeline(
            device,
            "Bloom Composite Pipeline",
            include_str!("shaders/bloom_composite.wgsl"),
            &composite_layout,
            HDR_FORMAT,
            Some(additive),
        );
        let fxaa = fullscreen_pipeline(
            device,
            "FXAA Pipeline",
            include_str!("shaders/fxaa.wgsl"),
            &single_layout,
            HDR_FORMAT,
            None,
        );
        let present = fullscreen_pipeline(
            device,
            "Present Pipeline",
            include_str!("shaders/present.wgsl"),
            &single_layout,
            surface_format,
            None,
        );

        Self {
            sampler,
            single_layout,
            composite_layout,
            luminosity,
            blur,
            composite,
            fxaa,
            present,
        }
    }
}

impl PostTargets {
    fn new(
        device: &wgpu::Device,
        pipelines: &PostPipelines,
        resolutions: &PassResolutions,
        bloom: &BloomParams,
    ) -> Self {
        let drawing = resolutions.drawing;
        let scene = RenderTarget::new(device, "Scene Color", drawing, HDR_FORMAT);
        let depth = RenderTarget::new(device, "Scene Depth", drawing, DEPTH_FORMAT);
        let antialiased = RenderTarget::new(device, "FXAA Color", drawing, HDR_FORMAT);
        let bright = RenderTarget::new(
            device,
            "Bloom Bright",
            resolutions.bloom_mips[0],
            HDR_FORMAT,
        );

        let horizontal: Vec<RenderTarget> = resolutions
            .bloom_mips
            .iter()
            .map(|&size| RenderTarget::new(device, "Bloom Horizontal", size, HDR_FORMAT))
            .collect();
        let vertical: Vec<RenderTarget> = resolutions
            .bloom_mips
            .iter()
            .map(|&size| RenderTarget::new(device, "Bloom Vertical", size, HDR_FORMAT))
            .collect();

        let mut buffers = Vec::new();
        let mut uniform = |label: &str, contents: &[u8]| {
            let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents,
                usage: wgpu::BufferUsages::UNIFORM,
            });
            buffers.push(buffer);
            buffers.len() - 1
        };

        let luminosity_buffer = uniform(
            "Bloom High Pass Uniforms",
            bytemuck::bytes_of(&LuminosityUniforms {
                threshold: bloom.threshold,
                smooth_width: HIGH_PASS_SMOOTH_WIDTH,
                _padding: [0.0; 2],
            }),
        );

        let mut blur_buffers = Vec::with_capacity(BLOOM_MIP_COUNT);
        for (level, &(width, height)) in resolutions.bloom_mips.iter().enumerate() {
            let radius = BLOOM_KERNEL_RADII[level] as f32;
            let blur = |direction: [f32; 2]| BlurUniforms {
                direction,
                inv_size: [1.0 / width as f32, 1.0 / height as f32],
                kernel_radius: radius,
                sigma: radius,
                _padding: [0.0; 2],
            };
            let h = uniform("Bloom Blur Uniforms", bytemuck::bytes_of(&blur([1.0, 0.0])));
            let v = uniform("Bloom Blur Uniforms", bytemuck::bytes_of(&blur([0.0, 1.0])));
            blur_buffers.push((h, v));
        }

        let composite_buffer = uniform(
            "Bloom Composite Uniforms",
            bytemuck::bytes_of(&CompositeUniforms {
                factors: [
                    BLOOM_FACTORS[0],
                    BLOOM_FACTORS[1],
                    BLOOM_FACTORS[2],
                    BLOOM_FACTORS[3],
                ],
                last_factor: BLOOM_FACTORS[4],
                strength: bloom.strength,
                radius: bloom.radius,
                _padding: 0.0,
            }),
        );

        let fxaa_buffer = uniform(
            "FXAA Uniforms",
            bytemuck::bytes_of(&FxaaUniforms {
                texel: resolutions.fxaa_texel.to_array(),
                _padding: [0.0; 2],
            }),
        );

        let single = |label: &str, view: &wgpu::TextureView, buffer: usize| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label),
                layout: &pipelines.single_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&pipelines.sampler),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: buffers[buffer].as_entire_binding(),
                    },
                ],
            })
        };

        let luminosity_group = single("Bloom High Pass Bind Group", &scene.view, luminosity_buffer);

        // Level 0 blurs the bright pass, each deeper level the previous result
        let blur_groups = blur_buffers
            .iter()
            .enumerate()
            .map(|(level, &(h, v))| {
                let source = if level == 0 {
                    &bright.view
                } else {
                    &vertical[level - 1].view
                };
                (
                    single("Bloom Blur Bind Group", source, h),
                    single("Bloom Blur Bind Group", &horizontal[level].view, v),
                )
            })
            .collect();

        let fxaa_group = single("FXAA Bind Group", &scene.view, fxaa_buffer);

        // The present shader ignores binding 2; any uniform satisfies the layout
        let present_scene_group = single("Present Bind Group", &scene.view, fxaa_buffer);
        let present_antialiased_group =
            single("Present Bind Group", &antialiased.view, fxaa_buffer);

        let mut composite_entries: Vec<wgpu::BindGroupEntry> = vertical
            .iter()
            .enumerate()
            .map(|(binding, target)| wgpu::BindGroupEntry {
                binding: binding as u32,
                resource: wgpu::BindingResource::TextureView(&target.view),
            })
            .collect();
        composite_entries.push(wgpu::BindGroupEntry {
            binding: BLOOM_MIP_COUNT as u32,
            resource: wgpu::BindingResource::Sampler(&pipelines.sampler),
        });
        composite_entries.push(wgpu::BindGroupEntry {
            binding: BLOOM_MIP_COUNT as u32 + 1,
            resource: buffers[composite_buffer].as_entire_binding(),
        });
        let composite_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Bloom Composite Bind Group"),
            layout: &pipelines.composite_layout,
            entries: &composite_entries,
        });

        Self {
            scene,
            depth,
            bright,
            horizontal,
            vertical,
            antialiased,
            buffers,
            luminosity_group,
            blur_groups,
            composite_group,
            fxaa_group,
            present_scene_group,
            present_antialiased_group,
        }
    }

    fn destroy(&self) {
        for target in [&self.scene, &self.depth, &self.bright, &self.antialiased]
            .into_iter()
            .chain(&self.horizontal)
            .chain(&self.vertical)
        {
            target.texture.destroy();
        }
        for buffer in &self.buffers {
            buffer.destroy();
        }
    }
}

fn texture_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

fn sampler_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    }
}

fn uniform_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

/// Pipeline drawing one fullscreen triangle; `source` is appended to the
/// shared fullscreen vertex stage.
fn fullscreen_pipeline(
    device: &wgpu::Device,
    label: &str,
    source: &str,
    layout: &wgpu::BindGroupLayout,
    format: wgpu::TextureFormat,
    blend: Option<wgpu::BlendState>,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(format!("{}\n{}", FULLSCREEN_WGSL, source).into()),
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts: &[layout],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_fullscreen"),
            buffers: &[],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState::default(),
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

fn draw_fullscreen(
    encoder: &mut wgpu::CommandEncoder,
    label: &str,
    target: &wgpu::TextureView,
    load: wgpu::LoadOp<wgpu::Color>,
    pipeline: &wgpu::RenderPipeline,
    bind_group: &wgpu::BindGroup,
) {
    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: target,
            resolve_target: None,
            ops: wgpu::Operations {
                load,
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
    });
    pass.set_pipeline(pipeline);
    pass.set_bind_group(0, bind_group, &[]);
    pass.draw(0..3, 0..1);
}
