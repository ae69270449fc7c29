//! GPU presentation of the CPU pixel buffer.
//!
//! The canvas is uploaded into a single texture every frame and stretched
//! over the window with a nearest-sampled fullscreen triangle, scaled to
//! keep the buffer's aspect ratio and letterboxed inside the remainder.

use std::{borrow::Cow, sync::Arc};

use glam::Vec2;
use miette::{miette, IntoDiagnostic, Result, WrapErr};
use winit::window::Window;

use crate::{canvas::Canvas, config::Config};

/// Texture format the pixel buffer is uploaded in.
const BUFFER_TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// Scaled placement of the buffer inside the window.
#[derive(Debug, Clone, Copy)]
struct Letterbox {
    /// Top-left corner in window pixels.
    offset: Vec2,
    /// Size in window pixels.
    size: Vec2,
    /// Applied uniform scale factor.
    scale: f32,
}

/// GPU state for presenting the canvas on the window surface.
pub(crate) struct Graphics {
    /// GPU device.
    device: wgpu::Device,
    /// GPU queue.
    queue: wgpu::Queue,
    /// GPU surface.
    surface: wgpu::Surface<'static>,
    /// GPU surface configuration.
    config: wgpu::SurfaceConfiguration,
    /// Nearest-neighbor sampler for the buffer texture.
    sampler: wgpu::Sampler,
    /// Layout for binding the buffer texture, kept for orientation swaps.
    bind_group_layout: wgpu::BindGroupLayout,
    /// Binding of the current buffer texture.
    bind_group: wgpu::BindGroup,
    /// Texture the canvas is uploaded into.
    texture: wgpu::Texture,
    /// Pipeline drawing the fullscreen triangle.
    render_pipeline: wgpu::RenderPipeline,
    /// Logical buffer dimensions, swaps on orientation change.
    buffer_size: (u32, u32),
    /// Current placement of the buffer inside the window.
    letterbox: Letterbox,
    /// Color of the window area outside of the letterbox.
    viewport_color: wgpu::Color,
    /// Staging bytes for the texture upload.
    scratch: Vec<u8>,
}

impl Graphics {
    /// Create a GPU surface on the window.
    pub(crate) async fn new(game_config: &Config, window: Arc<Window>) -> Result<Self> {
        // Get a handle to our GPU
        let instance = wgpu::Instance::default();

        log::debug!("Creating GPU surface on the window");

        let surface = instance
            .create_surface(Arc::clone(&window))
            .into_diagnostic()
            .wrap_err("Error creating surface on window")?;

        log::debug!("Requesting adapter");

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptionsBase {
                // Ensure the strongest GPU is used
                power_preference: wgpu::PowerPreference::HighPerformance,
                force_fallback_adapter: false,
                // Request an adapter which can render to our surface
                compatible_surface: Some(&surface),
            })
            .await
            .ok_or_else(|| miette!("Error getting GPU adapter for window"))?;

        // Get the surface capabilities
        let swapchain_capabilities = surface.get_capabilities(&adapter);

        // Create the logical device and command queue
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: None,
                    required_features: wgpu::Features::empty(),
                    // Use the lowest limits, raised to the adapter's resolution caps
                    required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                        .using_resolution(adapter.limits()),
                },
                None,
            )
            .await
            .into_diagnostic()
            .wrap_err("Error getting logical GPU device for surface")?;

        // Configure the render surface to the window size
        let window_size = window.inner_size();
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: swapchain_capabilities.formats[0],
            width: window_size.width.max(1),
            height: window_size.height.max(1),
            present_mode: if game_config.vsync {
                wgpu::PresentMode::AutoVsync
            } else {
                wgpu::PresentMode::AutoNoVsync
            },
            desired_maximum_frame_latency: 2,
            alpha_mode: swapchain_capabilities.alpha_modes[0],
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        // Sample the buffer texture with nearest neighbor
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Buffer Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Buffer Bind Group Layout"),
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

        let render_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Display Render Pipeline Layout"),
                bind_group_layouts: &[&bind_group_layout],
                push_constant_ranges: &[],
            });

        // Load the shader
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Display Shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!(
                "../shaders/display.wgsl"
            ))),
        });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Display Render Pipeline"),
            layout: Some(&render_pipeline_layout),
            vertex: wgpu::VertexState {
                buffers: &[],
                module: &shader,
                entry_point: "vs_main",
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState {
                        color: wgpu::BlendComponent::REPLACE,
                        alpha: wgpu::BlendComponent::REPLACE,
                    }),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        let buffer_size = (
            game_config.buffer_size.x as u32,
            game_config.buffer_size.y as u32,
        );
        let (texture, bind_group) =
            create_buffer_texture(&device, &bind_group_layout, &sampler, buffer_size);

        let viewport_color = u32_to_wgpu_color(game_config.viewport_color);
        let scratch = vec![0; (buffer_size.0 * buffer_size.1 * 4) as usize];

        let mut graphics = Self {
            device,
            queue,
            surface,
            config,
            sampler,
            bind_group_layout,
            bind_group,
            texture,
            render_pipeline,
            buffer_size,
            letterbox: Letterbox {
                offset: Vec2::ZERO,
                size: Vec2::ONE,
                scale: 1.0,
            },
            viewport_color,
            scratch,
        };
        graphics.recalculate_letterbox();

        Ok(graphics)
    }

    /// Resize the surface to the new window size.
    pub(crate) fn resize(&mut self, width: u32, height: u32) {
        log::debug!("Resizing the surface to ({width}x{height})");

        // Ensure that the render surface is at least 1 pixel big, otherwise
        // an error would occur
        self.config.width = width.max(1);
        self.config.height = height.max(1);
        self.surface.configure(&self.device, &self.config);

        self.recalculate_letterbox();
    }

    /// Swap the logical buffer dimensions after an orientation change.
    pub(crate) fn swap_orientation(&mut self) {
        self.buffer_size = (self.buffer_size.1, self.buffer_size.0);

        log::debug!(
            "Swapping buffer orientation to ({}x{})",
            self.buffer_size.0,
            self.buffer_size.1
        );

        let (texture, bind_group) = create_buffer_texture(
            &self.device,
            &self.bind_group_layout,
            &self.sampler,
            self.buffer_size,
        );
        self.texture = texture;
        self.bind_group = bind_group;

        self.scratch.clear();
        self.scratch
            .resize((self.buffer_size.0 * self.buffer_size.1 * 4) as usize, 0);

        self.recalculate_letterbox();
    }

    /// Logical buffer dimensions.
    #[inline]
    pub(crate) fn buffer_size(&self) -> (u32, u32) {
        self.buffer_size
    }

    /// Whether the window is currently taller than wide.
    #[inline]
    pub(crate) fn screen_is_portrait(&self) -> bool {
        self.config.height > self.config.width
    }

    /// Map a window coordinate to the coordinates of the buffer.
    ///
    /// Coordinates outside of the letterbox map to `None`.
    pub(crate) fn map_coordinate(&self, coordinate: Vec2) -> Option<Vec2> {
        let Letterbox {
            offset,
            size,
            scale,
        } = self.letterbox;

        if coordinate.x < offset.x
            || coordinate.y < offset.y
            || coordinate.x >= offset.x + size.x
            || coordinate.y >= offset.y + size.y
        {
            return None;
        }

        Some((coordinate - offset) / scale)
    }

    /// Upload the canvas and present it on the window.
    pub(crate) fn render(&mut self, canvas: &Canvas) {
        debug_assert_eq!(
            (canvas.width() as u32, canvas.height() as u32),
            self.buffer_size,
            "Canvas dimensions drifted from the buffer texture"
        );

        {
            profiling::scope!("Upload buffer texture");

            // Repack 0xAARRGGBB into the RGBA bytes the texture expects
            for (target, source) in self
                .scratch
                .chunks_exact_mut(4)
                .zip(canvas.raw_buffer().iter())
            {
                let [alpha, red, green, blue] = source.to_be_bytes();
                target[0] = red;
                target[1] = green;
                target[2] = blue;
                target[3] = alpha;
            }

            self.queue.write_texture(
                wgpu::ImageCopyTexture {
                    texture: &self.texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                &self.scratch,
                wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(self.buffer_size.0 * 4),
                    rows_per_image: None,
                },
                wgpu::Extent3d {
                    width: self.buffer_size.0,
                    height: self.buffer_size.1,
                    depth_or_array_layers: 1,
                },
            );
        }

        // Get the main render texture
        let surface_texture = match self.surface.get_current_texture() {
            Ok(surface_texture) => surface_texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                // Common while the window is being resized, reconfigure and
                // try again next frame
                self.surface.configure(&self.device, &self.config);

                return;
            }
            Err(err) => {
                log::error!("Error acquiring surface texture: {err}");

                return;
            }
        };

        let surface_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Display Command Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Display Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.viewport_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_pipeline(&self.render_pipeline);

            // Only draw inside the letterbox so the aspect ratio is kept
            let Letterbox { offset, size, .. } = self.letterbox;
            render_pass.set_viewport(offset.x, offset.y, size.x, size.y, 0.0, 1.0);

            render_pass.set_bind_group(0, &self.bind_group, &[]);

            // The 'buffer' is defined in the vertex shader
            render_pass.draw(0..3, 0..1);
        }

        {
            profiling::scope!("Submit queue");

            self.queue.submit(Some(encoder.finish()));
        }

        {
            profiling::scope!("Present surface texture");

            surface_texture.present();
        }
    }

    /// Recalculate the letterbox from the surface and buffer sizes.
    fn recalculate_letterbox(&mut self) {
        let screen = Vec2::new(self.config.width as f32, self.config.height as f32);
        let buffer = Vec2::new(self.buffer_size.0 as f32, self.buffer_size.1 as f32);

        // Keep the aspect ratio, fitting the longest side
        let scale = (screen.x / buffer.x).min(screen.y / buffer.y);
        let size = buffer * scale;
        let offset = (screen - size) / 2.0;

        self.letterbox = Letterbox {
            offset,
            size,
            scale,
        };

        log::debug!(
            "Setting new letterbox to ({}:{} x {}:{}) with {scale} scaling",
            offset.x,
            offset.y,
            size.x,
            size.y
        );
    }
}

/// Create the texture the canvas is uploaded into, with its binding.
fn create_buffer_texture(
    device: &wgpu::Device,
    bind_group_layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    buffer_size: (u32, u32),
) -> (wgpu::Texture, wgpu::BindGroup) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Buffer Texture"),
        size: wgpu::Extent3d {
            width: buffer_size.0,
            height: buffer_size.1,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: BUFFER_TEXTURE_FORMAT,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    let texture_view = texture.create_view(&wgpu::TextureViewDescriptor::default());

    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Buffer Bind Group"),
        layout: bind_group_layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&texture_view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    });

    (texture, bind_group)
}

/// Convert an `0xAARRGGBB` color to the float color wgpu expects.
fn u32_to_wgpu_color(color: u32) -> wgpu::Color {
    wgpu::Color {
        a: f64::from(color >> 24 & 0xFF) / 255.0,
        r: f64::from(color >> 16 & 0xFF) / 255.0,
        g: f64::from(color >> 8 & 0xFF) / 255.0,
        b: f64::from(color & 0xFF) / 255.0,
    }
}
