/*!
The window as a [`Surface`].

Pixels are written into a CPU-side [`PixelBuffer`]. `present` copies the
presented rows into a texture and draws that texture over the whole window.
The texture is sRGB exactly when the swapchain is, so colour bytes reach the
screen unchanged either way. The GPU only shows pixels here; it never computes them.
*/

use std::num::NonZeroU32;

use log::{debug, warn};
use winit::window::Window;

use crate::{
    colour::Colour,
    error::Error,
    screen::{PixelRect, Size},
    surface::{PixelBuffer, Surface},
};

/// Prefer an sRGB swapchain format, falling back to whatever the surface lists first.
fn choose_surface_format(formats: &[wgpu::TextureFormat]) -> Option<wgpu::TextureFormat> {
    formats
        .iter()
        .copied()
        .find(|format| format.describe().srgb)
        .or_else(|| formats.first().copied())
}

/// Frame texture format matching the swapchain's encoding.
fn frame_format_for(surface_format: wgpu::TextureFormat) -> wgpu::TextureFormat {
    if surface_format.describe().srgb {
        wgpu::TextureFormat::Rgba8UnormSrgb
    } else {
        wgpu::TextureFormat::Rgba8Unorm
    }
}

pub struct Display {
    surface: wgpu::Surface,
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_configuration: wgpu::SurfaceConfiguration,
    render_pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    frame_format: wgpu::TextureFormat,
    frame_texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
    frame: PixelBuffer,
}

impl Display {
    pub fn new(window: &Window) -> Result<Self, Error> {
        let size = Size::from(window.inner_size());

        let instance = wgpu::Instance::new(wgpu::Backends::all());
        let surface = unsafe { instance.create_surface(window) };

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: Default::default(),
            force_fallback_adapter: false,
            compatible_surface: Some(&surface),
        }))
        .ok_or(Error::NoAdapter)?;
        debug!("using adapter {:?}", adapter.get_info());

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("device"),
                features: wgpu::Features::empty(),
                limits: wgpu::Limits::default(),
            },
            None,
        ))?;

        let format = choose_surface_format(&surface.get_supported_formats(&adapter))
            .ok_or(Error::NoSurfaceFormat)?;
        let frame_format = frame_format_for(format);
        if format.describe().srgb {
            debug!("surface format {:?}", format);
        } else {
            warn!(
                "no sRGB surface format, using {:?} with a {:?} frame",
                format, frame_format
            );
        }

        let surface_configuration = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width,
            height: size.height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: wgpu::CompositeAlphaMode::Auto,
        };
        if !size.is_empty() {
            surface.configure(&device, &surface_configuration);
        }

        let shader_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("frame-shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("frame-bind-group-layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            }],
        });

        let render_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("frame-pipeline-layout"),
                bind_group_layouts: &[&bind_group_layout],
                push_constant_ranges: &[],
            });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("frame-pipeline"),
            layout: Some(&render_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader_module,
                entry_point: "vertex_main",
                buffers: &[],
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader_module,
                entry_point: "fragment_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            multiview: None,
        });

        let (frame_texture, bind_group) =
            create_frame_texture(&device, &bind_group_layout, frame_format, size);

        Ok(Self {
            surface,
            device,
            queue,
            surface_configuration,
            render_pipeline,
            bind_group_layout,
            frame_format,
            frame_texture,
            bind_group,
            frame: PixelBuffer::new(size),
        })
    }

    /// Reconfigure for a new window size. The frame is cleared; redraw afterwards.
    pub fn resize(&mut self, size: Size) {
        debug!("resizing display to {:?}", size);

        self.frame.resize(size);
        self.surface_configuration.width = size.width;
        self.surface_configuration.height = size.height;
        if !size.is_empty() {
            self.surface.configure(&self.device, &self.surface_configuration);
        }

        let (frame_texture, bind_group) = create_frame_texture(
            &self.device,
            &self.bind_group_layout,
            self.frame_format,
            size,
        );
        self.frame_texture.destroy();
        self.frame_texture = frame_texture;
        self.bind_group = bind_group;
    }

    /// Draw the whole frame again, e.g. after the window was uncovered.
    pub fn refresh(&mut self) -> Result<(), Error> {
        let size = self.frame.size();
        self.present(PixelRect::new(0, 0, size.width, size.height))
    }

    fn upload(&self, rect: PixelRect) {
        let width = self.frame.size().width;
        self.queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &self.frame_texture,
                mip_level: 0,
                origin: wgpu::Origin3d {
                    x: rect.x,
                    y: rect.y,
                    z: 0,
                },
                aspect: wgpu::TextureAspect::All,
            },
            self.frame.as_bytes(),
            wgpu::ImageDataLayout {
                offset: (u64::from(rect.y) * u64::from(width) + u64::from(rect.x))
                    * std::mem::size_of::<Colour>() as u64,
                bytes_per_row: NonZeroU32::new(width * std::mem::size_of::<Colour>() as u32),
                rows_per_image: None,
            },
            wgpu::Extent3d {
                width: rect.width,
                height: rect.height,
                depth_or_array_layers: 1,
            },
        );
    }

    fn current_texture(&mut self) -> Result<wgpu::SurfaceTexture, Error> {
        match self.surface.get_current_texture() {
            Ok(surface_texture) => Ok(surface_texture),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                warn!("swapchain out of date, reconfiguring");
                self.surface.configure(&self.device, &self.surface_configuration);
                Ok(self.surface.get_current_texture()?)
            }
            Err(error) => Err(error.into()),
        }
    }
}

impl Surface for Display {
    fn size(&self) -> Size {
        self.frame.size()
    }

    fn lock(&mut self) -> Result<(), Error> {
        self.frame.lock()
    }

    fn unlock(&mut self) {
        self.frame.unlock()
    }

    fn set_pixel(&mut self, x: u32, y: u32, colour: Colour) -> Result<(), Error> {
        self.frame.set_pixel(x, y, colour)
    }

    fn present(&mut self, rect: PixelRect) -> Result<(), Error> {
        let size = self.frame.size();
        if rect.is_empty() || size.is_empty() {
            return Ok(());
        }
        if !rect.fits_within(size) {
            return Err(Error::RectOutOfBounds { rect, size });
        }

        self.upload(rect);

        let surface_texture = self.current_texture()?;
        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut command_encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("present"),
            });
        {
            let mut render_pass = command_encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("frame-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: true,
                    },
                })],
                depth_stencil_attachment: None,
            });

            render_pass.set_pipeline(&self.render_pipeline);
            render_pass.set_bind_group(0, &self.bind_group, &[]);
            render_pass.draw(0..4, 0..1);
        }

        self.queue.submit([command_encoder.finish()]);
        surface_texture.present();
        Ok(())
    }
}

/// Textures can't be empty, so a zero-sized window still gets a 1x1 texture.
fn create_frame_texture(
    device: &wgpu::Device,
    bind_group_layout: &wgpu::BindGroupLayout,
    format: wgpu::TextureFormat,
    size: Size,
) -> (wgpu::Texture, wgpu::BindGroup) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("frame-texture"),
        size: wgpu::Extent3d {
            width: size.width.max(1),
            height: size.height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
    });

    let texture_view = texture.create_view(&wgpu::TextureViewDescriptor::default());

    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("frame-bind-group"),
        layout: bind_group_layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::TextureView(&texture_view),
        }],
    });

    (texture, bind_group)
}
