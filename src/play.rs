#![cfg(feature = "play")]
//! Interactive preview: a window whose mouse wheel scrubs the virtual
//! scroll region, driving the same frame renderer and overlay director the
//! landing page uses. The scene manifest is watched and hot-reloaded.

use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use notify::{Event, EventKind, RecursiveMode, Watcher};
use tiny_skia::{Pixmap, Rect, Transform};
use winit::dpi::LogicalSize;
use winit::event::{ElementState, Event as WinitEvent, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowBuilder;

use crate::frames::FrameStore;
use crate::manifest::{load_and_validate_scene, resolved_sequence};
use crate::overlay::{overlay_states, scroll_hint_visible, OverlayFrame};
use crate::renderer::FrameRenderer;
use crate::schema::{ColorRgba, Scene};
use crate::scroll::ScrollRegion;
use crate::text::TextCompositor;
use crate::viewport::{DeviceClass, Viewport};

/// Display-refresh cadence of the self-re-scheduling render loop.
const TICK_INTERVAL: Duration = Duration::from_micros(16_667);
/// Logical pixels per wheel line.
const LINE_SCROLL_STEP: f32 = 60.0;

const BLIT_SHADER: &str = r#"
@group(0) @binding(0) var frame_tex: texture_2d<f32>;
@group(0) @binding(1) var frame_sampler: sampler;

struct VertexOutput {
  @builtin(position) position: vec4<f32>,
  @location(0) uv: vec2<f32>,
}

@vertex
fn vs_main(@builtin(vertex_index) vertex_index: u32) -> VertexOutput {
  var positions = array<vec2<f32>, 3>(
    vec2<f32>(-1.0, -3.0),
    vec2<f32>(-1.0, 1.0),
    vec2<f32>(3.0, 1.0)
  );

  var out: VertexOutput;
  let p = positions[vertex_index];
  out.position = vec4<f32>(p, 0.0, 1.0);
  out.uv = p * vec2<f32>(0.5, -0.5) + vec2<f32>(0.5, 0.5);
  return out;
}

@fragment
fn fs_main(input: VertexOutput) -> @location(0) vec4<f32> {
  let uv = clamp(input.uv, vec2<f32>(0.0, 0.0), vec2<f32>(1.0, 1.0));
  return textureSample(frame_tex, frame_sampler, uv);
}
"#;

#[derive(Debug, Clone, Copy)]
pub struct PlayArgs {
    pub width: f32,
    pub height: f32,
}

pub fn run_play(scene_path: &Path, args: PlayArgs) -> Result<()> {
    let scene_path = canonical_scene_path(scene_path);
    let mut scene = load_and_validate_scene(&scene_path)?;

    let event_loop = EventLoop::new().context("failed to create play event loop")?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(format!("brewscroll play - {}", scene_path.display()))
            .with_inner_size(LogicalSize::new(args.width as f64, args.height as f64))
            .build(&event_loop)
            .context("failed to create preview window")?,
    );

    let scale = window.scale_factor() as f32;
    let physical = window.inner_size();
    let mut viewport = Viewport::new(
        physical.width as f32 / scale,
        physical.height as f32 / scale,
        scale,
    );

    let mut presenter = Presenter::new(window.clone(), physical.width, physical.height)?;

    let mut sequence = resolved_sequence(&scene, &scene_path);
    let class = DeviceClass::classify(viewport.width, scene.hero.compact_breakpoint);
    let mut store = FrameStore::start(sequence.clone(), class);
    let mut renderer = FrameRenderer::new(viewport, scene.hero.background, scene.hero.zoom)?;
    let mut compositor = TextCompositor::from_scene(&scene, &scene_path)?;
    let mut region = ScrollRegion::new(viewport.height, scene.hero.scroll_length);
    let mut scroll_offset = 0.0_f32;

    let (watch_tx, watch_rx) = mpsc::channel::<()>();
    let watched_scene = scene_path.clone();
    let mut watcher =
        notify::recommended_watcher(move |result: notify::Result<Event>| match result {
            Ok(event) => {
                if should_reload(&event) && event_targets_scene(&event, &watched_scene) {
                    let _ = watch_tx.send(());
                }
            }
            Err(error) => {
                eprintln!("[brew] play: file watcher error: {error}");
            }
        })
        .context("failed to create file watcher")?;
    let watch_root = scene_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    watcher
        .watch(&watch_root, RecursiveMode::NonRecursive)
        .with_context(|| format!("failed to watch {}", watch_root.display()))?;

    eprintln!(
        "[brew] play: {}x{} ({}, {} frames, scroll {}x viewport)",
        viewport.physical_width(),
        viewport.physical_height(),
        store.device_class().label(),
        store.frame_count(),
        scene.hero.scroll_length
    );
    eprintln!(
        "[brew] Controls: wheel/trackpad scrub, Up/Down/PageUp/PageDown step, Home/End jump, Esc quit"
    );

    let mut last_present: Option<PresentStamp> = None;
    let mut last_logged_progress = 0_u8;
    let mut next_tick = Instant::now();

    event_loop
        .run(move |event, target| {
            target.set_control_flow(ControlFlow::WaitUntil(next_tick));

            match event {
                WinitEvent::WindowEvent { window_id, event } if window_id == window.id() => {
                    match event {
                        WindowEvent::CloseRequested => target.exit(),
                        WindowEvent::MouseWheel { delta, .. } => {
                            let step = match delta {
                                MouseScrollDelta::LineDelta(_, lines) => lines * LINE_SCROLL_STEP,
                                MouseScrollDelta::PixelDelta(position) => position.y as f32,
                            };
                            scroll_offset = region.clamp_offset(scroll_offset - step);
                        }
                        WindowEvent::KeyboardInput { event, .. } => {
                            if event.state == ElementState::Pressed {
                                handle_key(
                                    event.physical_key,
                                    &mut scroll_offset,
                                    &region,
                                    viewport.height,
                                    target,
                                );
                            }
                        }
                        WindowEvent::Resized(size) => {
                            if size.width == 0 || size.height == 0 {
                                return;
                            }
                            let scale = window.scale_factor() as f32;
                            viewport = Viewport::new(
                                size.width as f32 / scale,
                                size.height as f32 / scale,
                                scale,
                            );

                            // The classifier runs on every resize; crossing
                            // the breakpoint restarts the load and drops
                            // whatever the previous class had in flight.
                            let class = DeviceClass::classify(
                                viewport.width,
                                scene.hero.compact_breakpoint,
                            );
                            if class != store.device_class() {
                                eprintln!(
                                    "[brew] play: device class now {}, reloading {} frames",
                                    class.label(),
                                    store.frame_count()
                                );
                                store.restart(class);
                            }

                            region = ScrollRegion::new(viewport.height, scene.hero.scroll_length);
                            scroll_offset = region.clamp_offset(scroll_offset);
                            if let Err(error) = renderer.resize(viewport, &store) {
                                eprintln!("[brew] play: resize failed: {error:#}");
                            }
                            presenter.resize(size.width, size.height);
                            last_present = None;
                            window.request_redraw();
                        }
                        WindowEvent::RedrawRequested => {
                            redraw(
                                &mut presenter,
                                &mut renderer,
                                &store,
                                compositor.as_ref(),
                                &scene,
                                viewport,
                                &region,
                                scroll_offset,
                                &mut last_present,
                            );
                        }
                        _ => {}
                    }
                }
                WinitEvent::AboutToWait => {
                    let mut scene_dirty = false;
                    while watch_rx.try_recv().is_ok() {
                        scene_dirty = true;
                    }
                    if scene_dirty {
                        try_hot_reload(
                            &scene_path,
                            viewport,
                            &mut scene,
                            &mut sequence,
                            &mut store,
                            &mut renderer,
                            &mut compositor,
                            &mut region,
                        );
                        scroll_offset = region.clamp_offset(scroll_offset);
                        last_present = None;
                        window.request_redraw();
                    }

                    let poll = store.poll();
                    if poll.progress_changed
                        && store.loading_progress() / 25 != last_logged_progress / 25
                    {
                        last_logged_progress = store.loading_progress();
                        eprintln!("[brew] play: loading {}%", store.loading_progress());
                    }
                    if poll.became_ready {
                        eprintln!(
                            "[brew] play: frames ready ({} of {} loaded)",
                            store.loaded_count(),
                            store.frame_count()
                        );
                        renderer.draw_initial(&store);
                        last_present = None;
                    }
                    if poll.progress_changed || poll.became_ready {
                        window.request_redraw();
                    }

                    let now = Instant::now();
                    if now >= next_tick {
                        window.request_redraw();
                        next_tick = now + TICK_INTERVAL;
                    }
                    target.set_control_flow(ControlFlow::WaitUntil(next_tick));
                }
                _ => {}
            }
        })
        .map_err(|error| anyhow!("play event loop terminated: {error}"))
}

/// What the window currently shows. Presenting is skipped when a tick
/// changes nothing.
#[derive(Debug, Clone, PartialEq)]
struct PresentStamp {
    frame: Option<u32>,
    opacities: Vec<u16>,
    hint: bool,
    loading: Option<u8>,
}

impl PresentStamp {
    fn composed(frame: Option<u32>, states: &[OverlayFrame<'_>], hint: bool) -> Self {
        Self {
            frame,
            opacities: states
                .iter()
                .map(|state| (state.opacity.clamp(0.0, 1.0) * 1000.0) as u16)
                .collect(),
            hint,
            loading: None,
        }
    }

    fn loading(progress: u8) -> Self {
        Self {
            frame: None,
            opacities: Vec::new(),
            hint: false,
            loading: Some(progress),
        }
    }
}

fn redraw(
    presenter: &mut Presenter,
    renderer: &mut FrameRenderer,
    store: &FrameStore,
    compositor: Option<&TextCompositor>,
    scene: &Scene,
    viewport: Viewport,
    region: &ScrollRegion,
    scroll_offset: f32,
    last_present: &mut Option<PresentStamp>,
) {
    if !store.is_ready() {
        let stamp = PresentStamp::loading(store.loading_progress());
        if last_present.as_ref() == Some(&stamp) {
            return;
        }
        match loading_screen(viewport, scene, store.loading_progress()) {
            Some(screen) => {
                if let Err(error) = presenter.present(&screen) {
                    eprintln!("[brew] play: present error: {error:#}");
                    return;
                }
                *last_present = Some(stamp);
            }
            None => eprintln!("[brew] play: cannot allocate loading surface"),
        }
        return;
    }

    let progress = region.progress(scroll_offset);
    renderer.tick(progress, store);

    let states = overlay_states(&scene.overlays, progress);
    let hint = scroll_hint_visible(progress);
    let stamp = PresentStamp::composed(renderer.last_drawn(), &states, hint);
    if last_present.as_ref() == Some(&stamp) {
        return;
    }

    let mut composed = renderer.surface().clone();
    if let Some(compositor) = compositor {
        compositor.composite(&mut composed, viewport, &states, hint);
    }
    if let Err(error) = presenter.present(&composed) {
        eprintln!("[brew] play: present error: {error:#}");
        return;
    }
    *last_present = Some(stamp);
}

/// Brand-colored fill with a centered progress bar, shown until the frame
/// set is ready.
fn loading_screen(viewport: Viewport, scene: &Scene, progress: u8) -> Option<Pixmap> {
    let mut surface = Pixmap::new(viewport.physical_width(), viewport.physical_height())?;
    surface.fill(scene.hero.background.to_color());

    let accent = scene
        .typography
        .as_ref()
        .map(|typography| typography.accent_color)
        .unwrap_or(ColorRgba {
            r: 0.239,
            g: 0.153,
            b: 0.106,
            a: 1.0,
        });

    let width = surface.width() as f32;
    let height = surface.height() as f32;
    let bar_width = width * 0.4;
    let bar_height = (4.0 * viewport.scale).max(2.0);
    let bar_x = (width - bar_width) / 2.0;
    let bar_y = height / 2.0;

    let mut track_paint = tiny_skia::Paint::default();
    track_paint.set_color(accent.with_alpha(0.1).to_color());
    if let Some(track) = Rect::from_xywh(bar_x, bar_y, bar_width, bar_height) {
        surface.fill_rect(track, &track_paint, Transform::identity(), None);
    }

    let filled = bar_width * (progress as f32 / 100.0);
    if filled > 0.0 {
        let mut fill_paint = tiny_skia::Paint::default();
        fill_paint.set_color(accent.to_color());
        if let Some(fill) = Rect::from_xywh(bar_x, bar_y, filled, bar_height) {
            surface.fill_rect(fill, &fill_paint, Transform::identity(), None);
        }
    }

    Some(surface)
}

fn handle_key(
    key: PhysicalKey,
    scroll_offset: &mut f32,
    region: &ScrollRegion,
    viewport_height: f32,
    target: &winit::event_loop::EventLoopWindowTarget<()>,
) {
    let step = viewport_height * 0.1;
    let page = viewport_height * 0.9;
    match key {
        PhysicalKey::Code(KeyCode::ArrowDown) => {
            *scroll_offset = region.clamp_offset(*scroll_offset + step);
        }
        PhysicalKey::Code(KeyCode::ArrowUp) => {
            *scroll_offset = region.clamp_offset(*scroll_offset - step);
        }
        PhysicalKey::Code(KeyCode::PageDown) => {
            *scroll_offset = region.clamp_offset(*scroll_offset + page);
        }
        PhysicalKey::Code(KeyCode::PageUp) => {
            *scroll_offset = region.clamp_offset(*scroll_offset - page);
        }
        PhysicalKey::Code(KeyCode::Home) => *scroll_offset = 0.0,
        PhysicalKey::Code(KeyCode::End) => *scroll_offset = region.scroll_range(),
        PhysicalKey::Code(KeyCode::Escape) => target.exit(),
        _ => {}
    }
}

fn try_hot_reload(
    scene_path: &Path,
    viewport: Viewport,
    scene: &mut Scene,
    sequence: &mut crate::schema::FrameSequence,
    store: &mut FrameStore,
    renderer: &mut FrameRenderer,
    compositor: &mut Option<TextCompositor>,
    region: &mut ScrollRegion,
) {
    let next_scene = match load_and_validate_scene(scene_path) {
        Ok(next_scene) => next_scene,
        Err(error) => {
            eprintln!("[brew] play: reload parse error: {error:#}");
            return;
        }
    };

    let next_compositor = match TextCompositor::from_scene(&next_scene, scene_path) {
        Ok(next_compositor) => next_compositor,
        Err(error) => {
            eprintln!("[brew] play: reload failed to load typography: {error:#}");
            return;
        }
    };

    let next_sequence = resolved_sequence(&next_scene, scene_path);
    if next_sequence != *sequence {
        let class = DeviceClass::classify(viewport.width, next_scene.hero.compact_breakpoint);
        *store = FrameStore::start(next_sequence.clone(), class);
        *sequence = next_sequence;
    }

    match FrameRenderer::new(viewport, next_scene.hero.background, next_scene.hero.zoom) {
        Ok(next_renderer) => *renderer = next_renderer,
        Err(error) => {
            eprintln!("[brew] play: reload failed to rebuild renderer: {error:#}");
            return;
        }
    }
    if store.is_ready() {
        renderer.draw_initial(store);
    }

    *region = ScrollRegion::new(viewport.height, next_scene.hero.scroll_length);
    *compositor = next_compositor;
    *scene = next_scene;

    eprintln!(
        "[brew] play: reloaded {} ({} overlays, {} frames)",
        scene_path.display(),
        scene.overlays.len(),
        scene.hero.frames.count
    );
}

fn should_reload(event: &Event) -> bool {
    matches!(
        event.kind,
        EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_) | EventKind::Any
    )
}

fn event_targets_scene(event: &Event, scene_path: &Path) -> bool {
    if event.paths.is_empty() {
        return true;
    }

    event.paths.iter().any(|path| {
        path == scene_path
            || std::fs::canonicalize(path)
                .map(|resolved| resolved == scene_path)
                .unwrap_or(false)
    })
}

fn canonical_scene_path(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

struct Presenter {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    frame_texture: Option<FrameTexture>,
}

struct FrameTexture {
    texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
    width: u32,
    height: u32,
}

impl Presenter {
    fn new(window: Arc<winit::window::Window>, width: u32, height: u32) -> Result<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());
        let surface = instance
            .create_surface(window)
            .context("failed to create wgpu surface")?;
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            force_fallback_adapter: false,
            compatible_surface: Some(&surface),
        }))
        .ok_or_else(|| anyhow!("no suitable GPU adapter found"))?;
        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("brew-play-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
            },
            None,
        ))
        .context("failed to request wgpu device")?;

        let caps = surface.get_capabilities(&adapter);
        let format = pick_surface_format(&caps.formats);
        let present_mode = if caps.present_modes.contains(&wgpu::PresentMode::Mailbox) {
            wgpu::PresentMode::Mailbox
        } else {
            wgpu::PresentMode::Fifo
        };
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("brew-blit-bind-group-layout"),
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

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("brew-blit-shader"),
            source: wgpu::ShaderSource::Wgsl(BLIT_SHADER.into()),
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("brew-blit-pipeline-layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("brew-blit-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &[],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview: None,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("brew-blit-sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Ok(Self {
            surface,
            device,
            queue,
            config,
            pipeline,
            bind_group_layout,
            sampler,
            frame_texture: None,
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
    }

    fn present(&mut self, pixmap: &Pixmap) -> Result<()> {
        let needs_texture = self
            .frame_texture
            .as_ref()
            .map(|frame| frame.width != pixmap.width() || frame.height != pixmap.height())
            .unwrap_or(true);
        if needs_texture {
            self.frame_texture = Some(self.build_frame_texture(pixmap.width(), pixmap.height()));
        }
        let frame_texture = self
            .frame_texture
            .as_ref()
            .ok_or_else(|| anyhow!("frame texture missing after rebuild"))?;

        self.queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &frame_texture.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixmap.data(),
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(pixmap.width() * 4),
                rows_per_image: Some(pixmap.height()),
            },
            wgpu::Extent3d {
                width: pixmap.width(),
                height: pixmap.height(),
                depth_or_array_layers: 1,
            },
        );

        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Outdated | wgpu::SurfaceError::Lost) => {
                self.surface.configure(&self.device, &self.config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => return Ok(()),
            Err(wgpu::SurfaceError::OutOfMemory) => {
                return Err(anyhow!("surface out of memory"));
            }
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("brew-blit-encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("brew-blit-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &frame_texture.bind_group, &[]);
            pass.draw(0..3, 0..1);
        }

        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }

    fn build_frame_texture(&self, width: u32, height: u32) -> FrameTexture {
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("brew-frame-texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("brew-frame-bind-group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });
        FrameTexture {
            texture,
            bind_group,
            width,
            height,
        }
    }
}

fn pick_surface_format(formats: &[wgpu::TextureFormat]) -> wgpu::TextureFormat {
    formats
        .iter()
        .copied()
        .find(|format| format.is_srgb())
        .unwrap_or(formats[0])
}
