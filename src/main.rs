//! agent-orb - audio-reactive presence of an AI agent in a live call
//!
//! The participant's voice and the agent's voice are analysed every frame
//! and drive a glowing, deforming sphere under an orbiting camera.

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info, warn};
use std::sync::Arc;
use std::time::Instant;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use agent_orb::audio::{AudioContext, AudioSignalSource, WavSource};
use agent_orb::cli::Args;
use agent_orb::params::{RenderConfig, SceneParams};
use agent_orb::rendering::{FileEnvironmentLoader, GpuRenderer, ScenePipeline};
use agent_orb::session::window::{FrameGate, WindowScheduler, WindowViewport};
use agent_orb::session::{Session, Viewport};

/// Main application state
struct App {
    display_name: String,
    render_config: RenderConfig,

    // Caller-owned audio; the session only reads from it
    _audio: AudioContext,
    input: Option<AudioSignalSource>,
    output: Option<AudioSignalSource>,

    window: Option<Arc<Window>>,
    session: Option<Session<GpuRenderer>>,
    gate: FrameGate,
}

impl App {
    fn new(args: &Args) -> Self {
        let mut audio = AudioContext::new();

        let input: Option<AudioSignalSource> =
            match audio.open_input(args.input_device.as_deref()) {
                Ok(tap) => Some(tap as AudioSignalSource),
                Err(e) => {
                    warn!("No input audio, participant voice stays silent: {}", e);
                    None
                }
            };

        let output: Option<AudioSignalSource> = if let Some(path) = &args.output_wav {
            match WavSource::open(path, args.loop_wav) {
                Ok(clip) => {
                    info!("Agent voice from {} ({:.1}s)", path, clip.duration_secs());
                    Some(Arc::new(clip) as AudioSignalSource)
                }
                Err(e) => {
                    warn!("Failed to open {}: {}", path, e);
                    None
                }
            }
        } else if let Some(device) = &args.output_device {
            match audio.open_input(Some(device.as_str())) {
                Ok(tap) => Some(tap as AudioSignalSource),
                Err(e) => {
                    warn!("No output audio, agent voice stays silent: {}", e);
                    None
                }
            }
        } else {
            input.clone()
        };

        Self {
            display_name: args.name.clone(),
            render_config: args.render_config(),
            _audio: audio,
            input,
            output,
            window: None,
            session: None,
            gate: FrameGate::default(),
        }
    }

    fn mount(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window_attributes = Window::default_attributes()
            .with_title(self.display_name.as_str())
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.render_config.window_width,
                self.render_config.window_height,
            ));
        let window = Arc::new(
            event_loop
                .create_window(window_attributes)
                .context("Failed to create window")?,
        );

        let viewport = WindowViewport::new(Arc::clone(&window));
        let params = SceneParams::default();
        let renderer = pollster::block_on(GpuRenderer::new(
            Arc::clone(&window),
            viewport.size(),
            &params,
        ))
        .context("Failed to initialise renderer")?;

        let pipeline = ScenePipeline::new(
            renderer,
            params,
            self.render_config.fxaa,
            self.render_config.noise_seed,
        );

        let session = Session::mount(
            pipeline,
            self.input.clone(),
            self.output.clone(),
            Box::new(WindowScheduler::new(Arc::clone(&window), self.gate.clone())),
            Box::new(viewport),
            Box::new(FileEnvironmentLoader),
            Instant::now(),
            &self.render_config.environment_path,
        );

        info!("{} is live, press ESC to quit", self.display_name);
        self.window = Some(window);
        self.session = Some(session);
        Ok(())
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(session) = self.session.as_mut() {
            session.dispose();
        }
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return; // Already initialized
        }
        if let Err(e) = self.mount(event_loop) {
            error!("{:#}", e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => self.shutdown(event_loop),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => self.shutdown(event_loop),
            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(session) = self.session.as_mut() {
                    session.on_viewport_resized();
                }
            }
            WindowEvent::RedrawRequested => {
                if self.gate.take_due() {
                    if let Some(session) = self.session.as_mut() {
                        session.tick(Instant::now());
                    }
                }
            }
            _ => {}
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    info!("agent-orb starting for {}", args.name);

    let mut app = App::new(&args);
    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    event_loop.run_app(&mut app).context("Event loop failed")?;
    Ok(())
}
