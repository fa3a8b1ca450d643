//! Session state machine driving one pipeline from host frame callbacks.

use log::{info, warn};
use std::time::Instant;

use super::host::{FrameHandle, FrameScheduler, ListenerId, Viewport};
use crate::audio::{Analyzer, AudioSignalSource};
use crate::params::AnalyzerConfig;
use crate::rendering::{EnvironmentLoader, FrameRenderer, ScenePipeline};

/// Length of one reference frame in milliseconds; `dt` is measured in these
pub const FRAME_MS: f32 = 1000.0 / 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Running,
    Disposed,
}

/// One live visualization bound to a host surface
pub struct Session<R: FrameRenderer> {
    state: SessionState,
    pipeline: ScenePipeline<R>,
    input: Analyzer,
    output: Analyzer,
    analyzer_config: AnalyzerConfig,
    scheduler: Box<dyn FrameScheduler>,
    viewport: Box<dyn Viewport>,
    loader: Box<dyn EnvironmentLoader>,
    pending_frame: Option<FrameHandle>,
    resize_listener: Option<ListenerId>,
    last_tick: Option<Instant>,
}

impl<R: FrameRenderer> Session<R> {
    /// Wire a pipeline to its audio sources and host; nothing runs yet
    pub fn new(
        pipeline: ScenePipeline<R>,
        input: Option<AudioSignalSource>,
        output: Option<AudioSignalSource>,
        scheduler: Box<dyn FrameScheduler>,
        viewport: Box<dyn Viewport>,
        loader: Box<dyn EnvironmentLoader>,
    ) -> Self {
        let analyzer_config = AnalyzerConfig::default();
        Self {
            state: SessionState::Uninitialized,
            pipeline,
            input: Analyzer::new(input, &analyzer_config),
            output: Analyzer::new(output, &analyzer_config),
            analyzer_config,
            scheduler,
            viewport,
            loader,
            pending_frame: None,
            resize_listener: None,
            last_tick: None,
        }
    }

    /// Construct and start in one step
    #[allow(clippy::too_many_arguments)]
    pub fn mount(
        pipeline: ScenePipeline<R>,
        input: Option<AudioSignalSource>,
        output: Option<AudioSignalSource>,
        scheduler: Box<dyn FrameScheduler>,
        viewport: Box<dyn Viewport>,
        loader: Box<dyn EnvironmentLoader>,
        now: Instant,
        environment_url: &str,
    ) -> Self {
        let mut session = Self::new(pipeline, input, output, scheduler, viewport, loader);
        session.start(now, environment_url);
        session
    }

    /// Size the pipeline, schedule the first tick and begin the
    /// environment load. Only valid from `Uninitialized`.
    pub fn start(&mut self, now: Instant, environment_url: &str) {
        if self.state != SessionState::Uninitialized {
            warn!("Ignoring start() in state {:?}", self.state);
            return;
        }

        self.resize_listener = Some(self.viewport.add_resize_listener());
        self.pipeline.resize(self.viewport.size());

        self.last_tick = Some(now);
        self.pending_frame = Some(self.scheduler.request_frame());
        self.pipeline
            .load_environment(environment_url, self.loader.as_ref());

        self.state = SessionState::Running;
        info!("Session running");
    }

    /// One frame: reschedule, analyse, react, composite
    pub fn tick(&mut self, now: Instant) {
        if self.state != SessionState::Running {
            return;
        }

        // Keep the loop alive even if this frame fails
        self.pending_frame = Some(self.scheduler.request_frame());

        let elapsed = self
            .last_tick
            .map(|last| now.saturating_duration_since(last))
            .unwrap_or_default();
        self.last_tick = Some(now);
        let dt = elapsed.as_secs_f32() * 1000.0 / FRAME_MS;

        self.input.update();
        self.output.update();

        self.pipeline.poll_environment();
        self.pipeline
            .apply_frame(dt, self.input.data(), self.output.data());

        if let Err(e) = self.pipeline.composite() {
            warn!("Frame composite failed: {}", e);
        }
    }

    /// Viewport changed size or pixel ratio
    pub fn on_viewport_resized(&mut self) {
        if self.state != SessionState::Running || self.resize_listener.is_none() {
            return;
        }
        self.pipeline.resize(self.viewport.size());
    }

    pub fn set_input_source(&mut self, source: Option<AudioSignalSource>) {
        self.input = Analyzer::new(source, &self.analyzer_config);
    }

    pub fn set_output_source(&mut self, source: Option<AudioSignalSource>) {
        self.output = Analyzer::new(source, &self.analyzer_config);
    }

    /// Swap in a prepared analyzer (synthetic probes, custom configs)
    pub fn set_input_analyzer(&mut self, analyzer: Analyzer) {
        self.input = analyzer;
    }

    pub fn set_output_analyzer(&mut self, analyzer: Analyzer) {
        self.output = analyzer;
    }

    /// Stop the loop and release everything; safe to call repeatedly
    pub fn dispose(&mut self) {
        if self.state == SessionState::Disposed {
            return;
        }

        if let Some(handle) = self.pending_frame.take() {
            self.scheduler.cancel_frame(handle);
        }
        if let Some(id) = self.resize_listener.take() {
            self.viewport.remove_resize_listener(id);
        }
        self.pipeline.dispose();

        self.state = SessionState::Disposed;
        info!("Session disposed");
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn pipeline(&self) -> &ScenePipeline<R> {
        &self.pipeline
    }

    pub fn input(&self) -> &Analyzer {
        &self.input
    }

    pub fn output(&self) -> &Analyzer {
        &self.output
    }

    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.pending_frame
    }
}

impl<R: FrameRenderer> Drop for Session<R> {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::SceneParams;
    use crate::rendering::{
        EnvironmentCompletion, EnvironmentMap, FrameSnapshot, PassResolutions, RenderError,
        ViewportSize,
    };
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    #[derive(Default)]
    struct HostLog {
        requested: u64,
        pending: Vec<FrameHandle>,
        listeners: Vec<ListenerId>,
    }

    struct FakeHost(Rc<RefCell<HostLog>>);

    impl FrameScheduler for FakeHost {
        fn request_frame(&mut self) -> FrameHandle {
            let mut log = self.0.borrow_mut();
            log.requested += 1;
            let handle = FrameHandle(log.requested);
            log.pending.push(handle);
            handle
        }

        fn cancel_frame(&mut self, handle: FrameHandle) {
            self.0.borrow_mut().pending.retain(|&h| h != handle);
        }
    }

    impl Viewport for FakeHost {
        fn size(&self) -> ViewportSize {
            ViewportSize::new(800, 600, 1.0)
        }

        fn add_resize_listener(&mut self) -> ListenerId {
            let id = ListenerId(7);
            self.0.borrow_mut().listeners.push(id);
            id
        }

        fn remove_resize_listener(&mut self, id: ListenerId) {
            self.0.borrow_mut().listeners.retain(|&l| l != id);
        }
    }

    struct NullRenderer;

    impl FrameRenderer for NullRenderer {
        fn resize(&mut self, _resolutions: &PassResolutions) {}

        fn bind_environment(&mut self, _map: &EnvironmentMap) -> Result<(), RenderError> {
            Ok(())
        }

        fn render(&mut self, _frame: &FrameSnapshot<'_>) -> Result<(), RenderError> {
            Ok(())
        }

        fn dispose(&mut self) {}
    }

    struct DroppingLoader;

    impl EnvironmentLoader for DroppingLoader {
        fn begin(&self, _url: &str, _completion: EnvironmentCompletion) {}
    }

    fn session(log: &Rc<RefCell<HostLog>>) -> Session<NullRenderer> {
        Session::new(
            ScenePipeline::new(NullRenderer, SceneParams::default(), false, 1),
            None,
            None,
            Box::new(FakeHost(log.clone())),
            Box::new(FakeHost(log.clone())),
            Box::new(DroppingLoader),
        )
    }

    #[test]
    fn test_lifecycle_transitions() {
        let log = Rc::new(RefCell::new(HostLog::default()));
        let mut s = session(&log);
        assert_eq!(s.state(), SessionState::Uninitialized);

        s.start(Instant::now(), "env.exr");
        assert_eq!(s.state(), SessionState::Running);
        assert_eq!(log.borrow().listeners.len(), 1);
        assert!(s.pipeline().resolutions().is_some());

        s.dispose();
        assert_eq!(s.state(), SessionState::Disposed);

        // No way back
        s.start(Instant::now(), "env.exr");
        assert_eq!(s.state(), SessionState::Disposed);
    }

    #[test]
    fn test_tick_before_start_does_nothing() {
        let log = Rc::new(RefCell::new(HostLog::default()));
        let mut s = session(&log);
        s.tick(Instant::now());
        assert_eq!(log.borrow().requested, 0);
        assert_eq!(s.pipeline().uniforms().backdrop.rand, 0.0);
    }

    #[test]
    fn test_each_tick_requests_next_frame() {
        let log = Rc::new(RefCell::new(HostLog::default()));
        let mut s = session(&log);
        let t0 = Instant::now();
        s.start(t0, "env.exr");
        s.tick(t0 + Duration::from_millis(16));
        s.tick(t0 + Duration::from_millis(33));
        assert_eq!(log.borrow().requested, 3);
        assert_eq!(s.pending_frame(), Some(FrameHandle(3)));
    }

    #[test]
    fn test_dispose_without_start() {
        let log = Rc::new(RefCell::new(HostLog::default()));
        let mut s = session(&log);
        s.dispose();
        s.dispose();
        assert_eq!(s.state(), SessionState::Disposed);
        assert!(log.borrow().pending.is_empty());
    }

    #[test]
    fn test_drop_cancels_pending_frame() {
        let log = Rc::new(RefCell::new(HostLog::default()));
        {
            let mut s = session(&log);
            s.start(Instant::now(), "env.exr");
            assert_eq!(log.borrow().pending.len(), 1);
        }
        assert!(log.borrow().pending.is_empty());
        assert!(log.borrow().listeners.is_empty());
    }
}
