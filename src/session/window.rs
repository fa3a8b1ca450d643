//! winit-backed host: redraw requests as frame callbacks, window as viewport.

use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;
use winit::window::Window;

use super::host::{FrameHandle, FrameScheduler, ListenerId, Viewport};
use crate::rendering::ViewportSize;

/// Outstanding frame request shared between the scheduler and the event loop
#[derive(Debug, Clone, Default)]
pub struct FrameGate(Rc<Cell<Option<FrameHandle>>>);

impl FrameGate {
    /// Consume the outstanding request; false if none (or it was cancelled)
    pub fn take_due(&self) -> bool {
        self.0.take().is_some()
    }

    pub fn is_armed(&self) -> bool {
        self.0.get().is_some()
    }
}

/// Turns frame requests into `Window::request_redraw`
pub struct WindowScheduler {
    window: Arc<Window>,
    gate: FrameGate,
    next: u64,
}

impl WindowScheduler {
    pub fn new(window: Arc<Window>, gate: FrameGate) -> Self {
        Self {
            window,
            gate,
            next: 0,
        }
    }
}

impl FrameScheduler for WindowScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        self.next += 1;
        let handle = FrameHandle(self.next);
        self.gate.0.set(Some(handle));
        self.window.request_redraw();
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.gate.0.get() == Some(handle) {
            self.gate.0.set(None);
        }
    }
}

/// Window inner size as a logical viewport
pub struct WindowViewport {
    window: Arc<Window>,
    listener: Option<ListenerId>,
    next: u64,
}

impl WindowViewport {
    pub fn new(window: Arc<Window>) -> Self {
        Self {
            window,
            listener: None,
            next: 0,
        }
    }
}

impl Viewport for WindowViewport {
    fn size(&self) -> ViewportSize {
        let physical = self.window.inner_size();
        let scale = self.window.scale_factor();
        let logical = physical.to_logical::<f64>(scale);
        ViewportSize::new(
            logical.width.round() as u32,
            logical.height.round() as u32,
            scale as f32,
        )
    }

    fn add_resize_listener(&mut self) -> ListenerId {
        self.next += 1;
        let id = ListenerId(self.next);
        self.listener = Some(id);
        id
    }

    fn remove_resize_listener(&mut self, id: ListenerId) {
        if self.listener == Some(id) {
            self.listener = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_fires_once() {
        let gate = FrameGate::default();
        gate.0.set(Some(FrameHandle(1)));
        assert!(gate.is_armed());
        assert!(gate.take_due());
        assert!(!gate.take_due());
    }
}
