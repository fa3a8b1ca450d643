//! Host services the session borrows: frame callbacks and the viewport.

use crate::rendering::ViewportSize;

/// Opaque handle to one requested frame callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Host-driven frame loop (display refresh, redraw requests, test clock)
pub trait FrameScheduler {
    /// Ask for exactly one more tick
    fn request_frame(&mut self) -> FrameHandle;

    /// Withdraw a request that has not fired yet
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Registration handle for viewport resize notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Surface the scene is drawn into
pub trait Viewport {
    /// Current size in logical pixels plus pixel ratio
    fn size(&self) -> ViewportSize;

    fn add_resize_listener(&mut self) -> ListenerId;

    fn remove_resize_listener(&mut self, id: ListenerId);
}
