//! Lifecycle & resize controller.
//!
//! A [`Session`] owns the scene pipeline and both analyzers, and moves
//! through `Uninitialized -> Running -> Disposed` exactly once. The host
//! supplies the frame loop ([`FrameScheduler`]) and the drawing surface
//! ([`Viewport`]); [`window`] adapts both to winit.

mod controller;
mod host;
pub mod window;

// Re-export public types
pub use controller::{Session, SessionState, FRAME_MS};
pub use host::{FrameHandle, FrameScheduler, ListenerId, Viewport};
