//! Scene graph, camera orbit and audio-driven uniforms.

mod camera;
mod geometry;
mod state;
mod uniforms;

// Re-export public types
pub use camera::{orbit_position, PerspectiveCamera};
pub use geometry::{icosahedron, Mesh, Vertex};
pub use state::{build_scene, SceneState, Sphere};
pub use uniforms::{BackdropUniforms, SphereUniforms, UniformRegistry};
