//! agent-orb library - audio-reactive presence renderer for AI agents in calls

pub mod audio;
pub mod cli;
pub mod params;
pub mod rendering;
pub mod scene;
pub mod session;
