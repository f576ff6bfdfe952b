//! Core rendering functionality
//!
//! The frame orchestrator, the render-list construction algorithm and the
//! render target handle.

pub mod render_list;
pub mod renderer;
pub mod target;

// Re-export main types
pub use renderer::{PowerPreference, RenderOptions, Renderer, RendererOptions};
pub use target::RenderTarget;
