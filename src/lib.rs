// src/lib.rs
//! Cairn
//!
//! A minimal real-time 3D render pipeline driver. Given a scene graph and a
//! camera, it produces a correctly ordered, correctly culled list of drawable
//! nodes and issues the GPU state changes and draw calls needed to render
//! them, eliding redundant state changes through a per-context cache.
//!
//! The GPU API itself stays behind the [`GpuDriver`] trait; cairn contains no
//! windowing, shader or buffer management.
//!
//! [`GpuDriver`]: gfx::driver::GpuDriver

pub mod gfx;

// Re-export main types for convenience
pub use gfx::driver::{
    BlendEquation, BlendFactor, Capability, ClearMask, CullMode, DepthFunc, FramebufferId,
    FramebufferTarget, FrontFace, GpuDriver, TextureId,
};
pub use gfx::rendering::{PowerPreference, RenderOptions, Renderer, RendererOptions, RenderTarget};
pub use gfx::scene::{Camera, Drawable, Node, NodeRef, Program, Visit};
pub use gfx::state::RenderState;
