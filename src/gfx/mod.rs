//! # Graphics Module
//!
//! Everything the render pipeline driver is made of: the driver command
//! seam, the cached pipeline state, the scene graph and camera, and the
//! orchestrator that drives a frame.
//!
//! ## Architecture Overview
//!
//! - **Driver Seam** ([`driver`]) - Raw GPU commands behind the [`GpuDriver`] trait
//! - **State Cache** ([`state`]) - Last-issued value of every tracked pipeline setting
//! - **Scene** ([`scene`]) - Node tree, traversal, matrix propagation, camera
//! - **Rendering** ([`rendering`]) - Render-list construction and the frame driver
//!
//! A [`Renderer`] owns exactly one driver and one state cache, so several
//! independent render contexts can coexist in a process. All pipeline state
//! mutation is expected to flow through the renderer's setters; state written
//! behind its back will desynchronise the cache.
//!
//! [`GpuDriver`]: driver::GpuDriver
//! [`Renderer`]: rendering::Renderer

pub mod driver;
pub mod rendering;
pub mod scene;
pub mod state;

// Re-export commonly used types
pub use driver::GpuDriver;
pub use rendering::{RenderOptions, Renderer, RendererOptions};
pub use scene::{Camera, Node, NodeRef};
