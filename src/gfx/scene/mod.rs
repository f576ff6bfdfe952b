//! # Scene Module
//!
//! The node tree the renderer traverses, plus the perspective camera used
//! for frustum culling and transparency depth ordering.
//!
//! ## Key Components
//!
//! - [`Node`] - Scene graph node with transforms, flags and an optional drawable
//! - [`Camera`] - Perspective camera with frustum extraction and intersection tests
//! - [`traverse`] / [`update_world_matrices`] - Tree walking and matrix propagation

pub mod camera;
pub mod node;

pub use camera::Camera;
pub use node::{
    traverse, update_world_matrices, BoundingSphere, Drawable, Node, NodeRef, Program, Visit,
};
