//! Cached GPU pipeline state
//!
//! [`RenderState`] mirrors the last value issued to the driver for every
//! tracked pipeline setting. It is owned by a single renderer instance and
//! mutated only through that renderer's setters, so it never drifts from the
//! actual driver state as long as all mutation flows through the renderer.

use std::collections::HashMap;

use super::driver::{
    BlendEquation, BlendFactor, Capability, CullMode, DepthFunc, FramebufferId, FrontFace,
    TextureId,
};

/// Blend function factors, with optional separate alpha-channel factors.
///
/// When both alpha factors are present the renderer issues the separate-alpha
/// form of the blend call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlendFuncState {
    pub src: BlendFactor,
    pub dst: BlendFactor,
    pub src_alpha: Option<BlendFactor>,
    pub dst_alpha: Option<BlendFactor>,
}

/// Blend equation, with an optional separate alpha-channel equation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlendEquationState {
    pub mode_rgb: BlendEquation,
    pub mode_alpha: Option<BlendEquation>,
}

/// Last-issued value of every tracked pipeline setting.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderState {
    pub blend_func: BlendFuncState,
    pub blend_equation: BlendEquationState,
    /// Enabled face-culling mode; `None` means culling was never configured.
    pub cull_face: Option<CullMode>,
    pub front_face: FrontFace,
    pub depth_mask: bool,
    pub depth_func: DepthFunc,
    /// Unset until the first `set_viewport`; repeated calls with equal
    /// dimensions are elided against this cache.
    pub viewport: Option<(u32, u32)>,
    /// Index of the active texture unit within `texture_units`.
    pub active_texture_unit: usize,
    /// One slot per hardware texture unit, sized from the driver-queried
    /// maximum.
    pub texture_units: Vec<Option<TextureId>>,
    /// Currently bound render target; `None` is the default surface.
    pub framebuffer: Option<FramebufferId>,
    /// Per-capability enabled flags, keyed by capability identifier.
    pub capabilities: HashMap<Capability, bool>,
}

impl RenderState {
    /// Creates a state cache seeded with the pipeline defaults.
    pub fn new(max_texture_units: usize) -> Self {
        Self {
            blend_func: BlendFuncState {
                src: BlendFactor::One,
                dst: BlendFactor::Zero,
                src_alpha: None,
                dst_alpha: None,
            },
            blend_equation: BlendEquationState {
                mode_rgb: BlendEquation::Add,
                mode_alpha: None,
            },
            cull_face: None,
            front_face: FrontFace::Ccw,
            depth_mask: true,
            depth_func: DepthFunc::Less,
            viewport: None,
            active_texture_unit: 0,
            texture_units: vec![None; max_texture_units],
            framebuffer: None,
            capabilities: HashMap::new(),
        }
    }

    /// Whether a capability was last set to enabled.
    pub fn is_enabled(&self, capability: Capability) -> bool {
        self.capabilities.get(&capability).copied().unwrap_or(false)
    }
}
