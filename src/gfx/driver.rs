//! GPU driver command seam
//!
//! The renderer never talks to a graphics API directly. Every raw pipeline
//! command it issues goes through the [`GpuDriver`] trait, so the same
//! state-tracking and render-list logic runs against any backend (and against
//! a recording driver in tests). Context creation, shader compilation and
//! buffer/texture objects live entirely on the driver side.
//!
//! All values passed through this seam are trusted: the renderer performs no
//! validation and driver-level failures are the driver's to surface.

/// Opaque handle to a driver-side framebuffer object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FramebufferId(pub u32);

/// Opaque handle to a driver-side texture object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

/// Base constant added to a texture unit index when activating it,
/// matching the convention of enum-offset unit activation.
pub const TEXTURE_UNIT_BASE: u32 = 0x84C0;

/// Source or destination factor for the blend function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendFactor {
    Zero,
    One,
    SrcColor,
    OneMinusSrcColor,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstAlpha,
    OneMinusDstAlpha,
    DstColor,
    OneMinusDstColor,
    SrcAlphaSaturate,
}

/// Equation combining source and destination blend terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendEquation {
    Add,
    Subtract,
    ReverseSubtract,
    Min,
    Max,
}

/// Which face set gets culled when face culling is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CullMode {
    Front,
    Back,
    FrontAndBack,
}

/// Triangle winding order considered front-facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontFace {
    /// Counter-clockwise (the default).
    Ccw,
    Cw,
}

/// Depth comparison function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthFunc {
    Never,
    Less,
    Equal,
    LessEqual,
    Greater,
    NotEqual,
    GreaterEqual,
    Always,
}

/// Toggleable pipeline capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Blend,
    CullFace,
    DepthTest,
    PolygonOffsetFill,
    SampleAlphaToCoverage,
    ScissorTest,
    StencilTest,
}

/// Binding point for a framebuffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramebufferTarget {
    /// Combined draw + read target (the default).
    Framebuffer,
    DrawFramebuffer,
    ReadFramebuffer,
}

/// Which buffers a clear command covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClearMask {
    pub color: bool,
    pub depth: bool,
    pub stencil: bool,
}

/// Raw pipeline commands issued by the renderer.
///
/// Implementations translate each call 1:1 into their graphics API. The
/// renderer already elides redundant viewport calls through its state cache,
/// so drivers should not add their own caching on top.
pub trait GpuDriver {
    /// Hardware limit on simultaneously bound texture units.
    fn max_texture_units(&self) -> usize;

    /// Sets the viewport rectangle in physical pixels.
    fn viewport(&mut self, x: i32, y: i32, width: u32, height: u32);

    /// Enables or disables a pipeline capability.
    fn set_capability(&mut self, capability: Capability, enabled: bool);

    /// Sets the blend function for color and alpha channels combined.
    fn blend_func(&mut self, src: BlendFactor, dst: BlendFactor);

    /// Sets separate blend functions for the color and alpha channels.
    fn blend_func_separate(
        &mut self,
        src_rgb: BlendFactor,
        dst_rgb: BlendFactor,
        src_alpha: BlendFactor,
        dst_alpha: BlendFactor,
    );

    /// Sets the blend equation for color and alpha channels combined.
    fn blend_equation(&mut self, mode: BlendEquation);

    /// Sets separate blend equations for the color and alpha channels.
    fn blend_equation_separate(&mut self, mode_rgb: BlendEquation, mode_alpha: BlendEquation);

    fn cull_face(&mut self, mode: CullMode);

    fn front_face(&mut self, winding: FrontFace);

    /// Enables or disables writes to the depth buffer.
    fn depth_mask(&mut self, write: bool);

    fn depth_func(&mut self, func: DepthFunc);

    /// Activates a texture unit. `unit_enum` already carries the
    /// [`TEXTURE_UNIT_BASE`] offset.
    fn active_texture(&mut self, unit_enum: u32);

    /// Binds a framebuffer to the given target; `None` binds the default
    /// surface.
    fn bind_framebuffer(&mut self, target: FramebufferTarget, framebuffer: Option<FramebufferId>);

    /// Clears the buffers selected by `mask` on the bound framebuffer.
    fn clear(&mut self, mask: ClearMask);

    /// Resizes the backing surface to a physical pixel resolution.
    fn resize_surface(&mut self, width: u32, height: u32);

    /// Sets the logical display size of the surface, decoupled from its
    /// physical resolution on high-density displays.
    fn set_display_size(&mut self, width: u32, height: u32);
}
