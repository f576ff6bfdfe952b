//! Off-surface render target handle.

use crate::gfx::driver::FramebufferId;

/// A bindable render target backed by a driver framebuffer.
///
/// The renderer only reads the dimensions, the depth capability flag and the
/// underlying handle; attachment setup is the driver's concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTarget {
    width: u32,
    height: u32,
    depth: bool,
    framebuffer: FramebufferId,
}

impl RenderTarget {
    pub fn new(framebuffer: FramebufferId, width: u32, height: u32, depth: bool) -> Self {
        Self {
            width,
            height,
            depth,
            framebuffer,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether this target carries a depth attachment.
    pub fn has_depth(&self) -> bool {
        self.depth
    }

    pub fn framebuffer(&self) -> FramebufferId {
        self.framebuffer
    }
}
