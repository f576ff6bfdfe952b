//! Render orchestrator
//!
//! [`Renderer`] owns one GPU context's worth of state: the driver seam, the
//! cached pipeline state, surface sizing and clear semantics. Every tracked
//! state change goes through its setters so the cache in
//! [`RenderState`](crate::gfx::state::RenderState) never drifts from the
//! driver, and `render` drives one full frame: bind target, set viewport,
//! clear, update transforms, build the render list, draw each node.
//!
//! The renderer trusts its callers. Inputs are not validated, no errors are
//! translated, and the only defensive branch anywhere is the
//! viewport-unchanged short-circuit.

use log::{debug, trace};

use crate::gfx::driver::{
    BlendEquation, BlendFactor, Capability, ClearMask, CullMode, DepthFunc, FramebufferId,
    FramebufferTarget, FrontFace, GpuDriver, TEXTURE_UNIT_BASE,
};
use crate::gfx::scene::{update_world_matrices, Camera, NodeRef};
use crate::gfx::state::{BlendEquationState, BlendFuncState, RenderState};

use super::render_list;
use super::target::RenderTarget;

/// Power preference hint recorded for driver/context creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PowerPreference {
    #[default]
    Default,
    HighPerformance,
    LowPower,
}

/// Construction configuration for a [`Renderer`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RendererOptions {
    /// Initial logical width.
    pub width: u32,
    /// Initial logical height.
    pub height: u32,
    /// Device pixel ratio: physical backing resolution per logical pixel.
    pub dpr: f32,
    /// Surface has an alpha channel.
    pub alpha: bool,
    /// Surface has a depth buffer; clears cover it and clearing forces the
    /// depth mask on.
    pub depth: bool,
    /// Surface has a stencil buffer.
    pub stencil: bool,
    pub antialias: bool,
    pub premultiplied_alpha: bool,
    pub preserve_drawing_buffer: bool,
    pub power_preference: PowerPreference,
    /// Clear at the start of every `render` call unless overridden per call.
    pub auto_clear: bool,
}

impl Default for RendererOptions {
    fn default() -> Self {
        Self {
            width: 300,
            height: 150,
            dpr: 1.0,
            alpha: false,
            depth: true,
            stencil: false,
            antialias: false,
            premultiplied_alpha: false,
            preserve_drawing_buffer: false,
            power_preference: PowerPreference::Default,
            auto_clear: true,
        }
    }
}

/// Per-call configuration for [`Renderer::render`].
pub struct RenderOptions<'a> {
    pub camera: Option<&'a mut Camera>,
    /// Target to render into; `None` renders to the default surface.
    pub target: Option<&'a RenderTarget>,
    pub frustum_cull: bool,
    pub sort: bool,
    /// Recompute scene world matrices before building the list.
    pub update_matrices: bool,
    /// Overrides the renderer's auto-clear default when set.
    pub clear: Option<bool>,
}

impl Default for RenderOptions<'_> {
    fn default() -> Self {
        Self {
            camera: None,
            target: None,
            frustum_cull: true,
            sort: true,
            update_matrices: true,
            clear: None,
        }
    }
}

/// Drives one GPU context: state tracking, sizing, clearing and frames.
pub struct Renderer<D: GpuDriver> {
    driver: D,
    state: RenderState,
    width: u32,
    height: u32,
    pub dpr: f32,
    pub alpha: bool,
    pub depth: bool,
    pub stencil: bool,
    /// Clears cover the color buffer.
    pub color: bool,
    pub premultiplied_alpha: bool,
    pub antialias: bool,
    pub preserve_drawing_buffer: bool,
    pub power_preference: PowerPreference,
    pub auto_clear: bool,
}

impl<D: GpuDriver> Renderer<D> {
    /// Creates a renderer over `driver`, seeds the state cache from the
    /// driver's limits and applies the initial surface size.
    pub fn new(driver: D, options: RendererOptions) -> Self {
        let state = RenderState::new(driver.max_texture_units());
        let mut renderer = Self {
            driver,
            state,
            width: 0,
            height: 0,
            dpr: options.dpr,
            alpha: options.alpha,
            depth: options.depth,
            stencil: options.stencil,
            color: true,
            premultiplied_alpha: options.premultiplied_alpha,
            antialias: options.antialias,
            preserve_drawing_buffer: options.preserve_drawing_buffer,
            power_preference: options.power_preference,
            auto_clear: options.auto_clear,
        };
        renderer.set_size(options.width, options.height);
        renderer
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Last-issued pipeline state.
    pub fn state(&self) -> &RenderState {
        &self.state
    }

    /// Logical surface size.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Stores the logical size, resizes the backing surface to
    /// `size * dpr` physical pixels and keeps the displayed size logical.
    pub fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;

        let physical_width = (width as f32 * self.dpr) as u32;
        let physical_height = (height as f32 * self.dpr) as u32;
        self.driver.resize_surface(physical_width, physical_height);
        self.driver.set_display_size(width, height);

        debug!(
            "surface resized to {}x{} ({}x{} physical)",
            width, height, physical_width, physical_height
        );
    }

    /// Sets the viewport rectangle; a repeat of the cached dimensions is a
    /// no-op.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if self.state.viewport == Some((width, height)) {
            return;
        }
        self.state.viewport = Some((width, height));
        self.driver.viewport(0, 0, width, height);
    }

    /// Toggles a pipeline capability and records the flag.
    pub fn set_enabled(&mut self, capability: Capability, enabled: bool) {
        self.state.capabilities.insert(capability, enabled);
        self.driver.set_capability(capability, enabled);
        trace!("capability {:?} -> {}", capability, enabled);
    }

    pub fn enable(&mut self, capability: Capability) {
        self.set_enabled(capability, true);
    }

    pub fn disable(&mut self, capability: Capability) {
        self.set_enabled(capability, false);
    }

    /// Sets the blend function. When both alpha-channel factors are given
    /// the separate-alpha call is issued instead of the combined one.
    pub fn set_blend_func(
        &mut self,
        src: BlendFactor,
        dst: BlendFactor,
        src_alpha: Option<BlendFactor>,
        dst_alpha: Option<BlendFactor>,
    ) {
        self.state.blend_func = BlendFuncState {
            src,
            dst,
            src_alpha,
            dst_alpha,
        };
        match (src_alpha, dst_alpha) {
            (Some(src_alpha), Some(dst_alpha)) => {
                self.driver.blend_func_separate(src, dst, src_alpha, dst_alpha)
            }
            _ => self.driver.blend_func(src, dst),
        }
    }

    /// Sets the blend equation, using the separate-alpha call when an alpha
    /// equation is given.
    pub fn set_blend_equation(&mut self, mode_rgb: BlendEquation, mode_alpha: Option<BlendEquation>) {
        self.state.blend_equation = BlendEquationState {
            mode_rgb,
            mode_alpha,
        };
        match mode_alpha {
            Some(mode_alpha) => self.driver.blend_equation_separate(mode_rgb, mode_alpha),
            None => self.driver.blend_equation(mode_rgb),
        }
    }

    pub fn set_cull_face(&mut self, mode: CullMode) {
        self.state.cull_face = Some(mode);
        self.driver.cull_face(mode);
    }

    pub fn set_front_face(&mut self, winding: FrontFace) {
        self.state.front_face = winding;
        self.driver.front_face(winding);
    }

    pub fn set_depth_mask(&mut self, write: bool) {
        self.state.depth_mask = write;
        self.driver.depth_mask(write);
    }

    pub fn set_depth_func(&mut self, func: DepthFunc) {
        self.state.depth_func = func;
        self.driver.depth_func(func);
    }

    /// Activates a texture unit by index; the driver call carries the
    /// enum-offset unit value.
    pub fn active_texture(&mut self, unit: usize) {
        self.state.active_texture_unit = unit;
        self.driver.active_texture(TEXTURE_UNIT_BASE + unit as u32);
    }

    /// Binds a framebuffer (or the default surface for `None`) and records
    /// the binding.
    pub fn bind_framebuffer(
        &mut self,
        target: FramebufferTarget,
        framebuffer: Option<FramebufferId>,
    ) {
        self.state.framebuffer = framebuffer;
        self.driver.bind_framebuffer(target, framebuffer);
    }

    /// Builds the culled, bucketed and sorted list of nodes to draw.
    ///
    /// See [`render_list::build`] for the ordering guarantees.
    pub fn render_list(
        &self,
        scene: &NodeRef,
        camera: Option<&mut Camera>,
        frustum_cull: bool,
        sort: bool,
    ) -> Vec<NodeRef> {
        render_list::build(scene, camera, frustum_cull, sort)
    }

    /// Renders one frame of `scene`.
    ///
    /// Binds the requested target (default surface when `None`), sets the
    /// viewport to the target's size or the surface's physical size, clears
    /// per the clear settings, updates scene and camera transforms, then
    /// draws the render list in order.
    pub fn render(&mut self, scene: &NodeRef, options: RenderOptions) {
        let RenderOptions {
            mut camera,
            target,
            frustum_cull,
            sort,
            update_matrices,
            clear,
        } = options;

        match target {
            Some(target) => {
                self.bind_framebuffer(FramebufferTarget::Framebuffer, Some(target.framebuffer()));
                self.set_viewport(target.width(), target.height());
            }
            None => {
                self.bind_framebuffer(FramebufferTarget::Framebuffer, None);
                let width = (self.width as f32 * self.dpr) as u32;
                let height = (self.height as f32 * self.dpr) as u32;
                self.set_viewport(width, height);
            }
        }

        if clear.unwrap_or(self.auto_clear) {
            // Depth can only be cleared through an enabled depth test with
            // the write mask on.
            if self.depth && target.map_or(true, |t| t.has_depth()) {
                self.enable(Capability::DepthTest);
                self.set_depth_mask(true);
            }
            self.driver.clear(ClearMask {
                color: self.color,
                depth: self.depth,
                stencil: self.stencil,
            });
        }

        if update_matrices {
            update_world_matrices(scene);
        }

        // The camera is updated on its own: it is not required to be part
        // of the scene graph.
        if let Some(camera) = camera.as_deref_mut() {
            camera.update_matrix_world();
        }

        let list = render_list::build(scene, camera.as_deref_mut(), frustum_cull, sort);
        debug!("rendering {} nodes", list.len());

        let camera = camera.as_deref();
        for node in &list {
            node.borrow_mut().draw(camera);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use cgmath::Vector3;

    use crate::gfx::driver::recording::{DriverCall, RecordingDriver};
    use crate::gfx::scene::node::testing::TestMesh;
    use crate::gfx::scene::{Node, Program};

    use super::*;

    fn renderer() -> Renderer<RecordingDriver> {
        let _ = env_logger::builder().is_test(true).try_init();
        Renderer::new(RecordingDriver::default(), RendererOptions::default())
    }

    fn tagged_node(program: Program, position: Vector3<f32>, tag: u32, log: &Rc<RefCell<Vec<u32>>>) -> crate::gfx::scene::NodeRef {
        let mut mesh = TestMesh::new(program);
        mesh.tag = tag;
        mesh.draw_log = Some(Rc::clone(log));
        let node = Node::with_drawable(Box::new(mesh));
        node.borrow_mut().set_position(position);
        node
    }

    #[test]
    fn repeated_viewport_issues_one_command() {
        let mut renderer = renderer();
        renderer.set_viewport(640, 480);
        renderer.set_viewport(640, 480);
        renderer.set_viewport(640, 480);

        let viewport_calls = renderer
            .driver()
            .count(|call| matches!(call, DriverCall::Viewport { .. }));
        assert_eq!(viewport_calls, 1);
        assert_eq!(renderer.state().viewport, Some((640, 480)));

        // A different size goes through again.
        renderer.set_viewport(320, 240);
        let viewport_calls = renderer
            .driver()
            .count(|call| matches!(call, DriverCall::Viewport { .. }));
        assert_eq!(viewport_calls, 2);
    }

    #[test]
    fn set_size_scales_backing_surface_by_dpr() {
        let mut renderer = Renderer::new(
            RecordingDriver::default(),
            RendererOptions {
                dpr: 2.0,
                ..Default::default()
            },
        );
        renderer.set_size(800, 600);

        let calls = &renderer.driver().calls;
        assert!(calls.contains(&DriverCall::ResizeSurface {
            width: 1600,
            height: 1200
        }));
        assert!(calls.contains(&DriverCall::SetDisplaySize {
            width: 800,
            height: 600
        }));
        assert_eq!(renderer.size(), (800, 600));
    }

    #[test]
    fn blend_func_picks_separate_call_when_alpha_given() {
        let mut renderer = renderer();

        renderer.set_blend_func(BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha, None, None);
        assert!(renderer.driver().calls.contains(&DriverCall::BlendFunc {
            src: BlendFactor::SrcAlpha,
            dst: BlendFactor::OneMinusSrcAlpha,
        }));

        renderer.set_blend_func(
            BlendFactor::SrcAlpha,
            BlendFactor::OneMinusSrcAlpha,
            Some(BlendFactor::One),
            Some(BlendFactor::OneMinusSrcAlpha),
        );
        assert!(renderer
            .driver()
            .calls
            .contains(&DriverCall::BlendFuncSeparate {
                src_rgb: BlendFactor::SrcAlpha,
                dst_rgb: BlendFactor::OneMinusSrcAlpha,
                src_alpha: BlendFactor::One,
                dst_alpha: BlendFactor::OneMinusSrcAlpha,
            }));
        assert_eq!(
            renderer.state().blend_func.src_alpha,
            Some(BlendFactor::One)
        );
    }

    #[test]
    fn blend_equation_picks_separate_call_when_alpha_given() {
        let mut renderer = renderer();

        renderer.set_blend_equation(BlendEquation::Add, None);
        assert!(renderer
            .driver()
            .calls
            .contains(&DriverCall::BlendEquation(BlendEquation::Add)));

        renderer.set_blend_equation(BlendEquation::Add, Some(BlendEquation::Max));
        assert!(renderer
            .driver()
            .calls
            .contains(&DriverCall::BlendEquationSeparate {
                mode_rgb: BlendEquation::Add,
                mode_alpha: BlendEquation::Max,
            }));
    }

    #[test]
    fn state_setters_record_and_issue() {
        let mut renderer = renderer();

        renderer.set_cull_face(CullMode::Back);
        renderer.set_front_face(FrontFace::Cw);
        renderer.set_depth_mask(false);
        renderer.set_depth_func(DepthFunc::LessEqual);
        renderer.enable(Capability::Blend);

        let state = renderer.state();
        assert_eq!(state.cull_face, Some(CullMode::Back));
        assert_eq!(state.front_face, FrontFace::Cw);
        assert!(!state.depth_mask);
        assert_eq!(state.depth_func, DepthFunc::LessEqual);
        assert!(state.is_enabled(Capability::Blend));

        let calls = &renderer.driver().calls;
        assert!(calls.contains(&DriverCall::CullFace(CullMode::Back)));
        assert!(calls.contains(&DriverCall::FrontFace(FrontFace::Cw)));
        assert!(calls.contains(&DriverCall::DepthMask(false)));
        assert!(calls.contains(&DriverCall::DepthFunc(DepthFunc::LessEqual)));
        assert!(calls.contains(&DriverCall::SetCapability {
            capability: Capability::Blend,
            enabled: true,
        }));
    }

    #[test]
    fn active_texture_applies_unit_base_offset() {
        let mut renderer = renderer();
        renderer.active_texture(3);

        assert_eq!(renderer.state().active_texture_unit, 3);
        assert!(renderer
            .driver()
            .calls
            .contains(&DriverCall::ActiveTexture(TEXTURE_UNIT_BASE + 3)));
    }

    #[test]
    fn texture_unit_slots_match_driver_limit() {
        let driver = RecordingDriver {
            max_units: 8,
            ..Default::default()
        };
        let renderer = Renderer::new(driver, RendererOptions::default());
        assert_eq!(renderer.state().texture_units.len(), 8);
    }

    #[test]
    fn bind_framebuffer_records_handle() {
        let mut renderer = renderer();
        let handle = FramebufferId(42);

        renderer.bind_framebuffer(FramebufferTarget::Framebuffer, Some(handle));
        assert_eq!(renderer.state().framebuffer, Some(handle));

        renderer.bind_framebuffer(FramebufferTarget::Framebuffer, None);
        assert_eq!(renderer.state().framebuffer, None);
        assert!(renderer
            .driver()
            .calls
            .contains(&DriverCall::BindFramebuffer {
                target: FramebufferTarget::Framebuffer,
                framebuffer: Some(handle),
            }));
    }

    #[test]
    fn render_clears_with_depth_write_forced_on() {
        let mut renderer = renderer();
        renderer.set_depth_mask(false);
        let scene = Node::new();

        renderer.render(&scene, RenderOptions::default());

        let calls = &renderer.driver().calls;
        let clear_index = calls
            .iter()
            .position(|call| matches!(call, DriverCall::Clear(_)))
            .unwrap();
        assert_eq!(
            calls[clear_index],
            DriverCall::Clear(ClearMask {
                color: true,
                depth: true,
                stencil: false,
            })
        );
        // Depth write was re-enabled before the clear.
        assert!(calls[..clear_index].contains(&DriverCall::DepthMask(true)));
        assert!(calls[..clear_index].contains(&DriverCall::SetCapability {
            capability: Capability::DepthTest,
            enabled: true,
        }));
        assert!(renderer.state().depth_mask);
    }

    #[test]
    fn render_clear_override_and_depthless_target() {
        let mut renderer = renderer();
        let scene = Node::new();

        // Explicit clear=false suppresses the auto-clear.
        renderer.render(
            &scene,
            RenderOptions {
                clear: Some(false),
                ..Default::default()
            },
        );
        assert_eq!(
            renderer
                .driver()
                .count(|call| matches!(call, DriverCall::Clear(_))),
            0
        );

        // A target without depth skips the depth-write dance but still clears.
        let target = RenderTarget::new(FramebufferId(7), 256, 256, false);
        renderer.render(
            &scene,
            RenderOptions {
                target: Some(&target),
                ..Default::default()
            },
        );
        let calls = &renderer.driver().calls;
        assert!(calls.contains(&DriverCall::BindFramebuffer {
            target: FramebufferTarget::Framebuffer,
            framebuffer: Some(FramebufferId(7)),
        }));
        assert_eq!(
            renderer
                .driver()
                .count(|call| matches!(
                    call,
                    DriverCall::SetCapability {
                        capability: Capability::DepthTest,
                        enabled: true,
                    }
                )),
            0
        );
        assert_eq!(
            renderer
                .driver()
                .count(|call| matches!(call, DriverCall::Clear(_))),
            1
        );
        assert_eq!(renderer.state().viewport, Some((256, 256)));
    }

    #[test]
    fn render_to_default_surface_uses_physical_viewport() {
        let mut renderer = Renderer::new(
            RecordingDriver::default(),
            RendererOptions {
                width: 800,
                height: 600,
                dpr: 2.0,
                ..Default::default()
            },
        );
        let scene = Node::new();

        renderer.render(&scene, RenderOptions::default());

        assert_eq!(renderer.state().viewport, Some((1600, 1200)));
    }

    #[test]
    fn render_draws_sorted_list_with_camera() {
        let mut renderer = renderer();
        let log = Rc::new(RefCell::new(Vec::new()));
        let scene = Node::new();

        let opaque = Program::opaque();
        let far = tagged_node(opaque, Vector3::new(0.0, 0.0, -50.0), 1, &log);
        let near = tagged_node(opaque, Vector3::new(0.0, 0.0, -5.0), 2, &log);
        let blended = tagged_node(
            Program::new(true, true),
            Vector3::new(0.0, 0.0, -20.0),
            3,
            &log,
        );
        Node::add_child(&scene, Rc::clone(&far));
        Node::add_child(&scene, Rc::clone(&near));
        Node::add_child(&scene, Rc::clone(&blended));

        let mut camera = Camera::new(60.0, 1.0, 1.0, 1000.0);
        renderer.render(
            &scene,
            RenderOptions {
                camera: Some(&mut camera),
                ..Default::default()
            },
        );

        // Opaque front-to-back first, transparent after.
        assert_eq!(*log.borrow(), vec![2, 1, 3]);
    }

    #[test]
    fn render_without_sort_draws_in_traversal_order() {
        let mut renderer = renderer();
        let log = Rc::new(RefCell::new(Vec::new()));
        let scene = Node::new();

        let blended = tagged_node(
            Program::new(true, true),
            Vector3::new(0.0, 0.0, -20.0),
            1,
            &log,
        );
        let solid = tagged_node(Program::opaque(), Vector3::new(0.0, 0.0, -5.0), 2, &log);
        Node::add_child(&scene, Rc::clone(&blended));
        Node::add_child(&scene, Rc::clone(&solid));

        let mut camera = Camera::new(60.0, 1.0, 1.0, 1000.0);
        renderer.render(
            &scene,
            RenderOptions {
                camera: Some(&mut camera),
                sort: false,
                ..Default::default()
            },
        );

        assert_eq!(*log.borrow(), vec![1, 2]);
    }
}
