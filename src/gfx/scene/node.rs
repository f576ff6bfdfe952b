//! Scene graph nodes
//!
//! A scene is a tree of reference-counted [`Node`]s. Nodes carry local and
//! world transforms plus the handful of flags the render-list algorithm
//! reads; anything that can actually be drawn attaches a [`Drawable`]. The
//! graph is single-owner, single-threaded state, hence `Rc<RefCell<_>>`
//! rather than any locking.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU32, Ordering};

use cgmath::{Matrix4, SquareMatrix, Vector3};

use super::camera::Camera;

static NEXT_NODE_ID: AtomicU32 = AtomicU32::new(1);
static NEXT_PROGRAM_ID: AtomicU32 = AtomicU32::new(1);

/// Shared handle to a scene graph node.
pub type NodeRef = Rc<RefCell<Node>>;

/// The per-program properties the render-list algorithm reads.
///
/// `id` is assigned in creation order and is used to group draws by program
/// where draw order does not affect correctness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Program {
    pub id: u32,
    pub transparent: bool,
    pub depth_test: bool,
}

impl Program {
    pub fn new(transparent: bool, depth_test: bool) -> Self {
        Self {
            id: NEXT_PROGRAM_ID.fetch_add(1, Ordering::Relaxed),
            transparent,
            depth_test,
        }
    }

    /// Opaque program with depth testing, the common case.
    pub fn opaque() -> Self {
        Self::new(false, true)
    }
}

/// Local-space bounding sphere used for frustum culling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    pub center: Vector3<f32>,
    pub radius: f32,
}

/// Capability that makes a node renderable.
///
/// The renderer only reads the program properties and the optional bounds;
/// issuing the node's actual GPU draw call(s) is entirely the implementor's
/// concern.
pub trait Drawable {
    fn program(&self) -> &Program;

    /// Local-space bounds for frustum culling. `None` opts the node out of
    /// the intersection test (it is always considered visible).
    fn bounds(&self) -> Option<BoundingSphere> {
        None
    }

    fn draw(&mut self, world_matrix: &Matrix4<f32>, camera: Option<&Camera>);
}

/// Visitor verdict for [`traverse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// Accept the node and descend into its children.
    Continue,
    /// Reject the node but still descend into its children.
    SkipNode,
    /// Reject the node and prune its entire subtree.
    SkipSubtree,
}

/// A node in the scene graph.
pub struct Node {
    pub visible: bool,
    /// Opt-in to frustum culling. Ignored for nodes whose drawable reports
    /// no bounds.
    pub frustum_culled: bool,
    /// Explicit draw priority override; 0 is the default. Non-zero values
    /// win over depth-based ordering.
    pub render_order: i32,
    pub local_matrix: Matrix4<f32>,
    pub world_matrix: Matrix4<f32>,
    /// Scratch depth written each frame by the renderer; only meaningful
    /// for depth-tested nodes with the default render order.
    pub z_depth: f32,
    pub drawable: Option<Box<dyn Drawable>>,
    id: u32,
    children: Vec<NodeRef>,
}

impl Node {
    /// Creates an empty transform node.
    pub fn new() -> NodeRef {
        Rc::new(RefCell::new(Self {
            visible: true,
            frustum_culled: true,
            render_order: 0,
            local_matrix: Matrix4::identity(),
            world_matrix: Matrix4::identity(),
            z_depth: 0.0,
            drawable: None,
            id: NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed),
            children: Vec::new(),
        }))
    }

    /// Creates a node carrying a drawable.
    pub fn with_drawable(drawable: Box<dyn Drawable>) -> NodeRef {
        let node = Self::new();
        node.borrow_mut().drawable = Some(drawable);
        node
    }

    /// Creation-order id; later nodes have larger ids.
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn children(&self) -> &[NodeRef] {
        &self.children
    }

    /// Attaches `child` under `parent`.
    pub fn add_child(parent: &NodeRef, child: NodeRef) {
        parent.borrow_mut().children.push(child);
    }

    /// Sets the translation part of the local matrix.
    pub fn set_position(&mut self, position: Vector3<f32>) {
        self.local_matrix.w.x = position.x;
        self.local_matrix.w.y = position.y;
        self.local_matrix.w.z = position.z;
    }

    /// Translation part of the world matrix.
    pub fn world_position(&self) -> Vector3<f32> {
        self.world_matrix.w.truncate()
    }

    /// Program properties of the attached drawable, if any.
    pub fn program(&self) -> Option<&Program> {
        self.drawable.as_ref().map(|d| d.program())
    }

    /// Issues this node's draw call through its drawable, if present.
    pub fn draw(&mut self, camera: Option<&Camera>) {
        let Node {
            world_matrix,
            drawable,
            ..
        } = self;
        if let Some(drawable) = drawable.as_mut() {
            drawable.draw(world_matrix, camera);
        }
    }
}

/// Depth-first visit of the tree rooted at `node`.
///
/// The visitor's [`Visit`] verdict controls recursion: `SkipSubtree` prunes
/// the node's children, everything else descends. Whether the node itself is
/// accepted is the visitor's own bookkeeping.
pub fn traverse<F>(node: &NodeRef, visitor: &mut F)
where
    F: FnMut(&NodeRef) -> Visit,
{
    if visitor(node) == Visit::SkipSubtree {
        return;
    }
    let children: Vec<NodeRef> = node.borrow().children.clone();
    for child in &children {
        traverse(child, visitor);
    }
}

/// Recomputes world matrices for the whole tree rooted at `root`.
///
/// `world = parent_world * local`, with the root's parent taken as identity.
pub fn update_world_matrices(root: &NodeRef) {
    update_recursive(root, Matrix4::identity());
}

fn update_recursive(node: &NodeRef, parent_world: Matrix4<f32>) {
    let world = {
        let mut n = node.borrow_mut();
        n.world_matrix = parent_world * n.local_matrix;
        n.world_matrix
    };
    let children: Vec<NodeRef> = node.borrow().children.clone();
    for child in &children {
        update_recursive(child, world);
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Minimal drawable used across the crate's unit tests.

    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    pub struct TestMesh {
        pub program: Program,
        pub bounds: Option<BoundingSphere>,
        /// Shared draw log; `tag` is pushed on every draw call.
        pub draw_log: Option<Rc<RefCell<Vec<u32>>>>,
        pub tag: u32,
    }

    impl TestMesh {
        pub fn new(program: Program) -> Self {
            Self {
                program,
                bounds: None,
                draw_log: None,
                tag: 0,
            }
        }

        pub fn with_bounds(program: Program, center: Vector3<f32>, radius: f32) -> Self {
            Self {
                program,
                bounds: Some(BoundingSphere { center, radius }),
                draw_log: None,
                tag: 0,
            }
        }
    }

    impl Drawable for TestMesh {
        fn program(&self) -> &Program {
            &self.program
        }

        fn bounds(&self) -> Option<BoundingSphere> {
            self.bounds
        }

        fn draw(&mut self, _world_matrix: &Matrix4<f32>, _camera: Option<&Camera>) {
            if let Some(log) = &self.draw_log {
                log.borrow_mut().push(self.tag);
            }
        }
    }
}
