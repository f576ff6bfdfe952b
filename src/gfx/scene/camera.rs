//! Perspective camera
//!
//! Owns the projection, view and combined projection-view matrices plus the
//! six frustum planes extracted from the combined matrix. The camera is not
//! required to live inside the scene graph; the renderer updates its world
//! matrix independently each frame.

use cgmath::{perspective, Deg, InnerSpace, Matrix, Matrix4, Point3, SquareMatrix, Vector3, Vector4};

use super::node::Node;

pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    /// Vertical field of view in degrees.
    pub fovy: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    projection: Matrix4<f32>,
    view: Matrix4<f32>,
    world_matrix: Matrix4<f32>,
    projection_view: Matrix4<f32>,
    /// Planes as (normal, d) with normal pointing inside the frustum.
    frustum: [Vector4<f32>; 6],
}

impl Camera {
    /// Creates a camera at the origin looking down -Z, with matrices and
    /// frustum already up to date.
    pub fn new(fovy: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut camera = Self {
            position: Point3::new(0.0, 0.0, 0.0),
            target: Point3::new(0.0, 0.0, -1.0),
            up: Vector3::unit_y(),
            fovy,
            aspect,
            near,
            far,
            projection: Matrix4::identity(),
            view: Matrix4::identity(),
            world_matrix: Matrix4::identity(),
            projection_view: Matrix4::identity(),
            frustum: [Vector4::new(0.0, 0.0, 0.0, 0.0); 6],
        };
        camera.update_matrix_world();
        camera.update_frustum();
        camera
    }

    /// Recomputes view, world and projection-view matrices from the current
    /// position/target/projection parameters.
    pub fn update_matrix_world(&mut self) {
        self.view = Matrix4::look_at_rh(self.position, self.target, self.up);
        self.world_matrix = self.view.invert().unwrap_or_else(Matrix4::identity);
        self.projection = perspective(Deg(self.fovy), self.aspect, self.near, self.far);
        self.projection_view = self.projection * self.view;
    }

    /// Combined projection * view matrix.
    pub fn projection_view_matrix(&self) -> Matrix4<f32> {
        self.projection_view
    }

    pub fn world_matrix(&self) -> Matrix4<f32> {
        self.world_matrix
    }

    /// Re-extracts the six frustum planes from the projection-view matrix.
    ///
    /// Must be called after `update_matrix_world` for the planes to match
    /// the current view.
    pub fn update_frustum(&mut self) {
        let m = self.projection_view;
        let row0 = m.row(0);
        let row1 = m.row(1);
        let row2 = m.row(2);
        let row3 = m.row(3);

        let planes = [
            row3 + row0, // left
            row3 - row0, // right
            row3 + row1, // bottom
            row3 - row1, // top
            row3 + row2, // near
            row3 - row2, // far
        ];

        for (slot, plane) in self.frustum.iter_mut().zip(planes) {
            *slot = plane / plane.truncate().magnitude();
        }
    }

    /// Tests the node's world-space bounding sphere against the frustum.
    ///
    /// Nodes without a drawable, or whose drawable reports no bounds, always
    /// intersect.
    pub fn frustum_intersects(&self, node: &Node) -> bool {
        let bounds = match node.drawable.as_ref().and_then(|d| d.bounds()) {
            Some(bounds) => bounds,
            None => return true,
        };

        let center = (node.world_matrix * bounds.center.extend(1.0)).truncate();
        let radius = bounds.radius * max_axis_scale(&node.world_matrix);

        for plane in &self.frustum {
            let distance = plane.truncate().dot(center) + plane.w;
            if distance < -radius {
                return false;
            }
        }
        true
    }
}

/// Largest column scale of an affine matrix, used to turn a local-space
/// sphere radius into a conservative world-space one.
fn max_axis_scale(m: &Matrix4<f32>) -> f32 {
    let sx = m.x.truncate().magnitude();
    let sy = m.y.truncate().magnitude();
    let sz = m.z.truncate().magnitude();
    sx.max(sy).max(sz)
}
