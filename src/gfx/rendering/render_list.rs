//! Render-list construction
//!
//! One frame's drawable nodes, culled, bucketed and sorted. The list is
//! rebuilt on every call and never persisted.
//!
//! Sorted output is three buckets concatenated in order:
//!
//! - **opaque** - draws grouped by program to minimise state switches,
//!   front-to-back within a program so early depth rejection kicks in;
//! - **transparent** - depth-tested translucent geometry, back-to-front so
//!   alpha blending composites correctly regardless of program;
//! - **ui** - translucent geometry without depth testing, grouped by program
//!   only.
//!
//! Every chain ends on node id descending, which makes the ordering a total
//! order: equal-priority nodes come out deterministically, newest first.

use std::rc::Rc;

use log::trace;

use crate::gfx::scene::{traverse, Camera, Node, NodeRef, Program, Visit};

/// Builds the list of nodes to draw this frame.
///
/// Invisible nodes are skipped but their subtrees are still visited, so a
/// hidden group does not hide its children. Nodes without a drawable are
/// excluded the same way. When `frustum_cull` is set and a camera is present,
/// the camera's frustum is refreshed and nodes opting into culling are
/// dropped when they do not intersect it.
///
/// With `sort` unset the raw traversal order is returned unchanged.
pub fn build(
    scene: &NodeRef,
    camera: Option<&mut Camera>,
    frustum_cull: bool,
    sort: bool,
) -> Vec<NodeRef> {
    let camera: Option<&Camera> = match camera {
        Some(camera) => {
            if frustum_cull {
                camera.update_frustum();
            }
            Some(camera)
        }
        None => None,
    };

    let mut nodes: Vec<NodeRef> = Vec::new();
    traverse(scene, &mut |node| {
        {
            let n = node.borrow();
            if !n.visible {
                return Visit::SkipNode;
            }
            if n.drawable.is_none() {
                return Visit::SkipNode;
            }
            if frustum_cull {
                if let Some(camera) = camera {
                    if n.frustum_culled && !camera.frustum_intersects(&n) {
                        return Visit::SkipNode;
                    }
                }
            }
        }
        nodes.push(Rc::clone(node));
        Visit::Continue
    });

    if !sort {
        return nodes;
    }

    let mut opaque: Vec<NodeRef> = Vec::new();
    let mut transparent: Vec<NodeRef> = Vec::new();
    let mut ui: Vec<NodeRef> = Vec::new();

    // Single pass: write each node's depth scratch and pick its bucket.
    for node in nodes {
        let (is_transparent, depth_test) = {
            let mut n = node.borrow_mut();
            let program = match n.program().copied() {
                Some(program) => program,
                None => continue,
            };
            let z_depth = compute_z_depth(&n, &program, camera);
            n.z_depth = z_depth;
            (program.transparent, program.depth_test)
        };
        if !is_transparent {
            opaque.push(node);
        } else if depth_test {
            transparent.push(node);
        } else {
            ui.push(node);
        }
    }

    opaque.sort_by(|a, b| {
        let a = a.borrow();
        let b = b.borrow();
        a.render_order
            .cmp(&b.render_order)
            .then(program_id(&a).cmp(&program_id(&b)))
            .then(a.z_depth.total_cmp(&b.z_depth))
            .then(b.id().cmp(&a.id()))
    });

    transparent.sort_by(|a, b| {
        let a = a.borrow();
        let b = b.borrow();
        a.render_order
            .cmp(&b.render_order)
            .then(b.z_depth.total_cmp(&a.z_depth))
            .then(b.id().cmp(&a.id()))
    });

    ui.sort_by(|a, b| {
        let a = a.borrow();
        let b = b.borrow();
        a.render_order
            .cmp(&b.render_order)
            .then(program_id(&a).cmp(&program_id(&b)))
            .then(b.id().cmp(&a.id()))
    });

    trace!(
        "render list: {} opaque, {} transparent, {} ui",
        opaque.len(),
        transparent.len(),
        ui.len()
    );

    let mut list = opaque;
    list.append(&mut transparent);
    list.append(&mut ui);
    list
}

/// Projected depth used only for transparency ordering.
///
/// Forced to 0 when an explicit render order overrides depth sorting, when
/// the program does not depth-test, or when no camera is available.
fn compute_z_depth(node: &Node, program: &Program, camera: Option<&Camera>) -> f32 {
    if node.render_order != 0 || !program.depth_test {
        return 0.0;
    }
    match camera {
        Some(camera) => {
            let clip = camera.projection_view_matrix() * node.world_position().extend(1.0);
            clip.z / clip.w
        }
        None => 0.0,
    }
}

fn program_id(node: &Node) -> u32 {
    node.program().map_or(0, |program| program.id)
}
