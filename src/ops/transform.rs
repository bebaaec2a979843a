//! Rigid-body transformations of containment subtrees.
//!
//! Every operation moves the whole affected set of a node: the particles it owns, the ports it
//! owns, and the ports anchored to those particles even when another compound owns them. The
//! set and the port frames are captured before any coordinate is written.

use crate::model::assembly::Assembly;
use crate::model::types::{Axis, NodeId, Point, Vector};
use nalgebra::{IsometryMatrix3, Rotation3, Translation3};

/// Collection of rigid transformations applied in place to an [`Assembly`].
///
/// The `Transform` type groups static methods in the same way for every node kind: a compound
/// moves with its whole subtree, a particle moves with the ports anchored to it, and a bare
/// port moves alone.
pub struct Transform;

impl Transform {
    /// Translates the subtree of `node` by a displacement vector.
    ///
    /// # Arguments
    ///
    /// * `assembly` - Assembly that owns `node`.
    /// * `node` - Root of the subtree to move.
    /// * `vector` - Displacement in nanometres.
    pub fn translate(assembly: &mut Assembly, node: NodeId, vector: &Vector) {
        let motion = IsometryMatrix3::from_parts(Translation3::from(*vector), Rotation3::identity());
        Self::apply(assembly, node, &motion);
    }

    /// Translates the subtree so that its geometric centre lands on `target`.
    ///
    /// Subtrees without particles or ports are left in place.
    pub fn translate_to(assembly: &mut Assembly, node: NodeId, target: &Point) {
        if let Some(center) = assembly.center(node) {
            Self::translate(assembly, node, &(target - center));
        }
    }

    /// Rotates the subtree about an axis through its geometric centre.
    ///
    /// # Arguments
    ///
    /// * `assembly` - Assembly that owns `node`.
    /// * `node` - Root of the subtree to rotate.
    /// * `angle` - Rotation angle in radians.
    /// * `axis` - Unit rotation axis.
    pub fn rotate(assembly: &mut Assembly, node: NodeId, angle: f64, axis: &Axis) {
        let pivot = assembly.center(node).unwrap_or_else(Point::origin);
        Self::rotate_about(assembly, node, angle, axis, &pivot);
    }

    /// Rotates the subtree about an axis through an explicit pivot.
    pub fn rotate_about(assembly: &mut Assembly, node: NodeId, angle: f64, axis: &Axis, pivot: &Point) {
        let rotation = Rotation3::from_axis_angle(axis, angle);
        let motion = IsometryMatrix3::rotation_wrt_point(rotation, *pivot);
        Self::apply(assembly, node, &motion);
    }

    /// Rotates a single port frame about its anchor particle.
    ///
    /// Unanchored ports spin about their own position. The anchor itself does not move. Calls
    /// on nodes that are not ports do nothing.
    pub fn spin(assembly: &mut Assembly, port: NodeId, angle: f64, axis: &Axis) {
        let Some(frame) = assembly.port(port) else {
            return;
        };
        let anchor_pos = frame
            .anchor
            .and_then(|anchor| assembly.particle(anchor))
            .map(|particle| particle.pos);
        let position = frame.position(anchor_pos);
        let orientation = frame.orientation();
        let pivot = anchor_pos.unwrap_or(position);

        let motion = IsometryMatrix3::rotation_wrt_point(Rotation3::from_axis_angle(axis, angle), pivot);
        if let Some(frame) = assembly.port_mut(port) {
            frame.set_frame(motion * position, motion * orientation, anchor_pos);
        }
    }

    /// Applies an arbitrary rigid motion to the subtree of `node`.
    ///
    /// Port frames are snapshotted first and re-expressed relative to their anchors after all
    /// particles have moved, so a port keeps its absolute frame consistent whether or not its
    /// anchor is part of the moved set.
    pub fn apply(assembly: &mut Assembly, node: NodeId, motion: &IsometryMatrix3<f64>) {
        let (particles, ports) = assembly.affected_set(node);
        let frames: Vec<(NodeId, Point, Vector)> = ports
            .iter()
            .filter_map(|id| {
                let position = assembly.port_position(*id)?;
                let orientation = assembly.port(*id)?.orientation();
                Some((*id, position, orientation))
            })
            .collect();

        for id in &particles {
            if let Some(particle) = assembly.particle_mut(*id) {
                particle.pos = motion * particle.pos;
            }
        }

        for (id, position, orientation) in frames {
            let anchor_pos = assembly
                .port(id)
                .and_then(|port| port.anchor)
                .and_then(|anchor| assembly.particle(anchor))
                .map(|particle| particle.pos);
            if let Some(port) = assembly.port_mut(id) {
                port.set_frame(motion * position, motion * orientation, anchor_pos);
            }
        }
    }
}
