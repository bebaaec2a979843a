//! Port-to-port docking of rigid subtrees.
//!
//! [`force_overlap`] moves a subtree so that one of its ports lands exactly on a target port,
//! with the two orientations facing each other, optionally bonds the two anchor particles, and
//! consumes both ports. The motion is a single rigid isometry, so every internal distance of
//! the moved subtree is preserved.

use crate::model::assembly::Assembly;
use crate::model::types::{NodeId, Point, Vector};
use crate::ops::error::DockingError;
use crate::ops::transform::Transform;
use log::debug;
use nalgebra::{IsometryMatrix3, Rotation3, Translation3, Unit};
use std::f64::consts::PI;

const ALIGNED_TOLERANCE: f64 = 1e-12;

/// Relative orientation of the two port frames after docking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    /// Orientations point at each other, the usual bond-forming arrangement.
    #[default]
    AntiParallel,
    /// Orientations point the same way.
    Parallel,
}

/// Options accepted by [`force_overlap_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DockOptions {
    /// Bond the anchor particles of the two ports after the move.
    pub add_bond: bool,
    pub alignment: Alignment,
}

impl DockOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_bond(mut self, add_bond: bool) -> Self {
        self.add_bond = add_bond;
        self
    }

    pub fn alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }
}

/// Docks `moving_port` onto `target_port` by moving the subtree of `moving`.
///
/// Shorthand for [`force_overlap_with`] using anti-parallel alignment.
pub fn force_overlap(
    assembly: &mut Assembly,
    moving: NodeId,
    moving_port: NodeId,
    target_port: NodeId,
    add_bond: bool,
) -> Result<(), DockingError> {
    let options = DockOptions::new().add_bond(add_bond);
    force_overlap_with(assembly, moving, moving_port, target_port, &options)
}

/// Docks `moving_port` onto `target_port` by moving the subtree of `moving`.
///
/// The subtree is rotated about the moving port's position until the two orientations satisfy
/// the requested [`Alignment`], then translated so both port positions coincide. Both steps
/// are composed into one isometry and applied once.
///
/// # Arguments
///
/// * `assembly` - Assembly owning both structures.
/// * `moving` - Root of the subtree that moves.
/// * `moving_port` - Open port owned in, or anchored inside, the `moving` subtree.
/// * `target_port` - Open port that stays fixed.
/// * `options` - Bonding and alignment switches.
///
/// # Errors
///
/// Returns [`DockingError`] when an id is missing or not a port, a port is consumed, the moving
/// port does not belong to `moving`, the target port would be moved along, the two ports are
/// the same, an orientation is zero, or bonding is requested for ports that are unanchored or
/// share an anchor. Nothing is modified when an error is returned.
pub fn force_overlap_with(
    assembly: &mut Assembly,
    moving: NodeId,
    moving_port: NodeId,
    target_port: NodeId,
    options: &DockOptions,
) -> Result<(), DockingError> {
    let bond = validate(assembly, moving, moving_port, target_port, options)?;

    let (from_pos, from_dir) = frame(assembly, moving_port)?;
    let (to_pos, to_dir) = frame(assembly, target_port)?;
    let wanted = match options.alignment {
        Alignment::AntiParallel => -to_dir,
        Alignment::Parallel => to_dir,
    };

    let rotation = alignment_rotation(&from_dir, &wanted);
    let shift = to_pos.coords - rotation * from_pos.coords;
    let motion = IsometryMatrix3::from_parts(Translation3::from(shift), rotation);
    Transform::apply(assembly, moving, &motion);

    if let Some((a, b)) = bond {
        assembly.add_bond(a, b)?;
    }
    for port in [moving_port, target_port] {
        if let Some(port) = assembly.port_mut(port) {
            port.consume();
        }
    }

    debug!(
        "docked {moving_port:?} onto {target_port:?} ({:?}, bonded: {})",
        options.alignment,
        bond.is_some()
    );
    Ok(())
}

/// Checks every precondition and returns the anchor pair to bond, if any.
fn validate(
    assembly: &Assembly,
    moving: NodeId,
    moving_port: NodeId,
    target_port: NodeId,
    options: &DockOptions,
) -> Result<Option<(NodeId, NodeId)>, DockingError> {
    for node in [moving, moving_port, target_port] {
        if !assembly.contains_node(node) {
            return Err(DockingError::MissingNode { node });
        }
    }
    let source = assembly
        .port(moving_port)
        .ok_or(DockingError::NotAPort { node: moving_port })?;
    let target = assembly
        .port(target_port)
        .ok_or(DockingError::NotAPort { node: target_port })?;

    if moving_port == target_port {
        return Err(DockingError::SamePort { port: moving_port });
    }
    for (id, port) in [(moving_port, source), (target_port, target)] {
        if port.is_consumed() {
            return Err(DockingError::PortConsumed { port: id });
        }
    }

    let (_, moved_ports) = assembly.affected_set(moving);
    if !moved_ports.contains(&moving_port) {
        return Err(DockingError::PortNotInSubtree {
            port: moving_port,
            moving,
        });
    }
    if moved_ports.contains(&target_port) {
        return Err(DockingError::TargetInMovingSubtree {
            port: target_port,
            moving,
        });
    }

    for (id, port) in [(moving_port, source), (target_port, target)] {
        if port.orientation().norm() <= f64::EPSILON {
            return Err(DockingError::DegenerateOrientation { port: id });
        }
    }

    if !options.add_bond {
        return Ok(None);
    }
    let a = source
        .anchor
        .ok_or(DockingError::UnanchoredBond { port: moving_port })?;
    let b = target
        .anchor
        .ok_or(DockingError::UnanchoredBond { port: target_port })?;
    if a == b {
        return Err(DockingError::SameAnchor { particle: a });
    }
    Ok(Some((a, b)))
}

fn frame(assembly: &Assembly, port: NodeId) -> Result<(Point, Vector), DockingError> {
    let position = assembly
        .port_position(port)
        .ok_or(DockingError::NotAPort { node: port })?;
    let orientation = assembly
        .port(port)
        .ok_or(DockingError::NotAPort { node: port })?
        .orientation();
    Ok((position, orientation))
}

/// Smallest rotation taking the direction of `from` onto the direction of `to`.
fn alignment_rotation(from: &Vector, to: &Vector) -> Rotation3<f64> {
    let a = from.normalize();
    let b = to.normalize();
    let cos = a.dot(&b).clamp(-1.0, 1.0);

    if cos >= 1.0 - ALIGNED_TOLERANCE {
        return Rotation3::identity();
    }
    if cos <= -1.0 + ALIGNED_TOLERANCE {
        return Rotation3::from_axis_angle(&perpendicular(&a), PI);
    }
    let axis = Unit::new_normalize(a.cross(&b));
    Rotation3::from_axis_angle(&axis, cos.acos())
}

/// Any unit vector orthogonal to `v`.
fn perpendicular(v: &Vector) -> Unit<Vector> {
    let helper = if v.x.abs() <= v.y.abs() && v.x.abs() <= v.z.abs() {
        Vector::x()
    } else if v.y.abs() <= v.z.abs() {
        Vector::y()
    } else {
        Vector::z()
    };
    Unit::new_normalize(v.cross(&helper))
}
