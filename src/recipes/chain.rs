use super::labelled;
use super::moieties::ch2;
use crate::model::assembly::Assembly;
use crate::model::types::{NodeId, Vector};
use crate::ops::{Error, Transform, force_overlap};
use std::f64::consts::PI;

/// Linear alkane backbone of `length` methylene units.
///
/// Units are labelled `CH2[0]` to `CH2[length - 1]` from the `down` end. The free backbone
/// ports of the first and last units are hoisted as `down` and `up`. Every other unit is
/// turned half a turn about the backbone so neighbouring hydrogens point to opposite sides.
/// A zero `length` yields an empty compound without ports.
pub fn alkane(assembly: &mut Assembly, length: usize) -> Result<NodeId, Error> {
    let root = assembly.create_compound("Alkane");
    let mut previous: Option<NodeId> = None;

    for i in 0..length {
        let unit = ch2(assembly)?;
        if i % 2 == 1 {
            let axis = Vector::y_axis();
            Transform::rotate(assembly, unit, PI, &axis);
        }
        if let Some(previous) = previous {
            let down = labelled(assembly, unit, "down")?;
            let up = labelled(assembly, previous, "up")?;
            force_overlap(assembly, unit, down, up, true)?;
        }
        assembly.add(root, unit, None)?;
        previous = Some(unit);
    }

    if let Some(last) = previous {
        let first = labelled(assembly, root, "CH2[0]")?;
        let down = labelled(assembly, first, "down")?;
        let up = labelled(assembly, last, "up")?;
        assembly.hoist(root, down, "down")?;
        assembly.hoist(root, up, "up")?;
    }
    Ok(root)
}
