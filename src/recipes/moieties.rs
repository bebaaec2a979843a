//! Single-centre moieties: a lone hydrogen, methylene, methyl, and silane.
//!
//! Every moiety is built around a central particle at the origin. Backbone ports sit on the
//! y axis (`up` along +y, `down` along -y), one covalent radius away from the centre, so two
//! docked ports leave their anchors one bond length apart.

use crate::model::assembly::Assembly;
use crate::model::particle::Particle;
use crate::model::port::Port;
use crate::model::types::{Element, NodeId, Point, Vector};
use crate::ops::Error;

const TETRAHEDRAL_COS: f64 = -1.0 / 3.0;

/// Bond length between two elements, as the sum of their covalent radii.
pub(crate) fn bond_length(a: Element, b: Element) -> f64 {
    a.covalent_radius() + b.covalent_radius()
}

/// Three directions at the tetrahedral angle from +y, evenly spread around it.
fn tetrahedral_fan() -> [Vector; 3] {
    let sin = (1.0 - TETRAHEDRAL_COS * TETRAHEDRAL_COS).sqrt();
    [0.0_f64, 120.0, 240.0].map(|degrees| {
        let phi = degrees.to_radians();
        Vector::new(sin * phi.cos(), TETRAHEDRAL_COS, sin * phi.sin())
    })
}

/// Two side directions at the tetrahedral angle to each other, perpendicular to y.
fn side_pair() -> [Vector; 2] {
    let x = (2.0_f64 / 3.0).sqrt();
    let z = (1.0_f64 / 3.0).sqrt();
    [Vector::new(x, 0.0, z), Vector::new(-x, 0.0, z)]
}

/// Adds a particle of `element` bonded to `center` (at the origin) along `direction`.
fn add_substituent(
    assembly: &mut Assembly,
    root: NodeId,
    center: NodeId,
    center_element: Element,
    element: Element,
    direction: Vector,
) -> Result<NodeId, Error> {
    let pos = Point::from(direction.normalize() * bond_length(center_element, element));
    let particle = Particle::new(element.symbol(), element, pos);
    let id = assembly.insert_particle(root, particle, None)?;
    assembly.add_bond(center, id)?;
    Ok(id)
}

fn backbone_port(
    assembly: &mut Assembly,
    root: NodeId,
    anchor: NodeId,
    element: Element,
    direction: Vector,
    label: &str,
) -> Result<NodeId, Error> {
    let port = Port::toward(anchor, direction, element.covalent_radius());
    Ok(assembly.insert_port(root, port, Some(label))?)
}

/// A single hydrogen with one port, `up`, along +y.
pub fn hydrogen(assembly: &mut Assembly) -> Result<NodeId, Error> {
    let root = assembly.create_compound("H");
    let h = assembly.insert_particle(root, Particle::named("H"), None)?;
    backbone_port(assembly, root, h, Element::H, Vector::y(), "up")?;
    Ok(root)
}

/// Methylene unit with `up` and `down` backbone ports.
pub fn ch2(assembly: &mut Assembly) -> Result<NodeId, Error> {
    let root = assembly.create_compound("CH2");
    let c = assembly.insert_particle(root, Particle::named("C"), None)?;
    for direction in side_pair() {
        add_substituent(assembly, root, c, Element::C, Element::H, direction)?;
    }
    backbone_port(assembly, root, c, Element::C, Vector::y(), "up")?;
    backbone_port(assembly, root, c, Element::C, -Vector::y(), "down")?;
    Ok(root)
}

/// Methyl unit with a single `up` port.
pub fn ch3(assembly: &mut Assembly) -> Result<NodeId, Error> {
    let root = assembly.create_compound("CH3");
    let c = assembly.insert_particle(root, Particle::named("C"), None)?;
    for direction in tetrahedral_fan() {
        add_substituent(assembly, root, c, Element::C, Element::H, direction)?;
    }
    backbone_port(assembly, root, c, Element::C, Vector::y(), "up")?;
    Ok(root)
}

/// Silicon carrying two oxygens, with `up` and `down` ports.
pub fn silane(assembly: &mut Assembly) -> Result<NodeId, Error> {
    let root = assembly.create_compound("Silane");
    let si = assembly.insert_particle(root, Particle::named("Si"), None)?;
    for direction in side_pair() {
        add_substituent(assembly, root, si, Element::Si, Element::O, direction)?;
    }
    backbone_port(assembly, root, si, Element::Si, Vector::y(), "up")?;
    backbone_port(assembly, root, si, Element::Si, -Vector::y(), "down")?;
    Ok(root)
}
