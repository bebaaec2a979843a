//! Leaf particles of the containment tree.
//!
//! A particle carries a name (normally its element label), the resolved chemical element, an
//! absolute position in the shared global frame, and a partial charge in elementary-charge
//! units. Particles never move on their own; positions change only through the rigid
//! transforms applied by [`crate::ops::Transform`] and the docking engine.

use super::types::{Element, Point, Vector};
use smol_str::SmolStr;
use std::fmt;

/// Named point particle with element identity, position, and charge.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// Particle label such as `C`, `H`, or `Si`.
    pub name: SmolStr,
    /// Chemical element used for masses and port spacing.
    pub element: Element,
    /// Absolute Cartesian position in nanometres.
    pub pos: Point,
    /// Partial charge in units of the elementary charge.
    pub charge: f64,
}

impl Particle {
    /// Creates a neutral particle from a name, element, and position.
    ///
    /// # Arguments
    ///
    /// * `name` - Particle label such as `"C"` or `"O"`.
    /// * `element` - Chemical element of the particle.
    /// * `pos` - Absolute position in nanometres.
    pub fn new(name: &str, element: Element, pos: Point) -> Self {
        Self {
            name: SmolStr::new(name),
            element,
            pos,
            charge: 0.0,
        }
    }

    /// Creates a particle at the origin whose element is inferred from its name.
    ///
    /// This mirrors how building blocks are usually written: `Particle::named("O")`.
    pub fn named(name: &str) -> Self {
        Self::new(name, Element::from_label(name), Point::origin())
    }

    /// Returns the particle with the given charge (elementary-charge units).
    pub fn with_charge(mut self, charge: f64) -> Self {
        self.charge = charge;
        self
    }

    /// Returns the particle moved to `pos`.
    pub fn at(mut self, pos: Point) -> Self {
        self.pos = pos;
        self
    }

    pub fn distance(&self, other: &Particle) -> f64 {
        nalgebra::distance(&self.pos, &other.pos)
    }

    pub fn translate_by(&mut self, vector: &Vector) {
        self.pos += vector;
    }
}

impl fmt::Display for Particle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Particle {{ name: \"{}\", element: {}, pos: [{:.4}, {:.4}, {:.4}], charge: {:.4} }}",
            self.name, self.element, self.pos.x, self.pos.y, self.pos.z, self.charge
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn particle_named_infers_element() {
        let particle = Particle::named("Si");

        assert_eq!(particle.name, "Si");
        assert_eq!(particle.element, Element::Si);
        assert_eq!(particle.pos, Point::origin());
        assert_eq!(particle.charge, 0.0);
    }

    #[test]
    fn particle_builders_set_position_and_charge() {
        let particle = Particle::named("O")
            .at(Point::new(1.0, 2.0, 3.0))
            .with_charge(-0.5);

        assert_eq!(particle.pos, Point::new(1.0, 2.0, 3.0));
        assert_eq!(particle.charge, -0.5);
    }

    #[test]
    fn particle_distance_calculates_correctly() {
        let a = Particle::named("C");
        let b = Particle::named("C").at(Point::new(0.3, 0.4, 0.0));

        assert!((a.distance(&b) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn particle_translate_by_moves_position() {
        let mut particle = Particle::named("H").at(Point::new(1.0, 1.0, 1.0));

        particle.translate_by(&Vector::new(-1.0, 0.5, 2.0));

        assert!((particle.pos - Point::new(0.0, 1.5, 3.0)).norm() < 1e-12);
    }

    #[test]
    fn particle_display_formats_correctly() {
        let particle = Particle::new("C1", Element::C, Point::new(1.0, 2.0, 3.0));

        assert_eq!(
            format!("{}", particle),
            "Particle { name: \"C1\", element: C, pos: [1.0000, 2.0000, 3.0000], charge: 0.0000 }"
        );
    }
}
