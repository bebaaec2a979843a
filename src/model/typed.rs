//! Forcefield-typed view of an assembled system.
//!
//! Typing and parameter assignment are performed outside this crate. A [`Typer`] receives the
//! untyped [`ParticleGraph`] and returns a [`TypedTopology`]: the same particles in the same
//! order, annotated with atom types, charges, and bonded parameters. The core only ever reads
//! these values.

use super::error::TopologyError;
use super::topology::{GraphAtom, ParticleGraph};
use super::types::{ELEMENTARY_CHARGE, Element, Point};
use slotmap::Key;
use smol_str::SmolStr;
use std::fmt;

/// Electric charge in coulombs.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Charge(pub f64);

impl Charge {
    /// Converts a charge given in elementary-charge units.
    pub fn from_elementary(units: f64) -> Self {
        Self(units * ELEMENTARY_CHARGE)
    }

    /// Charge expressed in elementary-charge units.
    pub fn in_elementary(self) -> f64 {
        self.0 / ELEMENTARY_CHARGE
    }
}

impl fmt::Display for Charge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4} e", self.in_elementary())
    }
}

/// Typed particle.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedAtom {
    pub name: SmolStr,
    pub element: Element,
    pub pos: Point,
    /// Forcefield atom type such as `opls_135`.
    pub atom_type: SmolStr,
    pub charge: Charge,
    /// Opaque identifier carried into tables when ids are requested.
    pub id: Option<u64>,
}

impl TypedAtom {
    pub fn new(name: &str, element: Element, pos: Point, atom_type: &str, charge: Charge) -> Self {
        Self {
            name: SmolStr::new(name),
            element,
            pos,
            atom_type: SmolStr::new(atom_type),
            charge,
            id: None,
        }
    }

    /// Types a graph atom, keeping its name, element, position, charge, and handle.
    pub fn from_graph_atom(atom: &GraphAtom, atom_type: &str) -> Self {
        Self {
            name: atom.name.clone(),
            element: atom.element,
            pos: atom.pos,
            atom_type: SmolStr::new(atom_type),
            charge: Charge::from_elementary(atom.charge),
            id: Some(atom.id.data().as_ffi()),
        }
    }

    pub fn with_id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }
}

/// Harmonic bond between two typed atoms.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedBond {
    pub atoms: [usize; 2],
    pub bond_type: SmolStr,
    pub k: f64,
    pub r_eq: f64,
}

/// Harmonic angle centred on `atoms[1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedAngle {
    pub atoms: [usize; 3],
    pub angle_type: SmolStr,
    pub k: f64,
    pub theta_eq: f64,
}

/// Ryckaert-Bellemans dihedral around the `atoms[1]`-`atoms[2]` bond.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedDihedral {
    pub atoms: [usize; 4],
    pub dihedral_type: SmolStr,
    /// Coefficients `c0` through `c5`.
    pub coefficients: [f64; 6],
}

/// Unit labels attached to each parameter family, printed in table headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterUnits {
    pub bond_k: SmolStr,
    pub bond_r_eq: SmolStr,
    pub angle_k: SmolStr,
    pub angle_theta_eq: SmolStr,
    pub dihedral: SmolStr,
}

impl Default for ParameterUnits {
    fn default() -> Self {
        Self {
            bond_k: SmolStr::new_static("kJ/(mol*nm**2)"),
            bond_r_eq: SmolStr::new_static("nm"),
            angle_k: SmolStr::new_static("kJ/(mol*rad**2)"),
            angle_theta_eq: SmolStr::new_static("degree"),
            dihedral: SmolStr::new_static("kJ/mol"),
        }
    }
}

/// Complete typed topology as returned by a [`Typer`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TypedTopology {
    atoms: Vec<TypedAtom>,
    bonds: Vec<TypedBond>,
    angles: Vec<TypedAngle>,
    dihedrals: Vec<TypedDihedral>,
    pub units: ParameterUnits,
}

impl TypedTopology {
    /// Bundles typed members.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::MemberIndexOutOfRange`] for the first bond, angle, or dihedral
    /// that refers to an atom index outside `atoms`.
    pub fn new(
        atoms: Vec<TypedAtom>,
        bonds: Vec<TypedBond>,
        angles: Vec<TypedAngle>,
        dihedrals: Vec<TypedDihedral>,
    ) -> Result<Self, TopologyError> {
        let n = atoms.len();
        check_members("bond", n, bonds.iter().map(|b| &b.atoms[..]))?;
        check_members("angle", n, angles.iter().map(|a| &a.atoms[..]))?;
        check_members("dihedral", n, dihedrals.iter().map(|d| &d.atoms[..]))?;
        Ok(Self {
            atoms,
            bonds,
            angles,
            dihedrals,
            units: ParameterUnits::default(),
        })
    }

    pub fn with_units(mut self, units: ParameterUnits) -> Self {
        self.units = units;
        self
    }

    pub fn atoms(&self) -> &[TypedAtom] {
        &self.atoms
    }

    pub fn bonds(&self) -> &[TypedBond] {
        &self.bonds
    }

    pub fn angles(&self) -> &[TypedAngle] {
        &self.angles
    }

    pub fn dihedrals(&self) -> &[TypedDihedral] {
        &self.dihedrals
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }
}

impl fmt::Display for TypedTopology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TypedTopology {{ atoms: {}, bonds: {}, angles: {}, dihedrals: {} }}",
            self.atoms.len(),
            self.bonds.len(),
            self.angles.len(),
            self.dihedrals.len()
        )
    }
}

fn check_members<'a>(
    kind: &'static str,
    atoms: usize,
    members: impl Iterator<Item = &'a [usize]>,
) -> Result<(), TopologyError> {
    for (member, indices) in members.enumerate() {
        if let Some(&index) = indices.iter().find(|&&i| i >= atoms) {
            return Err(TopologyError::MemberIndexOutOfRange {
                kind,
                member,
                index,
                atoms,
            });
        }
    }
    Ok(())
}

/// External forcefield typing step.
pub trait Typer {
    type Error;

    /// Assigns atom types, charges, and bonded parameters to `graph`.
    ///
    /// The returned atoms must keep the order of `graph.atoms()`.
    fn assign(&self, graph: &ParticleGraph) -> Result<TypedTopology, Self::Error>;
}
