//! Flattening of a typed topology into ordered parameter tables.
//!
//! The four tables (atoms, bonds, angles, dihedrals) keep the exact member order of the
//! [`TypedTopology`]: row `i` of the atom table is particle `i` of the flatten order, and bonded
//! terms appear in the order the typer enumerated them. Nothing is sorted or deduplicated.
//! Atom references are rendered as `name(index)`, parameters are rounded (charges to four
//! decimals in elementary-charge units, everything else to three), and each parameter column
//! carries its unit in the header.

use crate::model::table::{Table, Value};
use crate::model::typed::{TypedAtom, TypedTopology};
use crate::model::types::Point;
use serde::{Deserialize, Serialize};

const CHARGE_DECIMALS: i32 = 4;
const PARAMETER_DECIMALS: i32 = 3;

/// Extra per-atom columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AtomColumn {
    /// Three columns `x`, `y`, `z` in nanometres.
    Position,
    Element,
    /// Atomic mass in daltons.
    Mass,
}

/// Extra per-bond columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BondColumn {
    /// Current bond length in nanometres.
    Length,
}

/// Extra per-angle columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AngleColumn {
    /// Current angle in degrees.
    Theta,
}

/// Extra per-dihedral columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DihedralColumn {
    /// Current torsion in degrees, in `(-180, 180]`.
    Phi,
}

/// Selection of optional columns for [`flatten_topology`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct TableOptions {
    pub atom_columns: Vec<AtomColumn>,
    pub bond_columns: Vec<BondColumn>,
    pub angle_columns: Vec<AngleColumn>,
    pub dihedral_columns: Vec<DihedralColumn>,
    /// Append opaque member ids (`atom_id`, `atom1_id`, ...).
    pub with_ids: bool,
}

impl TableOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn atom_column(mut self, column: AtomColumn) -> Self {
        self.atom_columns.push(column);
        self
    }

    pub fn bond_column(mut self, column: BondColumn) -> Self {
        self.bond_columns.push(column);
        self
    }

    pub fn angle_column(mut self, column: AngleColumn) -> Self {
        self.angle_columns.push(column);
        self
    }

    pub fn dihedral_column(mut self, column: DihedralColumn) -> Self {
        self.dihedral_columns.push(column);
        self
    }

    pub fn with_ids(mut self, with_ids: bool) -> Self {
        self.with_ids = with_ids;
        self
    }
}

/// The four flattened tables of one typed system.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopologyTables {
    pub atoms: Table,
    pub bonds: Table,
    pub angles: Table,
    pub dihedrals: Table,
}

/// Builds the atom, bond, angle, and dihedral tables for a typed topology.
///
/// # Arguments
///
/// * `topology` - Typed system whose atom order is the flatten order of the assembly.
/// * `options` - Optional columns to append.
///
/// # Returns
///
/// A [`TopologyTables`] with one row per typed member, in input order.
pub fn flatten_topology(topology: &TypedTopology, options: &TableOptions) -> TopologyTables {
    TopologyTables {
        atoms: atom_table(topology, options),
        bonds: bond_table(topology, options),
        angles: angle_table(topology, options),
        dihedrals: dihedral_table(topology, options),
    }
}

fn atom_table(topology: &TypedTopology, options: &TableOptions) -> Table {
    let atoms = topology.atoms();
    let mut table = Table::new();
    table.push_column("index", (0..atoms.len()).map(Value::Index).collect());
    table.push_column(
        "atom_type",
        atoms.iter().map(|a| Value::Text(a.atom_type.to_string())).collect(),
    );
    table.push_column(
        "names",
        atoms.iter().map(|a| Value::Text(a.name.to_string())).collect(),
    );
    table.push_column(
        "charge (e)",
        atoms
            .iter()
            .map(|a| Value::Float(round_to(a.charge.in_elementary(), CHARGE_DECIMALS)))
            .collect(),
    );

    for column in &options.atom_columns {
        match column {
            AtomColumn::Position => {
                for (axis, name) in ["x", "y", "z"].into_iter().enumerate() {
                    table.push_column(name, atoms.iter().map(|a| Value::Float(a.pos[axis])).collect());
                }
            }
            AtomColumn::Element => table.push_column(
                "element",
                atoms.iter().map(|a| Value::Text(a.element.symbol().to_string())).collect(),
            ),
            AtomColumn::Mass => table.push_column(
                "mass",
                atoms.iter().map(|a| Value::Float(a.element.atomic_mass())).collect(),
            ),
        }
    }

    if options.with_ids {
        table.push_column(
            "atom_id",
            atoms.iter().enumerate().map(|(i, a)| member_id(a, i)).collect(),
        );
    }
    table
}

fn bond_table(topology: &TypedTopology, options: &TableOptions) -> Table {
    let bonds = topology.bonds();
    let units = &topology.units;
    let mut table = Table::new();
    table.push_column("index", (0..bonds.len()).map(Value::Index).collect());
    push_member_labels(&mut table, topology, bonds.iter().map(|b| &b.atoms[..]), 2);
    table.push_column(
        "bond_type",
        bonds.iter().map(|b| Value::Text(b.bond_type.to_string())).collect(),
    );
    table.push_column(
        format!("Parameter 1 (k): {}", units.bond_k),
        bonds.iter().map(|b| parameter(b.k)).collect(),
    );
    table.push_column(
        format!("Parameter 2 (r_eq): {}", units.bond_r_eq),
        bonds.iter().map(|b| parameter(b.r_eq)).collect(),
    );

    for column in &options.bond_columns {
        match column {
            BondColumn::Length => table.push_column(
                "length",
                bonds
                    .iter()
                    .map(|b| {
                        let [i, j] = b.atoms;
                        parameter(nalgebra::distance(&position(topology, i), &position(topology, j)))
                    })
                    .collect(),
            ),
        }
    }

    if options.with_ids {
        push_member_ids(&mut table, topology, bonds.iter().map(|b| &b.atoms[..]), 2);
    }
    table
}

fn angle_table(topology: &TypedTopology, options: &TableOptions) -> Table {
    let angles = topology.angles();
    let units = &topology.units;
    let mut table = Table::new();
    table.push_column("index", (0..angles.len()).map(Value::Index).collect());
    push_member_labels(&mut table, topology, angles.iter().map(|a| &a.atoms[..]), 3);
    table.push_column(
        "angle_type",
        angles.iter().map(|a| Value::Text(a.angle_type.to_string())).collect(),
    );
    table.push_column(
        format!("Parameter 1 (k): {}", units.angle_k),
        angles.iter().map(|a| parameter(a.k)).collect(),
    );
    table.push_column(
        format!("Parameter 2 (theta_eq): {}", units.angle_theta_eq),
        angles.iter().map(|a| parameter(a.theta_eq)).collect(),
    );

    for column in &options.angle_columns {
        match column {
            AngleColumn::Theta => table.push_column(
                "theta",
                angles
                    .iter()
                    .map(|a| {
                        let [i, j, k] = a.atoms.map(|n| position(topology, n));
                        parameter(bend_angle(&i, &j, &k).to_degrees())
                    })
                    .collect(),
            ),
        }
    }

    if options.with_ids {
        push_member_ids(&mut table, topology, angles.iter().map(|a| &a.atoms[..]), 3);
    }
    table
}

fn dihedral_table(topology: &TypedTopology, options: &TableOptions) -> Table {
    let dihedrals = topology.dihedrals();
    let unit = &topology.units.dihedral;
    let mut table = Table::new();
    table.push_column("index", (0..dihedrals.len()).map(Value::Index).collect());
    push_member_labels(&mut table, topology, dihedrals.iter().map(|d| &d.atoms[..]), 4);
    table.push_column(
        "dihedral_type",
        dihedrals
            .iter()
            .map(|d| Value::Text(d.dihedral_type.to_string()))
            .collect(),
    );
    for c in 0..6 {
        table.push_column(
            format!("Parameter {} (c{}): {}", c + 1, c, unit),
            dihedrals.iter().map(|d| parameter(d.coefficients[c])).collect(),
        );
    }

    for column in &options.dihedral_columns {
        match column {
            DihedralColumn::Phi => table.push_column(
                "phi",
                dihedrals
                    .iter()
                    .map(|d| {
                        let [a, b, c, e] = d.atoms.map(|n| position(topology, n));
                        parameter(torsion_angle(&a, &b, &c, &e).to_degrees())
                    })
                    .collect(),
            ),
        }
    }

    if options.with_ids {
        push_member_ids(&mut table, topology, dihedrals.iter().map(|d| &d.atoms[..]), 4);
    }
    table
}

/// Appends `Atom1`..`AtomN` label columns.
fn push_member_labels<'a>(
    table: &mut Table,
    topology: &TypedTopology,
    members: impl Iterator<Item = &'a [usize]> + Clone,
    arity: usize,
) {
    for slot in 0..arity {
        let values = members
            .clone()
            .map(|atoms| Value::Text(atom_label(topology, atoms[slot])))
            .collect();
        table.push_column(format!("Atom{}", slot + 1), values);
    }
}

/// Appends `atom1_id`..`atomN_id` columns.
fn push_member_ids<'a>(
    table: &mut Table,
    topology: &TypedTopology,
    members: impl Iterator<Item = &'a [usize]> + Clone,
    arity: usize,
) {
    for slot in 0..arity {
        let values = members
            .clone()
            .map(|atoms| {
                let index = atoms[slot];
                member_id(&topology.atoms()[index], index)
            })
            .collect();
        table.push_column(format!("atom{}_id", slot + 1), values);
    }
}

fn atom_label(topology: &TypedTopology, index: usize) -> String {
    format!("{}({})", topology.atoms()[index].name, index)
}

/// Opaque id of an atom, falling back to its index when the typer assigned none.
fn member_id(atom: &TypedAtom, index: usize) -> Value {
    Value::Id(atom.id.unwrap_or(index as u64))
}

fn position(topology: &TypedTopology, index: usize) -> Point {
    topology.atoms()[index].pos
}

fn parameter(value: f64) -> Value {
    Value::Float(round_to(value, PARAMETER_DECIMALS))
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    let rounded = (value * scale).round() / scale;
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// Angle at `b` between `a` and `c`, in radians.
fn bend_angle(a: &Point, b: &Point, c: &Point) -> f64 {
    (a - b).angle(&(c - b))
}

/// Signed torsion about the `b`-`c` axis, in radians.
fn torsion_angle(a: &Point, b: &Point, c: &Point, d: &Point) -> f64 {
    let b1 = b - a;
    let b2 = c - b;
    let b3 = d - c;
    let n1 = b1.cross(&b2);
    let n2 = b2.cross(&b3);
    let m1 = n1.cross(&b2.normalize());
    let x = n1.dot(&n2);
    let y = m1.dot(&n2);
    y.atan2(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::typed::{Charge, TypedAngle, TypedBond, TypedDihedral};
    use crate::model::types::Element;
    use smol_str::SmolStr;

    fn linear_chain() -> TypedTopology {
        let atoms = vec![
            TypedAtom::new("A0", Element::C, Point::new(0.0, 0.0, 0.0), "CT", Charge::from_elementary(-0.123_456)),
            TypedAtom::new("A1", Element::C, Point::new(0.15, 0.0, 0.0), "CT", Charge::from_elementary(0.1)),
            TypedAtom::new("A2", Element::C, Point::new(0.15, 0.15, 0.0), "CT", Charge::from_elementary(0.023_456)),
        ];
        let bond = |i, j| TypedBond {
            atoms: [i, j],
            bond_type: SmolStr::new("CT-CT"),
            k: 224_262.4,
            r_eq: 0.152_9,
        };
        let angles = vec![TypedAngle {
            atoms: [0, 1, 2],
            angle_type: SmolStr::new("CT-CT-CT"),
            k: 488.272_12,
            theta_eq: 112.7,
        }];
        TypedTopology::new(atoms, vec![bond(0, 1), bond(1, 2)], angles, Vec::new()).unwrap()
    }

    fn texts(table: &Table, column: &str) -> Vec<String> {
        table.column(column).unwrap().iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn three_atom_chain_keeps_flatten_order() {
        let tables = flatten_topology(&linear_chain(), &TableOptions::default());

        assert_eq!(tables.atoms.row_count(), 3);
        assert_eq!(texts(&tables.atoms, "index"), vec!["0", "1", "2"]);
        assert_eq!(texts(&tables.atoms, "names"), vec!["A0", "A1", "A2"]);
        assert_eq!(tables.bonds.row_count(), 2);
        assert_eq!(texts(&tables.bonds, "Atom1"), vec!["A0(0)", "A1(1)"]);
        assert_eq!(texts(&tables.bonds, "Atom2"), vec!["A1(1)", "A2(2)"]);
        assert!(tables.dihedrals.is_empty());
    }

    #[test]
    fn charges_are_rounded_in_elementary_units() {
        let tables = flatten_topology(&linear_chain(), &TableOptions::default());

        let charges: Vec<f64> = tables
            .atoms
            .column("charge (e)")
            .unwrap()
            .iter()
            .map(|v| v.as_f64().unwrap())
            .collect();
        assert_eq!(charges, vec![-0.1235, 0.1, 0.0235]);
    }

    #[test]
    fn parameter_headers_carry_units_and_values_are_rounded() {
        let tables = flatten_topology(&linear_chain(), &TableOptions::default());

        let names: Vec<&str> = tables.bonds.column_names().collect();
        assert_eq!(
            names,
            vec![
                "index",
                "Atom1",
                "Atom2",
                "bond_type",
                "Parameter 1 (k): kJ/(mol*nm**2)",
                "Parameter 2 (r_eq): nm",
            ]
        );
        assert_eq!(
            tables.bonds.column("Parameter 2 (r_eq): nm").unwrap()[0],
            Value::Float(0.153)
        );
        assert_eq!(
            tables.angles.column("Parameter 1 (k): kJ/(mol*rad**2)").unwrap()[0],
            Value::Float(488.272)
        );
        assert!(tables.angles.column("Parameter 2 (theta_eq): degree").is_some());
    }

    #[test]
    fn dihedral_table_lists_six_coefficients() {
        let mut topology = linear_chain();
        let extra = TypedAtom::new("A3", Element::C, Point::new(0.3, 0.15, 0.0), "CT", Charge(0.0));
        let mut atoms = topology.atoms().to_vec();
        atoms.push(extra);
        let dihedral = TypedDihedral {
            atoms: [0, 1, 2, 3],
            dihedral_type: SmolStr::new("CT-CT-CT-CT"),
            coefficients: [2.928_8, -1.464_4, 0.209_2, -1.673_6, 0.0, 0.0],
        };
        topology = TypedTopology::new(
            atoms,
            topology.bonds().to_vec(),
            topology.angles().to_vec(),
            vec![dihedral],
        )
        .unwrap();

        let options = TableOptions::new().dihedral_column(DihedralColumn::Phi);
        let tables = flatten_topology(&topology, &options);

        assert_eq!(texts(&tables.dihedrals, "Atom4"), vec!["A3(3)"]);
        assert_eq!(
            tables.dihedrals.column("Parameter 1 (c0): kJ/mol").unwrap()[0],
            Value::Float(2.929)
        );
        assert!(tables.dihedrals.column("Parameter 6 (c5): kJ/mol").is_some());
        let phi = tables.dihedrals.column("phi").unwrap()[0].as_f64().unwrap();
        assert!((phi.abs() - 180.0).abs() < 1e-9);
    }

    #[test]
    fn optional_columns_are_appended_in_request_order() {
        let options = TableOptions::new()
            .atom_column(AtomColumn::Element)
            .atom_column(AtomColumn::Position)
            .bond_column(BondColumn::Length)
            .angle_column(AngleColumn::Theta);

        let tables = flatten_topology(&linear_chain(), &options);

        let names: Vec<&str> = tables.atoms.column_names().collect();
        assert_eq!(
            names,
            vec!["index", "atom_type", "names", "charge (e)", "element", "x", "y", "z"]
        );
        assert_eq!(texts(&tables.atoms, "element"), vec!["C", "C", "C"]);
        assert_eq!(tables.bonds.column("length").unwrap()[1], Value::Float(0.15));
        assert_eq!(tables.angles.column("theta").unwrap()[0], Value::Float(90.0));
    }

    #[test]
    fn ids_fall_back_to_positions_when_missing() {
        let mut topology = linear_chain();
        let atoms: Vec<TypedAtom> = topology
            .atoms()
            .iter()
            .cloned()
            .enumerate()
            .map(|(i, a)| if i == 0 { a.with_id(77) } else { a })
            .collect();
        topology =
            TypedTopology::new(atoms, topology.bonds().to_vec(), Vec::new(), Vec::new()).unwrap();

        let tables = flatten_topology(&topology, &TableOptions::new().with_ids(true));

        assert_eq!(
            tables.atoms.column("atom_id").unwrap(),
            &[Value::Id(77), Value::Id(1), Value::Id(2)]
        );
        assert_eq!(tables.bonds.column("atom1_id").unwrap(), &[Value::Id(77), Value::Id(1)]);
        assert_eq!(tables.bonds.column("atom2_id").unwrap(), &[Value::Id(1), Value::Id(2)]);
    }

    #[test]
    fn empty_topology_produces_headers_without_rows() {
        let tables = flatten_topology(&TypedTopology::default(), &TableOptions::default());

        assert!(tables.atoms.is_empty());
        assert_eq!(tables.dihedrals.columns().len(), 12);
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let options: TableOptions =
            serde_json::from_str(r#"{"atom_columns": ["position", "mass"]}"#).unwrap();

        assert_eq!(options.atom_columns, vec![AtomColumn::Position, AtomColumn::Mass]);
        assert!(!options.with_ids);
        assert!(options.bond_columns.is_empty());
    }

    #[test]
    fn torsion_of_cis_and_trans_arrangements() {
        let a = Point::new(1.0, 1.0, 0.0);
        let b = Point::new(1.0, 0.0, 0.0);
        let c = Point::new(0.0, 0.0, 0.0);

        let cis = torsion_angle(&a, &b, &c, &Point::new(0.0, 1.0, 0.0));
        let trans = torsion_angle(&a, &b, &c, &Point::new(0.0, -1.0, 0.0));
        let gauche = torsion_angle(&a, &b, &c, &Point::new(0.0, 0.0, 1.0));

        assert!(cis.abs() < 1e-12);
        assert!((trans.abs() - std::f64::consts::PI).abs() < 1e-12);
        assert!((gauche.abs() - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }
}
