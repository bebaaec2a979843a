use std::io::{self, BufWriter, Write};

use anyhow::{Context, Result};
use clap::Args;
use smol_str::format_smolstr;

use graft_forge::ops::{
    AngleColumn, AtomColumn, BondColumn, DihedralColumn, TableOptions, flatten_topology,
};
use graft_forge::{
    Assembly, ParticleGraph, Table, TopologyError, TypedAngle, TypedAtom, TypedBond,
    TypedDihedral, TypedTopology, Typer,
};

use crate::commands::{RecipeArgs, run_with_spinner};

/// Prints the flattened topology tables of a recipe as tab-separated text.
#[derive(Debug, Args)]
pub struct TablesArgs {
    #[command(flatten)]
    pub recipe: RecipeArgs,
    /// Append measured geometry and element/mass columns.
    #[arg(long)]
    pub geometry: bool,
    /// Append particle id columns.
    #[arg(long)]
    pub ids: bool,
}

/// Types every particle by its element and takes equilibrium values from the current
/// geometry, with zero force constants.
struct GeometryTyper;

impl Typer for GeometryTyper {
    type Error = TopologyError;

    fn assign(&self, graph: &ParticleGraph) -> Result<TypedTopology, TopologyError> {
        let atoms = graph.atoms();
        let symbol = |i: usize| atoms[i].element.symbol();

        let typed_atoms = atoms
            .iter()
            .map(|atom| TypedAtom::from_graph_atom(atom, atom.element.symbol()))
            .collect();
        let bonds = graph
            .bonds()
            .iter()
            .map(|&(i, j)| TypedBond {
                atoms: [i, j],
                bond_type: format_smolstr!("{}-{}", symbol(i), symbol(j)),
                k: 0.0,
                r_eq: nalgebra::distance(&atoms[i].pos, &atoms[j].pos),
            })
            .collect();
        let angles = graph
            .angles()
            .into_iter()
            .map(|[i, j, k]| TypedAngle {
                atoms: [i, j, k],
                angle_type: format_smolstr!("{}-{}-{}", symbol(i), symbol(j), symbol(k)),
                k: 0.0,
                theta_eq: (atoms[i].pos - atoms[j].pos)
                    .angle(&(atoms[k].pos - atoms[j].pos))
                    .to_degrees(),
            })
            .collect();
        let dihedrals = graph
            .dihedrals()
            .into_iter()
            .map(|[i, j, k, l]| TypedDihedral {
                atoms: [i, j, k, l],
                dihedral_type: format_smolstr!(
                    "{}-{}-{}-{}",
                    symbol(i),
                    symbol(j),
                    symbol(k),
                    symbol(l)
                ),
                coefficients: [0.0; 6],
            })
            .collect();

        TypedTopology::new(typed_atoms, bonds, angles, dihedrals)
    }
}

pub fn run(args: &TablesArgs) -> Result<()> {
    let tables = run_with_spinner("Flattening topology", || {
        let mut assembly = Assembly::new();
        let root = args.recipe.build(&mut assembly)?;
        let graph = assembly.to_graph(root);
        let topology = GeometryTyper
            .assign(&graph)
            .context("Failed to type the assembled recipe")?;

        let mut options = TableOptions::new().with_ids(args.ids);
        if args.geometry {
            options = options
                .atom_column(AtomColumn::Position)
                .atom_column(AtomColumn::Element)
                .atom_column(AtomColumn::Mass)
                .bond_column(BondColumn::Length)
                .angle_column(AngleColumn::Theta)
                .dihedral_column(DihedralColumn::Phi);
        }
        Ok(flatten_topology(&topology, &options))
    })?;

    let mut out = BufWriter::new(io::stdout().lock());
    write_section(&mut out, "atoms", &tables.atoms)?;
    write_section(&mut out, "bonds", &tables.bonds)?;
    write_section(&mut out, "angles", &tables.angles)?;
    write_section(&mut out, "dihedrals", &tables.dihedrals)?;
    out.flush().context("Failed to flush stdout")?;
    Ok(())
}

fn write_section<W: Write>(writer: &mut W, title: &str, table: &Table) -> Result<()> {
    writeln!(writer, "# {title}")?;
    write!(writer, "{table}").with_context(|| format!("Failed to write {title} table"))?;
    writeln!(writer)?;
    Ok(())
}
