use std::collections::HashMap;
use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::Args;
use prettytable::{Table, format, row};

use graft_forge::{Assembly, NodeId};

use crate::commands::{RecipeArgs, label_path, print_boxed_label, run_with_spinner};

/// Report-only command that assembles a recipe and describes the result.
#[derive(Debug, Args)]
pub struct InspectArgs {
    #[command(flatten)]
    pub recipe: RecipeArgs,
    /// Skip the per-particle and per-bond listings.
    #[arg(long)]
    pub summary_only: bool,
}

pub fn run(args: &InspectArgs) -> Result<()> {
    let (assembly, root) = run_with_spinner("Assembling recipe", || {
        let mut assembly = Assembly::new();
        let root = args.recipe.build(&mut assembly)?;
        Ok((assembly, root))
    })?;

    let mut stderr = io::stderr().lock();
    print_boxed_label(&mut stderr, "GraftForge Assembly Report")?;
    writeln!(&mut stderr)?;
    print_summary(&mut stderr, &assembly, root)?;
    if !args.summary_only {
        print_particles(&mut stderr, &assembly, root)?;
        print_bonds(&mut stderr, &assembly, root)?;
    }
    print_open_ports(&mut stderr, &assembly, root)?;
    Ok(())
}

fn print_summary<W: Write>(writer: &mut W, assembly: &Assembly, root: NodeId) -> Result<()> {
    let compounds = assembly
        .descendants(root)
        .filter(|&id| assembly.compound(id).is_some())
        .count();

    let mut table = Table::new();
    print_boxed_label(writer, "Summary")?;
    table.set_format(*format::consts::FORMAT_BOX_CHARS);
    table.set_titles(row!["Metric", "Value"]);
    table.add_row(row!["Compounds", compounds]);
    table.add_row(row!["Particles", assembly.particle_count(root)]);
    table.add_row(row!["Bonds", assembly.bond_count(root)]);
    table.add_row(row!["Open Ports", assembly.all_ports(root).len()]);
    if let Some((lo, hi)) = assembly.bounding_box(root) {
        let extent = hi - lo;
        table.add_row(row![
            "Extent (nm)",
            format!("{:.3} x {:.3} x {:.3}", extent.x, extent.y, extent.z)
        ]);
    }
    table
        .print(writer)
        .context("Failed to render assembly summary")?;
    writeln!(writer)?;
    Ok(())
}

fn print_particles<W: Write>(writer: &mut W, assembly: &Assembly, root: NodeId) -> Result<()> {
    let mut table = Table::new();
    print_boxed_label(writer, "Particles")?;
    table.set_format(*format::consts::FORMAT_BOX_CHARS);
    table.set_titles(row!["#", "Path", "Element", "x (nm)", "y (nm)", "z (nm)"]);
    for (i, (id, particle)) in assembly.particles(root).enumerate() {
        table.add_row(row![
            i + 1,
            label_path(assembly, root, id),
            particle.element,
            format!("{:.4}", particle.pos.x),
            format!("{:.4}", particle.pos.y),
            format!("{:.4}", particle.pos.z)
        ]);
    }
    table
        .print(writer)
        .context("Failed to render particle listing")?;
    writeln!(writer)?;
    Ok(())
}

fn print_bonds<W: Write>(writer: &mut W, assembly: &Assembly, root: NodeId) -> Result<()> {
    let index: HashMap<NodeId, usize> = assembly
        .particle_ids(root)
        .into_iter()
        .enumerate()
        .map(|(i, id)| (id, i + 1))
        .collect();

    let mut table = Table::new();
    print_boxed_label(writer, "Bonds")?;
    table.set_format(*format::consts::FORMAT_BOX_CHARS);
    table.set_titles(row!["Atom 1", "Atom 2", "Length (nm)"]);
    for bond in assembly.bonds(root) {
        let (Some(i), Some(j)) = (index.get(&bond.a1), index.get(&bond.a2)) else {
            continue;
        };
        let length = match (assembly.particle(bond.a1), assembly.particle(bond.a2)) {
            (Some(a), Some(b)) => format!("{:.4}", a.distance(b)),
            _ => "-".to_string(),
        };
        table.add_row(row![i, j, length]);
    }
    table.print(writer).context("Failed to render bond listing")?;
    writeln!(writer)?;
    Ok(())
}

fn print_open_ports<W: Write>(writer: &mut W, assembly: &Assembly, root: NodeId) -> Result<()> {
    let mut table = Table::new();
    print_boxed_label(writer, "Open Ports")?;
    table.set_format(*format::consts::FORMAT_BOX_CHARS);
    table.set_titles(row!["Path", "Anchor", "Position (nm)", "Orientation"]);
    for id in assembly.all_ports(root) {
        let Some(port) = assembly.port(id) else {
            continue;
        };
        let anchor = port
            .anchor
            .map(|anchor| label_path(assembly, root, anchor))
            .unwrap_or_else(|| "-".to_string());
        let position = assembly
            .port_position(id)
            .map(|p| format!("({:.3}, {:.3}, {:.3})", p.x, p.y, p.z))
            .unwrap_or_else(|| "-".to_string());
        let o = port.orientation();
        table.add_row(row![
            label_path(assembly, root, id),
            anchor,
            position,
            format!("({:.3}, {:.3}, {:.3})", o.x, o.y, o.z)
        ]);
    }
    table
        .print(writer)
        .context("Failed to render open ports")?;
    Ok(())
}
