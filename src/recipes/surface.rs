//! Flat surfaces, grafted monolayers, and two-sided monolayer systems.

use super::functional::{Terminal, grafted_chain};
use super::labelled;
use crate::model::assembly::Assembly;
use crate::model::particle::Particle;
use crate::model::port::Port;
use crate::model::types::{Element, NodeId, Point, Vector};
use crate::ops::{Error, Transform, force_overlap};
use log::debug;
use std::f64::consts::PI;

/// Rectangular grid of grafting sites in the xy plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceLayout {
    pub nx: usize,
    pub ny: usize,
    /// Site spacing in nanometres.
    pub spacing: f64,
}

impl Default for SurfaceLayout {
    fn default() -> Self {
        Self {
            nx: 4,
            ny: 4,
            spacing: 0.5,
        }
    }
}

impl SurfaceLayout {
    pub fn new(nx: usize, ny: usize, spacing: f64) -> Self {
        Self { nx, ny, spacing }
    }

    pub fn site_count(&self) -> usize {
        self.nx * self.ny
    }
}

/// Silicon slab at z = 0 with one open +z port per site.
pub fn slab(assembly: &mut Assembly, layout: &SurfaceLayout) -> Result<NodeId, Error> {
    let root = assembly.create_compound("Surface");
    for j in 0..layout.ny {
        for i in 0..layout.nx {
            let pos = Point::new(i as f64 * layout.spacing, j as f64 * layout.spacing, 0.0);
            let si = assembly.insert_particle(root, Particle::new("Si", Element::Si, pos), None)?;
            let port = Port::toward(si, Vector::z(), Element::Si.covalent_radius());
            assembly.insert_port(root, port, None)?;
        }
    }
    Ok(root)
}

/// Slab with a grafted chain docked and bonded on every site.
pub fn monolayer(
    assembly: &mut Assembly,
    layout: &SurfaceLayout,
    chain_length: usize,
    terminal: Terminal,
) -> Result<NodeId, Error> {
    let root = assembly.create_compound("Monolayer");
    let surface = slab(assembly, layout)?;
    let sites = assembly.all_ports(surface);
    assembly.add(root, surface, Some("surface"))?;

    for site in sites {
        let chain = grafted_chain(assembly, chain_length, terminal)?;
        let down = labelled(assembly, chain, "down")?;
        force_overlap(assembly, chain, down, site, true)?;
        assembly.add(root, chain, None)?;
    }
    debug!(
        "grafted {} chains of length {chain_length}",
        layout.site_count()
    );
    Ok(root)
}

/// Two monolayers facing each other across a gap of `gap` nanometres.
///
/// The bottom monolayer keeps its surface at z = 0. The top one is a copy turned upside down
/// about the x axis and lifted so that its lowest particle sits `gap` above the highest
/// particle of the bottom one. Both are children of a `System` compound, labelled `bottom`
/// and `top`.
pub fn dual_monolayer(
    assembly: &mut Assembly,
    layout: &SurfaceLayout,
    chain_length: usize,
    terminal: Terminal,
    gap: f64,
) -> Result<NodeId, Error> {
    let bottom = monolayer(assembly, layout, chain_length, terminal)?;
    let top = assembly.clone_subtree(bottom)?;
    Transform::rotate(assembly, top, PI, &Vector::x_axis());

    if let (Some((_, bottom_hi)), Some((top_lo, _))) =
        (assembly.bounding_box(bottom), assembly.bounding_box(top))
    {
        let lift = bottom_hi.z + gap - top_lo.z;
        Transform::translate(assembly, top, &Vector::new(0.0, 0.0, lift));
    }

    let system = assembly.create_compound("System");
    assembly.add(system, bottom, Some("bottom"))?;
    assembly.add(system, top, Some("top"))?;
    Ok(system)
}
