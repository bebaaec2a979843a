//! Spatial and ancestry classification of particles into index groups.
//!
//! A two-sided layered system (two surfaces facing each other with grafted chains in between)
//! is split at the z-midplane of its bounding box. Particles whose ancestry contains the chain
//! marker are chains, everything else is surface. Surface particles near the outer face of
//! their half are frozen, and chain particles inside a configured terminal group are
//! terminals. Indices are 1-based positions in flatten order.

use crate::model::assembly::Assembly;
use crate::model::types::NodeId;
use crate::ops::error::ClassificationError;
use log::debug;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

/// Parameters for [`classify`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct IndexGroupConfig {
    /// Compound name that marks grafted chains.
    pub chain_marker: String,
    /// Compound names, compared case-insensitively, that mark chain terminal groups.
    pub terminal_groups: Vec<String>,
    /// Depth in nanometres of the frozen layer at each outer face.
    pub freeze_thickness: f64,
}

impl Default for IndexGroupConfig {
    fn default() -> Self {
        Self {
            chain_marker: "Alkylsilane".to_string(),
            terminal_groups: Vec::new(),
            freeze_thickness: 0.5,
        }
    }
}

impl IndexGroupConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chain_marker(mut self, marker: impl Into<String>) -> Self {
        self.chain_marker = marker.into();
        self
    }

    pub fn terminal_group(mut self, name: impl Into<String>) -> Self {
        self.terminal_groups.push(name.into());
        self
    }

    pub fn freeze_thickness(mut self, thickness: f64) -> Self {
        self.freeze_thickness = thickness;
        self
    }
}

/// Named groups of 1-based particle indices, in a fixed order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IndexGroups {
    groups: Vec<(String, Vec<usize>)>,
}

impl IndexGroups {
    pub fn get(&self, name: &str) -> Option<&[usize]> {
        self.groups
            .iter()
            .find(|(group, _)| group == name)
            .map(|(_, indices)| indices.as_slice())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[usize])> {
        self.groups
            .iter()
            .map(|(name, indices)| (name.as_str(), indices.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    fn push(&mut self, name: &str, indices: Vec<usize>) {
        debug!("{name}: {}", indices.len());
        self.groups.push((name.to_string(), indices));
    }
}

impl Serialize for IndexGroups {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.groups.len()))?;
        for (name, indices) in &self.groups {
            map.serialize_entry(name, indices)?;
        }
        map.end()
    }
}

/// Top/bottom split of one particle category.
#[derive(Default)]
struct Halves {
    bottom: Vec<usize>,
    top: Vec<usize>,
}

impl Halves {
    fn push(&mut self, is_top: bool, index: usize) {
        if is_top {
            self.top.push(index);
        } else {
            self.bottom.push(index);
        }
    }

    fn union(&self) -> Vec<usize> {
        concat(&self.bottom, &self.top)
    }
}

/// Partitions the particles of `root` into index groups.
///
/// # Arguments
///
/// * `assembly` - Assembly owning the system.
/// * `root` - Root of the two-sided system.
/// * `config` - Chain marker, terminal group names, and freeze depth.
///
/// # Returns
///
/// Groups in the order `System`, `bottom`, `top`, `bottom_frozen`, `top_frozen`, `frozen`,
/// `surfaces`, `bottom_surface`, `top_surface`, `chains`, `bottom_chains`, `top_chains`,
/// followed by `terminals`, `bottom_terminals`, `top_terminals` when terminal group names are
/// configured. Unions list bottom indices before top indices.
///
/// # Errors
///
/// Returns [`ClassificationError::EmptySystem`] when `root` holds no particles and
/// [`ClassificationError::DegenerateBox`] when all particles share one z coordinate.
pub fn classify(
    assembly: &Assembly,
    root: NodeId,
    config: &IndexGroupConfig,
) -> Result<IndexGroups, ClassificationError> {
    let (lo, hi) = assembly
        .bounding_box(root)
        .ok_or(ClassificationError::EmptySystem)?;
    let height = hi.z - lo.z;
    if height.abs() <= f64::EPSILON {
        return Err(ClassificationError::DegenerateBox { height });
    }
    let middle = (lo.z + hi.z) / 2.0;
    let terminal_names: Vec<String> = config
        .terminal_groups
        .iter()
        .map(|name| name.to_lowercase())
        .collect();

    let mut surface = Halves::default();
    let mut chains = Halves::default();
    let mut frozen = Halves::default();
    let mut terminals = Halves::default();

    for (i, (id, particle)) in assembly.particles(root).enumerate() {
        let index = i + 1;
        let z = particle.pos.z;
        let is_top = z > middle;
        let is_chain = assembly
            .ancestors(id)
            .any(|name| name == config.chain_marker);

        if is_chain {
            chains.push(is_top, index);
            let is_terminal = assembly
                .ancestors(id)
                .any(|name| terminal_names.contains(&name.to_lowercase()));
            if is_terminal {
                terminals.push(is_top, index);
            }
        } else {
            surface.push(is_top, index);
            let is_frozen = if is_top {
                z >= hi.z - config.freeze_thickness
            } else {
                z <= lo.z + config.freeze_thickness
            };
            if is_frozen {
                frozen.push(is_top, index);
            }
        }
    }

    let bottom = concat(&surface.bottom, &chains.bottom);
    let top = concat(&surface.top, &chains.top);

    let mut groups = IndexGroups::default();
    groups.push("System", concat(&bottom, &top));
    groups.push("bottom", bottom);
    groups.push("top", top);
    let all_frozen = frozen.union();
    groups.push("bottom_frozen", frozen.bottom);
    groups.push("top_frozen", frozen.top);
    groups.push("frozen", all_frozen);
    groups.push("surfaces", surface.union());
    groups.push("bottom_surface", surface.bottom);
    groups.push("top_surface", surface.top);
    groups.push("chains", chains.union());
    groups.push("bottom_chains", chains.bottom);
    groups.push("top_chains", chains.top);
    if !config.terminal_groups.is_empty() {
        groups.push("terminals", terminals.union());
        groups.push("bottom_terminals", terminals.bottom);
        groups.push("top_terminals", terminals.top);
    }
    Ok(groups)
}

fn concat(first: &[usize], second: &[usize]) -> Vec<usize> {
    let mut out = Vec::with_capacity(first.len() + second.len());
    out.extend_from_slice(first);
    out.extend_from_slice(second);
    out
}
