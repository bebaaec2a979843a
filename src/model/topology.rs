//! Bonded connectivity of an assembly.
//!
//! [`Bond`] stores particle handles in canonical order so the same connection always hashes and
//! compares equal. [`ParticleGraph`] is the flattened, index-based view of one root handed to an
//! external typer: particles appear in flatten order and every index used downstream (tables,
//! index groups) refers to that order. Angle and dihedral perception walks the bond graph in a
//! fixed order so repeated runs enumerate identical terms.

use super::types::{Element, NodeId, Point};
use smol_str::SmolStr;
use std::fmt;

/// Undirected bond between two particles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bond {
    /// Lesser particle handle after canonicalization.
    pub a1: NodeId,
    /// Greater-or-equal particle handle.
    pub a2: NodeId,
}

impl Bond {
    /// Creates a bond with canonically ordered endpoints.
    pub fn new(p1: NodeId, p2: NodeId) -> Self {
        if p1 <= p2 {
            Self { a1: p1, a2: p2 }
        } else {
            Self { a1: p2, a2: p1 }
        }
    }

    /// Returns the endpoint opposite to `particle`, if `particle` is an endpoint.
    pub fn partner(&self, particle: NodeId) -> Option<NodeId> {
        if self.a1 == particle {
            Some(self.a2)
        } else if self.a2 == particle {
            Some(self.a1)
        } else {
            None
        }
    }
}

/// Snapshot of one particle as seen by the typer.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphAtom {
    /// Handle of the source particle.
    pub id: NodeId,
    pub name: SmolStr,
    pub element: Element,
    pub pos: Point,
    /// Charge in elementary-charge units.
    pub charge: f64,
}

/// Index-based particle/bond graph of one assembled root.
#[derive(Debug, Clone, Default)]
pub struct ParticleGraph {
    atoms: Vec<GraphAtom>,
    bonds: Vec<(usize, usize)>,
    adjacency: Vec<Vec<usize>>,
}

impl ParticleGraph {
    /// Builds a graph from atoms in flatten order and bonds given as index pairs.
    ///
    /// Bond indices must reference `atoms`; this is checked in debug builds.
    pub fn new(atoms: Vec<GraphAtom>, bonds: Vec<(usize, usize)>) -> Self {
        debug_assert!(
            bonds.iter().all(|&(i, j)| i < atoms.len() && j < atoms.len()),
            "Bond index out of bounds"
        );
        let mut adjacency = vec![Vec::new(); atoms.len()];
        for &(i, j) in &bonds {
            adjacency[i].push(j);
            adjacency[j].push(i);
        }
        Self {
            atoms,
            bonds,
            adjacency,
        }
    }

    pub fn atoms(&self) -> &[GraphAtom] {
        &self.atoms
    }

    pub fn bonds(&self) -> &[(usize, usize)] {
        &self.bonds
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn bond_count(&self) -> usize {
        self.bonds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn neighbors_of(&self, atom_idx: usize) -> &[usize] {
        self.adjacency
            .get(atom_idx)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Enumerates every bend `i-j-k`, grouped by central atom in flatten order.
    ///
    /// For each centre the outer pairs follow the order in which the bonds were created.
    pub fn angles(&self) -> Vec<[usize; 3]> {
        let mut angles = Vec::new();
        for (center, neighbors) in self.adjacency.iter().enumerate() {
            for (a, &i) in neighbors.iter().enumerate() {
                for &k in &neighbors[a + 1..] {
                    angles.push([i, center, k]);
                }
            }
        }
        angles
    }

    /// Enumerates every proper torsion `i-j-k-l` around each bond `j-k`, in bond order.
    ///
    /// Three-membered rings (`i == l`) do not produce a torsion.
    pub fn dihedrals(&self) -> Vec<[usize; 4]> {
        let mut dihedrals = Vec::new();
        for &(j, k) in &self.bonds {
            for &i in self.neighbors_of(j) {
                if i == k {
                    continue;
                }
                for &l in self.neighbors_of(k) {
                    if l == j || l == i {
                        continue;
                    }
                    dihedrals.push([i, j, k, l]);
                }
            }
        }
        dihedrals
    }
}

impl fmt::Display for ParticleGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ParticleGraph {{ atoms: {}, bonds: {} }}",
            self.atom_count(),
            self.bond_count()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;
    use std::collections::HashSet;

    fn ids(n: usize) -> Vec<NodeId> {
        let mut map: SlotMap<NodeId, ()> = SlotMap::with_key();
        (0..n).map(|_| map.insert(())).collect()
    }

    fn chain_graph(n: usize) -> ParticleGraph {
        let ids = ids(n);
        let atoms = ids
            .iter()
            .enumerate()
            .map(|(i, &id)| GraphAtom {
                id,
                name: SmolStr::new("C"),
                element: Element::C,
                pos: Point::new(i as f64 * 0.15, 0.0, 0.0),
                charge: 0.0,
            })
            .collect();
        let bonds = (0..n.saturating_sub(1)).map(|i| (i, i + 1)).collect();
        ParticleGraph::new(atoms, bonds)
    }

    #[test]
    fn bond_new_creates_bond_with_canonical_ordering() {
        let ids = ids(2);
        let forward = Bond::new(ids[0], ids[1]);
        let backward = Bond::new(ids[1], ids[0]);

        assert_eq!(forward, backward);
        assert!(forward.a1 <= forward.a2);
    }

    #[test]
    fn bond_hash_considers_canonical_ordering() {
        let ids = ids(2);
        let mut set = HashSet::new();

        set.insert(Bond::new(ids[0], ids[1]));
        set.insert(Bond::new(ids[1], ids[0]));

        assert_eq!(set.len(), 1);
    }

    #[test]
    fn bond_partner_returns_opposite_endpoint() {
        let ids = ids(3);
        let bond = Bond::new(ids[0], ids[1]);

        assert_eq!(bond.partner(ids[0]), Some(ids[1]));
        assert_eq!(bond.partner(ids[1]), Some(ids[0]));
        assert_eq!(bond.partner(ids[2]), None);
    }

    #[test]
    fn graph_neighbors_follow_bonds() {
        let graph = chain_graph(3);

        assert_eq!(graph.neighbors_of(1), &[0, 2]);
        assert_eq!(graph.neighbors_of(0), &[1]);
        assert!(graph.neighbors_of(7).is_empty());
    }

    #[test]
    fn butane_backbone_has_two_angles_and_one_dihedral() {
        let graph = chain_graph(4);

        assert_eq!(graph.angles(), vec![[0, 1, 2], [1, 2, 3]]);
        assert_eq!(graph.dihedrals(), vec![[0, 1, 2, 3]]);
    }

    #[test]
    fn branched_center_enumerates_all_pairs() {
        let ids = ids(4);
        let atoms = ids
            .iter()
            .map(|&id| GraphAtom {
                id,
                name: SmolStr::new("C"),
                element: Element::C,
                pos: Point::origin(),
                charge: 0.0,
            })
            .collect();
        let graph = ParticleGraph::new(atoms, vec![(0, 1), (0, 2), (0, 3)]);

        assert_eq!(graph.angles(), vec![[1, 0, 2], [1, 0, 3], [2, 0, 3]]);
        assert!(graph.dihedrals().is_empty());
    }

    #[test]
    fn triangle_produces_no_dihedral() {
        let ids = ids(3);
        let atoms = ids
            .iter()
            .map(|&id| GraphAtom {
                id,
                name: SmolStr::new("C"),
                element: Element::C,
                pos: Point::origin(),
                charge: 0.0,
            })
            .collect();
        let graph = ParticleGraph::new(atoms, vec![(0, 1), (1, 2), (2, 0)]);

        assert!(graph.dihedrals().is_empty());
        assert_eq!(graph.angles().len(), 3);
    }

    #[test]
    fn graph_display_counts_members() {
        let graph = chain_graph(2);

        assert_eq!(format!("{}", graph), "ParticleGraph { atoms: 2, bonds: 1 }");
    }
}
