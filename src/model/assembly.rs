//! Arena-backed containment tree of particles, ports, and compounds.
//!
//! Every node of every structure under construction lives in one [`Assembly`]. Ownership is
//! expressed through compound child lists and a weak parent handle on each node, so the tree
//! can be walked both ways without reference cycles. Bonds are kept at assembly level together
//! with two secondary indices (bonded neighbours and anchored ports per particle) that make the
//! cascading bookkeeping of [`Assembly::remove`] and the rigid transforms cheap.
//!
//! Several detached roots may coexist: building blocks are created as roots, docked against
//! each other, and only then added under a common parent.

use super::compound::Compound;
use super::error::StructureError;
use super::particle::Particle;
use super::port::Port;
use super::topology::{Bond, GraphAtom, ParticleGraph};
use super::types::{NodeId, Point, Vector};
use log::{debug, trace};
use slotmap::{SecondaryMap, SlotMap};
use smol_str::SmolStr;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Payload of a containment-tree node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Particle(Particle),
    Port(Port),
    Compound(Compound),
}

/// Slot of the arena: payload plus its place in the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    label: Option<SmolStr>,
    parent: Option<NodeId>,
    kind: NodeKind,
}

impl Node {
    fn detached(kind: NodeKind) -> Self {
        Self {
            label: None,
            parent: None,
            kind,
        }
    }

    /// Label under which the owner knows this node; `None` while detached.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Base used for generated labels: the particle or compound name, or `Port`.
    fn label_base(&self) -> &str {
        match &self.kind {
            NodeKind::Particle(p) => &p.name,
            NodeKind::Compound(c) => &c.name,
            NodeKind::Port(_) => "Port",
        }
    }
}

/// Owner of all nodes and bonds built during one assembly session.
#[derive(Debug, Clone, Default)]
pub struct Assembly {
    nodes: SlotMap<NodeId, Node>,
    bonds: Vec<Bond>,
    neighbors: SecondaryMap<NodeId, Vec<NodeId>>,
    anchored: SecondaryMap<NodeId, Vec<NodeId>>,
}

impl Assembly {
    pub fn new() -> Self {
        Self::default()
    }

    // ----------------------------------------------------------------------------------------
    // Node creation
    // ----------------------------------------------------------------------------------------

    /// Creates a detached particle.
    pub fn create_particle(&mut self, particle: Particle) -> NodeId {
        let id = self.nodes.insert(Node::detached(NodeKind::Particle(particle)));
        self.neighbors.insert(id, Vec::new());
        self.anchored.insert(id, Vec::new());
        id
    }

    /// Creates a detached compound with the given name.
    pub fn create_compound(&mut self, name: &str) -> NodeId {
        self.nodes
            .insert(Node::detached(NodeKind::Compound(Compound::new(name))))
    }

    /// Creates a detached port.
    ///
    /// The anchor, when present, must be a particle of this assembly.
    ///
    /// # Errors
    ///
    /// Returns [`StructureError::NotAParticle`] when the anchor is not a live particle.
    pub fn create_port(&mut self, port: Port) -> Result<NodeId, StructureError> {
        if let Some(anchor) = port.anchor {
            self.require_particle(anchor)?;
        }
        let anchor = port.anchor;
        let id = self.nodes.insert(Node::detached(NodeKind::Port(port)));
        if let Some(anchor) = anchor {
            self.anchored[anchor].push(id);
        }
        Ok(id)
    }

    /// Creates a particle and adds it to `parent` in one step.
    pub fn insert_particle(
        &mut self,
        parent: NodeId,
        particle: Particle,
        label: Option<&str>,
    ) -> Result<NodeId, StructureError> {
        let label = self.resolve_label(parent, label, &particle.name)?;
        let id = self.create_particle(particle);
        self.attach(parent, id, label);
        Ok(id)
    }

    /// Creates a port and adds it to `parent` in one step.
    pub fn insert_port(
        &mut self,
        parent: NodeId,
        port: Port,
        label: Option<&str>,
    ) -> Result<NodeId, StructureError> {
        if let Some(anchor) = port.anchor {
            self.require_particle(anchor)?;
        }
        let label = self.resolve_label(parent, label, "Port")?;
        let id = self.create_port(port)?;
        self.attach(parent, id, label);
        Ok(id)
    }

    /// Creates a compound and adds it to `parent` in one step.
    pub fn insert_compound(
        &mut self,
        parent: NodeId,
        name: &str,
        label: Option<&str>,
    ) -> Result<NodeId, StructureError> {
        let label = self.resolve_label(parent, label, name)?;
        let id = self.create_compound(name);
        self.attach(parent, id, label);
        Ok(id)
    }

    // ----------------------------------------------------------------------------------------
    // Containment
    // ----------------------------------------------------------------------------------------

    /// Adds a detached node as an owned child of `parent`.
    ///
    /// Without an explicit label the child is registered as `name[n]`, where `n` is the first
    /// free index for that name among the parent's labels.
    ///
    /// # Errors
    ///
    /// Fails when either node is missing, `parent` is not a compound, `child` already has an
    /// owner, the insertion would create a cycle, or the label is taken.
    pub fn add(
        &mut self,
        parent: NodeId,
        child: NodeId,
        label: Option<&str>,
    ) -> Result<(), StructureError> {
        let child_node = self.require(child)?;
        if let Some(owner) = child_node.parent {
            return Err(StructureError::AlreadyOwned { child, owner });
        }
        let base = SmolStr::new(child_node.label_base());
        self.require_compound(parent)?;
        if parent == child || self.is_descendant(parent, child) {
            return Err(StructureError::CycleDetected { parent, child });
        }
        let label = self.resolve_label(parent, label, &base)?;
        self.attach(parent, child, label);
        Ok(())
    }

    /// Exposes an already-owned descendant under a new label at `parent`'s level.
    ///
    /// Ownership does not change; the label is an alias, typically used to surface an inner
    /// port as if it belonged to `parent` itself.
    ///
    /// # Errors
    ///
    /// Fails when `target` is not a strict descendant of `parent` or the label is taken.
    pub fn hoist(
        &mut self,
        parent: NodeId,
        target: NodeId,
        label: &str,
    ) -> Result<(), StructureError> {
        self.require(target)?;
        self.require_compound(parent)?;
        if !self.is_descendant(target, parent) {
            return Err(StructureError::NotADescendant { parent, target });
        }
        let label = self.resolve_label(parent, Some(label), "")?;
        trace!("hoisting {target:?} as '{label}'");
        self.compound_entry(parent).push_alias(target, label);
        Ok(())
    }

    /// Deletes `child` and its whole subtree from `parent`.
    ///
    /// `child` may be any strict descendant of `parent`. The removal cascades: ports anchored
    /// to removed particles are deleted wherever they are owned, bonds incident to removed
    /// particles disappear, and every alias that pointed into the removed set is dropped. For
    /// each bond that linked a removed particle to a surviving one, a fresh open port is placed
    /// on the survivor, pointing at the position the removed particle occupied, so the freed
    /// valence can be docked again.
    ///
    /// # Returns
    ///
    /// The ports created on surviving particles, in bond order.
    ///
    /// # Errors
    ///
    /// Returns [`StructureError::NotOwned`] when `child` is not in `parent`'s subtree.
    pub fn remove(
        &mut self,
        parent: NodeId,
        child: NodeId,
    ) -> Result<Vec<NodeId>, StructureError> {
        self.require(parent)?;
        self.require(child)?;
        if !self.is_descendant(child, parent) {
            return Err(StructureError::NotOwned { parent, child });
        }

        let mut doomed: Vec<NodeId> = self.descendants(child).collect();
        let mut doomed_set: HashSet<NodeId> = doomed.iter().copied().collect();
        let particles: Vec<NodeId> = doomed
            .iter()
            .copied()
            .filter(|id| self.particle(*id).is_some())
            .collect();
        for particle in &particles {
            for port in &self.anchored[*particle] {
                if doomed_set.insert(*port) {
                    doomed.extend(self.descendants(*port));
                }
            }
        }

        let mut freed = Vec::new();
        for bond in &self.bonds {
            let Some(removed) = [bond.a1, bond.a2].into_iter().find(|p| doomed_set.contains(p)) else {
                continue;
            };
            let Some(kept) = bond.partner(removed).filter(|p| !doomed_set.contains(p)) else {
                continue;
            };
            if let (Some(gone), Some(stay)) = (self.particle(removed), self.particle(kept)) {
                freed.push((kept, gone.pos - stay.pos));
            }
        }

        let tops: Vec<NodeId> = doomed
            .iter()
            .copied()
            .filter(|id| {
                self.nodes[*id]
                    .parent
                    .is_none_or(|owner| !doomed_set.contains(&owner))
            })
            .collect();
        for top in &tops {
            let owners: Vec<NodeId> = self.ancestor_ids(*top).collect();
            for owner in owners {
                self.compound_entry(owner)
                    .retain(|id| !doomed_set.contains(&id));
            }
        }

        self.bonds
            .retain(|b| !doomed_set.contains(&b.a1) && !doomed_set.contains(&b.a2));
        for particle in &particles {
            if let Some(partners) = self.neighbors.remove(*particle) {
                for partner in partners {
                    if let Some(list) = self.neighbors.get_mut(partner) {
                        list.retain(|p| p != particle);
                    }
                }
            }
            self.anchored.remove(*particle);
        }
        for id in &doomed {
            let anchor = self.port(*id).and_then(|port| port.anchor);
            if let Some(list) = anchor.and_then(|a| self.anchored.get_mut(a)) {
                list.retain(|p| p != id);
            }
        }
        for id in &doomed {
            self.nodes.remove(*id);
        }
        debug!(
            "removed {} nodes ({} particles) below {parent:?}",
            doomed.len(),
            particles.len()
        );

        let mut created = Vec::with_capacity(freed.len());
        for (survivor, direction) in freed {
            let Some(owner) = self.nodes[survivor].parent else {
                continue;
            };
            let separation = self
                .particle(survivor)
                .map(|p| p.element.covalent_radius())
                .unwrap_or_default();
            let direction = if direction.norm() > f64::EPSILON {
                direction
            } else {
                Vector::y()
            };
            let label = self.compound_entry(owner).next_label("port");
            let port = self.create_port(Port::toward(survivor, direction, separation))?;
            self.attach(owner, port, label);
            created.push(port);
        }
        Ok(created)
    }

    // ----------------------------------------------------------------------------------------
    // Lookup
    // ----------------------------------------------------------------------------------------

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn particle(&self, id: NodeId) -> Option<&Particle> {
        match self.nodes.get(id).map(|n| &n.kind) {
            Some(NodeKind::Particle(p)) => Some(p),
            _ => None,
        }
    }

    /// Mutable access to a particle's name, element, charge, or position.
    ///
    /// Ports anchored to the particle follow position edits automatically.
    pub fn particle_mut(&mut self, id: NodeId) -> Option<&mut Particle> {
        match self.nodes.get_mut(id).map(|n| &mut n.kind) {
            Some(NodeKind::Particle(p)) => Some(p),
            _ => None,
        }
    }

    pub fn port(&self, id: NodeId) -> Option<&Port> {
        match self.nodes.get(id).map(|n| &n.kind) {
            Some(NodeKind::Port(p)) => Some(p),
            _ => None,
        }
    }

    pub(crate) fn port_mut(&mut self, id: NodeId) -> Option<&mut Port> {
        match self.nodes.get_mut(id).map(|n| &mut n.kind) {
            Some(NodeKind::Port(p)) => Some(p),
            _ => None,
        }
    }

    pub fn compound(&self, id: NodeId) -> Option<&Compound> {
        match self.nodes.get(id).map(|n| &n.kind) {
            Some(NodeKind::Compound(c)) => Some(c),
            _ => None,
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    pub fn label(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(id).and_then(|n| n.label())
    }

    /// Resolves a label (owned or hoisted) directly under `parent`.
    pub fn child(&self, parent: NodeId, label: &str) -> Option<NodeId> {
        self.compound(parent).and_then(|c| c.child(label))
    }

    /// Resolves a `/`-separated label path such as `"alkane/CH2[3]/H[1]"`.
    pub fn lookup(&self, root: NodeId, path: &str) -> Option<NodeId> {
        path.split('/')
            .filter(|segment| !segment.is_empty())
            .try_fold(root, |node, segment| self.child(node, segment))
    }

    /// Returns `true` when `node` lies strictly below `ancestor`.
    pub fn is_descendant(&self, node: NodeId, ancestor: NodeId) -> bool {
        self.ancestor_ids(node).any(|id| id == ancestor)
    }

    /// Enclosing compounds of `node`, innermost first.
    pub fn ancestor_ids(&self, node: NodeId) -> AncestorIds<'_> {
        AncestorIds {
            assembly: self,
            next: self.parent(node),
        }
    }

    /// Names of the enclosing compounds of `node`, innermost first.
    ///
    /// The iterator is lazy and can be recreated at will; it ends at the root.
    pub fn ancestors(&self, node: NodeId) -> impl Iterator<Item = &str> + '_ {
        self.ancestor_ids(node)
            .filter_map(|id| self.compound(id).map(|c| c.name.as_str()))
    }

    /// Depth-first, insertion-ordered walk over `root` and every node it owns.
    pub fn descendants(&self, root: NodeId) -> Descendants<'_> {
        let stack = if self.nodes.contains_key(root) {
            vec![root]
        } else {
            Vec::new()
        };
        Descendants {
            assembly: self,
            stack,
        }
    }

    /// Particles below `root` in flatten order.
    ///
    /// This order is the basis of every positional index produced by the crate.
    pub fn particles(&self, root: NodeId) -> impl Iterator<Item = (NodeId, &Particle)> + '_ {
        self.descendants(root)
            .filter_map(|id| self.particle(id).map(|p| (id, p)))
    }

    pub fn particle_ids(&self, root: NodeId) -> Vec<NodeId> {
        self.particles(root).map(|(id, _)| id).collect()
    }

    pub fn particle_count(&self, root: NodeId) -> usize {
        self.particles(root).count()
    }

    /// The `index`-th particle below `root` in flatten order.
    pub fn particle_at(&self, root: NodeId, index: usize) -> Option<NodeId> {
        self.particles(root).nth(index).map(|(id, _)| id)
    }

    /// Open ports owned below `root`, in flatten order.
    pub fn all_ports(&self, root: NodeId) -> Vec<NodeId> {
        self.descendants(root)
            .filter(|id| self.port(*id).is_some_and(Port::is_open))
            .collect()
    }

    /// Ports anchored to `particle`, open or consumed.
    pub fn anchored_ports(&self, particle: NodeId) -> &[NodeId] {
        self.anchored
            .get(particle)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Absolute position of a port frame.
    pub fn port_position(&self, port: NodeId) -> Option<Point> {
        let port = self.port(port)?;
        let anchor_pos = port.anchor.and_then(|a| self.particle(a)).map(|p| p.pos);
        Some(port.position(anchor_pos))
    }

    // ----------------------------------------------------------------------------------------
    // Bonds
    // ----------------------------------------------------------------------------------------

    /// Bonds two particles. Adding an existing bond again is a no-op.
    ///
    /// # Errors
    ///
    /// Fails when either node is not a particle or both ids are the same.
    pub fn add_bond(&mut self, p1: NodeId, p2: NodeId) -> Result<(), StructureError> {
        self.require_particle(p1)?;
        self.require_particle(p2)?;
        if p1 == p2 {
            return Err(StructureError::SelfBond { node: p1 });
        }
        if self.neighbors[p1].contains(&p2) {
            return Ok(());
        }
        self.bonds.push(Bond::new(p1, p2));
        self.neighbors[p1].push(p2);
        self.neighbors[p2].push(p1);
        trace!("bonded {p1:?} - {p2:?}");
        Ok(())
    }

    /// Bonds whose endpoints both lie below `root`, in creation order.
    pub fn bonds(&self, root: NodeId) -> impl Iterator<Item = &Bond> + '_ {
        let members: HashSet<NodeId> = self.particle_ids(root).into_iter().collect();
        self.bonds
            .iter()
            .filter(move |b| members.contains(&b.a1) && members.contains(&b.a2))
    }

    pub fn bond_count(&self, root: NodeId) -> usize {
        self.bonds(root).count()
    }

    pub fn neighbors(&self, particle: NodeId) -> &[NodeId] {
        self.neighbors
            .get(particle)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    // ----------------------------------------------------------------------------------------
    // Geometry queries
    // ----------------------------------------------------------------------------------------

    /// Axis-aligned bounds of the particles below `root`.
    pub fn bounding_box(&self, root: NodeId) -> Option<(Point, Point)> {
        let mut positions = self.particles(root).map(|(_, p)| p.pos);
        let first = positions.next()?;
        Some(positions.fold((first, first), |(lo, hi), pos| {
            (lo.inf(&pos), hi.sup(&pos))
        }))
    }

    /// Geometric centre of the particles below `root`, or the frame position of a bare port.
    pub fn center(&self, root: NodeId) -> Option<Point> {
        if self.port(root).is_some() {
            return self.port_position(root);
        }
        let mut sum = Vector::zeros();
        let mut count = 0usize;
        for (_, particle) in self.particles(root) {
            sum += particle.pos.coords;
            count += 1;
        }
        (count > 0).then(|| Point::from(sum / count as f64))
    }

    /// Snapshot of everything a rigid transform of `root` must move.
    ///
    /// Particles come in flatten order, followed by the ports owned below `root` and then the
    /// ports owned elsewhere but anchored to one of the particles.
    pub(crate) fn affected_set(&self, root: NodeId) -> (Vec<NodeId>, Vec<NodeId>) {
        let mut particles = Vec::new();
        let mut ports = Vec::new();
        for id in self.descendants(root) {
            match self.nodes[id].kind {
                NodeKind::Particle(_) => particles.push(id),
                NodeKind::Port(_) => ports.push(id),
                NodeKind::Compound(_) => {}
            }
        }
        let mut seen: HashSet<NodeId> = ports.iter().copied().collect();
        for particle in &particles {
            for port in self.anchored_ports(*particle) {
                if seen.insert(*port) {
                    ports.push(*port);
                }
            }
        }
        (particles, ports)
    }

    // ----------------------------------------------------------------------------------------
    // Copy and export
    // ----------------------------------------------------------------------------------------

    /// Deep-copies `root` into a new detached root.
    ///
    /// Port anchors, aliases, and bonds that stay inside the subtree are remapped to the
    /// copies. A copied port anchored outside the subtree becomes a free port at the same
    /// absolute position.
    pub fn clone_subtree(&mut self, root: NodeId) -> Result<NodeId, StructureError> {
        self.require(root)?;
        let originals: Vec<NodeId> = self.descendants(root).collect();
        let mut map: HashMap<NodeId, NodeId> = HashMap::with_capacity(originals.len());

        for &old in &originals {
            let kind = self.nodes[old].kind.clone();
            let new = match kind {
                NodeKind::Particle(p) => self.create_particle(p),
                other => self.nodes.insert(Node::detached(other)),
            };
            map.insert(old, new);
        }

        for &old in &originals {
            let new = map[&old];
            let (label, parent) = if old == root {
                (None, None)
            } else {
                let node = &self.nodes[old];
                (node.label.clone(), node.parent.and_then(|p| map.get(&p).copied()))
            };
            let absolute = self.port_position(old);
            let node = &mut self.nodes[new];
            node.label = label;
            node.parent = parent;
            match &mut node.kind {
                NodeKind::Compound(c) => c.remap(|id| map.get(&id).copied()),
                NodeKind::Port(port) => match port.anchor.and_then(|a| map.get(&a).copied()) {
                    Some(anchor) => {
                        port.anchor = Some(anchor);
                        self.anchored[anchor].push(new);
                    }
                    None => {
                        port.anchor = None;
                        port.offset = absolute.unwrap_or_else(Point::origin).coords;
                    }
                },
                NodeKind::Particle(_) => {}
            }
        }

        let copied: Vec<Bond> = self
            .bonds
            .iter()
            .filter_map(|b| Some(Bond::new(*map.get(&b.a1)?, *map.get(&b.a2)?)))
            .collect();
        for bond in copied {
            self.bonds.push(bond);
            self.neighbors[bond.a1].push(bond.a2);
            self.neighbors[bond.a2].push(bond.a1);
        }

        debug!("cloned {} nodes from {root:?}", originals.len());
        Ok(map[&root])
    }

    /// Flattens `root` into the index-based graph consumed by a typer.
    pub fn to_graph(&self, root: NodeId) -> ParticleGraph {
        let atoms: Vec<GraphAtom> = self
            .particles(root)
            .map(|(id, p)| GraphAtom {
                id,
                name: p.name.clone(),
                element: p.element,
                pos: p.pos,
                charge: p.charge,
            })
            .collect();
        let index: HashMap<NodeId, usize> =
            atoms.iter().enumerate().map(|(i, a)| (a.id, i)).collect();
        let bonds = self
            .bonds(root)
            .map(|b| (index[&b.a1], index[&b.a2]))
            .collect();
        ParticleGraph::new(atoms, bonds)
    }

    // ----------------------------------------------------------------------------------------
    // Internals
    // ----------------------------------------------------------------------------------------

    fn require(&self, id: NodeId) -> Result<&Node, StructureError> {
        self.nodes
            .get(id)
            .ok_or(StructureError::MissingNode { node: id })
    }

    fn require_particle(&self, id: NodeId) -> Result<&Particle, StructureError> {
        self.require(id)?;
        self.particle(id)
            .ok_or(StructureError::NotAParticle { node: id })
    }

    fn require_compound(&self, id: NodeId) -> Result<&Compound, StructureError> {
        self.require(id)?;
        self.compound(id)
            .ok_or(StructureError::NotACompound { node: id })
    }

    fn compound_entry(&mut self, id: NodeId) -> &mut Compound {
        match &mut self.nodes[id].kind {
            NodeKind::Compound(c) => c,
            _ => unreachable!("tree owners are always compounds"),
        }
    }

    fn resolve_label(
        &self,
        parent: NodeId,
        label: Option<&str>,
        base: &str,
    ) -> Result<SmolStr, StructureError> {
        let compound = self.require_compound(parent)?;
        match label {
            Some(label) if compound.has_label(label) => {
                Err(StructureError::duplicate_label(parent, label))
            }
            Some(label) => Ok(SmolStr::new(label)),
            None => Ok(compound.next_label(base)),
        }
    }

    fn attach(&mut self, parent: NodeId, child: NodeId, label: SmolStr) {
        trace!("adding {child:?} to {parent:?} as '{label}'");
        self.compound_entry(parent).push_child(child, label.clone());
        let node = &mut self.nodes[child];
        node.parent = Some(parent);
        node.label = Some(label);
    }
}

impl fmt::Display for Assembly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let roots = self.nodes.values().filter(|n| n.parent.is_none()).count();
        write!(
            f,
            "Assembly {{ nodes: {}, roots: {}, bonds: {} }}",
            self.nodes.len(),
            roots,
            self.bonds.len()
        )
    }
}

/// Iterator over the enclosing compounds of a node, innermost first.
pub struct AncestorIds<'a> {
    assembly: &'a Assembly,
    next: Option<NodeId>,
}

impl Iterator for AncestorIds<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.assembly.parent(current);
        Some(current)
    }
}

/// Pre-order, insertion-ordered walk over a subtree.
pub struct Descendants<'a> {
    assembly: &'a Assembly,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        if let Some(compound) = self.assembly.compound(current) {
            self.stack.extend(compound.children().iter().rev());
        }
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::types::Element;

    fn assert_point_close(actual: &Point, expected: &Point) {
        assert!((actual - expected).norm() < 1e-9, "{actual} != {expected}");
    }

    /// Three-carbon chain `A0-A1-A2` in a compound named `Chain`.
    fn linear_chain(assembly: &mut Assembly) -> (NodeId, Vec<NodeId>) {
        let root = assembly.create_compound("Chain");
        let ids: Vec<NodeId> = (0..3)
            .map(|i| {
                let particle = Particle::new(
                    &format!("A{i}"),
                    Element::C,
                    Point::new(0.15 * i as f64, 0.0, 0.0),
                );
                assembly.insert_particle(root, particle, None).unwrap()
            })
            .collect();
        assembly.add_bond(ids[0], ids[1]).unwrap();
        assembly.add_bond(ids[1], ids[2]).unwrap();
        (root, ids)
    }

    #[test]
    fn add_generates_indexed_labels() {
        let mut assembly = Assembly::new();
        let root = assembly.create_compound("CH2");
        let h0 = assembly.create_particle(Particle::named("H"));
        let h1 = assembly.create_particle(Particle::named("H"));

        assembly.add(root, h0, None).unwrap();
        assembly.add(root, h1, None).unwrap();

        assert_eq!(assembly.label(h0), Some("H[0]"));
        assert_eq!(assembly.label(h1), Some("H[1]"));
        assert_eq!(assembly.child(root, "H[1]"), Some(h1));
        assert_eq!(assembly.parent(h0), Some(root));
    }

    #[test]
    fn add_rejects_duplicate_labels_without_mutation() {
        let mut assembly = Assembly::new();
        let root = assembly.create_compound("X");
        let a = assembly.create_particle(Particle::named("C"));
        let b = assembly.create_particle(Particle::named("C"));
        assembly.add(root, a, Some("carbon")).unwrap();

        let err = assembly.add(root, b, Some("carbon")).unwrap_err();

        assert!(matches!(err, StructureError::DuplicateLabel { .. }));
        assert_eq!(assembly.parent(b), None);
        assert_eq!(assembly.compound(root).unwrap().child_count(), 1);
    }

    #[test]
    fn add_rejects_owned_children_and_cycles() {
        let mut assembly = Assembly::new();
        let outer = assembly.create_compound("Outer");
        let inner = assembly.insert_compound(outer, "Inner", None).unwrap();
        let other = assembly.create_compound("Other");

        assert!(matches!(
            assembly.add(other, inner, None),
            Err(StructureError::AlreadyOwned { .. })
        ));
        assert!(matches!(
            assembly.add(inner, outer, None),
            Err(StructureError::CycleDetected { .. })
        ));
        assert!(matches!(
            assembly.add(outer, outer, None),
            Err(StructureError::CycleDetected { .. })
        ));
    }

    #[test]
    fn add_requires_compound_parent() {
        let mut assembly = Assembly::new();
        let particle = assembly.create_particle(Particle::named("C"));
        let child = assembly.create_particle(Particle::named("H"));

        assert!(matches!(
            assembly.add(particle, child, None),
            Err(StructureError::NotACompound { .. })
        ));
    }

    #[test]
    fn hoist_aliases_inner_port_without_moving_it() {
        let mut assembly = Assembly::new();
        let outer = assembly.create_compound("Methyl");
        let inner = assembly.insert_compound(outer, "CH3", None).unwrap();
        let carbon = assembly
            .insert_particle(inner, Particle::named("C"), None)
            .unwrap();
        let port = assembly
            .insert_port(inner, Port::anchored(carbon), Some("up"))
            .unwrap();

        assembly.hoist(outer, port, "up").unwrap();

        assert_eq!(assembly.child(outer, "up"), Some(port));
        assert_eq!(assembly.parent(port), Some(inner));
        assert_eq!(assembly.all_ports(outer), vec![port]);
        assert_eq!(assembly.compound(outer).unwrap().child_count(), 1);
    }

    #[test]
    fn hoist_requires_descendant() {
        let mut assembly = Assembly::new();
        let outer = assembly.create_compound("A");
        let stranger = assembly.create_compound("B");

        assert!(matches!(
            assembly.hoist(outer, stranger, "alias"),
            Err(StructureError::NotADescendant { .. })
        ));
    }

    #[test]
    fn ancestors_are_innermost_first_and_restartable() {
        let mut assembly = Assembly::new();
        let system = assembly.create_compound("System");
        let chain = assembly.insert_compound(system, "Alkylsilane", None).unwrap();
        let group = assembly.insert_compound(chain, "Methyl", None).unwrap();
        let carbon = assembly
            .insert_particle(group, Particle::named("C"), None)
            .unwrap();

        let first: Vec<&str> = assembly.ancestors(carbon).collect();
        let second: Vec<&str> = assembly.ancestors(carbon).collect();

        assert_eq!(first, vec!["Methyl", "Alkylsilane", "System"]);
        assert_eq!(first, second);
        assert_eq!(assembly.ancestors(system).count(), 0);
    }

    #[test]
    fn particles_follow_depth_first_insertion_order() {
        let mut assembly = Assembly::new();
        let root = assembly.create_compound("Root");
        let a = assembly.insert_particle(root, Particle::named("C"), None).unwrap();
        let sub = assembly.insert_compound(root, "Sub", None).unwrap();
        let b = assembly.insert_particle(sub, Particle::named("O"), None).unwrap();
        let c = assembly.insert_particle(sub, Particle::named("H"), None).unwrap();
        let d = assembly.insert_particle(root, Particle::named("N"), None).unwrap();

        assert_eq!(assembly.particle_ids(root), vec![a, b, c, d]);
        assert_eq!(assembly.particle_at(root, 2), Some(c));
        assert_eq!(assembly.particle_count(sub), 2);
    }

    #[test]
    fn identical_construction_gives_identical_flatten_order() {
        let build = || {
            let mut assembly = Assembly::new();
            let (root, _) = linear_chain(&mut assembly);
            let names: Vec<String> = assembly
                .particles(root)
                .map(|(_, p)| p.name.to_string())
                .collect();
            names
        };

        assert_eq!(build(), build());
        assert_eq!(build(), vec!["A0", "A1", "A2"]);
    }

    #[test]
    fn add_bond_is_idempotent_and_validated() {
        let mut assembly = Assembly::new();
        let (root, ids) = linear_chain(&mut assembly);

        assembly.add_bond(ids[1], ids[0]).unwrap();

        assert_eq!(assembly.bond_count(root), 2);
        assert_eq!(assembly.neighbors(ids[1]), &[ids[0], ids[2]]);
        assert!(matches!(
            assembly.add_bond(ids[0], ids[0]),
            Err(StructureError::SelfBond { .. })
        ));
        assert!(matches!(
            assembly.add_bond(ids[0], root),
            Err(StructureError::NotAParticle { .. })
        ));
    }

    #[test]
    fn remove_cascades_to_ports_and_bonds() {
        let mut assembly = Assembly::new();
        let (root, ids) = linear_chain(&mut assembly);
        let port_on_end = assembly
            .insert_port(root, Port::anchored(ids[2]), Some("tail"))
            .unwrap();
        assembly.hoist(root, ids[2], "last").unwrap();

        let created = assembly.remove(root, ids[2]).unwrap();

        assert!(!assembly.contains_node(ids[2]));
        assert!(!assembly.contains_node(port_on_end));
        assert_eq!(assembly.child(root, "tail"), None);
        assert_eq!(assembly.child(root, "last"), None);
        assert_eq!(assembly.particle_ids(root), vec![ids[0], ids[1]]);
        assert_eq!(assembly.bond_count(root), 1);
        assert_eq!(assembly.neighbors(ids[1]), &[ids[0]]);
        assert_eq!(created.len(), 1);
        assert!(!assembly.all_ports(root).contains(&port_on_end));
    }

    #[test]
    fn remove_leaves_port_pointing_at_removed_partner() {
        let mut assembly = Assembly::new();
        let (root, ids) = linear_chain(&mut assembly);

        let created = assembly.remove(root, ids[2]).unwrap();

        let port = assembly.port(created[0]).unwrap();
        assert_eq!(port.anchor, Some(ids[1]));
        assert!(port.is_open());
        assert!(port.orientation().normalize().dot(&Vector::x()) > 0.999);
        let expected = Point::new(0.15 + Element::C.covalent_radius(), 0.0, 0.0);
        assert_point_close(&assembly.port_position(created[0]).unwrap(), &expected);
        assert_eq!(assembly.all_ports(root), created);
    }

    #[test]
    fn remove_compound_removes_whole_subtree() {
        let mut assembly = Assembly::new();
        let root = assembly.create_compound("Root");
        let keep = assembly.insert_particle(root, Particle::named("C"), None).unwrap();
        let sub = assembly.insert_compound(root, "Sub", None).unwrap();
        let inner = assembly.insert_particle(sub, Particle::named("O"), None).unwrap();
        assembly.add_bond(keep, inner).unwrap();

        assembly.remove(root, sub).unwrap();

        assert_eq!(assembly.particle_ids(root), vec![keep]);
        assert!(!assembly.contains_node(inner));
        assert_eq!(assembly.bond_count(root), 0);
        assert_eq!(assembly.all_ports(root).len(), 1);
    }

    #[test]
    fn remove_rejects_foreign_nodes_without_mutation() {
        let mut assembly = Assembly::new();
        let (root, ids) = linear_chain(&mut assembly);
        let other = assembly.create_compound("Other");
        let before = assembly.node_count();

        let err = assembly.remove(other, ids[0]).unwrap_err();

        assert!(matches!(err, StructureError::NotOwned { .. }));
        assert_eq!(assembly.node_count(), before);
        assert_eq!(assembly.particle_count(root), 3);
        assert!(matches!(
            assembly.remove(root, root),
            Err(StructureError::NotOwned { .. })
        ));
    }

    #[test]
    fn lookup_follows_label_paths() {
        let mut assembly = Assembly::new();
        let root = assembly.create_compound("Root");
        let sub = assembly.insert_compound(root, "Alkane", Some("alkane")).unwrap();
        let h = assembly.insert_particle(sub, Particle::named("H"), None).unwrap();

        assert_eq!(assembly.lookup(root, "alkane/H[0]"), Some(h));
        assert_eq!(assembly.lookup(root, "alkane"), Some(sub));
        assert_eq!(assembly.lookup(root, "alkane/missing"), None);
    }

    #[test]
    fn bounding_box_and_center_cover_particles() {
        let mut assembly = Assembly::new();
        let (root, _) = linear_chain(&mut assembly);

        let (lo, hi) = assembly.bounding_box(root).unwrap();

        assert_point_close(&lo, &Point::new(0.0, 0.0, 0.0));
        assert_point_close(&hi, &Point::new(0.3, 0.0, 0.0));
        assert_point_close(&assembly.center(root).unwrap(), &Point::new(0.15, 0.0, 0.0));
        let empty = assembly.create_compound("Empty");
        assert!(assembly.bounding_box(empty).is_none());
    }

    #[test]
    fn clone_subtree_copies_geometry_bonds_and_ports() {
        let mut assembly = Assembly::new();
        let (root, ids) = linear_chain(&mut assembly);
        let port = assembly
            .insert_port(root, Port::toward(ids[2], Vector::x(), 0.07), Some("up"))
            .unwrap();

        let copy = assembly.clone_subtree(root).unwrap();

        assert_eq!(assembly.parent(copy), None);
        assert_eq!(assembly.particle_count(copy), 3);
        assert_eq!(assembly.bond_count(copy), 2);
        let copied_port = assembly.child(copy, "up").unwrap();
        assert_ne!(copied_port, port);
        let copied_anchor = assembly.port(copied_port).unwrap().anchor.unwrap();
        assert_eq!(Some(copied_anchor), assembly.particle_at(copy, 2));
        assert_point_close(
            &assembly.port_position(copied_port).unwrap(),
            &assembly.port_position(port).unwrap(),
        );

        assembly.particle_mut(copied_anchor).unwrap().pos = Point::new(9.0, 9.0, 9.0);
        assert_point_close(
            &assembly.particle(ids[2]).unwrap().pos,
            &Point::new(0.3, 0.0, 0.0),
        );
    }

    #[test]
    fn to_graph_indexes_in_flatten_order() {
        let mut assembly = Assembly::new();
        let (root, ids) = linear_chain(&mut assembly);

        let graph = assembly.to_graph(root);

        assert_eq!(graph.atom_count(), 3);
        assert_eq!(graph.bonds(), &[(0, 1), (1, 2)]);
        assert_eq!(graph.atoms()[2].id, ids[2]);
        assert_eq!(graph.angles(), vec![[0, 1, 2]]);
    }

    #[test]
    fn display_reports_counts() {
        let mut assembly = Assembly::new();
        linear_chain(&mut assembly);

        assert_eq!(
            format!("{}", assembly),
            "Assembly { nodes: 4, roots: 1, bonds: 2 }"
        );
    }
}
