//! Errors raised by containment-tree mutations and typed topology construction.
//!
//! Every [`StructureError`] variant names an ownership or bonding invariant that the requested
//! `add`, `hoist`, `remove`, or `add_bond` call would have broken. Validation always runs before
//! the assembly is touched, so receiving one of these errors means nothing changed.

use super::types::NodeId;
use thiserror::Error;

/// Invalid mutation of the containment tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructureError {
    /// The id does not refer to a live node of this assembly.
    #[error("node {node:?} does not exist in this assembly")]
    MissingNode { node: NodeId },

    /// Children can only be added to compounds.
    #[error("node {node:?} is not a compound and cannot own children")]
    NotACompound { node: NodeId },

    /// The child already has an owner.
    #[error("node {child:?} is already owned by {owner:?}")]
    AlreadyOwned { child: NodeId, owner: NodeId },

    /// Adding the child would make a node its own ancestor.
    #[error("adding {child:?} to {parent:?} would create a cycle")]
    CycleDetected { parent: NodeId, child: NodeId },

    /// Labels must be unique among the children of one compound.
    #[error("label '{label}' is already used in {parent:?}")]
    DuplicateLabel { parent: NodeId, label: String },

    /// The node is not part of the given compound's subtree.
    #[error("node {child:?} is not owned by {parent:?}")]
    NotOwned { parent: NodeId, child: NodeId },

    /// Hoisting requires a strict descendant.
    #[error("node {target:?} is not a descendant of {parent:?} and cannot be hoisted")]
    NotADescendant { parent: NodeId, target: NodeId },

    /// Bonds connect particles only.
    #[error("node {node:?} is not a particle")]
    NotAParticle { node: NodeId },

    /// A particle cannot bond to itself.
    #[error("cannot bond particle {node:?} to itself")]
    SelfBond { node: NodeId },
}

impl StructureError {
    pub fn duplicate_label(parent: NodeId, label: impl Into<String>) -> Self {
        Self::DuplicateLabel {
            parent,
            label: label.into(),
        }
    }
}

/// Inconsistent typed topology handed over by a typer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopologyError {
    /// A bonded member refers to an atom that does not exist.
    #[error("{kind} {member} refers to atom {index}, but the topology has {atoms} atoms")]
    MemberIndexOutOfRange {
        kind: &'static str,
        member: usize,
        index: usize,
        atoms: usize,
    },
}
