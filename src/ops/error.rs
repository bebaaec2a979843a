use crate::model::error::StructureError;
use crate::model::types::NodeId;
use thiserror::Error;

/// Rejected docking request. The assembly is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DockingError {
    #[error("node {node:?} does not exist in this assembly")]
    MissingNode { node: NodeId },

    #[error("node {node:?} is not a port")]
    NotAPort { node: NodeId },

    #[error("port {port:?} has already been consumed by an earlier docking")]
    PortConsumed { port: NodeId },

    #[error("port {port:?} is neither owned by nor anchored inside moving node {moving:?}")]
    PortNotInSubtree { port: NodeId, moving: NodeId },

    #[error("target port {port:?} would be moved together with {moving:?}")]
    TargetInMovingSubtree { port: NodeId, moving: NodeId },

    #[error("cannot dock port {port:?} onto itself")]
    SamePort { port: NodeId },

    #[error("port {port:?} has a zero-length orientation")]
    DegenerateOrientation { port: NodeId },

    #[error("bonding requested but port {port:?} has no anchor particle")]
    UnanchoredBond { port: NodeId },

    #[error("bonding requested but both ports are anchored to particle {particle:?}")]
    SameAnchor { particle: NodeId },

    #[error(transparent)]
    Structure(#[from] StructureError),
}

/// Failure to derive index groups from an assembled system.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClassificationError {
    #[error("system contains no particles")]
    EmptySystem,

    #[error("system has zero height along z (height {height}), cannot split into top and bottom")]
    DegenerateBox { height: f64 },
}

/// Any failure raised while building or exporting an assembly.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error(transparent)]
    Structure(#[from] StructureError),

    #[error(transparent)]
    Docking(#[from] DockingError),

    #[error(transparent)]
    Classification(#[from] ClassificationError),

    #[error("no node labelled '{path}' below {root:?}")]
    MissingLabel { root: NodeId, path: String },

    #[error("a chain of {length} units is too short for this modification (needs {minimum})")]
    ChainTooShort { length: usize, minimum: usize },
}

impl Error {
    pub fn missing_label(root: NodeId, path: impl Into<String>) -> Self {
        Self::MissingLabel {
            root,
            path: path.into(),
        }
    }
}
