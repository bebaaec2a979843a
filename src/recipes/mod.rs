//! Reusable molecular building blocks.
//!
//! Recipes are plain call sequences against the assembly engine: they create particles and
//! ports, dock pieces together with [`force_overlap`](crate::ops::force_overlap), and expose the
//! remaining open ports under stable labels (`up`, `down`, `primary`, ...). Every recipe
//! returns the id of a new detached root in the given [`Assembly`].

mod chain;
mod functional;
mod moieties;
mod surface;

pub use chain::alkane;
pub use functional::{
    ChainGroup, Secondary, Terminal, acetic_acid, alkylsilane, carboxylate, ethyl,
    functionalized_alkylsilane, grafted_chain, h_cap, methyl, modified_chain,
};
pub use moieties::{ch2, ch3, hydrogen, silane};
pub use surface::{SurfaceLayout, dual_monolayer, monolayer, slab};

use crate::model::assembly::Assembly;
use crate::model::types::NodeId;
use crate::ops::Error;

/// Resolves a label path below `root`, failing with [`Error::MissingLabel`].
fn labelled(assembly: &Assembly, root: NodeId, path: &str) -> Result<NodeId, Error> {
    assembly
        .lookup(root, path)
        .ok_or_else(|| Error::missing_label(root, path))
}
