//! Operations on assembled structures.
//!
//! Rigid transforms and docking mutate an [`Assembly`](crate::Assembly) in
//! place; table flattening and index-group classification only read. Each concern reports
//! failures through its own error type, and [`Error`] unifies them for callers that chain
//! several steps.

mod error;

pub mod dock;
pub mod groups;
pub mod tables;
pub mod transform;

pub use dock::{Alignment, DockOptions, force_overlap, force_overlap_with};
pub use error::{ClassificationError, DockingError, Error};
pub use groups::{IndexGroupConfig, IndexGroups, classify};
pub use tables::{
    AngleColumn, AtomColumn, BondColumn, DihedralColumn, TableOptions, TopologyTables,
    flatten_topology,
};
pub use transform::Transform;
